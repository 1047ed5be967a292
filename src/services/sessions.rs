// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-memory registry of coaching sessions.
//!
//! Sessions live only as long as the process. Each one sits behind its own
//! async mutex so a slow pipeline call for one user never blocks another.
//! Sessions untouched for longer than the idle limit are swept away.

use crate::error::AppError;
use crate::models::CoachSession;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use uuid::Uuid;

pub type SharedSession = Arc<Mutex<CoachSession>>;

struct Entry {
    session: SharedSession,
    last_seen: Instant,
}

#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<DashMap<Uuid, Entry>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new session at the beginning of onboarding.
    pub fn create(&self) -> CoachSession {
        let session = CoachSession::new();
        self.sessions.insert(
            session.id,
            Entry {
                session: Arc::new(Mutex::new(session.clone())),
                last_seen: Instant::now(),
            },
        );
        tracing::info!(session_id = %session.id, "Session created");
        session
    }

    /// Look up a session and mark it as recently used.
    pub fn get(&self, id: Uuid) -> Result<SharedSession, AppError> {
        self.sessions
            .get_mut(&id)
            .map(|mut entry| {
                entry.last_seen = Instant::now();
                entry.session.clone()
            })
            .ok_or_else(|| AppError::NotFound(format!("Session {}", id)))
    }

    pub fn remove(&self, id: Uuid) -> Result<(), AppError> {
        self.sessions
            .remove(&id)
            .map(|_| tracing::info!(session_id = %id, "Session removed"))
            .ok_or_else(|| AppError::NotFound(format!("Session {}", id)))
    }

    /// Drop sessions idle for at least `max_idle`. A session with a request
    /// in flight holds its lock and is kept. Returns how many were dropped.
    pub fn evict_idle(&self, max_idle: Duration) -> usize {
        let before = self.sessions.len();
        self.sessions.retain(|_, entry| {
            entry.last_seen.elapsed() < max_idle || entry.session.try_lock().is_err()
        });
        let evicted = before.saturating_sub(self.sessions.len());
        if evicted > 0 {
            tracing::info!(
                evicted,
                remaining = self.sessions.len(),
                "Evicted idle sessions"
            );
        }
        evicted
    }

    /// Run `evict_idle` in the background every half idle period.
    pub fn spawn_sweeper(&self, max_idle: Duration) -> JoinHandle<()> {
        let store = self.clone();
        let period = (max_idle / 2).max(Duration::from_secs(1));
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            loop {
                interval.tick().await;
                store.evict_idle(max_idle);
            }
        })
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
