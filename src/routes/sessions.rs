// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Coaching flow endpoints.
//!
//! The client posts user events; the host applies them to the session's
//! state machine and runs whatever pipeline work the transition asks for.

use super::within;
use crate::error::Result;
use crate::models::{CoachSession, FlowEvent, Transition};
use crate::services::Extraction;
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use uuid::Uuid;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/sessions", post(create_session))
        .route("/api/sessions/{id}", get(get_session).delete(delete_session))
        .route("/api/sessions/{id}/events", post(post_event))
}

async fn create_session(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<CoachSession>) {
    (StatusCode::CREATED, Json(state.sessions.create()))
}

async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<CoachSession>> {
    let shared = state.sessions.get(id)?;
    let session = shared.lock().await;
    Ok(Json(session.clone()))
}

async fn delete_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    state.sessions.remove(id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Apply one event and return the updated session.
async fn post_event(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(event): Json<FlowEvent>,
) -> Result<Json<CoachSession>> {
    let shared = state.sessions.get(id)?;
    let mut session = shared.lock().await;
    let limit = state.config.pipeline_timeout;

    match session.apply(event)? {
        Transition::Done => {}
        Transition::NeedsExtraction { text } => {
            let extraction = within(
                limit,
                "profile extraction",
                state.pipeline.extract_profile(&text),
            )
            .await
            .unwrap_or_else(Extraction::fallback);

            let degraded = extraction.is_degraded();
            session.complete_extraction(extraction.profile, degraded)?;
        }
        Transition::NeedsWorkout {
            profile,
            context,
            feedback,
        } => {
            let outcome = within(
                limit,
                "session generation",
                state
                    .pipeline
                    .prepare_workout(&profile, &context, feedback.as_ref()),
            )
            .await
            .and_then(|plan| plan);

            if let Err(e) = &outcome {
                tracing::warn!(session_id = %id, error = %e, "Workout not prepared");
            }
            session.complete_workout(outcome, context.time_minutes)?;
        }
    }

    tracing::debug!(session_id = %id, stage = ?session.stage, "Session advanced");
    Ok(Json(session.clone()))
}
