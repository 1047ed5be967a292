// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Hybrid Coach: personalized strength sessions that respect injuries
//!
//! This crate provides the coaching pipeline (profile extraction, safe
//! exercise selection against the exercise graph, constrained session
//! generation) and the HTTP API that drives it.

pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod taxonomy;

use config::Config;
use services::{CoachPipeline, SessionStore};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub pipeline: CoachPipeline,
    pub sessions: SessionStore,
}
