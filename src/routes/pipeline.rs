// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Stateless pipeline endpoints.
//!
//! Each call carries its own inputs; nothing is stored between requests.
//! Extraction and selection degrade instead of failing, and say so.

use super::within;
use crate::error::{AppError, Result};
use crate::models::{
    CandidateExercise, DailyContext, ExtractedProfile, SessionFeedback, UserProfile, WorkoutPlan,
};
use crate::services::{Extraction, Selection};
use crate::AppState;
use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

pub const EXTRACTION_NOTICE: &str =
    "Profile analysis is unavailable right now; default values were used. Please review them.";
pub const SELECTION_NOTICE: &str =
    "The exercise library is unreachable right now; no exercises could be selected.";

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/profile/extract", post(extract_profile))
        .route("/api/exercises/safe", post(select_safe))
        .route("/api/workouts/generate", post(generate_session))
}

// ─── Profile extraction ──────────────────────────────────────

#[derive(Debug, Deserialize, Validate)]
pub struct ExtractRequest {
    #[validate(length(min = 1, max = 4000))]
    pub text: String,
}

#[derive(Debug, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ExtractResponse {
    pub profile: ExtractedProfile,
    pub degraded: bool,
    pub notice: Option<String>,
}

impl From<Extraction> for ExtractResponse {
    fn from(extraction: Extraction) -> Self {
        let degraded = extraction.is_degraded();
        Self {
            profile: extraction.profile,
            degraded,
            notice: degraded.then(|| EXTRACTION_NOTICE.to_string()),
        }
    }
}

async fn extract_profile(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ExtractRequest>,
) -> Result<Json<ExtractResponse>> {
    req.validate()?;

    let extraction = within(
        state.config.pipeline_timeout,
        "profile extraction",
        state.pipeline.extract_profile(&req.text),
    )
    .await
    .unwrap_or_else(Extraction::fallback);

    Ok(Json(extraction.into()))
}

// ─── Safe exercise selection ─────────────────────────────────

#[derive(Debug, Deserialize, Validate)]
pub struct SelectRequest {
    #[validate(nested)]
    pub profile: UserProfile,
    #[validate(nested)]
    pub context: DailyContext,
}

#[derive(Debug, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct SelectResponse {
    pub candidates: Vec<CandidateExercise>,
    pub degraded: bool,
    pub notice: Option<String>,
}

impl From<Selection> for SelectResponse {
    fn from(selection: Selection) -> Self {
        let degraded = selection.is_degraded();
        Self {
            candidates: selection.candidates,
            degraded,
            notice: degraded.then(|| SELECTION_NOTICE.to_string()),
        }
    }
}

async fn select_safe(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SelectRequest>,
) -> Result<Json<SelectResponse>> {
    req.validate()?;

    let selection = within(
        state.config.pipeline_timeout,
        "exercise selection",
        state.pipeline.select_safe(&req.profile, &req.context),
    )
    .await
    .unwrap_or_else(Selection::unavailable);

    Ok(Json(selection.into()))
}

// ─── Session generation ──────────────────────────────────────

#[derive(Debug, Deserialize, Validate)]
pub struct GenerateRequest {
    #[validate(nested)]
    pub profile: UserProfile,
    #[validate(nested)]
    pub context: DailyContext,
    pub candidates: Vec<CandidateExercise>,
    #[serde(default)]
    pub feedback: Option<SessionFeedback>,
}

async fn generate_session(
    State(state): State<Arc<AppState>>,
    Json(req): Json<GenerateRequest>,
) -> Result<Json<WorkoutPlan>> {
    req.validate()?;
    if let Some(feedback) = &req.feedback {
        feedback.validate()?;
    }
    if req.candidates.is_empty() {
        return Err(AppError::NoSafeExercises(
            "no candidate exercises supplied".to_string(),
        ));
    }

    let plan = within(
        state.config.pipeline_timeout,
        "session generation",
        state.pipeline.generate_session(
            &req.profile,
            &req.context,
            &req.candidates,
            req.feedback.as_ref(),
        ),
    )
    .await??;

    Ok(Json(plan))
}
