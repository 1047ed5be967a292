// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Coaching pipeline.
//!
//! Handles the core workflow:
//! 1. Extract a structured profile from onboarding text
//! 2. Select exercises that fit the equipment and avoid injured areas
//! 3. Generate a three-phase session from those exercises only
//!
//! The pipeline is stateless; every call takes its inputs explicitly.

use crate::config::{Config, PlanPolicy};
use crate::error::{AppError, Result};
use crate::models::{CandidateExercise, DailyContext, SessionFeedback, UserProfile, WorkoutPlan};
use crate::services::extractor::{Extraction, ProfileExtractor};
use crate::services::generator::SessionGenerator;
use crate::services::graph::ExerciseStore;
use crate::services::llm::LanguageModel;
use crate::services::selector::{SafeExerciseSelector, Selection};
use std::sync::Arc;

/// Caller-facing pipeline over shared model and graph clients.
#[derive(Clone)]
pub struct CoachPipeline {
    extractor: ProfileExtractor,
    selector: SafeExerciseSelector,
    generator: SessionGenerator,
}

impl CoachPipeline {
    pub fn new(
        model: Arc<dyn LanguageModel>,
        store: Arc<dyn ExerciseStore>,
        graph_tag: String,
        policy: PlanPolicy,
    ) -> Self {
        Self {
            extractor: ProfileExtractor::new(model.clone()),
            selector: SafeExerciseSelector::new(store, graph_tag),
            generator: SessionGenerator::new(model, policy),
        }
    }

    pub fn from_config(
        config: &Config,
        model: Arc<dyn LanguageModel>,
        store: Arc<dyn ExerciseStore>,
    ) -> Self {
        Self::new(model, store, config.graph_tag.clone(), config.plan_policy)
    }

    /// Free text → profile. Always yields a complete profile.
    pub async fn extract_profile(&self, text: &str) -> Extraction {
        self.extractor.extract(text).await
    }

    /// Profile + today's context → safe candidates (possibly none).
    pub async fn select_safe(&self, profile: &UserProfile, context: &DailyContext) -> Selection {
        self.selector.select(profile, context).await
    }

    /// Candidates → plan, or a failure the caller must check before advancing.
    pub async fn generate_session(
        &self,
        profile: &UserProfile,
        context: &DailyContext,
        candidates: &[CandidateExercise],
        feedback: Option<&SessionFeedback>,
    ) -> Result<WorkoutPlan> {
        self.generator
            .generate(profile, context, candidates, feedback)
            .await
    }

    /// Select, then generate only if there is something safe to work with.
    pub async fn prepare_workout(
        &self,
        profile: &UserProfile,
        context: &DailyContext,
        feedback: Option<&SessionFeedback>,
    ) -> Result<WorkoutPlan> {
        let selection = self.select_safe(profile, context).await;

        if selection.candidates.is_empty() {
            let reason = match selection.failure {
                Some(e) => format!("exercise library unavailable ({})", e),
                None => "too many constraints (injuries + equipment); try fewer pain areas \
                         or more equipment"
                    .to_string(),
            };
            return Err(AppError::NoSafeExercises(reason));
        }

        self.generate_session(profile, context, &selection.candidates, feedback)
            .await
    }
}
