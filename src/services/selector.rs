// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Safe exercise selection.
//!
//! Builds the banned-term and allowed-equipment sets from the profile and
//! today's pains, runs the safety query, and enforces the result contract
//! (distinct names, at most [`MAX_CANDIDATES`]) regardless of what the store
//! returns.

use crate::error::AppError;
use crate::models::{CandidateExercise, DailyContext, UserProfile};
use crate::services::graph::{ExerciseStore, SafetyQuery, MAX_CANDIDATES};
use crate::taxonomy;
use std::collections::HashSet;
use std::sync::Arc;

/// Outcome of a selection. An empty list with no failure means the
/// constraints are unsatisfiable; `failure` means the store was unreachable.
#[derive(Debug)]
pub struct Selection {
    pub candidates: Vec<CandidateExercise>,
    pub failure: Option<AppError>,
}

impl Selection {
    pub fn unavailable(failure: AppError) -> Self {
        Self {
            candidates: Vec::new(),
            failure: Some(failure),
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.failure.is_some()
    }
}

/// Queries the exercise graph for candidates the user can safely do.
#[derive(Clone)]
pub struct SafeExerciseSelector {
    store: Arc<dyn ExerciseStore>,
    graph_tag: String,
}

impl SafeExerciseSelector {
    pub fn new(store: Arc<dyn ExerciseStore>, graph_tag: String) -> Self {
        Self { store, graph_tag }
    }

    /// Select candidates. Never fails: store errors degrade to an empty list.
    pub async fn select(&self, profile: &UserProfile, context: &DailyContext) -> Selection {
        let query = build_query(profile, context, &self.graph_tag);
        tracing::debug!(
            equipment = ?query.equipment,
            banned_terms = ?query.banned_terms,
            "Running safety query"
        );

        match self.store.safe_exercises(&query).await {
            Ok(rows) => {
                let candidates = dedupe_and_cap(rows);
                tracing::info!(count = candidates.len(), "Safe exercises selected");
                Selection {
                    candidates,
                    failure: None,
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Exercise graph unavailable");
                Selection::unavailable(e)
            }
        }
    }
}

/// Assemble the safety query parameters.
pub fn build_query(profile: &UserProfile, context: &DailyContext, graph_tag: &str) -> SafetyQuery {
    SafetyQuery {
        equipment: allowed_equipment(&profile.equipment),
        banned_terms: banned_terms(
            profile
                .injuries
                .iter()
                .chain(context.daily_pain.iter())
                .map(String::as_str),
        ),
        graph_tag: graph_tag.to_string(),
    }
}

/// Union of banned substrings for the given injury tags, first-seen order.
pub fn banned_terms<'a>(injuries: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut terms = Vec::new();
    for injury in injuries {
        for term in taxonomy::banned_terms_for(injury) {
            let term = term.to_lowercase();
            if !terms.contains(&term) {
                terms.push(term);
            }
        }
    }
    terms
}

/// Lowercased user equipment plus the universal fallbacks.
pub fn allowed_equipment(equipment: &[String]) -> Vec<String> {
    let mut allowed: Vec<String> = Vec::new();
    let fallbacks = taxonomy::UNIVERSAL_EQUIPMENT.iter().map(|e| e.to_string());
    for tag in equipment.iter().map(|e| e.trim().to_lowercase()).chain(fallbacks) {
        if !tag.is_empty() && !allowed.contains(&tag) {
            allowed.push(tag);
        }
    }
    allowed
}

/// Keep the first occurrence of each name and at most `MAX_CANDIDATES` rows.
pub fn dedupe_and_cap(rows: Vec<CandidateExercise>) -> Vec<CandidateExercise> {
    let mut seen = HashSet::new();
    rows.into_iter()
        .filter(|c| seen.insert(c.name.clone()))
        .take(MAX_CANDIDATES)
        .collect()
}
