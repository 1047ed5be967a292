// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Free text → structured profile.
//!
//! The model is asked for strict JSON restricted to the taxonomy. Whatever
//! comes back goes through [`apply_profile_defaults`], a pure function that
//! keeps only known tags and fills empty fields with safe defaults, so the
//! result is never empty and never undefined.

use crate::error::AppError;
use crate::models::ExtractedProfile;
use crate::services::llm::{CompletionRequest, LanguageModel};
use crate::taxonomy;
use std::sync::Arc;

const MAX_GOALS: usize = 10;
const MAX_GOAL_CHARS: usize = 60;

/// Outcome of an extraction. `failure` is set when defaults were used
/// because the model call failed.
#[derive(Debug)]
pub struct Extraction {
    pub profile: ExtractedProfile,
    pub failure: Option<AppError>,
}

impl Extraction {
    /// Default profile flagged with the failure that caused it.
    pub fn fallback(failure: AppError) -> Self {
        Self {
            profile: ExtractedProfile::default(),
            failure: Some(failure),
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.failure.is_some()
    }
}

/// Converts onboarding text into equipment, injuries and goals.
#[derive(Clone)]
pub struct ProfileExtractor {
    model: Arc<dyn LanguageModel>,
}

impl ProfileExtractor {
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self { model }
    }

    /// Extract a profile. Never fails: errors degrade to the default profile.
    pub async fn extract(&self, free_text: &str) -> Extraction {
        let request = CompletionRequest {
            model: None,
            system: system_prompt(),
            user: user_prompt(free_text),
            temperature: 0.0,
            json_mode: true,
        };

        match self.model.complete(&request).await {
            Ok(value) => {
                let profile = apply_profile_defaults(&value);
                tracing::info!(
                    equipment = ?profile.equipment,
                    injuries = ?profile.injuries,
                    goals = profile.goals.len(),
                    "Profile extracted"
                );
                Extraction {
                    profile,
                    failure: None,
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Profile extraction failed, using defaults");
                Extraction::fallback(e)
            }
        }
    }
}

/// Build the extraction input from the onboarding answers.
pub fn compose_onboarding_text(
    goals: &str,
    equipment: &str,
    sessions_per_week: u8,
    pain: &str,
) -> String {
    format!(
        "Sports goals: {}\nAvailable equipment: {}\nSessions wanted per week: {}\nPains / injuries: {}\n",
        goals.trim(),
        equipment.trim(),
        sessions_per_week,
        pain.trim()
    )
}

/// Normalize a (possibly partial) model answer into a complete profile.
///
/// Unknown equipment and injury labels are dropped, known ones take their
/// canonical spelling, duplicates are removed, and any list left empty gets
/// its default.
pub fn apply_profile_defaults(value: &serde_json::Value) -> ExtractedProfile {
    let mut equipment = Vec::new();
    for tag in string_list(value, "equipment") {
        if let Some(known) = taxonomy::canonical_equipment(&tag) {
            push_unique(&mut equipment, known.to_string());
        }
    }

    let mut injuries = Vec::new();
    for tag in string_list(value, "injuries") {
        if let Some(known) = taxonomy::canonical_injury(&tag) {
            push_unique(&mut injuries, known.to_string());
        }
    }
    // "none" next to a real injury is contradictory; the injury wins
    if injuries.len() > 1 {
        injuries.retain(|i| i != taxonomy::NO_INJURY);
    }

    let mut goals = Vec::new();
    for goal in string_list(value, "goals") {
        let goal: String = goal.trim().chars().take(MAX_GOAL_CHARS).collect();
        if !goal.is_empty() && goals.len() < MAX_GOALS {
            push_unique(&mut goals, goal);
        }
    }

    let defaults = ExtractedProfile::default();
    ExtractedProfile {
        equipment: non_empty_or(equipment, defaults.equipment),
        injuries: non_empty_or(injuries, defaults.injuries),
        goals: non_empty_or(goals, defaults.goals),
    }
}

/// Read a field as a list of strings; a bare string counts as one item.
fn string_list(value: &serde_json::Value, key: &str) -> Vec<String> {
    match value.get(key) {
        Some(serde_json::Value::Array(items)) => items
            .iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect(),
        Some(serde_json::Value::String(s)) => vec![s.clone()],
        _ => Vec::new(),
    }
}

fn push_unique(list: &mut Vec<String>, item: String) {
    if !list.iter().any(|existing| existing.eq_ignore_ascii_case(&item)) {
        list.push(item);
    }
}

fn non_empty_or(list: Vec<String>, fallback: Vec<String>) -> Vec<String> {
    if list.is_empty() {
        fallback
    } else {
        list
    }
}

fn system_prompt() -> String {
    "You are a sports data analyst. You read a client's description of themselves \
     and extract structured information. You answer ONLY with valid JSON containing \
     the fields 'equipment', 'injuries' and 'goals', each a list of strings."
        .to_string()
}

fn user_prompt(free_text: &str) -> String {
    let equipment = taxonomy::EQUIPMENT.join(", ");
    let injuries: Vec<&str> = taxonomy::injury_labels().collect();

    format!(
        r#"CLIENT TEXT: "{text}"

1. EQUIPMENT (exact values from: {equipment}).
   - If the client says they have nothing, no equipment, or train at home, use ["Bodyweight"].
   - If the client trains at a gym, use every value: {equipment}.
2. INJURIES (exact values from: {injuries}).
   - If nothing is mentioned, use ["{none}"].
3. GOALS (a few short labels in French, e.g. "Perte de gras", "Prise de muscle", "Mobilité").

ANSWER ONLY WITH JSON OF THE FORM:
{{
  "equipment": [...],
  "injuries": [...],
  "goals": [...]
}}"#,
        text = free_text,
        equipment = equipment,
        injuries = injuries.join(", "),
        none = taxonomy::NO_INJURY,
    )
}
