// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User profile built during onboarding.

use crate::taxonomy;
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use std::borrow::Cow;
use validator::{Validate, ValidationError};

/// Training experience level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum ExperienceLevel {
    Beginner,
    Intermediate,
    Advanced,
}

impl std::fmt::Display for ExperienceLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ExperienceLevel::Beginner => "Beginner",
            ExperienceLevel::Intermediate => "Intermediate",
            ExperienceLevel::Advanced => "Advanced",
        };
        f.write_str(label)
    }
}

/// Structured profile used for selection and generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct UserProfile {
    #[validate(range(min = 18, max = 90))]
    pub age: u8,
    pub level: ExperienceLevel,
    /// Equipment tags from the taxonomy
    #[validate(length(max = 12), custom(function = "known_equipment"))]
    pub equipment: Vec<String>,
    /// Injury tags from the taxonomy (may be the "Aucune" sentinel)
    #[validate(length(max = 6), custom(function = "known_injuries"))]
    pub injuries: Vec<String>,
    /// Short free-text goal labels, in the order given
    #[validate(length(max = 10))]
    pub goals: Vec<String>,
    #[validate(range(min = 1, max = 7))]
    pub sessions_per_week: u8,
}

impl UserProfile {
    /// Replace the extracted parts of the profile, keeping age and level.
    pub fn apply_extraction(&mut self, extracted: &ExtractedProfile) {
        self.equipment = extracted.equipment.clone();
        self.injuries = extracted.injuries.clone();
        self.goals = extracted.goals.clone();
    }
}

/// Reject equipment tags outside the taxonomy.
pub(crate) fn known_equipment(tags: &[String]) -> Result<(), ValidationError> {
    match tags.iter().find(|t| !taxonomy::is_equipment(t)) {
        Some(tag) => Err(unknown_tag("unknown_equipment", tag)),
        None => Ok(()),
    }
}

/// Reject injury tags outside the taxonomy. An unknown label would ban
/// nothing, so it must never reach selection.
pub(crate) fn known_injuries(tags: &[String]) -> Result<(), ValidationError> {
    match tags.iter().find(|t| !taxonomy::is_injury(t)) {
        Some(tag) => Err(unknown_tag("unknown_injury", tag)),
        None => Ok(()),
    }
}

fn unknown_tag(code: &'static str, tag: &str) -> ValidationError {
    ValidationError::new(code).with_message(Cow::Owned(format!("Unknown tag '{}'", tag)))
}

/// The part of the profile produced by the language model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ExtractedProfile {
    pub equipment: Vec<String>,
    pub injuries: Vec<String>,
    pub goals: Vec<String>,
}

impl Default for ExtractedProfile {
    /// The safe fallback used whenever extraction fails.
    fn default() -> Self {
        Self {
            equipment: vec![taxonomy::DEFAULT_EQUIPMENT.to_string()],
            injuries: vec![taxonomy::DEFAULT_INJURY.to_string()],
            goals: vec![taxonomy::DEFAULT_GOAL.to_string()],
        }
    }
}
