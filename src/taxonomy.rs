// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Static vocabularies shared by extraction and selection.
//!
//! The injury → banned-substring table is the ground truth for exercise
//! safety: a body part whose lowercased name contains one of these
//! substrings is considered to intersect that injury.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Recognized equipment tags.
pub const EQUIPMENT: &[&str] = &[
    "Barbell",
    "Dumbbell",
    "Kettlebell",
    "Machine",
    "Cable",
    "Bench",
    "Pull-up Bar",
    "Treadmill",
    "Rower",
    "Bands",
    "Foam Roll",
    "Bodyweight",
];

/// Sentinel injury meaning "no injury".
pub const NO_INJURY: &str = "Aucune";

/// Recognized injury categories and the anatomical substrings they ban.
pub const INJURIES: &[(&str, &[&str])] = &[
    (
        "Mal de dos (Lombaires)",
        &["spine", "lumbar", "vertebrae", "erector", "back"],
    ),
    ("Genoux", &["knee", "patella", "meniscus"]),
    ("Épaules", &["rotator", "shoulder", "deltoid"]),
    ("Hanches", &["hip", "gluteus", "pelvis", "piriformis"]),
    ("Cou / Cervicales", &["cervical", "neck", "trapezius"]),
    (NO_INJURY, &[]),
];

/// Equipment values every user is assumed to have.
pub const UNIVERSAL_EQUIPMENT: &[&str] = &["none", "bodyweight"];

/// Secondary-equipment sentinel meaning "nothing else required".
pub const NO_EQUIPMENT: &str = "none";

/// Extraction fallbacks.
pub const DEFAULT_EQUIPMENT: &str = "Bodyweight";
pub const DEFAULT_INJURY: &str = NO_INJURY;
pub const DEFAULT_GOAL: &str = "Forme";

/// Iterate over the injury category labels.
pub fn injury_labels() -> impl Iterator<Item = &'static str> {
    INJURIES.iter().map(|(label, _)| *label)
}

/// Canonical spelling of an equipment tag, matched case-insensitively.
pub fn canonical_equipment(tag: &str) -> Option<&'static str> {
    let tag = tag.trim();
    EQUIPMENT
        .iter()
        .copied()
        .find(|known| known.eq_ignore_ascii_case(tag))
}

/// Canonical spelling of an injury label, matched case-insensitively.
pub fn canonical_injury(tag: &str) -> Option<&'static str> {
    let tag = tag.trim().to_lowercase();
    injury_labels().find(|known| known.to_lowercase() == tag)
}

pub fn is_equipment(tag: &str) -> bool {
    canonical_equipment(tag).is_some()
}

pub fn is_injury(tag: &str) -> bool {
    canonical_injury(tag).is_some()
}

/// Banned substrings for one injury label. Unknown labels ban nothing.
pub fn banned_terms_for(injury: &str) -> &'static [&'static str] {
    canonical_injury(injury)
        .and_then(|label| INJURIES.iter().find(|(l, _)| *l == label))
        .map(|(_, terms)| *terms)
        .unwrap_or(&[])
}

/// How long the user has been training regularly (onboarding answer).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum TrainingHistory {
    JustStarted,
    UnderSixMonths,
    SixMonthsToTwoYears,
    TwoToFiveYears,
    OverFiveYears,
}

impl TrainingHistory {
    pub fn level(self) -> crate::models::ExperienceLevel {
        use crate::models::ExperienceLevel;
        match self {
            TrainingHistory::JustStarted | TrainingHistory::UnderSixMonths => {
                ExperienceLevel::Beginner
            }
            TrainingHistory::SixMonthsToTwoYears | TrainingHistory::TwoToFiveYears => {
                ExperienceLevel::Intermediate
            }
            TrainingHistory::OverFiveYears => ExperienceLevel::Advanced,
        }
    }
}
