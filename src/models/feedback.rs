// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Post-session feedback, the coach's only memory between sessions.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

/// Perceived difficulty on a five-point scale, easiest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum Difficulty {
    #[serde(rename = "Trop facile")]
    TooEasy,
    #[serde(rename = "Facile")]
    Easy,
    #[serde(rename = "Parfait")]
    Perfect,
    #[serde(rename = "Dur")]
    Hard,
    #[serde(rename = "Trop dur")]
    TooHard,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct SessionFeedback {
    pub difficulty: Difficulty,
    pub instructions_clear: bool,
    pub fit_for_need: bool,
    #[serde(default)]
    #[validate(length(max = 500))]
    pub note: String,
}
