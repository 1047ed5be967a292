// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Same-day check-in data.

use super::profile::known_injuries;
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

/// How the user feels today; created fresh for every generated workout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct DailyContext {
    /// Energy level, 1 (exhausted) to 10 (on fire)
    #[validate(range(min = 1, max = 10))]
    pub energy: u8,
    /// Time available for the session, in minutes
    #[serde(alias = "time")]
    #[validate(range(min = 15, max = 90))]
    pub time_minutes: u32,
    /// Injury tags hurting today (may differ from the profile's injuries)
    #[serde(default)]
    #[validate(length(max = 6), custom(function = "known_injuries"))]
    pub daily_pain: Vec<String>,
    /// Free-text note for the coach
    #[serde(default)]
    #[validate(length(max = 500))]
    pub note: String,
}
