// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Exercises returned by the safety query.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// An exercise already confirmed equipment-compatible and injury-safe.
///
/// Equipment and body-part tags stay in the graph; the generator only ever
/// sees the name and the video reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct CandidateExercise {
    pub name: String,
    pub video: Option<String>,
}
