// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Generated workout plan.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// One of the three structural sections of a workout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Warmup,
    Body,
    Cooldown,
}

/// A single exercise as prescribed in the plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ExerciseInstance {
    /// Always one of the candidate names supplied to the generator
    pub name: String,
    pub sets: Option<u32>,
    /// Free-form because schemes may be ranges ("8-12") or timed ("30s")
    pub reps: Option<String>,
    pub duration_min: Option<u32>,
    /// Copied from the matching candidate
    pub video: Option<String>,
    pub instruction: String,
}

/// A complete three-phase session. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct WorkoutPlan {
    /// Sentences explaining how the session was adapted
    pub strategy: Vec<String>,
    pub warmup: Vec<ExerciseInstance>,
    pub body: Vec<ExerciseInstance>,
    pub cooldown: Vec<ExerciseInstance>,
    pub closing_remark: String,
}

impl WorkoutPlan {
    pub fn phase(&self, phase: Phase) -> &[ExerciseInstance] {
        match phase {
            Phase::Warmup => &self.warmup,
            Phase::Body => &self.body,
            Phase::Cooldown => &self.cooldown,
        }
    }

    /// All exercises in session order.
    pub fn exercises(&self) -> impl Iterator<Item = &ExerciseInstance> {
        self.warmup
            .iter()
            .chain(self.body.iter())
            .chain(self.cooldown.iter())
    }

    pub fn exercise_count(&self) -> usize {
        self.warmup.len() + self.body.len() + self.cooldown.len()
    }
}
