// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for the application.

pub mod context;
pub mod exercise;
pub mod feedback;
pub mod flow;
pub mod plan;
pub mod profile;

pub use context::DailyContext;
pub use exercise::CandidateExercise;
pub use feedback::{Difficulty, SessionFeedback};
pub use flow::{CoachSession, FlowEvent, OnboardingStep, Stage, Transition};
pub use plan::{ExerciseInstance, Phase, WorkoutPlan};
pub use profile::{ExperienceLevel, ExtractedProfile, UserProfile};
