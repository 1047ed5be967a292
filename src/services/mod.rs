// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod coach;
pub mod extractor;
pub mod generator;
pub mod graph;
pub mod llm;
pub mod selector;
pub mod sessions;

pub use coach::CoachPipeline;
pub use extractor::{Extraction, ProfileExtractor};
pub use generator::SessionGenerator;
pub use graph::{ExerciseStore, Neo4jClient, SafetyQuery};
pub use llm::{CompletionRequest, LanguageModel, OpenAiClient};
pub use selector::{SafeExerciseSelector, Selection};
pub use sessions::SessionStore;
