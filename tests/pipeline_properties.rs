// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! End-to-end pipeline behavior against an in-memory exercise graph.
//!
//! These tests verify that:
//! 1. Extraction always yields a complete profile, even on model failure
//! 2. Selection honors equipment and injury constraints
//! 3. Generation only ever returns candidate exercises
//! 4. An empty candidate list stops the pipeline before the model is called

use hybrid_coach::error::AppError;
use hybrid_coach::models::{DailyContext, ExperienceLevel, UserProfile};
use hybrid_coach::services::graph::MAX_CANDIDATES;
use hybrid_coach::taxonomy;
use serde_json::json;
use std::collections::HashSet;
use std::sync::Arc;

mod common;
use common::{pipeline, plan_json, InMemoryGraph, ScriptedModel, UnreachableGraph};

fn profile(equipment: &[&str], injuries: &[&str]) -> UserProfile {
    UserProfile {
        age: 35,
        level: ExperienceLevel::Beginner,
        equipment: equipment.iter().map(|s| s.to_string()).collect(),
        injuries: injuries.iter().map(|s| s.to_string()).collect(),
        goals: vec!["Forme".to_string()],
        sessions_per_week: 3,
    }
}

fn context(pain: &[&str]) -> DailyContext {
    DailyContext {
        energy: 6,
        time_minutes: 30,
        daily_pain: pain.iter().map(|s| s.to_string()).collect(),
        note: String::new(),
    }
}

// ─── Extraction ──────────────────────────────────────────────

#[tokio::test]
async fn test_extraction_always_complete() {
    let model = Arc::new(ScriptedModel::answering(vec![
        Ok(json!({"equipment": ["Dumbbell"], "injuries": [], "goals": []})),
        Ok(json!({})),
        Err(AppError::LanguageModel("connection reset".to_string())),
    ]));
    let pipeline = pipeline(model.clone(), Arc::new(InMemoryGraph::library()));

    for text in ["J'ai des haltères", "", "Je cours le dimanche"] {
        let extraction = pipeline.extract_profile(text).await;
        let p = &extraction.profile;
        assert!(!p.equipment.is_empty(), "equipment empty for {:?}", text);
        assert!(!p.injuries.is_empty(), "injuries empty for {:?}", text);
        assert!(!p.goals.is_empty(), "goals empty for {:?}", text);
        assert!(p.equipment.iter().all(|e| taxonomy::is_equipment(e)));
        assert!(p.injuries.iter().all(|i| taxonomy::is_injury(i)));
    }
    assert_eq!(model.calls(), 3);
}

#[tokio::test]
async fn test_malformed_extraction_degrades_to_defaults() {
    let model = Arc::new(ScriptedModel::answering(vec![Err(AppError::LanguageModel(
        "Completion is not valid JSON".to_string(),
    ))]));
    let pipeline = pipeline(model, Arc::new(InMemoryGraph::library()));

    let extraction = pipeline.extract_profile("I have a mat").await;

    assert!(extraction.is_degraded());
    assert_eq!(extraction.profile.equipment, vec!["Bodyweight"]);
    assert_eq!(extraction.profile.injuries, vec!["Aucune"]);
    assert_eq!(extraction.profile.goals, vec!["Forme"]);
}

#[tokio::test]
async fn test_extraction_prompt_is_deterministic() {
    let model = Arc::new(ScriptedModel::answering(vec![Ok(json!({}))]));
    let pipeline = pipeline(model.clone(), Arc::new(InMemoryGraph::library()));

    pipeline.extract_profile("Salle de sport 3 fois").await;

    let request = &model.requests()[0];
    assert_eq!(request.temperature, 0.0);
    assert!(request.json_mode);
    assert!(request.user.contains("Salle de sport 3 fois"));
}

// ─── Selection ───────────────────────────────────────────────

#[tokio::test]
async fn test_bodyweight_profile_only_gets_bodyweight_exercises() {
    let graph = Arc::new(InMemoryGraph::library());
    let pipeline = pipeline(Arc::new(ScriptedModel::new()), graph.clone());

    let selection = pipeline
        .select_safe(&profile(&["Bodyweight"], &["Aucune"]), &context(&[]))
        .await;

    assert!(!selection.candidates.is_empty());
    for candidate in &selection.candidates {
        for equipment in graph.equipment_of(&candidate.name) {
            assert!(
                equipment == "bodyweight" || equipment == "none",
                "{} needs {}",
                candidate.name,
                equipment
            );
        }
    }
    let names: HashSet<_> = selection.candidates.iter().map(|c| c.name.as_str()).collect();
    assert!(!names.contains("Step-up"), "secondary bench not owned");
    assert!(!names.contains("Legacy Crunch"), "old data-set version");
}

#[tokio::test]
async fn test_lower_back_pain_excludes_back_targets() {
    let graph = Arc::new(InMemoryGraph::library());
    let pipeline = pipeline(Arc::new(ScriptedModel::new()), graph.clone());

    let selection = pipeline
        .select_safe(
            &profile(&["Barbell", "Dumbbell"], &["Aucune"]),
            &context(&["Mal de dos (Lombaires)"]),
        )
        .await;

    let banned = ["spine", "lumbar", "vertebrae", "erector", "back"];
    assert!(!selection.candidates.is_empty());
    for candidate in &selection.candidates {
        for target in graph.targets_of(&candidate.name) {
            assert!(
                !banned.iter().any(|term| target.contains(term)),
                "{} targets {}",
                candidate.name,
                target
            );
        }
    }
}

#[tokio::test]
async fn test_all_injuries_with_no_match_is_empty_not_error() {
    let graph = Arc::new(InMemoryGraph::new(vec![
        common::node("Squat", "bodyweight", &[], &["Knee Joint"]),
        common::node("Bridge", "bodyweight", &[], &["Gluteus Maximus"]),
    ]));
    let pipeline = pipeline(Arc::new(ScriptedModel::new()), graph);
    let every_injury: Vec<&str> = taxonomy::injury_labels().collect();

    let selection = pipeline
        .select_safe(&profile(&["Bodyweight"], &every_injury), &context(&[]))
        .await;

    assert!(selection.candidates.is_empty());
    assert!(!selection.is_degraded());
}

#[tokio::test]
async fn test_results_capped_and_distinct() {
    let pipeline = pipeline(
        Arc::new(ScriptedModel::new()),
        Arc::new(InMemoryGraph::generated(120)),
    );

    let selection = pipeline
        .select_safe(&profile(&["Bodyweight"], &[]), &context(&[]))
        .await;

    assert_eq!(selection.candidates.len(), MAX_CANDIDATES);
    let names: HashSet<_> = selection.candidates.iter().map(|c| &c.name).collect();
    assert_eq!(names.len(), selection.candidates.len());
}

#[tokio::test]
async fn test_dumbbell_and_knee_scenario() {
    let graph = Arc::new(InMemoryGraph::library());
    let pipeline = pipeline(Arc::new(ScriptedModel::new()), graph.clone());

    let selection = pipeline
        .select_safe(&profile(&["Dumbbell"], &["Genoux"]), &context(&[]))
        .await;

    let names: HashSet<_> = selection.candidates.iter().map(|c| c.name.as_str()).collect();
    assert!(names.contains("Dumbbell Curl"));
    assert!(names.contains("Plank"));
    assert!(!names.contains("Goblet Squat"));
    assert!(!names.contains("Dumbbell Lunge"));
    assert!(!names.contains("Bodyweight Squat"));
    assert!(!names.contains("Dumbbell Bench Press"));
    assert!(!names.contains("Kettlebell Swing"));

    for candidate in &selection.candidates {
        for equipment in graph.equipment_of(&candidate.name) {
            assert!(["dumbbell", "bodyweight", "none"].contains(&equipment.as_str()));
        }
        for target in graph.targets_of(&candidate.name) {
            assert!(!["knee", "patella", "meniscus"].iter().any(|t| target.contains(t)));
        }
    }
}

#[tokio::test]
async fn test_selection_is_idempotent() {
    let graph = Arc::new(InMemoryGraph::library());
    let pipeline = pipeline(Arc::new(ScriptedModel::new()), graph.clone());
    let p = profile(&["Dumbbell", "Bench"], &["Épaules"]);
    let c = context(&["Hanches"]);

    let first = pipeline.select_safe(&p, &c).await;
    let second = pipeline.select_safe(&p, &c).await;

    assert_eq!(first.candidates, second.candidates);
    let queries = graph.queries();
    assert_eq!(queries.len(), 2);
    assert_eq!(queries[0], queries[1]);
}

#[tokio::test]
async fn test_unreachable_graph_degrades_to_empty() {
    let pipeline = pipeline(Arc::new(ScriptedModel::new()), Arc::new(UnreachableGraph));

    let selection = pipeline
        .select_safe(&profile(&["Dumbbell"], &[]), &context(&[]))
        .await;

    assert!(selection.candidates.is_empty());
    assert!(matches!(selection.failure, Some(AppError::GraphStore(_))));
}

// ─── Generation ──────────────────────────────────────────────

#[tokio::test]
async fn test_plan_only_contains_candidates() {
    let model = Arc::new(ScriptedModel::answering(vec![Ok(plan_json(
        &["Jumping Jack", "Burpee"],
        &["Dumbbell Curl", "Barbell Deadlift", "Plank"],
        &["Child Pose"],
    ))]));
    let graph = Arc::new(InMemoryGraph::library());
    let pipeline = pipeline(model.clone(), graph);
    let p = profile(&["Dumbbell"], &["Genoux"]);
    let c = context(&[]);

    let selection = pipeline.select_safe(&p, &c).await;
    let plan = pipeline
        .generate_session(&p, &c, &selection.candidates, None)
        .await
        .unwrap();

    let allowed: HashSet<_> = selection.candidates.iter().map(|c| c.name.as_str()).collect();
    assert!(plan.exercises().all(|e| allowed.contains(e.name.as_str())));
    assert_eq!(plan.exercise_count(), 4);

    let request = &model.requests()[0];
    assert_eq!(request.temperature, 0.5);
    assert!(!request.user.contains("Goblet Squat"));
}

#[tokio::test]
async fn test_empty_selection_skips_generation() {
    let model = Arc::new(ScriptedModel::answering(vec![Ok(plan_json(
        &[],
        &["Plank"],
        &[],
    ))]));
    let pipeline = pipeline(model.clone(), Arc::new(InMemoryGraph::new(Vec::new())));

    let err = pipeline
        .prepare_workout(&profile(&["Bodyweight"], &[]), &context(&[]), None)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::NoSafeExercises(msg) if msg.contains("constraints")));
    assert_eq!(model.calls(), 0);
}

#[tokio::test]
async fn test_graph_outage_reported_as_unavailable_library() {
    let model = Arc::new(ScriptedModel::new());
    let pipeline = pipeline(model.clone(), Arc::new(UnreachableGraph));

    let err = pipeline
        .prepare_workout(&profile(&["Bodyweight"], &[]), &context(&[]), None)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::NoSafeExercises(msg) if msg.contains("unavailable")));
    assert_eq!(model.calls(), 0);
}

#[tokio::test]
async fn test_generation_failure_is_an_error() {
    let model = Arc::new(ScriptedModel::answering(vec![Err(AppError::LanguageModel(
        AppError::LLM_RATE_LIMIT.to_string(),
    ))]));
    let pipeline = pipeline(model, Arc::new(InMemoryGraph::library()));

    let err = pipeline
        .prepare_workout(&profile(&["Bodyweight"], &[]), &context(&[]), None)
        .await
        .unwrap_err();

    assert!(err.is_retryable());
}
