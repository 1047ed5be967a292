// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use async_trait::async_trait;
use hybrid_coach::config::Config;
use hybrid_coach::error::AppError;
use hybrid_coach::models::CandidateExercise;
use hybrid_coach::routes::create_router;
use hybrid_coach::services::graph::MAX_CANDIDATES;
use hybrid_coach::services::{
    CoachPipeline, CompletionRequest, ExerciseStore, LanguageModel, SafetyQuery, SessionStore,
};
use hybrid_coach::AppState;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const GRAPH_TAG: &str = "kg-label-v1";

/// An `Exercise` node with its `TARGETS` body parts.
#[derive(Debug, Clone)]
pub struct ExerciseNode {
    pub name: String,
    pub video: Option<String>,
    pub equipment: String,
    pub equipment_secondary: Option<Vec<String>>,
    pub graph_tag: String,
    pub targets: Vec<String>,
}

/// Build an exercise node tagged with the current data-set version.
#[allow(dead_code)]
pub fn node(name: &str, equipment: &str, secondary: &[&str], targets: &[&str]) -> ExerciseNode {
    ExerciseNode {
        name: name.to_string(),
        video: Some(format!("https://videos.example/{}", name.to_lowercase().replace(' ', "-"))),
        equipment: equipment.to_string(),
        equipment_secondary: if secondary.is_empty() {
            None
        } else {
            Some(secondary.iter().map(|s| s.to_string()).collect())
        },
        graph_tag: GRAPH_TAG.to_string(),
        targets: targets.iter().map(|s| s.to_string()).collect(),
    }
}

/// Exercise graph held in memory, filtered the way the Cypher query does.
pub struct InMemoryGraph {
    nodes: Vec<ExerciseNode>,
    queries: Mutex<Vec<SafetyQuery>>,
}

#[allow(dead_code)]
impl InMemoryGraph {
    pub fn new(nodes: Vec<ExerciseNode>) -> Self {
        Self {
            nodes,
            queries: Mutex::new(Vec::new()),
        }
    }

    /// A small library covering every equipment and injury category.
    pub fn library() -> Self {
        Self::new(vec![
            node("Jumping Jack", "bodyweight", &[], &["Cardiovascular System", "Calves"]),
            node("Push-up", "bodyweight", &[], &["Pectoralis Major", "Triceps", "Anterior Deltoid"]),
            node("Plank", "none", &[], &["Rectus Abdominis", "Transverse Abdominis"]),
            node("Dead Bug", "none", &[], &["Rectus Abdominis"]),
            node("Bodyweight Squat", "bodyweight", &[], &["Quadriceps", "Knee Joint"]),
            node("Glute Bridge", "bodyweight", &[], &["Gluteus Maximus", "Hamstrings"]),
            node("Superman", "bodyweight", &[], &["Lower Back", "Gluteus Maximus"]),
            node("Back Extension", "bodyweight", &[], &["Erector Spinae", "Lumbar Spine"]),
            node("Cat Cow", "none", &[], &["Thoracic Vertebrae"]),
            node("Neck Stretch", "none", &[], &["Neck", "Trapezius"]),
            node("Child Pose", "none", &[], &["Latissimus Dorsi"]),
            node("Goblet Squat", "Dumbbell", &[], &["Quadriceps", "Patella Tendon"]),
            node("Dumbbell Lunge", "Dumbbell", &[], &["Quadriceps", "Knee Joint"]),
            node("Dumbbell Curl", "Dumbbell", &[], &["Biceps Brachii"]),
            node("Dumbbell Floor Press", "Dumbbell", &["none"], &["Pectoralis Major", "Triceps"]),
            node("Dumbbell Bench Press", "Dumbbell", &["Bench"], &["Pectoralis Major"]),
            node("Step-up", "bodyweight", &["Bench"], &["Quadriceps", "Knee"]),
            node("Barbell Deadlift", "Barbell", &[], &["Erector Spinae", "Hamstrings"]),
            node("Kettlebell Swing", "Kettlebell", &[], &["Hamstrings", "Hip Flexors"]),
            node("Cable Face Pull", "Cable", &[], &["Rear Deltoid", "Rotator Cuff"]),
            ExerciseNode {
                graph_tag: "kg-label-v0".to_string(),
                ..node("Legacy Crunch", "none", &[], &["Rectus Abdominis"])
            },
        ])
    }

    /// `count` distinct bodyweight exercises with harmless targets.
    pub fn generated(count: usize) -> Self {
        Self::new(
            (0..count)
                .map(|i| node(&format!("Drill {}", i), "bodyweight", &[], &["Forearm Flexors"]))
                .collect(),
        )
    }

    pub fn queries(&self) -> Vec<SafetyQuery> {
        self.queries.lock().unwrap().clone()
    }

    fn matches(node: &ExerciseNode, query: &SafetyQuery) -> bool {
        let allowed = |tag: &str| query.equipment.iter().any(|e| *e == tag.to_lowercase());
        let secondary_ok = node
            .equipment_secondary
            .as_deref()
            .unwrap_or(&["none".to_string()][..])
            .iter()
            .all(|sec| allowed(sec) || sec.to_lowercase() == "none");
        let targets_safe = !node.targets.iter().any(|part| {
            let part = part.to_lowercase();
            query.banned_terms.iter().any(|term| part.contains(term.as_str()))
        });

        node.graph_tag == query.graph_tag && allowed(&node.equipment) && secondary_ok && targets_safe
    }

    /// Equipment recorded for an exercise, for assertions.
    pub fn equipment_of(&self, name: &str) -> Vec<String> {
        self.nodes
            .iter()
            .filter(|n| n.name == name)
            .flat_map(|n| {
                std::iter::once(n.equipment.to_lowercase()).chain(
                    n.equipment_secondary
                        .iter()
                        .flatten()
                        .map(|s| s.to_lowercase()),
                )
            })
            .collect()
    }

    /// Body parts targeted by an exercise, lowercased.
    pub fn targets_of(&self, name: &str) -> Vec<String> {
        self.nodes
            .iter()
            .filter(|n| n.name == name)
            .flat_map(|n| n.targets.iter().map(|t| t.to_lowercase()))
            .collect()
    }
}

#[async_trait]
impl ExerciseStore for InMemoryGraph {
    async fn safe_exercises(
        &self,
        query: &SafetyQuery,
    ) -> Result<Vec<CandidateExercise>, AppError> {
        self.queries.lock().unwrap().push(query.clone());

        let mut seen = Vec::new();
        let rows = self
            .nodes
            .iter()
            .filter(|n| Self::matches(n, query))
            .filter(|n| {
                let fresh = !seen.contains(&n.name);
                seen.push(n.name.clone());
                fresh
            })
            .take(MAX_CANDIDATES)
            .map(|n| CandidateExercise {
                name: n.name.clone(),
                video: n.video.clone(),
            })
            .collect();
        Ok(rows)
    }
}

/// A store that is always down.
#[allow(dead_code)]
pub struct UnreachableGraph;

#[async_trait]
impl ExerciseStore for UnreachableGraph {
    async fn safe_exercises(
        &self,
        _query: &SafetyQuery,
    ) -> Result<Vec<CandidateExercise>, AppError> {
        Err(AppError::GraphStore("connection refused".to_string()))
    }
}

/// Language model that replays canned answers in order.
#[derive(Default)]
pub struct ScriptedModel {
    answers: Mutex<VecDeque<Result<serde_json::Value, AppError>>>,
    requests: Mutex<Vec<CompletionRequest>>,
    delay: Option<Duration>,
}

#[allow(dead_code)]
impl ScriptedModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn answering(answers: Vec<Result<serde_json::Value, AppError>>) -> Self {
        Self {
            answers: Mutex::new(answers.into()),
            ..Self::default()
        }
    }

    /// Every call sleeps this long before answering.
    pub fn slow(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn push(&self, answer: Result<serde_json::Value, AppError>) {
        self.answers.lock().unwrap().push_back(answer);
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    async fn complete(&self, request: &CompletionRequest) -> Result<serde_json::Value, AppError> {
        self.requests.lock().unwrap().push(request.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.answers
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(AppError::LanguageModel("no scripted answer".to_string())))
    }
}

/// A model answer in the plan wire format.
#[allow(dead_code)]
pub fn plan_json(warmup: &[&str], body: &[&str], cooldown: &[&str]) -> serde_json::Value {
    let exercises = |names: &[&str]| -> Vec<serde_json::Value> {
        names
            .iter()
            .map(|name| {
                serde_json::json!({
                    "name": name,
                    "sets": 3,
                    "reps": "10",
                    "duration_min": null,
                    "video": null,
                    "instruction": "Gardez le dos neutre et respirez."
                })
            })
            .collect()
    };

    serde_json::json!({
        "strategie": ["Séance courte adaptée à ton énergie."],
        "seance": {
            "echauffement": exercises(warmup),
            "corps": exercises(body),
            "retour_calme": exercises(cooldown)
        },
        "mot_fin": "Bravo !"
    })
}

#[allow(dead_code)]
pub fn pipeline(model: Arc<ScriptedModel>, graph: Arc<dyn ExerciseStore>) -> CoachPipeline {
    CoachPipeline::from_config(&Config::test_default(), model, graph)
}

/// Create a test app over the given model and graph.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app_with(
    config: Config,
    model: Arc<ScriptedModel>,
    graph: Arc<dyn ExerciseStore>,
) -> (axum::Router, Arc<AppState>) {
    let pipeline = CoachPipeline::from_config(&config, model, graph);
    let state = Arc::new(AppState {
        config,
        pipeline,
        sessions: SessionStore::new(),
    });

    (create_router(state.clone()), state)
}

/// Create a test app with the sample library and a model with no answers.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    create_test_app_with(
        Config::test_default(),
        Arc::new(ScriptedModel::new()),
        Arc::new(InMemoryGraph::library()),
    )
}

/// Read a JSON response body.
#[allow(dead_code)]
pub async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}
