// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Workout generation from safe candidates.
//!
//! The model only ever sees candidate names and videos; safety has already
//! been decided by the selector. Every exercise in the returned plan is
//! checked against the candidate set before the plan is handed out.

use crate::config::PlanPolicy;
use crate::error::{AppError, Result};
use crate::models::{
    CandidateExercise, DailyContext, ExerciseInstance, Phase, SessionFeedback, UserProfile,
    WorkoutPlan,
};
use crate::services::llm::{CompletionRequest, LanguageModel};
use serde::{Deserialize, Deserializer};
use std::collections::HashMap;
use std::sync::Arc;

/// Assembles a three-phase workout with the language model.
#[derive(Clone)]
pub struct SessionGenerator {
    model: Arc<dyn LanguageModel>,
    policy: PlanPolicy,
}

impl SessionGenerator {
    pub fn new(model: Arc<dyn LanguageModel>, policy: PlanPolicy) -> Self {
        Self { model, policy }
    }

    /// Generate a plan. Errors are recoverable; the caller may retry.
    pub async fn generate(
        &self,
        profile: &UserProfile,
        context: &DailyContext,
        candidates: &[CandidateExercise],
        feedback: Option<&SessionFeedback>,
    ) -> Result<WorkoutPlan> {
        if candidates.is_empty() {
            return Err(AppError::NoSafeExercises(
                "no candidate exercises to build a session from".to_string(),
            ));
        }

        let request = CompletionRequest {
            model: None,
            system: system_prompt(),
            user: user_prompt(profile, context, candidates, feedback)?,
            temperature: 0.5,
            json_mode: true,
        };

        let value = self.model.complete(&request).await?;
        let plan = plan_from_value(value, candidates, self.policy)?;
        tracing::info!(
            warmup = plan.warmup.len(),
            body = plan.body.len(),
            cooldown = plan.cooldown.len(),
            "Workout generated"
        );
        Ok(plan)
    }
}

/// Parse a model answer and check it against the candidate set.
pub fn plan_from_value(
    value: serde_json::Value,
    candidates: &[CandidateExercise],
    policy: PlanPolicy,
) -> Result<WorkoutPlan> {
    let raw: RawPlan = serde_json::from_value(value).map_err(|e| {
        AppError::LanguageModel(format!("Plan does not match the expected shape: {}", e))
    })?;
    validate_plan(raw, candidates, policy)
}

/// Check a raw plan against the candidate set and build the final plan.
///
/// Names are matched exactly, then case-insensitively; matched exercises take
/// the candidate's spelling and video. Unknown names and exercises without an
/// instruction are dropped under [`PlanPolicy::Filter`] and reject the plan
/// under [`PlanPolicy::Strict`]. A plan with an empty main body is rejected
/// under both.
fn validate_plan(
    raw: RawPlan,
    candidates: &[CandidateExercise],
    policy: PlanPolicy,
) -> Result<WorkoutPlan> {
    let exact: HashMap<&str, &CandidateExercise> =
        candidates.iter().map(|c| (c.name.as_str(), c)).collect();
    let folded: HashMap<String, &CandidateExercise> = candidates
        .iter()
        .map(|c| (c.name.trim().to_lowercase(), c))
        .collect();

    let check_phase = |phase: Phase, exercises: Vec<RawExercise>| {
        let mut kept = Vec::with_capacity(exercises.len());
        for ex in exercises {
            let candidate = exact
                .get(ex.name.as_str())
                .or_else(|| folded.get(&ex.name.trim().to_lowercase()))
                .copied();
            let instruction = ex.instruction.trim();

            let problem = match candidate {
                None => Some(format!("'{}' is not a candidate exercise", ex.name)),
                Some(_) if instruction.is_empty() => {
                    Some(format!("'{}' has no instruction", ex.name))
                }
                Some(_) => None,
            };

            if let Some(problem) = problem {
                if policy == PlanPolicy::Strict {
                    return Err(AppError::InvalidPlan(problem));
                }
                tracing::warn!(?phase, problem = %problem, "Dropping exercise from plan");
                continue;
            }

            if let Some(candidate) = candidate {
                kept.push(ExerciseInstance {
                    name: candidate.name.clone(),
                    sets: ex.sets,
                    reps: ex.reps,
                    duration_min: ex.duration_min,
                    video: candidate.video.clone(),
                    instruction: instruction.to_string(),
                });
            }
        }
        Ok(kept)
    };

    let warmup = check_phase(Phase::Warmup, raw.session.warmup)?;
    let body = check_phase(Phase::Body, raw.session.body)?;
    let cooldown = check_phase(Phase::Cooldown, raw.session.cooldown)?;

    if body.is_empty() {
        return Err(AppError::InvalidPlan(
            "main body has no valid exercises".to_string(),
        ));
    }

    Ok(WorkoutPlan {
        strategy: raw
            .strategy
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        warmup,
        body,
        cooldown,
        closing_remark: raw.closing_remark.trim().to_string(),
    })
}

fn system_prompt() -> String {
    "You are an elite strength and conditioning coach. You build personalised \
     sessions from a list of exercises that have already been checked for safety. \
     You answer ONLY with valid JSON (no text around it) with this structure: \
     strategie (list of sentences), seance.echauffement / seance.corps / \
     seance.retour_calme (lists of exercises), mot_fin (string). Every exercise \
     has the keys name, sets, reps, duration_min, video, instruction."
        .to_string()
}

fn user_prompt(
    profile: &UserProfile,
    context: &DailyContext,
    candidates: &[CandidateExercise],
    feedback: Option<&SessionFeedback>,
) -> Result<String> {
    let feedback_json = match feedback {
        Some(f) => serde_json::to_string(f),
        None => Ok("{}".to_string()),
    }
    .map_err(|e| AppError::Internal(e.into()))?;
    let candidates_json =
        serde_json::to_string(candidates).map_err(|e| AppError::Internal(e.into()))?;

    Ok(format!(
        r#"CLIENT:
- Age: {age}
- Level: {level}
- Goals: {goals}
- Available equipment: {equipment}
- Health constraints (profile): {injuries}

TODAY:
- Energy (1-10): {energy}
- Available time (minutes): {time}
- Pain today: {pain}
- Note from the client: "{note}"

LAST SESSION FEEDBACK (JSON):
{feedback}

SAFE EXERCISES AVAILABLE (use ONLY exercises from this list, with the exact name):
{candidates}

YOUR TASK:
1. Build a coherent, safe session in exactly 3 parts: warm-up, main body, cool-down.
2. Adapt intensity and volume to the level, today's energy, today's pain, the last feedback and the available time.
3. For every exercise, pick it from the list above and return an object with:
   - name (string, exactly as listed)
   - sets (int or null)
   - reps (string or null)
   - duration_min (int or null)
   - video (string or null, copied from the list)
   - instruction (string in French, clear and reassuring)

ANSWER FORMAT:
Return ONLY JSON with the keys:
- strategie: list of 2 to 4 sentences in French explaining how the session was adapted
- seance: object with the keys "echauffement", "corps", "retour_calme" (each a list of exercises)
- mot_fin: one short, positive closing sentence in French"#,
        age = profile.age,
        level = profile.level,
        goals = profile.goals.join(", "),
        equipment = profile.equipment.join(", "),
        injuries = profile.injuries.join(", "),
        energy = context.energy,
        time = context.time_minutes,
        pain = context.daily_pain.join(", "),
        note = context.note,
        feedback = feedback_json,
        candidates = candidates_json,
    ))
}

// Model wire format. Field names follow the prompt; English aliases are
// accepted because some models translate keys.

#[derive(Debug, Deserialize)]
struct RawPlan {
    #[serde(
        default,
        rename = "strategie",
        alias = "strategy",
        deserialize_with = "lenient_strings"
    )]
    strategy: Vec<String>,
    #[serde(default, rename = "seance", alias = "session")]
    session: RawSession,
    #[serde(default, rename = "mot_fin", alias = "closing_remark")]
    closing_remark: String,
}

#[derive(Debug, Default, Deserialize)]
struct RawSession {
    #[serde(default, rename = "echauffement", alias = "warmup")]
    warmup: Vec<RawExercise>,
    #[serde(default, rename = "corps", alias = "body")]
    body: Vec<RawExercise>,
    #[serde(default, rename = "retour_calme", alias = "cooldown")]
    cooldown: Vec<RawExercise>,
}

#[derive(Debug, Deserialize)]
struct RawExercise {
    #[serde(default, deserialize_with = "lenient_text")]
    name: String,
    #[serde(default, deserialize_with = "lenient_u32")]
    sets: Option<u32>,
    #[serde(default, deserialize_with = "lenient_string")]
    reps: Option<String>,
    #[serde(default, deserialize_with = "lenient_u32")]
    duration_min: Option<u32>,
    #[serde(default, deserialize_with = "lenient_text")]
    instruction: String,
}

/// Accept 3, 3.0 or "3"; anything else is treated as absent.
fn lenient_u32<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Option<u32>, D::Error> {
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f.round() as u64))
            .and_then(|n| u32::try_from(n).ok()),
        Some(serde_json::Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

/// Accept "8-12" or 10; blank strings are absent.
fn lenient_string<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Option<String>, D::Error> {
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Like `lenient_string`, but null or junk becomes an empty string so the
/// instance is dropped by plan validation rather than failing the plan.
fn lenient_text<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<String, D::Error> {
    Ok(lenient_string(deserializer)?.unwrap_or_default())
}

/// Accept a list of strings or a single string.
fn lenient_strings<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Vec<String>, D::Error> {
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Array(items)) => items
            .into_iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect(),
        Some(serde_json::Value::String(s)) => vec![s],
        _ => Vec::new(),
    })
}
