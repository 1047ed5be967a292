// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Per-user coaching flow as an explicit state machine.
//!
//! The machine is synchronous. Transitions that need the pipeline are split
//! in two: `apply` returns a [`Transition`] describing the work, and the host
//! reports the outcome with `complete_extraction` or `complete_workout`.

use crate::error::AppError;
use crate::models::{
    DailyContext, ExperienceLevel, ExtractedProfile, SessionFeedback, UserProfile, WorkoutPlan,
};
use crate::services::extractor::compose_onboarding_text;
use crate::taxonomy::TrainingHistory;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

const MIN_GOALS_CHARS: usize = 10;
const MIN_EQUIPMENT_CHARS: usize = 5;
const MAX_ANSWER_CHARS: usize = 2000;
const DEFAULT_SESSIONS_PER_WEEK: u8 = 3;

/// Onboarding wizard steps, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OnboardingStep {
    Intro,
    Goals,
    Equipment,
    SchedulePain,
    Loading,
    Summary,
}

/// Where the user currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "page", rename_all = "snake_case")]
pub enum Stage {
    Onboarding { step: OnboardingStep },
    Home,
    CheckIn,
    Workout,
    Feedback,
}

impl Stage {
    fn onboarding(step: OnboardingStep) -> Self {
        Stage::Onboarding { step }
    }
}

/// Raw onboarding answers, kept so the user can go back and edit them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OnboardingAnswers {
    pub goals: String,
    pub equipment: String,
    pub sessions_per_week: u8,
    pub pain: String,
}

impl Default for OnboardingAnswers {
    fn default() -> Self {
        Self {
            goals: String::new(),
            equipment: String::new(),
            sessions_per_week: DEFAULT_SESSIONS_PER_WEEK,
            pain: String::new(),
        }
    }
}

/// Something the user did.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FlowEvent {
    SubmitIntro {
        age: u8,
        experience: TrainingHistory,
    },
    SubmitGoals {
        text: String,
    },
    SubmitEquipment {
        text: String,
    },
    Back,
    SubmitSchedule {
        sessions_per_week: u8,
        #[serde(default)]
        pain: String,
    },
    ConfirmProfile {
        correct: bool,
        #[serde(default)]
        correction_note: Option<String>,
    },
    RestartOnboarding,
    GoHome,
    StartCheckin,
    CheckIn(DailyContext),
    FinishWorkout,
    SubmitFeedback(SessionFeedback),
}

impl FlowEvent {
    fn name(&self) -> &'static str {
        match self {
            FlowEvent::SubmitIntro { .. } => "submit_intro",
            FlowEvent::SubmitGoals { .. } => "submit_goals",
            FlowEvent::SubmitEquipment { .. } => "submit_equipment",
            FlowEvent::Back => "back",
            FlowEvent::SubmitSchedule { .. } => "submit_schedule",
            FlowEvent::ConfirmProfile { .. } => "confirm_profile",
            FlowEvent::RestartOnboarding => "restart_onboarding",
            FlowEvent::GoHome => "go_home",
            FlowEvent::StartCheckin => "start_checkin",
            FlowEvent::CheckIn(_) => "check_in",
            FlowEvent::FinishWorkout => "finish_workout",
            FlowEvent::SubmitFeedback(_) => "submit_feedback",
        }
    }
}

/// Pipeline work the host must perform after a transition.
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    /// Nothing else to do.
    Done,
    /// Run profile extraction on this text, then call `complete_extraction`.
    NeedsExtraction { text: String },
    /// Select candidates and generate a plan, then call `complete_workout`.
    NeedsWorkout {
        profile: UserProfile,
        context: DailyContext,
        feedback: Option<SessionFeedback>,
    },
}

/// Flow errors, all caused by the caller.
#[derive(Debug, thiserror::Error)]
pub enum FlowError {
    #[error("'{event}' is not allowed in stage {stage:?}")]
    InvalidTransition { event: &'static str, stage: Stage },

    #[error("{0}")]
    Invalid(String),

    #[error("Profile is not configured yet")]
    ProfileMissing,
}

impl From<FlowError> for AppError {
    fn from(err: FlowError) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

/// One user's coaching session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoachSession {
    pub id: Uuid,
    pub stage: Stage,
    pub answers: OnboardingAnswers,
    /// Profile being built by the current onboarding run
    pub draft: Option<UserProfile>,
    /// What the model understood from the onboarding answers
    pub analysis: Option<ExtractedProfile>,
    /// Whether the last extraction fell back to defaults
    pub analysis_degraded: bool,
    /// Confirmed profile used for check-ins
    pub profile: Option<UserProfile>,
    pub correction_note: Option<String>,
    /// Plan on display; replaced only by a successful generation
    pub workout: Option<WorkoutPlan>,
    pub session_minutes: Option<u32>,
    pub last_feedback: Option<SessionFeedback>,
    pub sessions_done: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CoachSession {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            stage: Stage::onboarding(OnboardingStep::Intro),
            answers: OnboardingAnswers::default(),
            draft: None,
            analysis: None,
            analysis_degraded: false,
            profile: None,
            correction_note: None,
            workout: None,
            session_minutes: None,
            last_feedback: None,
            sessions_done: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a user event.
    pub fn apply(&mut self, event: FlowEvent) -> Result<Transition, FlowError> {
        use OnboardingStep::*;

        let name = event.name();
        let invalid = |stage| FlowError::InvalidTransition { event: name, stage };

        let transition = match (self.stage, event) {
            (Stage::Onboarding { step: Intro }, FlowEvent::SubmitIntro { age, experience }) => {
                if !(18..=90).contains(&age) {
                    return Err(FlowError::Invalid(
                        "Age must be between 18 and 90".to_string(),
                    ));
                }
                self.draft = Some(UserProfile {
                    age,
                    level: experience.level(),
                    equipment: Vec::new(),
                    injuries: Vec::new(),
                    goals: Vec::new(),
                    sessions_per_week: self.answers.sessions_per_week,
                });
                self.stage = Stage::onboarding(Goals);
                Transition::Done
            }
            (Stage::Onboarding { step: Goals }, FlowEvent::SubmitGoals { text }) => {
                self.answers.goals = check_answer(text, MIN_GOALS_CHARS, "goals")?;
                self.stage = Stage::onboarding(Equipment);
                Transition::Done
            }
            (Stage::Onboarding { step: Equipment }, FlowEvent::SubmitEquipment { text }) => {
                self.answers.equipment = check_answer(text, MIN_EQUIPMENT_CHARS, "equipment")?;
                self.stage = Stage::onboarding(SchedulePain);
                Transition::Done
            }
            (Stage::Onboarding { step: Equipment }, FlowEvent::Back) => {
                self.stage = Stage::onboarding(Goals);
                Transition::Done
            }
            (Stage::Onboarding { step: SchedulePain | Loading }, FlowEvent::Back) => {
                self.stage = Stage::onboarding(Equipment);
                Transition::Done
            }
            // Loading is re-enterable: a request dropped mid-extraction
            // leaves the stage there with nothing left to complete it.
            (
                Stage::Onboarding {
                    step: SchedulePain | Loading,
                },
                FlowEvent::SubmitSchedule {
                    sessions_per_week,
                    pain,
                },
            ) => {
                if !(1..=7).contains(&sessions_per_week) {
                    return Err(FlowError::Invalid(
                        "Sessions per week must be between 1 and 7".to_string(),
                    ));
                }
                if pain.chars().count() > MAX_ANSWER_CHARS {
                    return Err(FlowError::Invalid("Pain description is too long".to_string()));
                }
                self.answers.sessions_per_week = sessions_per_week;
                self.answers.pain = pain;
                self.stage = Stage::onboarding(Loading);
                Transition::NeedsExtraction {
                    text: compose_onboarding_text(
                        &self.answers.goals,
                        &self.answers.equipment,
                        self.answers.sessions_per_week,
                        &self.answers.pain,
                    ),
                }
            }
            (
                Stage::Onboarding { step: Summary },
                FlowEvent::ConfirmProfile {
                    correct,
                    correction_note,
                },
            ) => {
                let draft = self.draft.take().ok_or(FlowError::ProfileMissing)?;
                self.profile = Some(draft);
                self.correction_note = if correct {
                    None
                } else {
                    correction_note
                        .map(|n| n.trim().to_string())
                        .filter(|n| !n.is_empty())
                };
                self.stage = Stage::CheckIn;
                Transition::Done
            }
            (
                Stage::Home
                | Stage::CheckIn
                | Stage::Feedback
                | Stage::Onboarding { step: Loading },
                FlowEvent::RestartOnboarding,
            ) => {
                self.draft = None;
                self.stage = Stage::onboarding(Intro);
                Transition::Done
            }
            (Stage::Onboarding { .. }, FlowEvent::GoHome) => {
                if self.profile.is_none() {
                    return Err(FlowError::ProfileMissing);
                }
                self.draft = None;
                self.stage = Stage::Home;
                Transition::Done
            }
            (Stage::CheckIn, FlowEvent::GoHome) => {
                self.stage = Stage::Home;
                Transition::Done
            }
            (Stage::Home, FlowEvent::StartCheckin) => {
                if self.profile.is_none() {
                    return Err(FlowError::ProfileMissing);
                }
                self.stage = Stage::CheckIn;
                Transition::Done
            }
            (Stage::CheckIn, FlowEvent::CheckIn(context)) => {
                context
                    .validate()
                    .map_err(|e| FlowError::Invalid(e.to_string()))?;
                let profile = self.profile.clone().ok_or(FlowError::ProfileMissing)?;
                Transition::NeedsWorkout {
                    profile,
                    context,
                    feedback: self.last_feedback.clone(),
                }
            }
            (Stage::Workout, FlowEvent::FinishWorkout) => {
                self.stage = Stage::Feedback;
                Transition::Done
            }
            (Stage::Feedback, FlowEvent::SubmitFeedback(feedback)) => {
                feedback
                    .validate()
                    .map_err(|e| FlowError::Invalid(e.to_string()))?;
                self.last_feedback = Some(feedback);
                self.sessions_done += 1;
                self.stage = Stage::Home;
                Transition::Done
            }
            (stage, _) => return Err(invalid(stage)),
        };

        self.updated_at = Utc::now();
        Ok(transition)
    }

    /// Record the extraction result and move on to the summary.
    pub fn complete_extraction(
        &mut self,
        extracted: ExtractedProfile,
        degraded: bool,
    ) -> Result<(), FlowError> {
        if self.stage != Stage::onboarding(OnboardingStep::Loading) {
            return Err(FlowError::InvalidTransition {
                event: "complete_extraction",
                stage: self.stage,
            });
        }

        let draft = self.draft.get_or_insert_with(|| UserProfile {
            age: 30,
            level: ExperienceLevel::Beginner,
            equipment: Vec::new(),
            injuries: Vec::new(),
            goals: Vec::new(),
            sessions_per_week: DEFAULT_SESSIONS_PER_WEEK,
        });
        draft.apply_extraction(&extracted);
        draft.sessions_per_week = self.answers.sessions_per_week;

        self.analysis = Some(extracted);
        self.analysis_degraded = degraded;
        self.stage = Stage::onboarding(OnboardingStep::Summary);
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Record a generation attempt. Failures leave the session untouched.
    pub fn complete_workout(
        &mut self,
        outcome: Result<WorkoutPlan, AppError>,
        minutes: u32,
    ) -> Result<(), AppError> {
        if self.stage != Stage::CheckIn {
            return Err(FlowError::InvalidTransition {
                event: "complete_workout",
                stage: self.stage,
            }
            .into());
        }

        let plan = outcome?;
        self.workout = Some(plan);
        self.session_minutes = Some(minutes);
        self.stage = Stage::Workout;
        self.updated_at = Utc::now();
        Ok(())
    }
}

impl Default for CoachSession {
    fn default() -> Self {
        Self::new()
    }
}

/// Trim an answer and require a minimum amount of text.
fn check_answer(text: String, min_chars: usize, what: &str) -> Result<String, FlowError> {
    let trimmed = text.trim();
    let count = trimmed.chars().count();
    if count < min_chars {
        return Err(FlowError::Invalid(format!(
            "Tell me a bit more about your {} (at least {} characters)",
            what, min_chars
        )));
    }
    if count > MAX_ANSWER_CHARS {
        return Err(FlowError::Invalid(format!("Answer about {} is too long", what)));
    }
    Ok(trimmed.to_string())
}
