// src/session/results.rs

use std::sync::Arc;

use crate::{
    api::VerificationClient,
    error::AppError,
    models::{
        attempt::{AnswerResult, GradedResult},
        test::{Question, SkillTest},
    },
    session::{
        clock::Clock,
        controller::{TestSession, UnansweredPolicy},
    },
};

/// Score (0-100) at or above which an attempt counts as passed and the
/// skill becomes eligible for verification.
pub const PASSING_SCORE: u32 = 80;

/// Lifecycle of the add-to-resume call on the results screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationState {
    /// Nothing sent yet.
    Idle,
    /// Request in flight. Further attempts are suppressed until it
    /// resolves.
    InFlight,
    /// The skill is on the profile, either just added or found already
    /// verified.
    Verified,
    /// The last attempt failed and may be retried.
    Failed(String),
}

/// Traffic-light banding for score readouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreBand {
    High,
    Medium,
    Low,
}

impl ScoreBand {
    /// Banding used on the results screen.
    pub fn for_result(score: u32) -> Self {
        if score >= 80 {
            ScoreBand::High
        } else if score >= 60 {
            ScoreBand::Medium
        } else {
            ScoreBand::Low
        }
    }

    /// Banding used on completed-test history cards, which cuts lower.
    pub fn for_history(score: u32) -> Self {
        if score > 70 {
            ScoreBand::High
        } else if score > 40 {
            ScoreBand::Medium
        } else {
            ScoreBand::Low
        }
    }
}

/// How one option of a reviewed question should be highlighted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionMark {
    /// The grader says this is the right answer.
    CorrectAnswer,
    /// The user picked this one and it was wrong.
    WrongSelection,
    Plain,
}

/// One graded question joined back to its definition.
pub struct QuestionReview<'a> {
    pub question: &'a Question,
    pub outcome: &'a AnswerResult,
}

impl QuestionReview<'_> {
    pub fn was_answered(&self) -> bool {
        self.outcome.selected_option >= 0
    }

    pub fn option_mark(&self, option_index: usize) -> OptionMark {
        if self.outcome.correct_answer == Some(option_index as u32) {
            return OptionMark::CorrectAnswer;
        }
        if !self.outcome.is_correct && self.outcome.selected_option == option_index as i32 {
            return OptionMark::WrongSelection;
        }
        OptionMark::Plain
    }
}

/// Reconciles a graded result with the test it came from and drives the
/// verified-skill follow-up.
pub struct ResultReview {
    test: Arc<SkillTest>,
    result: GradedResult,
    verification: VerificationState,
}

impl ResultReview {
    pub fn new(test: Arc<SkillTest>, result: GradedResult) -> Self {
        Self {
            test,
            result,
            verification: VerificationState::Idle,
        }
    }

    pub fn test(&self) -> &SkillTest {
        &self.test
    }

    pub fn result(&self) -> &GradedResult {
        &self.result
    }

    pub fn score(&self) -> u32 {
        self.result.score
    }

    /// Pass verdict against the local threshold. The boundary is
    /// inclusive: a score of exactly `PASSING_SCORE` passes.
    pub fn is_passed(&self) -> bool {
        self.result.score >= PASSING_SCORE
    }

    /// The grader's own verdict, kept alongside the local threshold so a
    /// disagreement is visible to callers.
    pub fn server_passed(&self) -> bool {
        self.result.passed
    }

    pub fn score_band(&self) -> ScoreBand {
        ScoreBand::for_result(self.result.score)
    }

    pub fn correct_answers(&self) -> u32 {
        self.result.correct_answers
    }

    pub fn total_questions(&self) -> u32 {
        self.result.total_questions
    }

    /// Correct-answer ratio as a percentage, for the results bar.
    pub fn correct_ratio_percent(&self) -> f64 {
        if self.result.total_questions == 0 {
            return 0.0;
        }
        self.result.correct_answers as f64 / self.result.total_questions as f64 * 100.0
    }

    pub fn completion_secs(&self) -> u64 {
        self.result.completion_time
    }

    /// Joins each graded entry back to its question definition. Entries
    /// whose question id no longer resolves are skipped rather than
    /// invented.
    pub fn review(&self) -> Vec<QuestionReview<'_>> {
        self.result
            .results
            .iter()
            .filter_map(|outcome| {
                let question = self
                    .test
                    .questions
                    .iter()
                    .find(|q| q.id == outcome.question_id)?;
                Some(QuestionReview { question, outcome })
            })
            .collect()
    }

    pub fn verification(&self) -> &VerificationState {
        &self.verification
    }

    pub fn is_verified(&self) -> bool {
        self.verification == VerificationState::Verified
    }

    /// True when the add-to-resume action should be offered.
    pub fn can_add_to_resume(&self) -> bool {
        self.is_passed()
            && matches!(
                self.verification,
                VerificationState::Idle | VerificationState::Failed(_)
            )
    }

    /// Claims the in-flight slot for a verification request. Returns false
    /// when a request is already running or the skill is verified, so a
    /// second click sends nothing.
    pub fn begin_verification(&mut self) -> Result<bool, AppError> {
        if !self.is_passed() {
            return Err(AppError::InvalidState(
                "only passed tests can be added to the profile".to_string(),
            ));
        }
        match self.verification {
            VerificationState::InFlight | VerificationState::Verified => Ok(false),
            VerificationState::Idle | VerificationState::Failed(_) => {
                self.verification = VerificationState::InFlight;
                Ok(true)
            }
        }
    }

    pub fn verification_succeeded(&mut self) -> Result<(), AppError> {
        if self.verification != VerificationState::InFlight {
            return Err(AppError::InvalidState(
                "no verification request is in flight".to_string(),
            ));
        }
        self.verification = VerificationState::Verified;
        Ok(())
    }

    pub fn verification_failed(&mut self, message: impl Into<String>) -> Result<(), AppError> {
        if self.verification != VerificationState::InFlight {
            return Err(AppError::InvalidState(
                "no verification request is in flight".to_string(),
            ));
        }
        self.verification = VerificationState::Failed(message.into());
        Ok(())
    }

    /// Sends the verified-skill request, guarded so only one attempt runs
    /// at a time. Returns false when the call was suppressed. A failure is
    /// surfaced and leaves the action retryable.
    pub async fn add_to_resume(
        &mut self,
        client: &dyn VerificationClient,
    ) -> Result<bool, AppError> {
        if !self.begin_verification()? {
            return Ok(false);
        }
        match client.add_verified_skill(&self.test.id).await {
            Ok(response) => {
                tracing::info!("skill {} added to profile: {}", response.skill, response.message);
                self.verification_succeeded()?;
                Ok(true)
            }
            Err(e) => {
                tracing::error!("failed to add verified skill for test {}: {}", self.test.id, e);
                self.verification_failed(e.to_string())?;
                Err(e)
            }
        }
    }

    /// Asks the profile whether this skill is already verified and syncs
    /// the local state if so.
    pub async fn refresh_verified_status(
        &mut self,
        client: &dyn VerificationClient,
    ) -> Result<(), AppError> {
        let skills = client.verified_skills().await?;
        if skills
            .user_verified_skills
            .iter()
            .any(|skill| skill == &self.test.skill_category)
        {
            self.verification = VerificationState::Verified;
        }
        Ok(())
    }

    /// Discards this result and starts a fresh attempt at the same test.
    pub fn retake(
        &self,
        clock: Arc<dyn Clock>,
        policy: UnansweredPolicy,
    ) -> Result<TestSession, AppError> {
        let mut session = TestSession::new(self.test.clone(), clock, policy);
        session.start()?;
        Ok(session)
    }
}
