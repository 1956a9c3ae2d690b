// src/session/controller.rs

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rand::Rng;

use crate::{
    error::AppError,
    models::{
        attempt::{AnswerRecord, GradedResult, SubmissionRequest},
        test::{Question, SkillTest},
    },
    session::clock::{Clock, Countdown, CountdownStatus, TIME_LOW_WARNING_SECS},
};

/// What to do with unanswered questions when the clock runs out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnansweredPolicy {
    /// Submit the unanswered marker and let the grader count the question
    /// as wrong (default).
    #[default]
    SubmitUnanswered,
    /// Pick a uniformly random option for each unanswered question before
    /// submitting.
    RandomGuess,
}

/// Lifecycle of one test attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    NotStarted,
    InProgress,
    Submitting,
    Completed,
}

/// Outcome of driving the session clock one second forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Clock still running, or the tick was ignored because the session is
    /// not in progress.
    Running,
    /// The one-time low-time warning fired on this tick.
    TimeLow,
    /// The clock hit zero. The session has moved to Submitting and the
    /// next `submit` call returns the final payload to dispatch.
    Expired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Trigger {
    User,
    Expiry,
}

/// One attempt at a skill test: drives the state machine from start through
/// answering and countdown to a single submission.
///
/// The session never performs I/O itself. `submit` hands the payload to the
/// caller, which dispatches it and reports back through
/// `complete_submission` or `submission_failed`.
pub struct TestSession {
    test: Arc<SkillTest>,
    clock: Arc<dyn Clock>,
    policy: UnansweredPolicy,
    state: SessionState,
    current_index: usize,
    answers: Vec<AnswerRecord>,
    countdown: Countdown,
    started_at: Option<DateTime<Utc>>,
    submission: Option<SubmissionRequest>,
    dispatch_in_flight: bool,
    result: Option<GradedResult>,
}

impl TestSession {
    pub fn new(test: Arc<SkillTest>, clock: Arc<dyn Clock>, policy: UnansweredPolicy) -> Self {
        let countdown = Countdown::new(test.time_limit.saturating_mul(60));
        Self {
            test,
            clock,
            policy,
            state: SessionState::NotStarted,
            current_index: 0,
            answers: Vec::new(),
            countdown,
            started_at: None,
            submission: None,
            dispatch_in_flight: false,
            result: None,
        }
    }

    /// Begins the attempt: records the start time, creates one unanswered
    /// record per question and arms the countdown.
    pub fn start(&mut self) -> Result<(), AppError> {
        if self.state != SessionState::NotStarted {
            return Err(AppError::InvalidState(
                "session has already been started".to_string(),
            ));
        }
        if self.test.questions.is_empty() {
            return Err(AppError::BadRequest(
                "test has no questions".to_string(),
            ));
        }
        self.answers = self
            .test
            .questions
            .iter()
            .map(|q| AnswerRecord::unanswered(q.id.clone()))
            .collect();
        self.countdown = Countdown::new(self.test.time_limit.saturating_mul(60));
        self.started_at = Some(self.clock.now());
        self.current_index = 0;
        self.state = SessionState::InProgress;
        tracing::info!(
            "test session started: {} ({} questions, {} min)",
            self.test.id,
            self.answers.len(),
            self.test.time_limit
        );
        Ok(())
    }

    /// Records the selected option for a question. Selecting again
    /// overwrites the previous choice.
    pub fn select_answer(
        &mut self,
        question_index: usize,
        option_index: usize,
    ) -> Result<(), AppError> {
        if self.state != SessionState::InProgress {
            return Err(AppError::InvalidState(
                "answers can only be changed while the test is in progress".to_string(),
            ));
        }
        let question = self.test.questions.get(question_index).ok_or_else(|| {
            AppError::OutOfRange(format!("question index {} out of range", question_index))
        })?;
        if option_index >= question.options.len() {
            return Err(AppError::OutOfRange(format!(
                "option index {} out of range for question {}",
                option_index, question.id
            )));
        }
        self.answers[question_index].selected_option = option_index as i32;
        Ok(())
    }

    /// Moves the current-question pointer. Navigation is free in both
    /// directions and never touches recorded answers.
    pub fn navigate(&mut self, to_index: usize) -> Result<(), AppError> {
        if self.state != SessionState::InProgress {
            return Err(AppError::InvalidState(
                "navigation is only available while the test is in progress".to_string(),
            ));
        }
        if to_index >= self.test.questions.len() {
            return Err(AppError::OutOfRange(format!(
                "question index {} out of range",
                to_index
            )));
        }
        self.current_index = to_index;
        Ok(())
    }

    /// Drives the countdown one second forward. Ticks are ignored unless
    /// the session is in progress, so a timer that keeps firing after
    /// expiry or submission is harmless.
    pub fn tick(&mut self) -> TickOutcome {
        if self.state != SessionState::InProgress {
            return TickOutcome::Running;
        }
        match self.countdown.tick() {
            CountdownStatus::Running => TickOutcome::Running,
            CountdownStatus::TimeLow => TickOutcome::TimeLow,
            CountdownStatus::Expired => {
                tracing::info!("time expired for test {}, submitting", self.test.id);
                self.build_submission(Trigger::Expiry);
                self.state = SessionState::Submitting;
                TickOutcome::Expired
            }
        }
    }

    /// Moves the session toward submission and returns the payload to
    /// dispatch, if a send is due. The payload is built exactly once per
    /// attempt; a retry after `submission_failed` returns the same payload
    /// again. Returns `None` while a send is already in flight and after
    /// completion.
    pub fn submit(&mut self) -> Result<Option<SubmissionRequest>, AppError> {
        match self.state {
            SessionState::NotStarted => Err(AppError::InvalidState(
                "session has not been started".to_string(),
            )),
            SessionState::Completed => Ok(None),
            SessionState::InProgress => {
                self.build_submission(Trigger::User);
                self.state = SessionState::Submitting;
                self.dispatch_in_flight = true;
                Ok(self.submission.clone())
            }
            SessionState::Submitting => {
                if self.dispatch_in_flight {
                    return Ok(None);
                }
                self.dispatch_in_flight = true;
                Ok(self.submission.clone())
            }
        }
    }

    /// Records that the dispatched submission failed, releasing the
    /// in-flight guard so `submit` can retry with the same payload.
    pub fn submission_failed(&mut self) -> Result<(), AppError> {
        if self.state != SessionState::Submitting {
            return Err(AppError::InvalidState(
                "no submission is in flight".to_string(),
            ));
        }
        self.dispatch_in_flight = false;
        Ok(())
    }

    /// Stores the graded result and finishes the attempt.
    pub fn complete_submission(&mut self, result: GradedResult) -> Result<(), AppError> {
        if self.state != SessionState::Submitting {
            return Err(AppError::InvalidState(
                "no submission is in flight".to_string(),
            ));
        }
        tracing::info!(
            "test {} completed with score {}",
            self.test.id,
            result.score
        );
        self.result = Some(result);
        self.dispatch_in_flight = false;
        self.state = SessionState::Completed;
        Ok(())
    }

    fn build_submission(&mut self, trigger: Trigger) {
        if self.submission.is_some() {
            return;
        }
        let mut answers = self.answers.clone();
        if trigger == Trigger::Expiry && self.policy == UnansweredPolicy::RandomGuess {
            let mut rng = rand::thread_rng();
            for (record, question) in answers.iter_mut().zip(&self.test.questions) {
                if record.is_answered() || question.options.is_empty() {
                    continue;
                }
                record.selected_option = rng.gen_range(0..question.options.len()) as i32;
            }
        }
        let end_time = self.clock.now();
        self.submission = Some(SubmissionRequest {
            answers,
            start_time: self.started_at.unwrap_or(end_time),
            end_time,
        });
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn test(&self) -> &SkillTest {
        &self.test
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.test.questions.get(self.current_index)
    }

    pub fn remaining_secs(&self) -> u32 {
        self.countdown.remaining_secs()
    }

    /// True once the countdown is at or below the warning threshold.
    pub fn is_time_low(&self) -> bool {
        self.state == SessionState::InProgress
            && self.countdown.remaining_secs() <= TIME_LOW_WARNING_SECS
    }

    pub fn is_answered(&self, question_index: usize) -> bool {
        self.answers
            .get(question_index)
            .map(|record| record.is_answered())
            .unwrap_or(false)
    }

    pub fn selected_option(&self, question_index: usize) -> Option<usize> {
        self.answers
            .get(question_index)
            .filter(|record| record.is_answered())
            .map(|record| record.selected_option as usize)
    }

    pub fn answered_count(&self) -> usize {
        self.answers
            .iter()
            .filter(|record| record.is_answered())
            .count()
    }

    pub fn all_answered(&self) -> bool {
        !self.answers.is_empty() && self.answers.iter().all(|record| record.is_answered())
    }

    /// Position through the test as a percentage, for a progress bar.
    pub fn progress_percent(&self) -> f64 {
        if self.test.questions.is_empty() {
            return 0.0;
        }
        (self.current_index + 1) as f64 / self.test.questions.len() as f64 * 100.0
    }

    pub fn answers(&self) -> &[AnswerRecord] {
        &self.answers
    }

    pub fn submission(&self) -> Option<&SubmissionRequest> {
        self.submission.as_ref()
    }

    pub fn result(&self) -> Option<&GradedResult> {
        self.result.as_ref()
    }
}
