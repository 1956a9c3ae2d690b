// src/dashboard.rs

use std::sync::Arc;

use crate::{
    api::{GradingClient, TestCatalogClient, VerificationClient},
    error::AppError,
    models::{
        skill::SkillBadge,
        test::{SkillTest, TestCatalog},
    },
    session::{
        clock::{Clock, SystemClock},
        controller::{TestSession, TickOutcome, UnansweredPolicy},
        results::ResultReview,
    },
};

/// Banner shown when the test catalog cannot be loaded.
pub const CATALOG_LOAD_ERROR: &str = "Failed to load skill tests. Please try again later.";

/// Prompt for abandoning a live attempt.
pub const CLOSE_CONFIRMATION: &str =
    "Are you sure you want to exit? Your progress will be lost.";

/// Where the open test dialog currently is.
pub enum DialogPhase {
    /// Showing test metadata, waiting for the user to start.
    Intro,
    /// An attempt is running (or mid-submission).
    InProgress(TestSession),
    /// Showing the graded result.
    Results(ResultReview),
}

/// One open test dialog: the fetched definition plus the attempt driving
/// through it.
pub struct TestDialog {
    test: Arc<SkillTest>,
    has_previous_attempt: bool,
    previous_score: Option<u32>,
    phase: DialogPhase,
}

impl TestDialog {
    pub fn test(&self) -> &SkillTest {
        &self.test
    }

    pub fn phase(&self) -> &DialogPhase {
        &self.phase
    }

    pub fn has_previous_attempt(&self) -> bool {
        self.has_previous_attempt
    }

    pub fn previous_score(&self) -> Option<u32> {
        self.previous_score
    }

    /// Retake warning shown when the user has taken this test before.
    pub fn previous_attempt_notice(&self) -> Option<String> {
        if !self.has_previous_attempt {
            return None;
        }
        self.previous_score.map(|score| {
            format!(
                "You've already taken this test with a score of {}%. \
                 Taking it again will override your previous score.",
                score
            )
        })
    }
}

/// Drives the skills page: the test catalog, verified-skill badges and the
/// dialog a test attempt runs in. All I/O goes through the injected
/// collaborator clients.
pub struct SkillsDashboard {
    catalog_client: Arc<dyn TestCatalogClient>,
    grading_client: Arc<dyn GradingClient>,
    verification_client: Arc<dyn VerificationClient>,
    clock: Arc<dyn Clock>,
    policy: UnansweredPolicy,
    catalog: TestCatalog,
    badges: Vec<SkillBadge>,
    error: Option<String>,
    dialog: Option<TestDialog>,
}

impl SkillsDashboard {
    pub fn new(
        catalog_client: Arc<dyn TestCatalogClient>,
        grading_client: Arc<dyn GradingClient>,
        verification_client: Arc<dyn VerificationClient>,
    ) -> Self {
        Self {
            catalog_client,
            grading_client,
            verification_client,
            clock: Arc::new(SystemClock),
            policy: UnansweredPolicy::default(),
            catalog: TestCatalog::default(),
            badges: Vec::new(),
            error: None,
            dialog: None,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_policy(mut self, policy: UnansweredPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Reloads the catalog. An expired login is returned to the caller for
    /// the redirect; any other failure becomes the error banner so the
    /// page stays usable.
    pub async fn refresh(&mut self) -> Result<(), AppError> {
        match self.catalog_client.list_tests().await {
            Ok(catalog) => {
                self.catalog = catalog;
                self.error = None;
                Ok(())
            }
            Err(e) if e.is_unauthorized() => {
                tracing::error!("not authorized to load skill tests: {}", e);
                Err(e)
            }
            Err(e) => {
                tracing::error!("failed to load skill tests: {}", e);
                self.error = Some(CATALOG_LOAD_ERROR.to_string());
                Ok(())
            }
        }
    }

    /// Reloads the verified-skill badges from the profile.
    pub async fn refresh_badges(&mut self) -> Result<(), AppError> {
        let skills = self.verification_client.verified_skills().await?;
        self.badges = skills
            .user_verified_skills
            .iter()
            .map(|name| {
                let record = skills.verified_skills.iter().find(|r| &r.skill == name);
                SkillBadge {
                    skill: name.clone(),
                    is_verified: true,
                    score: record.and_then(|r| r.score),
                    date: record.and_then(|r| r.verified_at),
                }
            })
            .collect();
        Ok(())
    }

    /// Fetches a test definition and opens the dialog on its intro screen.
    pub async fn open_test(&mut self, test_id: &str) -> Result<(), AppError> {
        let detail = match self.catalog_client.get_test(test_id).await {
            Ok(detail) => detail,
            Err(e) => {
                tracing::error!("failed to load test {}: {}", test_id, e);
                return Err(e);
            }
        };
        self.dialog = Some(TestDialog {
            test: Arc::new(detail.test),
            has_previous_attempt: detail.has_previous_attempt,
            previous_score: detail.previous_score,
            phase: DialogPhase::Intro,
        });
        Ok(())
    }

    /// Starts the attempt for the open dialog.
    pub fn start_test(&mut self) -> Result<(), AppError> {
        let clock = self.clock.clone();
        let policy = self.policy;
        let dialog = self
            .dialog
            .as_mut()
            .ok_or_else(|| AppError::InvalidState("no test is open".to_string()))?;
        match dialog.phase {
            DialogPhase::Intro => {
                let mut session = TestSession::new(dialog.test.clone(), clock, policy);
                session.start()?;
                dialog.phase = DialogPhase::InProgress(session);
                Ok(())
            }
            _ => Err(AppError::InvalidState(
                "an attempt is already running".to_string(),
            )),
        }
    }

    /// Drives the attempt clock one second forward, dispatching the
    /// submission when time runs out. Meant to be called from the host's
    /// 1 Hz timer; ticks without a running attempt are ignored.
    pub async fn tick(&mut self) -> Result<TickOutcome, AppError> {
        let outcome = match self.session_mut() {
            Some(session) => session.tick(),
            None => return Ok(TickOutcome::Running),
        };
        if outcome == TickOutcome::Expired {
            self.dispatch_submission().await?;
        }
        Ok(outcome)
    }

    /// Submits the running attempt on the user's request.
    pub async fn submit_test(&mut self) -> Result<(), AppError> {
        if self.session_mut().is_none() {
            return Err(AppError::InvalidState(
                "no attempt is running".to_string(),
            ));
        }
        self.dispatch_submission().await
    }

    async fn dispatch_submission(&mut self) -> Result<(), AppError> {
        let grading = self.grading_client.clone();
        let verification = self.verification_client.clone();

        let dialog = self
            .dialog
            .as_mut()
            .ok_or_else(|| AppError::InvalidState("no test is open".to_string()))?;
        let test_id = dialog.test.id.clone();
        let DialogPhase::InProgress(session) = &mut dialog.phase else {
            return Err(AppError::InvalidState(
                "no attempt is running".to_string(),
            ));
        };
        let Some(payload) = session.submit()? else {
            // A dispatch is already in flight, nothing to do.
            return Ok(());
        };

        match grading.submit_test(&test_id, &payload).await {
            Ok(result) => {
                session.complete_submission(result.clone())?;
                let mut review = ResultReview::new(dialog.test.clone(), result);
                if review.is_passed() {
                    if let Err(e) = review.refresh_verified_status(verification.as_ref()).await {
                        tracing::error!("failed to check verified skills: {}", e);
                    }
                }
                dialog.phase = DialogPhase::Results(review);

                // Keep the page behind the dialog current.
                if let Err(e) = self.refresh().await {
                    tracing::error!("failed to refresh tests after submit: {}", e);
                }
                if let Err(e) = self.refresh_badges().await {
                    tracing::error!("failed to refresh badges after submit: {}", e);
                }
                Ok(())
            }
            Err(e) => {
                tracing::error!("failed to submit test {}: {}", test_id, e);
                session.submission_failed()?;
                Err(e)
            }
        }
    }

    /// Adds the passed skill to the profile. Returns false when the call
    /// was suppressed because one is already in flight or the skill is
    /// verified.
    pub async fn add_skill_to_resume(&mut self) -> Result<bool, AppError> {
        let verification = self.verification_client.clone();
        let review = self
            .results_mut()
            .ok_or_else(|| AppError::InvalidState("no result to add".to_string()))?;
        let added = review.add_to_resume(verification.as_ref()).await?;
        if added {
            if let Err(e) = self.refresh_badges().await {
                tracing::error!("failed to refresh badges after verification: {}", e);
            }
        }
        Ok(added)
    }

    /// Discards the shown result and starts a fresh attempt at the same
    /// test.
    pub fn retake_test(&mut self) -> Result<(), AppError> {
        let clock = self.clock.clone();
        let policy = self.policy;
        let dialog = self
            .dialog
            .as_mut()
            .ok_or_else(|| AppError::InvalidState("no test is open".to_string()))?;
        let DialogPhase::Results(review) = &dialog.phase else {
            return Err(AppError::InvalidState(
                "there is no result to retake from".to_string(),
            ));
        };
        let session = review.retake(clock, policy)?;
        dialog.phase = DialogPhase::InProgress(session);
        Ok(())
    }

    /// True when closing the dialog now would abandon a live attempt, so
    /// the host should ask first.
    pub fn close_requires_confirmation(&self) -> bool {
        matches!(
            self.dialog.as_ref().map(|d| &d.phase),
            Some(DialogPhase::InProgress(_))
        )
    }

    /// Closes the dialog. A live attempt is only abandoned when `force` is
    /// set; returns whether the dialog is now closed.
    pub fn close_dialog(&mut self, force: bool) -> bool {
        if self.close_requires_confirmation() && !force {
            return false;
        }
        self.dialog = None;
        true
    }

    pub fn catalog(&self) -> &TestCatalog {
        &self.catalog
    }

    pub fn badges(&self) -> &[SkillBadge] {
        &self.badges
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn dialog(&self) -> Option<&TestDialog> {
        self.dialog.as_ref()
    }

    pub fn session(&self) -> Option<&TestSession> {
        match self.dialog.as_ref().map(|d| &d.phase) {
            Some(DialogPhase::InProgress(session)) => Some(session),
            _ => None,
        }
    }

    /// Mutable access to the running attempt, for answering and
    /// navigation.
    pub fn session_mut(&mut self) -> Option<&mut TestSession> {
        match self.dialog.as_mut().map(|d| &mut d.phase) {
            Some(DialogPhase::InProgress(session)) => Some(session),
            _ => None,
        }
    }

    pub fn results(&self) -> Option<&ResultReview> {
        match self.dialog.as_ref().map(|d| &d.phase) {
            Some(DialogPhase::Results(review)) => Some(review),
            _ => None,
        }
    }

    pub fn results_mut(&mut self) -> Option<&mut ResultReview> {
        match self.dialog.as_mut().map(|d| &mut d.phase) {
            Some(DialogPhase::Results(review)) => Some(review),
            _ => None,
        }
    }
}
