// src/api/mod.rs

pub mod http;

pub use http::ZirakApi;

use async_trait::async_trait;

use crate::{
    error::AppError,
    models::{
        attempt::{GradedResult, SubmissionRequest},
        skill::{AddVerifiedSkillResponse, VerifiedSkillsResponse},
        test::{TestCatalog, TestDetail},
    },
};

/// Read access to the skill-test catalog collaborator.
#[async_trait]
pub trait TestCatalogClient: Send + Sync {
    /// Lists completed, recommended and available tests for the current user.
    async fn list_tests(&self) -> Result<TestCatalog, AppError>;

    /// Fetches one test definition (answer keys stripped server-side) plus
    /// the user's previous-attempt info for the retake notice.
    async fn get_test(&self, test_id: &str) -> Result<TestDetail, AppError>;
}

/// Grading collaborator: accepts a finished attempt, returns authoritative
/// scoring.
#[async_trait]
pub trait GradingClient: Send + Sync {
    async fn submit_test(
        &self,
        test_id: &str,
        submission: &SubmissionRequest,
    ) -> Result<GradedResult, AppError>;
}

/// Verified-skill collaborator: reads and updates the profile's verified
/// skill list.
#[async_trait]
pub trait VerificationClient: Send + Sync {
    async fn verified_skills(&self) -> Result<VerifiedSkillsResponse, AppError>;

    async fn add_verified_skill(
        &self,
        skill_id: &str,
    ) -> Result<AddVerifiedSkillResponse, AppError>;
}
