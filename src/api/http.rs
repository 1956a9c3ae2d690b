// src/api/http.rs

use std::time::Duration;

use async_trait::async_trait;
use url::Url;
use validator::Validate;

use crate::{
    api::{GradingClient, TestCatalogClient, VerificationClient},
    config::Config,
    error::AppError,
    models::{
        attempt::{GradedResult, SubmissionRequest},
        skill::{AddVerifiedSkillRequest, AddVerifiedSkillResponse, VerifiedSkillsResponse},
        test::{TestCatalog, TestDetail},
    },
};

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// HTTP implementation of the three collaborator contracts, speaking the
/// platform REST endpoints under a single base URL with bearer auth.
pub struct ZirakApi {
    client: reqwest::Client,
    base_url: Url,
    api_token: String,
}

impl ZirakApi {
    pub fn new(base_url: &str, api_token: impl Into<String>) -> Result<Self, AppError> {
        Self::with_timeout(base_url, api_token, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        Self::with_timeout(
            &config.api_base_url,
            config.api_token.clone(),
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    pub fn with_timeout(
        base_url: &str,
        api_token: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, AppError> {
        let mut base_url = Url::parse(base_url)?;
        // Endpoint paths are joined relative to the base, so it must end
        // with a slash or Url::join would drop the last path segment.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url,
            api_token: api_token.into(),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, AppError> {
        Ok(self.base_url.join(path)?)
    }

    /// Turns a non-2xx response into an AppError, picking up the
    /// `{"error": "..."}` body the platform answers errors with.
    async fn check(response: reqwest::Response, context: &str) -> Result<reqwest::Response, AppError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response
            .json::<serde_json::Value>()
            .await
            .ok()
            .and_then(|body| {
                body.get("error")
                    .and_then(|m| m.as_str())
                    .map(|m| m.to_string())
            })
            .unwrap_or_else(|| context.to_string());
        tracing::error!("{} failed with status {}: {}", context, status, message);
        Err(AppError::from_status(status.as_u16(), message))
    }
}

#[async_trait]
impl TestCatalogClient for ZirakApi {
    async fn list_tests(&self) -> Result<TestCatalog, AppError> {
        let url = self.endpoint("api/talent/skills/tests")?;
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.api_token)
            .send()
            .await?;
        let catalog = Self::check(response, "listing skill tests")
            .await?
            .json::<TestCatalog>()
            .await?;
        Ok(catalog)
    }

    async fn get_test(&self, test_id: &str) -> Result<TestDetail, AppError> {
        let url = self.endpoint(&format!("api/talent/skills/tests/{}", test_id))?;
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.api_token)
            .send()
            .await?;
        let detail = Self::check(response, "fetching test details")
            .await?
            .json::<TestDetail>()
            .await?;
        // A test that fails its own invariants cannot be taken, so reject
        // it here rather than mid-session.
        if let Err(errors) = detail.test.validate() {
            tracing::error!("test {} failed validation: {}", test_id, errors);
            return Err(AppError::Decode(format!("invalid test definition: {}", errors)));
        }
        Ok(detail)
    }
}

#[async_trait]
impl GradingClient for ZirakApi {
    async fn submit_test(
        &self,
        test_id: &str,
        submission: &SubmissionRequest,
    ) -> Result<GradedResult, AppError> {
        let url = self.endpoint(&format!("api/talent/skills/tests/{}", test_id))?;
        let response = self
            .client
            .post(url)
            .bearer_auth(&self.api_token)
            .json(submission)
            .send()
            .await?;
        let result = Self::check(response, "submitting test answers")
            .await?
            .json::<GradedResult>()
            .await?;
        Ok(result)
    }
}

#[async_trait]
impl VerificationClient for ZirakApi {
    async fn verified_skills(&self) -> Result<VerifiedSkillsResponse, AppError> {
        let url = self.endpoint("api/talent/skills/verified")?;
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.api_token)
            .send()
            .await?;
        let skills = Self::check(response, "fetching verified skills")
            .await?
            .json::<VerifiedSkillsResponse>()
            .await?;
        Ok(skills)
    }

    async fn add_verified_skill(
        &self,
        skill_id: &str,
    ) -> Result<AddVerifiedSkillResponse, AppError> {
        let url = self.endpoint("api/talent/skills/verified")?;
        let body = AddVerifiedSkillRequest {
            skill_id: skill_id.to_string(),
        };
        let response = self
            .client
            .post(url)
            .bearer_auth(&self.api_token)
            .json(&body)
            .send()
            .await?;
        let added = Self::check(response, "adding verified skill")
            .await?
            .json::<AddVerifiedSkillResponse>()
            .await?;
        Ok(added)
    }
}
