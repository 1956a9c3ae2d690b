// src/models/skill.rs

use serde::{Deserialize, Serialize};

/// A stored verification record, one per passed assessment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifiedSkillRecord {
    pub skill: String,

    /// Test that backed the verification.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verified_at: Option<chrono::DateTime<chrono::Utc>>,

    /// Verifications lapse upstream roughly six months after they are earned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Read model returned by the verification collaborator: the raw records
/// plus the flat list of skill names already on the user's profile.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifiedSkillsResponse {
    #[serde(default)]
    pub verified_skills: Vec<VerifiedSkillRecord>,
    #[serde(default)]
    pub user_verified_skills: Vec<String>,
}

/// Request to attach a passed test's skill to the user's resume.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddVerifiedSkillRequest {
    pub skill_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddVerifiedSkillResponse {
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub skill: String,
}

/// Badge state for one skill chip on the profile page.
#[derive(Debug, Clone, PartialEq)]
pub struct SkillBadge {
    pub skill: String,
    pub is_verified: bool,
    pub score: Option<u32>,
    pub date: Option<chrono::DateTime<chrono::Utc>>,
}

impl SkillBadge {
    pub fn verified(skill: impl Into<String>) -> Self {
        Self {
            skill: skill.into(),
            is_verified: true,
            score: None,
            date: None,
        }
    }

    /// Hover text for the badge, mirroring the profile chip copy.
    pub fn tooltip(&self) -> String {
        if !self.is_verified {
            return "Take a skill test to verify this skill".to_string();
        }
        let date = self
            .date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default();
        match self.score {
            Some(score) => format!("Verified on {} with a score of {}%", date, score),
            None => format!("Verified on {}", date),
        }
    }
}
