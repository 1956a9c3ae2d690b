// src/models/attempt.rs

use serde::{Deserialize, Serialize};

/// Sentinel option index meaning "no option selected".
/// The grading collaborator receives it verbatim for skipped questions.
pub const UNANSWERED: i32 = -1;

/// The user's current selection for one question within a session.
/// One record exists per question for the session's whole lifetime; records
/// are only ever overwritten, never removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerRecord {
    pub question_id: String,
    pub selected_option: i32,
}

impl AnswerRecord {
    pub fn unanswered(question_id: impl Into<String>) -> Self {
        Self {
            question_id: question_id.into(),
            selected_option: UNANSWERED,
        }
    }

    pub fn is_answered(&self) -> bool {
        self.selected_option != UNANSWERED
    }
}

/// Payload sent to the grading collaborator.
/// Built exactly once when submission triggers and immutable afterward; a
/// retried send after a transport failure reuses the same payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionRequest {
    pub answers: Vec<AnswerRecord>,
    pub start_time: chrono::DateTime<chrono::Utc>,
    pub end_time: chrono::DateTime<chrono::Utc>,
}

/// Graded outcome for a single question, as returned by the grader.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerResult {
    pub question_id: String,
    pub selected_option: i32,
    pub is_correct: bool,

    /// Index of the correct option. Absent when the grader could not resolve
    /// the question id against the stored test.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correct_answer: Option<u32>,

    /// Explanation text revealed after grading; may be empty.
    #[serde(default)]
    pub explanation: String,
}

/// The server's authoritative scoring of a submitted session.
/// Treated as immutable once received.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradedResult {
    /// Score percentage, 0-100.
    pub score: u32,

    /// Pass flag as computed by the grader against the test's own threshold.
    pub passed: bool,

    pub correct_answers: u32,
    pub total_questions: u32,

    /// Wall time the attempt took, in seconds.
    pub completion_time: u64,

    #[serde(default)]
    pub results: Vec<AnswerResult>,
}
