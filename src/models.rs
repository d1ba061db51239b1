//! Data models for the answer feed.
//!
//! This module contains the wire types deserialized from the answers API
//! and the aggregate types handed to the report layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single submitted answer, as returned by the answers endpoint.
///
/// Older backend rows omit the reporter fields and keywords entirely,
/// so everything beyond the core columns is optional on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
    /// Unique identifier within a fetched batch.
    pub answer_id: i64,
    /// Question this answer belongs to.
    pub question_id: String,
    /// Free-form answer text.
    pub answer_text: String,
    /// Category label; may be empty.
    #[serde(default)]
    pub category: String,
    /// Comma-separated keyword tokens, if any.
    #[serde(default)]
    pub answer_keywords: Option<String>,
    /// Name of the submitting user, if recorded.
    #[serde(default)]
    pub create_user_name: Option<String>,
    /// Department of the submitting user, if recorded.
    #[serde(default)]
    pub create_user_department: Option<String>,
    /// Creation timestamp as emitted by the backend (ISO-parsable string).
    pub created_at: String,
}

/// Question metadata, used for report titles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub question_id: String,
    pub question_title: String,
    #[serde(default)]
    pub question_description: Option<String>,
    #[serde(default)]
    pub question_categories: Option<Vec<String>>,
    pub created_at: String,
}

/// A label with its occurrence count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelCount {
    pub label: String,
    pub count: usize,
}

impl LabelCount {
    pub fn new(label: impl Into<String>, count: usize) -> Self {
        Self {
            label: label.into(),
            count,
        }
    }
}

/// Display-ready aggregates for one batch of answers.
///
/// Built by [`crate::analysis::summarize`]; every record in the batch is
/// counted in exactly one category entry and one department entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnswerSummary {
    /// Total number of answers in the batch.
    pub total: usize,
    /// Counts by category, sorted ascending by label.
    pub categories: Vec<LabelCount>,
    /// Counts by department, sorted ascending by label.
    pub departments: Vec<LabelCount>,
    /// Keyword frequencies, highest count first.
    pub keywords: Vec<LabelCount>,
}

/// Metadata about a generated summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Question the summary covers.
    pub question_id: String,
    /// Base URL of the answers API.
    pub api_url: String,
    /// When the summary was generated.
    pub generated_at: DateTime<Utc>,
    /// Number of answers in the summarized batch.
    pub answer_count: usize,
}

/// The complete summary report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryReport {
    pub metadata: ReportMetadata,
    /// Question title, when the metadata fetch succeeded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question_description: Option<String>,
    pub summary: AnswerSummary,
}

impl SummaryReport {
    /// Title line for rendered output: question title or the bare id.
    pub fn title(&self) -> &str {
        self.question_title
            .as_deref()
            .unwrap_or(&self.metadata.question_id)
    }
}
