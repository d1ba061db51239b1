//! Answer aggregation and statistics.
//!
//! This module turns a raw answer batch into the aggregates the report
//! layer renders: counts by category, counts by department, and the
//! flattened keyword list feeding the frequency table.

use crate::models::{Answer, AnswerSummary, LabelCount};
use std::collections::{BTreeSet, HashMap};

/// Label used for answers whose category or department is blank/missing.
pub const UNSPECIFIED_LABEL: &str = "ไม่ระบุ";

/// Label used for a blank keyword token in frequency counting.
pub const UNKNOWN_KEYWORD: &str = "Unknown";

/// Normalize a raw label: trim whitespace, map empty to the sentinel.
///
/// Grouping must never drop a record for lacking a label, so every
/// answer resolves to some label through this function.
pub fn normalize_label(raw: Option<&str>) -> String {
    match raw.map(str::trim) {
        Some(trimmed) if !trimmed.is_empty() => trimmed.to_string(),
        _ => UNSPECIFIED_LABEL.to_string(),
    }
}

/// Count answers per category, sorted ascending by label.
pub fn group_by_category(answers: &[Answer]) -> Vec<LabelCount> {
    count_labels(
        answers
            .iter()
            .map(|a| normalize_label(Some(a.category.as_str()))),
    )
}

/// Count answers per department, sorted ascending by label.
pub fn group_by_department(answers: &[Answer]) -> Vec<LabelCount> {
    count_labels(
        answers
            .iter()
            .map(|a| normalize_label(a.create_user_department.as_deref())),
    )
}

/// Count occurrences of each label and return them sorted by label.
///
/// Labels are unique keys, so the ordering is total; re-sorting the
/// output is a no-op.
fn count_labels(labels: impl Iterator<Item = String>) -> Vec<LabelCount> {
    let mut counts: HashMap<String, usize> = HashMap::new();

    for label in labels {
        *counts.entry(label).or_default() += 1;
    }

    let mut grouped: Vec<LabelCount> = counts
        .into_iter()
        .map(|(label, count)| LabelCount::new(label, count))
        .collect();

    grouped.sort_by(|a, b| a.label.cmp(&b.label));
    grouped
}

/// Flatten every answer's comma-separated keywords into one token list.
///
/// Tokens are trimmed, empty tokens are discarded, and record order is
/// preserved across the batch.
pub fn flatten_keywords(answers: &[Answer]) -> Vec<String> {
    let mut tokens = Vec::new();

    for answer in answers {
        let raw = match answer.answer_keywords.as_deref() {
            Some(raw) => raw.trim(),
            None => continue,
        };
        if raw.is_empty() {
            continue;
        }
        for part in raw.split(',') {
            let token = part.trim();
            if !token.is_empty() {
                tokens.push(token.to_string());
            }
        }
    }

    tokens
}

/// Count keyword occurrences, highest count first.
///
/// Blank tokens map to [`UNKNOWN_KEYWORD`]. Ties break by label so the
/// output is reproducible run to run.
pub fn keyword_frequencies(tokens: &[String]) -> Vec<LabelCount> {
    let mut counts: HashMap<String, usize> = HashMap::new();

    for token in tokens {
        let key = match token.trim() {
            "" => UNKNOWN_KEYWORD.to_string(),
            trimmed => trimmed.to_string(),
        };
        *counts.entry(key).or_default() += 1;
    }

    let mut frequencies: Vec<LabelCount> = counts
        .into_iter()
        .map(|(label, count)| LabelCount::new(label, count))
        .collect();

    frequencies.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.label.cmp(&b.label)));
    frequencies
}

/// Sorted unique category labels present in a batch.
pub fn distinct_categories(answers: &[Answer]) -> Vec<String> {
    answers
        .iter()
        .map(|a| normalize_label(Some(a.category.as_str())))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Sorted unique department labels present in a batch.
pub fn distinct_departments(answers: &[Answer]) -> Vec<String> {
    answers
        .iter()
        .map(|a| normalize_label(a.create_user_department.as_deref()))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Client-side filter over a fetched batch.
///
/// `None` means "all"; matching compares normalized labels, so filtering
/// on the sentinel selects answers with a blank label.
#[derive(Debug, Clone, Default)]
pub struct AnswerFilter {
    pub category: Option<String>,
    pub department: Option<String>,
}

impl AnswerFilter {
    /// True when no predicate is set.
    pub fn is_empty(&self) -> bool {
        self.category.is_none() && self.department.is_none()
    }

    /// Whether one answer passes the filter.
    pub fn matches(&self, answer: &Answer) -> bool {
        if let Some(ref wanted) = self.category {
            if normalize_label(Some(answer.category.as_str())) != *wanted {
                return false;
            }
        }
        if let Some(ref wanted) = self.department {
            if normalize_label(answer.create_user_department.as_deref()) != *wanted {
                return false;
            }
        }
        true
    }

    /// Apply the filter, preserving batch order.
    pub fn apply(&self, answers: &[Answer]) -> Vec<Answer> {
        answers
            .iter()
            .filter(|a| self.matches(a))
            .cloned()
            .collect()
    }
}

/// Build the full aggregate set for one batch.
///
/// `top_keywords` truncates the frequency table; 0 disables keywords.
pub fn summarize(answers: &[Answer], top_keywords: usize) -> AnswerSummary {
    let mut keywords = keyword_frequencies(&flatten_keywords(answers));
    keywords.truncate(top_keywords);

    AnswerSummary {
        total: answers.len(),
        categories: group_by_category(answers),
        departments: group_by_department(answers),
        keywords,
    }
}
