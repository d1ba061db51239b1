//! CSV export of a raw answer batch.
//!
//! Column order matches what downstream spreadsheets already expect, and
//! the output starts with a UTF-8 BOM so Excel renders Thai labels
//! correctly.

use crate::models::Answer;
use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use std::path::Path;

const BOM: &str = "\u{feff}";

const HEADERS: [&str; 6] = [
    "create_user_name",
    "create_user_department",
    "answer_text",
    "category",
    "answer_keywords",
    "created_at",
];

/// Render an answer batch as a CSV document (with BOM).
pub fn answers_to_csv(answers: &[Answer]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer
        .write_record(HEADERS)
        .context("Failed to write CSV header")?;

    for answer in answers {
        writer
            .write_record([
                answer.create_user_name.as_deref().unwrap_or(""),
                answer.create_user_department.as_deref().unwrap_or(""),
                answer.answer_text.as_str(),
                answer.category.as_str(),
                answer.answer_keywords.as_deref().unwrap_or(""),
                normalize_timestamp(&answer.created_at).as_str(),
            ])
            .context("Failed to write CSV record")?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Failed to flush CSV writer: {}", e))?;
    let body = String::from_utf8(bytes).context("CSV output was not valid UTF-8")?;

    Ok(format!("{}{}", BOM, body))
}

/// Write an answer batch as CSV to a file.
pub fn write_answers_csv(answers: &[Answer], path: &Path) -> Result<()> {
    let content = answers_to_csv(answers)?;
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write CSV to {}", path.display()))
}

/// Normalize a backend timestamp to RFC 3339 UTC.
///
/// The backend emits naive `CURRENT_TIMESTAMP` strings; those are taken
/// as UTC. Anything unparsable passes through unchanged so an odd row
/// never sinks the export.
fn normalize_timestamp(raw: &str) -> String {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt
            .with_timezone(&Utc)
            .to_rfc3339_opts(SecondsFormat::Secs, true);
    }
    if let Ok(naive) = raw.parse::<NaiveDateTime>() {
        return Utc
            .from_utc_datetime(&naive)
            .to_rfc3339_opts(SecondsFormat::Secs, true);
    }
    raw.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn answer(text: &str, name: Option<&str>, created_at: &str) -> Answer {
        Answer {
            answer_id: 1,
            question_id: "q-1".to_string(),
            answer_text: text.to_string(),
            category: "Energy".to_string(),
            answer_keywords: Some("solar, wind".to_string()),
            create_user_name: name.map(String::from),
            create_user_department: Some("Operations".to_string()),
            created_at: created_at.to_string(),
        }
    }

    #[test]
    fn test_csv_starts_with_bom_and_header() {
        let csv = answers_to_csv(&[]).unwrap();

        assert!(csv.starts_with('\u{feff}'));
        assert!(csv
            .trim_start_matches('\u{feff}')
            .starts_with("create_user_name,create_user_department,answer_text"));
    }

    #[test]
    fn test_csv_escapes_embedded_commas_and_quotes() {
        let answers = vec![answer(
            "cheaper, faster \"green\" shuttles",
            Some("Anong"),
            "2025-05-01T09:30:00",
        )];

        let csv = answers_to_csv(&answers).unwrap();

        assert!(csv.contains("\"cheaper, faster \"\"green\"\" shuttles\""));
    }

    #[test]
    fn test_csv_missing_optionals_become_empty_fields() {
        let answers = vec![Answer {
            create_user_name: None,
            create_user_department: None,
            answer_keywords: None,
            ..answer("idea", None, "2025-05-01T09:30:00")
        }];

        let csv = answers_to_csv(&answers).unwrap();
        let data_line = csv.lines().nth(1).unwrap();

        assert!(data_line.starts_with(",,idea,"));
    }

    #[test]
    fn test_timestamp_normalized_to_rfc3339() {
        assert_eq!(
            normalize_timestamp("2025-05-01T09:30:00"),
            "2025-05-01T09:30:00Z"
        );
        assert_eq!(
            normalize_timestamp("2025-05-01T09:30:00+07:00"),
            "2025-05-01T02:30:00Z"
        );
        // Unparsable input passes through.
        assert_eq!(normalize_timestamp("yesterday"), "yesterday");
    }
}
