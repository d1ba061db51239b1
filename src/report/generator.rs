//! Markdown report generation.
//!
//! Renders a [`SummaryReport`] as Markdown tables, or as pretty JSON for
//! machine consumers.

use crate::models::{LabelCount, SummaryReport};
use anyhow::Result;

/// Generate a complete Markdown report.
pub fn generate_markdown_report(report: &SummaryReport) -> String {
    let mut output = String::new();

    output.push_str(&format!("# {}\n\n", report.title()));

    if let Some(ref description) = report.question_description {
        if !description.is_empty() {
            output.push_str(description);
            output.push_str("\n\n");
        }
    }

    output.push_str(&generate_metadata_section(report));
    output.push_str(&format!("**Total ideas:** {}\n\n", report.summary.total));

    output.push_str(&generate_count_table(
        "Ideas by Category",
        "Category",
        &report.summary.categories,
    ));
    output.push_str(&generate_count_table(
        "Ideas by Department",
        "Department",
        &report.summary.departments,
    ));
    output.push_str(&generate_count_table(
        "Top Keywords",
        "Keyword",
        &report.summary.keywords,
    ));

    output.push_str("---\n\n*Generated by ideawatch*\n");

    output
}

/// Generate the metadata section.
fn generate_metadata_section(report: &SummaryReport) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!("- **Question:** {}\n", report.metadata.question_id));
    section.push_str(&format!("- **API:** {}\n", report.metadata.api_url));
    section.push_str(&format!(
        "- **Generated:** {}\n",
        report.metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!("- **Answers:** {}\n", report.metadata.answer_count));
    section.push('\n');

    section
}

/// Generate one label/count table section. Empty groups render a short
/// "no data" line instead of an empty table.
fn generate_count_table(heading: &str, label_header: &str, rows: &[LabelCount]) -> String {
    let mut section = String::new();

    section.push_str(&format!("## {}\n\n", heading));

    if rows.is_empty() {
        section.push_str("No data.\n\n");
        return section;
    }

    section.push_str(&format!("| {} | Count |\n", label_header));
    section.push_str("|:---|---:|\n");

    for row in rows {
        section.push_str(&format!("| {} | {} |\n", row.label, row.count));
    }
    section.push('\n');

    section
}

/// Generate a JSON report.
pub fn generate_json_report(report: &SummaryReport) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AnswerSummary, ReportMetadata};
    use chrono::Utc;

    fn create_test_report() -> SummaryReport {
        SummaryReport {
            metadata: ReportMetadata {
                question_id: "q-1".to_string(),
                api_url: "http://localhost:8000".to_string(),
                generated_at: Utc::now(),
                answer_count: 3,
            },
            question_title: Some("Green office ideas".to_string()),
            question_description: Some("What should we improve?".to_string()),
            summary: AnswerSummary {
                total: 3,
                categories: vec![
                    LabelCount::new("Energy", 2),
                    LabelCount::new("ไม่ระบุ", 1),
                ],
                departments: vec![LabelCount::new("Operations", 3)],
                keywords: vec![LabelCount::new("solar", 2)],
            },
        }
    }

    #[test]
    fn test_generate_markdown_report() {
        let report = create_test_report();
        let markdown = generate_markdown_report(&report);

        assert!(markdown.contains("# Green office ideas"));
        assert!(markdown.contains("## Metadata"));
        assert!(markdown.contains("**Total ideas:** 3"));
        assert!(markdown.contains("## Ideas by Category"));
        assert!(markdown.contains("| Energy | 2 |"));
        assert!(markdown.contains("| ไม่ระบุ | 1 |"));
        assert!(markdown.contains("## Top Keywords"));
        assert!(markdown.contains("| solar | 2 |"));
    }

    #[test]
    fn test_markdown_uses_question_id_without_title() {
        let mut report = create_test_report();
        report.question_title = None;
        report.question_description = None;

        let markdown = generate_markdown_report(&report);
        assert!(markdown.starts_with("# q-1\n"));
    }

    #[test]
    fn test_empty_groups_render_no_data() {
        let mut report = create_test_report();
        report.summary = AnswerSummary::default();

        let markdown = generate_markdown_report(&report);
        assert!(markdown.contains("No data."));
        assert!(!markdown.contains("| Category | Count |"));
    }

    #[test]
    fn test_generate_json_report() {
        let report = create_test_report();
        let json = generate_json_report(&report).unwrap();

        assert!(json.contains("\"question_id\""));
        assert!(json.contains("\"categories\""));
        assert!(json.contains("\"Energy\""));
    }
}
