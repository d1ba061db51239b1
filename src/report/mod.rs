//! Report rendering and raw-batch export.

pub mod export;
pub mod generator;

pub use export::{answers_to_csv, write_answers_csv};
pub use generator::{generate_json_report, generate_markdown_report};
