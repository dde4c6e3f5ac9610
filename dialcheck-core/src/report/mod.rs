//! Human-readable rendering of run summaries

mod markdown;

pub use markdown::{render_markdown, report_file_name};
