//! examprep-report: Rendering finished exams.

pub mod html;

pub use html::{generate_html, write_html_report};
