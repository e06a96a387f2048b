//! Output renderers: terminal and JSON.
//!
//! The core returns a structured [`RunReport`]; rendering it to text is
//! strictly a presentation concern.

pub mod json;
pub mod terminal;

use crate::models::RunReport;

/// Trait for rendering a run report to an output format.
pub trait ReportRenderer {
    /// Render the report to a string.
    fn render(&self, report: &RunReport) -> String;
}
