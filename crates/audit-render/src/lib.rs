//! Report rendering for the moderation audit report.
//!
//! [`structure`] turns report data into formatted sections; [`markdown`]
//! writes those sections out as a markdown document.

pub mod markdown;
pub mod structure;

pub use markdown::render_markdown;
pub use structure::{build_view, ReportView};
