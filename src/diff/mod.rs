//! Plan change parsing and reporting
//!
//! This module turns OpenTofu/Terraform plan output into a categorized,
//! collapsible report for CI logs.
//!
//! # Pipeline
//!
//! - **Parsing**: [`TextPlanParser`] for `plan` text, [`JsonPlanParser`] for `show -json` documents
//! - **Classification**: [`classify`] buckets records into created / updated / destroyed
//! - **Rendering**: [`ReportRenderer`] emits paired collapsible sections
//!
//! # Example
//!
//! ```ignore
//! use crate::diff::{PlanFormat, ReportRenderer, summarize};
//!
//! let changes = summarize(&plan_output, PlanFormat::Auto)?;
//! let report = ReportRenderer::default().render(&changes);
//!
//! println!("{}", report);
//! ```

mod classifier;
mod error;
mod json;
mod parser;
mod renderer;
mod types;

pub use classifier::classify;
pub use error::PlanResult;
pub use json::JsonPlanParser;
pub use parser::TextPlanParser;
pub use renderer::{CollapseStyle, ReportOptions, ReportRenderer};
pub use types::ChangeSet;

#[cfg(test)]
pub use error::PlanError;
#[cfg(test)]
pub use renderer::NO_CHANGES_MESSAGE;
#[cfg(test)]
pub use types::{Action, OutputChange, ResourceChange};

/// Which front end reads the input
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum PlanFormat {
    /// JSON when the input starts with `{`, text otherwise
    #[default]
    Auto,
    Text,
    Json,
}

impl PlanFormat {
    /// Resolve `Auto` against the actual input
    pub fn detect(self, input: &str) -> Self {
        match self {
            PlanFormat::Auto if input.trim_start().starts_with('{') => PlanFormat::Json,
            PlanFormat::Auto => PlanFormat::Text,
            other => other,
        }
    }
}

/// Parse and classify a plan in one step
pub fn summarize(input: &str, format: PlanFormat) -> PlanResult<ChangeSet> {
    let parsed = match format.detect(input) {
        PlanFormat::Json => JsonPlanParser::new().parse(input)?,
        _ => TextPlanParser::new().parse(input)?,
    };

    classify(parsed)
}
