//! Report renderer for classified plan changes
//!
//! Produces a plain-text report made of collapsible sections that a CI log
//! viewer folds. Every section opens with a start marker and closes with
//! exactly one end marker; per-resource blocks nest inside their section.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use super::types::{ChangeSet, ResourceChange};

/// Report text used when the plan changes nothing
pub const NO_CHANGES_MESSAGE: &str = "No changes detected.";

pub const CREATED_TITLE: &str = "Resources to be Created";
pub const UPDATED_TITLE: &str = "Resources to be Updated";
pub const DESTROYED_TITLE: &str = "Resources to be Destroyed";
pub const OUTPUTS_TITLE: &str = "Terraform Outputs";

/// Marker dialect for collapsible sections
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CollapseStyle {
    /// GitHub Actions `::group::` workflow commands
    #[default]
    Github,
    /// Azure Pipelines `##[group]` logging commands
    Azure,
    /// HTML `<details>` blocks, for job summaries and PR comments
    Markdown,
}

impl CollapseStyle {
    /// Line opening a collapsible section
    pub fn start_marker(&self, title: &str) -> String {
        match self {
            CollapseStyle::Github => format!("::group::{}", title),
            CollapseStyle::Azure => format!("##[group]{}", title),
            CollapseStyle::Markdown => {
                format!("<details><summary>{}</summary>\n", html_escape(title))
            }
        }
    }

    /// Line closing the innermost open section
    pub fn end_marker(&self) -> &'static str {
        match self {
            CollapseStyle::Github => "::endgroup::",
            CollapseStyle::Azure => "##[endgroup]",
            CollapseStyle::Markdown => "</details>",
        }
    }

    /// Make a content line safe for this dialect
    fn escape<'a>(&self, line: &'a str) -> Cow<'a, str> {
        match self {
            CollapseStyle::Markdown => Cow::Owned(html_escape(line)),
            _ => Cow::Borrowed(line),
        }
    }
}

/// Options for report rendering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportOptions {
    /// Marker dialect
    pub style: CollapseStyle,

    /// List attributes under created/updated resources
    pub show_attributes: bool,

    /// Maximum attribute line length before truncation
    pub max_attribute_width: Option<usize>,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            style: CollapseStyle::Github,
            show_attributes: true,
            max_attribute_width: None,
        }
    }
}

/// Renders a [`ChangeSet`] as a collapsible log report
pub struct ReportRenderer {
    options: ReportOptions,
}

impl Default for ReportRenderer {
    fn default() -> Self {
        Self::new(ReportOptions::default())
    }
}

impl ReportRenderer {
    pub fn new(options: ReportOptions) -> Self {
        Self { options }
    }

    /// Render the full report
    pub fn render(&self, set: &ChangeSet) -> String {
        if set.is_empty() {
            return NO_CHANGES_MESSAGE.to_string();
        }

        let mut lines: Vec<String> = Vec::new();

        if !set.summary_line.is_empty() {
            lines.push(self.content(&set.summary_line));
        }

        self.render_resources(&mut lines, CREATED_TITLE, &set.created);
        self.render_resources(&mut lines, UPDATED_TITLE, &set.updated);

        if !set.destroyed.is_empty() {
            self.open(&mut lines, DESTROYED_TITLE);
            for resource in &set.destroyed {
                lines.push(self.content(&resource.name));
            }
            self.close(&mut lines);
        }

        if !set.outputs.is_empty() {
            self.open(&mut lines, OUTPUTS_TITLE);
            for output in &set.outputs {
                lines.push(self.content(&output.rendered_value));
            }
            self.close(&mut lines);
        }

        lines.join("\n")
    }

    /// Render a section with one nested block per resource
    fn render_resources(&self, lines: &mut Vec<String>, title: &str, resources: &[ResourceChange]) {
        if resources.is_empty() {
            return;
        }

        self.open(lines, title);

        for resource in resources {
            self.open(lines, &resource.name);

            if self.options.show_attributes {
                for attribute in &resource.attributes {
                    let line = match self.options.max_attribute_width {
                        Some(width) => truncate_str(attribute, width),
                        None => attribute.clone(),
                    };
                    lines.push(self.content(&line));
                }
            }

            self.close(lines);
        }

        self.close(lines);
    }

    fn open(&self, lines: &mut Vec<String>, title: &str) {
        lines.push(self.options.style.start_marker(title));
    }

    fn close(&self, lines: &mut Vec<String>) {
        lines.push(self.options.style.end_marker().to_string());
    }

    fn content(&self, line: &str) -> String {
        self.options.style.escape(line).into_owned()
    }
}

/// Truncate to at most `max_len` characters, marking the cut with "..."
fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len > 3 {
        let kept: String = s.chars().take(max_len - 3).collect();
        format!("{}...", kept)
    } else {
        s.chars().take(max_len).collect()
    }
}

/// Escape HTML special characters
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
