use super::plan_input::PlanInput;
use crate::config::ReportConfig;
use crate::context::Context;
use crate::diff::{ChangeSet, CollapseStyle, PlanFormat, ReportOptions, ReportRenderer, summarize};
use anyhow::{Context as AnyhowContext, Result};
use std::path::Path;

/// Arguments for the 'report' command
#[derive(Debug, Clone, Default)]
pub struct ReportRequest {
    /// Plan file path; stdin when absent or "-"
    pub input: Option<String>,
    pub format: PlanFormat,
    /// YAML config file
    pub config: Option<String>,
    pub style: Option<CollapseStyle>,
    pub max_attribute_width: Option<usize>,
    pub hide_attributes: bool,
    /// Step outputs file (GITHUB_OUTPUT) to publish counts into
    pub outputs_file: Option<String>,
}

/// Handles the 'report' command - renders a collapsible summary of a plan
pub struct ReportCommand;

impl ReportCommand {
    /// Execute the report command
    pub fn execute(ctx: &Context, request: &ReportRequest) -> Result<()> {
        let options = Self::resolve_options(ctx, request)?;
        let input = PlanInput::load(ctx, request.input.as_deref())?;
        let format = request.format.detect(&input.contents);

        ctx.output
            .info(&format!("Summarizing {:?} plan from {}", format, input.source));

        let changes = match summarize(&input.contents, format) {
            Ok(changes) => changes,
            Err(err) => {
                ctx.output
                    .error(&format!("Could not summarize plan from {}", input.source));
                if let Some(path) = &request.outputs_file {
                    ctx.fs.append(Path::new(path), "plan_status=failure\n")?;
                }
                return Err(err).context("Failed to summarize plan");
            }
        };

        if format == PlanFormat::Text && changes.total_changes() > 0 && changes.summary_line.is_empty() {
            ctx.output
                .warning("Plan output has resource changes but no 'Plan:' summary line");
        }

        ctx.output.key_value("To create", &changes.created.len().to_string());
        ctx.output.key_value("To update", &changes.updated.len().to_string());
        ctx.output.key_value("To destroy", &changes.destroyed.len().to_string());
        ctx.output.key_value("Output changes", &changes.outputs.len().to_string());

        ctx.output.report(&ReportRenderer::new(options).render(&changes));

        if let Some(path) = &request.outputs_file {
            Self::publish_outputs(ctx, Path::new(path), &changes)?;
            ctx.output.success(&format!("Published step outputs to {}", path));
        }

        Ok(())
    }

    /// Merge config file values with command-line overrides
    fn resolve_options(ctx: &Context, request: &ReportRequest) -> Result<ReportOptions> {
        let mut options = match &request.config {
            Some(path) => ReportConfig::from_file(&*ctx.fs, Path::new(path))?.to_options(),
            None => ReportOptions::default(),
        };

        if let Some(style) = request.style {
            options.style = style;
        }

        if request.max_attribute_width.is_some() {
            options.max_attribute_width = request.max_attribute_width;
        }

        if request.hide_attributes {
            options.show_attributes = false;
        }

        Ok(options)
    }

    /// Append `key=value` step outputs for downstream steps
    fn publish_outputs(ctx: &Context, path: &Path, changes: &ChangeSet) -> Result<()> {
        let json = changes
            .to_json()
            .context("Failed to serialize change set")?;

        let contents = format!(
            "plan_status=success\nchange_count={}\nchanges={}\n",
            changes.total_changes(),
            json
        );

        ctx.fs.append(path, &contents)
    }
}
