use super::plan_input::PlanInput;
use crate::context::Context;
use crate::diff::{PlanFormat, summarize};
use anyhow::{Context as AnyhowContext, Result};

/// Handles the 'classify' command - prints the classified change set as JSON
pub struct ClassifyCommand;

impl ClassifyCommand {
    /// Execute the classify command
    pub fn execute(ctx: &Context, input: Option<&str>, format: PlanFormat, pretty: bool) -> Result<()> {
        let input = PlanInput::load(ctx, input)?;
        let format = format.detect(&input.contents);

        let changes = match summarize(&input.contents, format) {
            Ok(changes) => changes,
            Err(err) => {
                ctx.output
                    .error(&format!("Could not summarize plan from {}", input.source));
                return Err(err).context("Failed to summarize plan");
            }
        };

        let json = if pretty {
            changes.to_json_pretty()
        } else {
            changes.to_json()
        }
        .context("Failed to serialize change set")?;

        ctx.output.report(&json);
        ctx.output.success(&format!(
            "Classified {} resource change(s) from {}",
            changes.total_changes(),
            input.source
        ));

        Ok(())
    }
}
