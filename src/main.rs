mod commands;
mod config;
mod context;
mod diff;
mod output;
mod traits;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{ClassifyCommand, ReportCommand, ReportRequest};
use context::Context;
use diff::{CollapseStyle, PlanFormat};

#[derive(Parser)]
#[command(name = "tfplan-report")]
#[command(about = "Turn Terraform plan output into a collapsible CI log report", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a collapsible report of the changes in a plan
    Report {
        /// Plan output to read (text or JSON); reads stdin when omitted or "-"
        #[arg(short, long, env = "PLAN_FILE")]
        input: Option<String>,

        /// Input format
        #[arg(short, long, value_enum, default_value_t = PlanFormat::Auto)]
        format: PlanFormat,

        /// Collapsible section syntax (overrides the config file)
        #[arg(short, long, value_enum)]
        style: Option<CollapseStyle>,

        /// YAML config file with report defaults
        #[arg(short, long)]
        config: Option<String>,

        /// Truncate attribute lines to this many characters
        #[arg(long)]
        max_attribute_width: Option<usize>,

        /// Only list resource names, without their attribute lines
        #[arg(long)]
        hide_attributes: bool,

        /// Append plan_status, change_count and changes to this step outputs file
        #[arg(long, env = "GITHUB_OUTPUT")]
        github_output: Option<String>,
    },

    /// Print the classified change set as JSON
    Classify {
        /// Plan output to read (text or JSON); reads stdin when omitted or "-"
        #[arg(short, long, env = "PLAN_FILE")]
        input: Option<String>,

        /// Input format
        #[arg(short, long, value_enum, default_value_t = PlanFormat::Auto)]
        format: PlanFormat,

        /// Pretty-print the JSON
        #[arg(long)]
        pretty: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let ctx = Context::default();

    match cli.command {
        Commands::Report {
            input,
            format,
            style,
            config,
            max_attribute_width,
            hide_attributes,
            github_output,
        } => {
            let request = ReportRequest {
                input,
                format,
                config,
                style,
                max_attribute_width,
                hide_attributes,
                outputs_file: github_output,
            };
            ReportCommand::execute(&ctx, &request)?;
        }
        Commands::Classify {
            input,
            format,
            pretty,
        } => {
            ClassifyCommand::execute(&ctx, input.as_deref(), format, pretty)?;
        }
    }

    Ok(())
}
