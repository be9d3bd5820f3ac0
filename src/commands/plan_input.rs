use crate::context::Context;
use anyhow::{Context as AnyhowContext, Result};
use std::path::Path;

/// Fully buffered plan output plus a label describing where it came from
pub struct PlanInput {
    pub contents: String,
    pub source: String,
}

impl PlanInput {
    /// Read the whole plan from a file, or from stdin when no path (or `-`) is given
    pub fn load(ctx: &Context, path: Option<&str>) -> Result<Self> {
        match path {
            None | Some("-") => {
                let contents = std::io::read_to_string(std::io::stdin())
                    .context("Failed to read plan from stdin")?;

                Ok(Self {
                    contents,
                    source: "stdin".to_string(),
                })
            }
            Some(path) => {
                let contents = ctx
                    .fs
                    .read_to_string(Path::new(path))
                    .with_context(|| format!("Failed to read plan file: {}", path))?;

                Ok(Self {
                    contents,
                    source: path.to_string(),
                })
            }
        }
    }
}
