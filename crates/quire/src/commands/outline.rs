//! `quire outline` command implementation.

use std::path::PathBuf;

use clap::Args;
use quire_config::{CliSettings, Config};
use quire_outline::{HeadingContent, MarkdownDocument, OutlineNode, Threshold};
use serde::Serialize;

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the outline command.
#[derive(Args)]
pub(crate) struct OutlineArgs {
    /// Markdown file to outline.
    file: PathBuf,

    /// Path to configuration file (default: auto-discover quire.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Default gather headings level, 1 to 6 (front matter still wins).
    #[arg(long, env = "QUIRE_GATHER_HEADINGS_LEVEL")]
    level: Option<i64>,

    /// Print headings grouped by level instead of the nested tree.
    #[arg(long)]
    flat: bool,
}

#[derive(Serialize)]
struct OutlineOutput<'a> {
    level: Threshold,
    outline: &'a [OutlineNode<HeadingContent>],
}

impl OutlineArgs {
    /// Execute the outline command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails, the file cannot be read, or
    /// its front matter is invalid.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let cli_settings = CliSettings {
            gather_headings_level: self.level,
            ..CliSettings::default()
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;

        let source = std::fs::read_to_string(&self.file)?;
        let json = render_outline(&source, config.outline.gather_headings_level, self.flat)?;

        Output::new().result(&json)?;
        Ok(())
    }
}

/// Render the outline of a markdown source as pretty JSON.
fn render_outline(
    source: &str,
    global_default: Option<i64>,
    flat: bool,
) -> Result<String, CliError> {
    let document = MarkdownDocument::parse(source)?;
    let threshold = document.threshold(global_default)?;
    let tree = document.outline(threshold);

    tracing::debug!(level = %threshold, headings = tree.node_count(), "Built outline");

    let json = if flat {
        let headings: Vec<&HeadingContent> = tree.flatten().map(|node| &node.content).collect();
        serde_json::to_string_pretty(&headings)?
    } else {
        serde_json::to_string_pretty(&OutlineOutput {
            level: threshold,
            outline: tree.roots(),
        })?
    };
    Ok(json)
}
