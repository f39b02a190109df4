use std::fs::File;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use crate::config::OutputFormat;
use crate::steps::{StepRecord, StepTimeline};

use super::tables::steps_table;

/// How a timeline should be rendered.
#[derive(Debug, Clone, Copy)]
pub struct RenderOptions {
    pub format: OutputFormat,
    pub show_ids: bool,
    pub hyperlinks: bool,
    pub pretty: bool,
}

/// Renders a step timeline in the requested format.
///
/// - Table: one section per stage with terminal-friendly columns
/// - JSON: array of step records, stage-level nodes excluded
pub fn export_steps(
    timeline: &StepTimeline,
    options: &RenderOptions,
    output: &mut dyn Write,
) -> Result<()> {
    match options.format {
        OutputFormat::Table => export_table(timeline, options, output),
        OutputFormat::Json => export_json(timeline, options.pretty, output),
    }
}

fn export_table(
    timeline: &StepTimeline,
    options: &RenderOptions,
    output: &mut dyn Write,
) -> Result<()> {
    let table = steps_table(timeline, options.show_ids, options.hyperlinks);
    writeln!(output, "{table}")?;
    Ok(())
}

fn export_json(timeline: &StepTimeline, pretty: bool, output: &mut dyn Write) -> Result<()> {
    let steps: Vec<&StepRecord> = timeline.steps().collect();
    let json = if pretty {
        serde_json::to_string_pretty(&steps)?
    } else {
        serde_json::to_string(&steps)?
    };
    writeln!(output, "{json}")?;
    Ok(())
}

/// Writes already rendered output to `path`, replacing any existing file.
pub fn write_to_file(path: &Path, contents: &[u8]) -> Result<()> {
    let mut file = File::create(path)
        .with_context(|| format!("Failed to create output file: {}", path.display()))?;
    file.write_all(contents)
        .with_context(|| format!("Failed to write output file: {}", path.display()))?;
    Ok(())
}
