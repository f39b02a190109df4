use chrono::DateTime;
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{
    Attribute, Cell, Color as TableColor, ColumnConstraint, ContentArrangement, Table, Width,
};

use crate::steps::StepTimeline;

use super::styling::hyperlink;

const STEP_COLUMN: usize = 1;
const LINK_LABEL: &str = "Execution";

/// Table and cell creation helpers
pub fn create_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Disabled);
    table
}

pub fn color_coded_status_cell(status: &str) -> Cell {
    match status.to_ascii_lowercase().as_str() {
        "success" | "ignorefailed" => Cell::new(status).fg(TableColor::Green),
        "failed" | "errored" | "aborted" | "expired" | "approvalrejected" => {
            Cell::new(status).fg(TableColor::Red)
        }
        _ => Cell::new(status).fg(TableColor::Yellow),
    }
}

/// Formats an epoch-millisecond end time; zero means the node has not finished.
pub fn format_end_time(end_ts: i64) -> String {
    if end_ts <= 0 {
        return "-".to_string();
    }
    DateTime::from_timestamp_millis(end_ts)
        .map(|time| time.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| end_ts.to_string())
}

/// Builds the step table, one section per stage.
///
/// Stage-level nodes are not listed; they start a new stage section so the
/// next step is preceded by a `Stage:` row.
pub fn steps_table(timeline: &StepTimeline, show_ids: bool, hyperlinks: bool) -> Table {
    let mut table = create_table();
    table.set_header(vec!["No.", "Step", "Status", "End time", "Execution URL"]);

    let mut count = 0;
    let mut print_stage = true;

    for record in timeline.records() {
        if record.is_stage_node() {
            print_stage = true;
            continue;
        }

        let layout = &record.layout_node;
        let node = &record.execution_node;

        if print_stage {
            let stage_id = if show_ids {
                format!(" (id:{})", layout.node_identifier)
            } else {
                String::new()
            };
            table.add_row(vec![
                Cell::new(""),
                Cell::new(format!("Stage: {}{stage_id}", layout.name))
                    .add_attribute(Attribute::Bold),
                Cell::new(""),
                Cell::new(""),
                Cell::new(""),
            ]);
            print_stage = false;
        }

        let step_name = if show_ids {
            format!("{} (id:{})", node.name, node.identifier)
        } else {
            node.name.clone()
        };

        let link = if hyperlinks {
            hyperlink(LINK_LABEL, &record.execution_url)
        } else {
            record.execution_url.clone()
        };

        table.add_row(vec![
            Cell::new(count),
            Cell::new(step_name),
            color_coded_status_cell(&node.status),
            Cell::new(format_end_time(node.end_ts)),
            Cell::new(link),
        ]);
        count += 1;
    }

    let mut name_width = timeline.longest_name();
    if show_ids {
        name_width = name_width * 2 + 7;
    }
    if let Some(column) = table.column_mut(STEP_COLUMN) {
        column.set_constraint(ColumnConstraint::LowerBoundary(Width::Fixed(
            u16::try_from(name_width).unwrap_or(u16::MAX),
        )));
    }

    table
}
