use log::debug;

use super::links::step_url;
use super::types::{ExecutionData, ExecutionIds};
use crate::steps::{LayoutNode, StepRecord, StepTimeline};

/// Name of the synthetic node that represents the whole pipeline run.
const ROOT_NODE_NAME: &str = "Execution";
const ROLLBACK_STAGE_MARKER: &str = "_rollbackStage";
const STAGE_PREFIX: &str = "pipeline.stages.";

/// Joins executed nodes to the stages that own them and orders them by end time.
///
/// A node belongs to the first non-rollback stage (in layout key order) whose
/// identifier appears in the node's `baseFqn` as `pipeline.stages.<identifier>`.
/// Nodes without an owning stage and the root `Execution` node are dropped.
/// Nodes are visited in key order so records with equal end times always
/// come out in the same order.
pub fn build_timeline(
    data: &ExecutionData,
    ids: &ExecutionIds,
    ui_base_url: &str,
) -> StepTimeline {
    let mut stages: Vec<(&String, &LayoutNode)> = data
        .summary
        .layout_node_map
        .iter()
        .filter(|(key, _)| !key.contains(ROLLBACK_STAGE_MARKER))
        .collect();
    stages.sort_by(|a, b| a.0.cmp(b.0));

    let mut nodes: Vec<_> = data.execution_graph.node_map.iter().collect();
    nodes.sort_by(|a, b| a.0.cmp(b.0));

    let mut timeline = StepTimeline::new();

    for (node_key, node) in nodes {
        let Some((stage_key, layout)) = stages
            .iter()
            .find(|(_, layout)| belongs_to_stage(&node.base_fqn, &layout.node_identifier))
        else {
            debug!("No stage owns node {node_key} ({})", node.base_fqn);
            continue;
        };

        debug!(
            "unsorted object: {} | {} | {} | {} | {} {}",
            layout.name, node.name, node.status, layout.node_identifier, node.identifier, node.end_ts
        );

        if node.name == ROOT_NODE_NAME {
            continue;
        }

        let execution_url = step_url(
            ui_base_url,
            ids,
            &data.summary.store_type,
            stage_key,
            node_key,
        );

        timeline.insert(StepRecord {
            execution_node: node.clone(),
            layout_node: (*layout).clone(),
            execution_url,
        });
    }

    debug!("Final max step length: {}", timeline.longest_name());
    timeline
}

/// `pipeline.stages.<identifier>` must be followed by a `.` or the end of the
/// path, so `build` does not claim nodes of a sibling stage `build2`.
fn belongs_to_stage(base_fqn: &str, node_identifier: &str) -> bool {
    let needle = format!("{STAGE_PREFIX}{node_identifier}");
    base_fqn.match_indices(&needle).any(|(index, _)| {
        let rest = &base_fqn[index + needle.len()..];
        rest.is_empty() || rest.starts_with('.')
    })
}
