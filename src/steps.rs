use serde::{Deserialize, Deserializer, Serialize};

/// One executed node of the pipeline graph.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionNode {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub identifier: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub uuid: String,
    /// Dotted position in the stage tree, e.g. `pipeline.stages.build.spec.execution.steps.compile`
    #[serde(default, deserialize_with = "null_as_default")]
    pub base_fqn: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: String,
    /// Epoch milliseconds; zero while the node is still running
    #[serde(default, deserialize_with = "null_as_default")]
    pub end_ts: i64,
}

/// Identity of one stage in the pipeline layout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutNode {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub node_identifier: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub node_uuid: String,
}

/// An execution node joined with the stage that owns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepRecord {
    pub execution_node: ExecutionNode,
    pub layout_node: LayoutNode,
    #[serde(rename = "executionURL")]
    pub execution_url: String,
}

impl StepRecord {
    /// The node that represents the stage itself rather than a step in it.
    pub fn is_stage_node(&self) -> bool {
        self.execution_node.name == self.layout_node.name
    }
}

/// Step records ordered by end timestamp.
///
/// Records with equal timestamps keep the order they were inserted in.
#[derive(Debug, Clone, Default)]
pub struct StepTimeline {
    records: Vec<StepRecord>,
    longest_name: usize,
}

impl StepTimeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, record: StepRecord) {
        let end_ts = record.execution_node.end_ts;
        let index = self
            .records
            .partition_point(|existing| existing.execution_node.end_ts <= end_ts);

        self.longest_name = self
            .longest_name
            .max(record.execution_node.name.chars().count());
        self.records.insert(index, record);
    }

    pub fn records(&self) -> &[StepRecord] {
        &self.records
    }

    /// Records that are steps, skipping the per-stage nodes.
    pub fn steps(&self) -> impl Iterator<Item = &StepRecord> {
        self.records.iter().filter(|record| !record.is_stage_node())
    }

    /// Character count of the longest admitted node name.
    pub fn longest_name(&self) -> usize {
        self.longest_name
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Treats an explicit JSON `null` like a missing field.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
