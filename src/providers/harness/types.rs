use std::collections::HashMap;

use serde::Deserialize;

use crate::steps::{null_as_default, ExecutionNode, LayoutNode};

/// Identifiers that locate one pipeline execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionIds {
    pub account: String,
    pub org: String,
    pub project: String,
    pub pipeline: String,
    pub execution: String,
}

/// Envelope returned by the execution v2 endpoint.
#[derive(Debug, Deserialize)]
pub struct ExecutionResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: String,
    pub data: ExecutionData,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionData {
    #[serde(rename = "pipelineExecutionSummary")]
    pub summary: PipelineExecutionSummary,
    pub execution_graph: ExecutionGraph,
}

/// Stage layout, keyed by opaque stage UUID.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineExecutionSummary {
    #[serde(default, deserialize_with = "null_as_default")]
    pub layout_node_map: HashMap<String, LayoutNode>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub store_type: String,
}

/// Executed nodes, keyed by opaque node UUID.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionGraph {
    #[serde(default, deserialize_with = "null_as_default")]
    pub node_map: HashMap<String, ExecutionNode>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_execution_response() {
        let body = r#"{
  "status": "SUCCESS",
  "data": {
    "pipelineExecutionSummary": {
      "storeType": "INLINE",
      "layoutNodeMap": {
        "stage-uuid": {"name": "Build", "nodeIdentifier": "build", "nodeUuid": "stage-uuid", "nodeType": "CI"}
      }
    },
    "executionGraph": {
      "rootNodeId": "root",
      "nodeMap": {
        "node-uuid": {
          "name": "Compile",
          "identifier": "compile",
          "uuid": "node-uuid",
          "baseFqn": "pipeline.stages.build.spec.execution.steps.compile",
          "status": "Success",
          "endTs": 1700000000123,
          "startTs": 1700000000000
        }
      }
    }
  }
}"#;

        let response: ExecutionResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.status, "SUCCESS");
        assert_eq!(response.data.summary.store_type, "INLINE");

        let stage = &response.data.summary.layout_node_map["stage-uuid"];
        assert_eq!(stage.node_identifier, "build");

        let node = &response.data.execution_graph.node_map["node-uuid"];
        assert_eq!(node.name, "Compile");
        assert_eq!(node.end_ts, 1_700_000_000_123);
    }

    #[test]
    fn test_decode_tolerates_nulls_and_missing_fields() {
        let body = r#"{
  "status": null,
  "data": {
    "pipelineExecutionSummary": {"storeType": null, "layoutNodeMap": null},
    "executionGraph": {
      "nodeMap": {
        "running": {"name": "Test", "baseFqn": null, "endTs": null}
      }
    }
  }
}"#;

        let response: ExecutionResponse = serde_json::from_str(body).unwrap();
        assert!(response.status.is_empty());
        assert!(response.data.summary.layout_node_map.is_empty());

        let node = &response.data.execution_graph.node_map["running"];
        assert_eq!(node.end_ts, 0);
        assert!(node.base_fqn.is_empty());
        assert!(node.status.is_empty());
    }

    #[test]
    fn test_decode_rejects_wrong_shape() {
        let body = r#"{"data": {"pipelineExecutionSummary": {}, "executionGraph": {"nodeMap": []}}}"#;
        assert!(serde_json::from_str::<ExecutionResponse>(body).is_err());
    }
}
