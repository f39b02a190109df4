use std::time::Duration;

use log::{info, warn};

use crate::auth::ApiKey;
use crate::error::Result;
use crate::steps::StepTimeline;

use super::client::{HarnessClient, RetryPolicy};
use super::graph::build_timeline;
use super::types::ExecutionIds;

/// Harness pipeline execution provider.
///
/// Fetches one execution graph from the Harness API and turns it into a
/// chronological list of steps grouped by stage.
pub struct HarnessProvider {
    client: HarnessClient,
    ui_base_url: String,
}

impl HarnessProvider {
    /// Creates a new Harness provider.
    ///
    /// # Arguments
    ///
    /// * `api_base_url` - Harness API base URL (e.g., <https://app.harness.io>)
    /// * `ui_base_url` - Base URL used for step deep links
    /// * `api_key` - API key sent in the `x-api-key` header
    /// * `timeout` - Upper bound for each HTTP request
    /// * `retry` - Backoff applied to transient failures
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built or the API URL is invalid.
    pub fn new(
        api_base_url: &str,
        ui_base_url: String,
        api_key: ApiKey,
        timeout: Duration,
        retry: RetryPolicy,
    ) -> Result<Self> {
        let client = HarnessClient::new(api_base_url, api_key, timeout, retry)?;

        Ok(Self {
            client,
            ui_base_url,
        })
    }

    /// Fetches an execution and returns its steps ordered by end time.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The request fails or exhausts its retries
    /// - The API answers with anything other than 200
    /// - The response body is not a valid execution graph
    pub async fn fetch_steps(&self, ids: &ExecutionIds) -> Result<StepTimeline> {
        let response = self.client.fetch_execution(ids).await?;

        let timeline = build_timeline(&response.data, ids, &self.ui_base_url);
        if timeline.is_empty() {
            warn!("No step of execution {} matched a stage", ids.execution);
        }
        info!(
            "Execution {} has {} steps across {} stages",
            ids.execution,
            timeline.len(),
            response.data.summary.layout_node_map.len()
        );

        Ok(timeline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SteplineError;
    use mockito::Matcher;

    const EXECUTION_PATH: &str = "/gateway/pipeline/api/pipelines/execution/v2/exe-1";

    fn ids() -> ExecutionIds {
        ExecutionIds {
            account: "acc-1".to_string(),
            org: "default".to_string(),
            project: "proj".to_string(),
            pipeline: "deploy".to_string(),
            execution: "exe-1".to_string(),
        }
    }

    fn provider_for(server: &mockito::ServerGuard) -> HarnessProvider {
        HarnessProvider::new(
            &server.url(),
            "https://app.harness.io".to_string(),
            ApiKey::from("pat.secret"),
            Duration::from_secs(5),
            RetryPolicy {
                max_retries: 5,
                delay: Duration::ZERO,
            },
        )
        .unwrap()
    }

    const BODY: &str = r#"{
  "status": "SUCCESS",
  "data": {
    "pipelineExecutionSummary": {
      "storeType": "INLINE",
      "layoutNodeMap": {
        "stage-build": {"name": "Build", "nodeIdentifier": "build", "nodeUuid": "stage-build"},
        "stage-build_rollbackStage": {"name": "Build rollback", "nodeIdentifier": "build", "nodeUuid": "rb"}
      }
    },
    "executionGraph": {
      "nodeMap": {
        "n-root": {"name": "Execution", "identifier": "execution", "uuid": "n-root", "baseFqn": "pipeline.stages.build.spec.execution", "status": "Success", "endTs": 400},
        "n-stage": {"name": "Build", "identifier": "build", "uuid": "n-stage", "baseFqn": "pipeline.stages.build", "status": "Success", "endTs": 500},
        "n-test": {"name": "Run Tests", "identifier": "run_tests", "uuid": "n-test", "baseFqn": "pipeline.stages.build.spec.execution.steps.run_tests", "status": "Failed", "endTs": 300},
        "n-compile": {"name": "Compile", "identifier": "compile", "uuid": "n-compile", "baseFqn": "pipeline.stages.build.spec.execution.steps.compile", "status": "Success", "endTs": 100}
      }
    }
  }
}"#;

    #[tokio::test]
    async fn test_fetch_steps() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", EXECUTION_PATH)
            .match_header("x-api-key", "pat.secret")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("accountIdentifier".into(), "acc-1".into()),
                Matcher::UrlEncoded("orgIdentifier".into(), "default".into()),
                Matcher::UrlEncoded("projectIdentifier".into(), "proj".into()),
                Matcher::UrlEncoded("renderFullBottomGraph".into(), "true".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(BODY)
            .expect(1)
            .create_async()
            .await;

        let provider = provider_for(&server);
        let timeline = provider.fetch_steps(&ids()).await.unwrap();

        let names: Vec<_> = timeline
            .records()
            .iter()
            .map(|r| r.execution_node.name.as_str())
            .collect();
        assert_eq!(names, vec!["Compile", "Run Tests", "Build"]);
        assert_eq!(timeline.longest_name(), 9);
        assert!(timeline.records()[0]
            .execution_url
            .contains("/executions/exe-1/pipeline?storeType=INLINE&stage=stage-build&step=n-compile"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_steps_rejects_non_ok_status() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", EXECUTION_PATH)
            .match_query(Matcher::Any)
            .with_status(403)
            .with_body(r#"{"status":"ERROR","code":"ACCESS_DENIED"}"#)
            .expect(1)
            .create_async()
            .await;

        let provider = provider_for(&server);
        let result = provider.fetch_steps(&ids()).await;

        assert!(matches!(
            result,
            Err(SteplineError::UnexpectedStatus { status: 403, .. })
        ));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_steps_rejects_malformed_body() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", EXECUTION_PATH)
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let provider = provider_for(&server);
        let result = provider.fetch_steps(&ids()).await;

        assert!(matches!(result, Err(SteplineError::Json(_))));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_steps_fails_on_server_error() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", EXECUTION_PATH)
            .match_query(Matcher::Any)
            .with_status(500)
            .expect(1)
            .create_async()
            .await;

        let provider = provider_for(&server);
        let result = provider.fetch_steps(&ids()).await;

        assert!(matches!(
            result,
            Err(SteplineError::ServerError { status: 500 })
        ));
        mock.assert_async().await;
    }
}
