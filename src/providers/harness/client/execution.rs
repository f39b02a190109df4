use log::{debug, info};
use reqwest::header::CONTENT_TYPE;
use reqwest::StatusCode;
use url::Url;

use super::core::{ApiRequest, HarnessClient};
use crate::error::{Result, SteplineError};
use crate::providers::harness::types::{ExecutionIds, ExecutionResponse};

const EXECUTION_PATH: [&str; 6] = ["gateway", "pipeline", "api", "pipelines", "execution", "v2"];
const API_KEY_HEADER: &str = "x-api-key";

impl HarnessClient {
    /// Build the execution graph endpoint for one execution.
    pub(crate) fn execution_url(&self, ids: &ExecutionIds) -> Result<Url> {
        let mut url = self.api_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                SteplineError::Config(format!("API URL cannot be a base: {}", self.api_url))
            })?
            .pop_if_empty()
            .extend(EXECUTION_PATH)
            .push(&ids.execution);

        url.query_pairs_mut()
            .append_pair("accountIdentifier", &ids.account)
            .append_pair("orgIdentifier", &ids.org)
            .append_pair("projectIdentifier", &ids.project)
            .append_pair("renderFullBottomGraph", "true");

        Ok(url)
    }

    /// Fetch and decode the full execution graph.
    ///
    /// Anything other than a 200 is treated as a failed fetch.
    pub async fn fetch_execution(&self, ids: &ExecutionIds) -> Result<ExecutionResponse> {
        let url = self.execution_url(ids)?;
        info!("Fetching execution {} of pipeline {}", ids.execution, ids.pipeline);

        let request =
            ApiRequest::get(url.clone()).with_header(API_KEY_HEADER, self.api_key.as_str());
        let fetched = self.send(&request).await?;

        if fetched.status != StatusCode::OK {
            return Err(SteplineError::UnexpectedStatus {
                status: fetched.status.as_u16(),
                url: url.to_string(),
            });
        }

        let content_type = fetched.headers.get(CONTENT_TYPE).cloned();
        let body = fetched.body.unwrap_or_default();
        debug!(
            "Execution response is {} bytes ({content_type:?})",
            body.len()
        );

        let response: ExecutionResponse = serde_json::from_slice(&body)?;
        debug!("Execution response status: {}", response.status);

        Ok(response)
    }
}
