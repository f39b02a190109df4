use super::types::ExecutionIds;

/// Builds a deep link to one step of an execution in the Harness UI.
///
/// # Arguments
///
/// * `ui_base_url` - Harness UI base URL (e.g., <https://app.harness.io>)
/// * `ids` - Account, org, project, pipeline and execution identifiers
/// * `store_type` - Pipeline store type reported by the execution summary
/// * `stage_key` - Layout map key of the owning stage
/// * `step_key` - Node map key of the step
///
/// # Returns
///
/// Clickable URL that opens the execution with the step selected
pub fn step_url(
    ui_base_url: &str,
    ids: &ExecutionIds,
    store_type: &str,
    stage_key: &str,
    step_key: &str,
) -> String {
    format!(
        "{}/ng/#/account/{}/ci/orgs/{}/projects/{}/pipelines/{}/executions/{}/pipeline?storeType={store_type}&stage={stage_key}&step={step_key}&childStage=&stageExecId=",
        ui_base_url.trim_end_matches('/'),
        ids.account,
        ids.org,
        ids.project,
        ids.pipeline,
        ids.execution,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids() -> ExecutionIds {
        ExecutionIds {
            account: "acc1".to_string(),
            org: "default".to_string(),
            project: "proj".to_string(),
            pipeline: "deploy".to_string(),
            execution: "exe9".to_string(),
        }
    }

    #[test]
    fn test_step_url() {
        let url = step_url("https://app.harness.io", &ids(), "INLINE", "stg", "stp");
        assert_eq!(
            url,
            "https://app.harness.io/ng/#/account/acc1/ci/orgs/default/projects/proj/pipelines/deploy/executions/exe9/pipeline?storeType=INLINE&stage=stg&step=stp&childStage=&stageExecId="
        );
    }

    #[test]
    fn test_step_url_trims_trailing_slash() {
        let url = step_url("https://harness.example.com/", &ids(), "", "s", "n");
        assert!(url.starts_with("https://harness.example.com/ng/#/account/acc1/"));
        assert!(url.contains("storeType=&stage=s&step=n"));
    }
}
