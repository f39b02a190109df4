use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use crate::auth::ApiKey;
use crate::config::{Config, OutputFormat};
use crate::error::SteplineError;
use crate::output::{self, FetchProgress, RenderOptions};
use crate::providers::{ExecutionIds, HarnessProvider, RetryPolicy};

#[derive(Parser, Debug)]
#[command(name = "stepline")]
#[command(author, about = "Lists Harness pipeline execution steps in the order they finished", long_about = None)]
#[command(disable_version_flag = true)]
pub struct Cli {
    /// Order of severity: TRACE, DEBUG, INFO, WARN, ERROR, FATAL, PANIC
    #[arg(long = "log", default_value = "INFO")]
    pub log_level: String,

    /// Execution ID
    #[arg(long = "exe")]
    execution: Option<String>,

    /// Account ID
    #[arg(long = "acc")]
    account: Option<String>,

    /// Organisation ID
    #[arg(long = "org")]
    org: Option<String>,

    /// Project ID
    #[arg(long = "pro")]
    project: Option<String>,

    /// Pipeline ID
    #[arg(long = "pip")]
    pipeline: Option<String>,

    /// API key
    #[arg(long = "key", env = "HARNESS_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Output format
    #[arg(long, value_enum)]
    output: Option<OutputFormat>,

    /// Optionally write results to a file
    #[arg(long)]
    outfile: Option<PathBuf>,

    /// Force link print
    #[arg(long)]
    forcelink: bool,

    /// Show Harness IDs for steps and stages
    #[arg(long)]
    showid: bool,

    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,

    /// Configuration file (defaults to ./stepline.{toml,json,yaml,yml})
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the current version and exit
    #[arg(short = 'v', long = "version")]
    pub version: bool,
}

/// Everything a run needs once flags and configuration are merged.
#[derive(Debug)]
pub struct Settings {
    pub ids: ExecutionIds,
    pub api_key: ApiKey,
    pub api_base_url: String,
    pub ui_base_url: String,
    pub render: RenderOptions,
    pub outfile: Option<PathBuf>,
    pub timeout: Duration,
    pub retry: RetryPolicy,
}

impl Cli {
    /// Merges flags over the configuration file and checks required identifiers.
    pub fn resolve(&self, config: Config) -> std::result::Result<Settings, SteplineError> {
        let harness = config.harness;

        let account = self.account.clone().or(harness.account);
        let api_key = self.api_key.clone().or(harness.api_key);

        let mut missing = Vec::new();
        if self.execution.is_none() {
            missing.push("--exe");
        }
        if account.is_none() {
            missing.push("--acc");
        }
        if self.pipeline.is_none() {
            missing.push("--pip");
        }
        if api_key.is_none() {
            missing.push("--key");
        }

        let (Some(execution), Some(account), Some(pipeline), Some(api_key)) =
            (self.execution.clone(), account, self.pipeline.clone(), api_key)
        else {
            return Err(SteplineError::Config(format!(
                "please set all required flags, missing: {}",
                missing.join(", ")
            )));
        };

        let ids = ExecutionIds {
            account,
            org: self.org.clone().unwrap_or(harness.org),
            project: self.project.clone().unwrap_or(harness.project),
            pipeline,
            execution,
        };

        let render = RenderOptions {
            format: self.output.unwrap_or(config.output.format),
            show_ids: self.showid || config.output.show_ids,
            hyperlinks: self.forcelink
                || config.output.force_link
                || output::stdout_supports_links(),
            pretty: self.pretty || config.output.pretty,
        };

        Ok(Settings {
            ids,
            api_key: ApiKey::from(api_key),
            api_base_url: harness.api_base_url,
            ui_base_url: harness.ui_base_url,
            render,
            outfile: self.outfile.clone().or(config.output.file),
            timeout: Duration::from_secs(config.http.timeout_secs),
            retry: RetryPolicy {
                max_retries: config.http.max_retries,
                delay: Duration::from_secs(config.http.retry_delay_secs),
            },
        })
    }

    pub async fn execute(&self) -> Result<()> {
        let config = Config::load(self.config.as_deref())?;
        let settings = self.resolve(config)?;

        info!(
            "Listing steps of execution {} in {}/{}/{}",
            settings.ids.execution, settings.ids.account, settings.ids.org, settings.ids.project
        );

        let provider = HarnessProvider::new(
            &settings.api_base_url,
            settings.ui_base_url.clone(),
            settings.api_key.clone(),
            settings.timeout,
            settings.retry,
        )?;

        let progress = FetchProgress::start(&settings.ids.execution);
        let timeline = match provider.fetch_steps(&settings.ids).await {
            Ok(timeline) => {
                progress.finish(timeline.len());
                timeline
            }
            Err(e) => {
                progress.fail();
                return Err(e).with_context(|| {
                    format!("Failed to fetch execution {}", settings.ids.execution)
                });
            }
        };

        let mut rendered = Vec::new();
        output::export_steps(&timeline, &settings.render, &mut rendered)?;
        print!("{}", String::from_utf8_lossy(&rendered));

        if let Some(path) = &settings.outfile {
            output::write_to_file(path, &rendered)?;
            info!("Steps written to: {}", path.display());
        }

        Ok(())
    }
}
