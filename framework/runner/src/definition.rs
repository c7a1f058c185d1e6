use std::sync::Arc;

use stampede_core::prelude::{BrowserDriver, ShutdownHandle};

use crate::cli::LoadTestCli;
use crate::config::{ConfigError, RunConfiguration};
use crate::run::{run, AggregateResult};

/// The builder for a load test.
///
/// Holds the run configuration along with the options that only affect how the run is presented.
pub struct LoadTestBuilder {
    config: RunConfiguration,
    /// Generated with `nanoid` when not set.
    run_id: Option<String>,
    /// Show a progress bar over finished users.
    progress: bool,
    /// Print the per-operation timing table once every user has finished.
    operations_summary: bool,
    /// Lets the caller stop the run early. Ctrl-C is wired to it either way.
    shutdown_handle: Option<ShutdownHandle>,
}

pub(crate) struct LoadTestDefinition {
    pub config: RunConfiguration,
    pub run_id: String,
    pub progress: bool,
    pub operations_summary: bool,
    pub shutdown_handle: ShutdownHandle,
}

impl LoadTestBuilder {
    pub fn new(config: RunConfiguration) -> Self {
        Self {
            config,
            run_id: None,
            progress: false,
            operations_summary: false,
            shutdown_handle: None,
        }
    }

    /// Build the configuration and presentation options from the parsed command line.
    pub fn from_cli(cli: &LoadTestCli) -> Result<Self, ConfigError> {
        let mut builder = Self::new(RunConfiguration::load(cli)?)
            .with_progress(!cli.no_progress)
            .with_operations_summary(true);
        builder.run_id = cli.run_id.clone();

        Ok(builder)
    }

    pub fn with_run_id(mut self, run_id: impl Into<String>) -> Self {
        self.run_id = Some(run_id.into());
        self
    }

    pub fn with_progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    pub fn with_operations_summary(mut self, operations_summary: bool) -> Self {
        self.operations_summary = operations_summary;
        self
    }

    pub fn with_shutdown_handle(mut self, shutdown_handle: ShutdownHandle) -> Self {
        self.shutdown_handle = Some(shutdown_handle);
        self
    }

    pub fn config(&self) -> &RunConfiguration {
        &self.config
    }

    /// Validate the definition and run it to completion against `driver`.
    pub fn run<D: BrowserDriver>(self, driver: Arc<D>) -> anyhow::Result<AggregateResult> {
        run(self.build()?, driver)
    }

    pub(crate) fn build(self) -> Result<LoadTestDefinition, ConfigError> {
        self.config.validate()?;

        Ok(LoadTestDefinition {
            config: self.config,
            run_id: self.run_id.unwrap_or_else(|| nanoid::nanoid!()),
            progress: self.progress,
            operations_summary: self.operations_summary,
            shutdown_handle: self.shutdown_handle.unwrap_or_default(),
        })
    }
}

/// Run `config` against `driver` with no progress bar or operations table.
pub fn execute<D: BrowserDriver>(
    config: RunConfiguration,
    driver: Arc<D>,
) -> anyhow::Result<AggregateResult> {
    LoadTestBuilder::new(config).run(driver)
}
