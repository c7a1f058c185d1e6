use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Context;
use chrono::{DateTime, Utc};
use stampede_core::prelude::BrowserDriver;
use stampede_instruments::ReportConfig;
use stampede_summary_model::RunSummary;

use crate::config::RunConfiguration;
use crate::context::{RunnerContext, UserContext};
use crate::definition::LoadTestDefinition;
use crate::executor::Executor;
use crate::progress::start_progress;
use crate::shutdown::start_shutdown_listener;
use crate::simulator::run_user;
use crate::user::{panic_message, TerminalState, UserResult};

/// Everything a finished run produced. Built once after every user has reached a terminal state.
#[derive(Debug, Clone)]
pub struct AggregateResult {
    pub run_id: String,
    pub config: Arc<RunConfiguration>,
    pub total_users: usize,
    /// Wall clock time the run started.
    pub started_at: DateTime<Utc>,
    pub start: Instant,
    pub end: Instant,
    /// One result per configured user, ordered by user id.
    pub users: Vec<UserResult>,
}

impl AggregateResult {
    pub fn elapsed(&self) -> Duration {
        self.end.saturating_duration_since(self.start)
    }

    /// Total elapsed time divided by the number of users, in seconds.
    pub fn average_per_user_secs(&self) -> f64 {
        self.elapsed().as_secs_f64() / self.total_users as f64
    }

    pub fn completed(&self) -> usize {
        self.count(TerminalState::Completed)
    }

    pub fn failed(&self) -> usize {
        self.count(TerminalState::Failed)
    }

    /// Fraction of users that completed, between 0 and 1.
    pub fn success_ratio(&self) -> f64 {
        self.completed() as f64 / self.total_users as f64
    }

    fn count(&self, state: TerminalState) -> usize {
        self.users.iter().filter(|user| user.state == state).count()
    }

    pub fn to_run_summary(&self) -> RunSummary {
        RunSummary {
            run_id: self.run_id.clone(),
            target_url: self.config.target_url.clone(),
            started_at: self.started_at.timestamp(),
            total_users: self.total_users,
            step_count: self.config.steps,
            action_delay_ms: self.config.action_delay.as_millis() as u64,
            completed: self.completed(),
            failed: self.failed(),
            elapsed_ms: self.elapsed().as_millis() as u64,
            stampede_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

pub(crate) fn run<D: BrowserDriver>(
    definition: LoadTestDefinition,
    driver: Arc<D>,
) -> anyhow::Result<AggregateResult> {
    let config = Arc::new(definition.config);
    let run_id = definition.run_id;

    log::info!(
        "Starting load test {} with {} users against {}",
        run_id,
        config.total_users,
        config.target_url
    );

    let runtime = tokio::runtime::Runtime::new().context("Failed to create Tokio runtime")?;
    let shutdown_handle = definition.shutdown_handle;
    start_shutdown_listener(&runtime, shutdown_handle.clone());
    let executor = Arc::new(Executor::new(runtime, shutdown_handle.clone()));

    let mut report_config = ReportConfig::default();
    if definition.operations_summary {
        report_config = report_config.enable_summary();
    }
    let reporter = Arc::new(report_config.init());

    let runner_context = Arc::new(RunnerContext::new(executor, reporter, config.clone()));

    // Without an automation environment no user can do anything, so this is fatal for the run
    // rather than a failure for every user.
    let ready_driver = driver.clone();
    runner_context
        .executor()
        .execute_in_place(async move { Ok(ready_driver.ready().await?) })
        .context("Browser automation environment is not available")?;

    let progress = definition
        .progress
        .then(|| start_progress(config.total_users));

    let started_at = Utc::now();
    let start = Instant::now();

    let mut handles = Vec::with_capacity(config.total_users);
    let mut users = Vec::with_capacity(config.total_users);
    for user_id in 1..=config.total_users {
        let runner_context = runner_context.clone();
        let driver = driver.clone();
        let progress = progress.clone();
        // For the user to give up on its workflow if the run is stopped early.
        let shutdown_listener = shutdown_handle.new_listener();

        let spawned = std::thread::Builder::new()
            .name(format!("user-{user_id}"))
            .spawn(move || {
                let context = UserContext::new(user_id, runner_context, shutdown_listener);
                let result = run_user(&context, driver.as_ref());
                if let Some(progress) = progress {
                    progress.inc(1);
                }
                result
            });

        match spawned {
            Ok(handle) => handles.push((user_id, handle)),
            Err(e) => {
                log::error!("Failed to spawn thread for user {}: {:?}", user_id, e);
                users.push(UserResult::aborted(user_id, start, e.to_string()));
            }
        }
    }

    for (user_id, handle) in handles {
        match handle.join() {
            Ok(result) => users.push(result),
            Err(panic) => {
                let reason = panic_message(panic.as_ref());
                log::error!("Thread for user {} panicked: {}", user_id, reason);
                users.push(UserResult::aborted(user_id, start, reason));
            }
        }
    }

    let end = Instant::now();

    if let Some(progress) = progress {
        progress.finish_and_clear();
    }

    runner_context.reporter().finalize();

    users.sort_by_key(|user| user.user_id);

    let result = AggregateResult {
        run_id,
        config: config.clone(),
        total_users: config.total_users,
        started_at,
        start,
        end,
        users,
    };

    log::info!(
        "Load test {} finished: {} completed, {} failed",
        result.run_id,
        result.completed(),
        result.failed()
    );

    Ok(result)
}
