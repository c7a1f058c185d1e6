use std::future::Future;
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;
use stampede_core::prelude::{DelegatedShutdownListener, DriverResult};
use stampede_instruments::{report_operation, OperationRecord, Reporter};
use tokio::time::Instant;

use crate::config::RunConfiguration;
use crate::executor::Executor;
use crate::user::SimulationError;

/// State shared read-only by every virtual user in a run.
#[derive(Debug)]
pub struct RunnerContext {
    executor: Arc<Executor>,
    reporter: Arc<Reporter>,
    config: Arc<RunConfiguration>,
}

impl RunnerContext {
    pub(crate) fn new(
        executor: Arc<Executor>,
        reporter: Arc<Reporter>,
        config: Arc<RunConfiguration>,
    ) -> Self {
        Self {
            executor,
            reporter,
            config,
        }
    }

    pub fn executor(&self) -> &Arc<Executor> {
        &self.executor
    }

    pub fn reporter(&self) -> Arc<Reporter> {
        self.reporter.clone()
    }

    pub fn config(&self) -> &Arc<RunConfiguration> {
        &self.config
    }
}

/// The context owned by a single virtual user's thread.
pub struct UserContext {
    user_id: usize,
    runner_context: Arc<RunnerContext>,
    shutdown_listener: DelegatedShutdownListener,
    deadline: Option<Instant>,
}

impl UserContext {
    /// The user's deadline, if the run has one, starts counting from here.
    pub(crate) fn new(
        user_id: usize,
        runner_context: Arc<RunnerContext>,
        shutdown_listener: DelegatedShutdownListener,
    ) -> Self {
        let deadline = runner_context
            .config()
            .user_timeout
            .map(|timeout| Instant::now() + timeout);

        Self {
            user_id,
            runner_context,
            shutdown_listener,
            deadline,
        }
    }

    pub fn user_id(&self) -> usize {
        self.user_id
    }

    pub fn runner_context(&self) -> &Arc<RunnerContext> {
        &self.runner_context
    }

    pub fn config(&self) -> &RunConfiguration {
        self.runner_context.config()
    }

    /// The random source for this user's choices.
    ///
    /// With a configured seed every user gets its own reproducible stream.
    pub fn rng(&self) -> StdRng {
        match self.config().seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(self.user_id as u64)),
            None => StdRng::from_entropy(),
        }
    }

    /// Time a driver call and record it with the run's reporter.
    pub async fn instrument<T>(
        &self,
        operation_id: &str,
        fut: impl Future<Output = DriverResult<T>>,
    ) -> DriverResult<T> {
        let record = OperationRecord::new(operation_id);
        let result = fut.await;
        report_operation(&self.runner_context.reporter, record, &result);
        result
    }

    /// Race `fut` against this user's deadline and the run's shutdown signal.
    pub async fn bounded<T>(
        &self,
        fut: impl Future<Output = Result<T, SimulationError>>,
    ) -> Result<T, SimulationError> {
        let mut shutdown_listener = self.shutdown_listener.clone();
        let deadline = self.deadline;
        let deadline_reached = async move {
            match deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending::<()>().await,
            }
        };

        // A passed deadline or a pending shutdown wins over work that is ready to continue.
        tokio::select! {
            biased;
            _ = deadline_reached => Err(SimulationError::DeadlineExceeded {
                timeout: self.config().user_timeout.unwrap_or_default(),
            }),
            _ = shutdown_listener.wait_for_shutdown() => Err(SimulationError::Cancelled),
            result = fut => result,
        }
    }
}
