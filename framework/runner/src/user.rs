use std::any::Any;
use std::time::{Duration, Instant};

use stampede_core::prelude::DriverError;

/// Why a virtual user failed.
#[derive(derive_more::Error, derive_more::Display, Debug, Clone, PartialEq, Eq)]
pub enum SimulationError {
    #[display("{_0}")]
    Driver(DriverError),
    #[display("user did not finish within its {timeout:?} deadline")]
    DeadlineExceeded { timeout: Duration },
    #[display("cancelled by shutdown signal")]
    Cancelled,
    /// The user's thread could not be started or panicked before producing a result.
    #[display("user thread aborted: {reason}")]
    Aborted { reason: String },
}

impl From<DriverError> for SimulationError {
    fn from(e: DriverError) -> Self {
        Self::Driver(e)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserState {
    Pending,
    Running,
    Completed,
    Failed,
}

/// The final outcome of one virtual user. Reached exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalState {
    Completed,
    Failed,
}

/// The option chosen at one workflow step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepOutcome {
    /// 1-based step number.
    pub step: usize,
    pub options_available: usize,
    /// Index into the options offered, always less than `options_available`.
    pub chosen: usize,
}

/// One simulated user. Owned and written only by its own thread.
#[derive(Debug)]
pub struct VirtualUser {
    id: usize,
    state: UserState,
    started: Option<Instant>,
    selections: Vec<StepOutcome>,
}

impl VirtualUser {
    pub fn new(id: usize) -> Self {
        Self {
            id,
            state: UserState::Pending,
            started: None,
            selections: Vec::new(),
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn state(&self) -> UserState {
        self.state
    }

    pub fn selections(&self) -> &[StepOutcome] {
        &self.selections
    }

    pub fn start(&mut self) {
        if self.state == UserState::Pending {
            log::debug!("User {} starting", self.id);
            self.state = UserState::Running;
            self.started = Some(Instant::now());
        }
    }

    pub fn record_step(&mut self, outcome: StepOutcome) {
        self.selections.push(outcome);
    }

    /// Move to the terminal state for `outcome`. Consumes the user so this can only happen once.
    pub fn finish(self, outcome: Result<(), SimulationError>) -> UserResult {
        let ended = Instant::now();
        let started = self.started.unwrap_or(ended);

        let (state, error) = match outcome {
            Ok(()) => {
                log::info!("User {} completed test successfully", self.id);
                (TerminalState::Completed, None)
            }
            Err(e) => {
                log::error!("User {} encountered error: {}", self.id, e);
                (TerminalState::Failed, Some(e))
            }
        };

        UserResult {
            user_id: self.id,
            state,
            started,
            ended,
            error,
            selections: self.selections,
        }
    }
}

/// What the orchestrator collects from each virtual user.
#[derive(Debug, Clone)]
pub struct UserResult {
    pub user_id: usize,
    pub state: TerminalState,
    pub started: Instant,
    pub ended: Instant,
    pub error: Option<SimulationError>,
    pub selections: Vec<StepOutcome>,
}

impl UserResult {
    /// A failed result for a user whose thread never produced one.
    pub(crate) fn aborted(user_id: usize, started: Instant, reason: String) -> Self {
        let mut user = VirtualUser::new(user_id);
        user.state = UserState::Running;
        user.started = Some(started);
        user.finish(Err(SimulationError::Aborted { reason }))
    }

    pub fn elapsed(&self) -> Duration {
        self.ended.saturating_duration_since(self.started)
    }

    pub fn is_completed(&self) -> bool {
        self.state == TerminalState::Completed
    }
}

/// The message a panic was raised with, if it carried one.
pub(crate) fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
