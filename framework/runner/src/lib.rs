mod cli;
mod config;
mod context;
mod definition;
mod executor;
mod init;
mod progress;
mod report;
mod run;
mod shutdown;
mod simulator;
mod types;
mod user;

pub mod prelude {
    pub use crate::cli::LoadTestCli;
    pub use crate::config::{ConfigError, RunConfiguration};
    pub use crate::context::{RunnerContext, UserContext};
    pub use crate::definition::{execute, LoadTestBuilder};
    pub use crate::executor::Executor;
    pub use crate::init::init;
    pub use crate::report::summarize;
    pub use crate::run::AggregateResult;
    pub use crate::simulator::run_user;
    pub use crate::types::StampedeResult;
    pub use crate::user::{
        SimulationError, StepOutcome, TerminalState, UserResult, UserState, VirtualUser,
    };

    /// Re-export of the core prelude, so that drivers and binaries can depend on the runner alone.
    pub use stampede_core::prelude::*;
    pub use stampede_summary_model::{append_run_summary, RunSummary};
}
