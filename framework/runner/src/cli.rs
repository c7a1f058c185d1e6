use std::path::PathBuf;

use clap::Args;

/// Options shared by every load test binary.
///
/// Flatten this into a binary's own CLI with `#[command(flatten)]` so that scenario specific
/// options, such as how to reach the automation backend, can sit alongside it.
#[derive(Args, Debug, Clone, Default)]
pub struct LoadTestCli {
    /// Path to a TOML file providing any of the run configuration fields.
    ///
    /// Values given on the command line take precedence over values in the file.
    #[clap(long)]
    pub config: Option<PathBuf>,

    /// The address of the workflow to load test
    #[clap(short, long)]
    pub target_url: Option<String>,

    /// The number of virtual users to run concurrently
    #[clap(short, long)]
    pub users: Option<usize>,

    /// The number of workflow steps each user answers before expecting the results page
    #[clap(long)]
    pub steps: Option<usize>,

    /// Pause after every user action, in milliseconds
    #[clap(long)]
    pub delay_ms: Option<u64>,

    /// How long to wait for a selector to match before failing the user, in milliseconds
    #[clap(long)]
    pub selector_timeout_ms: Option<u64>,

    /// Deadline for a single user to complete the whole workflow, in seconds. Use 0 to disable.
    #[clap(long)]
    pub user_timeout_s: Option<u64>,

    /// Seed for the random option choices, to make a run's choices reproducible
    #[clap(long)]
    pub seed: Option<u64>,

    /// Do not show a progress bar on the CLI.
    ///
    /// This is recommended for CI/CD environments where the progress bar isn't being looked at by anyone and is just adding noise to the logs.
    #[clap(long, default_value = "false")]
    pub no_progress: bool,

    /// Use this run id instead of generating one
    #[clap(long)]
    pub run_id: Option<String>,

    /// Append a JSON summary of the run to this file, one line per run
    #[clap(long)]
    pub summary_file: Option<PathBuf>,

    /// Exit with an error if any virtual user failed
    #[clap(long, default_value = "false")]
    pub fail_on_error: bool,
}
