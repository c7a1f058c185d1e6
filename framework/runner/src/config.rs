use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::cli::LoadTestCli;

pub const DEFAULT_TARGET_URL: &str = "http://localhost:3000/";
pub const DEFAULT_TOTAL_USERS: usize = 60;
pub const DEFAULT_STEPS: usize = 5;
pub const DEFAULT_ACTION_DELAY: Duration = Duration::from_millis(1000);
pub const DEFAULT_SELECTOR_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_USER_TIMEOUT: Duration = Duration::from_secs(120);
pub const DEFAULT_START_SELECTOR: &str = "button";
pub const DEFAULT_OPTION_SELECTOR: &str = ".grid button";
pub const DEFAULT_RESULTS_SELECTOR: &str = ".text-3xl";

/// Everything a run needs to know. Created once before the run and shared read-only by every
/// virtual user.
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfiguration {
    pub target_url: String,
    pub total_users: usize,
    /// Number of decision steps between the start control and the results page.
    pub steps: usize,
    /// Pause after each user action.
    pub action_delay: Duration,
    /// Upper bound on every single selector wait.
    pub selector_timeout: Duration,
    /// Upper bound on one user's whole workflow. `None` lets a user run until it finishes.
    pub user_timeout: Option<Duration>,
    /// Control that begins the workflow. The first match is clicked.
    pub start_selector: String,
    /// Options offered at each step. One match is clicked at random.
    pub option_selector: String,
    /// Indicator that the workflow has reached its results page.
    pub results_selector: String,
    pub seed: Option<u64>,
}

impl Default for RunConfiguration {
    fn default() -> Self {
        Self {
            target_url: DEFAULT_TARGET_URL.to_string(),
            total_users: DEFAULT_TOTAL_USERS,
            steps: DEFAULT_STEPS,
            action_delay: DEFAULT_ACTION_DELAY,
            selector_timeout: DEFAULT_SELECTOR_TIMEOUT,
            user_timeout: Some(DEFAULT_USER_TIMEOUT),
            start_selector: DEFAULT_START_SELECTOR.to_string(),
            option_selector: DEFAULT_OPTION_SELECTOR.to_string(),
            results_selector: DEFAULT_RESULTS_SELECTOR.to_string(),
            seed: None,
        }
    }
}

#[derive(derive_more::Error, derive_more::Display, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[display("failed to read config file {path}: {reason}")]
    Read { path: String, reason: String },
    #[display("failed to parse config file {path}: {reason}")]
    Parse { path: String, reason: String },
    #[display("invalid target url `{url}`: {reason}")]
    InvalidTargetUrl { url: String, reason: String },
    #[display("at least one virtual user is required")]
    NoUsers,
    #[display("at least one workflow step is required")]
    NoSteps,
    #[display("the {name} selector must not be empty")]
    EmptySelector { name: &'static str },
    #[display("the selector timeout must be greater than zero")]
    ZeroSelectorTimeout,
}

/// The shape of a TOML config file. Every field is optional and falls back to the defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    target_url: Option<String>,
    users: Option<usize>,
    steps: Option<usize>,
    delay_ms: Option<u64>,
    selector_timeout_ms: Option<u64>,
    user_timeout_s: Option<u64>,
    start_selector: Option<String>,
    option_selector: Option<String>,
    results_selector: Option<String>,
    seed: Option<u64>,
}

impl RunConfiguration {
    /// Build the configuration from the defaults, then the config file named on the command line
    /// if there is one, then the command line flags.
    pub fn load(cli: &LoadTestCli) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(path) = &cli.config {
            config.apply_file(read_config_file(path)?);
        }

        config.apply_file(ConfigFile {
            target_url: cli.target_url.clone(),
            users: cli.users,
            steps: cli.steps,
            delay_ms: cli.delay_ms,
            selector_timeout_ms: cli.selector_timeout_ms,
            user_timeout_s: cli.user_timeout_s,
            seed: cli.seed,
            ..Default::default()
        });

        Ok(config)
    }

    fn apply_file(&mut self, file: ConfigFile) {
        if let Some(target_url) = file.target_url {
            self.target_url = target_url;
        }
        if let Some(users) = file.users {
            self.total_users = users;
        }
        if let Some(steps) = file.steps {
            self.steps = steps;
        }
        if let Some(delay_ms) = file.delay_ms {
            self.action_delay = Duration::from_millis(delay_ms);
        }
        if let Some(selector_timeout_ms) = file.selector_timeout_ms {
            self.selector_timeout = Duration::from_millis(selector_timeout_ms);
        }
        if let Some(user_timeout_s) = file.user_timeout_s {
            self.user_timeout = match user_timeout_s {
                0 => None,
                s => Some(Duration::from_secs(s)),
            };
        }
        if let Some(start_selector) = file.start_selector {
            self.start_selector = start_selector;
        }
        if let Some(option_selector) = file.option_selector {
            self.option_selector = option_selector;
        }
        if let Some(results_selector) = file.results_selector {
            self.results_selector = results_selector;
        }
        if file.seed.is_some() {
            self.seed = file.seed;
        }
    }

    /// Check the configuration can drive a run. Nothing is launched if this fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.total_users == 0 {
            return Err(ConfigError::NoUsers);
        }
        if self.steps == 0 {
            return Err(ConfigError::NoSteps);
        }

        url::Url::parse(&self.target_url).map_err(|e| ConfigError::InvalidTargetUrl {
            url: self.target_url.clone(),
            reason: e.to_string(),
        })?;

        for (name, selector) in [
            ("start", &self.start_selector),
            ("option", &self.option_selector),
            ("results", &self.results_selector),
        ] {
            if selector.trim().is_empty() {
                return Err(ConfigError::EmptySelector { name });
            }
        }

        if self.selector_timeout.is_zero() {
            return Err(ConfigError::ZeroSelectorTimeout);
        }

        Ok(())
    }
}

fn read_config_file(path: &Path) -> Result<ConfigFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;

    toml::from_str(&content).map_err(|e| ConfigError::Parse {
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}
