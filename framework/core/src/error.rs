use std::time::Duration;

/// Failures reported by a browser automation driver.
///
/// Apart from a [DriverError::Launch] returned by [crate::driver::BrowserDriver::ready], these are
/// scoped to a single virtual user. The simulator records them as that user's failure and the
/// other users carry on.
#[derive(derive_more::Error, derive_more::Display, Debug, Clone, PartialEq, Eq)]
pub enum DriverError {
    /// No automation environment could be reached, or a session could not be created.
    #[display("failed to launch browser session: {reason}")]
    Launch { reason: String },
    #[display("failed to navigate to {url}: {reason}")]
    Navigation { url: String, reason: String },
    /// Nothing matched the selector before the timeout elapsed.
    #[display("timed out after {timeout:?} waiting for selector `{selector}`")]
    SelectorTimeout { selector: String, timeout: Duration },
    #[display("failed to click element: {reason}")]
    Click { reason: String },
    /// The browser behind the session has gone away, so no further command can succeed.
    #[display("browser session is no longer available: {reason}")]
    SessionLost { reason: String },
    #[display("failed to close browser session: {reason}")]
    Close { reason: String },
}

impl DriverError {
    pub fn launch(reason: impl ToString) -> Self {
        Self::Launch {
            reason: reason.to_string(),
        }
    }

    pub fn navigation(url: &str, reason: impl ToString) -> Self {
        Self::Navigation {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn selector_timeout(selector: &str, timeout: Duration) -> Self {
        Self::SelectorTimeout {
            selector: selector.to_string(),
            timeout,
        }
    }

    pub fn click(reason: impl ToString) -> Self {
        Self::Click {
            reason: reason.to_string(),
        }
    }

    pub fn session_lost(reason: impl ToString) -> Self {
        Self::SessionLost {
            reason: reason.to_string(),
        }
    }

    pub fn close(reason: impl ToString) -> Self {
        Self::Close {
            reason: reason.to_string(),
        }
    }
}
