use std::time::Duration;

use async_trait::async_trait;

use crate::error::DriverError;

pub type DriverResult<T> = Result<T, DriverError>;

/// An automation backend that can hand out browser sessions.
///
/// The driver itself is shared between all virtual users, so it must be safe to use from many
/// threads at once. Each session it launches is owned by exactly one user.
#[async_trait]
pub trait BrowserDriver: Send + Sync + 'static {
    type Session: BrowserSession;

    /// Check that the automation environment is reachable before any user is started.
    ///
    /// An error here aborts the whole run. The default assumes the driver is always available.
    async fn ready(&self) -> DriverResult<()> {
        Ok(())
    }

    /// Launch a fresh session for a single virtual user.
    async fn launch_session(&self) -> DriverResult<Self::Session>;
}

/// A single, exclusively owned browser session.
#[async_trait]
pub trait BrowserSession: Send {
    /// Handle to an element found by [BrowserSession::wait_for_selector].
    type Element: Send + Sync;

    async fn navigate(&mut self, url: &str) -> DriverResult<()>;

    /// Wait until at least one element matches `selector` and return every match.
    ///
    /// Returns [DriverError::SelectorTimeout] if nothing matches within `timeout`.
    async fn wait_for_selector(
        &mut self,
        selector: &str,
        timeout: Duration,
    ) -> DriverResult<Vec<Self::Element>>;

    async fn click(&mut self, element: &Self::Element) -> DriverResult<()>;

    /// Release the session. Callers invoke this exactly once, whatever happened before.
    async fn close(&mut self) -> DriverResult<()>;
}
