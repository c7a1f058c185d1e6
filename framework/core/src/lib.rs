mod driver;
mod error;
mod shutdown;

pub mod prelude {
    pub use crate::driver::{BrowserDriver, BrowserSession, DriverResult};
    pub use crate::error::DriverError;
    pub use crate::shutdown::{DelegatedShutdownListener, ShutdownHandle, ShutdownSignalError};
}
