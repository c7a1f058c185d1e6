//! A minimal W3C WebDriver client that implements the Stampede browser driver.
//!
//! Only the handful of commands a virtual user needs are supported: creating and deleting a
//! session, navigating, finding elements by CSS selector and clicking them. Point it at any
//! WebDriver server, such as `chromedriver --port=4444` or `geckodriver`.

mod client;
mod error;
mod session;

pub mod prelude {
    pub use crate::client::{Browser, WebDriverClient};
    pub use crate::error::WebDriverError;
    pub use crate::session::{WebDriverSession, WebElement};
}
