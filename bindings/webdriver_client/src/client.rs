use std::fmt::{Display, Formatter};
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Method;
use serde::Deserialize;
use serde_json::{json, Value};
use stampede_core::prelude::{BrowserDriver, DriverError, DriverResult};
use url::Url;

use crate::error::WebDriverError;
use crate::session::WebDriverSession;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// The browser the WebDriver server should start for each session. Always headless.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Browser {
    #[default]
    Chrome,
    Firefox,
}

impl Browser {
    fn capabilities(self) -> Value {
        match self {
            Browser::Chrome => json!({
                "browserName": "chrome",
                "goog:chromeOptions": {
                    "args": ["--headless=new", "--no-sandbox", "--disable-dev-shm-usage"]
                }
            }),
            Browser::Firefox => json!({
                "browserName": "firefox",
                "moz:firefoxOptions": {
                    "args": ["-headless"]
                }
            }),
        }
    }
}

impl FromStr for Browser {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "chrome" => Ok(Browser::Chrome),
            "firefox" => Ok(Browser::Firefox),
            other => Err(format!("unsupported browser `{other}`, expected chrome or firefox")),
        }
    }
}

impl Display for Browser {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Browser::Chrome => write!(f, "chrome"),
            Browser::Firefox => write!(f, "firefox"),
        }
    }
}

/// HTTP plumbing shared by the client and every session it creates.
#[derive(Debug, Clone)]
pub(crate) struct Transport {
    http: reqwest::Client,
    base: Url,
}

#[derive(Deserialize)]
struct ErrorValue {
    error: String,
    #[serde(default)]
    message: String,
}

impl Transport {
    /// Send a WebDriver command and return the `value` field of the response.
    pub(crate) async fn command(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Value, WebDriverError> {
        let url = self.base.join(path)?;
        let mut request = self.http.request(method, url);
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await?;
        let status = response.status();
        let mut body: Value = response.json().await?;
        let value = body.get_mut("value").map(Value::take).unwrap_or(Value::Null);

        if status.is_success() {
            return Ok(value);
        }

        match serde_json::from_value::<ErrorValue>(value) {
            Ok(ErrorValue { error, message }) => Err(WebDriverError::Protocol {
                status: status.as_u16(),
                error,
                message,
            }),
            Err(_) => Err(WebDriverError::UnexpectedResponse(format!(
                "status {status} without an error object"
            ))),
        }
    }
}

/// A handle to a WebDriver server that launches one browser session per virtual user.
#[derive(Debug, Clone)]
pub struct WebDriverClient {
    transport: Transport,
    browser: Browser,
    poll_interval: Duration,
}

impl WebDriverClient {
    pub fn new(server_url: &str, browser: Browser) -> Result<Self, WebDriverError> {
        let mut base = Url::parse(server_url)?;
        // Relative joins replace the last path segment unless the base ends with a slash.
        if !base.path().ends_with('/') {
            base.set_path(&format!("{}/", base.path()));
        }

        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            transport: Transport { http, base },
            browser,
            poll_interval: DEFAULT_POLL_INTERVAL,
        })
    }

    /// How often a selector wait asks the browser for matches.
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    async fn new_session(&self) -> Result<String, WebDriverError> {
        let value = self
            .transport
            .command(
                Method::POST,
                "session",
                Some(json!({
                    "capabilities": {
                        "alwaysMatch": self.browser.capabilities()
                    }
                })),
            )
            .await?;

        value
            .get("sessionId")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| WebDriverError::UnexpectedResponse("missing sessionId".to_string()))
    }
}

#[async_trait]
impl BrowserDriver for WebDriverClient {
    type Session = WebDriverSession;

    async fn ready(&self) -> DriverResult<()> {
        let value = self
            .transport
            .command(Method::GET, "status", None)
            .await
            .map_err(DriverError::launch)?;

        if value.get("ready").and_then(Value::as_bool) == Some(true) {
            Ok(())
        } else {
            let message = value
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("no message");
            Err(DriverError::launch(format!(
                "WebDriver is not ready: {message}"
            )))
        }
    }

    async fn launch_session(&self) -> DriverResult<WebDriverSession> {
        let session_id = self.new_session().await.map_err(DriverError::launch)?;
        log::debug!("Created {} session {}", self.browser, session_id);

        Ok(WebDriverSession::new(
            self.transport.clone(),
            session_id,
            self.poll_interval,
        ))
    }
}
