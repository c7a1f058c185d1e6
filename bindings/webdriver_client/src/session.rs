use std::time::Duration;

use async_trait::async_trait;
use reqwest::Method;
use serde_json::{json, Value};
use stampede_core::prelude::{BrowserSession, DriverError, DriverResult};
use tokio::time::Instant;

use crate::client::Transport;
use crate::error::WebDriverError;

/// The key WebDriver uses to identify an element reference in JSON.
const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

/// Reference to an element in a session's current page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebElement(String);

impl WebElement {
    pub fn id(&self) -> &str {
        &self.0
    }
}

#[derive(Debug)]
pub struct WebDriverSession {
    transport: Transport,
    session_id: String,
    poll_interval: Duration,
}

impl WebDriverSession {
    pub(crate) fn new(transport: Transport, session_id: String, poll_interval: Duration) -> Self {
        Self {
            transport,
            session_id,
            poll_interval,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    async fn find_elements(&self, selector: &str) -> Result<Vec<WebElement>, WebDriverError> {
        let value = self
            .transport
            .command(
                Method::POST,
                &format!("session/{}/elements", self.session_id),
                Some(json!({ "using": "css selector", "value": selector })),
            )
            .await?;

        let Value::Array(elements) = value else {
            return Err(WebDriverError::UnexpectedResponse(
                "find elements did not return a list".to_string(),
            ));
        };

        elements
            .iter()
            .map(|element| {
                element
                    .get(ELEMENT_KEY)
                    .and_then(Value::as_str)
                    .map(|id| WebElement(id.to_string()))
                    .ok_or_else(|| {
                        WebDriverError::UnexpectedResponse(format!(
                            "element reference without `{ELEMENT_KEY}`"
                        ))
                    })
            })
            .collect()
    }
}

#[async_trait]
impl BrowserSession for WebDriverSession {
    type Element = WebElement;

    async fn navigate(&mut self, url: &str) -> DriverResult<()> {
        self.transport
            .command(
                Method::POST,
                &format!("session/{}/url", self.session_id),
                Some(json!({ "url": url })),
            )
            .await
            .map(|_| ())
            .map_err(|e| DriverError::navigation(url, e))
    }

    async fn wait_for_selector(
        &mut self,
        selector: &str,
        timeout: Duration,
    ) -> DriverResult<Vec<WebElement>> {
        let deadline = Instant::now() + timeout;

        loop {
            match self.find_elements(selector).await {
                Ok(elements) if !elements.is_empty() => return Ok(elements),
                Ok(_) => {}
                Err(e) if e.is_invalid_session() => return Err(DriverError::session_lost(e)),
                // The page may be mid-navigation, so keep polling until the deadline.
                Err(e) => log::debug!(
                    "Session {} failed to look up `{}`: {}",
                    self.session_id,
                    selector,
                    e
                ),
            }

            let now = Instant::now();
            if now >= deadline {
                return Err(DriverError::selector_timeout(selector, timeout));
            }
            tokio::time::sleep(self.poll_interval.min(deadline - now)).await;
        }
    }

    async fn click(&mut self, element: &WebElement) -> DriverResult<()> {
        self.transport
            .command(
                Method::POST,
                &format!("session/{}/element/{}/click", self.session_id, element.id()),
                Some(json!({})),
            )
            .await
            .map(|_| ())
            .map_err(DriverError::click)
    }

    async fn close(&mut self) -> DriverResult<()> {
        self.transport
            .command(
                Method::DELETE,
                &format!("session/{}", self.session_id),
                None,
            )
            .await
            .map(|_| ())
            .map_err(DriverError::close)
    }
}
