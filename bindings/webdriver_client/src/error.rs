use thiserror::Error;

#[derive(Debug, Error)]
pub enum WebDriverError {
    #[error("request to WebDriver failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("invalid WebDriver url: {0}")]
    Url(#[from] url::ParseError),
    /// The server answered with a WebDriver error object.
    #[error("{error} ({status}): {message}")]
    Protocol {
        status: u16,
        error: String,
        message: String,
    },
    #[error("unexpected WebDriver response: {0}")]
    UnexpectedResponse(String),
}

impl WebDriverError {
    /// The server no longer knows the session, typically because its browser exited.
    pub fn is_invalid_session(&self) -> bool {
        matches!(self, WebDriverError::Protocol { error, .. } if error == "invalid session id")
    }
}
