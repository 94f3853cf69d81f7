use thiserror::Error;

#[derive(Error, Debug)]
pub enum CrawlError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    #[error("Browser error: {0}")]
    Browser(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CrawlError {
    pub fn config(message: impl Into<String>) -> Self {
        CrawlError::Config {
            message: message.into(),
        }
    }

    /// Wraps an error coming out of `headless_chrome`, which reports everything as `anyhow::Error`.
    pub fn browser(err: impl std::fmt::Display) -> Self {
        CrawlError::Browser(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CrawlError>;
