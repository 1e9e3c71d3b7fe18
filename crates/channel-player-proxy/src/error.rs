//! Error types for the channel player proxy

use std::fmt;

#[derive(Debug)]
pub enum ProxyError {
    /// The response store failed
    Store(response_store::StoreError),
    /// Transport-level failure talking to the upstream
    Upstream(Box<reqwest::Error>),
    /// Shell pre-population could not complete
    Install(String),
    Config(String),
    Io(Box<std::io::Error>),
}

impl fmt::Display for ProxyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProxyError::Store(err) => write!(f, "Store error: {}", err),
            ProxyError::Upstream(err) => write!(f, "Upstream error: {}", err),
            ProxyError::Install(msg) => write!(f, "Install error: {}", msg),
            ProxyError::Config(msg) => write!(f, "Configuration error: {}", msg),
            ProxyError::Io(err) => write!(f, "IO error: {}", err),
        }
    }
}

impl std::error::Error for ProxyError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ProxyError::Store(err) => Some(err),
            ProxyError::Upstream(err) => Some(err.as_ref()),
            ProxyError::Io(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl From<response_store::StoreError> for ProxyError {
    fn from(err: response_store::StoreError) -> Self {
        ProxyError::Store(err)
    }
}

impl From<reqwest::Error> for ProxyError {
    fn from(err: reqwest::Error) -> Self {
        ProxyError::Upstream(Box::new(err))
    }
}

impl From<std::io::Error> for ProxyError {
    fn from(err: std::io::Error) -> Self {
        ProxyError::Io(Box::new(err))
    }
}

impl From<tracing_subscriber::filter::ParseError> for ProxyError {
    fn from(err: tracing_subscriber::filter::ParseError) -> Self {
        ProxyError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ProxyError>;
