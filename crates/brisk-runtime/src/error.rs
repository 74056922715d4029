//! Bind errors

use brisk_config::ConfigError;
use brisk_dom::{DomError, NodeId};
use brisk_net::NetError;

/// Failure while binding a marker or running one of its behaviors
#[derive(Debug, thiserror::Error)]
pub enum BindError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Net(#[from] NetError),

    #[error(transparent)]
    Dom(#[from] DomError),

    #[error("invalid runtime configuration: {0}")]
    Settings(#[from] serde_json::Error),

    #[error("failure to parse options properly")]
    Unparsed,

    #[error("[{0}] option is required")]
    MissingOption(&'static str),

    #[error("[{field}] {reason}")]
    InvalidOption { field: &'static str, reason: String },

    #[error("function '{name}' failed: {message}")]
    Delegate { name: String, message: String },

    #[error("unknown function '{0}'")]
    UnknownDelegate(String),

    #[error("marker [{0}] is handled by the engine and cannot be registered")]
    Reserved(String),

    #[error("marker [{0}] handler already registered")]
    Duplicate(String),

    #[error("marker [{0}] handler cannot be changed")]
    Pinned(String),

    #[error("marker [{0}] does not exist")]
    UnknownMarker(String),

    #[error("invalid character set expression '{0}'")]
    InvalidCharSet(String),

    #[error("{0} has no view")]
    NoView(NodeId),
}

impl BindError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        BindError::InvalidOption {
            field,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(
            BindError::MissingOption("callback").to_string(),
            "[callback] option is required"
        );
        let err: BindError = ConfigError::UnknownFunction("x".into()).into();
        assert_eq!(err.to_string(), "unknown function 'x'");
    }
}
