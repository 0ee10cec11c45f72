use thiserror::Error;

/// Errors raised inside the toolkit.
///
/// Tool operations never return these to their caller; they are rendered
/// through [`Display`](std::fmt::Display) into the `{"error": ...}` mapping.
/// Construction and configuration loading propagate them as-is.
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ::config::ConfigError),

    #[error("Environment error: {0}")]
    Env(#[from] envy::Error),

    // Transport errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Connection-level failure reported by the search client. The message
    /// is surfaced verbatim.
    #[error("{0}")]
    Connection(String),

    /// Non-success status returned by the cluster.
    #[error("Elasticsearch error {status} ({error_type}): {reason}")]
    Elasticsearch {
        status: u16,
        error_type: String,
        reason: String,
    },

    #[error("Elasticsearch client is closed")]
    ClientClosed,

    #[error("Parse error in {context}: {message}")]
    Parse { context: String, message: String },

    // Caller errors
    #[error("Invalid input: {field} - {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("MCP protocol error: {0}")]
    Mcp(String),
}

impl Error {
    /// Shorthand for a connection failure.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Shorthand for an invalid argument.
    pub fn invalid_input(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Whether the error was caused by the caller's arguments rather than
    /// by the cluster or the transport.
    #[must_use]
    pub const fn is_caller_error(&self) -> bool {
        matches!(self, Self::InvalidInput { .. } | Self::UnknownTool(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_error_is_verbatim() {
        let err = Error::connection("timeout");
        assert_eq!(err.to_string(), "timeout");
    }

    #[test]
    fn test_elasticsearch_error_display() {
        let err = Error::Elasticsearch {
            status: 404,
            error_type: "index_not_found_exception".to_string(),
            reason: "no such index [docs]".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Elasticsearch error 404 (index_not_found_exception): no such index [docs]"
        );
    }

    #[test]
    fn test_caller_errors() {
        assert!(Error::invalid_input("index", "missing").is_caller_error());
        assert!(Error::UnknownTool("drop_index".to_string()).is_caller_error());
        assert!(!Error::ClientClosed.is_caller_error());
        assert!(!Error::connection("refused").is_caller_error());
    }
}
