//! Toolset error types.
//!
//! Defines error variants for catalog authoring, inventory construction,
//! toolset enablement and upstream calls made by catalog handlers.

use thiserror::Error;

pub type ToolsetResult<T> = Result<T, ToolsetError>;

#[derive(Debug, Error)]
pub enum ToolsetError {
    #[error("Toolset not found: {0}")]
    ToolsetNotFound(String),

    #[error("Unknown toolsets: {}", .0.join(", "))]
    UnknownToolsets(Vec<String>),

    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    #[error("Prompt not found: {0}")]
    PromptNotFound(String),

    #[error("Resource not found: {0}")]
    ResourceNotFound(String),

    #[error("Invalid catalog: {0}")]
    Catalog(String),

    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

/// Errors raised by an [`crate::upstream::UpstreamClient`].
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// The upstream answered with a non-success status.
    #[error("{status}: {message}")]
    Status { status: u16, message: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl UpstreamError {
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self::Status {
            status,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_toolsets_message() {
        let err = ToolsetError::UnknownToolsets(vec!["foo".to_string(), "bar".to_string()]);
        assert_eq!(err.to_string(), "Unknown toolsets: foo, bar");
    }

    #[test]
    fn test_upstream_status_message() {
        let err: ToolsetError = UpstreamError::status(404, "Not Found").into();
        assert_eq!(err.to_string(), "404: Not Found");
    }
}
