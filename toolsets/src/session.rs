//! Session context threaded through inventory queries.

use serde::{Deserialize, Serialize};

/// Unique identifier for an agent session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SessionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Ambient per-request context.
///
/// Inventory operations never block or suspend, so this is only used to
/// correlate log lines with the session and request that triggered them.
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    pub session_id: SessionId,
    pub request_id: Option<String>,
}

impl SessionContext {
    pub fn new(session_id: impl Into<SessionId>) -> Self {
        Self {
            session_id: session_id.into(),
            request_id: None,
        }
    }

    #[must_use]
    pub fn with_request(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_id() {
        let id = SessionId::new("session-123");
        assert_eq!(id.as_str(), "session-123");
        assert_eq!(id.to_string(), "session-123");
    }

    #[test]
    fn test_session_id_default_is_unique() {
        assert_ne!(SessionId::default(), SessionId::default());
    }

    #[test]
    fn test_session_context_with_request() {
        let ctx = SessionContext::new("s1").with_request("42");
        assert_eq!(ctx.session_id.as_str(), "s1");
        assert_eq!(ctx.request_id.as_deref(), Some("42"));
    }
}
