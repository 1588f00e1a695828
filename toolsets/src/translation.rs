//! Translation helper used when building catalog text.

use std::{collections::HashMap, fmt, sync::Arc};

/// Resolves a translation key to display text, falling back to the default.
///
/// Keys are upper-snake, e.g. `TOOL_GET_COMMIT_DESCRIPTION`.
#[derive(Clone)]
pub struct Translator {
    lookup: Arc<dyn Fn(&str, &str) -> String + Send + Sync>,
}

impl Translator {
    pub fn new<F>(lookup: F) -> Self
    where
        F: Fn(&str, &str) -> String + Send + Sync + 'static,
    {
        Self {
            lookup: Arc::new(lookup),
        }
    }

    /// Always returns the default text.
    pub fn identity() -> Self {
        Self::new(|_, default| default.to_string())
    }

    /// Returns the override for a key when one is configured.
    pub fn with_overrides(overrides: HashMap<String, String>) -> Self {
        Self::new(move |key, default| {
            overrides
                .get(key)
                .cloned()
                .unwrap_or_else(|| default.to_string())
        })
    }

    pub fn translate(&self, key: &str, default: &str) -> String {
        (self.lookup)(key, default)
    }
}

impl Default for Translator {
    fn default() -> Self {
        Self::identity()
    }
}

impl fmt::Debug for Translator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Translator").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity() {
        let t = Translator::identity();
        assert_eq!(t.translate("ANY_KEY", "fallback"), "fallback");
    }

    #[test]
    fn test_overrides() {
        let mut overrides = HashMap::new();
        overrides.insert("TOOL_X_DESCRIPTION".to_string(), "custom".to_string());
        let t = Translator::with_overrides(overrides);
        assert_eq!(t.translate("TOOL_X_DESCRIPTION", "default"), "custom");
        assert_eq!(t.translate("TOOL_Y_DESCRIPTION", "default"), "default");
    }
}
