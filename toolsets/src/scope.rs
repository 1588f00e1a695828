//! Scope-based capability visibility.
//!
//! Evaluation order:
//! 1. Capability declares no scopes: visible
//! 2. Token holds any accepted scope: visible
//! 3. Capability is read-only: visible (public data needs no grant)
//! 4. Otherwise: hidden
//!
//! Scope hierarchy (`repo` covering `public_repo`) is not computed here. A
//! catalog entry lists every scope that should satisfy it.

use std::collections::HashSet;

use crate::catalog::Capability;

/// Why a capability is visible or hidden.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopeDecision {
    /// The capability declares no scopes.
    Unrestricted,
    /// The token holds this accepted scope.
    Granted(String),
    /// No scope matched, visible because the capability only reads.
    ReadOnly,
    /// The filter was built without scope information.
    Unchecked,
    Hidden,
}

impl ScopeDecision {
    pub fn is_visible(&self) -> bool {
        !matches!(self, ScopeDecision::Hidden)
    }
}

/// Immutable predicate over capabilities, built from a token's scopes.
#[derive(Debug, Clone, Default)]
pub struct ScopeFilter {
    granted: HashSet<String>,
    unchecked: bool,
}

impl ScopeFilter {
    pub fn new<I, S>(scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            granted: scopes.into_iter().map(Into::into).collect(),
            unchecked: false,
        }
    }

    /// Parse an `X-OAuth-Scopes` style header: `"repo, gist, read:org"`.
    pub fn from_header(header: &str) -> Self {
        Self::new(
            header
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
        )
    }

    /// Admits every capability. For tokens whose scopes cannot be known,
    /// e.g. fine-grained tokens that report no scope header.
    pub fn unrestricted() -> Self {
        Self {
            granted: HashSet::new(),
            unchecked: true,
        }
    }

    pub fn is_unrestricted(&self) -> bool {
        self.unchecked
    }

    pub fn granted(&self) -> impl Iterator<Item = &str> {
        self.granted.iter().map(String::as_str)
    }

    pub fn has_scope(&self, scope: &str) -> bool {
        self.granted.contains(scope)
    }

    pub fn evaluate(&self, capability: &Capability) -> ScopeDecision {
        self.evaluate_parts(capability.accepted_scopes(), capability.is_read_only())
    }

    pub fn allows(&self, capability: &Capability) -> bool {
        self.evaluate(capability).is_visible()
    }

    fn evaluate_parts(&self, accepted: &[String], read_only: bool) -> ScopeDecision {
        if accepted.is_empty() {
            return ScopeDecision::Unrestricted;
        }
        if self.unchecked {
            return ScopeDecision::Unchecked;
        }
        if let Some(scope) = accepted.iter().find(|s| self.granted.contains(*s)) {
            return ScopeDecision::Granted(scope.clone());
        }
        if read_only {
            return ScopeDecision::ReadOnly;
        }
        ScopeDecision::Hidden
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::test_support::test_tool;

    fn scope_sets() -> Vec<ScopeFilter> {
        vec![
            ScopeFilter::new(Vec::<String>::new()),
            ScopeFilter::new(["repo"]),
            ScopeFilter::new(["gist", "read:org"]),
            ScopeFilter::new(["public_repo", "notifications", "user"]),
        ]
    }

    #[test]
    fn test_no_scopes_always_visible() {
        for read_only in [true, false] {
            let tool = test_tool("repos", "t", read_only, &[]);
            for filter in scope_sets() {
                assert_eq!(filter.evaluate(&tool), ScopeDecision::Unrestricted);
            }
        }
    }

    #[test]
    fn test_read_only_visible_without_grant() {
        let tool = test_tool("repos", "get_commit", true, &["repo", "public_repo"]);
        let empty = ScopeFilter::new(Vec::<String>::new());
        assert_eq!(empty.evaluate(&tool), ScopeDecision::ReadOnly);
        for filter in scope_sets() {
            assert!(filter.allows(&tool));
        }
    }

    #[test]
    fn test_write_hidden_without_grant() {
        let empty = ScopeFilter::new(Vec::<String>::new());
        for scopes in [&["repo"][..], &["gist"][..], &["public_repo", "repo"][..]] {
            let tool = test_tool("repos", "w", false, scopes);
            assert_eq!(empty.evaluate(&tool), ScopeDecision::Hidden);
        }
    }

    #[test]
    fn test_repo_token_visibility() {
        let filter = ScopeFilter::new(["repo"]);
        let repo_only = test_tool("repos", "a", false, &["repo"]);
        let both = test_tool("repos", "b", false, &["public_repo", "repo"]);
        let public_only = test_tool("repos", "c", false, &["public_repo"]);

        assert_eq!(
            filter.evaluate(&repo_only),
            ScopeDecision::Granted("repo".to_string())
        );
        assert!(filter.allows(&both));
        assert!(!filter.allows(&public_only));
    }

    #[test]
    fn test_filtering_scenario() {
        let filter = ScopeFilter::new(["repo"]);
        let tools = vec![
            test_tool("repos", "toolNoScopes", false, &[]),
            test_tool("gists", "toolGistScope", false, &["gist"]),
            test_tool("repos", "toolPublicRepoScope", false, &["public_repo", "repo"]),
        ];
        let visible: Vec<&str> = tools
            .iter()
            .filter(|t| filter.allows(t))
            .map(|t| t.name())
            .collect();
        assert_eq!(visible, vec!["toolNoScopes", "toolPublicRepoScope"]);
    }

    #[test]
    fn test_from_header() {
        let filter = ScopeFilter::from_header(" repo, gist ,, read:org ");
        assert!(filter.has_scope("repo"));
        assert!(filter.has_scope("gist"));
        assert!(filter.has_scope("read:org"));
        assert_eq!(filter.granted().count(), 3);
        assert_eq!(ScopeFilter::from_header("").granted().count(), 0);
    }

    #[test]
    fn test_unrestricted_admits_everything() {
        let filter = ScopeFilter::unrestricted();
        let tool = test_tool("gists", "create_gist", false, &["gist"]);
        assert_eq!(filter.evaluate(&tool), ScopeDecision::Unchecked);
        assert!(filter.is_unrestricted());
    }
}
