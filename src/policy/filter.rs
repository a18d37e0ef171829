//! Policy Filter
//!
//! Method and filename-suffix deny lists.

use tracing::info;

/// Methods refused unless configured otherwise.
pub const DEFAULT_DENIED_METHODS: &[&str] = &["DELETE", "PATCH"];

/// Path suffixes refused unless configured otherwise.
pub const DEFAULT_DENIED_SUFFIXES: &[&str] = &[".exe", ".bat", ".sh", ".cmd"];

// == Block Policy ==
/// Ordered deny lists consumed by [`PolicyFilter`].
///
/// Both comparisons are exact and case-sensitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockPolicy {
    denied_methods: Vec<String>,
    denied_suffixes: Vec<String>,
}

impl BlockPolicy {
    // == Constructor ==
    /// Builds a policy from explicit deny lists, kept in the given order.
    pub fn new(denied_methods: Vec<String>, denied_suffixes: Vec<String>) -> Self {
        Self {
            denied_methods,
            denied_suffixes,
        }
    }

    // == Allow All ==
    /// A policy that allows everything.
    pub fn allow_all() -> Self {
        Self::new(Vec::new(), Vec::new())
    }

    // == Accessors ==
    /// Methods refused outright.
    pub fn denied_methods(&self) -> &[String] {
        &self.denied_methods
    }

    /// Path suffixes refused for any method.
    pub fn denied_suffixes(&self) -> &[String] {
        &self.denied_suffixes
    }
}

impl Default for BlockPolicy {
    fn default() -> Self {
        Self::new(
            DEFAULT_DENIED_METHODS.iter().map(|m| m.to_string()).collect(),
            DEFAULT_DENIED_SUFFIXES.iter().map(|s| s.to_string()).collect(),
        )
    }
}

// == Policy Filter ==
/// Stateless request admission check.
#[derive(Debug, Clone, Default)]
pub struct PolicyFilter {
    policy: BlockPolicy,
}

impl PolicyFilter {
    // == Constructor ==
    /// Wraps a policy for request admission.
    pub fn new(policy: BlockPolicy) -> Self {
        Self { policy }
    }

    // == Policy ==
    /// Returns the deny lists in effect.
    pub fn policy(&self) -> &BlockPolicy {
        &self.policy
    }

    // == Is Blocked ==
    /// Returns true when the method is denied or the path ends with a
    /// denied suffix. Callers pass the percent-decoded path. Emits an info
    /// event on denial.
    pub fn is_blocked(&self, method: &str, path: &str) -> bool {
        let method_denied = self.policy.denied_methods.iter().any(|m| m == method);
        let suffix_denied = self
            .policy
            .denied_suffixes
            .iter()
            .any(|s| path.ends_with(s.as_str()));

        if method_denied || suffix_denied {
            let reason = if method_denied { "method" } else { "suffix" };
            info!(method = %method, path = %path, reason, "Request blocked by policy");
            return true;
        }

        false
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy_blocks_methods() {
        let filter = PolicyFilter::default();
        assert!(filter.is_blocked("DELETE", "/anything"));
        assert!(filter.is_blocked("PATCH", "/"));
    }

    #[test]
    fn test_default_policy_allows_common_methods() {
        let filter = PolicyFilter::default();
        for method in ["GET", "POST", "PUT", "HEAD", "OPTIONS"] {
            assert!(!filter.is_blocked(method, "/index.html"), "{} should pass", method);
        }
    }

    #[test]
    fn test_method_match_is_case_sensitive() {
        let filter = PolicyFilter::default();
        assert!(!filter.is_blocked("delete", "/a"));
        assert!(!filter.is_blocked("Patch", "/a"));
    }

    #[test]
    fn test_default_policy_blocks_suffixes() {
        let filter = PolicyFilter::default();
        assert!(filter.is_blocked("GET", "/downloads/setup.exe"));
        assert!(filter.is_blocked("GET", "/run.bat"));
        assert!(filter.is_blocked("POST", "/scripts/install.sh"));
        assert!(filter.is_blocked("GET", "/x.cmd"));
    }

    #[test]
    fn test_suffix_match_is_case_sensitive_and_literal() {
        let filter = PolicyFilter::default();
        assert!(!filter.is_blocked("GET", "/setup.EXE"));
        assert!(!filter.is_blocked("GET", "/setup.exe/readme"));
        assert!(!filter.is_blocked("GET", "/shell"));
        // Literal suffix: no dot boundary required beyond the configured text
        assert!(filter.is_blocked("GET", "/archive.tar.sh"));
    }

    #[test]
    fn test_custom_policy() {
        let filter = PolicyFilter::new(BlockPolicy::new(
            vec!["PUT".to_string()],
            vec![".zip".to_string()],
        ));
        assert!(filter.is_blocked("PUT", "/a"));
        assert!(filter.is_blocked("GET", "/a.zip"));
        assert!(!filter.is_blocked("DELETE", "/a"));
        assert!(!filter.is_blocked("GET", "/a.exe"));
    }

    #[test]
    fn test_allow_all_policy() {
        let filter = PolicyFilter::new(BlockPolicy::allow_all());
        assert!(!filter.is_blocked("DELETE", "/a.exe"));
    }
}
