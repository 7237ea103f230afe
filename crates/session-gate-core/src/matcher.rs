// crates/session-gate-core/src/matcher.rs
// ============================================================================
// Module: Protected Path Matcher
// Description: Declarative prefix matching for protected request paths.
// Purpose: Decide which request paths are subject to the session gate.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! The matcher holds the validated set of protected path prefixes. Matching
//! is segment-aware: `/protected` covers `/protected` itself and any nested
//! sub-path such as `/protected/dashboard`, but never `/protectedx`. The
//! matcher is consulted by the transport layer when wiring routes; requests
//! outside the protected set bypass the gate entirely.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum number of protected prefixes accepted by a matcher.
pub const MAX_PROTECTED_PREFIXES: usize = 64;
/// Maximum length of a single protected prefix in bytes.
pub const MAX_PREFIX_LENGTH: usize = 512;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Matcher construction errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MatcherError {
    /// No prefixes were supplied.
    #[error("at least one protected prefix is required")]
    Empty,
    /// Too many prefixes were supplied.
    #[error("too many protected prefixes: {count} exceeds {max}")]
    TooMany {
        /// Number of prefixes supplied.
        count: usize,
        /// Maximum allowed prefix count.
        max: usize,
    },
    /// A prefix is malformed.
    #[error("invalid protected prefix {prefix:?}: {reason}")]
    InvalidPrefix {
        /// Offending prefix value.
        prefix: String,
        /// Validation failure reason.
        reason: String,
    },
}

// ============================================================================
// SECTION: Path Matcher
// ============================================================================

/// Validated set of protected path prefixes.
///
/// # Invariants
/// - Every prefix starts with `/`, names at least one non-empty segment,
///   and carries no query, fragment, whitespace, or trailing slash.
/// - `matches` is total: any input string yields a deterministic answer
///   and malformed paths simply fail to match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathMatcher {
    /// Validated protected prefixes.
    prefixes: Vec<String>,
}

impl PathMatcher {
    /// Builds a matcher from the supplied prefixes.
    ///
    /// # Errors
    ///
    /// Returns [`MatcherError`] when the prefix set is empty, oversized, or
    /// contains a malformed prefix.
    pub fn new(prefixes: impl IntoIterator<Item = impl Into<String>>) -> Result<Self, MatcherError> {
        let prefixes: Vec<String> = prefixes.into_iter().map(Into::into).collect();
        if prefixes.is_empty() {
            return Err(MatcherError::Empty);
        }
        if prefixes.len() > MAX_PROTECTED_PREFIXES {
            return Err(MatcherError::TooMany {
                count: prefixes.len(),
                max: MAX_PROTECTED_PREFIXES,
            });
        }
        for prefix in &prefixes {
            validate_prefix(prefix)?;
        }
        Ok(Self {
            prefixes,
        })
    }

    /// Returns true when the path falls under a protected prefix.
    #[must_use]
    pub fn matches(&self, path: &str) -> bool {
        self.prefixes.iter().any(|prefix| segment_match(prefix, path))
    }

    /// Returns the validated prefixes.
    #[must_use]
    pub fn prefixes(&self) -> &[String] {
        &self.prefixes
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Validates a single protected prefix.
fn validate_prefix(prefix: &str) -> Result<(), MatcherError> {
    let invalid = |reason: &str| MatcherError::InvalidPrefix {
        prefix: prefix.to_string(),
        reason: reason.to_string(),
    };
    if !prefix.starts_with('/') {
        return Err(invalid("must start with '/'"));
    }
    if prefix == "/" {
        return Err(invalid("must name at least one segment"));
    }
    if prefix.len() > MAX_PREFIX_LENGTH {
        return Err(invalid("exceeds maximum length"));
    }
    if prefix.ends_with('/') {
        return Err(invalid("must not end with '/'"));
    }
    if prefix.contains(['?', '#']) {
        return Err(invalid("must not contain query or fragment"));
    }
    if prefix.contains(['{', '}', '*']) {
        return Err(invalid("must not contain routing metacharacters"));
    }
    if prefix.chars().any(char::is_whitespace) {
        return Err(invalid("must not contain whitespace"));
    }
    if prefix.contains("//") {
        return Err(invalid("must not contain empty segments"));
    }
    Ok(())
}

/// Returns true when `path` equals `prefix` or starts a nested segment under it.
fn segment_match(prefix: &str, path: &str) -> bool {
    path.strip_prefix(prefix).is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}
