//! Wildcard pattern matching.
//!
//! [`Pattern`] is the one non-trivial matcher in the query layer: a string
//! containing `*` wildcards, compiled to an anchored regex. Every other name
//! predicate is a plain string operation (see [`NameMatch`](crate::NameMatch)).
//!
//! Compilation is eager: an invalid or oversized pattern is rejected when the
//! filter is registered, not when candidates are evaluated.

use crate::{IntrospectError, MAX_PATTERN_LENGTH};
use regex::Regex;
use std::fmt;

/// A compiled wildcard pattern.
///
/// `*` matches zero or more of any character, including namespace and path
/// separators — `App\Models\*` matches `App\Models\Post\Comment`. Every other
/// character is literal, so caller-supplied names cannot smuggle regex syntax
/// through. Matching is whole-string and case-sensitive; a pattern without `*`
/// is an exact-match pattern.
///
/// # Example
///
/// ```
/// use scry::Pattern;
///
/// let pattern = Pattern::compile("App\\Models\\*")?;
/// assert!(pattern.matches("App\\Models\\User"));
/// assert!(pattern.matches("App\\Models\\Post\\Comment"));
/// assert!(!pattern.matches("App\\Services\\Billing"));
/// # Ok::<(), scry::IntrospectError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Pattern {
    raw: String,
    regex: Regex,
}

impl Pattern {
    /// Compile a wildcard pattern.
    ///
    /// Literal runs are regex-escaped, each `*` becomes `.*`, and the whole
    /// expression is anchored (`^...$`).
    ///
    /// # Errors
    ///
    /// [`IntrospectError::PatternTooLong`] if the pattern exceeds
    /// [`MAX_PATTERN_LENGTH`]; [`IntrospectError::InvalidPattern`] if the
    /// regex engine rejects the compiled expression.
    pub fn compile(pattern: &str) -> Result<Self, IntrospectError> {
        if pattern.len() > MAX_PATTERN_LENGTH {
            return Err(IntrospectError::PatternTooLong {
                len: pattern.len(),
                max: MAX_PATTERN_LENGTH,
            });
        }

        let expr = to_anchored_regex(pattern);
        let regex = Regex::new(&expr).map_err(|e| IntrospectError::InvalidPattern {
            pattern: pattern.to_string(),
            source: e.to_string(),
        })?;

        Ok(Self {
            raw: pattern.to_string(),
            regex,
        })
    }

    /// Test a candidate against the pattern (whole-string, case-sensitive).
    #[must_use]
    pub fn matches(&self, candidate: &str) -> bool {
        self.regex.is_match(candidate)
    }

    /// The original pattern string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// `true` if the pattern contains no `*` and therefore requires an exact
    /// match.
    #[must_use]
    pub fn is_literal(&self) -> bool {
        !self.raw.contains('*')
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Escape literal runs, substitute `*` → `.*`, anchor start and end.
fn to_anchored_regex(pattern: &str) -> String {
    let mut expr = String::with_capacity(pattern.len() + 8);
    expr.push('^');
    for (i, literal) in pattern.split('*').enumerate() {
        if i > 0 {
            expr.push_str(".*");
        }
        expr.push_str(&regex::escape(literal));
    }
    expr.push('$');
    expr
}

#[cfg(test)]
mod tests {
    use super::*;

    // ========== Anchoring ==========

    #[test]
    fn literal_pattern_is_exact_match() {
        let p = Pattern::compile("App\\Models\\User").unwrap();
        assert!(p.matches("App\\Models\\User"));
        assert!(!p.matches("App\\Models\\UserProfile"));
        assert!(!p.matches("My\\App\\Models\\User"));
    }

    #[test]
    fn empty_pattern_matches_only_empty_candidate() {
        let p = Pattern::compile("").unwrap();
        assert!(p.matches(""));
        assert!(!p.matches("x"));
    }

    // ========== Wildcards ==========

    #[test]
    fn wildcard_crosses_separators() {
        let p = Pattern::compile("App\\Models\\*").unwrap();
        assert!(p.matches("App\\Models\\User"));
        assert!(p.matches("App\\Models\\Post\\Comment"));
        assert!(!p.matches("App\\Services\\Billing"));
    }

    #[test]
    fn bare_star_matches_everything() {
        let p = Pattern::compile("*").unwrap();
        assert!(p.matches(""));
        assert!(p.matches("anything"));
        assert!(p.matches("App\\Models\\User"));
    }

    #[test]
    fn wildcard_matches_zero_characters() {
        let p = Pattern::compile("User*").unwrap();
        assert!(p.matches("User"));
        assert!(p.matches("UserProfile"));
    }

    #[test]
    fn multiple_wildcards() {
        let p = Pattern::compile("App\\*\\*Controller").unwrap();
        assert!(p.matches("App\\Http\\UserController"));
        assert!(p.matches("App\\Http\\Admin\\UserController"));
        assert!(!p.matches("App\\Http\\UserService"));
    }

    #[test]
    fn leading_and_trailing_wildcards() {
        let p = Pattern::compile("*Job*").unwrap();
        assert!(p.matches("SendEmailJob"));
        assert!(p.matches("JobDispatcher"));
        assert!(!p.matches("SendEmail"));
    }

    // ========== Escaping ==========

    #[test]
    fn dot_is_literal() {
        let p = Pattern::compile("A.B*").unwrap();
        assert!(p.matches("A.B123"));
        assert!(!p.matches("AXB123"));
    }

    #[test]
    fn backslash_is_literal() {
        let p = Pattern::compile("App\\Models").unwrap();
        assert!(p.matches("App\\Models"));
        assert!(!p.matches("AppModels"));
    }

    #[test]
    fn regex_metacharacters_are_literal() {
        let p = Pattern::compile("get(+)?[a]").unwrap();
        assert!(p.matches("get(+)?[a]"));
        assert!(!p.matches("geta"));
    }

    // ========== Case sensitivity ==========

    #[test]
    fn matching_is_case_sensitive() {
        let p = Pattern::compile("App\\*").unwrap();
        assert!(p.matches("App\\User"));
        assert!(!p.matches("app\\User"));
    }

    // ========== Limits and accessors ==========

    #[test]
    fn oversized_pattern_is_rejected() {
        let long = "a".repeat(crate::MAX_PATTERN_LENGTH + 1);
        let err = Pattern::compile(&long).unwrap_err();
        assert!(matches!(err, IntrospectError::PatternTooLong { .. }));
    }

    #[test]
    fn pattern_at_limit_compiles() {
        let long = "a".repeat(crate::MAX_PATTERN_LENGTH);
        assert!(Pattern::compile(&long).is_ok());
    }

    #[test]
    fn accessors() {
        let p = Pattern::compile("App\\*").unwrap();
        assert_eq!(p.as_str(), "App\\*");
        assert!(!p.is_literal());
        assert!(Pattern::compile("App\\User").unwrap().is_literal());
        assert_eq!(format!("{p}"), "App\\*");
    }
}
