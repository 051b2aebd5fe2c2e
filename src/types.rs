//! Newtype wrappers for domain identifiers.

use std::fmt;

/// A git revision identifier as delivered by the push machinery
/// (40 hex characters for current repositories).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Sha(pub String);

impl Sha {
    /// Creates a new Sha from a string.
    ///
    /// The format is not validated here; the hook passes identifiers
    /// through to git, which rejects anything it cannot resolve.
    pub fn new(s: impl Into<String>) -> Self {
        Sha(s.into())
    }

    /// Returns the revision as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns a short (7-character) version for display.
    ///
    /// Falls back to the full string when the identifier is shorter, which
    /// can happen for the degenerate empty deploy target.
    pub fn short(&self) -> &str {
        self.0.get(..7).unwrap_or(&self.0)
    }

    /// True when no deploy-branch update was seen on the input stream.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Sha {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for Sha {
    fn from(s: String) -> Self {
        Sha(s)
    }
}

impl From<&str> for Sha {
    fn from(s: &str) -> Self {
        Sha(s.to_string())
    }
}

/// One ref update reported on the hook's standard input.
///
/// Lives only for the duration of processing one input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefUpdate {
    /// Revision the ref pointed at before the push.
    pub old: Sha,
    /// Revision the ref points at now.
    pub new: Sha,
    /// Full ref name, e.g. `refs/heads/master`.
    pub ref_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn short_is_a_seven_char_prefix(s in "[0-9a-f]{40}") {
            let sha = Sha::new(&s);
            prop_assert_eq!(sha.short().len(), 7);
            prop_assert!(s.starts_with(sha.short()));
        }

        #[test]
        fn display_round_trips(s in "[0-9a-f]{40}") {
            let sha = Sha::new(&s);
            prop_assert_eq!(format!("{}", sha), s);
        }
    }

    #[test]
    fn short_handles_short_input() {
        assert_eq!(Sha::new("abc").short(), "abc");
    }

    #[test]
    fn empty_sha_is_empty() {
        assert!(Sha::default().is_empty());
        assert!(!Sha::new("abc").is_empty());
    }
}
