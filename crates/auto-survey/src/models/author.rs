//! Author data model.

use serde::{Deserialize, Serialize};

/// Placeholder used wherever an author name is needed but none is known.
pub const UNKNOWN_AUTHOR: &str = "Unknown Author";

/// An author of a research paper.
///
/// Either name part may be empty when the index did not provide it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Author {
    /// Given name.
    pub first_name: String,

    /// Family name.
    pub last_name: String,
}

impl Author {
    /// Create an author from its name parts.
    #[must_use]
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self { first_name: first_name.into(), last_name: last_name.into() }
    }

    /// Split a full display name on whitespace.
    ///
    /// The first token is the first name and the last token the last name; a
    /// single-token name is treated as a last name.
    #[must_use]
    pub fn from_full_name(name: &str) -> Self {
        let mut tokens = name.split_whitespace();
        match (tokens.next(), tokens.next_back()) {
            (Some(first), Some(last)) => Self::new(first, last),
            (Some(only), None) => Self::new("", only),
            _ => Self::default(),
        }
    }

    /// Name used in in-text citations: the last name, falling back to
    /// whatever part is known.
    #[must_use]
    pub fn surname(&self) -> &str {
        if !self.last_name.is_empty() {
            &self.last_name
        } else if !self.first_name.is_empty() {
            &self.first_name
        } else {
            UNKNOWN_AUTHOR
        }
    }

    /// Name used in reference entries, `"last, first"`.
    #[must_use]
    pub fn display_name(&self) -> String {
        match (self.last_name.is_empty(), self.first_name.is_empty()) {
            (false, false) => format!("{}, {}", self.last_name, self.first_name),
            (false, true) => self.last_name.clone(),
            (true, false) => self.first_name.clone(),
            (true, true) => UNKNOWN_AUTHOR.to_string(),
        }
    }
}

impl std::fmt::Display for Author {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.display_name())
    }
}
