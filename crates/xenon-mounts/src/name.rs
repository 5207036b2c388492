//! Validated mount names.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

/// Name reserved for the product itself; compared ASCII case-insensitively.
pub const RESERVED_NAME: &str = "xenon";

/// Reasons a proposed mount name is refused.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MountNameError {
    /// The name was empty.
    #[error("mount name must not be empty")]
    Empty,
    /// The name contained something other than letters, digits, `.`, `_`, `-`.
    #[error(
        "mount name contains '{character}'; only letters, digits, dots, dashes and underscores are allowed"
    )]
    InvalidCharacter {
        /// First offending character.
        character: char,
    },
    /// The name collides with the product name.
    #[error("'{name}' is reserved")]
    Reserved {
        /// Name as supplied.
        name: String,
    },
}

/// A mount name matching `^[A-Za-z0-9_.-]+$` that is not the reserved name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct MountName(String);

impl MountName {
    /// The name as text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the name.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl FromStr for MountName {
    type Err = MountNameError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        if input.is_empty() {
            return Err(MountNameError::Empty);
        }
        if let Some(character) = input.chars().find(|c| !is_name_char(*c)) {
            return Err(MountNameError::InvalidCharacter { character });
        }
        if input.eq_ignore_ascii_case(RESERVED_NAME) {
            return Err(MountNameError::Reserved {
                name: input.to_owned(),
            });
        }
        Ok(Self(input.to_owned()))
    }
}

impl AsRef<str> for MountName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MountName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

const fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-')
}
