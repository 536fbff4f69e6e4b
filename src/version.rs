use std::fmt;
use std::str::FromStr;

use crate::error::BcryptError;

/// Longest password, in bytes, that the key schedule reads.
pub const MAX_PASSWORD_LEN: usize = 72;

/// Supported bcrypt format identifiers.
///
/// `2a` and `2b` are produced by current implementations. `2y` is accepted
/// as a synonym for `2b` and keeps its own identifier when re-hashed, so a
/// `$2y$` hash verifies against a `$2y$` recomputation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Version {
    V2a,
    #[default]
    V2b,
    V2y,
}

impl Version {
    pub const ALL: [Version; 3] = [Version::V2a, Version::V2b, Version::V2y];

    /// The 4-byte identifier, e.g. `$2b$`.
    pub const fn identifier(self) -> &'static str {
        match self {
            Version::V2a => "$2a$",
            Version::V2b => "$2b$",
            Version::V2y => "$2y$",
        }
    }

    /// The minor version letter, e.g. `b`.
    pub const fn minor(self) -> char {
        match self {
            Version::V2a => 'a',
            Version::V2b => 'b',
            Version::V2y => 'y',
        }
    }

    /// Looks up a 4-byte `$2?$` identifier.
    pub fn from_identifier(id: &[u8]) -> Result<Self, BcryptError> {
        Version::ALL
            .into_iter()
            .find(|v| v.identifier().as_bytes() == id)
            .ok_or_else(|| BcryptError::InvalidVersion(String::from_utf8_lossy(id).into_owned()))
    }

    /// Whether passwords over [`MAX_PASSWORD_LEN`] bytes are rejected.
    ///
    /// `2a` instead hashes only the first 72 bytes.
    pub const fn enforces_length_limit(self) -> bool {
        !matches!(self, Version::V2a)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "2{}", self.minor())
    }
}

/// Parses the bare form used on the command line: `2a`, `2b` or `2y`.
impl FromStr for Version {
    type Err = BcryptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Version::ALL
            .into_iter()
            .find(|v| v.to_string() == s)
            .ok_or_else(|| BcryptError::InvalidVersion(s.to_string()))
    }
}
