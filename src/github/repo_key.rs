//! Repository identity and credential wrappers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::ForgeError;

/// Repository identifier in the form `owner/repo`.
///
/// Keys compare by exact string value; GitHub's canonical casing is not
/// enforced.
///
/// ```
/// use forgebar::RepoKey;
///
/// let key = RepoKey::parse("acme/widgets").expect("valid key");
/// assert_eq!(key.owner(), "acme");
/// assert_eq!(key.name(), "widgets");
/// assert_eq!(key.to_string(), "acme/widgets");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RepoKey {
    owner: String,
    name: String,
}

impl RepoKey {
    /// Parses an `owner/repo` string.
    ///
    /// # Errors
    ///
    /// Returns [`ForgeError::InvalidRepoKey`] unless the input holds exactly
    /// one `/` with non-empty text on both sides.
    pub fn parse(input: &str) -> Result<Self, ForgeError> {
        let invalid = || ForgeError::InvalidRepoKey {
            value: input.to_owned(),
        };
        let (owner, name) = input.split_once('/').ok_or_else(invalid)?;
        if owner.is_empty() || name.is_empty() || name.contains('/') {
            return Err(invalid());
        }
        Ok(Self {
            owner: owner.to_owned(),
            name: name.to_owned(),
        })
    }

    /// Builds a key from separate owner and repository names.
    ///
    /// # Errors
    ///
    /// Returns [`ForgeError::InvalidRepoKey`] when either part is empty or
    /// contains a `/`.
    pub fn new(owner: &str, name: &str) -> Result<Self, ForgeError> {
        if owner.contains('/') {
            return Err(ForgeError::InvalidRepoKey {
                value: format!("{owner}/{name}"),
            });
        }
        Self::parse(&format!("{owner}/{name}"))
    }

    /// Repository owner.
    #[must_use]
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Repository name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// REST route prefix for this repository.
    pub(crate) fn api_path(&self) -> String {
        format!("/repos/{}/{}", self.owner, self.name)
    }
}

impl fmt::Display for RepoKey {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}/{}", self.owner, self.name)
    }
}

impl FromStr for RepoKey {
    type Err = ForgeError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        Self::parse(input)
    }
}

impl TryFrom<String> for RepoKey {
    type Error = ForgeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<RepoKey> for String {
    fn from(value: RepoKey) -> Self {
        value.to_string()
    }
}

/// Personal access token wrapper enforcing presence.
#[derive(Clone, PartialEq, Eq)]
pub struct PersonalAccessToken(String);

impl PersonalAccessToken {
    /// Validates that the token is non-empty and trims whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`ForgeError::Unauthenticated`] when the supplied string is
    /// blank.
    pub fn new(token: impl AsRef<str>) -> Result<Self, ForgeError> {
        let trimmed = token.as_ref().trim();
        if trimmed.is_empty() {
            return Err(ForgeError::Unauthenticated);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the token value.
    #[must_use]
    pub const fn value(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for PersonalAccessToken {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("PersonalAccessToken(***)")
    }
}

impl AsRef<str> for PersonalAccessToken {
    fn as_ref(&self) -> &str {
        self.value()
    }
}
