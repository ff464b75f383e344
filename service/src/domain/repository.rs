//! [`Repository`] definitions.

use std::str::FromStr;

use derive_more::{AsRef, Display, Into};
use serde::{Deserialize, Serialize};

use super::user;

/// GitHub repository which may be submitted as an [`Entry`].
///
/// [`Entry`]: super::Entry
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Repository {
    /// [`FullName`] of this [`Repository`].
    pub full_name: FullName,

    /// Description of this [`Repository`].
    pub description: Option<String>,

    /// Number of stargazers of this [`Repository`].
    pub stargazers_count: i32,

    /// Number of open issues of this [`Repository`], if known.
    pub open_issues_count: Option<i32>,
}

impl Repository {
    /// Returns the URL of this [`Repository`] on GitHub.
    #[must_use]
    pub fn html_url(&self) -> String {
        format!("https://github.com/{}", self.full_name)
    }
}

/// Full name of a [`Repository`] in the `owner/name` format.
#[derive(
    AsRef,
    Clone,
    Debug,
    Deserialize,
    Display,
    Eq,
    Hash,
    Into,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
)]
#[as_ref(str)]
#[serde(into = "String", try_from = "String")]
pub struct FullName(String);

impl FullName {
    /// Creates a new [`FullName`] if the given `name` is valid.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        Self::check(&name).then_some(Self(name))
    }

    /// Returns the [`user::Login`] of the owner of the [`Repository`].
    #[must_use]
    pub fn owner(&self) -> user::Login {
        let (owner, _) = self.split();
        user::Login::new(owner)
            .unwrap_or_else(|| unreachable!("checked on construction"))
    }

    /// Returns the short name of the [`Repository`] (without its owner).
    #[must_use]
    pub fn name(&self) -> &str {
        self.split().1
    }

    /// Splits this [`FullName`] into the owner and name parts.
    fn split(&self) -> (&str, &str) {
        self.0
            .split_once('/')
            .unwrap_or_else(|| unreachable!("checked on construction"))
    }

    /// Checks whether the given `name` is a valid [`FullName`].
    ///
    /// Both the owner and the name must be valid GitHub name segments
    /// separated by a single `/`.
    fn check(name: impl AsRef<str>) -> bool {
        name.as_ref().split_once('/').is_some_and(|(owner, name)| {
            super::SEGMENT.is_match(owner) && super::SEGMENT.is_match(name)
        })
    }
}

impl FromStr for FullName {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `FullName`")
    }
}

impl TryFrom<String> for FullName {
    type Error = &'static str;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s).ok_or("invalid `FullName`")
    }
}

#[cfg(test)]
mod spec {
    use super::FullName;

    #[test]
    fn validates_full_name() {
        assert!(FullName::new("apollographql/GitHunt-API").is_some());
        assert!(FullName::new("rust-lang/rust.vim").is_some());

        assert!(FullName::new("").is_none());
        assert!(FullName::new("no-owner").is_none());
        assert!(FullName::new("/name").is_none());
        assert!(FullName::new("owner/").is_none());
        assert!(FullName::new("a/b/c").is_none());
        assert!(FullName::new("owner/na me").is_none());
    }

    #[test]
    fn splits_owner_and_name() {
        let name = FullName::new("apollographql/GitHunt-API").unwrap();

        assert_eq!(name.owner().as_ref(), "apollographql");
        assert_eq!(name.name(), "GitHunt-API");
    }
}
