//! [`User`] definitions.

use std::str::FromStr;

use derive_more::{AsRef, Display, Into};
use serde::{Deserialize, Serialize};

/// Authenticated GitHub user.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct User {
    /// [`Login`] of this [`User`].
    pub login: Login,
}

impl User {
    /// Returns the URL of this [`User`]'s avatar.
    #[must_use]
    pub fn avatar_url(&self) -> String {
        format!("https://github.com/{}.png", self.login)
    }

    /// Returns the URL of this [`User`]'s GitHub profile.
    #[must_use]
    pub fn html_url(&self) -> String {
        format!("https://github.com/{}", self.login)
    }
}

/// GitHub login of a [`User`].
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
pub struct Login(String);

impl Login {
    /// Creates a new [`Login`] if the given `login` is valid.
    #[must_use]
    pub fn new(login: impl Into<String>) -> Option<Self> {
        let login = login.into();
        Self::check(&login).then_some(Self(login))
    }

    /// Checks whether the given `login` is a valid [`Login`].
    fn check(login: impl AsRef<str>) -> bool {
        super::SEGMENT.is_match(login.as_ref())
    }
}

impl FromStr for Login {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Login`")
    }
}

impl TryFrom<String> for Login {
    type Error = &'static str;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s).ok_or("invalid `Login`")
    }
}

#[cfg(test)]
mod spec {
    use super::{Login, User};

    #[test]
    fn validates_login() {
        assert!(Login::new("octocat").is_some());
        assert!(Login::new("some-user_1.2").is_some());

        assert!(Login::new("").is_none());
        assert!(Login::new("with space").is_none());
        assert!(Login::new("slash/login").is_none());
    }

    #[test]
    fn derives_urls_from_login() {
        let user = User {
            login: Login::new("octocat").unwrap(),
        };

        assert_eq!(user.html_url(), "https://github.com/octocat");
        assert_eq!(user.avatar_url(), "https://github.com/octocat.png");
    }
}
