//! [`Comment`] definitions.

use std::str::FromStr;

use common::DateTimeOf;
use derive_more::{AsRef, Display, From, Into};
use serde::{Deserialize, Serialize};

use super::{repository, user};

/// Comment left on an [`Entry`].
///
/// [`Entry`]: super::Entry
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Comment {
    /// ID of this [`Comment`].
    pub id: Id,

    /// [`repository::FullName`] of the commented [`Entry`].
    ///
    /// [`Entry`]: super::Entry
    pub repository_name: repository::FullName,

    /// [`user::Login`] of the author of this [`Comment`].
    pub posted_by: user::Login,

    /// [`Content`] of this [`Comment`].
    pub content: Content,

    /// [`DateTime`] when this [`Comment`] was created.
    ///
    /// [`DateTime`]: common::DateTime
    #[serde(with = "common::datetime::serde::unix_timestamp_millis")]
    pub created_at: CreationDateTime,
}

/// ID of a [`Comment`].
#[derive(
    Clone,
    Copy,
    Debug,
    Deserialize,
    Display,
    Eq,
    From,
    Hash,
    Into,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
)]
pub struct Id(i32);

/// [`DateTime`] when a [`Comment`] was created.
///
/// [`DateTime`]: common::DateTime
pub type CreationDateTime = DateTimeOf<Comment>;

/// Text content of a [`Comment`].
#[derive(
    AsRef, Clone, Debug, Deserialize, Display, Eq, Into, PartialEq, Serialize,
)]
#[as_ref(str)]
#[serde(into = "String", try_from = "String")]
pub struct Content(String);

impl Content {
    /// Maximum length of a [`Content`] in characters.
    pub const MAX_LEN: usize = 10_000;

    /// Creates a new [`Content`] if the given `content` is valid.
    #[must_use]
    pub fn new(content: impl Into<String>) -> Option<Self> {
        let content = content.into();
        Self::check(&content).then_some(Self(content))
    }

    /// Checks whether the given `content` is a valid [`Content`].
    fn check(content: impl AsRef<str>) -> bool {
        let content = content.as_ref();
        !content.trim().is_empty() && content.chars().count() <= Self::MAX_LEN
    }
}

impl FromStr for Content {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Content`")
    }
}

impl TryFrom<String> for Content {
    type Error = &'static str;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s).ok_or("invalid `Content`")
    }
}

/// Number of [`Comment`]s left on an [`Entry`].
///
/// [`Entry`]: super::Entry
#[derive(Clone, Copy, Debug, Default, Display, Eq, From, Into, PartialEq)]
pub struct Count(i32);

/// New [`Comment`] to be created.
#[derive(Clone, Debug)]
pub struct New {
    /// [`repository::FullName`] of the [`Entry`] to comment.
    ///
    /// [`Entry`]: super::Entry
    pub repository_name: repository::FullName,

    /// [`user::Login`] of the author.
    pub posted_by: user::Login,

    /// [`Content`] of the new [`Comment`].
    pub content: Content,
}

#[cfg(test)]
mod spec {
    use super::Content;

    #[test]
    fn rejects_blank_content() {
        assert!(Content::new("Nice repo!").is_some());

        assert!(Content::new("").is_none());
        assert!(Content::new(" \n\t").is_none());
        assert!(Content::new("x".repeat(Content::MAX_LEN + 1)).is_none());
    }
}
