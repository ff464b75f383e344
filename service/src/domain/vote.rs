//! [`Vote`] definitions.

use derive_more::Display;

use super::{repository, user};

/// Vote of a [`User`] for an [`Entry`].
///
/// [`Entry`]: super::Entry
/// [`User`]: super::User
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Vote {
    /// [`repository::FullName`] of the voted [`Entry`].
    ///
    /// [`Entry`]: super::Entry
    pub repository_name: repository::FullName,

    /// [`user::Login`] of the voter.
    pub voter: user::Login,

    /// [`Value`] of this [`Vote`].
    pub value: Value,
}

/// Signed effect of a [`Vote`] on the score of an [`Entry`].
///
/// [`Entry`]: super::Entry
#[derive(Clone, Copy, Debug, Default, Display, Eq, Hash, PartialEq)]
pub struct Value(i8);

impl Value {
    /// Upvote.
    pub const UP: Self = Self(1);

    /// Downvote.
    pub const DOWN: Self = Self(-1);

    /// Cancelled vote.
    pub const CANCEL: Self = Self(0);

    /// Returns the signed integer effect of this [`Value`].
    #[must_use]
    pub const fn get(self) -> i8 {
        self.0
    }
}

impl From<Value> for i32 {
    fn from(value: Value) -> Self {
        value.0.into()
    }
}

/// Key identifying a [`Vote`] of a single voter for a single [`Entry`].
///
/// [`Entry`]: super::Entry
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Key {
    /// [`repository::FullName`] of the voted [`Entry`].
    ///
    /// [`Entry`]: super::Entry
    pub repository_name: repository::FullName,

    /// [`user::Login`] of the voter.
    pub voter: user::Login,
}
