//! [`Vote`]-related definitions.

use juniper::{graphql_object, GraphQLEnum};
use service::domain;

use crate::Context;

/// Vote of the current `User` for an `Entry`.
#[derive(Clone, Copy, Debug, Default)]
pub struct Vote(domain::vote::Value);

impl From<domain::vote::Value> for Vote {
    fn from(value: domain::vote::Value) -> Self {
        Self(value)
    }
}

/// Vote of the current `User` for an `Entry`.
#[graphql_object(context = Context, rename_all = "none")]
impl Vote {
    /// Signed effect of this `Vote`: `1`, `-1` or `0`.
    pub fn vote_value(&self) -> i32 {
        self.0.into()
    }
}

/// Type of a vote.
#[derive(Clone, Copy, Debug, Eq, GraphQLEnum, PartialEq)]
#[graphql(name = "VoteType")]
pub enum Type {
    /// Upvote.
    Up,

    /// Downvote.
    Down,

    /// Cancels the previous vote.
    Cancel,
}

impl From<Type> for domain::vote::Value {
    fn from(ty: Type) -> Self {
        match ty {
            Type::Up => Self::UP,
            Type::Down => Self::DOWN,
            Type::Cancel => Self::CANCEL,
        }
    }
}
