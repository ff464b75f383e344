//! [`Command`] definition.

pub mod authorize_user;
pub mod submit_comment;
pub mod submit_repository;
pub mod vote_for_entry;

/// [`Command`] of the [`Service`].
///
/// [`Service`]: crate::Service
pub use common::Handler as Command;

pub use self::{
    authorize_user::AuthorizeUser, submit_comment::SubmitComment,
    submit_repository::SubmitRepository, vote_for_entry::VoteForEntry,
};
