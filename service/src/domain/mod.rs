//! Domain definitions.

pub mod comment;
pub mod entry;
pub mod repository;
pub mod user;
pub mod vote;

use std::sync::LazyLock;

use regex::Regex;

pub use self::{
    comment::Comment, entry::Entry, repository::Repository, user::User,
    vote::Vote,
};

/// Regular expression checking a single GitHub name segment (a login or a
/// repository name).
static SEGMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9_.-]{1,100}$").expect("valid regex")
});
