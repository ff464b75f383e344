//! Read entities definitions.

pub mod comment;
pub mod feed;
