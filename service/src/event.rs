//! [`Event`]s published on the [`Bus`].
//!
//! [`Bus`]: crate::infra::Bus

use derive_more::From;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::domain::Comment;

/// Event published on a [`Bus`] topic.
///
/// [`Bus`]: crate::infra::Bus
pub trait Event: DeserializeOwned + Serialize + Send + 'static {
    /// Name of the topic this [`Event`] is published on.
    const TOPIC: &'static str;
}

/// [`Event`] of a new [`Comment`] being added.
///
/// Carries the full [`Comment`] as stored.
#[derive(Clone, Debug, Deserialize, Eq, From, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CommentAdded(pub Comment);

impl Event for CommentAdded {
    const TOPIC: &'static str = "commentAdded";
}
