//! [`Query`] collection related to a single [`Vote`].

use common::operations::By;

#[cfg(doc)]
use crate::{domain::Vote, Query};
use crate::domain::vote;

use super::DatabaseQuery;

/// Queries the current [`vote::Value`] of a voter for an [`Entry`].
///
/// [`Entry`]: crate::domain::Entry
pub type ByKey = DatabaseQuery<By<Option<vote::Value>, vote::Key>>;
