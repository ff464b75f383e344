//! [`Query`] collection related to multiple [`Entry`]s.

use common::operations::By;

use crate::{domain::Entry, read};
#[cfg(doc)]
use crate::Query;

use super::DatabaseQuery;

/// Queries a page of the [`Entry`]s feed.
pub type Feed = DatabaseQuery<By<Vec<Entry>, read::feed::Selector>>;
