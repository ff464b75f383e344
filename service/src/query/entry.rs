//! [`Query`] collection related to a single [`Entry`].

use common::operations::By;

use crate::domain::{repository, Entry};
#[cfg(doc)]
use crate::Query;

use super::DatabaseQuery;

/// Queries an [`Entry`] by the [`repository::FullName`] of its repository.
pub type ByRepositoryName =
    DatabaseQuery<By<Option<Entry>, repository::FullName>>;
