//! [`Query`] collection related to a single [`Repository`].

use common::operations::By;

use crate::domain::{repository, Repository};
#[cfg(doc)]
use crate::Query;

use super::DatabaseQuery;

/// Queries a [`Repository`] from the catalog by its [`repository::FullName`].
pub type ByFullName = DatabaseQuery<By<Option<Repository>, repository::FullName>>;
