//! [`Query`] collection related to multiple [`Comment`]s.

use common::operations::By;

use crate::{
    domain::{comment, repository, Comment},
    read,
};
#[cfg(doc)]
use crate::Query;

use super::DatabaseQuery;

/// Queries [`Comment`]s left on an [`Entry`].
///
/// [`Entry`]: crate::domain::Entry
pub type List = DatabaseQuery<By<Vec<Comment>, read::comment::list::Selector>>;

/// Queries the [`comment::Count`] of an [`Entry`] by the
/// [`repository::FullName`] of its repository.
///
/// [`Entry`]: crate::domain::Entry
pub type Count = DatabaseQuery<By<comment::Count, repository::FullName>>;
