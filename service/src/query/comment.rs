//! [`Query`] collection related to a single [`Comment`].

use common::operations::By;

use crate::domain::{comment, Comment};
#[cfg(doc)]
use crate::Query;

use super::DatabaseQuery;

/// Queries a [`Comment`] by its [`comment::Id`].
pub type ById = DatabaseQuery<By<Option<Comment>, comment::Id>>;
