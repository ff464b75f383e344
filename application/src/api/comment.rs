//! [`Comment`]-related definitions.

use derive_more::From;
use juniper::graphql_object;
use service::domain;

use crate::{api, Context};

/// A comment left on an `Entry`.
#[derive(Clone, Debug, From)]
pub struct Comment(domain::Comment);

/// A comment left on an `Entry`.
#[graphql_object(context = Context)]
impl Comment {
    /// Unique identifier of this `Comment`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Comment.id",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn id(&self) -> i32 {
        self.0.id.into()
    }

    /// Author of this `Comment`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Comment.postedBy",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn posted_by(&self) -> api::User {
        self.0.posted_by.clone().into()
    }

    /// Milliseconds since the Unix epoch when this `Comment` was created.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Comment.createdAt",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn created_at(&self) -> f64 {
        api::millis(self.0.created_at.coerce())
    }

    /// Text of this `Comment`.
    pub fn content(&self) -> &str {
        self.0.content.as_ref()
    }

    /// Full name of the commented repository.
    pub fn repo_name(&self) -> &str {
        self.0.repository_name.as_ref()
    }
}
