//! GraphQL [`Query`]s definitions.

use juniper::{graphql_object, GraphQLEnum};
use service::{domain, query, read, Query as _};

use crate::{api, AsError, Context, Error};

/// Root of all GraphQL queries.
#[derive(Clone, Copy, Debug)]
pub struct Query;

impl Query {
    /// Name of the [`tracing::Span`] for the queries.
    pub(crate) const SPAN_NAME: &'static str = "GraphQL query";
}

#[graphql_object(context = Context)]
impl Query {
    /// Returns a page of the feed of submitted repositories.
    ///
    /// At most 10 `Entry`s are returned at once: any `limit` out of the
    /// `1..=10` range is treated as 10.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "feed",
            kind = ?kind,
            limit = ?limit,
            offset = ?offset,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn feed(
        #[graphql(name = "type")] kind: FeedType,
        offset: Option<i32>,
        limit: Option<i32>,
        ctx: &Context,
    ) -> Result<Vec<api::Entry>, Error> {
        ctx.service()
            .execute(query::entries::Feed::by(read::feed::Selector::new(
                kind.into(),
                offset,
                limit,
            )))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|entries| entries.into_iter().map(Into::into).collect())
    }

    /// Returns the `Entry` of the repository with the provided full name, if
    /// it was submitted.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "entry",
            otel.name = Self::SPAN_NAME,
            repo_full_name = %repo_full_name,
        ),
    )]
    pub async fn entry(
        repo_full_name: String,
        ctx: &Context,
    ) -> Result<Option<api::Entry>, Error> {
        let Some(name) = domain::repository::FullName::new(repo_full_name)
        else {
            return Ok(None);
        };

        ctx.service()
            .execute(query::entry::ByRepositoryName::by(name))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|e| e.map(Into::into))
    }

    /// Returns the currently authenticated `User`, if any.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "currentUser",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn current_user(ctx: &Context) -> Option<api::User> {
        ctx.current_user().await.cloned().map(Into::into)
    }
}

/// Ranking order of a feed.
#[derive(Clone, Copy, Debug, Eq, GraphQLEnum, PartialEq)]
pub enum FeedType {
    /// Ordered by the score decaying with age.
    Hot,

    /// Most recently submitted first.
    New,

    /// Highest score first.
    Top,
}

impl From<FeedType> for read::feed::Kind {
    fn from(ty: FeedType) -> Self {
        match ty {
            FeedType::Hot => Self::Hot,
            FeedType::New => Self::New,
            FeedType::Top => Self::Top,
        }
    }
}
