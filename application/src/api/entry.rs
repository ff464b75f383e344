//! [`Entry`]-related definitions.

use common::DateTime;
use derive_more::From;
use juniper::graphql_object;
use service::{domain, query, read, Query as _};

use crate::{
    api::{self, composer::Fragment},
    AsError, Context, Error,
};

/// Type definitions of the `entries` [`Fragment`].
const TYPE_DEFS: &str = r"
    type Entry {
      id: Int!
      repository: Repository!
      postedBy: User
      createdAt: Float!
      score: Int!
      hotScore: Float!
      comments(limit: Int, offset: Int): [Comment]!
      commentCount: Int!
      vote: Vote!
    }

    type Comment {
      id: Int!
      postedBy: User
      createdAt: Float!
      content: String!
      repoName: String!
    }

    type Vote {
      vote_value: Int!
    }
";

/// Returns the `entries` [`Fragment`] describing submitted repositories along
/// with their comments and votes.
pub(crate) fn fragment() -> Fragment<api::Resolver> {
    api::fragment(
        "entries",
        TYPE_DEFS,
        &[
            (
                "Entry",
                &[
                    "id",
                    "repository",
                    "postedBy",
                    "createdAt",
                    "score",
                    "hotScore",
                    "comments",
                    "commentCount",
                    "vote",
                ],
            ),
            (
                "Comment",
                &["id", "postedBy", "createdAt", "content", "repoName"],
            ),
            ("Vote", &["vote_value"]),
        ],
    )
}

/// A repository submitted to the feed.
#[derive(Clone, Debug, From)]
pub struct Entry(domain::Entry);

/// A repository submitted to the feed.
#[graphql_object(context = Context)]
impl Entry {
    /// Unique identifier of this `Entry`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Entry.id",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn id(&self) -> i32 {
        self.0.id.into()
    }

    /// Submitted `Repository`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Entry.repository",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn repository(&self) -> api::Repository {
        api::Repository::new(self.0.repository_name.clone())
    }

    /// `User` who submitted this `Entry`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Entry.postedBy",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn posted_by(&self) -> api::User {
        self.0.posted_by.clone().into()
    }

    /// Milliseconds since the Unix epoch when this `Entry` was created.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Entry.createdAt",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn created_at(&self) -> f64 {
        api::millis(self.0.created_at.coerce())
    }

    /// Aggregate score of all the votes for this `Entry`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Entry.score",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn score(&self) -> i32 {
        self.0.score
    }

    /// Score of this `Entry` decaying with its age.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Entry.hotScore",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn hot_score(&self) -> f64 {
        self.0.hot_score(DateTime::now())
    }

    /// `Comment`s left on this `Entry`, newest first.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Entry.comments",
            limit = ?limit,
            offset = ?offset,
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn comments(
        &self,
        limit: Option<i32>,
        offset: Option<i32>,
        ctx: &Context,
    ) -> Result<Vec<api::Comment>, Error> {
        ctx.service()
            .execute(query::comments::List::by(
                read::comment::list::Selector::new(
                    self.0.repository_name.clone(),
                    offset,
                    limit,
                ),
            ))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|comments| comments.into_iter().map(Into::into).collect())
    }

    /// Number of `Comment`s left on this `Entry`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Entry.commentCount",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn comment_count(&self, ctx: &Context) -> Result<i32, Error> {
        ctx.service()
            .execute(query::comments::Count::by(self.0.repository_name.clone()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// `Vote` of the current `User` for this `Entry`.
    ///
    /// Zero if the current `User` is not authenticated or hasn't voted.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Entry.vote",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn vote(&self, ctx: &Context) -> Result<api::Vote, Error> {
        let Some(user) = ctx.current_user().await else {
            return Ok(api::Vote::default());
        };

        ctx.service()
            .execute(query::vote::ByKey::by(domain::vote::Key {
                repository_name: self.0.repository_name.clone(),
                voter: user.login.clone(),
            }))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|v| v.unwrap_or_default().into())
    }
}
