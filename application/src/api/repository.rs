//! [`Repository`]-related definitions.

use std::future;

use futures::TryFutureExt as _;
use juniper::graphql_object;
use service::{domain, query, Query as _};
use tokio::sync::OnceCell;

use crate::{
    api::{self, composer::Fragment},
    AsError, Context, Error,
};

/// Type definitions of the `repositories` [`Fragment`].
const TYPE_DEFS: &str = r"
    type Repository {
      name: String!
      full_name: String!
      description: String
      html_url: String!
      stargazers_count: Int!
      open_issues_count: Int
      owner: User
    }

    type User {
      login: String!
      avatar_url: String!
      html_url: String!
    }
";

/// Returns the `repositories` [`Fragment`] describing GitHub repositories and
/// users.
pub(crate) fn fragment() -> Fragment<api::Resolver> {
    api::fragment(
        "repositories",
        TYPE_DEFS,
        &[
            (
                "Repository",
                &[
                    "name",
                    "full_name",
                    "description",
                    "html_url",
                    "stargazers_count",
                    "open_issues_count",
                    "owner",
                ],
            ),
            ("User", &["login", "avatar_url", "html_url"]),
        ],
    )
}

/// A GitHub repository from the catalog.
#[derive(Clone, Debug)]
pub struct Repository {
    /// Full name of this [`Repository`].
    full_name: domain::repository::FullName,

    /// Underlying [`domain::Repository`].
    repository: OnceCell<domain::Repository>,
}

impl From<domain::Repository> for Repository {
    fn from(repository: domain::Repository) -> Self {
        Self {
            full_name: repository.full_name.clone(),
            repository: OnceCell::new_with(Some(repository)),
        }
    }
}

impl Repository {
    /// Creates a new [`Repository`] with the provided full name, loaded from
    /// the catalog on demand.
    #[must_use]
    pub fn new(full_name: domain::repository::FullName) -> Self {
        Self {
            full_name,
            repository: OnceCell::new(),
        }
    }

    /// Returns the underlying [`domain::Repository`].
    ///
    /// # Errors
    ///
    /// Errors if the [`domain::Repository`] doesn't exist in the catalog.
    async fn repository(
        &self,
        ctx: &Context,
    ) -> Result<&domain::Repository, Error> {
        let full_name = &self.full_name;
        self.repository
            .get_or_try_init(|| {
                ctx.service()
                    .execute(query::repository::ByFullName::by(
                        full_name.clone(),
                    ))
                    .map_err(AsError::into_error)
                    .map_err(ctx.error())
                    .and_then(|r| {
                        future::ready(
                            r.ok_or_else(|| {
                                Error::not_found(&format_args!(
                                    "repository \"{full_name}\" not found",
                                ))
                            })
                            .map_err(ctx.error()),
                        )
                    })
            })
            .await
    }
}

/// A GitHub repository.
#[graphql_object(context = Context, rename_all = "none")]
impl Repository {
    /// Name of this `Repository` without its owner.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Repository.name",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn name(&self) -> &str {
        self.full_name.name()
    }

    /// Full name of this `Repository` in the `owner/name` format.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Repository.full_name",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn full_name(&self) -> &str {
        self.full_name.as_ref()
    }

    /// Description of this `Repository`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Repository.description",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn description(
        &self,
        ctx: &Context,
    ) -> Result<Option<String>, Error> {
        Ok(self.repository(ctx).await?.description.clone())
    }

    /// URL of this `Repository` on GitHub.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Repository.html_url",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn html_url(&self, ctx: &Context) -> Result<String, Error> {
        Ok(self.repository(ctx).await?.html_url())
    }

    /// Number of stargazers of this `Repository`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Repository.stargazers_count",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn stargazers_count(&self, ctx: &Context) -> Result<i32, Error> {
        Ok(self.repository(ctx).await?.stargazers_count)
    }

    /// Number of open issues of this `Repository`, if known.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Repository.open_issues_count",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn open_issues_count(
        &self,
        ctx: &Context,
    ) -> Result<Option<i32>, Error> {
        Ok(self.repository(ctx).await?.open_issues_count)
    }

    /// Owner of this `Repository`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Repository.owner",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn owner(&self) -> api::User {
        self.full_name.owner().into()
    }
}
