//! GraphQL [`Mutation`]s definitions.

use juniper::graphql_object;
use service::{command, domain, Command as _};

use crate::{api, define_error, AsError, Context, Error};

/// Root of all GraphQL mutations.
#[derive(Clone, Copy, Debug)]
pub struct Mutation;

impl Mutation {
    /// Name of the [`tracing::Span`] for the mutations.
    const SPAN_NAME: &'static str = "GraphQL mutation";
}

#[graphql_object(context = Context)]
impl Mutation {
    /// Submits the repository with the provided full name to the feed.
    ///
    /// Submitting an already submitted repository returns its existing
    /// `Entry`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `UNAUTHORIZED` - the current request is not authenticated;
    /// - `NOT_FOUND` - the repository is not found.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "submitRepository",
            otel.name = Self::SPAN_NAME,
            repo_full_name = %repo_full_name,
        ),
    )]
    pub async fn submit_repository(
        repo_full_name: String,
        ctx: &Context,
    ) -> Result<api::Entry, Error> {
        let user = ctx.require_user().await?;

        ctx.service()
            .execute(command::SubmitRepository {
                repository_name: repo_full_name,
                posted_by: user.login.clone(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Votes for the `Entry` of the repository with the provided full name.
    ///
    /// The new vote replaces the previous one of the current `User`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `UNAUTHORIZED` - the current request is not authenticated;
    /// - `NOT_FOUND` - the `Entry` doesn't exist.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "vote",
            kind = ?kind,
            otel.name = Self::SPAN_NAME,
            repo_full_name = %repo_full_name,
        ),
    )]
    pub async fn vote(
        repo_full_name: String,
        #[graphql(name = "type")] kind: api::vote::Type,
        ctx: &Context,
    ) -> Result<api::Entry, Error> {
        let user = ctx.require_user().await?;
        let repository_name = entry_name(repo_full_name).map_err(ctx.error())?;

        ctx.service()
            .execute(command::VoteForEntry {
                repository_name,
                voter: user.login.clone(),
                value: kind.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Leaves a new `Comment` on the `Entry` of the repository with the
    /// provided full name.
    ///
    /// Subscribers of `commentAdded` for that repository are notified.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `UNAUTHORIZED` - the current request is not authenticated;
    /// - `NOT_FOUND` - the `Entry` doesn't exist;
    /// - `INVALID_COMMENT_CONTENT` - the content is blank or too long.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "submitComment",
            otel.name = Self::SPAN_NAME,
            repo_full_name = %repo_full_name,
        ),
    )]
    pub async fn submit_comment(
        repo_full_name: String,
        comment_content: String,
        ctx: &Context,
    ) -> Result<api::Comment, Error> {
        let user = ctx.require_user().await?;
        let repository_name = entry_name(repo_full_name).map_err(ctx.error())?;
        let content = domain::comment::Content::new(comment_content)
            .ok_or_else(|| CommentError::InvalidContent.into())
            .map_err(ctx.error())?;

        ctx.service()
            .execute(command::SubmitComment {
                repository_name,
                posted_by: user.login.clone(),
                content,
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }
}

/// Parses the provided repository full name of an `Entry`.
///
/// # Errors
///
/// With `NOT_FOUND` if the name is malformed, as no `Entry` may have it.
fn entry_name(
    repo_full_name: String,
) -> Result<domain::repository::FullName, Error> {
    domain::repository::FullName::new(repo_full_name.as_str()).ok_or_else(
        || {
            Error::not_found(&format_args!(
                "entry for repository \"{repo_full_name}\" not found",
            ))
        },
    )
}

define_error! {
    enum CommentError {
        #[code = "INVALID_COMMENT_CONTENT"]
        #[status = BAD_REQUEST]
        #[message = "`Comment` content must be non-blank and at most 10000 \
                     characters long"]
        InvalidContent,
    }
}

impl AsError for command::submit_repository::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::RepositoryNotExists(_) => Some(Error::not_found(self)),
            Self::EntryNotExists(_) => None,
        }
    }
}

impl AsError for command::submit_comment::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::EntryNotExists(_) => Some(Error::not_found(self)),
            Self::CommentNotExists(_) => None,
        }
    }
}

impl AsError for command::vote_for_entry::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::EntryNotExists(_) => Some(Error::not_found(self)),
        }
    }
}
