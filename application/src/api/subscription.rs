//! GraphQL [`Subscription`]s definitions.

use futures::{stream::BoxStream, StreamExt as _};
use juniper::graphql_subscription;
use service::{event, subscription, Subscription as _};

use crate::{api, define_error, AsError, Context, Error};

/// Root of all GraphQL subscriptions.
#[derive(Clone, Copy, Debug)]
pub struct Subscription;

impl Subscription {
    /// Name of the [`tracing::Span`] for the subscriptions.
    const SPAN_NAME: &'static str = "GraphQL subscription";
}

#[graphql_subscription(context = Context)]
impl Subscription {
    /// Notifies about every new `Comment` left on the `Entry` of the
    /// repository with the provided full name.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `INVALID_REPOSITORY_NAME` - the provided full name is malformed.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "commentAdded",
            otel.name = Self::SPAN_NAME,
            repo_full_name = %repo_full_name,
        ),
    )]
    pub async fn comment_added(
        &self,
        repo_full_name: String,
        ctx: &Context,
    ) -> Result<BoxStream<'static, Result<api::Comment, Error>>, Error> {
        let filter = filter::comment_added(&repo_full_name)
            .map_err(Error::from)
            .map_err(ctx.error())?;

        ctx.service()
            .execute(subscription::CommentAdded::by(filter))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|events| {
                events
                    .map(|event::CommentAdded(comment)| {
                        Ok(api::Comment::from(comment))
                    })
                    .boxed()
            })
    }
}

pub(crate) mod filter {
    //! Setup functions of per-subscriber [`Event`] filters.
    //!
    //! Every subscription owns its own filter, dropped along with it.
    //!
    //! [`Event`]: service::event::Event

    use service::{domain::repository, event};

    use super::SubscriptionError;

    /// Creates a filter accepting [`event::CommentAdded`]s of the repository
    /// with the provided full name only.
    ///
    /// # Errors
    ///
    /// With [`SubscriptionError::InvalidRepositoryName`] if the provided
    /// full name is malformed.
    pub(crate) fn comment_added(
        repo_full_name: &str,
    ) -> Result<
        impl FnMut(&event::CommentAdded) -> bool + Send + 'static,
        SubscriptionError,
    > {
        let name = repository::FullName::new(repo_full_name)
            .ok_or(SubscriptionError::InvalidRepositoryName)?;

        Ok(move |event::CommentAdded(comment): &event::CommentAdded| {
            comment.repository_name == name
        })
    }
}

define_error! {
    enum SubscriptionError {
        #[code = "INVALID_REPOSITORY_NAME"]
        #[status = BAD_REQUEST]
        #[message = "Repository full name must be in the `owner/name` \
                     format"]
        InvalidRepositoryName,
    }
}

#[cfg(test)]
mod spec {
    use common::DateTime;
    use service::{
        domain::{comment, repository, user, Comment},
        event::CommentAdded,
    };

    use super::{filter, SubscriptionError};

    fn comment_on(name: &str) -> CommentAdded {
        CommentAdded(Comment {
            id: comment::Id::from(1),
            repository_name: repository::FullName::new(name).unwrap(),
            posted_by: user::Login::new("octocat").unwrap(),
            content: comment::Content::new("Nice!").unwrap(),
            created_at: DateTime::now().coerce(),
        })
    }

    #[test]
    fn accepts_only_requested_repository() {
        let mut accepts = filter::comment_added("a/b").unwrap();

        assert!(accepts(&comment_on("a/b")));
        assert!(!accepts(&comment_on("c/d")));
        assert!(!accepts(&comment_on("a/bc")));
    }

    #[test]
    fn rejects_malformed_repository_name() {
        for name in ["", "a", "a/b/c", "a b/c"] {
            assert!(
                matches!(
                    filter::comment_added(name).map(drop),
                    Err(SubscriptionError::InvalidRepositoryName),
                ),
                "name: {name:?}",
            );
        }
    }
}
