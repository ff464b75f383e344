//! [`User`]-related definitions.

use derive_more::From;
use juniper::graphql_object;
use service::domain;

use crate::{api, Context};

/// A GitHub user.
#[derive(Clone, Debug, From)]
pub struct User(domain::User);

impl From<domain::user::Login> for User {
    fn from(login: domain::user::Login) -> Self {
        Self(domain::User { login })
    }
}

/// A GitHub user.
#[graphql_object(context = Context, rename_all = "none")]
impl User {
    /// Login of this `User`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "User.login",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn login(&self) -> &str {
        self.0.login.as_ref()
    }

    /// URL of this `User`'s avatar.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "User.avatar_url",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn avatar_url(&self) -> String {
        self.0.avatar_url()
    }

    /// URL of this `User`'s GitHub profile.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "User.html_url",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn html_url(&self) -> String {
        self.0.html_url()
    }
}
