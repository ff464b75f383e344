//! [`Context`]-related definitions.

use std::sync::atomic::{self, AtomicU16};

use axum::{async_trait, extract::FromRequestParts, RequestPartsExt as _};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use juniper::{
    http::{GraphQLBatchResponse, GraphQLResponse},
    IntoFieldError as _,
};
use service::{
    command::{self, Command as _},
    domain,
};
use tokio::sync::OnceCell;

use crate::{define_error, AsError, Error, JuniperResponse, Service};

/// Application context.
#[derive(Debug)]
pub struct Context {
    /// [`Service`] instance.
    service: Service,

    /// Error status code.
    error_status_code: AtomicU16,

    /// Parts of the HTTP request.
    parts: http::request::Parts,

    /// Authenticated [`domain::User`], if any.
    current_user: OnceCell<Option<domain::User>>,
}

impl Context {
    /// Creates a new [`Context`] of the provided HTTP request `parts`.
    #[must_use]
    pub fn new(service: Service, parts: http::request::Parts) -> Self {
        Self {
            service,
            error_status_code: AtomicU16::new(
                http::StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
            ),
            parts,
            current_user: OnceCell::new(),
        }
    }

    /// Returns [`Service`] instance of this [`Context`].
    #[must_use]
    pub fn service(&self) -> &Service {
        &self.service
    }

    /// Returns the error status code of this [`Context`].
    #[expect(clippy::missing_panics_doc, reason = "infallible")]
    #[must_use]
    pub fn error_status_code(&self) -> http::StatusCode {
        http::StatusCode::from_u16(
            self.error_status_code.load(atomic::Ordering::Relaxed),
        )
        .expect("invalid status code")
    }

    /// Sets the error status code for this [`Context`].
    ///
    /// Provided [`http::StatusCode`] will be applied to the response.
    pub fn set_error_status_code(&self, status_code: http::StatusCode) {
        self.error_status_code
            .store(status_code.as_u16(), atomic::Ordering::Relaxed);
    }

    /// Helper method calling [`Context::set_error_status_code()`] inside
    /// [`Result::map_err()`] closure.
    pub fn error(&self) -> impl FnOnce(Error) -> Error + '_ {
        move |err| {
            self.set_error_status_code(err.status_code);
            err
        }
    }

    /// Returns the authenticated [`domain::User`] of this [`Context`], if
    /// any.
    ///
    /// Missing or invalid credentials result in [`None`].
    pub async fn current_user(&self) -> Option<&domain::User> {
        self.current_user
            .get_or_init(|| self.authenticate())
            .await
            .as_ref()
    }

    /// Returns the authenticated [`domain::User`] of this [`Context`].
    ///
    /// # Errors
    ///
    /// With [`AuthError::Unauthorized`] if the current request is not
    /// authenticated.
    pub async fn require_user(&self) -> Result<&domain::User, Error> {
        self.current_user()
            .await
            .ok_or_else(|| AuthError::Unauthorized.into())
            .map_err(self.error())
    }

    /// Applies the [`juniper::Variables`] provided by the client on GraphQL
    /// subscription initialization.
    ///
    /// # Errors
    ///
    /// Errors if the provided variables are invalid.
    pub(crate) fn apply_subscription_variables(
        &mut self,
        vars: &juniper::Variables,
    ) -> Result<(), Error> {
        if let Some(token) = vars.get("authToken") {
            let token = token
                .as_string_value()
                .ok_or_else(|| Error::from(AuthError::InvalidVariables))?;
            let token = format!("Bearer {token}")
                .parse()
                .map_err(|_| Error::from(AuthError::InvalidVariables))?;
            _ = self
                .parts
                .headers
                .insert(http::header::AUTHORIZATION, token);
        }

        Ok(())
    }

    /// Performs the [`domain::User`] authentication.
    async fn authenticate(&self) -> Option<domain::User> {
        let res = self
            .parts
            .clone()
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await;
        let token = match res {
            Ok(TypedHeader(Authorization(bearer))) => bearer.token().to_owned(),
            Err(e) => {
                if !e.is_missing() {
                    tracing::debug!(
                        "malformed `Authorization` header: {}",
                        e.into_error(),
                    );
                }
                return None;
            }
        };

        self.service
            .execute(command::AuthorizeUser { token })
            .await
            .inspect_err(|e| tracing::debug!("authentication failed: {e}"))
            .ok()
    }
}

impl juniper::Context for Context {}

#[async_trait]
impl<S> FromRequestParts<S> for Context
where
    S: Send + Sync,
{
    type Rejection = JuniperResponse;

    async fn from_request_parts(
        parts: &mut http::request::Parts,
        _: &S,
    ) -> Result<Self, Self::Rejection> {
        let service =
            parts.extensions.get::<Service>().cloned().ok_or_else(|| {
                JuniperResponse {
                    status_code: http::StatusCode::INTERNAL_SERVER_ERROR,
                    response: GraphQLBatchResponse::Single(
                        GraphQLResponse::error(
                            Error::internal(&"missing `Service` extension")
                                .into_field_error(),
                        ),
                    ),
                }
            })?;

        Ok(Self::new(service, parts.clone()))
    }
}

define_error! {
    enum AuthError {
        #[code = "UNAUTHORIZED"]
        #[status = UNAUTHORIZED]
        #[message = "Authentication required"]
        Unauthorized,

        #[code = "INVALID_VARIABLES"]
        #[status = BAD_REQUEST]
        #[message = "Invalid subscription authorization variables"]
        InvalidVariables,
    }
}
