//! [`Command`] for authorizing a [`User`].

use derive_more::{Display, Error, From};
use serde::Deserialize;
use tracerr::Traced;

use crate::{
    domain::{user, User},
    Service,
};

use super::Command;

/// [`Command`] for authorizing a [`User`] by a [JWT].
///
/// [JWT]: https://datatracker.ietf.org/doc/html/rfc7519
#[derive(Clone, Debug, From)]
pub struct AuthorizeUser {
    /// Encoded [JWT] to authorize.
    ///
    /// [JWT]: https://datatracker.ietf.org/doc/html/rfc7519
    pub token: String,
}

/// Claims of a [JWT] identifying a [`User`].
///
/// [JWT]: https://datatracker.ietf.org/doc/html/rfc7519
#[derive(Debug, Deserialize)]
struct Claims {
    /// GitHub login of the [`User`].
    sub: String,
}

impl<Db, Bs> Command<AuthorizeUser> for Service<Db, Bs> {
    type Ok = User;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: AuthorizeUser) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let AuthorizeUser { token } = cmd;

        let claims = jsonwebtoken::decode::<Claims>(
            &token,
            &self.config.jwt_decoding_key,
            &self.config.jwt_validation,
        )
        .map_err(tracerr::from_and_wrap!(=> E))?
        .claims;

        let login = user::Login::new(claims.sub.as_str())
            .ok_or_else(|| E::InvalidLogin(claims.sub))
            .map_err(tracerr::wrap!())?;

        Ok(User { login })
    }
}

/// Error of [`AuthorizeUser`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`jsonwebtoken`] decoding error.
    #[display("Failed to decode a JSON Web Token: {_0}")]
    JsonWebTokenDecodeError(jsonwebtoken::errors::Error),

    /// Token subject is not a valid [`user::Login`].
    #[display("`{_0}` is not a valid login")]
    #[from(ignore)]
    InvalidLogin(#[error(not(source))] String),
}

#[cfg(test)]
mod spec {
    use std::time::{Duration, SystemTime, UNIX_EPOCH};

    use jsonwebtoken::{EncodingKey, Header};

    use super::{AuthorizeUser, ExecutionError};
    use crate::{command::Command as _, Config, Service};

    const SECRET: &[u8] = b"secret";

    fn service() -> Service<(), ()> {
        Service::new(Config::hs256(SECRET, Duration::ZERO), (), ())
    }

    fn token(sub: &str, expires_in: i64, secret: &[u8]) -> String {
        let now = SystemTime::now().duration_since(UNIX_EPOCH).unwrap();
        let exp = i64::try_from(now.as_secs()).unwrap() + expires_in;
        jsonwebtoken::encode(
            &Header::default(),
            &serde_json::json!({ "sub": sub, "exp": exp }),
            &EncodingKey::from_secret(secret),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn authorizes_valid_token() {
        let user = service()
            .execute(AuthorizeUser::from(token("octocat", 60, SECRET)))
            .await
            .unwrap();

        assert_eq!(user.login.as_ref(), "octocat");
    }

    #[tokio::test]
    async fn rejects_foreign_signature() {
        let err = service()
            .execute(AuthorizeUser::from(token("octocat", 60, b"other")))
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::JsonWebTokenDecodeError(_),
        ));
    }

    #[tokio::test]
    async fn rejects_expired_token() {
        let err = service()
            .execute(AuthorizeUser::from(token("octocat", -60, SECRET)))
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::JsonWebTokenDecodeError(_),
        ));
    }

    #[tokio::test]
    async fn rejects_invalid_login() {
        let err = service()
            .execute(AuthorizeUser::from(token("not a login", 60, SECRET)))
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::InvalidLogin(_)));
    }
}
