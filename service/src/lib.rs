//! Service contains the business logic of the application.
//!
//! List of available Cargo features:
#![doc = document_features::document_features!()]
#![deny(
    nonstandard_style,
    rust_2018_idioms,
    rustdoc::all,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code
)]
#![forbid(non_ascii_idents)]
#![warn(
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason,
    clippy::pedantic,
    clippy::wildcard_enum_match_arm,
    deprecated_in_future,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    unreachable_pub,
    unused_crate_dependencies,
    unused_import_braces,
    unused_labels,
    unused_lifetimes,
    unused_qualifications,
    unused_results
)]

pub mod command;
pub mod domain;
pub mod event;
pub mod infra;
pub mod query;
pub mod read;
pub mod subscription;

use std::time::Duration;

use derive_more::Debug;
use jsonwebtoken::{Algorithm, DecodingKey, Validation};

#[cfg(doc)]
use infra::{Bus, Database};

pub use self::{
    command::Command, query::Query, subscription::Subscription,
};

/// [`Service`] configuration.
#[derive(Clone, Debug)]
pub struct Config {
    /// [JWT] decoding key.
    ///
    /// [JWT]: https://datatracker.ietf.org/doc/html/rfc7519
    #[debug(skip)]
    pub jwt_decoding_key: DecodingKey,

    /// [JWT] validation rules.
    ///
    /// [JWT]: https://datatracker.ietf.org/doc/html/rfc7519
    pub jwt_validation: Validation,
}

impl Config {
    /// Creates a new [`Config`] accepting [JWT]s signed with HS256 using the
    /// provided `secret`.
    ///
    /// Expired tokens are still accepted within the provided `leeway`.
    ///
    /// [JWT]: https://datatracker.ietf.org/doc/html/rfc7519
    #[must_use]
    pub fn hs256(secret: &[u8], leeway: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = leeway.as_secs();
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            jwt_decoding_key: DecodingKey::from_secret(secret),
            jwt_validation: validation,
        }
    }
}

/// Domain service.
#[derive(Clone, Debug)]
pub struct Service<Db, Bs> {
    /// Configuration of this [`Service`].
    config: Config,

    /// [`Database`] of this [`Service`].
    database: Db,

    /// Event [`Bus`] of this [`Service`].
    bus: Bs,
}

impl<Db, Bs> Service<Db, Bs> {
    /// Creates a new [`Service`] with the provided parameters.
    #[must_use]
    pub fn new(config: Config, database: Db, bus: Bs) -> Self {
        Self {
            config,
            database,
            bus,
        }
    }

    /// Returns [`Config`] of this [`Service`].
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns [`Database`] of this [`Service`].
    #[must_use]
    pub fn database(&self) -> &Db {
        &self.database
    }

    /// Returns event [`Bus`] of this [`Service`].
    #[must_use]
    pub fn bus(&self) -> &Bs {
        &self.bus
    }
}
