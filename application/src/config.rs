//! [`Config`]-related definitions.

use std::time;

use config::{builder::DefaultState, ConfigBuilder, ConfigError};
use serde::Deserialize;
use service::infra::bus;
use smart_default::SmartDefault;

/// Application configuration.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server configuration.
    pub server: Server,

    /// Service configuration.
    pub service: Service,

    /// Event bus configuration.
    pub bus: Bus,

    /// Repositories catalog configuration.
    pub catalog: Catalog,

    /// Log configuration.
    pub log: Log,
}

impl Config {
    /// Creates a new [`Config`] by:
    /// - loading it from the provided `path` (if any);
    /// - merging it with the environment variables (if any);
    /// - using default values for missing fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(path: impl AsRef<str>) -> Result<Self, ConfigError> {
        ConfigBuilder::<DefaultState>::default()
            .add_source(config::File::with_name(path.as_ref()).required(false))
            .add_source(config::Environment::with_prefix("CONF").separator("."))
            .build()?
            .try_deserialize()
    }
}

/// Server configuration.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Server {
    /// Host to bind the server to.
    #[default("0.0.0.0".to_owned())]
    pub host: String,

    /// Port to bind the server to.
    #[default(4000)]
    pub port: u16,

    /// [CORS] configuration.
    ///
    /// [CORS]: https://developer.mozilla.org/en-US/docs/Web/HTTP/CORS
    pub cors: Cors,
}

/// [CORS] configuration.
///
/// [CORS]: https://developer.mozilla.org/en-US/docs/Web/HTTP/CORS
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Cors {
    /// List of allowed origins.
    #[default(vec!["*".to_owned()])]
    pub origins: Vec<String>,
}

/// Service configuration.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Service {
    /// [JWT] secret.
    ///
    /// [JWT]: https://wikipedia.org/wiki/JSON_Web_Token
    #[default("secret".to_owned())]
    pub jwt_secret: String,

    /// Allowed clock skew when checking [JWT] expiration.
    ///
    /// [JWT]: https://wikipedia.org/wiki/JSON_Web_Token
    #[default(time::Duration::from_secs(60))]
    #[serde(with = "humantime_serde")]
    pub jwt_leeway: time::Duration,
}

impl From<Service> for service::Config {
    fn from(value: Service) -> Self {
        let Service {
            jwt_secret,
            jwt_leeway,
        } = value;
        Self::hs256(jwt_secret.as_bytes(), jwt_leeway)
    }
}

/// Event bus configuration.
#[derive(Clone, Copy, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Bus {
    /// Number of events buffered per topic for slow subscribers.
    #[default(bus::broadcast::Config::default().capacity)]
    pub capacity: usize,
}

impl From<Bus> for bus::broadcast::Config {
    fn from(value: Bus) -> Self {
        let Bus { capacity } = value;
        Self { capacity }
    }
}

/// Catalog of GitHub repositories available for submission.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Catalog {
    /// Known repositories.
    pub repositories: Vec<Repository>,
}

/// GitHub repository of the [`Catalog`].
#[derive(Clone, Debug, Deserialize)]
pub struct Repository {
    /// Full name in the `owner/name` format.
    pub full_name: String,

    /// Description.
    #[serde(default)]
    pub description: Option<String>,

    /// Number of stargazers.
    #[serde(default)]
    pub stargazers_count: i32,

    /// Number of open issues.
    #[serde(default)]
    pub open_issues_count: Option<i32>,
}

impl TryFrom<Repository> for service::domain::Repository {
    type Error = String;

    fn try_from(value: Repository) -> Result<Self, Self::Error> {
        let Repository {
            full_name,
            description,
            stargazers_count,
            open_issues_count,
        } = value;

        Ok(Self {
            full_name: service::domain::repository::FullName::new(
                full_name.as_str(),
            )
            .ok_or(full_name)?,
            description,
            stargazers_count,
            open_issues_count,
        })
    }
}

/// Log configuration.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Log {
    /// Log level.
    pub level: LogLevel,
}

/// Log level.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LogLevel {
    /// Designates very low priority, often extremely verbose, information.
    Trace,

    /// Designates lower priority information.
    Debug,

    /// Designates useful information.
    #[default]
    Info,

    /// Designates hazardous situations.
    Warn,

    /// Designates very serious errors.
    Error,
}

impl From<LogLevel> for tracing::Level {
    fn from(value: LogLevel) -> Self {
        match value {
            LogLevel::Trace => Self::TRACE,
            LogLevel::Debug => Self::DEBUG,
            LogLevel::Info => Self::INFO,
            LogLevel::Warn => Self::WARN,
            LogLevel::Error => Self::ERROR,
        }
    }
}

#[cfg(test)]
mod spec {
    use super::{Config, Repository};

    #[test]
    fn uses_defaults_without_file() {
        let config = Config::new("does-not-exist.toml").unwrap();

        assert_eq!(config.server.port, 4000);
        assert_eq!(config.bus.capacity, 1024);
        assert_eq!(config.service.jwt_leeway.as_secs(), 60);
        assert!(config.catalog.repositories.is_empty());
    }

    #[test]
    fn converts_catalog_repository() {
        let valid = Repository {
            full_name: "apollographql/GitHunt-API".into(),
            description: None,
            stargazers_count: 1,
            open_issues_count: None,
        };
        assert!(service::domain::Repository::try_from(valid).is_ok());

        let invalid = Repository {
            full_name: "not a name".into(),
            description: None,
            stargazers_count: 1,
            open_issues_count: None,
        };
        assert_eq!(
            service::domain::Repository::try_from(invalid).unwrap_err(),
            "not a name",
        );
    }
}
