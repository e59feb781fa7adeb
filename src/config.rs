//! Environment-driven database configuration.
//!
//! Selects which dotenv file to load based on `ENVIRONMENT`, then reads the
//! `POSTGRES_*` variables into a [`DatabaseConfig`], falling back to a default
//! for every value that is unset.

use std::{env, fmt};

use sqlx::postgres::PgConnectOptions;

use crate::error::{Error, Result};

pub const DEFAULT_USER: &str = "postgres";
pub const DEFAULT_PASSWORD: &str = "postgres";
pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 5432;
pub const DEFAULT_DATABASE: &str = "py_news_aggregator";

/// Deployment environment, read from the `ENVIRONMENT` variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Prod,
    Dev,
}

impl Environment {
    /// Reads `ENVIRONMENT` from the process, defaulting to `dev` when unset.
    pub fn from_env() -> Self {
        Self::parse(env::var("ENVIRONMENT").ok().as_deref())
    }

    /// Only the exact value `"prod"` selects production; anything else is dev.
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some("prod") => Environment::Prod,
            _ => Environment::Dev,
        }
    }

    /// The dotenv file this environment loads.
    pub fn env_file(&self) -> &'static str {
        match self {
            Environment::Prod => ".env",
            Environment::Dev => ".env.dev",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Prod => "prod",
            Environment::Dev => "dev",
        }
    }
}

/// Selects the environment from `ENVIRONMENT` and loads its env file.
///
/// Call once at startup, before anything else reads the process environment
/// (including the log filter).
pub fn init_environment() -> Environment {
    let environment = Environment::from_env();
    load_env_file(environment);
    environment
}

/// Loads the env file selected by `environment` into the process environment.
///
/// A missing file is not an error: lookups fall through to the defaults in
/// [`DatabaseConfig`]. Variables already present in the process are kept.
/// Returns `true` when a file was found and loaded.
pub fn load_env_file(environment: Environment) -> bool {
    let file = environment.env_file();
    match dotenv::from_filename(file) {
        Ok(path) => {
            tracing::info!(
                environment = environment.as_str(),
                path = %path.display(),
                "Loaded environment file"
            );
            true
        }
        Err(dotenv::Error::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(
                environment = environment.as_str(),
                file,
                "Environment file not found, using process environment and defaults"
            );
            false
        }
        Err(e) => {
            tracing::warn!(
                environment = environment.as_str(),
                file,
                error = %e,
                "Failed to load environment file, using process environment and defaults"
            );
            false
        }
    }
}

/// Connection parameters for the application database.
#[derive(Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub user: String,
    pub password: String,
    pub host: String,
    pub port: u16,
    pub database: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            user: DEFAULT_USER.to_string(),
            password: DEFAULT_PASSWORD.to_string(),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            database: DEFAULT_DATABASE.to_string(),
        }
    }
}

impl DatabaseConfig {
    /// Reads the `POSTGRES_*` variables from the process environment.
    ///
    /// # Errors
    /// Returns [`Error::InvalidPort`] if `POSTGRES_PORT` is set but is not a `u16`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup, applying a default for
    /// every key the lookup does not answer.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let port = match lookup("POSTGRES_PORT") {
            Some(value) => value
                .parse::<u16>()
                .map_err(|source| Error::InvalidPort { value, source })?,
            None => defaults.port,
        };

        Ok(Self {
            user: lookup("POSTGRES_USER").unwrap_or(defaults.user),
            password: lookup("POSTGRES_PASSWORD").unwrap_or(defaults.password),
            host: lookup("POSTGRES_HOST").unwrap_or(defaults.host),
            port,
            database: lookup("POSTGRES_DB").unwrap_or(defaults.database),
        })
    }

    /// Renders the connection descriptor with every value substituted verbatim.
    ///
    /// Reserved characters in the user or password are not escaped. Use
    /// [`DatabaseConfig::connect_options`] to actually connect.
    pub fn database_url(&self) -> String {
        format!(
            "postgresql://{}:{}@{}:{}/{}",
            self.user, self.password, self.host, self.port, self.database
        )
    }

    /// Same parameters as [`DatabaseConfig::database_url`], as discrete
    /// connect options.
    pub fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .username(&self.user)
            .password(&self.password)
            .host(&self.host)
            .port(self.port)
            .database(&self.database)
    }
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .finish()
    }
}
