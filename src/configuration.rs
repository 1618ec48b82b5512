use serde::Deserialize;

use crate::auth::{MAX_BCRYPT_COST, MIN_BCRYPT_COST};
use crate::error::ConfigError;

#[derive(Deserialize, Clone, Debug)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub database: DatabaseSettings,
    pub jwt: JwtSettings,
    #[serde(default)]
    pub hashing: HashingSettings,
}

#[derive(Deserialize, Clone, Debug)]
pub struct ApplicationSettings {
    #[serde(default = "default_host")]
    pub host: String,
    pub port: u16,
    /// Origin allowed to call the API with credentials
    #[serde(default = "default_allowed_origin")]
    pub allowed_origin: String,
    /// Sets the `Secure` flag on session cookies (production)
    #[serde(default)]
    pub secure_cookies: bool,
}

impl ApplicationSettings {
    /// Credentialed CORS needs one concrete `scheme://host[:port]` origin
    pub fn validate(&self) -> Result<(), ConfigError> {
        let origin = self.allowed_origin.trim();
        let uri = origin.parse::<actix_web::http::Uri>().map_err(|_| {
            ConfigError::InvalidValue(format!("application.allowed_origin '{}' is not a URL", origin))
        })?;
        if origin == "*" || uri.scheme().is_none() || uri.host().is_none() {
            return Err(ConfigError::InvalidValue(format!(
                "application.allowed_origin must be a single origin, got '{}'",
                origin
            )));
        }
        Ok(())
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_allowed_origin() -> String {
    "http://localhost:5173".to_string()
}

#[derive(Deserialize, Clone, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Postgres,
    Memory,
}

#[derive(Deserialize, Clone, Debug, Default)]
pub struct DatabaseSettings {
    #[serde(default)]
    pub backend: StorageBackend,
    /// Full connection string; takes precedence over the discrete fields
    pub url: Option<String>,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default = "default_db_port")]
    pub port: u16,
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default)]
    pub database_name: String,
}

fn default_db_port() -> u16 {
    5432
}

impl DatabaseSettings {
    pub fn connection_string(&self) -> String {
        if let Some(url) = &self.url {
            return url.clone();
        }
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.username, self.password, self.host, self.port, self.database_name
        )
    }
}

/// Token signing settings. Access and refresh tokens use independent secrets.
#[derive(Deserialize, Clone, Debug)]
pub struct JwtSettings {
    pub access_token_secret: String,
    pub access_token_expiry: i64,   // seconds (e.g., 900 for 15 minutes)
    pub refresh_token_secret: String,
    pub refresh_token_expiry: i64,  // seconds (e.g., 1296000 for 15 days)
    #[serde(default = "default_issuer")]
    pub issuer: String,
}

fn default_issuer() -> String {
    "user_auth".to_string()
}

impl JwtSettings {
    /// Reject settings that would weaken the token model
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.access_token_secret.trim().is_empty() {
            return Err(ConfigError::MissingRequired("jwt.access_token_secret".to_string()));
        }
        if self.refresh_token_secret.trim().is_empty() {
            return Err(ConfigError::MissingRequired("jwt.refresh_token_secret".to_string()));
        }
        if self.access_token_secret == self.refresh_token_secret {
            return Err(ConfigError::InvalidValue(
                "access and refresh token secrets must differ".to_string(),
            ));
        }
        if self.access_token_expiry <= 0 {
            return Err(ConfigError::InvalidValue(
                "jwt.access_token_expiry must be positive".to_string(),
            ));
        }
        if self.refresh_token_expiry <= self.access_token_expiry {
            return Err(ConfigError::InvalidValue(
                "jwt.refresh_token_expiry must be longer than jwt.access_token_expiry".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Deserialize, Clone, Debug)]
pub struct HashingSettings {
    /// bcrypt work factor
    pub cost: u32,
}

impl Default for HashingSettings {
    fn default() -> Self {
        Self { cost: 10 }
    }
}

impl Settings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.jwt.validate()?;
        self.application.validate()?;
        if !(MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&self.hashing.cost) {
            return Err(ConfigError::InvalidValue(format!(
                "hashing.cost must be between {} and {}",
                MIN_BCRYPT_COST, MAX_BCRYPT_COST
            )));
        }
        if self.database.backend == StorageBackend::Postgres
            && self.database.url.is_none()
            && self.database.database_name.is_empty()
        {
            return Err(ConfigError::MissingRequired(
                "database.url or database.database_name".to_string(),
            ));
        }
        Ok(())
    }
}

/// Load settings from `configuration.yaml` (optional) and `APP_` environment
/// variables, e.g. `APP_JWT__ACCESS_TOKEN_SECRET` or `APP_APPLICATION__PORT`.
pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("configuration").required(false))
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;
    settings.try_deserialize::<Settings>()
}
