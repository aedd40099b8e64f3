use std::borrow::Cow;
use std::net::SocketAddr;
use thiserror::Error;

pub const DEFAULT_SECRET_KEY: &str = "dev-key-please-change-in-production";
pub const MAX_JWT_EXPIRY_HOURS: i64 = 24 * 365;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Invalid {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Database configuration with `Cow` for flexible string handling
#[derive(Debug, Clone)]
pub struct DbConfig<'a> {
    pub host: Cow<'a, str>,
    pub port: u16,
    pub database: Cow<'a, str>,
    pub user: Cow<'a, str>,
    pub password: Cow<'a, str>,
    pub max_connections: u32,
    /// Full connection string; wins over the individual parts when set
    pub url: Option<Cow<'a, str>>,
}

impl<'a> DbConfig<'a> {
    /// Create new database configuration
    pub fn new(
        host: impl Into<Cow<'a, str>>,
        port: u16,
        database: impl Into<Cow<'a, str>>,
        user: impl Into<Cow<'a, str>>,
        password: impl Into<Cow<'a, str>>,
    ) -> Self {
        Self {
            host: host.into(),
            port,
            database: database.into(),
            user: user.into(),
            password: password.into(),
            max_connections: 10,
            url: None,
        }
    }

    /// Set max connections
    pub fn with_max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// Use a full connection string instead of the individual parts
    pub fn with_url(mut self, url: impl Into<Cow<'a, str>>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// PostgreSQL connection string, borrowed when an explicit URL is configured
    pub fn connection_string(&self) -> Cow<'_, str> {
        match &self.url {
            Some(url) => Cow::Borrowed(url.as_ref()),
            None => Cow::Owned(format!(
                "postgres://{}:{}@{}:{}/{}",
                self.user, self.password, self.host, self.port, self.database
            )),
        }
    }
}

impl<'a> Default for DbConfig<'a> {
    fn default() -> Self {
        Self {
            host: Cow::Borrowed("localhost"),
            port: 5432,
            database: Cow::Borrowed("hospital_db"),
            user: Cow::Borrowed("postgres"),
            password: Cow::Borrowed("postgres"),
            max_connections: 10,
            url: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Process-wide settings, read once at startup
#[derive(Debug, Clone)]
pub struct Config {
    pub db: DbConfig<'static>,
    pub secret_key: String,
    pub jwt_expiry_hours: i64,
    pub bind_addr: SocketAddr,
    pub log_format: LogFormat,
    /// Empty means any origin
    pub cors_origins: Vec<String>,
    pub seed_sample_data: bool,
}

impl Config {
    /// Read configuration from environment variables with fallbacks
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let port = parse("DB_PORT", get("DB_PORT", "5432"))?;
        let max_connections = parse("DB_MAX_CONNECTIONS", get("DB_MAX_CONNECTIONS", "10"))?;

        let mut db = DbConfig::new(
            get("DB_HOST", "localhost"),
            port,
            get("DB_NAME", "hospital_db"),
            get("DB_USER", "postgres"),
            get("DB_PASSWORD", "postgres"),
        )
        .with_max_connections(max_connections);
        if let Some(url) = lookup("DATABASE_URL").filter(|u| !u.is_empty()) {
            db = db.with_url(url);
        }

        let log_format = match get("LOG_FORMAT", "pretty").to_lowercase().as_str() {
            "pretty" | "text" => LogFormat::Pretty,
            "json" => LogFormat::Json,
            other => {
                return Err(ConfigError::Invalid {
                    name: "LOG_FORMAT",
                    value: other.to_string(),
                })
            }
        };

        let cors_origins = get("CORS_ORIGINS", "")
            .split(',')
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .map(String::from)
            .collect();

        Ok(Self {
            db,
            secret_key: get("SECRET_KEY", DEFAULT_SECRET_KEY),
            jwt_expiry_hours: parse_expiry(get("JWT_EXPIRY_HOURS", "24"))?,
            bind_addr: parse("BIND_ADDR", get("BIND_ADDR", "0.0.0.0:5000"))?,
            log_format,
            cors_origins,
            seed_sample_data: parse_bool("SEED_SAMPLE_DATA", get("SEED_SAMPLE_DATA", "false"))?,
        })
    }

    pub fn uses_default_secret(&self) -> bool {
        self.secret_key == DEFAULT_SECRET_KEY
    }
}

fn parse<T: std::str::FromStr>(name: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Invalid { name, value })
}

/// Token lifetime in hours, between one hour and a year
fn parse_expiry(value: String) -> Result<i64, ConfigError> {
    let name = "JWT_EXPIRY_HOURS";
    let hours: i64 = parse(name, value.clone())?;
    if (1..=MAX_JWT_EXPIRY_HOURS).contains(&hours) {
        Ok(hours)
    } else {
        Err(ConfigError::Invalid { name, value })
    }
}

fn parse_bool(name: &'static str, value: String) -> Result<bool, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(ConfigError::Invalid { name, value }),
    }
}
