use anyhow::Context;
use axum::http::HeaderValue;

/// Static API metadata reported by `/` and `/api/info`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApiInfo {
    pub title: &'static str,
    pub description: &'static str,
    pub version: &'static str,
}

pub const API_INFO: ApiInfo = ApiInfo {
    title: "Inventory Management API",
    description: "A comprehensive inventory management system",
    version: "0.1.0",
};

/// Which origins may call the API from a browser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllowedOrigins {
    Any,
    List(Vec<HeaderValue>),
}

impl AllowedOrigins {
    /// Parses a comma-separated origin list. A `*` entry anywhere means any origin.
    pub fn parse(raw: &str) -> anyhow::Result<Self> {
        let entries: Vec<&str> = raw
            .split(',')
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .collect();

        if entries.is_empty() || entries.contains(&"*") {
            return Ok(AllowedOrigins::Any);
        }

        let origins = entries
            .into_iter()
            .map(|o| {
                HeaderValue::from_str(o)
                    .with_context(|| format!("invalid origin {:?} in CORS_ALLOWED_ORIGINS", o))
            })
            .collect::<anyhow::Result<Vec<_>>>()?;

        Ok(AllowedOrigins::List(origins))
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// `None` runs the service on the in-memory store.
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub cors_origins: AllowedOrigins,
    pub api: ApiInfo,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            database_url: None,
            database_max_connections: 5,
            cors_origins: AllowedOrigins::Any,
            api: API_INFO,
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup so parsing can be tested
    /// without touching the process environment.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        Ok(Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port: match lookup("PORT") {
                Some(raw) => raw.parse().context("PORT must be a valid number")?,
                None => defaults.port,
            },
            database_url: lookup("DATABASE_URL").filter(|url| !url.trim().is_empty()),
            database_max_connections: match lookup("DATABASE_MAX_CONNECTIONS") {
                Some(raw) => raw
                    .parse()
                    .context("DATABASE_MAX_CONNECTIONS must be a valid number")?,
                None => defaults.database_max_connections,
            },
            cors_origins: match lookup("CORS_ALLOWED_ORIGINS") {
                Some(raw) => AllowedOrigins::parse(&raw)?,
                None => defaults.cors_origins,
            },
            api: API_INFO,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
