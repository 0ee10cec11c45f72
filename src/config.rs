//! Configuration for the toolkit and its server.
//!
//! Connection settings resolve in three layers: explicit values (CLI flags
//! and the config file), then `ELASTICSEARCH_*` environment variables, then
//! the built-in default host.

use crate::client::HttpClientConfig;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;
use url::Url;

/// Host used when neither an explicit host nor `ELASTICSEARCH_HOST` is set
pub const DEFAULT_HOST: &str = "https://localhost:9200";

/// Prefix of the environment variables read during resolution
pub const ENV_PREFIX: &str = "ELASTICSEARCH_";

/// Explicitly supplied connection values. Empty values count as absent.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionOverrides {
    pub hosts: Vec<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl std::fmt::Debug for ConnectionOverrides {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionOverrides")
            .field("hosts", &self.hosts)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl ConnectionOverrides {
    #[must_use]
    pub fn with_hosts<I, S>(mut self, hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.hosts = hosts.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    #[must_use]
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Layer `other` on top of `self`; non-empty values in `other` win.
    #[must_use]
    pub fn merge(self, other: Self) -> Self {
        let hosts = non_empty_hosts(other.hosts).or_else(|| non_empty_hosts(self.hosts));
        Self {
            hosts: hosts.unwrap_or_default(),
            username: non_empty(other.username).or_else(|| non_empty(self.username)),
            password: non_empty(other.password).or_else(|| non_empty(self.password)),
        }
    }
}

/// `ELASTICSEARCH_*` variables, as read by envy
#[derive(Debug, Default, Deserialize)]
struct EnvConnection {
    host: Option<String>,
    username: Option<String>,
    password: Option<String>,
}

/// Fully resolved connection settings. Immutable once built.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    pub hosts: Vec<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl std::fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("hosts", &self.hosts)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl ConnectionConfig {
    /// Resolve against an explicit set of environment variables.
    ///
    /// Variables without the `ELASTICSEARCH_` prefix are ignored, as are
    /// variables set to the empty string.
    pub fn resolve<I>(overrides: ConnectionOverrides, env: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let env: EnvConnection = envy::prefixed(ENV_PREFIX).from_iter(
            env.into_iter()
                .filter(|(key, value)| key.starts_with(ENV_PREFIX) && !value.is_empty()),
        )?;

        let hosts = non_empty_hosts(overrides.hosts)
            .or_else(|| non_empty(env.host).map(|host| vec![host]))
            .unwrap_or_else(|| vec![DEFAULT_HOST.to_string()]);

        let resolved = Self {
            hosts,
            username: non_empty(overrides.username).or_else(|| non_empty(env.username)),
            password: non_empty(overrides.password).or_else(|| non_empty(env.password)),
        };

        debug!(connection = ?resolved, "Resolved Elasticsearch connection");
        Ok(resolved)
    }

    /// Resolve against the process environment.
    pub fn from_env(overrides: ConnectionOverrides) -> Result<Self> {
        Self::resolve(overrides, std::env::vars())
    }
}

/// MCP server settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub graceful_shutdown_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            graceful_shutdown_timeout_secs: 5,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Text,
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub elasticsearch: ConnectionOverrides,
    pub http: HttpClientConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Load from an optional TOML file; missing sections take their defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        debug!("Loading configuration from {}", path.display());
        let config = ::config::Config::builder()
            .add_source(::config::File::from(path).format(::config::FileFormat::Toml))
            .build()?
            .try_deserialize::<Self>()?;

        config.validate()?;
        Ok(config)
    }

    /// Check values that would otherwise fail late, on first request.
    pub fn validate(&self) -> Result<()> {
        // Blank hosts count as absent, as in resolution
        for host in self.elasticsearch.hosts.iter().filter(|h| !h.trim().is_empty()) {
            parse_host(host)?;
        }

        if self.http.timeout_secs == 0 {
            return Err(Error::invalid_input("http.timeout_secs", "must be greater than zero"));
        }

        if self.http.connect_timeout_secs == 0 {
            return Err(Error::invalid_input(
                "http.connect_timeout_secs",
                "must be greater than zero",
            ));
        }

        Ok(())
    }
}

/// Parse a host string, accepting only `http` and `https` URLs.
pub fn parse_host(host: &str) -> Result<Url> {
    let url = Url::parse(host)
        .map_err(|e| Error::invalid_input("hosts", format!("invalid host '{host}': {e}")))?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(Error::invalid_input(
            "hosts",
            format!("unsupported scheme '{scheme}' in host '{host}'"),
        )),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn non_empty_hosts(hosts: Vec<String>) -> Option<Vec<String>> {
    let hosts: Vec<String> = hosts.into_iter().filter(|h| !h.trim().is_empty()).collect();
    if hosts.is_empty() {
        None
    } else {
        Some(hosts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(vars: &[(&str, &str)]) -> Vec<(String, String)> {
        vars.iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_defaults_without_input_or_env() {
        let resolved = ConnectionConfig::resolve(ConnectionOverrides::default(), env(&[])).unwrap();
        assert_eq!(resolved.hosts, vec!["https://localhost:9200".to_string()]);
        assert!(resolved.username.is_none());
        assert!(resolved.password.is_none());
    }

    #[test]
    fn test_env_fallbacks() {
        let resolved = ConnectionConfig::resolve(
            ConnectionOverrides::default(),
            env(&[
                ("ELASTICSEARCH_HOST", "http://es.internal:9200"),
                ("ELASTICSEARCH_USERNAME", "elastic"),
                ("ELASTICSEARCH_PASSWORD", "changeme"),
                ("PATH", "/usr/bin"),
            ]),
        )
        .unwrap();

        assert_eq!(resolved.hosts, vec!["http://es.internal:9200".to_string()]);
        assert_eq!(resolved.username.as_deref(), Some("elastic"));
        assert_eq!(resolved.password.as_deref(), Some("changeme"));
    }

    #[test]
    fn test_explicit_hosts_ignore_env() {
        let resolved = ConnectionConfig::resolve(
            ConnectionOverrides::default().with_hosts(["http://a:9200"]),
            env(&[("ELASTICSEARCH_HOST", "http://ignored:9200")]),
        )
        .unwrap();

        assert_eq!(resolved.hosts, vec!["http://a:9200".to_string()]);
    }

    #[test]
    fn test_explicit_credentials_win_per_field() {
        let resolved = ConnectionConfig::resolve(
            ConnectionOverrides::default().with_username("admin"),
            env(&[
                ("ELASTICSEARCH_USERNAME", "elastic"),
                ("ELASTICSEARCH_PASSWORD", "from-env"),
            ]),
        )
        .unwrap();

        assert_eq!(resolved.username.as_deref(), Some("admin"));
        assert_eq!(resolved.password.as_deref(), Some("from-env"));
    }

    #[test]
    fn test_empty_values_count_as_absent() {
        let overrides = ConnectionOverrides {
            hosts: vec![String::new()],
            username: Some(String::new()),
            password: None,
        };
        let resolved = ConnectionConfig::resolve(
            overrides,
            env(&[("ELASTICSEARCH_HOST", ""), ("ELASTICSEARCH_USERNAME", "elastic")]),
        )
        .unwrap();

        assert_eq!(resolved.hosts, vec![DEFAULT_HOST.to_string()]);
        assert_eq!(resolved.username.as_deref(), Some("elastic"));
    }

    #[test]
    fn test_merge_prefers_later_layer() {
        let file = ConnectionOverrides::default()
            .with_hosts(["http://file:9200"])
            .with_username("file-user")
            .with_password("file-pass");
        let cli = ConnectionOverrides::default().with_username("cli-user");

        let merged = file.merge(cli);
        assert_eq!(merged.hosts, vec!["http://file:9200".to_string()]);
        assert_eq!(merged.username.as_deref(), Some("cli-user"));
        assert_eq!(merged.password.as_deref(), Some("file-pass"));
    }

    #[test]
    fn test_debug_redacts_password() {
        let config = ConnectionConfig {
            hosts: vec![DEFAULT_HOST.to_string()],
            username: Some("elastic".to_string()),
            password: Some("s3cret".to_string()),
        };
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("s3cret"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        config.http.timeout_secs = 0;
        assert!(matches!(config.validate(), Err(Error::InvalidInput { .. })));
        config.http.timeout_secs = 30;

        config.elasticsearch.hosts = vec!["localhost:9200".to_string()];
        assert!(matches!(config.validate(), Err(Error::InvalidInput { .. })));
    }

    #[test]
    fn test_validation_skips_blank_hosts() {
        let mut config = Config::default();
        config.elasticsearch.hosts = vec![String::new(), "  ".to_string()];
        assert!(config.validate().is_ok());

        let resolved = ConnectionConfig::resolve(config.elasticsearch, env(&[])).unwrap();
        assert_eq!(resolved.hosts, vec![DEFAULT_HOST.to_string()]);
    }

    #[test]
    fn test_load_without_file_is_default() {
        assert_eq!(Config::load(None).unwrap(), Config::default());
    }

    #[test]
    fn test_parse_host() {
        assert!(parse_host("http://localhost:9200").is_ok());
        assert!(parse_host("https://es.example.com").is_ok());
        assert!(parse_host("tcp://localhost:9300").is_err());
        assert!(parse_host("").is_err());
    }
}
