pub mod elasticsearch;

pub use elasticsearch::ElasticsearchClient;

use crate::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::time::Duration;

/// A JSON object as exchanged with the cluster.
pub type JsonObject = serde_json::Map<String, serde_json::Value>;

/// HTTP client configuration for the cluster connection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpClientConfig {
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Connection timeout in seconds
    pub connect_timeout_secs: u64,
    /// User agent string
    pub user_agent: String,
    /// Skip TLS certificate verification (self-signed development clusters)
    pub danger_accept_invalid_certs: bool,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            connect_timeout_secs: 10,
            user_agent: format!("elasticsearch-toolkit-mcp/{}", env!("CARGO_PKG_VERSION")),
            danger_accept_invalid_certs: false,
        }
    }
}

impl HttpClientConfig {
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    #[must_use]
    pub const fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

/// The capability surface the toolkit needs from a search cluster.
///
/// Every call is a single request/response against the cluster. Responses
/// are returned as raw JSON objects and are never reshaped. Implementations
/// must be safe to share between concurrent callers.
#[async_trait]
pub trait SearchEngineClient: Send + Sync + Debug {
    /// Run `body` as a search request against `index`.
    async fn search(&self, index: &str, body: &JsonObject) -> Result<JsonObject>;

    /// Store `body` in `index`. When `id` is `None` the cluster assigns one;
    /// an existing document with the same id is replaced.
    async fn index(&self, index: &str, id: Option<&str>, body: &JsonObject) -> Result<JsonObject>;

    /// Cluster health summary.
    async fn cluster_health(&self) -> Result<JsonObject>;

    /// Cluster-wide statistics.
    async fn cluster_stats(&self) -> Result<JsonObject>;

    /// Release the connection. Calls made afterwards fail.
    async fn close(&self) -> Result<()> {
        Ok(())
    }
}
