use super::{HttpClientConfig, JsonObject, SearchEngineClient};
use crate::config::{parse_host, ConnectionConfig};
use crate::{Error, Result};
use async_trait::async_trait;
use reqwest::{Client, Method};
use serde_json::Value;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tracing::{debug, info, instrument, warn};

/// REST client for an Elasticsearch cluster.
///
/// Requests rotate over the configured nodes. A failed request is reported
/// as-is and never replayed against another node.
pub struct ElasticsearchClient {
    client: Client,
    nodes: Vec<String>,
    username: Option<String>,
    password: Option<String>,
    next_node: AtomicUsize,
    closed: AtomicBool,
}

impl std::fmt::Debug for ElasticsearchClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElasticsearchClient")
            .field("nodes", &self.nodes)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("closed", &self.closed.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl ElasticsearchClient {
    /// Build a client for the resolved connection.
    ///
    /// No request is sent here; an unreachable cluster surfaces on first use.
    pub fn new(connection: &ConnectionConfig, http: &HttpClientConfig) -> Result<Self> {
        if connection.hosts.is_empty() {
            return Err(Error::invalid_input("hosts", "at least one host is required"));
        }

        let nodes = connection
            .hosts
            .iter()
            .map(|host| parse_host(host).map(|_| host.trim_end_matches('/').to_string()))
            .collect::<Result<Vec<_>>>()?;

        let client = Client::builder()
            .timeout(http.timeout())
            .connect_timeout(http.connect_timeout())
            .user_agent(&http.user_agent)
            .danger_accept_invalid_certs(http.danger_accept_invalid_certs)
            .build()?;

        if http.danger_accept_invalid_certs {
            warn!("TLS certificate verification is disabled for the Elasticsearch connection");
        }

        info!(
            nodes = ?nodes,
            authenticated = connection.username.is_some(),
            "Created Elasticsearch client"
        );

        Ok(Self {
            client,
            nodes,
            username: connection.username.clone(),
            password: connection.password.clone(),
            next_node: AtomicUsize::new(0),
            closed: AtomicBool::new(false),
        })
    }

    /// Base URLs of the configured nodes, in rotation order
    #[must_use]
    pub fn nodes(&self) -> &[String] {
        &self.nodes
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    fn next_node(&self) -> &str {
        let slot = self.next_node.fetch_add(1, Ordering::Relaxed) % self.nodes.len();
        &self.nodes[slot]
    }

    fn index_segment(index: &str) -> Result<String> {
        if index.trim().is_empty() {
            return Err(Error::invalid_input("index", "index name cannot be empty"));
        }
        Ok(urlencoding::encode(index).into_owned())
    }

    async fn send(&self, method: Method, path: &str, body: Option<&JsonObject>) -> Result<JsonObject> {
        if self.is_closed() {
            return Err(Error::ClientClosed);
        }

        let url = format!("{}/{path}", self.next_node());
        debug!(%method, %url, "Sending Elasticsearch request");

        let mut request = self.client.request(method, &url);
        if let Some(username) = &self.username {
            request = request.basic_auth(username, self.password.as_deref());
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(Self::transport_error)?;
        let status = response.status();
        let text = response.text().await.map_err(Self::transport_error)?;

        if !status.is_success() {
            debug!(status = status.as_u16(), "Elasticsearch returned an error status");
            return Err(Self::api_error(status.as_u16(), &text));
        }

        Self::parse_object(&text)
    }

    fn transport_error(err: reqwest::Error) -> Error {
        if err.is_connect() || err.is_timeout() {
            Error::connection(err.to_string())
        } else {
            Error::Http(err)
        }
    }

    /// Turn an error response into an [`Error::Elasticsearch`], keeping the
    /// cluster's own `error.type` and `error.reason` when it sent them.
    fn api_error(status: u16, body: &str) -> Error {
        let parsed = serde_json::from_str::<Value>(body).ok();

        let (error_type, reason) = match parsed.as_ref().and_then(|v| v.get("error")) {
            Some(Value::Object(details)) => (
                details
                    .get("type")
                    .and_then(Value::as_str)
                    .unwrap_or("unknown")
                    .to_string(),
                details
                    .get("reason")
                    .and_then(Value::as_str)
                    .map_or_else(|| Value::Object(details.clone()).to_string(), str::to_string),
            ),
            Some(Value::String(message)) => ("error".to_string(), message.clone()),
            _ if body.trim().is_empty() => ("http_status".to_string(), "empty response body".to_string()),
            _ => ("http_status".to_string(), body.trim().to_string()),
        };

        Error::Elasticsearch {
            status,
            error_type,
            reason,
        }
    }

    fn parse_object(body: &str) -> Result<JsonObject> {
        match serde_json::from_str::<Value>(body) {
            Ok(Value::Object(object)) => Ok(object),
            Ok(other) => Err(Error::Parse {
                context: "elasticsearch response".to_string(),
                message: format!("expected a JSON object, got {other}"),
            }),
            Err(e) => Err(Error::Parse {
                context: "elasticsearch response".to_string(),
                message: e.to_string(),
            }),
        }
    }
}

#[async_trait]
impl SearchEngineClient for ElasticsearchClient {
    #[instrument(skip(self, body))]
    async fn search(&self, index: &str, body: &JsonObject) -> Result<JsonObject> {
        // No index searches every index in the cluster
        let path = if index.trim().is_empty() {
            "_search".to_string()
        } else {
            format!("{}/_search", Self::index_segment(index)?)
        };
        self.send(Method::POST, &path, Some(body)).await
    }

    #[instrument(skip(self, body))]
    async fn index(&self, index: &str, id: Option<&str>, body: &JsonObject) -> Result<JsonObject> {
        let index = Self::index_segment(index)?;

        // An empty id is treated like a missing one
        match id.filter(|id| !id.is_empty()) {
            Some(id) => {
                let path = format!("{index}/_doc/{}", urlencoding::encode(id));
                self.send(Method::PUT, &path, Some(body)).await
            }
            None => {
                let path = format!("{index}/_doc");
                self.send(Method::POST, &path, Some(body)).await
            }
        }
    }

    #[instrument(skip(self))]
    async fn cluster_health(&self) -> Result<JsonObject> {
        self.send(Method::GET, "_cluster/health", None).await
    }

    #[instrument(skip(self))]
    async fn cluster_stats(&self) -> Result<JsonObject> {
        self.send(Method::GET, "_cluster/stats", None).await
    }

    async fn close(&self) -> Result<()> {
        if !self.closed.swap(true, Ordering::AcqRel) {
            info!("Elasticsearch client closed");
        }
        Ok(())
    }
}
