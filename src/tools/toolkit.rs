use super::descriptor::{
    self, ClusterHealthInput, ClusterStatsInput, IndexDocumentInput, SearchInput, ToolDescriptor,
    TOOLS,
};
use super::outcome::OperationResult;
use crate::client::{ElasticsearchClient, HttpClientConfig, JsonObject, SearchEngineClient};
use crate::config::{ConnectionConfig, ConnectionOverrides};
use crate::{Error, Result};
use serde::de::DeserializeOwned;
use tracing::{debug, error, info, instrument};

/// Elasticsearch operations exposed as agent tools.
///
/// Owns exactly one client handle for its whole lifetime. Every operation
/// is total: a failure inside the client is logged and returned as
/// [`OperationResult::Failed`], never as an `Err` or a panic.
///
/// The toolkit adds no locking of its own; it is as concurrency-safe as its
/// client, and [`ElasticsearchClient`] may be shared freely.
#[derive(Debug)]
pub struct ElasticsearchToolkit {
    connection: ConnectionConfig,
    client: Box<dyn SearchEngineClient>,
}

impl ElasticsearchToolkit {
    /// Connect using `overrides`, falling back to `ELASTICSEARCH_*`
    /// environment variables and then to the default host.
    pub fn new(overrides: ConnectionOverrides, http: &HttpClientConfig) -> Result<Self> {
        let connection = ConnectionConfig::from_env(overrides)?;
        Self::connect(connection, http)
    }

    /// Connect with an already resolved configuration.
    pub fn connect(connection: ConnectionConfig, http: &HttpClientConfig) -> Result<Self> {
        let client = ElasticsearchClient::new(&connection, http)?;
        Ok(Self::with_client(connection, Box::new(client)))
    }

    /// Wrap an existing client handle.
    #[must_use]
    pub fn with_client(connection: ConnectionConfig, client: Box<dyn SearchEngineClient>) -> Self {
        info!(hosts = ?connection.hosts, "Initializing Elasticsearch toolkit");
        Self { connection, client }
    }

    /// The connection settings this toolkit was built with
    #[must_use]
    pub const fn connection(&self) -> &ConnectionConfig {
        &self.connection
    }

    /// Search for documents in `index`.
    #[instrument(skip(self, query))]
    pub async fn search(&self, index: &str, query: &JsonObject) -> OperationResult {
        debug!(
            "Searching in index '{}' with query: {}",
            index,
            serde_json::Value::Object(query.clone())
        );
        self.client
            .search(index, query)
            .await
            .inspect_err(|e| error!("An error occurred during the search: {}", e))
            .into()
    }

    /// Index `document` in `index`, under `doc_id` when given.
    #[instrument(skip(self, document))]
    pub async fn index_document(
        &self,
        index: &str,
        document: &JsonObject,
        doc_id: Option<&str>,
    ) -> OperationResult {
        debug!(
            "Indexing document in index '{}' with ID '{}'",
            index,
            doc_id.unwrap_or("<generated>")
        );
        self.client
            .index(index, doc_id, document)
            .await
            .inspect_err(|e| error!("An error occurred during the indexing: {}", e))
            .into()
    }

    /// Health status of the cluster.
    #[instrument(skip(self))]
    pub async fn cluster_health(&self) -> OperationResult {
        debug!("Getting cluster health status");
        self.client
            .cluster_health()
            .await
            .inspect_err(|e| error!("An error occurred while getting cluster health: {}", e))
            .into()
    }

    /// Statistics of the cluster.
    #[instrument(skip(self))]
    pub async fn cluster_stats(&self) -> OperationResult {
        debug!("Getting cluster statistics");
        self.client
            .cluster_stats()
            .await
            .inspect_err(|e| error!("An error occurred while getting cluster statistics: {}", e))
            .into()
    }

    /// Descriptors for every operation above.
    #[must_use]
    pub fn list_tools(&self) -> &'static [ToolDescriptor] {
        &TOOLS
    }

    /// Invoke a tool by name with JSON arguments.
    ///
    /// Errors here are about the call itself (unknown tool, arguments that
    /// do not bind); the operation's own outcome is in the `Ok` value.
    #[instrument(skip(self, arguments))]
    pub async fn call(&self, name: &str, arguments: Option<JsonObject>) -> Result<OperationResult> {
        match name {
            descriptor::SEARCH => {
                let input: SearchInput = bind(name, arguments)?;
                Ok(self.search(&input.index, &input.query).await)
            }
            descriptor::INDEX_DOCUMENT => {
                let input: IndexDocumentInput = bind(name, arguments)?;
                Ok(self
                    .index_document(&input.index, &input.document, input.doc_id.as_deref())
                    .await)
            }
            descriptor::CLUSTER_HEALTH => {
                let _: ClusterHealthInput = bind(name, arguments)?;
                Ok(self.cluster_health().await)
            }
            descriptor::CLUSTER_STATS => {
                let _: ClusterStatsInput = bind(name, arguments)?;
                Ok(self.cluster_stats().await)
            }
            other => Err(Error::UnknownTool(other.to_string())),
        }
    }

    /// Release the client handle. Later operations return the error mapping.
    pub async fn close(&self) -> Result<()> {
        info!("Closing Elasticsearch toolkit");
        self.client.close().await
    }
}

fn bind<T: DeserializeOwned>(tool: &str, arguments: Option<JsonObject>) -> Result<T> {
    serde_json::from_value(serde_json::Value::Object(arguments.unwrap_or_default()))
        .map_err(|e| Error::invalid_input(format!("{tool}.arguments"), e.to_string()))
}
