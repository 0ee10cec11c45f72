use crate::client::JsonObject;
use crate::tools::{ElasticsearchToolkit, OperationResult};
use crate::{Error, Result};
use rmcp::{
    model::*,
    service::{RequestContext, RoleServer},
    ErrorData, ServerHandler,
};
use std::{future::Future, sync::Arc};
use tracing::{debug, info, instrument};

const INSTRUCTIONS: &str = "Elasticsearch tools: search an index with the query DSL, index \
documents, and read cluster health and statistics. Failed operations return {\"error\": message}.";

/// MCP server handler publishing the toolkit's tools
#[derive(Debug, Clone)]
pub struct ElasticsearchServerHandler {
    toolkit: Arc<ElasticsearchToolkit>,
}

impl ElasticsearchServerHandler {
    #[must_use]
    pub fn new(toolkit: Arc<ElasticsearchToolkit>) -> Self {
        info!("Initializing Elasticsearch MCP server handler");
        Self { toolkit }
    }

    /// Health check for the server
    #[instrument(skip(self))]
    pub async fn ping(&self) -> Result<()> {
        debug!("Ping received - server is healthy");
        Ok(())
    }

    /// MCP tool definitions, one per toolkit descriptor
    #[must_use]
    pub fn tools(&self) -> Vec<Tool> {
        self.toolkit
            .list_tools()
            .iter()
            .map(|descriptor| {
                Tool::new(
                    descriptor.name,
                    descriptor.description,
                    Arc::new(descriptor.input_schema()),
                )
            })
            .collect()
    }

    /// Run a tool call against the toolkit.
    ///
    /// Operation failures are tool results with `is_error` set; only calls
    /// that cannot be dispatched become protocol errors.
    pub async fn dispatch(
        &self,
        name: &str,
        arguments: Option<JsonObject>,
    ) -> std::result::Result<CallToolResult, ErrorData> {
        match self.toolkit.call(name, arguments).await {
            Ok(outcome) => Self::call_result(outcome),
            Err(e @ Error::UnknownTool(_)) => Err(ErrorData::invalid_request(e.to_string(), None)),
            Err(e) if e.is_caller_error() => Err(ErrorData::invalid_params(e.to_string(), None)),
            Err(e) => Err(ErrorData::internal_error(e.to_string(), None)),
        }
    }

    fn call_result(outcome: OperationResult) -> std::result::Result<CallToolResult, ErrorData> {
        let is_error = outcome.is_error();
        let text = serde_json::to_string_pretty(&outcome.into_json())
            .map_err(|e| ErrorData::internal_error(format!("Serialization failed: {e}"), None))?;

        let content = vec![Content::text(text)];
        Ok(if is_error {
            CallToolResult::error(content)
        } else {
            CallToolResult::success(content)
        })
    }
}

impl ServerHandler for ElasticsearchServerHandler {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(INSTRUCTIONS.into()),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: env!("CARGO_PKG_NAME").into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[instrument(skip(self, _request, _context))]
    fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> impl Future<Output = std::result::Result<ListToolsResult, ErrorData>> + Send + '_ {
        info!("Listing available tools");
        let tools = self.tools();

        async move { Ok(ListToolsResult { tools, next_cursor: None }) }
    }

    #[instrument(skip(self, request, _context), fields(tool = %request.name))]
    fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> impl Future<Output = std::result::Result<CallToolResult, ErrorData>> + Send + '_ {
        info!("Tool called: {}", request.name);

        async move { self.dispatch(&request.name, request.arguments).await }
    }
}
