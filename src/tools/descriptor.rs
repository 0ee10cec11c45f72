//! Static registry of the toolkit's tools.
//!
//! Each entry pairs a tool name and description with the JSON schema of its
//! input struct, so an agent can enumerate the tools and bind arguments
//! without knowing the toolkit's Rust interface.

use crate::client::JsonObject;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub const SEARCH: &str = "search";
pub const INDEX_DOCUMENT: &str = "index_document";
pub const CLUSTER_HEALTH: &str = "cluster_health";
pub const CLUSTER_STATS: &str = "cluster_stats";

/// Input for the `search` tool
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SearchInput {
    /// Name of the Elasticsearch index to search
    pub index: String,
    /// Search request body in the Elasticsearch query DSL, e.g. `{"query": {"match_all": {}}}`
    pub query: JsonObject,
}

/// Input for the `index_document` tool
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct IndexDocumentInput {
    /// Name of the Elasticsearch index to write to
    pub index: String,
    /// Document body to store
    pub document: JsonObject,
    /// Document id. When omitted Elasticsearch generates one
    #[serde(default)]
    pub doc_id: Option<String>,
}

/// Input for the `cluster_health` tool
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct ClusterHealthInput {}

/// Input for the `cluster_stats` tool
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct ClusterStatsInput {}

/// Metadata an agent needs to discover and call one tool.
#[derive(Debug, Clone, Copy)]
pub struct ToolDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    schema: fn() -> JsonObject,
}

impl ToolDescriptor {
    /// JSON schema of the tool's arguments
    #[must_use]
    pub fn input_schema(&self) -> JsonObject {
        (self.schema)()
    }

    /// Argument names, in schema order
    #[must_use]
    pub fn parameters(&self) -> Vec<String> {
        self.input_schema()
            .get("properties")
            .and_then(serde_json::Value::as_object)
            .map(|properties| properties.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Name, description and schema as one JSON object
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "name": self.name,
            "description": self.description,
            "input_schema": self.input_schema(),
        })
    }
}

fn schema_of<T: JsonSchema>() -> JsonObject {
    schemars::schema_for!(T).as_object().cloned().unwrap_or_default()
}

/// Every tool the toolkit exposes, in a fixed order.
pub static TOOLS: [ToolDescriptor; 4] = [
    ToolDescriptor {
        name: SEARCH,
        description: "Search for documents in an Elasticsearch index. Takes the index name and a \
                      query DSL body; returns the raw search response, or {\"error\": message} on failure.",
        schema: schema_of::<SearchInput>,
    },
    ToolDescriptor {
        name: INDEX_DOCUMENT,
        description: "Index a document into an Elasticsearch index, optionally under a given id \
                      (Elasticsearch generates one otherwise). Returns the raw indexing response, \
                      or {\"error\": message} on failure.",
        schema: schema_of::<IndexDocumentInput>,
    },
    ToolDescriptor {
        name: CLUSTER_HEALTH,
        description: "Get the health status of the Elasticsearch cluster.",
        schema: schema_of::<ClusterHealthInput>,
    },
    ToolDescriptor {
        name: CLUSTER_STATS,
        description: "Get statistics for the Elasticsearch cluster.",
        schema: schema_of::<ClusterStatsInput>,
    },
];

/// Look up a descriptor by tool name.
#[must_use]
pub fn find(name: &str) -> Option<&'static ToolDescriptor> {
    TOOLS.iter().find(|tool| tool.name == name)
}
