pub mod client;
pub mod config;
pub mod error;
pub mod server;
pub mod tools;

pub use client::{ElasticsearchClient, HttpClientConfig, JsonObject, SearchEngineClient};
pub use config::{Config, ConnectionConfig, ConnectionOverrides};
pub use error::{Error, Result};
pub use server::Server;
pub use tools::{ElasticsearchToolkit, OperationResult, ToolDescriptor};
