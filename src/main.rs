use anyhow::Context;
use clap::Parser;
use elasticsearch_toolkit_mcp::config::LogFormat;
use elasticsearch_toolkit_mcp::tools::TOOLS;
use elasticsearch_toolkit_mcp::{Config, ConnectionOverrides, ElasticsearchToolkit, Server};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// MCP server exposing Elasticsearch search, indexing and cluster tools
#[derive(Debug, Parser)]
#[command(name = "elasticsearch-toolkit-mcp", version, about)]
struct Cli {
    /// Elasticsearch hosts, comma separated (default: $ELASTICSEARCH_HOST or https://localhost:9200)
    #[arg(long, value_delimiter = ',')]
    hosts: Vec<String>,

    /// Username for basic auth (default: $ELASTICSEARCH_USERNAME)
    #[arg(long)]
    username: Option<String>,

    /// Password for basic auth (default: $ELASTICSEARCH_PASSWORD)
    #[arg(long)]
    password: Option<String>,

    /// Path to a TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log level, overridden by RUST_LOG
    #[arg(long)]
    log_level: Option<String>,

    /// Log output format
    #[arg(long, value_enum)]
    log_format: Option<LogFormat>,

    /// Print the tool descriptors as JSON and exit
    #[arg(long)]
    list_tools: bool,
}

impl Cli {
    fn connection_overrides(&self) -> ConnectionOverrides {
        ConnectionOverrides {
            hosts: self.hosts.clone(),
            username: self.username.clone(),
            password: self.password.clone(),
        }
    }
}

fn init_tracing(level: &str, format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false);

    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.list_tools {
        let tools: Vec<_> = TOOLS.iter().map(|tool| tool.to_json()).collect();
        println!("{}", serde_json::to_string_pretty(&tools)?);
        return Ok(());
    }

    let mut config = Config::load(cli.config.as_deref()).context("failed to load configuration")?;
    if let Some(level) = &cli.log_level {
        config.logging.level.clone_from(level);
    }
    if let Some(format) = cli.log_format {
        config.logging.format = format;
    }
    config.elasticsearch = config.elasticsearch.clone().merge(cli.connection_overrides());
    config.validate().context("invalid configuration")?;

    init_tracing(&config.logging.level, config.logging.format);
    info!("Starting {} v{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));

    let toolkit = ElasticsearchToolkit::new(config.elasticsearch.clone(), &config.http)
        .context("failed to create Elasticsearch toolkit")?;

    let server = Server::new(config, toolkit);
    server.run().await?;

    Ok(())
}
