use elasticsearch_toolkit_mcp::server::ElasticsearchServerHandler;
use elasticsearch_toolkit_mcp::{Config, ConnectionConfig, ElasticsearchToolkit, HttpClientConfig, Server};
use serde_json::{json, Value};
use std::sync::Arc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn create_toolkit(host: String) -> ElasticsearchToolkit {
    let connection = ConnectionConfig {
        hosts: vec![host],
        username: None,
        password: None,
    };
    ElasticsearchToolkit::connect(connection, &HttpClientConfig::default()).unwrap()
}

#[tokio::test]
async fn test_server_lifecycle() {
    let server = Server::new(Config::default(), create_toolkit("http://localhost:9200".to_string()));

    assert!(!server.is_shutdown_requested());

    server.shutdown();
    assert!(server.is_shutdown_requested());
}

#[tokio::test]
async fn test_server_with_custom_config() {
    let mut config = Config::default();
    config.server.graceful_shutdown_timeout_secs = 1;

    let server = Server::new(config, create_toolkit("http://localhost:9200".to_string()));
    assert_eq!(server.config().server.graceful_shutdown_timeout_secs, 1);
    assert_eq!(server.toolkit().connection().hosts, vec!["http://localhost:9200".to_string()]);
}

#[tokio::test]
async fn test_handler_publishes_every_tool() {
    let handler = ElasticsearchServerHandler::new(Arc::new(create_toolkit(
        "http://localhost:9200".to_string(),
    )));
    assert!(handler.ping().await.is_ok());

    let tools = serde_json::to_value(handler.tools()).unwrap();
    let names: Vec<&str> = tools
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|tool| tool["name"].as_str())
        .collect();

    assert_eq!(names, vec!["search", "index_document", "cluster_health", "cluster_stats"]);
    assert_eq!(tools[0]["inputSchema"]["type"], json!("object"));
}

#[tokio::test]
async fn test_handler_dispatch_against_cluster() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/_cluster/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "green"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/docs/_search"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": {"type": "parsing_exception", "reason": "unknown query [bogus]"},
            "status": 400
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let handler = ElasticsearchServerHandler::new(Arc::new(create_toolkit(mock_server.uri())));

    let health = serde_json::to_value(handler.dispatch("cluster_health", None).await.unwrap()).unwrap();
    assert_ne!(health["isError"], json!(true));
    let text: Value = serde_json::from_str(health["content"][0]["text"].as_str().unwrap()).unwrap();
    assert_eq!(text, json!({"status": "green"}));

    let arguments = json!({"index": "docs", "query": {"query": {"bogus": {}}}});
    let failed = handler
        .dispatch("search", arguments.as_object().cloned())
        .await
        .unwrap();
    let failed = serde_json::to_value(failed).unwrap();
    assert_eq!(failed["isError"], json!(true));
    let text: Value = serde_json::from_str(failed["content"][0]["text"].as_str().unwrap()).unwrap();
    assert_eq!(
        text,
        json!({"error": "Elasticsearch error 400 (parsing_exception): unknown query [bogus]"})
    );
}

#[tokio::test]
async fn test_concurrent_dispatch() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/_cluster/stats"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"nodes": {"count": {"total": 3}}})))
        .expect(5)
        .mount(&mock_server)
        .await;

    let handler = ElasticsearchServerHandler::new(Arc::new(create_toolkit(mock_server.uri())));

    let handles: Vec<_> = (0..5)
        .map(|_| {
            let handler = handler.clone();
            tokio::spawn(async move { handler.dispatch("cluster_stats", None).await })
        })
        .collect();

    for handle in handles {
        assert!(handle.await.unwrap().is_ok());
    }
}
