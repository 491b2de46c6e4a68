//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use link_vis::config::Config;
use link_vis::crawler::run_crawl;
use link_vis::server::{create_router, AppState};
use link_vis::{CrawlError, Graph, NodeId};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration with the given depth limit
fn create_test_config(max_depth: u32) -> Config {
    let mut config = Config::default();
    config.crawler.max_depth = max_depth;
    config.crawler.parallelism = 4;
    config.crawler.timeout_secs = 10;
    config.crawler.request_timeout_secs = 5;
    config
}

/// An HTML page containing one anchor per href, written exactly as given
fn html_page(hrefs: &[&str]) -> ResponseTemplate {
    let anchors: String = hrefs
        .iter()
        .map(|href| format!(r#"<a href="{}">link</a>"#, href))
        .collect();
    ResponseTemplate::new(200).set_body_raw(
        format!("<html><body>{}</body></html>", anchors),
        "text/html",
    )
}

/// Absolute URLs for `paths` on the mock server
fn absolute(server: &MockServer, paths: &[&str]) -> Vec<String> {
    paths
        .iter()
        .map(|p| format!("{}{}", server.uri(), p))
        .collect()
}

/// Mounts an HTML page linking to `links`, each a path on the same server
async fn mount_page(server: &MockServer, page: &str, links: &[&str]) {
    let hrefs = absolute(server, links);
    let hrefs: Vec<&str> = hrefs.iter().map(String::as_str).collect();
    Mock::given(method("GET"))
        .and(path(page))
        .respond_with(html_page(&hrefs))
        .mount(server)
        .await;
}

fn id_of(graph: &Graph, url: &str) -> NodeId {
    graph
        .node_by_url(url)
        .unwrap_or_else(|| panic!("no node for {}", url))
        .id
}

#[tokio::test]
async fn test_seed_without_links() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    mount_page(&mock_server, "/", &[]).await;

    // Scheme-less seed with a query string
    let seed = format!("{}/?x=1", base_url.trim_start_matches("http://"));
    let result = run_crawl(Arc::new(create_test_config(2)), &seed)
        .await
        .expect("Crawl should succeed");

    assert!(!result.partial);
    assert_eq!(result.graph.nodes.len(), 1);
    assert_eq!(result.graph.nodes[0].url, format!("{}/", base_url));
    assert!(result.graph.edges.is_empty());
}

#[tokio::test]
async fn test_crawl_respects_max_depth() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(&mock_server, "/", &["/a", "/b"]).await;
    mount_page(&mock_server, "/a", &["/c", "/"]).await;
    mount_page(&mock_server, "/b", &[]).await;

    // Depth 3 is beyond the limit: recorded, never fetched
    Mock::given(method("GET"))
        .and(path("/c"))
        .respond_with(html_page(&[]))
        .expect(0)
        .mount(&mock_server)
        .await;

    let result = run_crawl(Arc::new(create_test_config(2)), &base_url)
        .await
        .expect("Crawl should succeed");

    let graph = &result.graph;
    assert!(!result.partial);
    assert_eq!(graph.nodes.len(), 4);

    let root = id_of(graph, &format!("{}/", base_url));
    let a = id_of(graph, &format!("{}/a", base_url));
    let b = id_of(graph, &format!("{}/b", base_url));
    let c = id_of(graph, &format!("{}/c", base_url));

    assert_eq!(graph.edge_count_between(root, a), 1);
    assert_eq!(graph.edge_count_between(root, b), 1);
    assert_eq!(graph.edge_count_between(a, c), 1);
    assert_eq!(graph.edge_count_between(a, root), 1);
    assert_eq!(graph.edges.len(), 4);

    // The seed is the first node
    assert_eq!(graph.nodes[0].id, root);
}

#[tokio::test]
async fn test_unlimited_depth_follows_chain() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(&mock_server, "/", &["/1"]).await;
    mount_page(&mock_server, "/1", &["/2"]).await;
    mount_page(&mock_server, "/2", &["/3"]).await;
    Mock::given(method("GET"))
        .and(path("/3"))
        .respond_with(html_page(&[]))
        .expect(1)
        .mount(&mock_server)
        .await;

    let result = run_crawl(Arc::new(create_test_config(0)), &base_url)
        .await
        .expect("Crawl should succeed");

    assert_eq!(result.graph.nodes.len(), 4);
    assert_eq!(result.graph.edges.len(), 3);
}

#[tokio::test]
async fn test_hrefs_are_normalized_as_written() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let host = base_url.trim_start_matches("http://").to_string();

    // A scheme-less href names a host; a path-only href names nothing
    let schemeless = format!("{}/other", host);
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page(&["/relative", schemeless.as_str()]))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/other"))
        .respond_with(html_page(&[]))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/relative"))
        .respond_with(html_page(&[]))
        .expect(0)
        .mount(&mock_server)
        .await;

    let result = run_crawl(Arc::new(create_test_config(2)), &base_url)
        .await
        .expect("Crawl should succeed");

    let graph = &result.graph;
    let root = id_of(graph, &format!("{}/", base_url));
    let other = id_of(graph, &format!("{}/other", base_url));
    assert_eq!(graph.edge_count_between(root, other), 1);
    assert!(graph.node_by_url(&format!("{}/relative", base_url)).is_none());
    assert_eq!(graph.nodes.len(), 2);
}

#[tokio::test]
async fn test_redirect_chain_is_recorded() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(&mock_server, "/", &["/old"]).await;
    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(ResponseTemplate::new(301).insert_header("Location", "/moved"))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/moved"))
        .respond_with(ResponseTemplate::new(302).insert_header("Location", "/new"))
        .mount(&mock_server)
        .await;
    mount_page(&mock_server, "/new", &["/leaf"]).await;
    mount_page(&mock_server, "/leaf", &[]).await;

    let result = run_crawl(Arc::new(create_test_config(3)), &base_url)
        .await
        .expect("Crawl should succeed");

    let graph = &result.graph;
    let root = id_of(graph, &format!("{}/", base_url));
    let old = id_of(graph, &format!("{}/old", base_url));
    let moved = id_of(graph, &format!("{}/moved", base_url));
    let new = id_of(graph, &format!("{}/new", base_url));
    let leaf = id_of(graph, &format!("{}/leaf", base_url));

    assert_eq!(graph.edge_count_between(root, old), 1);
    assert!(graph.edge_count_between(old, moved) >= 1);
    assert_eq!(graph.edge_count_between(moved, new), 1);

    // Links on a redirected page come from its final URL
    assert_eq!(graph.edge_count_between(new, leaf), 1);
    assert_eq!(graph.edge_count_between(old, leaf), 0);
}

#[tokio::test]
async fn test_duplicate_anchors_produce_duplicate_edges() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(&mock_server, "/", &["/q", "/q?utm=1", "/q#top"]).await;
    Mock::given(method("GET"))
        .and(path("/q"))
        .respond_with(html_page(&[]))
        .expect(1)
        .mount(&mock_server)
        .await;

    let result = run_crawl(Arc::new(create_test_config(2)), &base_url)
        .await
        .expect("Crawl should succeed");

    let graph = &result.graph;
    let root = id_of(graph, &format!("{}/", base_url));
    let q = id_of(graph, &format!("{}/q", base_url));

    assert_eq!(graph.nodes.len(), 2);
    assert_eq!(graph.edge_count_between(root, q), 3);
}

#[tokio::test]
async fn test_time_budget_yields_partial_graph() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    let child = absolute(&mock_server, &["/child"]);
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page(&[child[0].as_str()]).set_delay(Duration::from_millis(300)))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/child"))
        .respond_with(html_page(&[]))
        .expect(0)
        .mount(&mock_server)
        .await;

    let mut config = create_test_config(0);
    config.crawler.timeout_secs = 0;

    let result = run_crawl(Arc::new(config), &base_url)
        .await
        .expect("Crawl should succeed");

    assert!(result.partial);

    // The late link is recorded but not followed
    let graph = &result.graph;
    let root = id_of(graph, &format!("{}/", base_url));
    let child = id_of(graph, &format!("{}/child", base_url));
    assert_eq!(graph.edge_count_between(root, child), 1);
}

#[tokio::test]
async fn test_failing_pages_do_not_stop_the_crawl() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(&mock_server, "/", &["/missing", "/image.png", "/ok"]).await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/image.png"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(vec![0u8; 8], "image/png"))
        .mount(&mock_server)
        .await;
    mount_page(&mock_server, "/ok", &["/deeper"]).await;
    mount_page(&mock_server, "/deeper", &[]).await;

    let result = run_crawl(Arc::new(create_test_config(3)), &base_url)
        .await
        .expect("Crawl should succeed");

    assert_eq!(result.graph.nodes.len(), 5);
    assert!(result
        .graph
        .node_by_url(&format!("{}/deeper", base_url))
        .is_some());
}

#[tokio::test]
async fn test_seed_with_error_status_is_a_single_node() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let result = run_crawl(Arc::new(create_test_config(2)), &base_url)
        .await
        .expect("Crawl should succeed");

    assert_eq!(result.graph.nodes.len(), 1);
    assert!(result.graph.edges.is_empty());
    assert!(!result.partial);
}

#[tokio::test]
async fn test_unreachable_seed_is_invalid() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let result = run_crawl(
        Arc::new(create_test_config(2)),
        &format!("http://127.0.0.1:{}/", port),
    )
    .await;

    assert!(matches!(result, Err(CrawlError::InvalidSeed)));
}

#[tokio::test]
async fn test_silent_seed_host_is_invalid() {
    let mut config = create_test_config(2);
    config.crawler.probe_timeout_ms = 200;

    let started = std::time::Instant::now();
    let result = run_crawl(Arc::new(config), "http://10.255.255.1:81/").await;

    assert!(matches!(result, Err(CrawlError::InvalidSeed)));
    assert!(started.elapsed() < Duration::from_secs(2));
}

#[tokio::test]
async fn test_malformed_seeds_are_invalid() {
    let config = Arc::new(create_test_config(2));

    for seed in ["", "/only/a/path", "//no-scheme", "mailto:a@b.com", "%ff%fe"] {
        let result = run_crawl(config.clone(), seed).await;
        assert!(
            matches!(result, Err(CrawlError::InvalidSeed)),
            "seed {:?} should be rejected",
            seed
        );
    }
}

#[tokio::test]
async fn test_crawl_endpoint_returns_graph() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(&mock_server, "/", &["/about"]).await;
    mount_page(&mock_server, "/about", &[]).await;

    let app = create_router(AppState::new(create_test_config(2)));
    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/crawl?seed={}", urlencoding::encode(&base_url)))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(json["partial"], false);
    let nodes = json["data"]["nodes"].as_array().unwrap();
    let edges = json["data"]["edges"].as_array().unwrap();
    assert_eq!(nodes.len(), 2);
    assert_eq!(edges.len(), 1);

    assert!(nodes[0]["id"].is_string());
    assert_eq!(nodes[0]["url"], format!("{}/", base_url));
    assert_eq!(edges[0]["fromId"], nodes[0]["id"]);
    assert_eq!(edges[0]["toId"], nodes[1]["id"]);
}
