use std::net::SocketAddr;

use axum::extract::Path;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;

use secret_crawler::api::crawl_api::crawl_secret;
use secret_crawler::config::CrawlerConfig;
use secret_crawler::error::{CrawlError, FetchError};
use secret_crawler::source::http_source::HttpNodeSource;
use secret_crawler::source::traits::NodeSource;

const TOKEN: &str = "s3ss10n-Token";

async fn session_ok() -> impl IntoResponse {
    (StatusCode::OK, format!(r#"{{"Session": "{}"}}"#, TOKEN))
}

async fn session_unavailable() -> impl IntoResponse {
    (StatusCode::SERVICE_UNAVAILABLE, "try later")
}

async fn session_empty() -> impl IntoResponse {
    (StatusCode::OK, r#"{"session": ""}"#)
}

#[derive(Clone, Copy)]
enum SessionMode {
    Healthy,
    Unavailable,
    Empty,
}

/// Fake tree: start -> [left, right]; left -> "He"; right -> mid -> ["llo", "!"].
async fn serve_node(Path(id): Path<String>, headers: HeaderMap) -> impl IntoResponse {
    let session = headers.get("session").and_then(|v| v.to_str().ok());
    if session != Some(TOKEN) {
        return (StatusCode::UNAUTHORIZED, "missing session".to_string());
    }

    let body = match id.as_str() {
        "start" => r#"{"ID": "start", "Depth": 0, "Message": "There is something we want to tell you", "NeXt": ["left", "right"]}"#,
        "left" => r#"{"id": "left", "depth": 1, "Secret": "He"}"#,
        "right" => r#"{"id": "right", "depth": 1, "NEXT": "mid"}"#,
        "mid" => r#"{"id": "mid", "depth": 2, "secret": "no", "next": ["m0", "m1"]}"#,
        "m0" => r#"{"id": "m0", "depth": 3, "secret": "llo", "next": ["never"]}"#,
        "m1" => r#"{"id": "m1", "depth": 3, "secret": "!"}"#,
        "broken" => return (StatusCode::INTERNAL_SERVER_ERROR, "boom".to_string()),
        "garbled" => "{not json",
        _ => return (StatusCode::NOT_FOUND, "no such node".to_string()),
    };
    (StatusCode::OK, body.to_string())
}

async fn start_server(mode: SessionMode) -> (SocketAddr, tokio::task::JoinHandle<()>) {
    let app = match mode {
        SessionMode::Healthy => Router::new().route("/get-session", get(session_ok)),
        SessionMode::Unavailable => Router::new().route("/get-session", get(session_unavailable)),
        SessionMode::Empty => Router::new().route("/get-session", get(session_empty)),
    };
    let app = app.route("/{id}", get(serve_node));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (addr, handle)
}

fn config_for(addr: SocketAddr) -> CrawlerConfig {
    CrawlerConfig {
        base_url: format!("http://{}", addr),
        session_url: format!("http://{}/get-session", addr),
        request_timeout_secs: 5,
        ..CrawlerConfig::default()
    }
}

#[tokio::test]
async fn test_open_session_reads_token() {
    let (addr, _handle) = start_server(SessionMode::Healthy).await;
    let source = HttpNodeSource::new(&config_for(addr)).unwrap();
    assert_eq!(source.open_session().await.unwrap(), TOKEN);
}

#[tokio::test]
async fn test_fetch_node_normalizes_fields() {
    let (addr, _handle) = start_server(SessionMode::Healthy).await;
    let source = HttpNodeSource::new(&config_for(addr)).unwrap();

    let root = source.fetch_node("start", TOKEN).await.unwrap();
    assert_eq!(root.id, "start");
    assert!(root.has_message());
    assert!(!root.is_leaf());
    assert_eq!(root.next, vec!["left", "right"]);

    let right = source.fetch_node("right", TOKEN).await.unwrap();
    assert_eq!(right.next, vec!["mid"]);
    assert_eq!(right.depth, 1);

    let left = source.fetch_node("left", TOKEN).await.unwrap();
    assert_eq!(left.secret, "He");
}

#[tokio::test]
async fn test_fetch_node_error_statuses() {
    let (addr, _handle) = start_server(SessionMode::Healthy).await;
    let source = HttpNodeSource::new(&config_for(addr)).unwrap();

    let err = source.fetch_node("start", "wrong-token").await.unwrap_err();
    assert!(matches!(err, FetchError::Status { status: 401 }));

    let err = source.fetch_node("broken", TOKEN).await.unwrap_err();
    assert!(matches!(err, FetchError::Status { status: 500 }));

    let err = source.fetch_node("garbled", TOKEN).await.unwrap_err();
    assert!(matches!(err, FetchError::Decode(_)));
}

#[tokio::test]
async fn test_crawl_secret_end_to_end() {
    let (addr, _handle) = start_server(SessionMode::Healthy).await;
    let secret = crawl_secret(&config_for(addr)).await.unwrap();
    assert_eq!(secret, "Hello!");
}

#[tokio::test]
async fn test_crawl_secret_reports_bootstrap_stage() {
    let (addr, _handle) = start_server(SessionMode::Unavailable).await;
    let err = crawl_secret(&config_for(addr)).await.unwrap_err();
    let crawl_err = err
        .downcast_ref::<CrawlError>()
        .expect("bootstrap failure should surface as a CrawlError");
    assert_eq!(crawl_err.stage(), "bootstrap");
    assert!(matches!(
        crawl_err,
        CrawlError::Bootstrap(FetchError::Status { status: 503 })
    ));
}

#[tokio::test]
async fn test_crawl_secret_names_failing_node() {
    let (addr, _handle) = start_server(SessionMode::Healthy).await;
    let config = CrawlerConfig {
        root_id: "broken".to_string(),
        ..config_for(addr)
    };
    let err = crawl_secret(&config).await.unwrap_err();
    match err.downcast_ref::<CrawlError>() {
        Some(CrawlError::Fetch { id, .. }) => assert_eq!(id, "broken"),
        other => panic!("expected fetch failure, got {:?}", other),
    }
}

#[tokio::test]
async fn test_open_session_rejects_empty_token() {
    let (addr, _handle) = start_server(SessionMode::Empty).await;
    let source = HttpNodeSource::new(&config_for(addr)).unwrap();
    let err = source.open_session().await.unwrap_err();
    assert!(matches!(err, FetchError::MissingSession));

    let err = crawl_secret(&config_for(addr)).await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<CrawlError>(),
        Some(CrawlError::Bootstrap(FetchError::MissingSession))
    ));
}
