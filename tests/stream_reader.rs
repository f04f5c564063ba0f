use docline::{frame_stream, read_frames, ClientError, Frame, StreamRequest};
use futures::StreamExt;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn sse_server(body: &str) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/code/completion_stream"))
        .and(header("accept", "text/event-stream"))
        .and(header("content-type", "application/json"))
        .and(header("authorization", "Bearer test-token"))
        .and(body_json(json!({"query": "hello"})))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body.to_string(), "text/event-stream"))
        .mount(&server)
        .await;
    server
}

fn request(server: &MockServer) -> StreamRequest {
    StreamRequest::new(
        format!("{}/code/completion_stream", server.uri()),
        &json!({"query": "hello"}),
        "test-token",
    )
    .unwrap()
}

async fn collect_callback(server: &MockServer) -> Vec<Result<String, String>> {
    let http = reqwest::Client::new();
    let mut seen = Vec::new();
    read_frames(&http, request(server), |value| seen.push(value)).await;
    seen
}

#[tokio::test]
async fn test_frames_delivered_in_order() {
    let body: String = (1..=20).map(|i| format!("data: frame-{i}\r\n\r\n")).collect();
    let server = sse_server(&body).await;

    let seen = collect_callback(&server).await;

    let expected: Vec<Result<String, String>> = (1..=20).map(|i| Ok(format!("frame-{i}"))).collect();
    assert_eq!(seen, expected);
}

#[tokio::test]
async fn test_pings_are_skipped() {
    let server = sse_server("data: a\n: ping\ndata: b\n").await;

    let seen = collect_callback(&server).await;

    assert_eq!(seen, vec![Ok("a".to_string()), Ok("b".to_string())]);
}

#[tokio::test]
async fn test_payload_is_verbatim() {
    let server = sse_server("data: {\"content\": \"  x  \", \"stop\": false}   \n").await;

    let seen = collect_callback(&server).await;

    assert_eq!(
        seen,
        vec![Ok("{\"content\": \"  x  \", \"stop\": false}   ".to_string())]
    );
}

#[tokio::test]
async fn test_status_error_reports_detail_once() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"detail": "not found"})))
        .mount(&server)
        .await;

    let seen = collect_callback(&server).await;

    assert_eq!(seen, vec![Err("not found".to_string())]);
}

#[tokio::test]
async fn test_status_error_with_string_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!("network down")))
        .mount(&server)
        .await;

    let seen = collect_callback(&server).await;

    assert_eq!(seen, vec![Err("network down".to_string())]);
}

#[tokio::test]
async fn test_status_error_variant() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"detail": "token expired"})))
        .mount(&server)
        .await;

    let items: Vec<_> = frame_stream(&reqwest::Client::new(), request(&server))
        .collect()
        .await;

    assert_eq!(items.len(), 1);
    match &items[0] {
        Err(ClientError::Status { status, detail, .. }) => {
            assert_eq!(status.as_u16(), 401);
            assert_eq!(detail.as_deref(), Some("token expired"));
        }
        other => panic!("unexpected item: {other:?}"),
    }
}

#[tokio::test]
async fn test_empty_body_is_a_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let items: Vec<_> = frame_stream(&reqwest::Client::new(), request(&server))
        .collect()
        .await;

    assert_eq!(items.len(), 1);
    assert!(matches!(items[0], Err(ClientError::EmptyBody)));

    let seen = collect_callback(&server).await;
    assert_eq!(seen, vec![Err("empty response body".to_string())]);
}

#[tokio::test]
async fn test_network_failure_reported_once() {
    let request = StreamRequest::new("http://127.0.0.1:1/stream", &json!({}), "t").unwrap();
    let http = reqwest::Client::new();

    let items: Vec<_> = frame_stream(&http, request.clone()).collect().await;
    assert_eq!(items.len(), 1);
    assert!(matches!(items[0], Err(ClientError::Network(_))));

    let mut seen = Vec::new();
    read_frames(&http, request, |value| seen.push(value)).await;
    assert_eq!(seen.len(), 1);
    match &seen[0] {
        Err(message) => assert!(message.starts_with("HTTP error: "), "got {message:?}"),
        other => panic!("unexpected value: {other:?}"),
    }
}

#[tokio::test]
async fn test_only_pings_yields_nothing() {
    let server = sse_server(": ping - 2024-01-01 00:00:00\r\n\r\n").await;

    let seen = collect_callback(&server).await;

    assert!(seen.is_empty());
}

#[tokio::test]
async fn test_repeated_calls_are_identical() {
    let server = sse_server("data: one\n: ping\ndata: two\ndata: three\n").await;

    let first = collect_callback(&server).await;
    let second = collect_callback(&server).await;

    assert_eq!(first.len(), 3);
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_stream_can_be_dropped_early() {
    let server = sse_server("data: a\ndata: b\n").await;
    let http = reqwest::Client::new();

    let frames = frame_stream(&http, request(&server));
    futures::pin_mut!(frames);
    let first = frames.next().await.unwrap().unwrap();
    assert_eq!(first, Frame("a".to_string()));
    // dropped here without draining
}
