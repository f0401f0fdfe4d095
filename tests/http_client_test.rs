//! 解析APIとのHTTP通信テスト
//!
//! ローカルの簡易HTTPサーバーに対して送信・レスポンス処理を検証

use freshscan::client::{AnalysisClient, AnalyzeOptions, ABORTED_MESSAGE, TIMEOUT_MESSAGE};
use freshscan::{AnalyzeOutcome, AnalyzerSession, Quality, SelectedFile};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;

fn apple() -> SelectedFile {
    SelectedFile::new("apple.jpg", "image/jpeg", b"fake jpeg bytes".to_vec())
}

fn client_for(base: &str) -> AnalysisClient {
    AnalysisClient::with_base(Some(base.to_string()), Duration::from_secs(5)).unwrap()
}

fn http_response(status: &str, body: &str) -> String {
    format!(
        "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        body.len(),
        body
    )
}

/// 1リクエストだけ受けて固定レスポンスを返すサーバー
async fn serve_once(response: String) -> (String, oneshot::Receiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = oneshot::channel();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let request = read_request(&mut socket).await;
        let _ = tx.send(request);
        let _ = socket.write_all(response.as_bytes()).await;
        let _ = socket.shutdown().await;
    });

    (format!("http://{}", addr), rx)
}

/// リクエストを受けたまま応答しないサーバー
async fn serve_hanging() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let _request = read_request(&mut socket).await;
        tokio::time::sleep(Duration::from_secs(30)).await;
    });

    format!("http://{}", addr)
}

async fn read_request(socket: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = socket.read(&mut chunk).await.unwrap_or(0);
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
        if request_complete(&buf) {
            break;
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}

fn request_complete(buf: &[u8]) -> bool {
    let Some(header_end) = buf.windows(4).position(|w| w == b"\r\n\r\n") else {
        return false;
    };
    let headers = String::from_utf8_lossy(&buf[..header_end]).to_lowercase();
    let body = &buf[header_end + 4..];

    let content_length = headers
        .lines()
        .find_map(|line| line.strip_prefix("content-length:"))
        .and_then(|v| v.trim().parse::<usize>().ok());

    match content_length {
        Some(len) => body.len() >= len,
        None => body.ends_with(b"0\r\n\r\n"),
    }
}

#[tokio::test]
async fn test_successful_analysis() {
    let body = r#"{"quality":"Fresh","confidence":0.91,"indicators":[{"name":"Color Index","value":180,"unit":"CI"}]}"#;
    let (base, request) = serve_once(http_response("200 OK", body)).await;

    // 末尾のスラッシュは除去される
    let outcome = client_for(&format!("{}/", base))
        .analyze(&apple(), AnalyzeOptions::default())
        .await;

    let result = outcome.result().expect("解析結果がない");
    assert_eq!(result.quality, Quality::Fresh);
    assert_eq!(result.confidence, 0.91);
    assert_eq!(result.indicators.len(), 1);
    assert_eq!(result.indicators[0].name, "Color Index");

    let request = request.await.unwrap();
    assert!(request.starts_with("POST /analyze HTTP/1.1"), "{}", request);
    assert!(request.contains("name=\"file\""));
    assert!(request.contains("filename=\"apple.jpg\""));
    assert!(request.to_lowercase().contains("content-type: image/jpeg"));
    assert!(request.contains("fake jpeg bytes"));
}

#[tokio::test]
async fn test_server_error_with_empty_body() {
    let (base, _request) = serve_once(http_response("500 Internal Server Error", "")).await;

    let outcome = client_for(&base).analyze(&apple(), AnalyzeOptions::default()).await;

    assert_eq!(
        outcome,
        AnalyzeOutcome::Failure {
            error: "HTTP 500".to_string(),
            status: Some(500),
        }
    );
}

#[tokio::test]
async fn test_server_error_body_becomes_message() {
    let (base, _request) =
        serve_once(http_response("422 Unprocessable Entity", "image is too dark")).await;

    let outcome = client_for(&base).analyze(&apple(), AnalyzeOptions::default()).await;

    assert_eq!(outcome.error(), Some("image is too dark"));
    assert_eq!(outcome.status(), Some(422));
}

#[tokio::test]
async fn test_success_without_quality_is_invalid() {
    let (base, _request) =
        serve_once(http_response("200 OK", r#"{"confidence":0.4,"indicators":[]}"#)).await;

    let outcome = client_for(&base).analyze(&apple(), AnalyzeOptions::default()).await;

    assert_eq!(outcome.error(), Some("Invalid JSON in response"));
    assert_eq!(outcome.status(), None);
}

#[tokio::test]
async fn test_success_with_non_json_body_is_invalid() {
    let (base, _request) = serve_once(http_response("200 OK", "<html>ok</html>")).await;

    let outcome = client_for(&base).analyze(&apple(), AnalyzeOptions::default()).await;

    assert_eq!(outcome.error(), Some("Invalid JSON in response"));
}

#[tokio::test]
async fn test_success_is_coerced() {
    let (base, _request) = serve_once(http_response(
        "200 OK",
        r#"{"quality":"Spoiled","indicators":{"not":"an array"},"extra":true}"#,
    ))
    .await;

    let outcome = client_for(&base).analyze(&apple(), AnalyzeOptions::default()).await;

    let result = outcome.result().expect("解析結果がない");
    assert_eq!(result.quality, Quality::Spoiled);
    assert_eq!(result.confidence, 0.0);
    assert!(result.indicators.is_empty());
}

#[tokio::test]
async fn test_timeout() {
    let base = serve_hanging().await;

    let options = AnalyzeOptions::default().with_timeout(Duration::from_millis(100));
    let outcome = client_for(&base).analyze(&apple(), options).await;

    assert_eq!(outcome.error(), Some(TIMEOUT_MESSAGE));
    assert_eq!(outcome.status(), None);
}

#[tokio::test]
async fn test_cancel_reports_aborted() {
    let base = serve_hanging().await;
    let cancel = CancellationToken::new();

    let relay = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        relay.cancel();
    });

    let options = AnalyzeOptions::default().with_cancel(cancel);
    let outcome = client_for(&base).analyze(&apple(), options).await;

    assert_eq!(outcome.error(), Some(ABORTED_MESSAGE));
    assert_eq!(outcome.error(), Some("Request aborted"));
}

#[tokio::test]
async fn test_connection_refused_is_network_failure() {
    // 空きポートを確保してすぐ閉じる
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let outcome = client_for(&format!("http://{}", addr))
        .analyze(&apple(), AnalyzeOptions::default())
        .await;

    assert!(!outcome.is_success());
    let error = outcome.error().unwrap_or_default();
    assert!(!error.is_empty());
    assert_ne!(error, ABORTED_MESSAGE);
    assert_eq!(outcome.status(), None);
}

#[tokio::test]
async fn test_session_surfaces_server_error() {
    let (base, _request) = serve_once(http_response("500 Internal Server Error", "")).await;

    let mut session = AnalyzerSession::new(client_for(&base));
    assert!(!session.mock_mode());
    assert!(session.set_file(apple()));

    session.analyze().await;

    assert_eq!(session.error().as_deref(), Some("HTTP 500"));
    assert_eq!(session.result(), None);
    assert!(!session.loading());
    assert!(session.can_analyze());
}
