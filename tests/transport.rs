//! HTTP transports against a local mock server.

use mockito::Matcher;
use serde_json::json;
use std::time::Duration;
use verdictbot::transport::{
    FetchError, HttpStatusSource, Notifier, NotifyError, StatusSource, TelegramNotifier,
};

const TIMEOUT: Duration = Duration::from_secs(5);

#[tokio::test]
async fn test_fetch_sends_token_and_from_date() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/api/user_api/homework_statuses/")
        .match_header("authorization", "OAuth practicum-secret")
        .match_query(Matcher::UrlEncoded("from_date".into(), "1700000000".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"homeworks": [], "current_date": 1700000600}"#)
        .create_async()
        .await;

    let endpoint = format!("{}/api/user_api/homework_statuses/", server.url());
    let source = HttpStatusSource::new(&endpoint, "practicum-secret", TIMEOUT).unwrap();
    let raw = source.fetch(1_700_000_000).await.unwrap();

    assert_eq!(raw.status, 200);
    let body: serde_json::Value = serde_json::from_slice(&raw.body).unwrap();
    assert_eq!(body["current_date"], 1_700_000_600);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_fetch_passes_through_error_status() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/statuses/")
        .match_query(Matcher::Any)
        .with_status(401)
        .with_body(r#"{"code": "not_authenticated"}"#)
        .create_async()
        .await;

    let source =
        HttpStatusSource::new(&format!("{}/statuses/", server.url()), "bad", TIMEOUT).unwrap();
    let raw = source.fetch(0).await.unwrap();

    assert_eq!(raw.status, 401);
}

#[tokio::test]
async fn test_fetch_refused_connection_is_connect_error() {
    // Nothing listens on port 1.
    let source = HttpStatusSource::new("http://127.0.0.1:1/statuses/", "t", TIMEOUT).unwrap();
    let err = tokio_test::assert_err!(source.fetch(0).await);

    assert!(matches!(err, FetchError::Connect(_)), "{err:?}");
}

#[tokio::test]
async fn test_fetch_unanswered_request_is_timeout_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    // Accept connections and hold them open without ever replying.
    let _silent = tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });

    let source = HttpStatusSource::new(
        &format!("http://{addr}/statuses/"),
        "t",
        Duration::from_millis(100),
    )
    .unwrap();
    let err = tokio_test::assert_err!(source.fetch(0).await);

    assert!(matches!(err, FetchError::Timeout(_)), "{err:?}");
}

#[tokio::test]
async fn test_telegram_send_posts_chat_and_text() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/bot123:abc/sendMessage")
        .match_body(Matcher::PartialJson(json!({
            "chat_id": "42",
            "text": "hello"
        })))
        .with_status(200)
        .with_body(r#"{"ok": true}"#)
        .create_async()
        .await;

    let notifier = TelegramNotifier::new(&server.url(), "123:abc", "42", TIMEOUT).unwrap();
    tokio_test::assert_ok!(notifier.send("hello").await);

    mock.assert_async().await;
}

#[tokio::test]
async fn test_telegram_rejection_is_reported() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/bot123:abc/sendMessage")
        .with_status(400)
        .with_body(r#"{"ok": false, "description": "Bad Request: chat not found"}"#)
        .create_async()
        .await;

    let notifier = TelegramNotifier::new(&server.url(), "123:abc", "42", TIMEOUT).unwrap();
    let err = notifier.send("hello").await.unwrap_err();

    match err {
        NotifyError::Rejected { status, body } => {
            assert_eq!(status, 400);
            assert!(body.contains("chat not found"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_telegram_truncated_rejection_body_is_empty() {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    // Promise a longer body than is sent, then hang up.
    let _server = tokio::spawn(async move {
        if let Ok((mut socket, _)) = listener.accept().await {
            let mut buf = [0u8; 4096];
            let _ = socket.read(&mut buf).await;
            let _ = socket
                .write_all(b"HTTP/1.1 400 Bad Request\r\nContent-Length: 100\r\n\r\npartial")
                .await;
            let _ = socket.shutdown().await;
        }
    });

    let notifier =
        TelegramNotifier::new(&format!("http://{addr}"), "123:abc", "42", TIMEOUT).unwrap();
    let err = notifier.send("hello").await.unwrap_err();

    match err {
        NotifyError::Rejected { status, body } => {
            assert_eq!(status, 400);
            assert!(body.is_empty());
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_telegram_transport_error_hides_token() {
    let notifier =
        TelegramNotifier::new("http://127.0.0.1:1", "123:very-secret", "42", TIMEOUT).unwrap();
    let err = notifier.send("hello").await.unwrap_err();

    assert!(matches!(err, NotifyError::Transport(_)));
    assert!(!err.to_string().contains("very-secret"));
}
