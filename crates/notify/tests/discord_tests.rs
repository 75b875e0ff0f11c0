use kabu_core::notify::error::NotifyError;
use kabu_core::notify::port::Notifier;
use kabu_notify::discord::DiscordNotifier;
use kabu_notify::payload::TRUNCATION_MARKER;
use std::time::Duration;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn notifier(server: &MockServer, max_chars: usize) -> DiscordNotifier {
    DiscordNotifier::new(
        format!("{}/api/webhooks/1/token", server.uri()),
        max_chars,
        Duration::from_secs(5),
    )
    .unwrap()
}

/// # Summary
/// 验证 204 视为成功，且请求体为 `{"content": "**subject**\ncontent"}`。
#[tokio::test]
async fn test_discord_no_content_is_success() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/webhooks/1/token"))
        .and(body_json(serde_json::json!({ "content": "**Title**\nbody" })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let result = notifier(&server, 1900).notify("Title", "body").await;
    assert!(result.is_ok(), "{result:?}");
}

/// # Summary
/// 验证非 204 状态映射为平台错误并携带响应体。
#[tokio::test]
async fn test_discord_failure_status_is_platform_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let result = notifier(&server, 1900).notify("Title", "body").await;
    match result {
        Err(NotifyError::Platform(message)) => {
            assert!(message.contains("500"), "{message}");
            assert!(message.contains("boom"), "{message}");
        }
        other => panic!("unexpected: {other:?}"),
    }
}

/// # Summary
/// 验证 200 也不算成功（Webhook 约定为 204）。
#[tokio::test]
async fn test_discord_ok_with_body_is_not_success() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .mount(&server)
        .await;

    assert!(notifier(&server, 1900).notify("Title", "body").await.is_err());
}

/// # Summary
/// 验证超长正文被截断到上限且保留截断标记。
#[tokio::test]
async fn test_discord_truncates_long_payload() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let body = "row\n".repeat(2_000);
    notifier(&server, 1900).notify("Title", &body).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let sent: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    let content = sent["content"].as_str().unwrap();
    assert!(content.chars().count() <= 1900);
    assert!(content.starts_with("**Title**\n"));
    assert!(content.ends_with(TRUNCATION_MARKER));
}

/// # Summary
/// 验证端点不可达时返回网络错误而不是挂起。
#[tokio::test]
async fn test_discord_unreachable_is_network_error() {
    let notifier = DiscordNotifier::new(
        "http://127.0.0.1:9/webhook".to_string(),
        1900,
        Duration::from_secs(2),
    )
    .unwrap();
    assert!(matches!(
        notifier.notify("Title", "body").await,
        Err(NotifyError::Network(_))
    ));
}
