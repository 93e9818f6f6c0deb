//! The terminal client's proxy route against a live `vibe-proxy` router.

use std::time::Duration;

use wiremock::MockServer;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, ResponseTemplate};

use vibe_providers::{GeminiClient, ProxyClient, ReplyRouter};
use vibe_server::AppState;
use vibe_types::{ApiKey, Emotion};

use crate::common::{
    GEMINI_MODEL, conversation, gemini_candidate, mount_status, spawn_proxy,
};

fn server_state(gemini: &MockServer) -> AppState {
    AppState::new(Some(
        GeminiClient::new(ApiKey::new("server-key").unwrap())
            .with_model(GEMINI_MODEL)
            .with_base_url(gemini.uri())
            .with_timeout(Duration::from_secs(2)),
    ))
}

fn proxy_router(url: String) -> ReplyRouter {
    ReplyRouter::new(
        None,
        Some(ProxyClient::new(url).with_timeout(Duration::from_secs(5))),
    )
}

#[tokio::test]
async fn reply_travels_through_the_proxy() {
    let gemini = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/models/{GEMINI_MODEL}:generateContent")))
        .and(header("x-goog-api-key", "server-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_candidate(4, "哼，算你有心")))
        .expect(1)
        .mount(&gemini)
        .await;
    let url = spawn_proxy(server_state(&gemini)).await;

    let mut conversation = conversation(20);
    let report = conversation
        .submit_user_message("下班去接你好嗎", &proxy_router(url))
        .await
        .unwrap();

    assert_eq!(report.vibe_delta, 5);
    assert_eq!(conversation.vibe().value(), 55);
    let partner = conversation.message(report.partner_message).unwrap();
    assert_eq!(partner.text(), "哼，算你有心");
    assert_eq!(partner.emotion(), Some(Emotion::Pleased));
}

#[tokio::test]
async fn proxy_without_a_key_degrades_the_turn() {
    let url = spawn_proxy(AppState::default()).await;

    let mut conversation = conversation(21);
    let report = conversation
        .submit_user_message("嗨", &proxy_router(url))
        .await
        .unwrap();

    assert!(report.score.is_degraded());
    assert_eq!(conversation.vibe().value(), 50);
    let feedback = conversation
        .message(report.user_message)
        .unwrap()
        .feedback()
        .unwrap();
    assert_eq!(feedback.critique, "連線異常：伺服器回應錯誤 (500)");
}

#[tokio::test]
async fn upstream_quota_reaches_the_client_as_quota() {
    let gemini = MockServer::start().await;
    mount_status(&gemini, 429, "RESOURCE_EXHAUSTED").await;
    let url = spawn_proxy(server_state(&gemini)).await;

    let mut conversation = conversation(22);
    let report = conversation
        .submit_user_message("想你", &proxy_router(url))
        .await
        .unwrap();

    let feedback = conversation
        .message(report.user_message)
        .unwrap()
        .feedback()
        .unwrap();
    assert_eq!(feedback.critique, "連線異常：請求額度已用盡");
}
