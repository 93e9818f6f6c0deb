//! Shared test utilities and fixtures

#![allow(dead_code)]

use std::collections::VecDeque;
use std::future::{Future, ready};
use std::sync::Mutex;

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use vibe_core::{ContentStore, Conversation};
use vibe_server::{AppState, build_router};
use vibe_types::{
    CoachFeedback, Gender, PersonaId, Rating, Reply, ReplyRequest, ReplyService, ScenarioId,
    Score,
};

pub const GEMINI_MODEL: &str = "gemini-test";

pub fn content() -> ContentStore {
    ContentStore::load_builtin().unwrap()
}

/// A missing-you conversation with the tsundere partner, seeded.
pub fn conversation(seed: u64) -> Conversation {
    let content = content();
    Conversation::new(
        content.scenario(ScenarioId::MissingYou).unwrap().clone(),
        content
            .persona(Gender::Male, PersonaId::Tsundere)
            .unwrap()
            .clone(),
        Gender::Male,
        StdRng::seed_from_u64(seed),
    )
    .unwrap()
}

/// The JSON object the model (and the proxy) answers with.
pub fn model_json(score: i64, reply: &str) -> Value {
    json!({
        "girlfriendReply": reply,
        "coachFeedback": {
            "score": score,
            "comment": format!("score {score}"),
            "suggestion": "多說說你的感受"
        }
    })
}

/// A Gemini `generateContent` response carrying `model_json` as text.
pub fn gemini_candidate(score: i64, reply: &str) -> Value {
    json!({
        "candidates": [{
            "content": { "role": "model", "parts": [{ "text": model_json(score, reply).to_string() }] },
            "finishReason": "STOP"
        }]
    })
}

pub async fn mount_gemini_reply(server: &MockServer, score: i64, reply: &str) {
    Mock::given(method("POST"))
        .and(path(format!("/models/{GEMINI_MODEL}:generateContent")))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_candidate(score, reply)))
        .mount(server)
        .await;
}

pub async fn mount_status(server: &MockServer, status: u16, body: &str) {
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(status).set_body_string(body))
        .mount(server)
        .await;
}

pub async fn mount_proxy_reply(server: &MockServer, score: i64, reply: &str) {
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(model_json(score, reply)))
        .mount(server)
        .await;
}

/// Serve the proxy on an ephemeral port; returns the `/api/generate` URL.
pub async fn spawn_proxy(state: AppState) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, build_router(state)).await.unwrap();
    });
    format!("http://{addr}/api/generate")
}

pub fn rated(score: u8, text: &str) -> Reply {
    Reply {
        reply_text: text.to_owned(),
        feedback: CoachFeedback {
            score: Score::Rated(Rating::new(i64::from(score)).unwrap()),
            critique: format!("rated {score}"),
            suggestion: format!("hint {score}"),
        },
    }
}

/// Answers from a fixed script, one reply per call.
pub struct Scripted {
    replies: Mutex<VecDeque<Reply>>,
}

impl Scripted {
    pub fn new(replies: impl IntoIterator<Item = Reply>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().collect()),
        }
    }

    pub fn scores(scores: &[u8]) -> Self {
        Self::new(scores.iter().map(|&s| rated(s, "嗯")))
    }

    pub fn requests_left(&self) -> usize {
        self.replies.lock().unwrap().len()
    }
}

impl ReplyService for Scripted {
    fn get_reply(&self, _request: &ReplyRequest) -> impl Future<Output = Reply> + Send {
        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .expect("script exhausted");
        ready(reply)
    }
}
