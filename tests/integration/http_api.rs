//! HTTP API tests over a real socket.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;
use std::time::Duration;

use narrative_deconstruct::config::{DemoFixture, ExecutionStrategy, SecretString};
use narrative_deconstruct::schema::AnalysisResult;
use narrative_deconstruct::server::{
    router, AnalysisService, AppState, HealthResponse, HttpTransport,
};
use narrative_deconstruct::synthesis::DeconstructionPipeline;
use narrative_deconstruct::traits::GenerativeClientTrait;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use super::{settings, ScriptedClient, SAMPLE_TEXT};

struct RunningServer {
    base_url: String,
    shutdown: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

impl RunningServer {
    async fn start(state: AppState) -> Self {
        let transport = HttpTransport::bind("127.0.0.1:0").await.unwrap();
        let addr = transport.local_addr().unwrap();
        let (shutdown, rx) = oneshot::channel::<()>();

        let handle = tokio::spawn(async move {
            transport
                .serve(router(state), async {
                    let _ = rx.await;
                })
                .await
                .unwrap();
        });

        Self {
            base_url: format!("http://{addr}"),
            shutdown,
            handle,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn stop(self) {
        self.shutdown.send(()).unwrap();
        self.handle.await.unwrap();
    }
}

fn live_state(client: ScriptedClient) -> AppState {
    let client: Arc<dyn GenerativeClientTrait> = Arc::new(client);
    let pipeline = DeconstructionPipeline::new(
        client,
        settings(ExecutionStrategy::Concurrent, Duration::from_secs(2)),
    );
    AppState::new(AnalysisService::Live(pipeline), None)
}

#[tokio::test]
async fn test_health_over_http() {
    let server = RunningServer::start(AppState::new(AnalysisService::Demo(DemoFixture::Rich), None)).await;

    let health: HealthResponse = reqwest::get(server.url("/api/health"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(health, HealthResponse::healthy());

    server.stop().await;
}

#[tokio::test]
async fn test_rich_demo_round_trip() {
    let server = RunningServer::start(AppState::new(AnalysisService::Demo(DemoFixture::Rich), None)).await;

    let response = reqwest::Client::new()
        .post(server.url("/api/v1/synthesize"))
        .json(&json!({"text": "Anything at all."}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let result: AnalysisResult = response.json().await.unwrap();
    assert_eq!(result, narrative_deconstruct::demo::rich_result());

    server.stop().await;
}

#[tokio::test]
async fn test_live_pipeline_over_http() {
    let server = RunningServer::start(live_state(ScriptedClient::healthy())).await;

    let body: Value = reqwest::Client::new()
        .post(server.url("/api/v1/synthesize"))
        .json(&json!({"text": SAMPLE_TEXT}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["synthesized_text"][0]["tactics"][0]["type"], "framing");
    assert_eq!(body["synthesized_text"][1]["bias_score"], -0.8);
    assert_eq!(body["foundational_assumptions"].as_array().unwrap().len(), 2);

    server.stop().await;
}

#[tokio::test]
async fn test_empty_text_over_http() {
    let server = RunningServer::start(live_state(ScriptedClient::healthy())).await;

    let response = reqwest::Client::new()
        .post(server.url("/api/v1/synthesize"))
        .json(&json!({"text": ""}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({"detail": "Text input cannot be empty"}));

    server.stop().await;
}

#[tokio::test]
async fn test_bearer_gate_over_http() {
    let server = RunningServer::start(AppState::new(
        AnalysisService::Demo(DemoFixture::Simple),
        Some(SecretString::new("letmein")),
    ))
    .await;
    let client = reqwest::Client::new();

    let denied = client
        .post(server.url("/api/v1/synthesize"))
        .json(&json!({"text": "One. Two."}))
        .send()
        .await
        .unwrap();
    assert_eq!(denied.status(), 401);

    let allowed = client
        .post(server.url("/api/v1/synthesize"))
        .bearer_auth("letmein")
        .json(&json!({"text": "One. Two."}))
        .send()
        .await
        .unwrap();
    assert_eq!(allowed.status(), 200);

    server.stop().await;
}

#[tokio::test]
async fn test_cors_allows_any_origin() {
    let server = RunningServer::start(AppState::new(AnalysisService::Demo(DemoFixture::Rich), None)).await;

    let response = reqwest::Client::new()
        .get(server.url("/api/health"))
        .header("origin", "http://example.com")
        .send()
        .await
        .unwrap();
    assert_eq!(response.headers()["access-control-allow-origin"], "*");

    server.stop().await;
}
