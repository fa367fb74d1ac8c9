//! End-to-end HTTP tests: real listener on 127.0.0.1:0, memory backend

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde_json::{Value, json};
use tokio::net::TcpListener;

use bankd::ServiceRegistry;
use bankd::access::{Argon2Hasher, TokenIssuer};
use bankd::gateway::{self, state::AppState};
use bankd::persistence::MemoryBackend;

struct TestServer {
    base: String,
    client: Client,
    _shutdown: tokio::sync::oneshot::Sender<()>,
}

impl TestServer {
    async fn start() -> Self {
        let registry = ServiceRegistry::new(
            Arc::new(MemoryBackend::new()),
            Arc::new(Argon2Hasher::with_params(8, 1, 1).unwrap()),
            Duration::from_secs(5),
        )
        .unwrap();
        let tokens = TokenIssuer::new(b"integration-test-secret", 3600);
        let state = Arc::new(AppState::new(Arc::new(registry), Arc::new(tokens)));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = tokio::sync::oneshot::channel::<()>();
        tokio::spawn(async move {
            gateway::run_server(listener, state, async {
                let _ = rx.await;
            })
            .await
            .unwrap();
        });

        Self {
            base: format!("http://{}/api/v1", addr),
            client: Client::new(),
            _shutdown: tx,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    async fn create_account(&self, tax_id: &str, balance: i64) -> Value {
        let resp = self
            .client
            .post(self.url("/accounts"))
            .json(&json!({
                "name": format!("Holder {}", tax_id),
                "tax_id": tax_id,
                "secret": "pw",
                "balance": balance,
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["code"], 0);
        body["data"].clone()
    }

    async fn login(&self, tax_id: &str) -> String {
        let resp = self
            .client
            .post(self.url("/login"))
            .json(&json!({ "tax_id": tax_id, "secret": "pw" }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = resp.json().await.unwrap();
        body["data"]["token"].as_str().unwrap().to_string()
    }

    async fn balance(&self, id: &str) -> i64 {
        let body: Value = self
            .client
            .get(self.url(&format!("/accounts/{}/balance", id)))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        body["data"]["balance"].as_i64().unwrap()
    }
}

#[tokio::test]
async fn health_reports_backend() {
    let server = TestServer::start().await;
    let resp = server.client.get(server.url("/health")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["code"], 0);
    assert_eq!(body["data"]["backend"], "memory");
}

#[tokio::test]
async fn account_lifecycle_and_transfer() {
    let server = TestServer::start().await;
    let a = server.create_account("11111111111", 100_000).await;
    let b = server.create_account("22222222222", 50_000).await;
    let a_id = a["id"].as_str().unwrap();
    let b_id = b["id"].as_str().unwrap();
    assert!(a.get("secret_hash").is_none());

    let token = server.login("11111111111").await;
    let resp = server
        .client
        .post(server.url("/transfers"))
        .bearer_auth(&token)
        .json(&json!({ "account_destination_id": b_id, "amount": 25_000 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["account_origin_id"], a_id);
    let transfer_id = body["data"]["id"].as_str().unwrap().to_string();

    assert_eq!(server.balance(a_id).await, 75_000);
    assert_eq!(server.balance(b_id).await, 75_000);

    let resp = server
        .client
        .post(server.url("/transfers"))
        .bearer_auth(&token)
        .json(&json!({ "account_destination_id": b_id, "amount": 200_000 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["code"], 1002);
    assert!(body.get("data").is_none());

    let body: Value = server
        .client
        .get(server.url("/transfers"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let resp = server
        .client
        .get(server.url(&format!("/transfers/{}", transfer_id)))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let accounts: Value = server
        .client
        .get(server.url("/accounts"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(accounts["data"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn transfer_routes_require_token() {
    let server = TestServer::start().await;

    let resp = server.client.get(server.url("/transfers")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["code"], 2001);

    let resp = server
        .client
        .get(server.url("/transfers"))
        .bearer_auth("not-a-token")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["code"], 2002);

    let resp = server
        .client
        .get(server.url("/transfers"))
        .header("Authorization", "Basic abc")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn login_rejects_bad_credentials() {
    let server = TestServer::start().await;
    server.create_account("11111111111", 0).await;

    let resp = server
        .client
        .post(server.url("/login"))
        .json(&json!({ "tax_id": "11111111111", "secret": "nope" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = server
        .client
        .post(server.url("/login"))
        .json(&json!({ "tax_id": "99999999999", "secret": "pw" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = server
        .client
        .post(server.url("/login"))
        .json(&json!({ "tax_id": "123", "secret": "pw" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn duplicate_tax_id_conflicts() {
    let server = TestServer::start().await;
    server.create_account("11111111111", 0).await;

    let resp = server
        .client
        .post(server.url("/accounts"))
        .json(&json!({ "name": "Other", "tax_id": "11111111111", "secret": "x" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["code"], 4009);
}

#[tokio::test]
async fn balance_cannot_be_overwritten_over_http() {
    let server = TestServer::start().await;
    let a = server.create_account("11111111111", 10).await;
    let a_id = a["id"].as_str().unwrap();
    let token = server.login("11111111111").await;

    let resp = server
        .client
        .put(server.url(&format!("/accounts/{}/balance", a_id)))
        .json(&json!({ "balance": 1_000_000 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);

    // The owner's own session cannot mint money either
    let resp = server
        .client
        .put(server.url(&format!("/accounts/{}/balance", a_id)))
        .bearer_auth(&token)
        .json(&json!({ "balance": 1_000_000 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(server.balance(a_id).await, 10);
}

#[tokio::test]
async fn unknown_resources_are_not_found() {
    let server = TestServer::start().await;
    server.create_account("11111111111", 0).await;
    let token = server.login("11111111111").await;

    let resp = server
        .client
        .get(server.url("/accounts/no-such-account"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = server
        .client
        .get(server.url("/transfers/01ARZ3NDEKTSV4RRFFQ69G5FAV"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = server
        .client
        .post(server.url("/transfers"))
        .bearer_auth(&token)
        .json(&json!({ "account_destination_id": "missing", "amount": 1 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["code"], 4004);
}

#[tokio::test]
async fn cors_preflight_and_openapi() {
    let server = TestServer::start().await;

    let resp = server
        .client
        .request(reqwest::Method::OPTIONS, server.url("/transfers"))
        .header("Origin", "http://example.com")
        .header("Access-Control-Request-Method", "POST")
        .header("Access-Control-Request-Headers", "authorization,content-type")
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_success());
    assert_eq!(
        resp.headers()
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some("*")
    );

    let doc: Value = server
        .client
        .get(server.url("/openapi.json"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(doc["paths"]["/api/v1/transfers"].is_object());
}
