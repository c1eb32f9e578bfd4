//! Shared helpers for the HTTP level tests: fixture keys, token signing,
//! mocked key / access services and an in-process router.

#![allow(dead_code)]

use std::collections::HashMap;

use axum::{Router, body::Body, http::Request};
use http_body_util::BodyExt;
use iam_gate::{app, config::Config};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde_json::{Value, json};
use tower::ServiceExt;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

pub const PRIVATE_PEM: &str = include_str!("../fixtures/rsa_private.pem");
pub const PUBLIC_PEM: &str = include_str!("../fixtures/rsa_public.pem");

pub fn sign(kid: &str, claims: Value) -> String {
    let mut header = Header::new(Algorithm::RS256);
    header.kid = Some(kid.to_string());
    let key = EncodingKey::from_rsa_pem(PRIVATE_PEM.as_bytes()).expect("fixture key");
    jsonwebtoken::encode(&header, &claims, &key).expect("sign token")
}

pub fn key_body(kid: &str, pem: &str) -> Value {
    json!({
        "message": "",
        "status": "success",
        "data": {
            "keyID": kid,
            "createdOn": "2021-06-01T10:00:00Z",
            "sourceID": "iam",
            "key": pem,
        }
    })
}

pub fn access_body(data: Value) -> Value {
    json!({"message": "", "status": "success", "data": data})
}

pub struct Services {
    pub keys: MockServer,
    pub access: MockServer,
}

impl Services {
    pub async fn start() -> Self {
        Self {
            keys: MockServer::start().await,
            access: MockServer::start().await,
        }
    }

    /// Serves the fixture public key under `kid`, expecting `times` lookups.
    pub async fn serve_key(&self, kid: &str, times: u64) {
        Mock::given(method("GET"))
            .and(path(format!("/keys/{kid}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(key_body(kid, PUBLIC_PEM)))
            .expect(times)
            .mount(&self.keys)
            .await;
    }

    pub async fn serve_access(&self, subject: &str, data: Value, times: u64) {
        Mock::given(method("GET"))
            .and(path(format!("/access/{subject}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(access_body(data)))
            .expect(times)
            .mount(&self.access)
            .await;
    }

    pub fn config(&self, extra: &[(&str, &str)]) -> Config {
        let mut vars: HashMap<String, String> = HashMap::from([
            ("KEYS_SERVICE_URL".to_string(), self.keys.uri()),
            ("ACCESS_SERVICE_URL".to_string(), self.access.uri()),
        ]);
        for (k, v) in extra {
            vars.insert(k.to_string(), v.to_string());
        }
        Config::from_lookup(|key| vars.get(key).cloned()).expect("test config")
    }

    pub fn router(&self) -> Router {
        self.router_with(&[])
    }

    pub fn router_with(&self, extra: &[(&str, &str)]) -> Router {
        let state = app::build_state(&self.config(extra)).expect("app state");
        app::build_router(state)
    }
}

pub async fn send(router: Router, request: Request<Body>) -> (u16, Value) {
    let response = router.oneshot(request).await.expect("infallible");
    let status = response.status().as_u16();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("read body")
        .to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("request")
}

pub fn get_with_bearer(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .expect("request")
}
