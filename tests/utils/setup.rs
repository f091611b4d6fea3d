//! Test server setup - builds a router around a chosen store with a controllable clock
#![allow(dead_code)] // Test utilities may not all be used in every test

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use chrono::{Duration, Utc};
use std::sync::Arc;
use tower::ServiceExt; // for `oneshot`

use simplebank::{
    token::ManualClock,
    util::random::{random_currency, random_int, random_money, random_owner, random_string},
    Account, Config, Maker, Server, Store, SymmetricMaker,
};

// ============================================================================
// Test Server Infrastructure
// ============================================================================

pub struct TestServer {
    pub router: Router,
    pub maker: Arc<dyn Maker>,
    pub clock: Arc<ManualClock>,
}

pub struct TestServerBuilder {
    store: Arc<dyn Store>,
    config: Config,
}

impl TestServerBuilder {
    pub fn new(store: Arc<dyn Store>) -> Self {
        let mut config = Config::with_symmetric_key(random_string(32));
        config.password_hash_cost = 4;
        Self { store, config }
    }

    pub fn with_store_timeout(mut self, timeout: std::time::Duration) -> Self {
        self.config.store_timeout = timeout;
        self
    }

    pub fn with_request_timeout(mut self, timeout: std::time::Duration) -> Self {
        self.config.request_timeout = timeout;
        self
    }

    pub fn build(self) -> TestServer {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let maker: Arc<dyn Maker> = Arc::new(
            SymmetricMaker::with_clock(&self.config.token_symmetric_key, clock.clone())
                .expect("test key has the right size"),
        );
        let server = Server::with_maker(self.config, self.store, maker.clone());

        TestServer {
            router: server.router(),
            maker,
            clock,
        }
    }
}

impl TestServer {
    /// Issues a valid `Authorization` header value for `username`
    pub fn bearer(&self, username: &str) -> String {
        let (token, _) = self
            .maker
            .create_token(username, Duration::minutes(1))
            .expect("token creation should succeed");
        format!("Bearer {}", token)
    }

    /// Issues a header whose token will have expired by the next request
    pub fn expired_bearer(&self, username: &str) -> String {
        let header = self.bearer(username);
        self.clock.advance(Duration::minutes(1) + Duration::seconds(1));
        header
    }

    pub async fn get(&self, uri: &str, auth: Option<&str>) -> (StatusCode, Vec<u8>) {
        let mut builder = Request::builder().method("GET").uri(uri);
        if let Some(auth) = auth {
            builder = builder.header(header::AUTHORIZATION, auth);
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    pub async fn post_json(
        &self,
        uri: &str,
        auth: Option<&str>,
        body: serde_json::Value,
    ) -> (StatusCode, Vec<u8>) {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(auth) = auth {
            builder = builder.header(header::AUTHORIZATION, auth);
        }
        self.send(builder.body(Body::from(body.to_string())).unwrap())
            .await
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, body.to_vec())
    }
}

pub fn random_account() -> Account {
    Account {
        id: random_int(1, 1000),
        owner: random_owner(),
        balance: random_money(),
        currency: random_currency().to_string(),
    }
}
