//! Fake backend plumbing shared by the integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use assistant::{ClientConfig, Credential, CredentialIssuer, RetryPolicy};
use async_trait::async_trait;
use axum::Router;

/// Serves `router` on an ephemeral local port and returns its base URL.
pub async fn spawn_backend(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().expect("listener address");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("serve test backend");
    });
    format!("http://{addr}")
}

/// Config with short backoff so reconnect paths run quickly.
pub fn fast_config(base_url: &str) -> ClientConfig {
    let mut config = ClientConfig::new(base_url);
    config.retry = RetryPolicy {
        reconnect_delay: Duration::from_millis(10),
        transport_retry_delay: Duration::from_millis(10),
        ..RetryPolicy::default()
    };
    config
}

/// Hands out the given tokens in order, then keeps repeating the last one.
pub struct QueueIssuer {
    tokens: Mutex<VecDeque<String>>,
    last: Mutex<Option<String>>,
}

impl QueueIssuer {
    pub fn new(tokens: &[&str]) -> Self {
        Self {
            tokens: Mutex::new(tokens.iter().map(|t| t.to_string()).collect()),
            last: Mutex::new(None),
        }
    }
}

#[async_trait]
impl CredentialIssuer for QueueIssuer {
    async fn fetch(&self) -> Option<Credential> {
        let mut last = self.last.lock().unwrap();
        if let Some(token) = self.tokens.lock().unwrap().pop_front() {
            *last = Some(token);
        }
        last.clone().map(Credential::new)
    }
}
