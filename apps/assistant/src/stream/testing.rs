//! Scripted transport and issuer doubles for client tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use futures::channel::mpsc;
use futures::stream;

use crate::auth::{Credential, CredentialIssuer};
use crate::errors::TransportError;
use crate::models::generation::GenerationRequest;
use crate::stream::transport::{ByteStream, StreamResponse, StreamTransport};

pub enum Script {
    Respond { status: u16, body: ByteStream },
    Fail(String),
    Error(TransportError),
}

impl Script {
    pub fn respond(status: u16, body: ByteStream) -> Self {
        Script::Respond { status, body }
    }

    pub fn fail(message: &str) -> Self {
        Script::Fail(message.to_string())
    }

    pub fn error(error: TransportError) -> Self {
        Script::Error(error)
    }
}

/// Plays back one scripted outcome per `open` and records the tokens used.
pub struct ScriptedTransport {
    scripts: Mutex<VecDeque<Script>>,
    tokens: Mutex<Vec<String>>,
}

impl ScriptedTransport {
    pub fn new(scripts: Vec<Script>) -> Arc<Self> {
        Arc::new(Self {
            scripts: Mutex::new(scripts.into()),
            tokens: Mutex::new(Vec::new()),
        })
    }

    pub fn tokens(&self) -> Vec<String> {
        self.tokens.lock().unwrap().clone()
    }
}

#[async_trait]
impl StreamTransport for ScriptedTransport {
    async fn open(
        &self,
        _request: &GenerationRequest,
        credential: &Credential,
    ) -> Result<StreamResponse, TransportError> {
        self.tokens
            .lock()
            .unwrap()
            .push(credential.token().to_string());
        let script = self.scripts.lock().unwrap().pop_front();
        match script {
            Some(Script::Respond { status, body }) => Ok(StreamResponse::new(status, body)),
            Some(Script::Fail(message)) => Err(TransportError::Disconnected(message)),
            Some(Script::Error(error)) => Err(error),
            None => Err(TransportError::Disconnected("script exhausted".to_string())),
        }
    }
}

/// Issues `token-1`, `token-2`, ... or nothing when signed out.
pub struct SequenceIssuer {
    issued: AtomicU32,
    signed_in: bool,
}

impl SequenceIssuer {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            issued: AtomicU32::new(0),
            signed_in: true,
        })
    }

    pub fn signed_out() -> Arc<Self> {
        Arc::new(Self {
            issued: AtomicU32::new(0),
            signed_in: false,
        })
    }
}

#[async_trait]
impl CredentialIssuer for SequenceIssuer {
    async fn fetch(&self) -> Option<Credential> {
        if !self.signed_in {
            return None;
        }
        let n = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        Some(Credential::new(format!("token-{n}")))
    }
}

/// A body that yields `chunks` and then ends.
pub fn body(chunks: &[&str]) -> ByteStream {
    let items: Vec<Result<Bytes, TransportError>> = chunks
        .iter()
        .map(|chunk| Ok(Bytes::copy_from_slice(chunk.as_bytes())))
        .collect();
    Box::pin(stream::iter(items))
}

/// A body fed by the returned sender; it stays open until the sender drops.
pub fn stalled_body() -> (
    mpsc::UnboundedSender<Result<Bytes, TransportError>>,
    ByteStream,
) {
    let (tx, rx) = mpsc::unbounded();
    (tx, Box::pin(rx))
}
