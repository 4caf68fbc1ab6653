use std::pin::Pin;

use async_trait::async_trait;
use bytes::Bytes;
use futures::{Stream, StreamExt as _, TryStreamExt as _};
use reqwest::header::ACCEPT;
use reqwest::Client;
use tracing::debug;

use crate::auth::Credential;
use crate::config::ClientConfig;
use crate::errors::TransportError;
use crate::models::generation::GenerationRequest;

pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, TransportError>> + Send + 'static>>;

/// An opened streaming response: the status line plus the unread body.
pub struct StreamResponse {
    pub status: u16,
    pub body: ByteStream,
}

impl StreamResponse {
    pub fn new(status: u16, body: ByteStream) -> Self {
        Self { status, body }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Drains the body as text, lossily. Used for error details.
    pub async fn text(self) -> Result<String, TransportError> {
        let bytes: Vec<Bytes> = self.body.try_collect().await?;
        Ok(String::from_utf8_lossy(&bytes.concat()).into_owned())
    }
}

/// Opens one physical streaming connection for a request.
#[async_trait]
pub trait StreamTransport: Send + Sync {
    async fn open(
        &self,
        request: &GenerationRequest,
        credential: &Credential,
    ) -> Result<StreamResponse, TransportError>;
}

/// HTTP transport posting JSON and reading an `text/event-stream` body.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    config: ClientConfig,
}

impl HttpTransport {
    pub fn new(config: ClientConfig) -> Result<Self, TransportError> {
        // No total timeout: generations legitimately stream for minutes.
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .build()?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl StreamTransport for HttpTransport {
    async fn open(
        &self,
        request: &GenerationRequest,
        credential: &Credential,
    ) -> Result<StreamResponse, TransportError> {
        let url = self.config.url_for(request.endpoint().path());
        debug!(request_id = %request.id(), %url, "opening event stream");

        let response = self
            .client
            .post(&url)
            .bearer_auth(credential.token())
            .header(ACCEPT, "text/event-stream")
            .json(request.body())
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.bytes_stream().map(|chunk| chunk.map_err(TransportError::from));
        Ok(StreamResponse::new(status, Box::pin(body)))
    }
}
