//! StreamingRequestClient drives one logical generation request over a
//! streaming endpoint, renewing the credential and reconnecting as needed.
//!
//! Flow: start → fetch credential → open session → stream chunks →
//!       done | (403 → status + 1s backoff → fetch credential again)
//!            | (transport failure → 2s backoff → fetch credential again).
//!
//! A client owns at most one request. Starting another supersedes the current
//! one; cancelling or dropping the client abandons it. Observer calls are
//! serialized by a delivery lock and made only while the request is still the
//! current generation, so nothing from an abandoned request is delivered once
//! `start`/`cancel` has returned. Observers may call back into the client.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, ThreadId};
use std::time::Duration;

use futures::StreamExt as _;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::auth::{Credential, CredentialIssuer};
use crate::config::{ClientConfig, RetryPolicy};
use crate::errors::{StreamError, TransportError};
use crate::models::generation::GenerationRequest;
use crate::stream::accumulator::OutputAccumulator;
use crate::stream::observer::GenerationObserver;
use crate::stream::sse;
use crate::stream::transport::{HttpTransport, StreamResponse, StreamTransport};

/// Status shown to the user while an expired credential is being replaced.
pub const REFRESHING_STATUS: &str = "Refreshing connection...";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientState {
    Idle,
    Connecting,
    Streaming,
    Reconnecting,
    Completed,
    Failed,
    Cancelled,
}

impl ClientState {
    pub fn is_active(self) -> bool {
        matches!(
            self,
            ClientState::Connecting | ClientState::Streaming | ClientState::Reconnecting
        )
    }
}

struct Slot {
    state: ClientState,
    cancel: Option<CancellationToken>,
}

/// State shared by a client and its driver tasks.
struct Shared {
    /// Identity of the current request. Only bumped while `slot` is held.
    generation: AtomicU64,
    slot: Mutex<Slot>,
    /// Held for the whole of every observer call.
    delivery: Mutex<()>,
    /// Thread currently inside an observer call.
    delivering_on: Mutex<Option<ThreadId>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Shared {
    fn new() -> Self {
        Self {
            generation: AtomicU64::new(0),
            slot: Mutex::new(Slot {
                state: ClientState::Idle,
                cancel: None,
            }),
            delivery: Mutex::new(()),
            delivering_on: Mutex::new(None),
        }
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    /// Runs `f` under the delivery lock if `generation` is still current.
    fn deliver(&self, generation: u64, f: impl FnOnce()) -> bool {
        let _delivery = lock(&self.delivery);
        if !self.is_current(generation) {
            return false;
        }
        let _marker = DeliveryMarker::enter(&self.delivering_on);
        f();
        true
    }

    /// Returns once no observer call of an older generation can be running.
    ///
    /// From inside an observer call this returns immediately: the call in
    /// progress is the caller's own, and every later one sees the new
    /// generation.
    fn quiesce(&self) {
        if *lock(&self.delivering_on) == Some(thread::current().id()) {
            return;
        }
        drop(lock(&self.delivery));
    }
}

/// Records the delivering thread; cleared on drop, also when an observer panics.
struct DeliveryMarker<'a>(&'a Mutex<Option<ThreadId>>);

impl<'a> DeliveryMarker<'a> {
    fn enter(slot: &'a Mutex<Option<ThreadId>>) -> Self {
        *lock(slot) = Some(thread::current().id());
        Self(slot)
    }
}

impl Drop for DeliveryMarker<'_> {
    fn drop(&mut self) {
        *lock(self.0) = None;
    }
}

pub struct StreamingRequestClient {
    transport: Arc<dyn StreamTransport>,
    issuer: Arc<dyn CredentialIssuer>,
    policy: RetryPolicy,
    shared: Arc<Shared>,
}

impl StreamingRequestClient {
    pub fn new(
        transport: Arc<dyn StreamTransport>,
        issuer: Arc<dyn CredentialIssuer>,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            transport,
            issuer,
            policy,
            shared: Arc::new(Shared::new()),
        }
    }

    /// Client talking HTTP to the backend described by `config`.
    pub fn from_config(
        config: &ClientConfig,
        issuer: Arc<dyn CredentialIssuer>,
    ) -> Result<Self, TransportError> {
        let transport = HttpTransport::new(config.clone())?;
        Ok(Self::new(Arc::new(transport), issuer, config.retry))
    }

    /// Begins `request`, cancelling whatever this client was doing before.
    /// Returns at once; progress is reported to `observer` from a spawned task.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start<O: GenerationObserver>(&self, request: GenerationRequest, observer: O) -> Uuid {
        let request_id = request.id();
        let (generation, token, superseded) = {
            let mut slot = lock(&self.shared.slot);
            let superseded = slot.cancel.take();
            if let Some(previous) = &superseded {
                previous.cancel();
                debug!(%request_id, "superseding in-flight request");
            }
            let generation = self.shared.generation.fetch_add(1, Ordering::SeqCst) + 1;
            slot.state = ClientState::Connecting;
            let token = CancellationToken::new();
            slot.cancel = Some(token.clone());
            (generation, token, superseded.is_some())
        };
        if superseded {
            self.shared.quiesce();
        }

        let span = info_span!(
            "generation",
            request_id = %request_id,
            endpoint = request.endpoint().path()
        );
        let driver = Driver {
            shared: Arc::clone(&self.shared),
            generation,
            token,
            transport: Arc::clone(&self.transport),
            issuer: Arc::clone(&self.issuer),
            policy: self.policy,
            observer: Arc::new(observer),
            request,
        };
        tokio::spawn(driver.run().instrument(span));

        request_id
    }

    /// Abandons the current request, if any. No observer call for it happens
    /// after this returns. Calling it again, or after completion, does nothing.
    pub fn cancel(&self) {
        {
            let mut slot = lock(&self.shared.slot);
            let Some(token) = slot.cancel.take() else {
                return;
            };
            token.cancel();
            self.shared.generation.fetch_add(1, Ordering::SeqCst);
            slot.state = ClientState::Cancelled;
        }
        self.shared.quiesce();
        info!("generation request cancelled");
    }

    pub fn state(&self) -> ClientState {
        lock(&self.shared.slot).state
    }

    pub fn is_active(&self) -> bool {
        self.state().is_active()
    }
}

impl Drop for StreamingRequestClient {
    fn drop(&mut self) {
        self.cancel();
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Driver: one spawned task per generation request
// ────────────────────────────────────────────────────────────────────────────

/// One physical connection attempt. Never outlives its credential.
struct StreamSession {
    number: u32,
    credential: Credential,
}

enum Retry {
    Continue,
    Stop,
}

struct Driver {
    shared: Arc<Shared>,
    generation: u64,
    token: CancellationToken,
    transport: Arc<dyn StreamTransport>,
    issuer: Arc<dyn CredentialIssuer>,
    policy: RetryPolicy,
    observer: Arc<dyn GenerationObserver>,
    request: GenerationRequest,
}

impl Driver {
    async fn run(self) {
        let mut output = OutputAccumulator::new();
        let mut sessions = 0u32;
        let mut renewals = 0u32;
        let mut transport_failures = 0u32;

        'session: loop {
            if !self.transition(ClientState::Connecting) {
                return;
            }

            let credential = tokio::select! {
                biased;
                _ = self.token.cancelled() => return,
                credential = self.issuer.fetch() => credential,
            };
            let Some(credential) = credential else {
                self.fail(StreamError::CredentialUnavailable);
                return;
            };
            sessions += 1;
            let session = StreamSession {
                number: sessions,
                credential,
            };
            debug!(session = session.number, "connecting with fresh credential");

            let opened = tokio::select! {
                biased;
                _ = self.token.cancelled() => return,
                opened = self.transport.open(&self.request, &session.credential) => opened,
            };
            let response = match opened {
                Ok(response) => response,
                Err(e) => match self.retry_transport(&mut transport_failures, e).await {
                    Retry::Continue => continue 'session,
                    Retry::Stop => return,
                },
            };

            let status = response.status;
            match status {
                200..=299 => {}
                403 => {
                    renewals += 1;
                    if renewals > self.policy.max_auth_renewals {
                        self.fail(StreamError::AuthorizationExpired {
                            renewals: self.policy.max_auth_renewals,
                        });
                        return;
                    }
                    warn!(session = session.number, "credential rejected, reconnecting");
                    if !self.reconnecting(Some(REFRESHING_STATUS)) {
                        return;
                    }
                    if !self.backoff(self.policy.reconnect_delay).await {
                        return;
                    }
                    continue 'session;
                }
                status => {
                    let detail = tokio::select! {
                        biased;
                        _ = self.token.cancelled() => return,
                        detail = error_detail(response) => detail,
                    };
                    self.fail(StreamError::RequestRejected { status, detail });
                    return;
                }
            }

            renewals = 0;
            if !self.transition(ClientState::Streaming) {
                return;
            }
            info!(session = session.number, "stream open");

            let mut events = sse::decode(response.body);
            loop {
                let next = tokio::select! {
                    biased;
                    _ = self.token.cancelled() => return,
                    next = events.next() => next,
                };
                match next {
                    Some(Ok(event)) => {
                        if event.data.is_empty() {
                            continue;
                        }
                        transport_failures = 0;
                        output.push(&event.data);
                        if !self.emit(|observer| observer.on_chunk(output.as_str())) {
                            return;
                        }
                    }
                    Some(Err(e)) => match self.retry_transport(&mut transport_failures, e).await {
                        Retry::Continue => continue 'session,
                        Retry::Stop => return,
                    },
                    None => {
                        info!(chunks = output.chunk_count(), "stream closed by server");
                        self.finish(ClientState::Completed, |observer| observer.on_done());
                        return;
                    }
                }
            }
        }
    }

    async fn retry_transport(&self, failures: &mut u32, error: TransportError) -> Retry {
        if !error.is_transient() {
            self.fail(StreamError::RequestFailed(error));
            return Retry::Stop;
        }
        *failures += 1;
        if *failures > self.policy.max_transport_retries {
            self.fail(StreamError::RetriesExhausted {
                attempts: *failures,
                last: error.to_string(),
            });
            return Retry::Stop;
        }
        warn!(
            attempt = *failures,
            "transport failure, retrying in {}ms: {error}",
            self.policy.transport_retry_delay.as_millis()
        );
        if !self.reconnecting(None) || !self.backoff(self.policy.transport_retry_delay).await {
            return Retry::Stop;
        }
        Retry::Continue
    }

    /// Sleeps unless cancelled first. Returns false when cancelled.
    async fn backoff(&self, delay: Duration) -> bool {
        tokio::select! {
            biased;
            _ = self.token.cancelled() => false,
            _ = tokio::time::sleep(delay) => true,
        }
    }

    /// Runs `f` against the observer if this request is still current.
    fn emit(&self, f: impl FnOnce(&dyn GenerationObserver)) -> bool {
        self.shared
            .deliver(self.generation, || f(self.observer.as_ref()))
    }

    fn transition(&self, state: ClientState) -> bool {
        let mut slot = lock(&self.shared.slot);
        if !self.shared.is_current(self.generation) {
            return false;
        }
        slot.state = state;
        true
    }

    fn reconnecting(&self, status: Option<&str>) -> bool {
        if !self.transition(ClientState::Reconnecting) {
            return false;
        }
        match status {
            Some(status) => self.emit(|observer| observer.on_status(status)),
            None => true,
        }
    }

    fn finish(&self, state: ClientState, f: impl FnOnce(&dyn GenerationObserver)) {
        self.shared.deliver(self.generation, || {
            {
                let mut slot = lock(&self.shared.slot);
                // cancel() may have won the race since the delivery check.
                if !self.shared.is_current(self.generation) {
                    return;
                }
                slot.state = state;
                slot.cancel = None;
            }
            f(self.observer.as_ref());
        });
    }

    fn fail(&self, error: StreamError) {
        error!("generation failed: {error}");
        self.finish(ClientState::Failed, |observer| observer.on_fatal_error(&error));
    }
}

/// Extracts the server's explanation from an error response body: the
/// `detail` field of a JSON body, or the raw text.
async fn error_detail(response: StreamResponse) -> Option<String> {
    let text = response.text().await.ok()?;
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(map)) => match map.get("detail") {
            Some(Value::String(detail)) => Some(detail.clone()),
            Some(other) => Some(other.to_string()),
            None => Some(text.to_string()),
        },
        _ => Some(text.to_string()),
    }
}
