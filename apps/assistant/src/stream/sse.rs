//! Server-Sent Events framing over a streaming response body.
//!
//! Parsing is done by `eventsource-stream`; this module only folds its errors
//! into [`TransportError`] so the client can treat a corrupt stream like a
//! dropped connection.

use std::pin::Pin;

use eventsource_stream::{EventStreamError, Eventsource as _};
use futures::{Stream, StreamExt as _};

pub use eventsource_stream::Event as SseEvent;

use crate::errors::TransportError;
use crate::stream::transport::ByteStream;

pub type EventStream = Pin<Box<dyn Stream<Item = Result<SseEvent, TransportError>> + Send>>;

/// Decodes `body` into events, in arrival order.
pub fn decode(body: ByteStream) -> EventStream {
    Box::pin(body.eventsource().map(|event| event.map_err(transport_error)))
}

fn transport_error(err: EventStreamError<TransportError>) -> TransportError {
    match err {
        EventStreamError::Transport(e) => e,
        other => TransportError::Malformed(other.to_string()),
    }
}
