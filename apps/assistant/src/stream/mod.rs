// Resilient consumption of streamed AI generations.
// Everything that talks to a streaming endpoint goes through StreamingRequestClient.

pub mod accumulator;
pub mod client;
pub mod observer;
pub mod segments;
pub mod sse;
pub mod transport;

#[cfg(test)]
pub(crate) mod testing;

pub use accumulator::OutputAccumulator;
pub use client::{ClientState, StreamingRequestClient, REFRESHING_STATUS};
pub use observer::{GenerationEvent, GenerationObserver};
pub use segments::{
    split_variations, SegmentedObserver, VariationScanner, VariationsObserver,
    VARIATION_COUNT, VARIATION_SEPARATOR,
};
pub use transport::{ByteStream, HttpTransport, StreamResponse, StreamTransport};
