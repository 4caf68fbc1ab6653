//! Client core of the job search assistant.
//!
//! Streams AI generations (resumes, roadmaps, company research, message
//! rewrites) from the backend through [`StreamingRequestClient`], keeps the
//! application tracker in sync through [`TrackerClient`], and turns finished
//! output into downloadable artifacts.

pub mod auth;
pub mod config;
pub mod errors;
pub mod export;
pub mod models;
pub mod stream;
pub mod telemetry;
pub mod tracker;

pub use auth::{Credential, CredentialIssuer, EnvCredentialIssuer, StaticCredentialIssuer};
pub use config::{ClientConfig, RetryPolicy};
pub use errors::{StreamError, TrackerError, TransportError, ValidationError};
pub use models::generation::{Endpoint, GenerationPayload, GenerationRequest, Model};
pub use stream::{ClientState, GenerationEvent, GenerationObserver, StreamingRequestClient};
pub use tracker::TrackerClient;
