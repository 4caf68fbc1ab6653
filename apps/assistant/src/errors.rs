use thiserror::Error;

/// Failures below the HTTP status line: name resolution, refused or reset
/// connections, and read errors on an open body.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Connection lost: {0}")]
    Disconnected(String),

    #[error("Malformed event stream: {0}")]
    Malformed(String),
}

impl TransportError {
    /// Whether reconnecting could help. Requests that reqwest refused to build
    /// (bad URL, invalid header) or redirect loops fail the same way every time.
    pub fn is_transient(&self) -> bool {
        match self {
            TransportError::Http(e) => {
                e.is_connect() || e.is_timeout() || e.is_request() || e.is_body() || e.is_decode()
            }
            TransportError::Disconnected(_) | TransportError::Malformed(_) => true,
        }
    }
}

/// Terminal outcomes of a generation request.
///
/// Recoverable conditions (expired credential, transient network failure) are
/// retried inside the client and only show up here once their retry budget is
/// spent. Cancellation is not an error and is never reported.
#[derive(Debug, Error)]
pub enum StreamError {
    #[error("authentication required")]
    CredentialUnavailable,

    #[error("Authorization still rejected after {renewals} credential renewals")]
    AuthorizationExpired { renewals: u32 },

    #[error("{}", rejected_message(.status, .detail))]
    RequestRejected { status: u16, detail: Option<String> },

    #[error("Connection failed after {attempts} attempts: {last}")]
    RetriesExhausted { attempts: u32, last: String },

    #[error("Request could not be sent: {0}")]
    RequestFailed(#[source] TransportError),
}

fn rejected_message(status: &u16, detail: &Option<String>) -> String {
    match detail {
        Some(detail) => format!("HTTP error {status}: {detail}"),
        None => format!("HTTP error {status}"),
    }
}

/// Rejected form input, reported before any request is made.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },

    #[error("{field} must be between {min} and {max}")]
    OutOfRange {
        field: &'static str,
        min: u32,
        max: u32,
    },

    #[error("Please upload a PDF file")]
    NotPdf,

    #[error("Request body could not be serialized: {0}")]
    Unserializable(String),
}

/// Errors from the application tracker API.
#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("authentication required")]
    CredentialUnavailable,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{}", rejected_message(.status, .detail))]
    Api { status: u16, detail: Option<String> },
}
