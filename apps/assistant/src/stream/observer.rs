use tokio::sync::mpsc::UnboundedSender;

use crate::errors::StreamError;

/// Receives the progress of one generation request.
///
/// Calls are made one at a time from the client's driver task. They may call
/// back into the [`StreamingRequestClient`](crate::stream::StreamingRequestClient),
/// e.g. to cancel it or start the next request, but should return quickly:
/// `cancel` and `start` on other threads wait for a call in progress.
pub trait GenerationObserver: Send + Sync + 'static {
    /// Called with the full accumulated output after every appended chunk.
    fn on_chunk(&self, accumulated: &str);

    /// Transient status while the client recovers. During credential renewal
    /// this is [`REFRESHING_STATUS`](crate::stream::REFRESHING_STATUS); the
    /// accumulated output itself never contains it.
    fn on_status(&self, status: &str);

    fn on_done(&self);

    fn on_fatal_error(&self, error: &StreamError);
}

/// Observer callbacks as values, for consumers that prefer a channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationEvent {
    Output(String),
    Status(String),
    Done,
    Failed(String),
}

impl GenerationObserver for UnboundedSender<GenerationEvent> {
    fn on_chunk(&self, accumulated: &str) {
        let _ = self.send(GenerationEvent::Output(accumulated.to_string()));
    }

    fn on_status(&self, status: &str) {
        let _ = self.send(GenerationEvent::Status(status.to_string()));
    }

    fn on_done(&self) {
        let _ = self.send(GenerationEvent::Done);
    }

    fn on_fatal_error(&self, error: &StreamError) {
        let _ = self.send(GenerationEvent::Failed(error.to_string()));
    }
}
