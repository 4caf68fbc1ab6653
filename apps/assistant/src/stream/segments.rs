//! Splitting message-rewrite output into its three variations.
//!
//! The backend streams all variations in one response, separated by
//! [`VARIATION_SEPARATOR`]. Each variation is shown as soon as its boundary has
//! arrived, and the one still being written is shown as its current prefix.

use std::sync::Mutex;

use crate::errors::StreamError;
use crate::stream::observer::GenerationObserver;

pub const VARIATION_SEPARATOR: &str = "---VARIATION_SEPARATOR---";

/// Number of named variation slots; anything after the third is ignored.
pub const VARIATION_COUNT: usize = 3;

/// Splits complete text in one pass. Segments are trimmed.
pub fn split_variations(text: &str) -> Vec<&str> {
    text.split(VARIATION_SEPARATOR)
        .take(VARIATION_COUNT)
        .map(str::trim)
        .collect()
}

/// Tracks separator positions across successive snapshots of a growing
/// buffer, scanning only the bytes that are new since the last snapshot.
#[derive(Debug, Clone, Default)]
pub struct VariationScanner {
    separators: Vec<usize>,
    scanned: usize,
    seen_len: usize,
}

impl VariationScanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records separators in `accumulated`, which must extend the text passed
    /// on the previous call. A shorter buffer starts a fresh scan.
    pub fn update(&mut self, accumulated: &str) {
        if accumulated.len() < self.seen_len || !accumulated.is_char_boundary(self.scanned) {
            *self = Self::default();
        }
        self.seen_len = accumulated.len();

        while self.separators.len() < VARIATION_COUNT {
            match accumulated[self.scanned..].find(VARIATION_SEPARATOR) {
                Some(pos) => {
                    let start = self.scanned + pos;
                    self.separators.push(start);
                    self.scanned = start + VARIATION_SEPARATOR.len();
                }
                None => {
                    // Keep a separator-sized tail: its start may already be here.
                    let mut resume = accumulated
                        .len()
                        .saturating_sub(VARIATION_SEPARATOR.len() - 1)
                        .max(self.scanned);
                    while !accumulated.is_char_boundary(resume) {
                        resume -= 1;
                    }
                    self.scanned = resume;
                    break;
                }
            }
        }
    }

    /// The variations visible in `accumulated`, trimmed. Slots whose
    /// boundary has not arrived yet are absent.
    pub fn variations<'a>(&self, accumulated: &'a str) -> Vec<&'a str> {
        let visible = (self.separators.len() + 1).min(VARIATION_COUNT);
        (0..visible)
            .map(|slot| {
                let start = match slot {
                    0 => 0,
                    n => self.separators[n - 1] + VARIATION_SEPARATOR.len(),
                };
                let end = self
                    .separators
                    .get(slot)
                    .copied()
                    .unwrap_or(accumulated.len());
                accumulated[start..end].trim()
            })
            .collect()
    }
}

/// Consumer of segmented rewrite output.
pub trait VariationsObserver: Send + Sync + 'static {
    fn on_variations(&self, variations: &[&str]);

    /// See [`GenerationObserver::on_status`].
    fn on_status(&self, status: &str);

    fn on_done(&self);

    fn on_fatal_error(&self, error: &StreamError);
}

/// Adapts a [`VariationsObserver`] to the plain text stream of a request.
pub struct SegmentedObserver<O> {
    inner: O,
    scanner: Mutex<VariationScanner>,
}

impl<O: VariationsObserver> SegmentedObserver<O> {
    pub fn new(inner: O) -> Self {
        Self {
            inner,
            scanner: Mutex::new(VariationScanner::new()),
        }
    }
}

impl<O: VariationsObserver> GenerationObserver for SegmentedObserver<O> {
    fn on_chunk(&self, accumulated: &str) {
        let mut scanner = self
            .scanner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        scanner.update(accumulated);
        self.inner.on_variations(&scanner.variations(accumulated));
    }

    fn on_status(&self, status: &str) {
        self.inner.on_status(status);
    }

    fn on_done(&self) {
        self.inner.on_done();
    }

    fn on_fatal_error(&self, error: &StreamError) {
        self.inner.on_fatal_error(error);
    }
}
