/// Ordered, append-only output of one generation request.
///
/// Lives as long as the request, not the connection: reconnecting after a
/// credential renewal keeps what has already been received.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputAccumulator {
    text: String,
    chunks: usize,
}

impl OutputAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, chunk: &str) {
        self.text.push_str(chunk);
        self.chunks += 1;
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Number of chunks appended so far.
    pub fn chunk_count(&self) -> usize {
        self.chunks
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn into_string(self) -> String {
        self.text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunks_concatenate_in_order() {
        let mut acc = OutputAccumulator::new();
        acc.push("### Professional");
        acc.push(" Summary\n");
        acc.push("- Rust");
        assert_eq!(acc.as_str(), "### Professional Summary\n- Rust");
        assert_eq!(acc.chunk_count(), 3);
    }

    #[test]
    fn test_new_accumulator_is_empty() {
        assert!(OutputAccumulator::new().is_empty());
    }
}
