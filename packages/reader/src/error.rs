//! Error type for the reader layer.

use chunkstream_source::{ChunkError, SourceError};

/// Errors surfaced by reader operations.
///
/// Both variants fail only the in-flight read; nothing here is retried.
/// A short read (termination mid-accumulation) is a successful result,
/// not an error.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The underlying source signalled a failure.
    #[error("source error: {0}")]
    Source(#[from] SourceError),

    /// Chunk concatenation mixed byte and text chunks.
    #[error("chunk error: {0}")]
    Chunk(#[from] ChunkError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversions_wrap_the_layer_below() {
        let e: Error = SourceError::Cancelled { reason: None }.into();
        assert!(matches!(e, Error::Source(_)));
        assert!(format!("{}", e).contains("cancelled"));

        let e: Error = ChunkError::MixedRepresentations { position: 0 }.into();
        assert!(matches!(e, Error::Chunk(_)));
    }
}
