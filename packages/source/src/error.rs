//! Error types for the source layer.
//!
//! Errors at this level are about the producing side of a stream. Short
//! reads are not errors anywhere in the stack - a source that terminates
//! mid-accumulation yields a short but successful result.

/// Errors raised while combining chunks.
///
/// The only malformed input the chunk primitives recognize is a
/// concatenation that mixes byte and text chunks. Nothing retries this;
/// it is a programming error on the producing side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChunkError {
    /// A concatenation mixed byte and text chunks.
    ///
    /// `position` is the index of the first chunk whose representation
    /// disagrees with the first chunk in the sequence.
    MixedRepresentations {
        /// Index of the offending chunk.
        position: usize,
    },
}

impl std::fmt::Display for ChunkError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChunkError::MixedRepresentations { position } => {
                write!(
                    f,
                    "cannot concatenate byte and text chunks (mismatch at index {})",
                    position
                )
            }
        }
    }
}

impl std::error::Error for ChunkError {}

/// Errors surfaced by a pull source.
///
/// These fail the in-flight read operation and are never retried
/// internally - retries, if desired, are a caller concern.
#[derive(Debug)]
pub enum SourceError {
    /// The underlying producer or transport failed.
    Upstream(Box<dyn std::error::Error + Send + Sync>),

    /// The source was cancelled before the pull completed.
    Cancelled {
        /// Optional reason passed to the cancel operation.
        reason: Option<String>,
    },

    /// Chunk maintenance failed while servicing a read.
    Chunk(ChunkError),
}

impl std::fmt::Display for SourceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceError::Upstream(e) => write!(f, "upstream error: {}", e),
            SourceError::Cancelled { reason } => match reason {
                Some(reason) => write!(f, "source cancelled: {}", reason),
                None => write!(f, "source cancelled"),
            },
            SourceError::Chunk(e) => write!(f, "chunk error: {}", e),
        }
    }
}

impl std::error::Error for SourceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SourceError::Upstream(e) => Some(e.as_ref()),
            SourceError::Chunk(e) => Some(e),
            SourceError::Cancelled { .. } => None,
        }
    }
}

impl From<ChunkError> for SourceError {
    fn from(e: ChunkError) -> Self {
        SourceError::Chunk(e)
    }
}

impl From<std::io::Error> for SourceError {
    fn from(e: std::io::Error) -> Self {
        SourceError::Upstream(Box::new(e))
    }
}
