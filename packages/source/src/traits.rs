//! The uniform pull capability every source is normalized to.

use async_trait::async_trait;

use crate::{Chunk, SourceError};

/// The outcome of one pull.
///
/// The tagged form makes the termination invariant unrepresentable to
/// violate: a pull either carries a chunk or reports that the source is
/// done, never both and never an empty chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pulled {
    /// The next chunk of the stream.
    Chunk(Chunk),
    /// The source has terminated; no further chunks will arrive.
    Done,
}

impl Pulled {
    /// Check whether this pull reported termination.
    pub fn is_done(&self) -> bool {
        matches!(self, Pulled::Done)
    }

    /// Get the chunk, if any.
    pub fn into_chunk(self) -> Option<Chunk> {
        match self {
            Pulled::Chunk(chunk) => Some(chunk),
            Pulled::Done => None,
        }
    }
}

/// A source the consumer actively pulls chunks from.
///
/// This is the narrow waist of the stack: push streams and single
/// in-memory values are both adapted to this capability before any
/// buffering happens on top of them.
///
/// An implementation's exclusive reader handle is held by whoever owns
/// the source value; [`release`](PullSource::release) relinquishes it for
/// reuse and is the only operation that must never fail.
///
/// # Object Safety
///
/// This trait is object-safe: you can use `Box<dyn PullSource>`.
///
/// # Example
///
/// ```rust,ignore
/// use chunkstream_source::{Pulled, PullSource, SourceError};
///
/// async fn drain(source: &mut dyn PullSource) -> Result<usize, SourceError> {
///     let mut total = 0;
///     while let Pulled::Chunk(chunk) = source.pull().await? {
///         total += chunk.len();
///     }
///     Ok(total)
/// }
/// ```
#[async_trait]
pub trait PullSource: Send + Sync {
    /// Pull the next chunk. May suspend awaiting data availability.
    ///
    /// After the first `Ok(Pulled::Done)` every subsequent pull reports
    /// `Done` again. An error fails only the in-flight pull; whether the
    /// source can recover is implementation-defined, though none of the
    /// sources in this stack retry.
    async fn pull(&mut self) -> Result<Pulled, SourceError>;

    /// Relinquish the exclusive reader handle.
    ///
    /// Idempotent, non-suspending, and never fails.
    fn release(&mut self);

    /// Cancel the source, abandoning any data it still holds.
    ///
    /// Sources without a meaningful cancel operation release their handle
    /// and nothing more.
    async fn cancel(&mut self, reason: Option<String>) {
        let _ = reason;
        self.release();
    }
}

// Blanket implementations for references and boxes

#[async_trait]
impl<T: PullSource + ?Sized> PullSource for &mut T {
    async fn pull(&mut self) -> Result<Pulled, SourceError> {
        (*self).pull().await
    }

    fn release(&mut self) {
        (*self).release()
    }

    async fn cancel(&mut self, reason: Option<String>) {
        (*self).cancel(reason).await
    }
}

#[async_trait]
impl<T: PullSource + ?Sized> PullSource for Box<T> {
    async fn pull(&mut self) -> Result<Pulled, SourceError> {
        self.as_mut().pull().await
    }

    fn release(&mut self) {
        self.as_mut().release()
    }

    async fn cancel(&mut self, reason: Option<String>) {
        self.as_mut().cancel(reason).await
    }
}
