//! The lookahead reader: buffering, convenience reads, peek, push-back.

use std::collections::VecDeque;

use chunkstream_source::{Chunk, PullSource, Pulled, Unit};

use crate::normalizer::{Input, NormalizedSource, Normalizer, SourceId};
use crate::Error;

/// A peekable, push-back-capable reader over one normalized source.
///
/// The reader owns a push-back buffer that is always drained before the
/// underlying source is pulled, so anything [`unshift`]ed (or left over
/// from a peek) is observed again in order. All read operations treat
/// termination mid-accumulation as a valid short result; `None` (or
/// [`Pulled::Done`]) only means the accumulation was genuinely empty.
///
/// Every operation takes `&mut self`: sequential calls observe the stream
/// in production order, and overlapping calls on one reader are
/// unrepresentable.
///
/// # Example
///
/// ```rust,ignore
/// use chunkstream_reader::{Input, LookaheadReader, Normalizer};
///
/// let mut normalizer = Normalizer::new();
/// let mut reader = LookaheadReader::new(&mut normalizer, Input::Pull(source));
///
/// let header = reader.read_units(4).await?;   // short on EOF, never an error
/// let line = reader.read_line().await?;
/// ```
///
/// [`unshift`]: LookaheadReader::unshift
pub struct LookaheadReader {
    id: SourceId,
    buffer: VecDeque<Chunk>,
    source: Box<dyn PullSource>,
}

impl LookaheadReader {
    /// Normalize `input` and wrap it, inheriting any residual buffer a
    /// previous reader left behind on the same source identity.
    pub fn new(normalizer: &mut Normalizer, input: impl Into<Input>) -> Self {
        let normalized = normalizer.normalize(input.into());
        Self::reacquire(normalizer, normalized)
    }

    /// Wrap a source released by a previous reader, inheriting its
    /// residual buffer.
    pub fn reacquire(normalizer: &mut Normalizer, handle: NormalizedSource) -> Self {
        let buffer = normalizer
            .take_residual(handle.id)
            .unwrap_or_default()
            .into();
        Self {
            id: handle.id,
            buffer,
            source: handle.source,
        }
    }

    /// The identity of the wrapped source.
    pub fn source_id(&self) -> SourceId {
        self.id
    }

    /// Read the next chunk: the front of the push-back buffer if any,
    /// otherwise one pull from the underlying source.
    pub async fn read(&mut self) -> Result<Pulled, Error> {
        if let Some(chunk) = self.buffer.pop_front() {
            return Ok(Pulled::Chunk(chunk));
        }
        Ok(self.source.pull().await?)
    }

    /// Read a single unit (byte or character), pushing back whatever else
    /// came with it. `None` on termination.
    pub async fn read_unit(&mut self) -> Result<Option<Unit>, Error> {
        match self.read().await? {
            Pulled::Done => Ok(None),
            Pulled::Chunk(chunk) => match chunk.split_first() {
                Some((unit, rest)) => {
                    if let Some(rest) = rest {
                        self.unshift([rest]);
                    }
                    Ok(Some(unit))
                }
                // Empty chunks never reach the buffer; an empty pull
                // result is treated as termination.
                None => Ok(None),
            },
        }
    }

    /// Read exactly `n` units, or fewer if the source terminates first.
    ///
    /// Chunks accumulate until `n` units are available; the surplus goes
    /// back on the buffer as one chunk. Termination with a non-empty
    /// accumulation returns the short result; `None` only when nothing at
    /// all was read.
    pub async fn read_units(&mut self, n: usize) -> Result<Option<Chunk>, Error> {
        let mut acc: Vec<Chunk> = Vec::new();
        let mut have = 0;

        while have < n {
            match self.read().await? {
                Pulled::Chunk(chunk) => {
                    have += chunk.len();
                    acc.push(chunk);
                }
                Pulled::Done => {
                    if acc.is_empty() {
                        return Ok(None);
                    }
                    // Short read on termination.
                    return Ok(Some(Chunk::concat(&acc)?));
                }
            }
        }

        let (head, rest) = Chunk::concat(&acc)?.split_at(n);
        if !rest.is_empty() {
            self.unshift([rest]);
        }
        Ok(Some(head))
    }

    /// Like [`read_units`](LookaheadReader::read_units), but
    /// non-destructive: the result is pushed back so the next read
    /// observes it again.
    pub async fn peek_units(&mut self, n: usize) -> Result<Option<Chunk>, Error> {
        let peeked = self.read_units(n).await?;
        if let Some(chunk) = &peeked {
            self.unshift([chunk.clone()]);
        }
        Ok(peeked)
    }

    /// Read through the first newline, inclusive.
    ///
    /// Every chunk is coerced to text before scanning, including byte
    /// chunks - see [`Chunk::into_text_lossy`] for the binary-data
    /// caveat. Content after the newline is pushed back as text.
    /// Termination before a newline yields the accumulation if non-empty,
    /// else `None`.
    pub async fn read_line(&mut self) -> Result<Option<Chunk>, Error> {
        let mut line = String::new();
        loop {
            match self.read().await? {
                Pulled::Done => {
                    if line.is_empty() {
                        return Ok(None);
                    }
                    return Ok(Some(Chunk::Text(line)));
                }
                Pulled::Chunk(chunk) => {
                    let text = chunk.into_text_lossy();
                    match text.find('\n') {
                        Some(at) => {
                            line.push_str(&text[..=at]);
                            let rest = &text[at + 1..];
                            if !rest.is_empty() {
                                self.unshift([Chunk::text(rest)]);
                            }
                            return Ok(Some(Chunk::Text(line)));
                        }
                        None => line.push_str(&text),
                    }
                }
            }
        }
    }

    /// Prepend chunks to the front of the push-back buffer.
    ///
    /// The first chunk given ends up frontmost; empty chunks are silently
    /// dropped.
    pub fn unshift(&mut self, chunks: impl IntoIterator<Item = Chunk>) {
        let kept: Vec<Chunk> = chunks.into_iter().filter(|c| !c.is_empty()).collect();
        for chunk in kept.into_iter().rev() {
            self.buffer.push_front(chunk);
        }
    }

    /// Read everything remaining and concatenate it into one chunk.
    ///
    /// An already-terminated stream concatenates to an empty byte chunk.
    pub async fn read_to_end(&mut self) -> Result<Chunk, Error> {
        let chunks = self.collect_remaining().await?;
        Ok(Chunk::concat(&chunks)?)
    }

    /// Read everything remaining and combine the collected chunks with
    /// `combine` instead of the standard concatenation.
    pub async fn read_to_end_with<T>(
        &mut self,
        combine: impl FnOnce(Vec<Chunk>) -> T + Send,
    ) -> Result<T, Error> {
        Ok(combine(self.collect_remaining().await?))
    }

    async fn collect_remaining(&mut self) -> Result<Vec<Chunk>, Error> {
        let mut chunks = Vec::new();
        loop {
            match self.read().await? {
                Pulled::Chunk(chunk) => chunks.push(chunk),
                Pulled::Done => return Ok(chunks),
            }
        }
    }

    /// Release the underlying source for reuse.
    ///
    /// A non-empty push-back buffer is recorded (as a shallow copy)
    /// against the source's identity, so the next reader constructed over
    /// the returned handle inherits it. Never fails.
    pub fn release_lock(mut self, normalizer: &mut Normalizer) -> NormalizedSource {
        if !self.buffer.is_empty() {
            normalizer.store_residual(self.id, self.buffer.iter().cloned().collect());
        }
        self.source.release();
        NormalizedSource {
            id: self.id,
            source: self.source,
        }
    }
}
