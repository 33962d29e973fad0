//! The Chunk type - one unit of streamed data, bytes or text.

use bytes::{Bytes, BytesMut};

use crate::ChunkError;

/// A single unit extracted from the front of a chunk.
///
/// Byte chunks yield bytes; text chunks yield characters. Lengths and
/// offsets throughout this crate count these units, so a text chunk's
/// length is its character count, not its UTF-8 byte count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    /// One byte from a byte chunk.
    Byte(u8),
    /// One character from a text chunk.
    Char(char),
}

/// One unit of streamed data, either bytes or text.
///
/// A chunk is never empty while resident in a push-back buffer; absence
/// of data is expressed as `Option<Chunk>` or [`Pulled::Done`] at the API
/// boundary, never as an empty chunk. The constructors accept empty input
/// (callers may build chunks before knowing their contents), and buffer
/// insertion filters empties instead.
///
/// Byte chunks are [`Bytes`], so cloning and slicing are reference-counted
/// and zero-copy.
///
/// # Example
///
/// ```rust
/// use chunkstream_source::Chunk;
///
/// let joined = Chunk::concat(&[Chunk::text("ab"), Chunk::text("cd")]).unwrap();
/// assert_eq!(joined.as_text(), Some("abcd"));
///
/// let (head, rest) = joined.split_at(3);
/// assert_eq!(head.as_text(), Some("abc"));
/// assert_eq!(rest.as_text(), Some("d"));
/// ```
///
/// [`Pulled::Done`]: crate::Pulled::Done
#[derive(Clone, PartialEq, Eq)]
pub enum Chunk {
    /// Raw bytes.
    Bytes(Bytes),
    /// Text, stored as UTF-8 but addressed by character.
    Text(String),
}

impl Chunk {
    // === Construction ===

    /// Create a byte chunk.
    pub fn bytes(data: impl Into<Bytes>) -> Self {
        Chunk::Bytes(data.into())
    }

    /// Create a text chunk.
    pub fn text(data: impl Into<String>) -> Self {
        Chunk::Text(data.into())
    }

    // === Inspection (cheap) ===

    /// Length in units: bytes for byte chunks, characters for text chunks.
    pub fn len(&self) -> usize {
        match self {
            Chunk::Bytes(b) => b.len(),
            Chunk::Text(t) => t.chars().count(),
        }
    }

    /// Check whether this chunk holds no units.
    pub fn is_empty(&self) -> bool {
        match self {
            Chunk::Bytes(b) => b.is_empty(),
            Chunk::Text(t) => t.is_empty(),
        }
    }

    /// Check if this is a byte chunk.
    pub fn is_bytes(&self) -> bool {
        matches!(self, Chunk::Bytes(_))
    }

    /// Check if this is a text chunk.
    pub fn is_text(&self) -> bool {
        matches!(self, Chunk::Text(_))
    }

    /// Get the bytes if this is a byte chunk.
    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            Chunk::Bytes(b) => Some(b),
            Chunk::Text(_) => None,
        }
    }

    /// Get the text if this is a text chunk.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Chunk::Bytes(_) => None,
            Chunk::Text(t) => Some(t),
        }
    }

    // === Combination and slicing (pure, total) ===

    /// Concatenate a sequence of chunks into one.
    ///
    /// All chunks must share one representation; mixing byte and text
    /// chunks is [`ChunkError::MixedRepresentations`]. An empty sequence
    /// concatenates to an empty byte chunk - permitted as a final result,
    /// never buffered.
    pub fn concat(chunks: &[Chunk]) -> Result<Chunk, ChunkError> {
        if chunks.len() == 1 {
            return Ok(chunks[0].clone());
        }
        match chunks.first() {
            None => Ok(Chunk::Bytes(Bytes::new())),
            Some(Chunk::Bytes(_)) => {
                let mut out = BytesMut::new();
                for (position, chunk) in chunks.iter().enumerate() {
                    match chunk {
                        Chunk::Bytes(b) => out.extend_from_slice(b),
                        Chunk::Text(_) => {
                            return Err(ChunkError::MixedRepresentations { position })
                        }
                    }
                }
                Ok(Chunk::Bytes(out.freeze()))
            }
            Some(Chunk::Text(_)) => {
                let mut out = String::new();
                for (position, chunk) in chunks.iter().enumerate() {
                    match chunk {
                        Chunk::Text(t) => out.push_str(t),
                        Chunk::Bytes(_) => {
                            return Err(ChunkError::MixedRepresentations { position })
                        }
                    }
                }
                Ok(Chunk::Text(out))
            }
        }
    }

    /// Take the sub-chunk from unit `start` to unit `end` (exclusive), or
    /// to the end of the chunk when `end` is `None`.
    ///
    /// Out-of-range offsets clamp to the chunk length. Byte chunks slice
    /// without copying.
    pub fn slice(&self, start: usize, end: Option<usize>) -> Chunk {
        let len = self.len();
        let start = start.min(len);
        let end = end.unwrap_or(len).min(len).max(start);
        match self {
            Chunk::Bytes(b) => Chunk::Bytes(b.slice(start..end)),
            Chunk::Text(t) => {
                let from = char_offset(t, start);
                let to = char_offset(t, end);
                Chunk::Text(t[from..to].to_string())
            }
        }
    }

    /// Split into the first `n` units and the remainder.
    ///
    /// `n` beyond the chunk length clamps, leaving an empty remainder.
    pub fn split_at(self, n: usize) -> (Chunk, Chunk) {
        match self {
            Chunk::Bytes(b) => {
                let n = n.min(b.len());
                let rest = b.slice(n..);
                (Chunk::Bytes(b.slice(..n)), Chunk::Bytes(rest))
            }
            Chunk::Text(t) => {
                let at = char_offset(&t, n);
                let rest = t[at..].to_string();
                let mut head = t;
                head.truncate(at);
                (Chunk::Text(head), Chunk::Text(rest))
            }
        }
    }

    /// Split off the first unit, returning it together with the remainder
    /// (or `None` when nothing follows).
    ///
    /// Returns `None` for an empty chunk.
    pub fn split_first(self) -> Option<(Unit, Option<Chunk>)> {
        match self {
            Chunk::Bytes(b) => {
                let first = *b.first()?;
                let rest = b.slice(1..);
                let rest = if rest.is_empty() {
                    None
                } else {
                    Some(Chunk::Bytes(rest))
                };
                Some((Unit::Byte(first), rest))
            }
            Chunk::Text(t) => {
                let first = t.chars().next()?;
                let rest = &t[first.len_utf8()..];
                let rest = if rest.is_empty() {
                    None
                } else {
                    Some(Chunk::Text(rest.to_string()))
                };
                Some((Unit::Char(first), rest))
            }
        }
    }

    /// Coerce to text, replacing invalid UTF-8 in byte chunks.
    ///
    /// Line splitting uses this to scan byte chunks for newlines. The
    /// coercion is lossy: binary data containing a `\n` byte that is not
    /// meant as a line terminator will be split anyway, and invalid UTF-8
    /// is replaced. Callers that need binary-exact framing should use the
    /// length-based reads instead.
    pub fn into_text_lossy(self) -> String {
        match self {
            Chunk::Bytes(b) => String::from_utf8_lossy(&b).into_owned(),
            Chunk::Text(t) => t,
        }
    }
}

/// Byte offset of the `n`-th character in `text`, clamped to its end.
fn char_offset(text: &str, n: usize) -> usize {
    text.char_indices().nth(n).map_or(text.len(), |(i, _)| i)
}

impl std::fmt::Debug for Chunk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Chunk::Bytes(b) => f
                .debug_struct("Chunk::Bytes")
                .field("len", &b.len())
                .finish(),
            Chunk::Text(t) => f.debug_tuple("Chunk::Text").field(t).finish(),
        }
    }
}

impl From<Bytes> for Chunk {
    fn from(b: Bytes) -> Self {
        Chunk::Bytes(b)
    }
}

impl From<String> for Chunk {
    fn from(t: String) -> Self {
        Chunk::Text(t)
    }
}

impl From<&str> for Chunk {
    fn from(t: &str) -> Self {
        Chunk::Text(t.to_string())
    }
}
