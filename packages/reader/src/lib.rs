//! chunkstream-reader: Lookahead Reading over Any Source
//!
//! The consumer-facing layer of the chunkstream stack. A
//! [`LookaheadReader`] wraps any normalized source with a push-back
//! buffer and convenience reads - single units, fixed lengths, lines,
//! peek - so parsers of framed or delimited data never special-case the
//! source kind or re-buffer by hand.
//!
//! Sources reach the reader through the [`Normalizer`], which flattens
//! the three source kinds ([`Input::Pull`], [`Input::Push`],
//! [`Input::Single`]) into one uniform pull source and tracks source
//! identity: one-shot values yield exactly once across wraps, and a
//! released reader's leftover buffer is inherited by the next reader on
//! the same source.
//!
//! # Example
//!
//! ```rust,ignore
//! use chunkstream_reader::{Chunk, Input, LookaheadReader, Normalizer};
//!
//! let mut normalizer = Normalizer::new();
//! let mut reader = LookaheadReader::new(&mut normalizer, Chunk::text("a\nb"));
//!
//! assert_eq!(reader.read_line().await?.unwrap().as_text(), Some("a\n"));
//! assert_eq!(reader.read_line().await?.unwrap().as_text(), Some("b"));
//! ```

mod error;
mod normalizer;
mod reader;

pub use error::Error;
pub use normalizer::{Input, NormalizedSource, Normalizer, SingleValue, SourceId};
pub use reader::LookaheadReader;

// Re-export the layers below for convenience
pub use chunkstream_bridge::{
    CancelSignal, DriveState, EventSender, PullToPush, PushEvent, PushSink, PushSource, PushToPull,
};
pub use chunkstream_source::{Bytes, Chunk, ChunkError, PullSource, Pulled, SourceError, Unit};
