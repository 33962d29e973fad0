//! chunkstream-source: Chunk Data Model and Pull-Source Traits
//!
//! This is the narrow waist of the chunkstream stack. Everything at this
//! level is pure data - a [`Chunk`] is bytes or text, a [`PullSource`]
//! yields chunks until it is done, and nothing here knows about push
//! streams, buffering, or transports.
//!
//! Use this layer for:
//! - Implementing a new source kind (anything that can yield chunks)
//! - Combining and slicing chunks without caring where they came from
//! - Code that should work over any normalized source
//!
//! # Example
//!
//! ```rust
//! use chunkstream_source::Chunk;
//!
//! let joined = Chunk::concat(&[Chunk::text("hel"), Chunk::text("lo")]).unwrap();
//! assert_eq!(joined.as_text(), Some("hello"));
//! assert_eq!(joined.len(), 5);
//! ```
//!
//! Higher layers live in their own crates: `chunkstream-bridge` converts
//! between push and pull models, and `chunkstream-reader` adds lookahead
//! and push-back on top of any [`PullSource`].

pub use bytes::Bytes;

mod chunk;
mod error;
mod traits;

pub use chunk::{Chunk, Unit};
pub use error::{ChunkError, SourceError};
pub use traits::{PullSource, Pulled};
