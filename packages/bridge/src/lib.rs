//! chunkstream-bridge: Push/Pull Stream Adapters
//!
//! Converts between the two structurally different stream models while
//! relaying backpressure and cancellation between them:
//!
//! - [`PushToPull`] turns a callback-driven [`PushSource`] into a
//!   [`PullSource`](chunkstream_source::PullSource). The source is kept
//!   paused and only resumed by an explicit pull with nothing queued, so
//!   the producer never runs ahead of the consumer.
//! - [`PullToPush`] turns a pull source into a push stream with
//!   read-ahead: each solicited read drains the source into a
//!   [`PushSink`] until it saturates.
//!
//! Cancellation is a first-class [`CancelSignal`] threaded through the
//! drain loop; both adapters' cancel operations are idempotent.
//!
//! # Example
//!
//! ```rust,ignore
//! use chunkstream_bridge::{PullToPush, PushSink};
//!
//! let mut stream = PullToPush::new(Box::new(pull_source));
//! stream.drive(&mut my_sink).await;   // one solicited read
//! stream.cancel(Some("shutting down".into())).await;
//! ```

mod cancel;
mod pull_to_push;
mod push;
mod push_to_pull;

pub use cancel::CancelSignal;
pub use pull_to_push::{DriveState, PullToPush};
pub use push::{EventSender, PushEvent, PushSink, PushSource};
pub use push_to_pull::PushToPull;
