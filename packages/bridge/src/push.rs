//! The push-based source and sink capabilities.
//!
//! A push source delivers chunks on its own schedule and is throttled
//! through `pause`/`resume`. A push sink is the downstream half: it
//! accepts chunks until it reports saturation. The adapters in this crate
//! convert between these and the pull model.

use tokio::sync::mpsc;

use chunkstream_source::{Chunk, SourceError};

/// One delivery from a push source.
#[derive(Debug)]
pub enum PushEvent {
    /// A chunk of data.
    Data(Chunk),
    /// The source has no more data.
    End,
    /// The source failed; no further events follow.
    Error(SourceError),
}

/// The outlet a push source delivers its events into.
///
/// Handed to the source by [`PushSource::start`]. Delivery never blocks
/// and never fails from the source's point of view: events sent after the
/// consumer has gone away are silently dropped, and empty data chunks are
/// filtered here so they can never reach a buffer.
#[derive(Clone)]
pub struct EventSender {
    tx: mpsc::UnboundedSender<PushEvent>,
}

impl EventSender {
    pub(crate) fn new(tx: mpsc::UnboundedSender<PushEvent>) -> Self {
        Self { tx }
    }

    /// Deliver a chunk. Empty chunks are dropped.
    pub fn data(&self, chunk: Chunk) {
        if chunk.is_empty() {
            return;
        }
        let _ = self.tx.send(PushEvent::Data(chunk));
    }

    /// Signal end-of-data.
    pub fn end(&self) {
        let _ = self.tx.send(PushEvent::End);
    }

    /// Signal a terminal error.
    pub fn error(&self, error: SourceError) {
        let _ = self.tx.send(PushEvent::Error(error));
    }
}

/// A source where the producer delivers chunks via events, with
/// `pause`/`resume` as flow control.
///
/// `pause` is advisory: a paused source may still deliver events already
/// in flight, and consumers must be prepared to queue them. `cancel` is
/// optional; the default does nothing, modelling a source with no cancel
/// operation of its own.
///
/// # Object Safety
///
/// This trait is object-safe: you can use `Box<dyn PushSource>`.
pub trait PushSource: Send + Sync {
    /// Begin delivery into `outlet`. Called exactly once, before any
    /// `pause`/`resume`.
    fn start(&mut self, outlet: EventSender);

    /// Stop producing as soon as possible.
    fn pause(&mut self);

    /// Resume producing.
    fn resume(&mut self);

    /// Abandon the source, if it supports that.
    fn cancel(&mut self, reason: Option<String>) {
        let _ = reason;
    }
}

impl<T: PushSource + ?Sized> PushSource for Box<T> {
    fn start(&mut self, outlet: EventSender) {
        self.as_mut().start(outlet)
    }

    fn pause(&mut self) {
        self.as_mut().pause()
    }

    fn resume(&mut self) {
        self.as_mut().resume()
    }

    fn cancel(&mut self, reason: Option<String>) {
        self.as_mut().cancel(reason)
    }
}

/// The downstream half of a push stream.
///
/// [`accept`](PushSink::accept) returns `false` when the sink is
/// saturated; the driver stops pushing until the next solicited read.
/// Exactly one of [`end`](PushSink::end) or [`fail`](PushSink::fail)
/// terminates the stream.
pub trait PushSink: Send {
    /// Deliver a chunk. Returns `false` when the sink wants no more for now.
    fn accept(&mut self, chunk: Chunk) -> bool;

    /// The stream ended normally.
    fn end(&mut self);

    /// The stream failed.
    fn fail(&mut self, error: SourceError);
}
