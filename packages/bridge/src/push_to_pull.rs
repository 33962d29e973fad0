//! Adapter: push source → pull source.
//!
//! Wraps a [`PushSource`] as a [`PullSource`]. The underlying source is
//! paused immediately after start and again after every delivered event;
//! only an explicit `pull()` with nothing already queued resumes it, so
//! data is never produced faster than the consumer drains it.

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::{debug, trace};

use chunkstream_source::{PullSource, Pulled, SourceError};

use crate::push::{EventSender, PushEvent, PushSource};

/// Pull-based view over a push source.
///
/// Events that arrive while the adapter is not being pulled (pause is
/// advisory) queue in the event channel and are drained before the source
/// is ever resumed again.
///
/// # Example
///
/// ```rust,ignore
/// use chunkstream_bridge::PushToPull;
/// use chunkstream_source::{Pulled, PullSource};
///
/// let mut source = PushToPull::new(Box::new(my_push_source));
/// while let Pulled::Chunk(chunk) = source.pull().await? {
///     consume(chunk);
/// }
/// ```
pub struct PushToPull {
    source: Box<dyn PushSource>,
    events: mpsc::UnboundedReceiver<PushEvent>,
    done: bool,
    cancelled: bool,
}

impl PushToPull {
    /// Start the push source and wrap it. The source is paused until the
    /// first pull.
    pub fn new(mut source: Box<dyn PushSource>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        source.start(EventSender::new(tx));
        source.pause();
        trace!("push source started paused");
        Self {
            source,
            events: rx,
            done: false,
            cancelled: false,
        }
    }

    fn settle(&mut self, event: PushEvent) -> Result<Pulled, SourceError> {
        match event {
            PushEvent::Data(chunk) => Ok(Pulled::Chunk(chunk)),
            PushEvent::End => {
                self.done = true;
                Ok(Pulled::Done)
            }
            PushEvent::Error(error) => {
                // Terminal: the failed pull is the last one that can fail.
                self.done = true;
                Err(error)
            }
        }
    }
}

#[async_trait]
impl PullSource for PushToPull {
    async fn pull(&mut self) -> Result<Pulled, SourceError> {
        if self.done {
            return Ok(Pulled::Done);
        }

        // Drain anything that arrived while paused before resuming.
        match self.events.try_recv() {
            Ok(event) => return self.settle(event),
            Err(mpsc::error::TryRecvError::Disconnected) => {
                self.done = true;
                return Ok(Pulled::Done);
            }
            Err(mpsc::error::TryRecvError::Empty) => {}
        }

        self.source.resume();
        let event = self.events.recv().await;
        self.source.pause();

        match event {
            Some(event) => self.settle(event),
            // Producer dropped its outlet without signalling end.
            None => {
                self.done = true;
                Ok(Pulled::Done)
            }
        }
    }

    fn release(&mut self) {
        self.source.pause();
    }

    async fn cancel(&mut self, reason: Option<String>) {
        if self.cancelled {
            return;
        }
        self.cancelled = true;
        self.done = true;
        debug!(reason = ?reason, "cancelling push source");
        self.source.pause();
        self.source.cancel(reason);
    }
}
