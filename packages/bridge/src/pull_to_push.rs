//! Adapter: pull source → push stream.
//!
//! Wraps a [`PullSource`] as a push-based stream with read-ahead. Each
//! solicited read enters a drain loop that keeps pulling and pushing
//! downstream until the sink saturates, the source terminates, or a
//! cancellation is requested.

use tracing::{debug, trace};

use chunkstream_source::{PullSource, Pulled};

use crate::cancel::CancelSignal;
use crate::push::PushSink;

/// Where the driver currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriveState {
    /// Not driving; the next solicited read starts a drain.
    Idle,
    /// A drain loop is in flight.
    Draining,
    /// Cancellation requested; waiting for the in-flight drain to settle.
    Cancelling,
    /// Terminated; no further reads will be driven.
    Closed,
}

/// Push-based view over a pull source.
///
/// [`drive`](PullToPush::drive) is the solicited read: call it whenever
/// the downstream side is ready for more. Termination from the pull side
/// becomes [`PushSink::end`]; a pull failure becomes [`PushSink::fail`]
/// and is never propagated synchronously.
pub struct PullToPush {
    source: Box<dyn PullSource>,
    state: DriveState,
    cancel: CancelSignal,
}

impl PullToPush {
    /// Wrap a pull source.
    pub fn new(source: Box<dyn PullSource>) -> Self {
        Self {
            source,
            state: DriveState::Idle,
            cancel: CancelSignal::new(),
        }
    }

    /// Current drive state.
    pub fn state(&self) -> DriveState {
        self.state
    }

    /// A handle that can request cancellation from elsewhere.
    ///
    /// Requesting it stops the drain loop at its next iteration; call
    /// [`cancel`](PullToPush::cancel) to also release and cancel the
    /// underlying source.
    pub fn cancel_signal(&self) -> CancelSignal {
        self.cancel.clone()
    }

    /// Drive the drain loop until the sink saturates, the source ends or
    /// fails, or cancellation is requested.
    pub async fn drive(&mut self, sink: &mut dyn PushSink) {
        if self.state != DriveState::Idle {
            return;
        }
        self.state = DriveState::Draining;
        trace!("drain started");

        loop {
            if self.cancel.is_requested() {
                // cancel() finishes the teardown.
                self.state = DriveState::Idle;
                return;
            }
            match self.source.pull().await {
                Ok(Pulled::Chunk(chunk)) => {
                    if !sink.accept(chunk) {
                        trace!("sink saturated, drain paused");
                        self.state = DriveState::Idle;
                        return;
                    }
                }
                Ok(Pulled::Done) => {
                    sink.end();
                    self.source.release();
                    self.state = DriveState::Closed;
                    return;
                }
                Err(error) => {
                    debug!(error = %error, "drain failed");
                    sink.fail(error);
                    self.source.release();
                    self.state = DriveState::Closed;
                    return;
                }
            }
        }
    }

    /// Cancel the stream: stop driving, release the pull source's handle,
    /// and forward the cancellation to it. Idempotent.
    pub async fn cancel(&mut self, reason: Option<String>) {
        if matches!(self.state, DriveState::Cancelling | DriveState::Closed) {
            return;
        }
        self.cancel.request();
        // Holding &mut self guarantees no drain loop is in flight; the
        // signal covers external requesters observed mid-drain.
        self.state = DriveState::Cancelling;
        debug!(reason = ?reason, "cancelling pull source");
        self.source.release();
        self.source.cancel(reason).await;
        self.state = DriveState::Closed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use async_trait::async_trait;
    use chunkstream_source::{Chunk, SourceError};

    struct ScriptedSource {
        script: VecDeque<Result<Pulled, SourceError>>,
        releases: Arc<AtomicUsize>,
        cancels: Arc<AtomicUsize>,
    }

    impl ScriptedSource {
        fn new(script: impl IntoIterator<Item = Result<Pulled, SourceError>>) -> Self {
            Self {
                script: script.into_iter().collect(),
                releases: Arc::new(AtomicUsize::new(0)),
                cancels: Arc::new(AtomicUsize::new(0)),
            }
        }

        fn of_chunks(chunks: impl IntoIterator<Item = Chunk>) -> Self {
            Self::new(
                chunks
                    .into_iter()
                    .map(|c| Ok(Pulled::Chunk(c)))
                    .collect::<Vec<_>>(),
            )
        }
    }

    #[async_trait]
    impl PullSource for ScriptedSource {
        async fn pull(&mut self) -> Result<Pulled, SourceError> {
            self.script.pop_front().unwrap_or(Ok(Pulled::Done))
        }

        fn release(&mut self) {
            self.releases.fetch_add(1, Ordering::SeqCst);
        }

        async fn cancel(&mut self, _reason: Option<String>) {
            self.cancels.fetch_add(1, Ordering::SeqCst);
        }
    }

    /// Collecting sink that saturates after `capacity` chunks per drive.
    struct VecSink {
        accepted: Vec<Chunk>,
        room: usize,
        ended: bool,
        failed: Option<SourceError>,
    }

    impl VecSink {
        fn with_room(room: usize) -> Self {
            Self {
                accepted: Vec::new(),
                room,
                ended: false,
                failed: None,
            }
        }
    }

    impl PushSink for VecSink {
        fn accept(&mut self, chunk: Chunk) -> bool {
            self.accepted.push(chunk);
            self.room -= 1;
            self.room > 0
        }

        fn end(&mut self) {
            self.ended = true;
        }

        fn fail(&mut self, error: SourceError) {
            self.failed = Some(error);
        }
    }

    fn chunks(texts: &[&str]) -> Vec<Chunk> {
        texts.iter().map(|t| Chunk::text(*t)).collect()
    }

    #[tokio::test]
    async fn drains_to_end() {
        let source = ScriptedSource::of_chunks(chunks(&["a", "b", "c"]));
        let releases = source.releases.clone();
        let mut adapter = PullToPush::new(Box::new(source));
        let mut sink = VecSink::with_room(10);

        adapter.drive(&mut sink).await;

        assert_eq!(sink.accepted, chunks(&["a", "b", "c"]));
        assert!(sink.ended);
        assert_eq!(adapter.state(), DriveState::Closed);
        assert_eq!(releases.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn saturation_pauses_until_next_drive() {
        let source = ScriptedSource::of_chunks(chunks(&["a", "b", "c", "d"]));
        let mut adapter = PullToPush::new(Box::new(source));
        let mut sink = VecSink::with_room(2);

        adapter.drive(&mut sink).await;
        assert_eq!(sink.accepted, chunks(&["a", "b"]));
        assert!(!sink.ended);
        assert_eq!(adapter.state(), DriveState::Idle);

        // Next solicited read resumes driving.
        sink.room = 10;
        adapter.drive(&mut sink).await;
        assert_eq!(sink.accepted, chunks(&["a", "b", "c", "d"]));
        assert!(sink.ended);
        assert_eq!(adapter.state(), DriveState::Closed);
    }

    #[tokio::test]
    async fn pull_failure_becomes_sink_error() {
        let source = ScriptedSource::new([
            Ok(Pulled::Chunk(Chunk::text("a"))),
            Err(SourceError::Cancelled { reason: None }),
        ]);
        let mut adapter = PullToPush::new(Box::new(source));
        let mut sink = VecSink::with_room(10);

        adapter.drive(&mut sink).await;

        assert_eq!(sink.accepted, chunks(&["a"]));
        assert!(sink.failed.is_some());
        assert!(!sink.ended);
        assert_eq!(adapter.state(), DriveState::Closed);
    }

    #[tokio::test]
    async fn cancel_releases_and_forwards_once() {
        let source = ScriptedSource::of_chunks(chunks(&["a"]));
        let releases = source.releases.clone();
        let cancels = source.cancels.clone();
        let mut adapter = PullToPush::new(Box::new(source));

        adapter.cancel(Some("done with this".to_string())).await;
        adapter.cancel(None).await;

        assert_eq!(adapter.state(), DriveState::Closed);
        assert_eq!(releases.load(Ordering::SeqCst), 1);
        assert_eq!(cancels.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn drive_after_cancel_is_a_no_op() {
        let source = ScriptedSource::of_chunks(chunks(&["a"]));
        let mut adapter = PullToPush::new(Box::new(source));
        let mut sink = VecSink::with_room(10);

        adapter.cancel(None).await;
        adapter.drive(&mut sink).await;

        assert!(sink.accepted.is_empty());
        assert!(!sink.ended);
    }

    #[tokio::test]
    async fn external_signal_stops_the_drain() {
        let source = ScriptedSource::of_chunks(chunks(&["a", "b"]));
        let mut adapter = PullToPush::new(Box::new(source));
        let mut sink = VecSink::with_room(10);

        adapter.cancel_signal().request();
        adapter.drive(&mut sink).await;

        // The loop observed the signal before pulling anything.
        assert!(sink.accepted.is_empty());
        assert_eq!(adapter.state(), DriveState::Idle);

        // Completing the cancellation closes the adapter.
        adapter.cancel(None).await;
        assert_eq!(adapter.state(), DriveState::Closed);
    }
}
