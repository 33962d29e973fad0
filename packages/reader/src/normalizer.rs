//! Source classification and the side tables that track source identity.
//!
//! Every input reaches the reader as one of three kinds - an existing
//! pull source, a push source, or a single in-memory value - expressed as
//! the [`Input`] tagged union. [`Normalizer::normalize`] flattens all
//! three into a [`NormalizedSource`]: a uniform pull source paired with a
//! stable [`SourceId`].
//!
//! The normalizer also owns two association tables keyed by that id:
//!
//! - the one-shot exhaustion registry, so wrapping the *same* single
//!   value a second time after it was consumed reports immediate
//!   termination instead of re-yielding the value;
//! - the residual-buffer table, which carries a released reader's
//!   leftover push-back buffer over to the next reader on the same
//!   source.
//!
//! Exhaustion entries are never removed. Residual entries are taken at
//! reader construction and written back at release.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, Weak};

use async_trait::async_trait;

use chunkstream_bridge::{PushSource, PushToPull};
use chunkstream_source::{Chunk, PullSource, Pulled, SourceError};

/// Stable identity token for a normalized source.
///
/// Identity, not equality: two single values with equal contents get
/// distinct ids, while re-wrapping one [`SingleValue`] handle reuses its
/// id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceId(u64);

/// A single in-memory value with a stable identity across wraps.
///
/// Cheap to clone; all clones share one identity. Wrapping a clone of an
/// already-exhausted handle yields a source that reports immediate
/// termination.
#[derive(Debug, Clone)]
pub struct SingleValue {
    inner: Arc<Chunk>,
}

impl SingleValue {
    /// Wrap a value.
    pub fn new(chunk: impl Into<Chunk>) -> Self {
        Self {
            inner: Arc::new(chunk.into()),
        }
    }

    /// The wrapped value.
    pub fn chunk(&self) -> &Chunk {
        &self.inner
    }

    fn address(&self) -> usize {
        Arc::as_ptr(&self.inner) as usize
    }
}

/// A classified input, one case per source kind.
///
/// Anything already in memory is a single value; there is no capability
/// probing anywhere downstream of this tag.
pub enum Input {
    /// A source the consumer pulls from.
    Pull(Box<dyn PullSource>),
    /// A source that delivers via events with pause/resume flow control.
    Push(Box<dyn PushSource>),
    /// One in-memory value, yielded exactly once across all wraps.
    Single(SingleValue),
}

impl From<SingleValue> for Input {
    fn from(value: SingleValue) -> Self {
        Input::Single(value)
    }
}

impl From<Chunk> for Input {
    fn from(chunk: Chunk) -> Self {
        Input::Single(SingleValue::new(chunk))
    }
}

/// A uniform pull source paired with its identity.
///
/// Returned by [`Normalizer::normalize`] and by
/// [`LookaheadReader::release_lock`](crate::LookaheadReader::release_lock);
/// the id survives release and reacquire, which is how a successor reader
/// finds the residual buffer.
pub struct NormalizedSource {
    pub(crate) id: SourceId,
    pub(crate) source: Box<dyn PullSource>,
}

impl NormalizedSource {
    /// The identity token of this source.
    pub fn id(&self) -> SourceId {
        self.id
    }

    /// Unwrap, discarding the identity.
    pub fn into_source(self) -> Box<dyn PullSource> {
        self.source
    }
}

type ExhaustedSet = Arc<Mutex<HashSet<SourceId>>>;

/// Classifies inputs and owns the identity-keyed side tables.
#[derive(Default)]
pub struct Normalizer {
    exhausted: ExhaustedSet,
    residual: HashMap<SourceId, Vec<Chunk>>,
    value_ids: HashMap<usize, (SourceId, Weak<Chunk>)>,
    next_id: u64,
}

impl Normalizer {
    /// Create an empty normalizer.
    pub fn new() -> Self {
        Self::default()
    }

    fn fresh_id(&mut self) -> SourceId {
        let id = SourceId(self.next_id);
        self.next_id += 1;
        id
    }

    /// The identity token for a single value, assigned on first sight.
    ///
    /// An entry only matches while the allocation it was assigned for is
    /// still alive: once every handle to a value drops, the allocator may
    /// hand its address to a brand-new value, and that value must get a
    /// fresh identity rather than inherit the old one's exhaustion mark.
    fn identity_of(&mut self, value: &SingleValue) -> SourceId {
        if let Some((id, recorded)) = self.value_ids.get(&value.address()) {
            // Two live allocations cannot share an address, so a live
            // recorded value at this address is this value.
            if recorded.upgrade().is_some() {
                return *id;
            }
        }
        let id = self.fresh_id();
        self.value_ids
            .insert(value.address(), (id, Arc::downgrade(&value.inner)));
        id
    }

    /// Flatten any input into a uniform pull source with an identity.
    ///
    /// Push sources go through the stream bridge first. Single values
    /// become one-shot sources that consult the exhaustion registry, so a
    /// second wrap of an already-consumed value terminates immediately.
    pub fn normalize(&mut self, input: Input) -> NormalizedSource {
        match input {
            Input::Pull(source) => NormalizedSource {
                id: self.fresh_id(),
                source,
            },
            Input::Push(source) => NormalizedSource {
                id: self.fresh_id(),
                source: Box::new(PushToPull::new(source)),
            },
            Input::Single(value) => {
                let id = self.identity_of(&value);
                let spent = self
                    .exhausted
                    .lock()
                    .map(|set| set.contains(&id))
                    .unwrap_or(false);
                // An empty value has nothing to yield either way.
                let remaining = if spent || value.chunk().is_empty() {
                    None
                } else {
                    Some(value.chunk().clone())
                };
                NormalizedSource {
                    id,
                    source: Box::new(OneShotSource {
                        id,
                        remaining,
                        consumed: false,
                        exhausted: Arc::clone(&self.exhausted),
                    }),
                }
            }
        }
    }

    /// Take the residual buffer recorded for a source, if any.
    pub(crate) fn take_residual(&mut self, id: SourceId) -> Option<Vec<Chunk>> {
        self.residual.remove(&id)
    }

    /// Record a released reader's leftover buffer for its successor.
    pub(crate) fn store_residual(&mut self, id: SourceId, chunks: Vec<Chunk>) {
        self.residual.insert(id, chunks);
    }
}

/// Pull source synthesized for a single value: yields it once, then done.
struct OneShotSource {
    id: SourceId,
    remaining: Option<Chunk>,
    consumed: bool,
    exhausted: ExhaustedSet,
}

#[async_trait]
impl PullSource for OneShotSource {
    async fn pull(&mut self) -> Result<Pulled, SourceError> {
        match self.remaining.take() {
            Some(chunk) => {
                self.consumed = true;
                Ok(Pulled::Chunk(chunk))
            }
            None => Ok(Pulled::Done),
        }
    }

    fn release(&mut self) {
        // Best-effort: release must never fail, so a poisoned registry
        // lock just loses the exhaustion record.
        if self.consumed {
            if let Ok(mut set) = self.exhausted.lock() {
                set.insert(self.id);
            }
        }
    }
}
