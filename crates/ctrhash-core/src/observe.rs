//! Mapping observers.
//!
//! An observer sees every (feature key → bucket) mapping computed while a
//! record is aggregated, in record order. Observers are for inspection only:
//! they receive the mapping after it has been computed and cannot change it.
//!
//! Any `Fn(&HashedPair) + Send + Sync` closure is an observer.
//!
//! ```
//! use ctrhash_core::observe::{MappingObserver, MappingRecorder};
//! use ctrhash_core::hasher::HashedPair;
//!
//! let recorder = MappingRecorder::new();
//! recorder.on_mapping(&HashedPair { index: 0, key: "a0".into(), bucket: 1 });
//! assert_eq!(recorder.take().len(), 1);
//! ```

use parking_lot::Mutex;
use tracing::debug;

use crate::hasher::HashedPair;

/// Receives each feature mapping as it is computed.
pub trait MappingObserver: Send + Sync {
    /// Called once per feature pair, in record order.
    fn on_mapping(&self, mapping: &HashedPair);
}

impl<F> MappingObserver for F
where
    F: Fn(&HashedPair) + Send + Sync,
{
    fn on_mapping(&self, mapping: &HashedPair) {
        self(mapping)
    }
}

/// Observer that discards every mapping.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl MappingObserver for NoopObserver {
    #[inline]
    fn on_mapping(&self, _mapping: &HashedPair) {}
}

/// Observer that emits each mapping as a `tracing` debug event.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl MappingObserver for TracingObserver {
    fn on_mapping(&self, mapping: &HashedPair) {
        debug!(
            index = mapping.index,
            key = %mapping.key,
            bucket = mapping.bucket,
            "feature mapping"
        );
    }
}

/// Observer that keeps every mapping it sees.
#[derive(Debug, Default)]
pub struct MappingRecorder {
    mappings: Mutex<Vec<HashedPair>>,
}

impl MappingRecorder {
    /// Creates an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of recorded mappings.
    pub fn len(&self) -> usize {
        self.mappings.lock().len()
    }

    /// Returns `true` if nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.mappings.lock().is_empty()
    }

    /// Removes and returns everything recorded so far.
    pub fn take(&self) -> Vec<HashedPair> {
        std::mem::take(&mut *self.mappings.lock())
    }
}

impl MappingObserver for MappingRecorder {
    fn on_mapping(&self, mapping: &HashedPair) {
        self.mappings.lock().push(mapping.clone());
    }
}
