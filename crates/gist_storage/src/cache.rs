use gist_core::{Clock, KeyedLocks, RecordingEntry, RecordingStorage, Result, SystemClock};
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, info};

/// How long a synthesized voiceover is served before it is regenerated.
pub const CACHE_TTL_SECS: i64 = 3600;

/// Request-keyed cache of synthesized voiceover references.
///
/// Lookups for the same signature are serialized for the whole
/// lookup, synthesize and upsert sequence, so concurrent requests for one
/// signature trigger at most one synthesis per validity window.
pub struct ArtifactCache {
    recordings: Arc<dyn RecordingStorage>,
    clock: Arc<dyn Clock>,
    locks: KeyedLocks,
}

impl ArtifactCache {
    pub fn new(recordings: Arc<dyn RecordingStorage>) -> Self {
        Self::with_clock(recordings, Arc::new(SystemClock))
    }

    pub fn with_clock(recordings: Arc<dyn RecordingStorage>, clock: Arc<dyn Clock>) -> Self {
        Self {
            recordings,
            clock,
            locks: KeyedLocks::new(),
        }
    }

    /// Return the cached reference for `signature` if it is younger than
    /// [`CACHE_TTL_SECS`], otherwise run `synthesize` and store its result.
    ///
    /// A failed synthesis leaves the stored entry as it was.
    pub async fn lookup_or_synthesize<F, Fut>(&self, signature: &str, synthesize: F) -> Result<String>
    where
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = Result<String>> + Send,
    {
        let _guard = self.locks.lock(signature).await;

        if let Some(entry) = self.recordings.get_recording(signature).await? {
            if entry.is_fresh(self.clock.now(), CACHE_TTL_SECS) {
                debug!("Using cached voiceover for {}", signature);
                return Ok(entry.reference);
            }
            debug!("Cached voiceover for {} is stale", signature);
        }

        let reference = synthesize().await?;
        let entry = RecordingEntry {
            signature: signature.to_string(),
            reference,
            generated_at: self.clock.now(),
        };
        self.recordings.upsert_recording(&entry).await?;
        info!("🔊 Cached new voiceover for {}", signature);

        Ok(entry.reference)
    }
}
