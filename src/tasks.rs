//! Async task management for suggestion lookups.
//!
//! Lookups run in background tasks so the UI stays responsive. The main loop
//! polls the channel with `try_recv()` each tick and feeds completions back
//! into the suggestion list, which discards anything stale.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::lookup::{LookupParams, SuggestionSource, Tag};

/// Messages sent from background lookup tasks to the main event loop.
#[derive(Debug)]
pub enum LookupMessage {
    /// A lookup finished, successfully or not.
    Completed {
        /// Id assigned when the lookup was issued; used for staleness checks.
        request_id: u64,
        /// The resolved suggestions, or the failure message.
        result: Result<Vec<Tag>, String>,
    },
}

/// Spawns background lookup tasks against the configured source.
#[derive(Clone)]
pub struct LookupSpawner {
    tx: mpsc::UnboundedSender<LookupMessage>,
    source: Arc<dyn SuggestionSource>,
}

impl LookupSpawner {
    /// Create a spawner sending completions through the given channel.
    pub fn new(tx: mpsc::UnboundedSender<LookupMessage>, source: Arc<dyn SuggestionSource>) -> Self {
        Self { tx, source }
    }

    /// Spawn a lookup for `params`, tagged with `request_id`.
    pub fn spawn_lookup(&self, request_id: u64, params: LookupParams) {
        let tx = self.tx.clone();
        let future = self.source.fetch(params);
        tokio::spawn(async move {
            let result = future.await.map(|reply| reply.into_items());
            let _ = tx.send(LookupMessage::Completed { request_id, result });
        });
    }
}

/// Create a new lookup channel and spawner for the given source.
///
/// The receiver should be polled in the main event loop.
pub fn create_lookup_channel(
    source: Arc<dyn SuggestionSource>,
) -> (mpsc::UnboundedReceiver<LookupMessage>, LookupSpawner) {
    let (tx, rx) = mpsc::unbounded_channel();
    (rx, LookupSpawner::new(tx, source))
}
