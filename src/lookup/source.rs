//! The caller-supplied suggestion source and a demo implementation.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use super::{LookupParams, LookupReply, Tag};

/// An asynchronous suggestion lookup.
///
/// Implementors receive the current query and resolve to a [`LookupReply`].
/// Failures are reported as strings; the widget resets the suggestion panel
/// and logs them, it does not retry.
pub trait SuggestionSource: Send + Sync {
    /// Start a lookup for the given params.
    fn fetch(
        &self,
        params: LookupParams,
    ) -> Pin<Box<dyn Future<Output = Result<LookupReply, String>> + Send>>;
}

/// In-memory source used by the demo binary and tests.
///
/// Filters a fixed tag list by case-insensitive substring match on the
/// keywords, optionally sleeping first to imitate network latency.
#[derive(Debug, Clone)]
pub struct StaticSource {
    tags: Vec<Tag>,
    latency: Duration,
}

impl StaticSource {
    /// Create a source over the given tags with no artificial latency.
    pub fn new(tags: Vec<Tag>) -> Self {
        Self {
            tags,
            latency: Duration::ZERO,
        }
    }

    /// Set an artificial delay before each reply resolves.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }
}

impl SuggestionSource for StaticSource {
    fn fetch(
        &self,
        params: LookupParams,
    ) -> Pin<Box<dyn Future<Output = Result<LookupReply, String>> + Send>> {
        let latency = self.latency;
        let needle = params.keywords.to_lowercase();
        let items: Vec<Tag> = self
            .tags
            .iter()
            .filter(|t| needle.is_empty() || t.label.to_lowercase().contains(&needle))
            .cloned()
            .collect();
        Box::pin(async move {
            if latency > Duration::ZERO {
                tokio::time::sleep(latency).await;
            }
            Ok(LookupReply::Items(items))
        })
    }
}
