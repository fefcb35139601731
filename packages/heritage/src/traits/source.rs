//! Site source trait for fetching the raw site payload.
//!
//! A source returns the top-level JSON document untouched; shape detection
//! and normalization happen in [`crate::pipeline`].

use async_trait::async_trait;
use serde_json::Value;

use crate::error::SourceResult;

/// Remote source of raw site records.
///
/// Implementations:
/// - `HttpSiteSource` - GET, or POST with a JSON query body
/// - `MockSiteSource` - canned payloads for tests
#[async_trait]
pub trait SiteSource: Send + Sync {
    /// Fetch the raw top-level document.
    ///
    /// Either `{ "sites": [...] }` or `{ "results": { "bindings": [...] } }`
    /// is expected, but the source does not check.
    async fn fetch(&self) -> SourceResult<Value>;

    /// Get the source name (for logging/debugging).
    fn name(&self) -> &str {
        "unknown"
    }
}
