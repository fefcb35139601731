//! Image resolver trait for popup thumbnails.

use async_trait::async_trait;

use crate::error::SourceResult;

/// Most references resolved per popup.
pub const MAX_RESOLVE_BATCH: usize = 5;

/// Turns image references (URLs or Commons file titles) into displayable
/// thumbnail URLs.
#[async_trait]
pub trait ImageResolver: Send + Sync {
    /// Resolve up to [`MAX_RESOLVE_BATCH`] references in one batched lookup.
    ///
    /// Unresolvable entries are dropped, not padded, so the result may be
    /// shorter than the input. Order follows the input.
    async fn resolve(&self, references: &[String]) -> SourceResult<Vec<String>>;

    /// Get the resolver name (for logging/debugging).
    fn name(&self) -> &str {
        "unknown"
    }
}
