//! Popup thumbnail loading with a per-site cache.

use std::collections::HashMap;

use tracing::{debug, warn};

use super::popup::ImagePanel;
use crate::traits::images::{ImageResolver, MAX_RESOLVE_BATCH};
use crate::types::site::Site;

/// Resolved thumbnail URLs keyed by site id.
///
/// Entries are written when a lookup completes and never replaced, so the
/// first completed lookup for a site wins. Empty lists are cached too.
#[derive(Debug, Default)]
pub struct ImageCache {
    entries: HashMap<String, Vec<String>>,
}

impl ImageCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, site_id: &str) -> Option<&[String]> {
        self.entries.get(site_id).map(Vec::as_slice)
    }

    /// Store `urls` unless the site already has an entry. Returns the entry.
    pub fn insert(&mut self, site_id: &str, urls: Vec<String>) -> &[String] {
        self.entries.entry(site_id.to_string()).or_insert(urls)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Panel to show immediately when a popup opens: `None` means a lookup is
/// needed and the popup starts in the loading state.
pub fn cached_panel(cache: &ImageCache, site: &Site) -> Option<ImagePanel> {
    if !site.has_images() {
        return Some(ImagePanel::Empty);
    }
    cache
        .get(&site.id)
        .map(|urls| ImagePanel::from_urls(urls.to_vec()))
}

/// Resolve the site's references and record the result.
///
/// A resolver failure is logged and shown as the placeholder; it is not
/// cached, so a later open tries again.
pub async fn load_panel<R>(resolver: &R, cache: &mut ImageCache, site: &Site) -> ImagePanel
where
    R: ImageResolver + ?Sized,
{
    if let Some(panel) = cached_panel(cache, site) {
        return panel;
    }

    let references: Vec<String> = site.images.iter().take(MAX_RESOLVE_BATCH).cloned().collect();
    match resolver.resolve(&references).await {
        Ok(urls) => {
            debug!(
                site_id = %site.id,
                resolver = resolver.name(),
                requested = references.len(),
                resolved = urls.len(),
                "resolved popup images"
            );
            let urls = cache.insert(&site.id, urls).to_vec();
            ImagePanel::from_urls(urls)
        }
        Err(e) => {
            warn!(
                site_id = %site.id,
                resolver = resolver.name(),
                error = %e,
                "failed to resolve popup images"
            );
            ImagePanel::Empty
        }
    }
}
