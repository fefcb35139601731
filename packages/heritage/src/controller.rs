//! Application controller - the state behind the map page.
//!
//! [`HeritageApp`] owns the loaded site set, the filter state and the
//! renderer. Every UI action is a method; each filter change re-runs the
//! filter engine and re-renders.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::error::Result;
use crate::pipeline::{
    bubble_label, count_inscribed_in, current_year, filter_sites, normalize_sites, parse_payload,
    summary_label, total_label, CategoryCounts, SearchTerms, YearRange,
};
use crate::render::{MapRenderer, RenderReason};
use crate::traits::{
    images::ImageResolver,
    map::{MapEvent, MapWidget, MarkerId},
    source::SiteSource,
};
use crate::types::config::MapConfig;
use crate::types::filter::{FilterCriteria, TypeFilter};
use crate::types::site::Site;

/// Message shown when the dataset cannot be loaded.
pub const LOAD_ERROR_MESSAGE: &str =
    "Unable to load data from Wikidata at the moment. Please try again later.";

/// Fetch, parse and normalize the full site set.
pub async fn load_sites<S>(source: &S) -> Result<Vec<Arc<Site>>>
where
    S: SiteSource + ?Sized,
{
    let payload = source.fetch().await?;
    let records = parse_payload(&payload)?;
    Ok(normalize_sites(&records).into_iter().map(Arc::new).collect())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum LoadState {
    Loading,
    Ready,
    Failed { message: String },
}

pub struct HeritageApp<S, R, W>
where
    S: SiteSource,
    R: ImageResolver,
    W: MapWidget,
{
    source: S,
    resolver: R,
    renderer: MapRenderer<W>,
    state: LoadState,
    sites: Vec<Arc<Site>>,
    filtered: Vec<Arc<Site>>,
    criteria: FilterCriteria,
    search: SearchTerms,
    year_range: YearRange,
    controls_collapsed: bool,
}

impl<S, R, W> HeritageApp<S, R, W>
where
    S: SiteSource,
    R: ImageResolver,
    W: MapWidget,
{
    pub fn new(source: S, resolver: R, widget: W, config: MapConfig) -> Self {
        let year_range = YearRange::default();
        Self {
            source,
            resolver,
            renderer: MapRenderer::new(widget, config),
            state: LoadState::Loading,
            sites: Vec::new(),
            filtered: Vec::new(),
            criteria: FilterCriteria::up_to(year_range.clamp(current_year())),
            search: SearchTerms::new(),
            year_range,
            controls_collapsed: true,
        }
    }

    /// Load the dataset, replacing any previous one.
    ///
    /// Failure leaves the previous sites in place and moves to
    /// [`LoadState::Failed`]; call [`retry`](Self::retry) to try again.
    pub async fn load(&mut self) -> &LoadState {
        self.state = LoadState::Loading;

        match load_sites(&self.source).await {
            Ok(sites) => {
                info!(
                    source = self.source.name(),
                    sites = sites.len(),
                    "site data loaded"
                );
                if let Some((range, selected)) = YearRange::from_sites(&sites) {
                    self.year_range = range;
                    self.criteria.selected_year = selected;
                }
                self.sites = sites;
                self.state = LoadState::Ready;
                self.refresh(RenderReason::FreshFetch);
            }
            Err(e) => {
                error!(source = self.source.name(), error = %e, "failed to load site data");
                self.state = LoadState::Failed {
                    message: LOAD_ERROR_MESSAGE.to_string(),
                };
            }
        }

        &self.state
    }

    pub async fn retry(&mut self) -> &LoadState {
        info!("retrying site data load");
        self.load().await
    }

    /// Move the year slider. The value is clamped to the slider range.
    pub fn set_year(&mut self, year: i32) -> i32 {
        let year = self.year_range.clamp(year);
        self.criteria.selected_year = year;
        self.refresh(RenderReason::Filter);
        year
    }

    pub fn set_type(&mut self, selected: TypeFilter) {
        self.criteria.selected_type = selected;
        self.refresh(RenderReason::Filter);
    }

    /// Text typed into the search box.
    ///
    /// Comma-terminated tokens become terms; the returned remainder is what
    /// stays in the input.
    pub fn add_search_input(&mut self, input: &str) -> String {
        let before = self.search.len();
        let remainder = self.search.add_input(input).to_string();
        if self.search.len() != before {
            self.refresh_terms();
        }
        remainder
    }

    /// Explicit submit of the search box. Returns the number of new terms.
    pub fn submit_search(&mut self, input: &str) -> usize {
        let added = self.search.submit(input);
        if added > 0 {
            self.refresh_terms();
        }
        added
    }

    pub fn remove_search_term(&mut self, term: &str) -> bool {
        let removed = self.search.remove(term);
        if removed {
            self.refresh_terms();
        }
        removed
    }

    pub fn clear_search(&mut self) {
        if !self.search.is_empty() {
            self.search.clear();
            self.refresh_terms();
        }
    }

    /// Collapse or expand the filter panel. Returns the new collapsed flag.
    pub fn toggle_controls(&mut self) -> bool {
        self.controls_collapsed = !self.controls_collapsed;
        self.controls_collapsed
    }

    pub fn handle_map_event(&mut self, event: MapEvent) {
        self.renderer.handle_event(event);
    }

    pub async fn open_popup(&mut self, marker: MarkerId) -> bool {
        self.renderer.open_popup(marker, &self.resolver).await
    }

    pub fn close_popup(&mut self) {
        self.renderer.close_popup();
    }

    pub fn select_slide(&mut self, index: usize) -> bool {
        self.renderer.select_slide(index)
    }

    pub fn mark_slide_broken(&mut self, index: usize) -> bool {
        self.renderer.mark_slide_broken(index)
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    pub fn sites(&self) -> &[Arc<Site>] {
        &self.sites
    }

    pub fn filtered_sites(&self) -> &[Arc<Site>] {
        &self.filtered
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn search_terms(&self) -> &[String] {
        self.search.as_slice()
    }

    pub fn year_range(&self) -> YearRange {
        self.year_range
    }

    pub fn controls_collapsed(&self) -> bool {
        self.controls_collapsed
    }

    pub fn renderer(&self) -> &MapRenderer<W> {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut MapRenderer<W> {
        &mut self.renderer
    }

    /// Per-category counts for the category buttons.
    pub fn category_counts(&self) -> CategoryCounts {
        CategoryCounts::up_to(&self.sites, self.criteria.selected_year)
    }

    pub fn summary_label(&self) -> String {
        summary_label(
            self.filtered.len(),
            self.criteria.selected_year,
            current_year(),
        )
    }

    pub fn bubble_label(&self) -> String {
        let year = self.criteria.selected_year;
        bubble_label(
            year,
            count_inscribed_in(&self.sites, year, self.criteria.selected_type),
        )
    }

    pub fn total_label(&self) -> String {
        total_label(self.sites.len())
    }

    fn refresh_terms(&mut self) {
        self.criteria.search_terms = self.search.as_slice().to_vec();
        self.refresh(RenderReason::Filter);
    }

    fn refresh(&mut self, reason: RenderReason) {
        self.filtered = filter_sites(&self.sites, &self.criteria);
        self.renderer.render(&self.filtered, reason);
    }
}
