//! Testing utilities including mock implementations.
//!
//! These let applications exercise the loader, renderer and controller
//! without a network or a real map.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::error::{SourceError, SourceResult};
use crate::pipeline::normalize::build_search_text;
use crate::render::style::ClusterIcon;
use crate::traits::{
    images::ImageResolver,
    map::{ClusterIconFactory, ClusterId, MapWidget, MarkerId, MarkerSpec},
    source::SiteSource,
};
use crate::types::geo::{LatLng, LatLngBounds, Point, Rect, Size};
use crate::types::site::{Site, SiteType, DEFAULT_DESCRIPTION};

/// Build a site with sensible defaults for tests.
pub fn site_at(id: &str, lat: f64, lng: f64, year: i32, site_type: SiteType) -> Site {
    let name = format!("Site {}", id);
    let country = "Testland".to_string();
    Site {
        id: id.to_string(),
        search_text: build_search_text(&name, &country, DEFAULT_DESCRIPTION, site_type),
        name,
        countries: vec![country.clone()],
        country,
        latitude: lat,
        longitude: lng,
        inscription_year: year,
        site_type,
        criteria: vec![],
        description: DEFAULT_DESCRIPTION.to_string(),
        official_url: None,
        images: vec![],
    }
}

/// A mock site source returning a canned payload.
///
/// Can be told to fail a number of times before it starts succeeding, which
/// is how retry paths are tested.
#[derive(Default)]
pub struct MockSiteSource {
    payload: Arc<RwLock<Value>>,
    failures_left: Arc<RwLock<usize>>,
    calls: Arc<RwLock<usize>>,
}

impl MockSiteSource {
    /// Create a source with an empty `sites` payload.
    pub fn new() -> Self {
        Self::with_payload(json!({ "sites": [] }))
    }

    pub fn with_payload(payload: Value) -> Self {
        Self {
            payload: Arc::new(RwLock::new(payload)),
            ..Default::default()
        }
    }

    /// Wrap records in a `{ "sites": [...] }` document.
    pub fn with_sites(records: Vec<Value>) -> Self {
        Self::with_payload(json!({ "sites": records }))
    }

    /// Fail the next `count` fetches.
    pub fn failing(self, count: usize) -> Self {
        *self.failures_left.write().unwrap() = count;
        self
    }

    pub fn set_payload(&self, payload: Value) {
        *self.payload.write().unwrap() = payload;
    }

    /// Number of fetches made so far.
    pub fn calls(&self) -> usize {
        *self.calls.read().unwrap()
    }
}

#[async_trait]
impl SiteSource for MockSiteSource {
    async fn fetch(&self) -> SourceResult<Value> {
        *self.calls.write().unwrap() += 1;

        let mut failures = self.failures_left.write().unwrap();
        if *failures > 0 {
            *failures -= 1;
            return Err(SourceError::Status {
                status: 503,
                url: "mock://sites".to_string(),
            });
        }

        Ok(self.payload.read().unwrap().clone())
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// A mock image resolver.
///
/// By default every reference that already looks like a URL resolves to
/// itself and anything else is dropped.
#[derive(Default)]
pub struct MockImageResolver {
    mappings: Arc<RwLock<HashMap<String, String>>>,
    fail: Arc<RwLock<bool>>,
    calls: Arc<RwLock<Vec<Vec<String>>>>,
}

impl MockImageResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve `reference` to `url`.
    pub fn with_mapping(self, reference: impl Into<String>, url: impl Into<String>) -> Self {
        self.mappings
            .write()
            .unwrap()
            .insert(reference.into(), url.into());
        self
    }

    /// Make every call fail.
    pub fn failing(self) -> Self {
        *self.fail.write().unwrap() = true;
        self
    }

    /// Batches passed to `resolve`, in call order.
    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.read().unwrap().clone()
    }
}

#[async_trait]
impl ImageResolver for MockImageResolver {
    async fn resolve(&self, references: &[String]) -> SourceResult<Vec<String>> {
        self.calls.write().unwrap().push(references.to_vec());

        if *self.fail.read().unwrap() {
            return Err(SourceError::Decode("mock resolver failure".to_string()));
        }

        let mappings = self.mappings.read().unwrap();
        Ok(references
            .iter()
            .filter_map(|reference| {
                mappings.get(reference).cloned().or_else(|| {
                    reference
                        .starts_with("http")
                        .then(|| reference.clone())
                })
            })
            .collect())
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// In-memory map widget with an equirectangular projection.
///
/// Every camera and marker call is recorded in public fields so tests can
/// assert on them directly.
#[derive(Debug)]
pub struct MockMapWidget {
    pub size: Size,
    pub center: LatLng,
    pub zoom: f64,
    pub markers: Vec<(MarkerId, MarkerSpec)>,
    pub popup_content: HashMap<MarkerId, String>,
    pub fits: Vec<(LatLngBounds, Point)>,
    pub flights: Vec<(LatLng, f64)>,
    pub spiderfied: Vec<ClusterId>,
    pub clears: usize,
    pub cluster_icon_factory: Option<ClusterIconFactory>,
    popup_rects: HashMap<MarkerId, Rect>,
    clusters: HashMap<MarkerId, ClusterId>,
    next_id: u64,
}

impl MockMapWidget {
    pub fn new(size: Size) -> Self {
        Self {
            size,
            center: LatLng::new(20.0, 0.0),
            zoom: 2.0,
            markers: Vec::new(),
            popup_content: HashMap::new(),
            fits: Vec::new(),
            flights: Vec::new(),
            spiderfied: Vec::new(),
            clears: 0,
            cluster_icon_factory: None,
            popup_rects: HashMap::new(),
            clusters: HashMap::new(),
            next_id: 1,
        }
    }

    /// Pin the container-space rectangle reported for a marker's popup.
    pub fn set_popup_rect(&mut self, marker: MarkerId, rect: Rect) {
        self.popup_rects.insert(marker, rect);
    }

    /// Report `marker` as a child of the exploded `cluster`.
    pub fn set_spiderfied_cluster(&mut self, marker: MarkerId, cluster: ClusterId) {
        self.clusters.insert(marker, cluster);
    }

    pub fn marker(&self, id: MarkerId) -> Option<&MarkerSpec> {
        self.markers
            .iter()
            .find(|(marker_id, _)| *marker_id == id)
            .map(|(_, spec)| spec)
    }

    /// Icon the installed factory draws for a cluster of these markers.
    ///
    /// `None` when no factory is installed. Unknown markers are skipped.
    pub fn cluster_icon(&self, members: &[MarkerId]) -> Option<ClusterIcon> {
        let factory = self.cluster_icon_factory?;
        let categories: Vec<SiteType> = members
            .iter()
            .filter_map(|id| self.marker(*id))
            .map(|spec| spec.category)
            .collect();
        Some(factory(&categories))
    }

    fn pixels_per_degree(&self) -> f64 {
        256.0 * 2f64.powf(self.zoom) / 360.0
    }
}

impl MapWidget for MockMapWidget {
    fn clear_markers(&mut self) {
        self.markers.clear();
        self.popup_content.clear();
        self.clears += 1;
    }

    fn set_cluster_icon_factory(&mut self, factory: ClusterIconFactory) {
        self.cluster_icon_factory = Some(factory);
    }

    fn add_marker(&mut self, marker: MarkerSpec) -> MarkerId {
        let id = MarkerId(self.next_id);
        self.next_id += 1;
        self.popup_content.insert(id, marker.popup_html.clone());
        self.markers.push((id, marker));
        id
    }

    fn set_popup_content(&mut self, marker: MarkerId, html: &str) {
        self.popup_content.insert(marker, html.to_string());
    }

    fn fit_bounds(&mut self, bounds: LatLngBounds, padding: Point) {
        self.center = bounds.center();
        self.fits.push((bounds, padding));
    }

    fn set_view(&mut self, center: LatLng, zoom: f64) {
        self.center = center;
        self.zoom = zoom;
    }

    fn fly_to(&mut self, center: LatLng, zoom: f64) {
        self.center = center;
        self.zoom = zoom;
        self.flights.push((center, zoom));
    }

    fn zoom(&self) -> f64 {
        self.zoom
    }

    fn container_size(&self) -> Size {
        self.size
    }

    fn lat_lng_to_container_point(&self, position: LatLng) -> Point {
        let scale = self.pixels_per_degree();
        let origin = self.size.center();
        Point::new(
            origin.x + (position.lng - self.center.lng) * scale,
            origin.y - (position.lat - self.center.lat) * scale,
        )
    }

    fn container_point_to_lat_lng(&self, point: Point) -> LatLng {
        let scale = self.pixels_per_degree();
        let origin = self.size.center();
        LatLng::new(
            self.center.lat - (point.y - origin.y) / scale,
            self.center.lng + (point.x - origin.x) / scale,
        )
    }

    fn popup_rect(&self, marker: MarkerId) -> Option<Rect> {
        self.popup_rects.get(&marker).copied()
    }

    fn spiderfied_cluster(&self, marker: MarkerId) -> Option<ClusterId> {
        self.clusters.get(&marker).copied()
    }

    fn spiderfy(&mut self, cluster: ClusterId) {
        self.spiderfied.push(cluster);
    }
}
