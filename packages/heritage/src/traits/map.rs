//! Map widget trait - the rendering collaborator.
//!
//! The renderer never talks to a concrete mapping library. Whatever hosts the
//! map (a browser binding, a test double) implements [`MapWidget`] and feeds
//! user interaction back as [`MapEvent`]s.

use serde::{Deserialize, Serialize};

use crate::render::style::ClusterIcon;
use crate::types::geo::{LatLng, LatLngBounds, Point, Rect, Size};
use crate::types::site::SiteType;

/// Builds a cluster's icon from the categories of its child markers.
pub type ClusterIconFactory = fn(&[SiteType]) -> ClusterIcon;

/// Handle for a marker added to the widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MarkerId(pub u64);

/// Handle for a visual cluster owned by the widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClusterId(pub u64);

/// Everything the widget needs to draw one site marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerSpec {
    pub site_id: String,
    pub position: LatLng,
    pub category: SiteType,
    /// Icon HTML (colored pin with category glyph)
    pub icon_html: String,
    /// Hover tooltip HTML
    pub tooltip_html: String,
    /// Popup HTML bound to the marker
    pub popup_html: String,
}

/// Interaction reported by the widget.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum MapEvent {
    MoveStart,
    ZoomStart,
    MoveEnd,
    MarkerOver(MarkerId),
    MarkerOut(MarkerId),
    PopupClosed(MarkerId),
}

/// Primitives the renderer drives.
pub trait MapWidget {
    /// Remove every marker (and cluster) from the map.
    fn clear_markers(&mut self);

    /// Install the icon factory the clustering layer calls for every
    /// cluster it draws.
    fn set_cluster_icon_factory(&mut self, factory: ClusterIconFactory);

    /// Add a marker; clustering is the widget's concern.
    fn add_marker(&mut self, marker: MarkerSpec) -> MarkerId;

    /// Replace the HTML of the marker's popup.
    fn set_popup_content(&mut self, marker: MarkerId, html: &str);

    /// Frame the bounds, keeping `padding` pixels free on each side.
    fn fit_bounds(&mut self, bounds: LatLngBounds, padding: Point);

    /// Jump to a center and zoom without animating.
    fn set_view(&mut self, center: LatLng, zoom: f64);

    /// Animate the camera to a center and zoom.
    fn fly_to(&mut self, center: LatLng, zoom: f64);

    fn zoom(&self) -> f64;

    fn container_size(&self) -> Size;

    fn lat_lng_to_container_point(&self, position: LatLng) -> Point;

    fn container_point_to_lat_lng(&self, point: Point) -> LatLng;

    /// Bounding box of the marker's open popup in container space.
    fn popup_rect(&self, marker: MarkerId) -> Option<Rect>;

    /// The exploded cluster the marker currently belongs to, if any.
    fn spiderfied_cluster(&self, marker: MarkerId) -> Option<ClusterId>;

    /// Explode a cluster into its markers.
    fn spiderfy(&mut self, cluster: ClusterId);
}
