//! Configuration types for rendering and image resolution.

use serde::{Deserialize, Serialize};

use super::geo::{LatLng, Point};

/// Configuration for the map renderer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapConfig {
    /// Pixel padding applied on each side when fitting bounds.
    ///
    /// Default: 50x50.
    pub fit_padding: Point,

    /// Height of the fixed search overlay at the top of the map container.
    ///
    /// Popups are kept below this line. Default: 72.
    pub overlay_height: f64,

    /// Minimum gap between an opened popup and the safe-area edges.
    ///
    /// Default: 16.
    pub popup_padding: f64,

    /// Camera center when the map is first created. Default: 20°N 0°E.
    pub initial_center: LatLng,

    /// Zoom used when the map is first created. Default: 2.
    pub initial_zoom: f64,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            fit_padding: Point::new(50.0, 50.0),
            overlay_height: 72.0,
            popup_padding: 16.0,
            initial_center: LatLng::new(20.0, 0.0),
            initial_zoom: 2.0,
        }
    }
}

impl MapConfig {
    /// Create a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the fit-bounds padding.
    pub fn with_fit_padding(mut self, x: f64, y: f64) -> Self {
        self.fit_padding = Point::new(x, y);
        self
    }

    /// Set the search overlay height.
    pub fn with_overlay_height(mut self, height: f64) -> Self {
        self.overlay_height = height;
        self
    }

    /// Set the popup safe-area padding.
    pub fn with_popup_padding(mut self, padding: f64) -> Self {
        self.popup_padding = padding;
        self
    }

    /// Set the camera view shown before the first fit.
    pub fn with_initial_view(mut self, center: LatLng, zoom: f64) -> Self {
        self.initial_center = center;
        self.initial_zoom = zoom;
        self
    }
}

/// Configuration for the Wikimedia Commons thumbnail resolver.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommonsConfig {
    /// MediaWiki API endpoint.
    pub api_url: String,

    /// Requested thumbnail width in pixels. Default: 640.
    pub thumbnail_width: u32,

    /// HTTP request timeout in seconds. Default: 30.
    pub timeout_secs: u64,

    /// User agent sent with every request (Wikimedia requires one).
    pub user_agent: String,
}

impl Default for CommonsConfig {
    fn default() -> Self {
        Self {
            api_url: "https://commons.wikimedia.org/w/api.php".to_string(),
            thumbnail_width: 640,
            timeout_secs: 30,
            user_agent: "HeritageMap/0.1".to_string(),
        }
    }
}

impl CommonsConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Point at a different API endpoint.
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    /// Set the thumbnail width.
    pub fn with_thumbnail_width(mut self, width: u32) -> Self {
        self.thumbnail_width = width;
        self
    }

    /// Set the request timeout.
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_config_builder() {
        let config = MapConfig::new()
            .with_fit_padding(20.0, 30.0)
            .with_overlay_height(96.0)
            .with_popup_padding(8.0);

        assert_eq!(config.fit_padding, Point::new(20.0, 30.0));
        assert_eq!(config.overlay_height, 96.0);
        assert_eq!(config.popup_padding, 8.0);
        assert_eq!(config.initial_center, LatLng::new(20.0, 0.0));
        assert_eq!(config.initial_zoom, 2.0);

        let config = config.with_initial_view(LatLng::new(48.0, 2.0), 5.0);
        assert_eq!(config.initial_center, LatLng::new(48.0, 2.0));
        assert_eq!(config.initial_zoom, 5.0);
    }

    #[test]
    fn test_commons_config_defaults() {
        let config = CommonsConfig::new().with_thumbnail_width(320);
        assert_eq!(config.thumbnail_width, 320);
        assert!(config.api_url.starts_with("https://commons.wikimedia.org"));
    }
}
