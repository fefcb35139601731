//! World Heritage Site Map Core
//!
//! Loads UNESCO World Heritage Site records from a remote JSON source,
//! normalizes them into one canonical [`Site`] shape, filters them by year,
//! category and search terms, and drives an abstract map widget.
//!
//! # Usage
//!
//! ```rust,ignore
//! use heritage::{HeritageApp, HttpSiteSource, CommonsImageResolver, CommonsConfig, MapConfig};
//!
//! let source = HttpSiteSource::new("https://example.org/sites.json")?;
//! let resolver = CommonsImageResolver::new(CommonsConfig::default())?;
//! let mut app = HeritageApp::new(source, resolver, widget, MapConfig::default());
//!
//! app.load().await;
//! app.set_year(1990);
//! app.submit_search("italy");
//! println!("{}", app.summary_label());
//! ```
//!
//! # Modules
//!
//! - [`types`] - Sites, filter criteria, geometry and configuration
//! - [`pipeline`] - Payload parsing, normalization, classification, filtering
//! - [`render`] - Markers, cluster colors, popups and camera control
//! - [`traits`] - Collaborator abstractions (SiteSource, ImageResolver, MapWidget)
//! - [`sources`] - HTTP and Wikimedia Commons implementations
//! - [`controller`] - The application state behind the map page
//! - [`testing`] - Mock implementations for testing

pub mod controller;
pub mod error;
pub mod pipeline;
pub mod render;
pub mod sources;
pub mod testing;
pub mod traits;
pub mod types;

// Re-export core types at crate root
pub use error::{HeritageError, Result, SourceError, SourceResult};
pub use traits::{
    images::ImageResolver,
    map::{ClusterIconFactory, ClusterId, MapEvent, MapWidget, MarkerId, MarkerSpec},
    source::SiteSource,
};
pub use types::{
    config::{CommonsConfig, MapConfig},
    filter::{FilterCriteria, TypeFilter},
    geo::{LatLng, LatLngBounds, Point, Rect, Size},
    site::{Site, SiteType},
};

// Re-export the controller
pub use controller::{load_sites, HeritageApp, LoadState, LOAD_ERROR_MESSAGE};

// Re-export pipeline components
pub use pipeline::{
    // Parsing and normalization
    normalize_record, normalize_sites, parse_payload,
    // Classification
    classify_site,
    // Filtering
    filter_sites, CategoryCounts, SearchTerms, YearRange,
};

// Re-export rendering
pub use render::{
    cluster_color, cluster_icon, AutoFitPolicy, ImagePanel, MapRenderer, PopupState,
    RenderReason,
};

// Re-export sources
pub use sources::{CommonsImageResolver, HttpSiteSource};

// Re-export testing utilities
pub use testing::{MockImageResolver, MockMapWidget, MockSiteSource};
