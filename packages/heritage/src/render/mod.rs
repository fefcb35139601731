//! Map rendering - markers, clusters, popups and camera control.
//!
//! - [`style`] - category colors and the cluster color rule
//! - [`autofit`] - when a render frames the camera
//! - [`viewport`] - popup safe-area math
//! - [`popup`] - popup, tooltip and carousel markup
//! - [`images`] - popup thumbnail cache and loading
//! - [`renderer`] - the stateful driver over a [`crate::traits::map::MapWidget`]

pub mod autofit;
pub mod images;
pub mod popup;
pub mod renderer;
pub mod style;
pub mod viewport;

pub use autofit::{AutoFitEvent, AutoFitPolicy};
pub use images::ImageCache;
pub use popup::{build_popup_content, escape_html, Carousel, ImagePanel};
pub use renderer::{HoverState, MapRenderer, MoveEndAction, OpenPopup, PopupState, RenderReason};
pub use style::{
    category_style, cluster_color, cluster_icon, filter_style, CategoryStyle, ClusterIcon,
    ClusterSize, Rgb,
};
pub use viewport::{popup_translation, safe_rect};
