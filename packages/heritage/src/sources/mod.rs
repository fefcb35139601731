//! Network implementations of the source and image traits.

pub mod commons;
pub mod http;

pub use commons::{CommonsImageResolver, ImageReference};
pub use http::HttpSiteSource;
