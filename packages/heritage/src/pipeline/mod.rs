//! Data pipeline - from raw source payload to the filtered site set.
//!
//! The pipeline covers:
//! - Payload parsing (`sites` array or legacy SPARQL bindings)
//! - Normalization into canonical sites
//! - Heritage-type classification
//! - Search-term folding
//! - Filtering and the counts derived from it

pub mod classify;
pub mod filter;
pub mod normalize;
pub mod payload;
pub mod search;

pub use classify::{classify_criteria, classify_description, classify_site};
pub use filter::{
    bubble_label, count_inscribed_in, current_year, filter_sites, summary_label, total_label,
    CategoryCounts, YearRange, DEFAULT_MAX_YEAR,
};
pub use normalize::{
    extract_coordinates, extract_images, is_valid_position, normalize_record, normalize_sites,
    parse_inscription_year, parse_wkt_point,
};
pub use payload::{binding_to_record, parse_payload};
pub use search::{fold_search_text, normalize_term, SearchTerms};
