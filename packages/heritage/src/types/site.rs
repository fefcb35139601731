//! Canonical site record produced by the normalizer.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Earliest real inscription year; used when a record has no usable year.
pub const DEFAULT_INSCRIPTION_YEAR: i32 = 1978;

/// Name used when a record carries no label.
pub const UNKNOWN_SITE_NAME: &str = "Unknown Site";

/// Display country when a record lists none.
pub const UNKNOWN_COUNTRY: &str = "Unknown";

/// Identifier used when a record has no source URI.
pub const UNKNOWN_ID: &str = "unknown";

/// Description used when a record has none.
pub const DEFAULT_DESCRIPTION: &str = "UNESCO World Heritage Site";

/// Maximum number of image references kept per site.
pub const MAX_IMAGES: usize = 5;

/// Heritage category of a site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SiteType {
    Cultural,
    Natural,
    Mixed,
}

impl SiteType {
    /// All categories in their canonical order (also the cluster tie-break order).
    pub const ALL: [SiteType; 3] = [SiteType::Cultural, SiteType::Natural, SiteType::Mixed];

    /// Case-insensitive parse of an explicit type string.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "cultural" => Some(SiteType::Cultural),
            "natural" => Some(SiteType::Natural),
            "mixed" => Some(SiteType::Mixed),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SiteType::Cultural => "cultural",
            SiteType::Natural => "natural",
            SiteType::Mixed => "mixed",
        }
    }
}

impl fmt::Display for SiteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A canonical heritage-site record after normalization.
///
/// Sites are built once per load by [`crate::pipeline::normalize_record`] and
/// never mutated afterwards; a reload replaces the whole set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Site {
    /// Last path segment of the source URI
    pub id: String,

    /// Human-readable label
    pub name: String,

    /// Ordered country names (possibly empty)
    pub countries: Vec<String>,

    /// Display string: joined countries or "Unknown"
    pub country: String,

    pub latitude: f64,
    pub longitude: f64,

    pub inscription_year: i32,

    #[serde(rename = "type")]
    pub site_type: SiteType,

    /// Raw criterion codes (roman numerals i-x)
    #[serde(default)]
    pub criteria: Vec<String>,

    pub description: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub official_url: Option<String>,

    /// Up to five image references (URLs or Commons file titles)
    #[serde(default)]
    pub images: Vec<String>,

    /// Lowercased, diacritic-stripped text used by search
    pub search_text: String,
}

impl Site {
    /// Whether the site has any image references to resolve.
    pub fn has_images(&self) -> bool {
        !self.images.is_empty()
    }

    /// Whether every search term occurs in the precomputed search text.
    pub fn matches_terms(&self, terms: &[String]) -> bool {
        terms.iter().all(|term| self.search_text.contains(term.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_site_type_parse_is_case_insensitive() {
        assert_eq!(SiteType::parse("Natural"), Some(SiteType::Natural));
        assert_eq!(SiteType::parse(" MIXED "), Some(SiteType::Mixed));
        assert_eq!(SiteType::parse("cultural"), Some(SiteType::Cultural));
        assert_eq!(SiteType::parse("industrial"), None);
    }

    #[test]
    fn test_site_type_serializes_lowercase() {
        let json = serde_json::to_string(&SiteType::Mixed).unwrap();
        assert_eq!(json, "\"mixed\"");
    }
}
