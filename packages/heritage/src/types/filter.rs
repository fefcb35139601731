//! Filter criteria derived from UI state.

use serde::{Deserialize, Serialize};

use super::site::{Site, SiteType};

/// Category selection: every category, or exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeFilter {
    #[default]
    All,
    Cultural,
    Natural,
    Mixed,
}

impl TypeFilter {
    /// Parse a button value such as `all` or `natural`.
    pub fn parse(value: &str) -> Option<Self> {
        if value.trim().eq_ignore_ascii_case("all") {
            return Some(TypeFilter::All);
        }
        SiteType::parse(value).map(Self::from)
    }

    pub fn matches(&self, site_type: SiteType) -> bool {
        match self.site_type() {
            None => true,
            Some(selected) => selected == site_type,
        }
    }

    /// The selected category, or `None` for `All`.
    pub fn site_type(&self) -> Option<SiteType> {
        match self {
            TypeFilter::All => None,
            TypeFilter::Cultural => Some(SiteType::Cultural),
            TypeFilter::Natural => Some(SiteType::Natural),
            TypeFilter::Mixed => Some(SiteType::Mixed),
        }
    }
}

impl From<SiteType> for TypeFilter {
    fn from(site_type: SiteType) -> Self {
        match site_type {
            SiteType::Cultural => TypeFilter::Cultural,
            SiteType::Natural => TypeFilter::Natural,
            SiteType::Mixed => TypeFilter::Mixed,
        }
    }
}

/// Criteria applied by the filter engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterCriteria {
    /// Inclusive upper bound on inscription year.
    pub selected_year: i32,

    pub selected_type: TypeFilter,

    /// Normalized search terms, AND-combined.
    #[serde(default)]
    pub search_terms: Vec<String>,
}

impl FilterCriteria {
    /// Criteria matching every site inscribed up to `selected_year`.
    pub fn up_to(selected_year: i32) -> Self {
        Self {
            selected_year,
            selected_type: TypeFilter::All,
            search_terms: Vec::new(),
        }
    }

    /// Set the category filter.
    pub fn with_type(mut self, selected_type: TypeFilter) -> Self {
        self.selected_type = selected_type;
        self
    }

    /// Set the search terms (expected already normalized).
    pub fn with_terms(mut self, terms: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.search_terms = terms.into_iter().map(|t| t.into()).collect();
        self
    }

    /// The per-site predicate of the filter engine.
    pub fn matches(&self, site: &Site) -> bool {
        site.inscription_year <= self.selected_year
            && self.selected_type.matches(site.site_type)
            && site.matches_terms(&self.search_terms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_filter_parse() {
        assert_eq!(TypeFilter::parse("ALL"), Some(TypeFilter::All));
        assert_eq!(TypeFilter::parse("natural"), Some(TypeFilter::Natural));
        assert_eq!(TypeFilter::parse("bogus"), None);
    }

    #[test]
    fn test_type_filter_matches() {
        assert!(TypeFilter::All.matches(SiteType::Mixed));
        assert!(TypeFilter::Mixed.matches(SiteType::Mixed));
        assert!(!TypeFilter::Natural.matches(SiteType::Cultural));
    }
}
