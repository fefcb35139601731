//! Filter engine and the counts derived from it.

use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::types::filter::{FilterCriteria, TypeFilter};
use crate::types::site::{Site, SiteType, DEFAULT_INSCRIPTION_YEAR};

/// Upper slider bound used even when the data stops earlier.
pub const DEFAULT_MAX_YEAR: i32 = 2025;

/// Stable filter: keeps the sites matching `criteria`, in input order.
pub fn filter_sites(sites: &[Arc<Site>], criteria: &FilterCriteria) -> Vec<Arc<Site>> {
    sites
        .iter()
        .filter(|site| criteria.matches(site))
        .cloned()
        .collect()
}

/// Per-category counts of sites inscribed up to a year.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCounts {
    pub all: usize,
    pub cultural: usize,
    pub natural: usize,
    pub mixed: usize,
}

impl CategoryCounts {
    /// Count by category, ignoring type and search filters.
    pub fn up_to(sites: &[Arc<Site>], selected_year: i32) -> Self {
        sites
            .iter()
            .filter(|site| site.inscription_year <= selected_year)
            .fold(Self::default(), |mut counts, site| {
                counts.all += 1;
                match site.site_type {
                    SiteType::Cultural => counts.cultural += 1,
                    SiteType::Natural => counts.natural += 1,
                    SiteType::Mixed => counts.mixed += 1,
                }
                counts
            })
    }

    pub fn get(&self, filter: TypeFilter) -> usize {
        match filter {
            TypeFilter::All => self.all,
            TypeFilter::Cultural => self.cultural,
            TypeFilter::Natural => self.natural,
            TypeFilter::Mixed => self.mixed,
        }
    }
}

/// Sites inscribed exactly in `year` that pass the type filter.
pub fn count_inscribed_in(sites: &[Arc<Site>], year: i32, type_filter: TypeFilter) -> usize {
    sites
        .iter()
        .filter(|site| site.inscription_year == year && type_filter.matches(site.site_type))
        .count()
}

/// Slider bounds and the year selected after a load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearRange {
    pub min_year: i32,
    pub max_year: i32,
}

impl Default for YearRange {
    fn default() -> Self {
        Self {
            min_year: DEFAULT_INSCRIPTION_YEAR,
            max_year: DEFAULT_MAX_YEAR.max(current_year()),
        }
    }
}

impl YearRange {
    /// Range for a freshly loaded site set, plus the year to select.
    ///
    /// The selection is the latest inscription year so every site shows.
    /// Returns `None` for an empty set; the previous range stays in effect.
    pub fn from_sites(sites: &[Arc<Site>]) -> Option<(Self, i32)> {
        let latest = sites.iter().map(|s| s.inscription_year).max()?;
        let range = Self {
            min_year: DEFAULT_INSCRIPTION_YEAR,
            max_year: DEFAULT_MAX_YEAR.max(latest).max(current_year()),
        };
        Some((range, latest.max(range.min_year)))
    }

    pub fn clamp(&self, year: i32) -> i32 {
        year.clamp(self.min_year, self.max_year)
    }

    /// Position of `year` along the slider, in `[0, 1]`.
    pub fn fraction(&self, year: i32) -> f64 {
        if self.max_year == self.min_year {
            return 0.0;
        }
        let fraction =
            f64::from(year - self.min_year) / f64::from(self.max_year - self.min_year);
        fraction.clamp(0.0, 1.0)
    }
}

pub fn current_year() -> i32 {
    Utc::now().year()
}

/// Header label, e.g. "Showing 12 UNESCO World Heritage Sites up to 1990".
pub fn summary_label(shown: usize, selected_year: i32, current_year: i32) -> String {
    let mut label = format!("Showing {} UNESCO World Heritage Sites", shown);
    if selected_year < current_year {
        label.push_str(&format!(" up to {}", selected_year));
    }
    label
}

/// Slider bubble label, e.g. "1987 | 3 Sites".
pub fn bubble_label(year: i32, count: usize) -> String {
    format!(
        "{} | {} {}",
        year,
        count,
        if count == 1 { "Site" } else { "Sites" }
    )
}

pub fn total_label(total: usize) -> String {
    format!("{} total sites", total)
}
