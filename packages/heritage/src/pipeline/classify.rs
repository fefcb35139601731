//! Heritage-type classification with an ordered fallback.
//!
//! 1. explicit type string
//! 2. UNESCO criterion codes (i-vi cultural, vii-x natural)
//! 3. description keywords (`mixed`, `natural`, `cultural`)
//! 4. `cultural`

use lazy_static::lazy_static;
use regex::Regex;

use crate::types::site::SiteType;

lazy_static! {
    static ref CULTURAL_CRITERION: Regex = Regex::new(r"(?i)\b(i|ii|iii|iv|v|vi)\b").unwrap();
    static ref NATURAL_CRITERION: Regex = Regex::new(r"(?i)\b(vii|viii|ix|x)\b").unwrap();
}

/// Classify a site from whatever evidence the record carries.
pub fn classify_site(
    explicit_type: Option<&str>,
    criteria: &[String],
    description: Option<&str>,
) -> SiteType {
    if let Some(site_type) = explicit_type.and_then(SiteType::parse) {
        return site_type;
    }

    if let Some(site_type) = classify_criteria(criteria) {
        return site_type;
    }

    if let Some(site_type) = description.and_then(classify_description) {
        return site_type;
    }

    SiteType::Cultural
}

/// Category implied by criterion codes, if any code is recognized.
pub fn classify_criteria(criteria: &[String]) -> Option<SiteType> {
    let cultural = criteria.iter().any(|c| CULTURAL_CRITERION.is_match(c));
    let natural = criteria.iter().any(|c| NATURAL_CRITERION.is_match(c));

    match (cultural, natural) {
        (true, true) => Some(SiteType::Mixed),
        (false, true) => Some(SiteType::Natural),
        (true, false) => Some(SiteType::Cultural),
        (false, false) => None,
    }
}

/// Category implied by description keywords, checked in priority order.
pub fn classify_description(description: &str) -> Option<SiteType> {
    let lower = description.to_lowercase();
    [SiteType::Mixed, SiteType::Natural, SiteType::Cultural]
        .into_iter()
        .find(|site_type| lower.contains(site_type.as_str()))
}
