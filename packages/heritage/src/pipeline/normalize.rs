//! Site normalizer - raw JSON records into canonical [`Site`] values.
//!
//! Raw records come in several shapes (pre-shaped proxy output, flattened
//! SPARQL bindings, already-canonical sites). Text fields never cause a
//! rejection: they fall back to defaults. The only rejection criterion is a
//! missing, non-finite or out-of-range coordinate.

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;
use tracing::{debug, warn};

use crate::pipeline::classify::classify_site;
use crate::pipeline::search::fold_search_text;
use crate::types::geo::LatLng;
use crate::types::site::{
    Site, SiteType, DEFAULT_DESCRIPTION, DEFAULT_INSCRIPTION_YEAR, MAX_IMAGES, UNKNOWN_COUNTRY,
    UNKNOWN_ID, UNKNOWN_SITE_NAME,
};

lazy_static! {
    static ref FLOAT_PREFIX: Regex =
        Regex::new(r"^\s*[+-]?(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?").unwrap();
    static ref INT_PREFIX: Regex = Regex::new(r"^\s*[+-]?\d+").unwrap();
    static ref WKT_POINT: Regex = Regex::new(
        r"(?i)Point\s*\(\s*([+-]?\d+(?:\.\d+)?(?:[eE][+-]?\d+)?)\s+([+-]?\d+(?:\.\d+)?(?:[eE][+-]?\d+)?)\s*\)"
    )
    .unwrap();
    static ref CRITERIA_SEPARATOR: Regex = Regex::new(r"[,;|\s]+").unwrap();
}

/// Normalize a batch of raw records, dropping those without valid coordinates.
///
/// Output order follows input order.
pub fn normalize_sites(records: &[Value]) -> Vec<Site> {
    let sites: Vec<Site> = records.iter().filter_map(normalize_record).collect();

    debug!(
        input = records.len(),
        retained = sites.len(),
        dropped = records.len() - sites.len(),
        "Normalized site records"
    );

    sites
}

/// Normalize one raw record; `None` when it has no valid coordinates.
pub fn normalize_record(record: &Value) -> Option<Site> {
    if !record.is_object() {
        return None;
    }

    let position = extract_coordinates(record)?;
    if !is_valid_position(position) {
        return None;
    }

    let criteria = extract_criteria(record.get("criteria"));
    let raw_description = non_empty_str(record.get("description"));
    let site_type = classify_site(
        non_empty_str(record.get("type")),
        &criteria,
        raw_description,
    );

    let countries = extract_countries(record);
    let country = if countries.is_empty() {
        UNKNOWN_COUNTRY.to_string()
    } else {
        countries.join(", ")
    };

    let name = non_empty_str(record.get("label"))
        .or_else(|| non_empty_str(record.get("name")))
        .unwrap_or(UNKNOWN_SITE_NAME)
        .to_string();

    let description = raw_description.unwrap_or(DEFAULT_DESCRIPTION).to_string();

    let official_url = non_empty_str(record.get("unescoUrl"))
        .or_else(|| non_empty_str(record.get("officialUrl")))
        .map(str::to_string);

    let images = ["images", "imageList", "media"]
        .iter()
        .find_map(|key| record.get(*key).filter(|v| is_present(v)))
        .map(extract_images)
        .unwrap_or_default();

    let search_text = build_search_text(&name, &country, &description, site_type);

    Some(Site {
        id: extract_id(record),
        name,
        countries,
        country,
        latitude: position.lat,
        longitude: position.lng,
        inscription_year: parse_inscription_year(record.get("inscriptionYear"))
            .unwrap_or(DEFAULT_INSCRIPTION_YEAR),
        site_type,
        criteria,
        description,
        official_url,
        images,
        search_text,
    })
}

/// Whether a position is finite and inside the geographic range.
pub fn is_valid_position(position: LatLng) -> bool {
    position.lat.is_finite()
        && position.lng.is_finite()
        && (-90.0..=90.0).contains(&position.lat)
        && (-180.0..=180.0).contains(&position.lng)
}

/// Coordinate extraction in fallback order: coordinate object, flat fields, WKT.
pub fn extract_coordinates(record: &Value) -> Option<LatLng> {
    let coords = ["coord", "coordinate"]
        .iter()
        .find_map(|key| record.get(*key).filter(|v| v.is_object()));

    let lat = coords
        .and_then(|c| number_field(c, "lat").or_else(|| number_field(c, "latitude")))
        .or_else(|| lenient_float(record.get("latitude")))
        .or_else(|| lenient_float(record.get("lat")));
    let lng = coords
        .and_then(|c| number_field(c, "lon").or_else(|| number_field(c, "longitude")))
        .or_else(|| lenient_float(record.get("longitude")))
        .or_else(|| lenient_float(record.get("lon")));

    if let (Some(lat), Some(lng)) = (lat, lng) {
        return Some(LatLng::new(lat, lng));
    }

    ["coord", "coordinate"]
        .iter()
        .filter_map(|key| record.get(*key).and_then(Value::as_str))
        .find_map(parse_wkt_point)
}

/// Parse a WKT `Point(<lon> <lat>)` string.
pub fn parse_wkt_point(value: &str) -> Option<LatLng> {
    let caps = WKT_POINT.captures(value)?;
    let lng: f64 = caps.get(1)?.as_str().parse().ok()?;
    let lat: f64 = caps.get(2)?.as_str().parse().ok()?;
    Some(LatLng::new(lat, lng))
}

/// Inscription year from a number or a string with a leading integer.
///
/// Returns `None` for anything unusable; callers default it.
pub fn parse_inscription_year(value: Option<&Value>) -> Option<i32> {
    match value? {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i32::try_from(i).ok()
            } else {
                n.as_f64()
                    .filter(|f| f.is_finite())
                    .map(f64::trunc)
                    .filter(|f| *f >= i32::MIN as f64 && *f <= i32::MAX as f64)
                    .map(|f| f as i32)
            }
        }
        Value::String(s) => INT_PREFIX
            .find(s)
            .and_then(|m| m.as_str().trim().parse::<i32>().ok()),
        _ => None,
    }
}

/// Image references from an array, a `|`-delimited string, a JSON-array
/// string or a single bare string. Trimmed, non-empty, at most five.
///
/// A JSON-looking string that fails to parse yields no images.
pub fn extract_images(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => clean_list(items.iter().filter_map(scalar_to_string)),
        Value::String(s) => {
            if s.contains('|') {
                return clean_list(s.split('|').map(str::to_string));
            }
            if s.starts_with('[') {
                return match serde_json::from_str::<Value>(s) {
                    Ok(Value::Array(items)) => clean_list(items.iter().filter_map(scalar_to_string)),
                    Ok(_) => Vec::new(),
                    Err(e) => {
                        warn!(error = %e, "Unable to parse images JSON string");
                        Vec::new()
                    }
                };
            }
            clean_list(std::iter::once(s.clone()))
        }
        _ => Vec::new(),
    }
}

/// Countries from an explicit list, else a single country string.
pub fn extract_countries(record: &Value) -> Vec<String> {
    let listed: Vec<String> = record
        .get("countries")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    if !listed.is_empty() {
        return listed;
    }

    non_empty_str(record.get("country"))
        .filter(|country| *country != UNKNOWN_COUNTRY)
        .map(|country| vec![country.to_string()])
        .unwrap_or_default()
}

/// Criterion codes from an array or a delimited string.
pub fn extract_criteria(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(scalar_to_string)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        Some(Value::String(s)) => CRITERIA_SEPARATOR
            .split(s)
            .filter(|part| !part.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

/// Identifier from the last segment of the source URI.
pub fn extract_id(record: &Value) -> String {
    if let Some(uri) = non_empty_str(record.get("site")) {
        if let Some(segment) = uri.trim_end_matches('/').rsplit('/').next() {
            if !segment.is_empty() {
                return segment.to_string();
            }
        }
    }

    match record.get("id") {
        Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        _ => UNKNOWN_ID.to_string(),
    }
}

/// Searchable text for a site: name, country, description and category.
pub fn build_search_text(
    name: &str,
    country: &str,
    description: &str,
    site_type: SiteType,
) -> String {
    fold_search_text(&format!(
        "{} {} {} {}",
        name,
        country,
        description,
        site_type.as_str()
    ))
}

fn clean_list(items: impl Iterator<Item = String>) -> Vec<String> {
    items
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .take(MAX_IMAGES)
        .collect()
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.is_empty(),
        _ => true,
    }
}

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn number_field(value: &Value, key: &str) -> Option<f64> {
    value.get(key).and_then(Value::as_f64)
}

/// Number as-is, or the leading decimal prefix of a string.
fn lenient_float(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => FLOAT_PREFIX
            .find(s)
            .and_then(|m| m.as_str().trim().parse::<f64>().ok()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_out_of_range_latitude_is_dropped() {
        let records = vec![json!({"name": "Test", "lat": 100, "lon": 0})];
        assert!(normalize_sites(&records).is_empty());
    }

    #[test]
    fn test_string_year_becomes_numeric() {
        let site = normalize_record(&json!({
            "name": "Great Wall",
            "latitude": 40.43,
            "longitude": 116.57,
            "inscriptionYear": "1987"
        }))
        .unwrap();
        assert_eq!(site.inscription_year, 1987);
    }

    #[test]
    fn test_year_defaults_and_prefix_parsing() {
        assert_eq!(parse_inscription_year(Some(&json!("1987-01-01T00:00:00Z"))), Some(1987));
        assert_eq!(parse_inscription_year(Some(&json!(2001.7))), Some(2001));
        assert_eq!(parse_inscription_year(Some(&json!("unknown"))), None);
        assert_eq!(parse_inscription_year(Some(&json!(null))), None);
        assert_eq!(parse_inscription_year(None), None);

        let site = normalize_record(&json!({"lat": 1, "lon": 2, "inscriptionYear": "n/a"})).unwrap();
        assert_eq!(site.inscription_year, DEFAULT_INSCRIPTION_YEAR);
    }

    #[test]
    fn test_coordinate_object_takes_precedence() {
        let record = json!({
            "coord": {"lat": 10.5, "lon": 20.25},
            "latitude": 1.0,
            "longitude": 2.0
        });
        assert_eq!(extract_coordinates(&record), Some(LatLng::new(10.5, 20.25)));

        let long_names = json!({"coordinate": {"latitude": -3.0, "longitude": 4.0}});
        assert_eq!(extract_coordinates(&long_names), Some(LatLng::new(-3.0, 4.0)));
    }

    #[test]
    fn test_flat_string_coordinates_parse_leniently() {
        let record = json!({"latitude": "44.428abc", "longitude": " -110.5885"});
        assert_eq!(extract_coordinates(&record), Some(LatLng::new(44.428, -110.5885)));

        let short = json!({"lat": "12", "lon": 7});
        assert_eq!(extract_coordinates(&short), Some(LatLng::new(12.0, 7.0)));

        assert_eq!(extract_coordinates(&json!({"lat": "north", "lon": 7})), None);
    }

    #[test]
    fn test_wkt_point_is_lon_lat() {
        assert_eq!(
            parse_wkt_point("Point(116.5704 40.4319)"),
            Some(LatLng::new(40.4319, 116.5704))
        );
        assert_eq!(
            parse_wkt_point("point( -91.2109 -0.7893 )"),
            Some(LatLng::new(-0.7893, -91.2109))
        );
        assert_eq!(parse_wkt_point("LINESTRING(1 2, 3 4)"), None);

        let record = json!({"coordinate": "Point(2.2945 48.8584)"});
        assert_eq!(extract_coordinates(&record), Some(LatLng::new(48.8584, 2.2945)));
    }

    #[test]
    fn test_images_from_every_shape() {
        let array = json!(["  a.jpg ", "", "b.jpg", "c.jpg", "d.jpg", "e.jpg", "f.jpg"]);
        assert_eq!(extract_images(&array), vec!["a.jpg", "b.jpg", "c.jpg", "d.jpg", "e.jpg"]);

        assert_eq!(extract_images(&json!("a.jpg| b.jpg |")), vec!["a.jpg", "b.jpg"]);
        assert_eq!(extract_images(&json!("[\"x.png\", \"y.png\"]")), vec!["x.png", "y.png"]);
        assert_eq!(extract_images(&json!("single.jpg")), vec!["single.jpg"]);
        assert_eq!(extract_images(&json!("   ")), Vec::<String>::new());
        assert_eq!(extract_images(&json!(42)), Vec::<String>::new());
    }

    #[test]
    fn test_broken_json_images_degrade_without_error() {
        assert!(extract_images(&json!("[not json")).is_empty());
    }

    #[test]
    fn test_image_source_fallback_keys() {
        let site = normalize_record(&json!({"lat": 0, "lon": 0, "imageList": ["i.jpg"]})).unwrap();
        assert_eq!(site.images, vec!["i.jpg"]);

        let site = normalize_record(&json!({"lat": 0, "lon": 0, "images": null, "media": "m.jpg"}))
            .unwrap();
        assert_eq!(site.images, vec!["m.jpg"]);
    }

    #[test]
    fn test_country_extraction() {
        let listed = json!({"countries": ["France", "Spain"], "country": "Andorra"});
        assert_eq!(extract_countries(&listed), vec!["France", "Spain"]);

        let single = json!({"countries": [], "country": "Peru"});
        assert_eq!(extract_countries(&single), vec!["Peru"]);

        let placeholder = json!({"country": "Unknown"});
        assert!(extract_countries(&placeholder).is_empty());

        let site = normalize_record(&json!({"lat": 0, "lon": 0, "countries": ["France", "Spain"]}))
            .unwrap();
        assert_eq!(site.country, "France, Spain");

        let site = normalize_record(&json!({"lat": 0, "lon": 0})).unwrap();
        assert_eq!(site.country, UNKNOWN_COUNTRY);
        assert!(site.countries.is_empty());
    }

    #[test]
    fn test_id_from_uri_segment() {
        assert_eq!(extract_id(&json!({"site": "http://www.wikidata.org/entity/Q1"})), "Q1");
        assert_eq!(extract_id(&json!({"id": "Q42"})), "Q42");
        assert_eq!(extract_id(&json!({"id": 7})), "7");
        assert_eq!(extract_id(&json!({})), UNKNOWN_ID);
    }

    #[test]
    fn test_text_defaults_never_reject() {
        let site = normalize_record(&json!({
            "lat": 1.0,
            "lon": 1.0,
            "label": 12,
            "description": "",
            "officialUrl": ""
        }))
        .unwrap();

        assert_eq!(site.name, UNKNOWN_SITE_NAME);
        assert_eq!(site.description, DEFAULT_DESCRIPTION);
        assert_eq!(site.official_url, None);
        assert_eq!(site.site_type, SiteType::Cultural);
    }

    #[test]
    fn test_criteria_string_is_split() {
        assert_eq!(
            extract_criteria(Some(&json!("(i), (iii);vii"))),
            vec!["(i)", "(iii)", "vii"]
        );
        assert_eq!(extract_criteria(Some(&json!(["ii", " ", "x"]))), vec!["ii", "x"]);
    }

    #[test]
    fn test_search_text_is_folded() {
        let site = normalize_record(&json!({
            "name": "Historic Centre of Bogotá",
            "country": "Colombia",
            "lat": 4.6,
            "lon": -74.08
        }))
        .unwrap();

        assert!(site.search_text.contains("bogota"));
        assert!(site.search_text.contains("colombia"));
    }

    #[test]
    fn test_non_object_records_are_rejected() {
        assert!(normalize_record(&json!([1, 2])).is_none());
        assert!(normalize_record(&json!("Point(1 2)")).is_none());
    }
}
