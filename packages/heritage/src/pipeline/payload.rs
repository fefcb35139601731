//! Top-level response parsing and legacy SPARQL binding reshaping.

use serde_json::{json, Map, Value};
use tracing::warn;

use crate::error::{HeritageError, Result};
use crate::pipeline::normalize::parse_wkt_point;

/// Extract the raw site records from a source response.
///
/// Accepts `{ "sites": [...] }` (preferred) or the SPARQL JSON results shape
/// `{ "results": { "bindings": [...] } }`, whose bindings are reshaped into
/// flat records.
pub fn parse_payload(payload: &Value) -> Result<Vec<Value>> {
    if let Some(sites) = payload.get("sites").and_then(Value::as_array) {
        return Ok(sites.clone());
    }

    if let Some(bindings) = payload
        .get("results")
        .and_then(|r| r.get("bindings"))
        .and_then(Value::as_array)
    {
        warn!(
            count = bindings.len(),
            "Received legacy SPARQL bindings, normalizing client-side"
        );
        return Ok(bindings.iter().map(binding_to_record).collect());
    }

    Err(HeritageError::InvalidPayload {
        reason: "expected `sites` array or `results.bindings`".to_string(),
    })
}

/// Reshape one SPARQL binding into the flat record the normalizer expects.
pub fn binding_to_record(binding: &Value) -> Value {
    let wkt = binding_value(binding, "coordinate").or_else(|| binding_value(binding, "coord"));
    let point = wkt.and_then(parse_wkt_point);

    let latitude = point
        .map(|p| p.lat)
        .or_else(|| binding_value(binding, "latitude").and_then(|v| v.trim().parse().ok()));
    let longitude = point
        .map(|p| p.lng)
        .or_else(|| binding_value(binding, "longitude").and_then(|v| v.trim().parse().ok()));

    let coord = match (latitude, longitude) {
        (Some(lat), Some(lon)) => json!({ "lat": lat, "lon": lon }),
        _ => Value::Null,
    };

    let country = binding_value(binding, "country");

    let mut record = Map::new();
    record.insert("site".into(), opt(binding_value(binding, "item")));
    record.insert("label".into(), opt(binding_value(binding, "itemLabel")));
    record.insert("description".into(), opt(binding_value(binding, "description")));
    record.insert("country".into(), opt(country));
    record.insert(
        "countries".into(),
        Value::Array(country.map(|c| vec![Value::from(c)]).unwrap_or_default()),
    );
    record.insert("coord".into(), coord);
    record.insert("latitude".into(), latitude.map(Value::from).unwrap_or(Value::Null));
    record.insert("longitude".into(), longitude.map(Value::from).unwrap_or(Value::Null));
    record.insert(
        "inscriptionYear".into(),
        opt(binding_value(binding, "inscriptionYear")),
    );
    record.insert("unescoId".into(), opt(binding_value(binding, "unescoId")));
    record.insert("unescoUrl".into(), opt(binding_value(binding, "officialUrl")));
    record.insert("criteria".into(), opt(binding_value(binding, "criteria")));
    record.insert("type".into(), opt(binding_value(binding, "type")));
    record.insert("images".into(), opt(binding_value(binding, "image")));

    Value::Object(record)
}

/// The `value` of a SPARQL binding cell.
fn binding_value<'a>(binding: &'a Value, key: &str) -> Option<&'a str> {
    binding
        .get(key)
        .and_then(|cell| cell.get("value"))
        .and_then(Value::as_str)
        .filter(|v| !v.is_empty())
}

fn opt(value: Option<&str>) -> Value {
    value.map(Value::from).unwrap_or(Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::normalize::normalize_sites;
    use crate::types::site::SiteType;

    fn cell(value: &str) -> Value {
        json!({ "type": "literal", "value": value })
    }

    #[test]
    fn test_preferred_sites_shape() {
        let payload = json!({ "sites": [{ "name": "A" }, { "name": "B" }] });
        assert_eq!(parse_payload(&payload).unwrap().len(), 2);
    }

    #[test]
    fn test_invalid_shape_is_an_error() {
        let err = parse_payload(&json!({ "data": [] })).unwrap_err();
        assert!(matches!(err, HeritageError::InvalidPayload { .. }));

        let err = parse_payload(&json!({ "sites": "nope" })).unwrap_err();
        assert!(matches!(err, HeritageError::InvalidPayload { .. }));
    }

    #[test]
    fn test_binding_reshaped_and_normalized() {
        let payload = json!({
            "results": { "bindings": [{
                "item": cell("http://www.wikidata.org/entity/Q42"),
                "itemLabel": cell("Great Wall of China"),
                "coordinate": cell("Point(116.5704 40.4319)"),
                "country": cell("China"),
                "inscriptionYear": cell("1987-01-01T00:00:00Z"),
                "officialUrl": cell("https://whc.unesco.org/en/list/438"),
                "criteria": cell("i, ii, iii, iv, vi")
            }]}
        });

        let records = parse_payload(&payload).unwrap();
        let sites = normalize_sites(&records);
        assert_eq!(sites.len(), 1);

        let site = &sites[0];
        assert_eq!(site.id, "Q42");
        assert_eq!(site.name, "Great Wall of China");
        assert_eq!(site.latitude, 40.4319);
        assert_eq!(site.longitude, 116.5704);
        assert_eq!(site.countries, vec!["China"]);
        assert_eq!(site.inscription_year, 1987);
        assert_eq!(site.site_type, SiteType::Cultural);
        assert_eq!(
            site.official_url.as_deref(),
            Some("https://whc.unesco.org/en/list/438")
        );
    }

    #[test]
    fn test_binding_falls_back_to_flat_coordinates() {
        let record = binding_to_record(&json!({
            "latitude": cell("-0.7893"),
            "longitude": cell("-91.2109")
        }));

        assert_eq!(record["coord"]["lat"], json!(-0.7893));
        assert_eq!(record["coord"]["lon"], json!(-91.2109));
        assert_eq!(record["site"], Value::Null);
    }

    #[test]
    fn test_binding_without_coordinates_is_dropped() {
        let payload = json!({
            "results": { "bindings": [{ "itemLabel": cell("Nowhere") }] }
        });
        let records = parse_payload(&payload).unwrap();
        assert!(normalize_sites(&records).is_empty());
    }
}
