//! End-to-end tests for the application controller.
//!
//! These drive [`HeritageApp`] with mock collaborators through the flows a
//! page goes through: load, filter, hover, open a popup, browse images.

use heritage::render::{ImagePanel, PopupState};
use heritage::{
    HeritageApp, LoadState, MapConfig, MapEvent, MockImageResolver, MockMapWidget,
    MockSiteSource, Rect, Size, TypeFilter,
};
use serde_json::json;

type TestApp = HeritageApp<MockSiteSource, MockImageResolver, MockMapWidget>;

fn bindings_payload() -> serde_json::Value {
    json!({
        "head": { "vars": ["item", "itemLabel", "coordinate"] },
        "results": {
            "bindings": [
                {
                    "item": { "type": "uri", "value": "http://www.wikidata.org/entity/Q5788" },
                    "itemLabel": { "type": "literal", "value": "Petra" },
                    "country": { "type": "literal", "value": "Jordan" },
                    "coordinate": { "type": "literal", "value": "Point(35.4444 30.3286)" },
                    "inscriptionYear": { "type": "literal", "value": "1985-01-01T00:00:00Z" },
                    "criteria": { "type": "literal", "value": "i, iii, iv" },
                    "image": { "type": "uri", "value": "http://commons.wikimedia.org/wiki/Special:FilePath/Petra.jpg" }
                },
                {
                    "item": { "type": "uri", "value": "http://www.wikidata.org/entity/Q180402" },
                    "itemLabel": { "type": "literal", "value": "Galápagos Islands" },
                    "country": { "type": "literal", "value": "Ecuador" },
                    "coordinate": { "type": "literal", "value": "Point(-90.5 -0.6667)" },
                    "inscriptionYear": { "type": "literal", "value": "1978" },
                    "criteria": { "type": "literal", "value": "vii;viii;ix;x" }
                },
                {
                    "item": { "type": "uri", "value": "http://www.wikidata.org/entity/Q0" },
                    "itemLabel": { "type": "literal", "value": "Broken" },
                    "coordinate": { "type": "literal", "value": "not a point" }
                }
            ]
        }
    })
}

fn sites_payload() -> serde_json::Value {
    json!({
        "sites": [
            {
                "site": "http://www.wikidata.org/entity/Q1",
                "label": "Historic Centre of Rome",
                "countries": ["Italy", "Holy See"],
                "coord": { "lat": 41.9, "lon": 12.48 },
                "inscriptionYear": 1980,
                "type": "cultural",
                "images": ["File:Colosseum.jpg", "File:Pantheon.jpg", "https://example.org/forum.jpg"],
                "unescoUrl": "https://whc.unesco.org/en/list/91"
            },
            {
                "site": "http://www.wikidata.org/entity/Q2",
                "label": "Tongariro National Park",
                "country": "New Zealand",
                "latitude": "-39.2",
                "longitude": "175.6",
                "inscriptionYear": "1990",
                "description": "A mixed site of volcanic and cultural significance",
                "imageList": "File:Tongariro.jpg"
            }
        ]
    })
}

fn app(source: MockSiteSource, resolver: MockImageResolver) -> TestApp {
    HeritageApp::new(
        source,
        resolver,
        MockMapWidget::new(Size::new(1280.0, 800.0)),
        MapConfig::default(),
    )
}

#[tokio::test]
async fn test_legacy_bindings_are_normalized() {
    let mut app = app(
        MockSiteSource::with_payload(bindings_payload()),
        MockImageResolver::new(),
    );
    assert_eq!(app.load().await, &LoadState::Ready);

    let sites = app.sites();
    assert_eq!(sites.len(), 2);

    let petra = &sites[0];
    assert_eq!(petra.id, "Q5788");
    assert_eq!(petra.country, "Jordan");
    assert_eq!(petra.inscription_year, 1985);
    assert_eq!(petra.latitude, 30.3286);
    assert_eq!(petra.longitude, 35.4444);
    assert_eq!(petra.site_type.as_str(), "cultural");
    assert_eq!(petra.images.len(), 1);

    let galapagos = &sites[1];
    assert_eq!(galapagos.site_type.as_str(), "natural");
    assert!(galapagos.search_text.contains("galapagos"));

    assert_eq!(app.criteria().selected_year, 1985);
    assert_eq!(app.renderer().widget().markers.len(), 2);
}

#[tokio::test]
async fn test_description_keyword_classification_and_flat_fields() {
    let mut app = app(
        MockSiteSource::with_payload(sites_payload()),
        MockImageResolver::new(),
    );
    app.load().await;

    let tongariro = &app.sites()[1];
    assert_eq!(tongariro.site_type.as_str(), "mixed");
    assert_eq!(tongariro.latitude, -39.2);
    assert_eq!(tongariro.inscription_year, 1990);
    assert_eq!(tongariro.images, vec!["File:Tongariro.jpg"]);

    let rome = &app.sites()[0];
    assert_eq!(rome.country, "Italy, Holy See");
    assert_eq!(
        rome.official_url.as_deref(),
        Some("https://whc.unesco.org/en/list/91")
    );

    app.set_type(TypeFilter::Mixed);
    assert_eq!(app.filtered_sites().len(), 1);
    assert_eq!(app.summary_label(), "Showing 1 UNESCO World Heritage Sites up to 1990");
}

#[tokio::test]
async fn test_popup_resolves_images_once_and_caches() {
    let resolver = MockImageResolver::new()
        .with_mapping("File:Colosseum.jpg", "https://thumb/colosseum.jpg")
        .with_mapping("File:Pantheon.jpg", "https://thumb/pantheon.jpg");
    let mut app = app(MockSiteSource::with_payload(sites_payload()), resolver);
    app.load().await;

    let marker = app.renderer().marker_for_site("Q1").unwrap();
    assert!(app.open_popup(marker).await);

    match app.renderer().popup() {
        PopupState::Open(open) => match &open.panel {
            ImagePanel::Carousel(carousel) => {
                assert_eq!(
                    carousel.urls(),
                    &[
                        "https://thumb/colosseum.jpg",
                        "https://thumb/pantheon.jpg",
                        "https://example.org/forum.jpg",
                    ]
                );
                assert_eq!(carousel.active(), 0);
            }
            other => panic!("expected carousel, got {:?}", other),
        },
        PopupState::Closed => panic!("popup should be open"),
    }

    assert!(app.select_slide(2));
    assert!(!app.select_slide(3));
    assert!(app.mark_slide_broken(1));
    let html = &app.renderer().widget().popup_content[&marker];
    assert!(html.contains(r#"data-active-index="2""#));
    assert!(html.contains("No images available"));
    assert!(!html.contains("pantheon"));

    app.handle_map_event(MapEvent::PopupClosed(marker));
    assert_eq!(app.renderer().popup(), &PopupState::Closed);

    app.open_popup(marker).await;
    assert_eq!(app.renderer().image_cache().len(), 1);
}

#[tokio::test]
async fn test_resolver_failure_shows_placeholder() {
    let mut app = app(
        MockSiteSource::with_payload(sites_payload()),
        MockImageResolver::new().failing(),
    );
    app.load().await;

    let marker = app.renderer().marker_for_site("Q2").unwrap();
    app.open_popup(marker).await;

    match app.renderer().popup() {
        PopupState::Open(open) => assert_eq!(open.panel, ImagePanel::Empty),
        PopupState::Closed => panic!("popup should be open"),
    }
    assert!(app.renderer().image_cache().is_empty());
    assert!(!app.select_slide(0));
}

#[tokio::test]
async fn test_popup_under_search_bar_recenters_map() {
    let mut app = app(
        MockSiteSource::with_payload(sites_payload()),
        MockImageResolver::new(),
    );
    app.load().await;
    app.handle_map_event(MapEvent::MoveEnd);

    let marker = app.renderer().marker_for_site("Q1").unwrap();
    let center_before = app.renderer().widget().center;
    app.renderer_mut()
        .widget_mut()
        .set_popup_rect(marker, Rect::new(400.0, 0.0, 700.0, 300.0));

    app.open_popup(marker).await;

    let flights = &app.renderer().widget().flights;
    assert_eq!(flights.len(), 1);
    // Content moves down by 88px, so the camera moves north.
    assert!(flights[0].0.lat > center_before.lat);
    assert_eq!(flights[0].0.lng, center_before.lng);
}

#[tokio::test]
async fn test_user_pan_stops_refitting_on_reload() {
    let source = MockSiteSource::with_payload(sites_payload());
    let mut app = app(source, MockImageResolver::new());
    app.load().await;
    app.handle_map_event(MapEvent::MoveEnd);
    assert_eq!(app.renderer().widget().fits.len(), 1);

    app.handle_map_event(MapEvent::MoveStart);
    assert!(!app.renderer().auto_fit().is_enabled());

    app.retry().await;
    assert_eq!(app.renderer().widget().fits.len(), 2);
}
