//! Popup, tooltip and carousel markup.
//!
//! All site-derived text goes through [`escape_html`] before it is placed in
//! markup.

use serde::{Deserialize, Serialize};

use super::style::category_style;
use crate::types::site::Site;

/// Escape the five HTML-significant characters.
pub fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#039;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Hover tooltip for a marker.
pub fn tooltip_html(site: &Site) -> String {
    format!("<strong>{}</strong>", escape_html(&site.name))
}

/// Image slideshow with one active slide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Carousel {
    urls: Vec<String>,
    broken: Vec<bool>,
    active: usize,
}

impl Carousel {
    /// `None` when there is nothing to show.
    pub fn new(urls: Vec<String>) -> Option<Self> {
        if urls.is_empty() {
            return None;
        }
        let broken = vec![false; urls.len()];
        Some(Self {
            urls,
            broken,
            active: 0,
        })
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    pub fn active(&self) -> usize {
        self.active
    }

    pub fn urls(&self) -> &[String] {
        &self.urls
    }

    pub fn is_broken(&self, index: usize) -> bool {
        self.broken.get(index).copied().unwrap_or(false)
    }

    /// Make `index` the only active slide. Out-of-range indices are ignored.
    pub fn select(&mut self, index: usize) -> bool {
        if index >= self.urls.len() {
            return false;
        }
        self.active = index;
        true
    }

    /// Replace a slide whose image failed to load with the placeholder.
    pub fn mark_broken(&mut self, index: usize) -> bool {
        match self.broken.get_mut(index) {
            Some(flag) if !*flag => {
                *flag = true;
                true
            }
            _ => false,
        }
    }

    fn to_html(&self, site_name: &str) -> String {
        let name = escape_html(site_name);
        let mut html = format!(
            r#"<div class="popup-media" data-active-index="{}"><div class="popup-media-track">"#,
            self.active
        );

        for (index, url) in self.urls.iter().enumerate() {
            let active = if index == self.active { " active" } else { "" };
            html.push_str(&format!(r#"<div class="popup-media-slide{active}">"#));
            if self.broken[index] {
                html.push_str(PLACEHOLDER_HTML);
            } else {
                html.push_str(&format!(
                    r#"<img src="{}" alt="{} image {}" loading="lazy" />"#,
                    escape_html(url),
                    name,
                    index + 1
                ));
            }
            html.push_str("</div>");
        }
        html.push_str("</div>");

        if self.urls.len() > 1 {
            html.push_str(&format!(
                r#"<div class="popup-media-dots" role="tablist" aria-label="{name} images">"#
            ));
            for index in 0..self.urls.len() {
                let active = if index == self.active { " active" } else { "" };
                html.push_str(&format!(
                    r#"<button type="button" class="popup-media-dot{active}" data-index="{index}" aria-label="Show image {}"></button>"#,
                    index + 1
                ));
            }
            html.push_str("</div>");
        }

        html.push_str("</div>");
        html
    }
}

/// Media area of an open popup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ImagePanel {
    Loading,
    Carousel(Carousel),
    Empty,
}

impl ImagePanel {
    pub fn from_urls(urls: Vec<String>) -> Self {
        Carousel::new(urls)
            .map(ImagePanel::Carousel)
            .unwrap_or(ImagePanel::Empty)
    }

    pub fn carousel_mut(&mut self) -> Option<&mut Carousel> {
        match self {
            ImagePanel::Carousel(carousel) => Some(carousel),
            _ => None,
        }
    }

    fn to_html(&self, site_name: &str) -> String {
        match self {
            ImagePanel::Loading => LOADING_HTML.to_string(),
            ImagePanel::Carousel(carousel) => carousel.to_html(site_name),
            ImagePanel::Empty => {
                format!(r#"<div class="popup-media">{PLACEHOLDER_HTML}</div>"#)
            }
        }
    }
}

const PLACEHOLDER_HTML: &str =
    r#"<div class="popup-media-placeholder"><span>No images available</span></div>"#;

const LOADING_HTML: &str =
    r#"<div class="popup-media is-loading"><div class="popup-media-placeholder"><span>Loading images</span></div></div>"#;

/// Full popup card for a site with the given media area.
pub fn build_popup_content(site: &Site, panel: &ImagePanel) -> String {
    let style = category_style(site.site_type);
    let has_media = matches!(panel, ImagePanel::Carousel(_));
    let card_class = if has_media {
        "popup-card has-media"
    } else {
        "popup-card"
    };

    let link = site
        .official_url
        .as_deref()
        .map(|url| {
            format!(
                r#"<a href="{}" target="_blank" rel="noopener noreferrer" class="popup-link">View on UNESCO →</a>"#,
                escape_html(url)
            )
        })
        .unwrap_or_default();

    format!(
        concat!(
            r#"<div class="{card_class}" data-site-id="{id}">"#,
            "{media}",
            r#"<div class="popup-body">"#,
            r#"<div class="popup-header"><h3>{name}</h3>"#,
            r#"<span class="popup-badge" style="--badge-color:{color}">{label}</span></div>"#,
            r#"<div class="popup-details">"#,
            r#"<p class="popup-meta"><span>Country</span>{country}</p>"#,
            r#"<p class="popup-meta"><span>Inscribed</span>{year}</p>"#,
            r#"<p class="popup-description">{description}</p>"#,
            "</div>{link}</div></div>"
        ),
        card_class = card_class,
        id = escape_html(&site.id),
        media = panel.to_html(&site.name),
        name = escape_html(&site.name),
        color = style.color,
        label = style.label,
        country = escape_html(&site.country),
        year = site.inscription_year,
        description = escape_html(&site.description),
        link = link,
    )
}
