//! Category colors, shade derivation and the cluster color rule.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::filter::TypeFilter;
use crate::types::site::SiteType;

/// Ring shade: 20% toward white.
pub const LIGHTEN_FACTOR: f64 = 0.20;

/// Border shade: 18% toward black.
pub const DARKEN_FACTOR: f64 = 0.18;

/// An sRGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rrggbb` or `#rgb` (leading `#` optional).
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.trim().trim_start_matches('#');
        let expanded: String = match digits.len() {
            3 => digits.chars().flat_map(|c| [c, c]).collect(),
            6 => digits.to_string(),
            _ => return None,
        };
        let channel = |i: usize| u8::from_str_radix(&expanded[i..i + 2], 16).ok();
        Some(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    /// Linear interpolation toward `target` by `factor` in `[0, 1]`.
    pub fn mix(&self, target: Rgb, factor: f64) -> Rgb {
        let factor = factor.clamp(0.0, 1.0);
        let lerp = |from: u8, to: u8| {
            (f64::from(from) + (f64::from(to) - f64::from(from)) * factor).round() as u8
        };
        Rgb::new(
            lerp(self.r, target.r),
            lerp(self.g, target.g),
            lerp(self.b, target.b),
        )
    }

    pub fn lighten(&self, factor: f64) -> Rgb {
        self.mix(Rgb::WHITE, factor)
    }

    pub fn darken(&self, factor: f64) -> Rgb {
        self.mix(Rgb::BLACK, factor)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Visual identity of a category button or marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryStyle {
    pub color: Rgb,
    pub label: &'static str,
    pub icon_html: &'static str,
}

const CULTURAL_STYLE: CategoryStyle = CategoryStyle {
    color: Rgb::new(0xDC, 0x26, 0x26),
    label: "Cultural",
    icon_html: r#"<i class="fa-solid fa-torii-gate" aria-hidden="true"></i>"#,
};

const NATURAL_STYLE: CategoryStyle = CategoryStyle {
    color: Rgb::new(0x16, 0xA3, 0x4A),
    label: "Natural",
    icon_html: r#"<i class="fa-solid fa-leaf" aria-hidden="true"></i>"#,
};

const MIXED_STYLE: CategoryStyle = CategoryStyle {
    color: Rgb::new(0xF9, 0x73, 0x16),
    label: "Mixed",
    icon_html: r#"<i class="fa-solid fa-circle-half-stroke" aria-hidden="true"></i>"#,
};

const ALL_STYLE: CategoryStyle = CategoryStyle {
    color: Rgb::new(0x0E, 0xA5, 0xE9),
    label: "All Sites",
    icon_html: r#"<i class="fa-solid fa-earth-americas" aria-hidden="true"></i>"#,
};

/// Color used for clusters with no categorized children.
pub const NEUTRAL_COLOR: Rgb = ALL_STYLE.color;

pub fn category_style(site_type: SiteType) -> &'static CategoryStyle {
    match site_type {
        SiteType::Cultural => &CULTURAL_STYLE,
        SiteType::Natural => &NATURAL_STYLE,
        SiteType::Mixed => &MIXED_STYLE,
    }
}

/// Style for a filter button, including the "all" button.
pub fn filter_style(filter: TypeFilter) -> &'static CategoryStyle {
    match filter.site_type() {
        Some(site_type) => category_style(site_type),
        None => &ALL_STYLE,
    }
}

/// Cluster fill color from the categories of its children.
///
/// One shared category gives that category's color; otherwise the plurality
/// category wins, ties going to the earlier category in [`SiteType::ALL`].
/// No children gives [`NEUTRAL_COLOR`].
pub fn cluster_color<I>(children: I) -> Rgb
where
    I: IntoIterator<Item = SiteType>,
{
    let mut counts = [0usize; 3];
    for site_type in children {
        let index = SiteType::ALL
            .iter()
            .position(|t| *t == site_type)
            .unwrap_or_default();
        counts[index] += 1;
    }

    let mut best: Option<(SiteType, usize)> = None;
    for (site_type, count) in SiteType::ALL.into_iter().zip(counts) {
        if count == 0 {
            continue;
        }
        match best {
            Some((_, best_count)) if best_count >= count => {}
            _ => best = Some((site_type, count)),
        }
    }

    best.map(|(site_type, _)| category_style(site_type).color)
        .unwrap_or(NEUTRAL_COLOR)
}

/// Size tier of a cluster bubble.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClusterSize {
    Small,
    Medium,
    Large,
}

impl ClusterSize {
    pub fn for_count(count: usize) -> Self {
        match count {
            0..=9 => ClusterSize::Small,
            10..=99 => ClusterSize::Medium,
            _ => ClusterSize::Large,
        }
    }

    pub fn pixels(&self) -> u32 {
        match self {
            ClusterSize::Small => 40,
            ClusterSize::Medium => 48,
            ClusterSize::Large => 56,
        }
    }

    pub fn class_name(&self) -> &'static str {
        match self {
            ClusterSize::Small => "heritage-cluster-small",
            ClusterSize::Medium => "heritage-cluster-medium",
            ClusterSize::Large => "heritage-cluster-large",
        }
    }
}

/// Icon the widget draws for a cluster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterIcon {
    pub fill: Rgb,
    pub ring: Rgb,
    pub border: Rgb,
    pub count: usize,
    pub size: ClusterSize,
    pub html: String,
    pub class_name: String,
}

/// Cluster icon factory handed to the widget's clustering layer.
pub fn cluster_icon(children: &[SiteType]) -> ClusterIcon {
    let fill = cluster_color(children.iter().copied());
    let ring = fill.lighten(LIGHTEN_FACTOR);
    let border = fill.darken(DARKEN_FACTOR);
    let count = children.len();
    let size = ClusterSize::for_count(count);

    let html = format!(
        r#"<div class="heritage-cluster" style="--cluster-fill:{fill};--cluster-ring:{ring};--cluster-border:{border};"><span>{count}</span></div>"#
    );

    ClusterIcon {
        fill,
        ring,
        border,
        count,
        size,
        html,
        class_name: format!("heritage-cluster-icon {}", size.class_name()),
    }
}

/// Marker pin HTML for a category.
pub fn marker_icon_html(site_type: SiteType) -> String {
    let style = category_style(site_type);
    format!(
        r#"<div class="heritage-marker" style="background-color:{};"><span class="heritage-marker-icon">{}</span></div>"#,
        style.color, style.icon_html
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_round_trip_and_short_form() {
        assert_eq!(Rgb::from_hex("#DC2626"), Some(Rgb::new(0xDC, 0x26, 0x26)));
        assert_eq!(Rgb::from_hex("fff"), Some(Rgb::WHITE));
        assert_eq!(Rgb::from_hex("#12345"), None);
        assert_eq!(Rgb::from_hex("#GGGGGG"), None);
        assert_eq!(Rgb::new(14, 165, 233).to_hex(), "#0EA5E9");
    }

    #[test]
    fn test_shades_interpolate_linearly() {
        let base = Rgb::new(100, 0, 200);
        assert_eq!(base.lighten(0.2), Rgb::new(131, 51, 211));
        assert_eq!(base.darken(0.18), Rgb::new(82, 0, 164));
        assert_eq!(base.mix(Rgb::WHITE, 0.0), base);
        assert_eq!(base.mix(Rgb::WHITE, 1.0), Rgb::WHITE);
    }

    #[test]
    fn test_uniform_cluster_uses_category_color() {
        let color = cluster_color([SiteType::Natural, SiteType::Natural]);
        assert_eq!(color, category_style(SiteType::Natural).color);
    }

    #[test]
    fn test_plurality_wins() {
        let color = cluster_color([
            SiteType::Cultural,
            SiteType::Natural,
            SiteType::Cultural,
            SiteType::Cultural,
        ]);
        assert_eq!(color, category_style(SiteType::Cultural).color);

        let color = cluster_color([SiteType::Cultural, SiteType::Mixed, SiteType::Mixed]);
        assert_eq!(color, category_style(SiteType::Mixed).color);
    }

    #[test]
    fn test_ties_follow_category_order() {
        let color = cluster_color([SiteType::Mixed, SiteType::Natural]);
        assert_eq!(color, category_style(SiteType::Natural).color);
    }

    #[test]
    fn test_empty_cluster_is_neutral() {
        assert_eq!(cluster_color([]), NEUTRAL_COLOR);
    }

    #[test]
    fn test_cluster_icon_layers() {
        let icon = cluster_icon(&[SiteType::Cultural; 12]);
        let fill = category_style(SiteType::Cultural).color;

        assert_eq!(icon.fill, fill);
        assert_eq!(icon.ring, fill.lighten(LIGHTEN_FACTOR));
        assert_eq!(icon.border, fill.darken(DARKEN_FACTOR));
        assert_eq!(icon.size, ClusterSize::Medium);
        assert!(icon.html.contains("<span>12</span>"));
        assert!(icon.class_name.contains("heritage-cluster-medium"));
    }
}
