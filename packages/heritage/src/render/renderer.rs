//! Map renderer - drives a [`MapWidget`] from the filtered site list.
//!
//! Holds the interaction state that outlives a single render: the auto-fit
//! policy, hover and popup state, the image cache and the one pending
//! move-end continuation.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::autofit::{AutoFitEvent, AutoFitPolicy};
use super::images::{cached_panel, load_panel, ImageCache};
use super::popup::{build_popup_content, tooltip_html, ImagePanel};
use super::style::{cluster_icon, marker_icon_html};
use super::viewport::{popup_translation, safe_rect};
use crate::traits::images::ImageResolver;
use crate::traits::map::{ClusterId, MapEvent, MapWidget, MarkerId, MarkerSpec};
use crate::types::config::MapConfig;
use crate::types::geo::{LatLng, LatLngBounds};
use crate::types::site::Site;

/// Why the marker set is being rebuilt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RenderReason {
    /// Year, type or search changed.
    Filter,
    /// The dataset was (re)loaded.
    FreshFetch,
}

impl From<RenderReason> for AutoFitEvent {
    fn from(reason: RenderReason) -> Self {
        match reason {
            RenderReason::Filter => AutoFitEvent::FilterAction,
            RenderReason::FreshFetch => AutoFitEvent::FreshFetch,
        }
    }
}

/// One-shot work to run on the next move-end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveEndAction {
    /// The auto-fit camera move finished.
    EndAutoFit,
    /// Re-expand the cluster the popup's marker came from.
    Respiderfy { cluster: ClusterId, marker: MarkerId },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HoverState {
    #[default]
    Idle,
    Hovered(MarkerId),
}

/// An open popup and what its media area shows.
#[derive(Debug, Clone, PartialEq)]
pub struct OpenPopup {
    pub marker: MarkerId,
    pub site: Arc<Site>,
    pub panel: ImagePanel,
    /// Viewport placement has been checked (and the camera moved if needed).
    pub adjusted: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum PopupState {
    #[default]
    Closed,
    Open(OpenPopup),
}

pub struct MapRenderer<W: MapWidget> {
    widget: W,
    config: MapConfig,
    auto_fit: AutoFitPolicy,
    markers: HashMap<MarkerId, Arc<Site>>,
    hover: HoverState,
    popup: PopupState,
    pending: Option<MoveEndAction>,
    suppress_center: Option<MarkerId>,
    images: ImageCache,
}

impl<W: MapWidget> MapRenderer<W> {
    /// Take over the widget: show the initial view and install the cluster
    /// icon factory.
    pub fn new(mut widget: W, config: MapConfig) -> Self {
        widget.set_view(config.initial_center, config.initial_zoom);
        widget.set_cluster_icon_factory(cluster_icon);
        Self {
            widget,
            config,
            auto_fit: AutoFitPolicy::new(),
            markers: HashMap::new(),
            hover: HoverState::Idle,
            popup: PopupState::Closed,
            pending: None,
            suppress_center: None,
            images: ImageCache::new(),
        }
    }

    pub fn widget(&self) -> &W {
        &self.widget
    }

    pub fn widget_mut(&mut self) -> &mut W {
        &mut self.widget
    }

    pub fn auto_fit(&self) -> &AutoFitPolicy {
        &self.auto_fit
    }

    pub fn hover(&self) -> HoverState {
        self.hover
    }

    pub fn popup(&self) -> &PopupState {
        &self.popup
    }

    pub fn pending(&self) -> Option<MoveEndAction> {
        self.pending
    }

    pub fn image_cache(&self) -> &ImageCache {
        &self.images
    }

    pub fn marker_count(&self) -> usize {
        self.markers.len()
    }

    /// Marker currently showing `site_id`.
    pub fn marker_for_site(&self, site_id: &str) -> Option<MarkerId> {
        self.markers
            .iter()
            .find(|(_, site)| site.id == site_id)
            .map(|(id, _)| *id)
    }

    /// Replace every marker with one per site and fit the camera if the
    /// auto-fit policy allows it.
    pub fn render(&mut self, sites: &[Arc<Site>], reason: RenderReason) {
        self.auto_fit.apply(reason.into());

        if reason == RenderReason::Filter
            && matches!(self.pending, Some(MoveEndAction::Respiderfy { .. }))
        {
            self.pending = None;
        }

        self.widget.clear_markers();
        self.markers.clear();
        self.hover = HoverState::Idle;
        self.popup = PopupState::Closed;
        self.suppress_center = None;

        for site in sites {
            let panel = cached_panel(&self.images, site).unwrap_or(ImagePanel::Loading);
            let spec = MarkerSpec {
                site_id: site.id.clone(),
                position: LatLng::new(site.latitude, site.longitude),
                category: site.site_type,
                icon_html: marker_icon_html(site.site_type),
                tooltip_html: tooltip_html(site),
                popup_html: build_popup_content(site, &panel),
            };
            let id = self.widget.add_marker(spec);
            self.markers.insert(id, Arc::clone(site));
        }

        debug!(markers = sites.len(), ?reason, "rendered markers");

        if !self.auto_fit.should_fit(sites.len()) {
            return;
        }
        let bounds = LatLngBounds::from_points(
            sites
                .iter()
                .map(|site| LatLng::new(site.latitude, site.longitude)),
        );
        if let Some(bounds) = bounds {
            self.schedule(Some(MoveEndAction::EndAutoFit));
            self.auto_fit.begin_fit();
            self.widget.fit_bounds(bounds, self.config.fit_padding);
        }
    }

    /// Feed a widget event through the hover, popup and camera state.
    pub fn handle_event(&mut self, event: MapEvent) {
        match event {
            MapEvent::MoveStart | MapEvent::ZoomStart => {
                self.auto_fit.apply(AutoFitEvent::UserGesture);
                self.suppress_center = None;
            }
            MapEvent::MoveEnd => self.run_move_end(),
            MapEvent::MarkerOver(marker) => {
                if self.markers.contains_key(&marker) {
                    self.hover = HoverState::Hovered(marker);
                }
            }
            MapEvent::MarkerOut(marker) => {
                if self.hover == HoverState::Hovered(marker) {
                    self.hover = HoverState::Idle;
                }
            }
            MapEvent::PopupClosed(marker) => {
                if matches!(&self.popup, PopupState::Open(open) if open.marker == marker) {
                    self.popup = PopupState::Closed;
                }
            }
        }
    }

    /// Open the popup for `marker`, load its images and keep it on screen.
    ///
    /// Returns `false` for an unknown marker.
    pub async fn open_popup<R>(&mut self, marker: MarkerId, resolver: &R) -> bool
    where
        R: ImageResolver + ?Sized,
    {
        let Some(site) = self.markers.get(&marker).cloned() else {
            return false;
        };

        let initial = cached_panel(&self.images, &site).unwrap_or(ImagePanel::Loading);
        let loading = initial == ImagePanel::Loading;
        self.show_popup(marker, Arc::clone(&site), initial);

        if loading {
            let panel = load_panel(resolver, &mut self.images, &site).await;
            if !matches!(&self.popup, PopupState::Open(open) if open.marker == marker) {
                debug!(site_id = %site.id, "popup closed before images resolved");
                return true;
            }
            self.show_popup(marker, Arc::clone(&site), panel);
        }

        self.adjust_viewport(marker);
        true
    }

    pub fn close_popup(&mut self) {
        self.popup = PopupState::Closed;
    }

    /// Activate a carousel slide in the open popup.
    pub fn select_slide(&mut self, index: usize) -> bool {
        self.update_carousel(|carousel| carousel.select(index))
    }

    /// Swap a slide whose image failed to load for the placeholder.
    pub fn mark_slide_broken(&mut self, index: usize) -> bool {
        self.update_carousel(|carousel| carousel.mark_broken(index))
    }

    fn update_carousel<F>(&mut self, update: F) -> bool
    where
        F: FnOnce(&mut super::popup::Carousel) -> bool,
    {
        let PopupState::Open(open) = &mut self.popup else {
            return false;
        };
        let Some(carousel) = open.panel.carousel_mut() else {
            return false;
        };
        if !update(carousel) {
            return false;
        }
        let html = build_popup_content(&open.site, &open.panel);
        self.widget.set_popup_content(open.marker, &html);
        true
    }

    fn show_popup(&mut self, marker: MarkerId, site: Arc<Site>, panel: ImagePanel) {
        let html = build_popup_content(&site, &panel);
        self.widget.set_popup_content(marker, &html);
        self.popup = PopupState::Open(OpenPopup {
            marker,
            site,
            panel,
            adjusted: false,
        });
    }

    fn adjust_viewport(&mut self, marker: MarkerId) {
        // Suppression covers only the popup reopened by the re-expansion.
        if self.suppress_center.take() != Some(marker) {
            self.center_popup(marker);
        }

        if let PopupState::Open(open) = &mut self.popup {
            open.adjusted = true;
        }
    }

    fn center_popup(&mut self, marker: MarkerId) {
        let Some(popup) = self.widget.popup_rect(marker) else {
            return;
        };
        let container = self.widget.container_size();
        let safe = safe_rect(
            container,
            self.config.overlay_height,
            self.config.popup_padding,
        );
        let shift = popup_translation(&popup, &safe);
        if shift.is_zero() {
            return;
        }

        let target = self
            .widget
            .container_point_to_lat_lng(container.center() - shift);
        let continuation = self
            .widget
            .spiderfied_cluster(marker)
            .map(|cluster| MoveEndAction::Respiderfy { cluster, marker });

        debug!(
            marker = marker.0,
            dx = shift.x,
            dy = shift.y,
            respiderfy = continuation.is_some(),
            "moving camera to fit popup"
        );

        self.schedule(continuation);
        let zoom = self.widget.zoom();
        self.widget.fly_to(target, zoom);
    }

    fn schedule(&mut self, action: Option<MoveEndAction>) {
        if self.pending == Some(MoveEndAction::EndAutoFit) {
            self.auto_fit.end_fit();
        }
        self.pending = action;
    }

    fn run_move_end(&mut self) {
        match self.pending.take() {
            Some(MoveEndAction::EndAutoFit) => {
                self.auto_fit.end_fit();
            }
            Some(MoveEndAction::Respiderfy { cluster, marker }) => {
                info!(cluster = cluster.0, marker = marker.0, "re-expanding cluster");
                self.suppress_center = Some(marker);
                self.widget.spiderfy(cluster);
            }
            None => {}
        }
    }
}
