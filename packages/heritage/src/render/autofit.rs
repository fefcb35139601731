//! Auto-fit policy: whether the next render frames the camera on the markers.

use tracing::debug;

/// What happened to the view, from the policy's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoFitEvent {
    /// The user panned or zoomed.
    UserGesture,
    /// A filter control changed.
    FilterAction,
    /// A dataset load (or retry) completed.
    FreshFetch,
}

/// Explicit state for the auto-fit rule.
///
/// `enabled` survives renders; only a user gesture turns it off. While a
/// programmatic fit is animating, gestures reported by the widget are the
/// fit's own move events and are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AutoFitPolicy {
    enabled: bool,
    in_flight: bool,
}

impl AutoFitPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// True between [`begin_fit`](Self::begin_fit) and the next move-end.
    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn apply(&mut self, event: AutoFitEvent) {
        match event {
            AutoFitEvent::UserGesture if self.in_flight => {
                debug!("ignoring gesture during programmatic fit");
            }
            AutoFitEvent::UserGesture => {
                if self.enabled {
                    debug!("auto-fit disabled by user gesture");
                }
                self.enabled = false;
            }
            AutoFitEvent::FilterAction | AutoFitEvent::FreshFetch => {
                self.enabled = true;
            }
        }
    }

    /// Whether a render with `marker_count` markers should fit the camera.
    pub fn should_fit(&self, marker_count: usize) -> bool {
        self.enabled && marker_count > 0
    }

    pub fn begin_fit(&mut self) {
        self.in_flight = true;
    }

    pub fn end_fit(&mut self) {
        self.in_flight = false;
    }
}
