//! Camera state, partial update patches, and commands for the rendering surface.
//!
//! A [`CameraPatch`] is what a producer asks for; every field is optional so
//! "absent" and "present but equal" stay distinct. [`CameraState::diff`] turns
//! a patch into a [`SurfaceCommand`] holding only the fields that moved past
//! their [`DeadZone`], and [`CameraState::commit`] folds that command back into
//! the canonical state.

#[cfg(test)]
#[path = "camera_test.rs"]
mod camera_test;

use serde::{Deserialize, Serialize};

use crate::geo::{Coordinate, Padding, normalize_heading, shortest_delta};

/// Zoom before anything has framed the map.
pub const DEFAULT_ZOOM: f64 = 14.0;

/// Canonical camera state. Owned by the viewport store and never assigned
/// directly by controllers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraState {
    /// Absent until the first center lands.
    pub center: Option<Coordinate>,
    pub zoom: f64,
    pub pitch: f64,
    /// Stored in `[0, 360)`.
    pub heading: f64,
    pub padding: Padding,
}

impl Default for CameraState {
    fn default() -> Self {
        Self { center: None, zoom: DEFAULT_ZOOM, pitch: 0.0, heading: 0.0, padding: Padding::default() }
    }
}

/// A producer's requested change. Absent fields are left untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CameraPatch {
    #[serde(default)]
    pub center: Option<Coordinate>,
    #[serde(default)]
    pub zoom: Option<f64>,
    #[serde(default)]
    pub pitch: Option<f64>,
    /// May lie outside `[0, 360)` so the surface rotates the short way.
    #[serde(default)]
    pub heading: Option<f64>,
    #[serde(default)]
    pub animation_duration_ms: Option<u64>,
}

impl CameraPatch {
    #[must_use]
    pub fn centered(center: Coordinate) -> Self {
        Self { center: Some(center), ..Self::default() }
    }

    #[must_use]
    pub fn heading(heading: f64) -> Self {
        Self { heading: Some(heading), ..Self::default() }
    }

    #[must_use]
    pub fn with_zoom(mut self, zoom: f64) -> Self {
        self.zoom = Some(zoom);
        self
    }

    #[must_use]
    pub fn with_pitch(mut self, pitch: f64) -> Self {
        self.pitch = Some(pitch);
        self
    }

    #[must_use]
    pub fn with_heading(mut self, heading: f64) -> Self {
        self.heading = Some(heading);
        self
    }

    #[must_use]
    pub fn with_duration(mut self, ms: u64) -> Self {
        self.animation_duration_ms = Some(ms);
        self
    }

    /// Every present numeric field is finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.center.is_none_or(|c| c.is_finite())
            && self.zoom.is_none_or(f64::is_finite)
            && self.pitch.is_none_or(f64::is_finite)
            && self.heading.is_none_or(f64::is_finite)
    }

    /// No camera field is present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.center.is_none() && self.zoom.is_none() && self.pitch.is_none() && self.heading.is_none()
    }
}

/// Minimum change per field before it counts as a change.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeadZone {
    /// Per axis, in degrees (~10 m at 0.0001).
    pub center_deg: f64,
    pub zoom: f64,
    pub pitch_deg: f64,
    pub heading_deg: f64,
}

impl Default for DeadZone {
    fn default() -> Self {
        Self { center_deg: 0.0001, zoom: 0.1, pitch_deg: 0.1, heading_deg: 1.0 }
    }
}

/// Partial camera configuration pushed to the rendering surface.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SurfaceCommand {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub center: Option<Coordinate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zoom: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pitch: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heading: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub padding: Option<Padding>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub animation_duration_ms: Option<u64>,
}

impl SurfaceCommand {
    /// Forward every field of a patch as-is (used when replaying queued requests).
    #[must_use]
    pub fn from_patch(patch: &CameraPatch) -> Self {
        Self {
            center: patch.center,
            zoom: patch.zoom,
            pitch: patch.pitch,
            heading: patch.heading,
            padding: None,
            animation_duration_ms: patch.animation_duration_ms,
        }
    }

    #[must_use]
    pub fn padding(padding: Padding) -> Self {
        Self { padding: Some(padding), ..Self::default() }
    }

    /// No camera or padding field is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.center.is_none()
            && self.zoom.is_none()
            && self.pitch.is_none()
            && self.heading.is_none()
            && self.padding.is_none()
    }
}

impl CameraState {
    /// Fields of `patch` that differ from this state by more than the dead zone.
    ///
    /// The heading is compared along the shortest arc, so `370` against a
    /// stored `10` is no change at all.
    #[must_use]
    pub fn diff(&self, patch: &CameraPatch, dead_zone: &DeadZone) -> SurfaceCommand {
        let center = patch.center.filter(|next| match self.center {
            None => true,
            Some(current) => {
                let (d_lat, d_lon) = current.axis_delta(*next);
                d_lat > dead_zone.center_deg || d_lon > dead_zone.center_deg
            }
        });
        let zoom = patch.zoom.filter(|z| (z - self.zoom).abs() > dead_zone.zoom);
        let pitch = patch.pitch.filter(|p| (p - self.pitch).abs() > dead_zone.pitch_deg);
        let heading = patch
            .heading
            .filter(|h| shortest_delta(self.heading, *h).abs() > dead_zone.heading_deg);

        let mut command = SurfaceCommand { center, zoom, pitch, heading, ..SurfaceCommand::default() };
        if !command.is_empty() {
            command.animation_duration_ms = patch.animation_duration_ms;
        }
        command
    }

    /// Fold a command into the state, normalising the heading for storage.
    pub fn commit(&mut self, command: &SurfaceCommand) {
        if let Some(center) = command.center {
            self.center = Some(center);
        }
        if let Some(zoom) = command.zoom {
            self.zoom = zoom;
        }
        if let Some(pitch) = command.pitch {
            self.pitch = pitch;
        }
        if let Some(heading) = command.heading {
            self.heading = normalize_heading(heading);
        }
        if let Some(padding) = command.padding {
            self.padding = padding;
        }
    }
}
