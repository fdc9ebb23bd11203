//! Collaborator seams: the rendering surface and the zoom advisor.
//!
//! The core never renders or geocodes. It pushes committed camera changes
//! through [`CameraSurface`] and asks a [`ZoomAdvisor`] for a starting zoom
//! when it first recenters on the user.

#[cfg(test)]
#[path = "surface_test.rs"]
mod surface_test;

use crate::camera::SurfaceCommand;
use crate::geo::Coordinate;

/// Imperative handle to the visual map.
pub trait CameraSurface {
    /// Apply a partial camera configuration. Absent fields stay as they are.
    fn set_camera(&mut self, command: &SurfaceCommand);
}

/// Suggests a zoom suited to the road or settlement class around a point.
pub trait ZoomAdvisor {
    /// `None` when no suggestion is available; the core falls back to its default.
    fn suggested_zoom(&self, at: Coordinate) -> Option<f64>;
}

/// Advisor that never has a suggestion.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAdvisor;

impl ZoomAdvisor for NoAdvisor {
    fn suggested_zoom(&self, _at: Coordinate) -> Option<f64> {
        None
    }
}

/// Surface that keeps every command it receives, in order.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    commands: Vec<SurfaceCommand>,
}

impl RecordingSurface {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn commands(&self) -> &[SurfaceCommand] {
        &self.commands
    }

    /// Hand over everything recorded so far and start afresh.
    pub fn take(&mut self) -> Vec<SurfaceCommand> {
        std::mem::take(&mut self.commands)
    }
}

impl CameraSurface for RecordingSurface {
    fn set_camera(&mut self, command: &SurfaceCommand) {
        self.commands.push(*command);
    }
}
