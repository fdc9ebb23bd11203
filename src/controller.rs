//! Identities of the producers that compete for the camera.
//!
//! Arbitration compares these values instead of free-form strings, so every
//! producer is one of a closed, compiler-checked set.

#[cfg(test)]
#[path = "controller_test.rs"]
mod controller_test;

use std::fmt;

use serde::{Deserialize, Serialize};

/// Bottom sheets that may claim exclusive framing while presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Drawer {
    Parking,
    PlaceDetails,
    Search,
    RoutePreview,
}

/// Who is asking to move the camera.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "drawer")]
pub enum ControllerId {
    /// Turn-by-turn step camera.
    Navigation,
    /// Live-location following.
    Follow,
    /// Compass / bearing rotation.
    Heading,
    /// Manual pan and recenter.
    Gesture,
    /// Fly-to and bounds-fit requests.
    OneShot,
    /// A presented drawer.
    Drawer(Drawer),
}

impl ControllerId {
    /// Whether this identity belongs to a drawer (the only claimants in practice).
    #[must_use]
    pub fn is_drawer(self) -> bool {
        matches!(self, Self::Drawer(_))
    }
}

impl fmt::Display for Drawer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Parking => "parking",
            Self::PlaceDetails => "place_details",
            Self::Search => "search",
            Self::RoutePreview => "route_preview",
        };
        f.write_str(name)
    }
}

impl fmt::Display for ControllerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Navigation => f.write_str("navigation"),
            Self::Follow => f.write_str("follow"),
            Self::Heading => f.write_str("heading"),
            Self::Gesture => f.write_str("gesture"),
            Self::OneShot => f.write_str("one_shot"),
            Self::Drawer(drawer) => write!(f, "drawer:{drawer}"),
        }
    }
}
