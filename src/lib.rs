//! Camera control coordination core for the map client.
//!
//! One viewport (center, zoom, pitch, heading, padding) is driven by several
//! independent producers: live-location following, turn-by-turn navigation,
//! pan gestures, drawers that want exclusive framing, and one-shot fly-to
//! requests. This crate decides whose update wins and what that update should
//! be. Rendering, geocoding and drawer presentation stay with the host, which
//! reaches the core through [`engine::CameraCore`] and the traits in
//! [`surface`].
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Top-level [`engine::CameraCore`] context wiring every controller |
//! | [`store`] | Viewport state store and its single mutation entry point |
//! | [`arbitration`] | Ownership claim, animation lock, and the arbitration table |
//! | [`queue`] | Requests buffered until the surface is ready |
//! | [`camera`] | Camera state, patches, and surface commands |
//! | [`controller`] | Closed set of controller identities |
//! | [`navigation`] | Pitch/zoom policy for turn-by-turn guidance |
//! | [`follow`] | Follow-location debouncing |
//! | [`heading`] | Compass throttling and wraparound |
//! | [`gesture`] | Manual pan handling and the recenter countdown |
//! | [`bounds`] | Bounds-fit zoom ladder with padding correction |
//! | [`geo`] | Coordinates, padding, and angle helpers |
//! | [`surface`] | Collaborator traits (rendering surface, zoom advisor) |
//! | [`config`] | Tunables with environment overrides |
//! | [`replay`] | JSON-lines event scripts for the `mapcam` binary |

pub mod arbitration;
pub mod bounds;
pub mod camera;
pub mod config;
pub mod controller;
pub mod engine;
pub mod follow;
pub mod geo;
pub mod gesture;
pub mod heading;
pub mod navigation;
pub mod queue;
pub mod replay;
pub mod store;
pub mod surface;
