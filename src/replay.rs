//! JSON-lines event scripts for exercising a [`CameraCore`] outside the app.
//!
//! Each non-blank line is one object with a millisecond offset and an event
//! tag, e.g. `{"at_ms": 120, "event": "location", "lat": 52.5, "lon": 13.4}`.
//! Lines starting with `#` are comments. Events are dispatched in file order;
//! between them the driver fires every core deadline (queued replay, recenter
//! countdown) that falls due, so a script sees the same timing the host's
//! event loop would produce.

#[cfg(test)]
#[path = "replay_test.rs"]
mod replay_test;

use std::io::{self, BufRead, Write};
use std::time::{Duration, Instant};

use serde::Deserialize;
use tracing::{debug, info};

use crate::camera::SurfaceCommand;
use crate::controller::{ControllerId, Drawer};
use crate::engine::CameraCore;
use crate::geo::Coordinate;
use crate::heading::HeadingMode;
use crate::navigation::TravelMode;
use crate::surface::{CameraSurface, ZoomAdvisor};

const DEFAULT_FIT_DURATION_MS: u64 = 1000;

#[derive(Debug, thiserror::Error)]
pub enum ReplayError {
    #[error("script I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("script line {line}: {source}")]
    Json {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// One timestamped script entry.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ScriptLine {
    /// Offset from the start of the run.
    pub at_ms: u64,
    #[serde(flatten)]
    pub event: ScriptEvent,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ScriptEvent {
    Location {
        lat: f64,
        lon: f64,
    },
    Heading {
        degrees: f64,
    },
    HeadingMode {
        mode: HeadingMode,
    },
    Pan,
    Recenter,
    Claim {
        drawer: Drawer,
    },
    Release {
        #[serde(default)]
        drawer: Option<Drawer>,
    },
    Padding {
        bottom_px: f64,
    },
    SurfaceReady,
    /// Start a session in `mode`, or stop the current one when absent.
    Navigate {
        #[serde(default)]
        mode: Option<TravelMode>,
    },
    Step {
        #[serde(default)]
        distance_m: Option<f64>,
        #[serde(default)]
        heading: Option<f64>,
    },
    Fit {
        points: Vec<Coordinate>,
        #[serde(default = "default_fit_duration")]
        duration_ms: u64,
        #[serde(default)]
        route: bool,
    },
    FlyTo {
        lat: f64,
        lon: f64,
        zoom: f64,
        duration_ms: u64,
        #[serde(default)]
        pitch: Option<f64>,
    },
}

fn default_fit_duration() -> u64 {
    DEFAULT_FIT_DURATION_MS
}

/// Parse a whole script. Blank and `#` lines are skipped; line numbers in
/// errors are 1-based.
pub fn parse_script<R: BufRead>(reader: R) -> Result<Vec<ScriptLine>, ReplayError> {
    let mut lines = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let parsed = serde_json::from_str::<ScriptLine>(trimmed)
            .map_err(|source| ReplayError::Json { line: index + 1, source })?;
        lines.push(parsed);
    }
    Ok(lines)
}

/// How the driver treats script offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pace {
    /// Run as fast as possible on a virtual clock.
    Virtual,
    /// Sleep so events land at their wall-clock offsets.
    Realtime,
}

impl Pace {
    async fn wait_until(self, at: Instant) {
        if self == Self::Realtime {
            tokio::time::sleep_until(tokio::time::Instant::from_std(at)).await;
        }
    }
}

/// Drive `core` through `script`, then let every outstanding deadline fire.
pub async fn run_script<S, A>(core: &mut CameraCore<S, A>, script: &[ScriptLine], pace: Pace)
where
    S: CameraSurface,
    A: ZoomAdvisor,
{
    let start = Instant::now();
    for line in script {
        let at = start + Duration::from_millis(line.at_ms);
        fire_deadlines(core, Some(at), pace).await;
        pace.wait_until(at).await;
        dispatch(core, &line.event, at);
    }
    fire_deadlines(core, None, pace).await;
    info!(events = script.len(), "script finished");
}

async fn fire_deadlines<S, A>(core: &mut CameraCore<S, A>, until: Option<Instant>, pace: Pace)
where
    S: CameraSurface,
    A: ZoomAdvisor,
{
    while let Some(deadline) = core.next_deadline() {
        if until.is_some_and(|limit| deadline > limit) {
            break;
        }
        pace.wait_until(deadline).await;
        core.tick_at(deadline);
    }
}

/// Route one event into the core at `now`.
pub fn dispatch<S, A>(core: &mut CameraCore<S, A>, event: &ScriptEvent, now: Instant)
where
    S: CameraSurface,
    A: ZoomAdvisor,
{
    debug!(?event, "script event");
    match event {
        ScriptEvent::Location { lat, lon } => {
            core.on_location_at(Coordinate::new(*lat, *lon), now);
        }
        ScriptEvent::Heading { degrees } => {
            core.on_heading_at(*degrees, now);
        }
        ScriptEvent::HeadingMode { mode } => {
            core.set_heading_mode_at(*mode, now);
        }
        ScriptEvent::Pan => {
            core.on_map_pan_drag_at(now);
        }
        ScriptEvent::Recenter => {
            core.manual_recenter_at(now);
        }
        ScriptEvent::Claim { drawer } => core.claim_at(ControllerId::Drawer(*drawer), now),
        ScriptEvent::Release { drawer } => {
            core.release_at(drawer.map(ControllerId::Drawer), now);
        }
        ScriptEvent::Padding { bottom_px } => {
            core.set_drawer_padding_at(*bottom_px, now);
        }
        ScriptEvent::SurfaceReady => core.on_surface_ready_at(now),
        ScriptEvent::Navigate { mode: Some(mode) } => core.start_navigation(*mode),
        ScriptEvent::Navigate { mode: None } => {
            core.stop_navigation();
        }
        ScriptEvent::Step { distance_m, heading } => {
            core.on_navigation_step_at(*distance_m, *heading, now);
        }
        ScriptEvent::Fit { points, duration_ms, route: false } => {
            core.fit_to_coordinates_at(points, None, *duration_ms, now);
        }
        ScriptEvent::Fit { points, duration_ms, route: true } => {
            core.fit_route_at(points, None, *duration_ms, now);
        }
        ScriptEvent::FlyTo { lat, lon, zoom, duration_ms, pitch } => {
            core.animate_locked_at(Coordinate::new(*lat, *lon), *zoom, *duration_ms, *pitch, now);
        }
    }
}

// =============================================================================
// OUTPUT
// =============================================================================

/// Surface that writes every command as one JSON line.
///
/// [`CameraSurface::set_camera`] cannot fail, so the first write error is kept
/// and later commands are dropped; [`JsonLinesSurface::finish`] reports it.
pub struct JsonLinesSurface<W: Write> {
    out: W,
    written: usize,
    error: Option<io::Error>,
}

impl<W: Write> JsonLinesSurface<W> {
    #[must_use]
    pub fn new(out: W) -> Self {
        Self { out, written: 0, error: None }
    }

    #[must_use]
    pub fn written(&self) -> usize {
        self.written
    }

    /// Flush and hand back the writer, or the first error seen.
    pub fn finish(mut self) -> Result<W, ReplayError> {
        if let Some(err) = self.error.take() {
            return Err(err.into());
        }
        self.out.flush()?;
        Ok(self.out)
    }
}

impl<W: Write> CameraSurface for JsonLinesSurface<W> {
    fn set_camera(&mut self, command: &SurfaceCommand) {
        if self.error.is_some() {
            return;
        }
        let result = serde_json::to_writer(&mut self.out, command)
            .map_err(io::Error::from)
            .and_then(|()| self.out.write_all(b"\n"));
        match result {
            Ok(()) => self.written += 1,
            Err(err) => self.error = Some(err),
        }
    }
}
