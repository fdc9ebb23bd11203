//! Camera tunables with environment overrides.
//!
//! `CameraConfig::default()` carries the tuned values. `from_env` overlays
//! `MAPCAM_*` variables; a variable that is set but unparsable or negative is
//! an error rather than a silent fallback.
//!
//! Optional overrides:
//! - `MAPCAM_LOCK_MARGIN_MS`, `MAPCAM_CLAIM_TTL_MS`, `MAPCAM_QUEUE_STAGGER_MS`
//! - `MAPCAM_RECENTER_DELAY_MS`, `MAPCAM_RECENTER_ZOOM`, `MAPCAM_SNAP_DURATION_MS`
//! - `MAPCAM_NAVIGATION_DURATION_MS`
//! - `MAPCAM_ROUTE_ZOOM_BOOST`, `MAPCAM_ROUTE_ZOOM_CAP`
//! - `MAPCAM_FOLLOW_{DRIVING,WALKING}_DISTANCE_DEG`, `MAPCAM_FOLLOW_{DRIVING,WALKING}_INTERVAL_MS`
//! - `MAPCAM_HEADING_{DRIVING,WALKING}_THROTTLE_MS`, `MAPCAM_HEADING_{DRIVING,WALKING}_DEADZONE_DEG`

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::time::Duration;

use crate::bounds::ZoomLadder;
use crate::camera::DeadZone;
use crate::navigation::TravelMode;

pub const DEFAULT_LOCK_MARGIN_MS: u64 = 1000;
pub const DEFAULT_CLAIM_TTL_MS: u64 = 60_000;
pub const DEFAULT_QUEUE_STAGGER_MS: u64 = 50;
pub const DEFAULT_RECENTER_DELAY_MS: u64 = 5000;
pub const DEFAULT_RECENTER_ZOOM: f64 = 16.0;
pub const DEFAULT_SNAP_DURATION_MS: u64 = 800;
pub const DEFAULT_NAVIGATION_DURATION_MS: u64 = 1000;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

/// A pair of settings, one for driving and one for walking or idle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ByMode<T> {
    pub driving: T,
    pub walking: T,
}

impl<T: Copy> ByMode<T> {
    #[must_use]
    pub fn get(&self, mode: TravelMode) -> T {
        match mode {
            TravelMode::Driving => self.driving,
            TravelMode::Walking => self.walking,
        }
    }
}

/// Follow-location debounce and animation per motion profile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FollowTuning {
    /// Per-axis movement below which a tick may be skipped, in degrees.
    pub distance_deg: f64,
    /// Minimum time between accepted ticks when movement is small.
    pub min_interval: Duration,
    pub animation_ms: u64,
}

/// Compass throttle and dead-zone per motion profile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeadingTuning {
    pub throttle: Duration,
    pub dead_zone_deg: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CameraConfig {
    pub dead_zone: DeadZone,
    /// Added to every locked animation's duration.
    pub lock_margin: Duration,
    /// Longest an exclusive claim survives without being renewed.
    pub claim_ttl: Duration,
    /// Gap between replayed pending requests.
    pub queue_stagger: Duration,
    pub follow: ByMode<FollowTuning>,
    pub heading: ByMode<HeadingTuning>,
    /// Quiet period after a pan before navigation snaps back.
    pub recenter_delay: Duration,
    /// Recenter zoom used when the advisor has no suggestion.
    pub recenter_zoom: f64,
    pub snap_duration_ms: u64,
    pub navigation_duration_ms: u64,
    pub ladder: ZoomLadder,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            dead_zone: DeadZone::default(),
            lock_margin: Duration::from_millis(DEFAULT_LOCK_MARGIN_MS),
            claim_ttl: Duration::from_millis(DEFAULT_CLAIM_TTL_MS),
            queue_stagger: Duration::from_millis(DEFAULT_QUEUE_STAGGER_MS),
            follow: ByMode {
                driving: FollowTuning {
                    distance_deg: 0.00005,
                    min_interval: Duration::from_millis(200),
                    animation_ms: 300,
                },
                walking: FollowTuning {
                    distance_deg: 0.0001,
                    min_interval: Duration::from_millis(1000),
                    animation_ms: 1000,
                },
            },
            heading: ByMode {
                driving: HeadingTuning { throttle: Duration::from_millis(100), dead_zone_deg: 2.0 },
                walking: HeadingTuning { throttle: Duration::from_millis(250), dead_zone_deg: 5.0 },
            },
            recenter_delay: Duration::from_millis(DEFAULT_RECENTER_DELAY_MS),
            recenter_zoom: DEFAULT_RECENTER_ZOOM,
            snap_duration_ms: DEFAULT_SNAP_DURATION_MS,
            navigation_duration_ms: DEFAULT_NAVIGATION_DURATION_MS,
            ladder: ZoomLadder::default(),
        }
    }
}

impl CameraConfig {
    /// Defaults overlaid with `MAPCAM_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| match std::env::var(key) {
            Ok(value) => Some(value),
            Err(_) => None,
        })
    }

    /// Defaults overlaid with whatever `lookup` returns for each known key.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();
        let env = Overlay { lookup: &lookup };

        env.millis("MAPCAM_LOCK_MARGIN_MS", &mut cfg.lock_margin)?;
        env.millis("MAPCAM_CLAIM_TTL_MS", &mut cfg.claim_ttl)?;
        env.millis("MAPCAM_QUEUE_STAGGER_MS", &mut cfg.queue_stagger)?;
        env.millis("MAPCAM_RECENTER_DELAY_MS", &mut cfg.recenter_delay)?;
        env.number("MAPCAM_RECENTER_ZOOM", &mut cfg.recenter_zoom)?;
        env.count("MAPCAM_SNAP_DURATION_MS", &mut cfg.snap_duration_ms)?;
        env.count("MAPCAM_NAVIGATION_DURATION_MS", &mut cfg.navigation_duration_ms)?;
        env.number("MAPCAM_ROUTE_ZOOM_BOOST", &mut cfg.ladder.route_boost)?;
        env.number("MAPCAM_ROUTE_ZOOM_CAP", &mut cfg.ladder.route_cap)?;

        env.number("MAPCAM_FOLLOW_DRIVING_DISTANCE_DEG", &mut cfg.follow.driving.distance_deg)?;
        env.number("MAPCAM_FOLLOW_WALKING_DISTANCE_DEG", &mut cfg.follow.walking.distance_deg)?;
        env.millis("MAPCAM_FOLLOW_DRIVING_INTERVAL_MS", &mut cfg.follow.driving.min_interval)?;
        env.millis("MAPCAM_FOLLOW_WALKING_INTERVAL_MS", &mut cfg.follow.walking.min_interval)?;

        env.millis("MAPCAM_HEADING_DRIVING_THROTTLE_MS", &mut cfg.heading.driving.throttle)?;
        env.millis("MAPCAM_HEADING_WALKING_THROTTLE_MS", &mut cfg.heading.walking.throttle)?;
        env.number("MAPCAM_HEADING_DRIVING_DEADZONE_DEG", &mut cfg.heading.driving.dead_zone_deg)?;
        env.number("MAPCAM_HEADING_WALKING_DEADZONE_DEG", &mut cfg.heading.walking.dead_zone_deg)?;

        Ok(cfg)
    }
}

struct Overlay<'a, F> {
    lookup: &'a F,
}

impl<F> Overlay<'_, F>
where
    F: Fn(&str) -> Option<String>,
{
    fn count(&self, key: &'static str, target: &mut u64) -> Result<(), ConfigError> {
        if let Some(raw) = (self.lookup)(key) {
            *target = raw
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::Invalid { key, value: raw.clone() })?;
        }
        Ok(())
    }

    fn millis(&self, key: &'static str, target: &mut Duration) -> Result<(), ConfigError> {
        let mut ms = u64::try_from(target.as_millis()).unwrap_or(u64::MAX);
        self.count(key, &mut ms)?;
        *target = Duration::from_millis(ms);
        Ok(())
    }

    fn number(&self, key: &'static str, target: &mut f64) -> Result<(), ConfigError> {
        if let Some(raw) = (self.lookup)(key) {
            match raw.trim().parse::<f64>() {
                Ok(value) if value.is_finite() && value >= 0.0 => *target = value,
                _ => return Err(ConfigError::Invalid { key, value: raw }),
            }
        }
        Ok(())
    }
}
