//! Scene and vessel configuration
//!
//! Loaded from JSON and validated once; the simulation treats it as immutable
//! after construction.

use std::path::Path;

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;

/// Errors raised while loading or validating configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config json: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("vessel {index}: radius {radius} and height {height} must be positive")]
    Geometry { index: usize, radius: f32, height: f32 },
    #[error("vessel {index}: rim sample count must be non-zero")]
    RimSamples { index: usize },
    #[error("tap {index}: volume per second {rate} must not be negative")]
    TapRate { index: usize, rate: f32 },
    #[error("tap {index}: needs at least one spout")]
    TapSpouts { index: usize },
    #[error("fixed dt {0} must be positive")]
    FixedDt(f32),
}

/// What a full vessel does with incoming volume
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverflowPolicy {
    /// Top up to 100% and forward only the excess
    #[default]
    Conserve,
    /// Leave the vessel untouched and forward the whole incoming amount
    ForwardIncoming,
}

/// World-wide simulation tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Reference tick the overflow cooldown is measured in (seconds)
    pub fixed_dt: f32,
    pub overflow_cooldown_ticks: u32,
    pub raycast_max_distance: f32,
    pub max_transfer_hops: u32,
    pub overflow_policy: OverflowPolicy,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            fixed_dt: FIXED_DT,
            overflow_cooldown_ticks: OVERFLOW_COOLDOWN_TICKS,
            raycast_max_distance: RAYCAST_MAX_DISTANCE,
            max_transfer_hops: MAX_TRANSFER_HOPS,
            overflow_policy: OverflowPolicy::Conserve,
        }
    }
}

impl SimConfig {
    /// Seconds an overflow stays active after the last overflow event
    pub fn overflow_cooldown(&self) -> f32 {
        self.overflow_cooldown_ticks as f32 * self.fixed_dt
    }
}

/// Per-vessel switches that freeze parts of the model
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugFlags {
    /// Pour logic runs but fill never drops
    pub freeze_fill: bool,
    /// Joint scales stay at identity
    pub freeze_scale: bool,
    /// Joint offsets and base shift stay at rest
    pub freeze_motion: bool,
}

/// Static description of one cylindrical vessel
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VesselConfig {
    pub radius: f32,
    pub height: f32,
    pub rim_sample_count: usize,
    /// Radius of the spout ring; the vessel radius when absent
    pub rim_radius: Option<f32>,
    /// Starting fill, either a 0-1 fraction or a 0-100 percent
    pub initial_fill: f32,
    pub position: Vec3,
    pub rotation: Quat,
    /// Unfillable mesh height below the liquid surface joint
    pub surface_offset: f32,
    /// Vertical scale of the container mesh
    pub y_scale: f32,
    pub debug: DebugFlags,
}

impl Default for VesselConfig {
    fn default() -> Self {
        Self {
            radius: 0.3,
            height: 1.0,
            rim_sample_count: DEFAULT_RIM_SAMPLES,
            rim_radius: None,
            initial_fill: 0.6,
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            surface_offset: 0.0,
            y_scale: 1.0,
            debug: DebugFlags::default(),
        }
    }
}

impl VesselConfig {
    pub fn new(radius: f32, height: f32) -> Self {
        Self {
            radius,
            height,
            ..Default::default()
        }
    }

    pub fn with_fill(mut self, fill: f32) -> Self {
        self.initial_fill = fill;
        self
    }

    pub fn at(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    pub fn rotated(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    /// Starting fill as a percent in [0, 100]
    ///
    /// Values below 1 are read as fractions, so 0.6 and 60 both mean 60%.
    pub fn initial_percent(&self) -> f32 {
        let mut fill = self.initial_fill.max(0.0);
        if fill < 1.0 {
            fill *= 100.0;
        }
        fill.min(100.0)
    }

    pub fn spout_radius(&self) -> f32 {
        self.rim_radius.unwrap_or(self.radius)
    }

    pub fn validate(&self, index: usize) -> Result<(), ConfigError> {
        if !(self.radius > 0.0 && self.height > 0.0) {
            return Err(ConfigError::Geometry {
                index,
                radius: self.radius,
                height: self.height,
            });
        }
        if self.rim_sample_count == 0 {
            return Err(ConfigError::RimSamples { index });
        }
        Ok(())
    }
}

/// A fixed liquid source with one or more nozzles
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TapConfig {
    pub volume_per_second: f32,
    pub spouts: Vec<Vec3>,
}

impl Default for TapConfig {
    fn default() -> Self {
        Self {
            volume_per_second: 0.05,
            spouts: vec![Vec3::ZERO],
        }
    }
}

impl TapConfig {
    pub fn new(volume_per_second: f32, spout: Vec3) -> Self {
        Self {
            volume_per_second,
            spouts: vec![spout],
        }
    }

    pub fn validate(&self, index: usize) -> Result<(), ConfigError> {
        if !(self.volume_per_second >= 0.0) {
            return Err(ConfigError::TapRate {
                index,
                rate: self.volume_per_second,
            });
        }
        if self.spouts.is_empty() {
            return Err(ConfigError::TapSpouts { index });
        }
        Ok(())
    }
}

/// Everything needed to build a `World`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub sim: SimConfig,
    pub vessels: Vec<VesselConfig>,
    pub taps: Vec<TapConfig>,
}

impl SceneConfig {
    /// Parse and validate a scene from JSON text
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let scene: SceneConfig = serde_json::from_str(json)?;
        scene.validate()?;
        Ok(scene)
    }

    /// Read, parse and validate a scene file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let scene = Self::from_json_str(&json)?;
        log::info!(
            "Loaded scene {} ({} vessels, {} taps)",
            path.display(),
            scene.vessels.len(),
            scene.taps.len()
        );
        Ok(scene)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.sim.fixed_dt > 0.0) {
            return Err(ConfigError::FixedDt(self.sim.fixed_dt));
        }
        for (i, vessel) in self.vessels.iter().enumerate() {
            vessel.validate(i)?;
        }
        for (i, tap) in self.taps.iter().enumerate() {
            tap.validate(i)?;
        }
        Ok(())
    }
}
