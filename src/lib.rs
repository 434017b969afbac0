//! Vessel Pour - liquid in tiltable cylindrical vessels without a fluid solver
//!
//! Core modules:
//! - `sim`: Deterministic per-tick model (geometry, rim sampling, pour state, transfer)
//! - `config`: Data-driven scene and vessel configuration
//! - `scenario`: Scripted scenes used by the demo runner and tests

pub mod config;
pub mod scenario;
pub mod sim;

pub use config::{ConfigError, OverflowPolicy, SceneConfig, SimConfig, TapConfig, VesselConfig};
pub use sim::{World, tick};

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Model constants
pub mod consts {
    /// Reference fixed timestep (seconds) the overflow cooldown is expressed in
    pub const FIXED_DT: f32 = 0.02;
    /// Overflow stays active this many reference ticks after the last overflow event
    pub const OVERFLOW_COOLDOWN_TICKS: u32 = 2;
    /// How far below a spout we look for a receiving vessel
    pub const RAYCAST_MAX_DISTANCE: f32 = 5.0;
    /// Upper bound on vessels an overflow may cascade through in one transfer
    pub const MAX_TRANSFER_HOPS: u32 = 16;

    /// Default number of candidate spout points around the rim
    pub const DEFAULT_RIM_SAMPLES: usize = 24;

    /// Liquid becomes visible once fill rises above this percent
    pub const VISIBILITY_THRESHOLD: f32 = 0.01;
    /// Floor for lengths and denominators that would otherwise degenerate
    pub const GEOMETRY_EPSILON: f32 = 1e-4;
    /// Incoming volume may overshoot 100% by this much before counting as overflow
    pub const FILL_TOLERANCE: f32 = 1e-3;

    /// Base pour rate (percent per tick) once past the threshold
    pub const BASE_POUR_PERCENT: f32 = 0.5;
    /// Extra percent per degree of tilt beyond the threshold
    pub const OVERPOUR_PER_DEGREE: f32 = 0.5;

    /// Pour emission particle size clamps
    pub const POUR_MIN_SIZE: (f32, f32) = (0.02, 0.06);
    pub const POUR_MAX_SIZE: (f32, f32) = (0.045, 0.12);
    pub const POUR_SIZE_PER_PERCENT: f32 = 0.25;
    pub const POUR_MAX_SIZE_RATIO: f32 = 2.5;

    /// Tap emission particle size clamps
    pub const TAP_MIN_SIZE_PER_RATE: f32 = 0.075;
    pub const TAP_MIN_SIZE_CAP: f32 = 0.04;
    pub const TAP_MAX_SIZE_RATIO: f32 = 8.0;
    pub const TAP_MAX_SIZE_CAP: f32 = 0.125;

    /// Per-tick slerp factors for liquid joint smoothing
    pub const SURFACE_SLERP: f32 = 0.35;
    pub const YAW_SLERP: f32 = 0.25;

    /// Liquid mesh shift padding used when the vessel is under half full
    pub const BASE_SHIFT_UNIT: f32 = 1.0;
    pub const BASE_SHIFT_PAD: f32 = 0.2;

    /// Frames of linear velocity kept by the throw tracker
    pub const THROW_HISTORY: usize = 60;
}

/// World placement of a rigid body
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
        }
    }
}

impl Transform {
    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    /// Map a local-frame point to world space (no scale)
    #[inline]
    pub fn point_to_world(&self, local: Vec3) -> Vec3 {
        self.position + self.rotation * local
    }

    /// Body up axis in world space
    #[inline]
    pub fn up(&self) -> Vec3 {
        self.rotation * Vec3::Y
    }
}

/// Angle in degrees between a body's up axis and world up, ignoring yaw
#[inline]
pub fn tilt_degrees(rotation: Quat) -> f32 {
    let up = (rotation * Vec3::Y).normalize_or(Vec3::Y);
    up.y.clamp(-1.0, 1.0).acos().to_degrees()
}

/// Wrap an angle in degrees to [0, 360)
#[inline]
pub fn wrap_degrees(deg: f32) -> f32 {
    deg.rem_euclid(360.0)
}
