//! Cosmetic outputs handed to the renderer
//!
//! Nothing here is read back by the model.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use super::state::{TapId, VesselId};
use crate::consts::*;

/// Particle emitter settings for a pour stream
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Emission {
    pub active: bool,
    pub min_size: f32,
    pub max_size: f32,
}

impl Emission {
    /// Stream sizes for a vessel pour or overflow, from the percent moved
    pub fn sized_for_pour(&mut self, percent: f32) {
        self.min_size = (POUR_SIZE_PER_PERCENT * percent).clamp(POUR_MIN_SIZE.0, POUR_MIN_SIZE.1);
        self.max_size =
            (self.min_size * POUR_MAX_SIZE_RATIO).clamp(POUR_MAX_SIZE.0, POUR_MAX_SIZE.1);
    }

    /// Stream sizes for a tap nozzle, from its flow rate
    pub fn for_tap(volume_per_second: f32) -> Self {
        let min_size = (TAP_MIN_SIZE_PER_RATE * volume_per_second).clamp(0.0, TAP_MIN_SIZE_CAP);
        Self {
            active: false,
            min_size,
            max_size: (min_size * TAP_MAX_SIZE_RATIO).clamp(0.0, TAP_MAX_SIZE_CAP),
        }
    }
}

/// Smoothed pose of the stand-in liquid mesh
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LiquidPose {
    /// Local Y of the upper (surface) joint
    pub upper_offset_y: f32,
    pub upper_rotation: Quat,
    pub upper_scale: Vec3,
    pub lower_scale: Vec3,
    /// Yaw of the whole liquid body, facing the active spout
    pub body_rotation: Quat,
    /// Shift of the liquid body along the vessel up axis
    pub base_shift: f32,
    pub visible: bool,
}

impl Default for LiquidPose {
    fn default() -> Self {
        Self {
            upper_offset_y: 0.0,
            upper_rotation: Quat::IDENTITY,
            upper_scale: Vec3::ONE,
            lower_scale: Vec3::ONE,
            body_rotation: Quat::IDENTITY,
            base_shift: 0.0,
            visible: false,
        }
    }
}

/// Which emitter an emission update belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EmitterId {
    Vessel(VesselId),
    TapSpout { tap: TapId, spout: usize },
}

/// Rendering/particle collaborator
pub trait VisualSink {
    fn set_emission(&mut self, emitter: EmitterId, emission: Emission);
    fn set_liquid_pose(&mut self, vessel: VesselId, pose: &LiquidPose);
}
