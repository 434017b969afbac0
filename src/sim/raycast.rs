//! Downward ray casts used to find a receiving vessel
//!
//! The physics engine is an outside collaborator: anything implementing
//! `RayCaster` can answer "what is below this point". `MarkerCaster` is a
//! small built-in implementation that only knows about the receiving marker
//! disc each vessel carries in its opening plane.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::state::VesselId;
use crate::consts::GEOMETRY_EPSILON;

/// Result of a downward cast
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RayHit {
    pub point: Vec3,
    pub distance: f32,
    /// Vessel owning the receiving marker that was struck, if it was one
    pub receiver: Option<VesselId>,
}

/// Physics collaborator: cast straight down (-Y) from `origin`
pub trait RayCaster {
    fn cast_down(&self, origin: Vec3, max_distance: f32) -> Option<RayHit>;
}

/// Receiving marker: a disc spanning a vessel's opening
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReceivingMarker {
    pub vessel: VesselId,
    pub center: Vec3,
    /// Disc normal (the vessel's up axis)
    pub normal: Vec3,
    pub radius: f32,
}

impl ReceivingMarker {
    /// Distance along a downward ray to this disc, if it is struck
    pub fn intersect_down(&self, origin: Vec3, max_distance: f32) -> Option<f32> {
        let dir = Vec3::NEG_Y;
        let denom = self.normal.dot(dir);
        if denom.abs() < GEOMETRY_EPSILON {
            // Disc seen edge-on
            return None;
        }
        let t = (self.center - origin).dot(self.normal) / denom;
        if t <= GEOMETRY_EPSILON || t > max_distance {
            return None;
        }
        let hit = origin + dir * t;
        ((hit - self.center).length_squared() <= self.radius * self.radius).then_some(t)
    }
}

/// Casts against a snapshot of receiving markers
#[derive(Debug, Clone, Default)]
pub struct MarkerCaster {
    markers: Vec<ReceivingMarker>,
}

impl MarkerCaster {
    pub fn new(markers: Vec<ReceivingMarker>) -> Self {
        Self { markers }
    }

    pub fn markers(&self) -> &[ReceivingMarker] {
        &self.markers
    }
}

impl RayCaster for MarkerCaster {
    fn cast_down(&self, origin: Vec3, max_distance: f32) -> Option<RayHit> {
        self.markers
            .iter()
            .filter_map(|m| m.intersect_down(origin, max_distance).map(|t| (t, m.vessel)))
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(t, vessel)| RayHit {
                point: origin + Vec3::NEG_Y * t,
                distance: t,
                receiver: Some(vessel),
            })
    }
}
