//! Ring of candidate spout points around a vessel opening
//!
//! Each tick the ring is moved with the vessel and the point with the lowest
//! world Y becomes the active spout. Selection compares Y only and keeps the
//! previous spout unless another point is strictly lower, so it can lag behind
//! during some rotations and has no notion of handedness when the vessel is
//! also rolled about the current down direction. The liquid yaw downstream is
//! derived from the selected index, so this convention is kept as is.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::Transform;

/// One sample point on the rim
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RimPoint {
    /// Fixed offset in the vessel's local frame
    pub local: Vec3,
    /// World position as of the last refresh
    pub world: Vec3,
}

/// Fixed-size ring of rim points with a tracked lowest index
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RimRing {
    points: Vec<RimPoint>,
    lowest: usize,
}

impl RimRing {
    /// Lay out `count` points evenly on a circle of `radius` at local height `rim_y`
    ///
    /// Point 0 sits on local +Z and the ring advances towards +X.
    pub fn new(count: usize, radius: f32, rim_y: f32) -> Self {
        let count = count.max(1);
        let step = 360.0 / count as f32;
        let points = (0..count)
            .map(|i| {
                let angle = (i as f32 * step).to_radians();
                let local = Vec3::new(radius * angle.sin(), rim_y, radius * angle.cos());
                RimPoint { local, world: local }
            })
            .collect();
        Self { points, lowest: 0 }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[RimPoint] {
        &self.points
    }

    /// Angular spacing between neighbouring points (degrees)
    pub fn step_degrees(&self) -> f32 {
        360.0 / self.points.len() as f32
    }

    /// Move every point with the vessel, then pick the lowest
    pub fn refresh(&mut self, transform: &Transform) -> usize {
        for point in &mut self.points {
            point.world = transform.point_to_world(point.local);
        }
        self.update_lowest()
    }

    /// Linear scan for a strictly lower point, starting from the current spout
    fn update_lowest(&mut self) -> usize {
        let mut lowest = self.lowest;
        let mut min_y = self.points[lowest].world.y;
        for (i, point) in self.points.iter().enumerate() {
            if point.world.y < min_y {
                min_y = point.world.y;
                lowest = i;
            }
        }
        self.lowest = lowest;
        lowest
    }

    pub fn lowest_index(&self) -> usize {
        self.lowest
    }

    /// Active spout in world space
    pub fn spout(&self) -> Vec3 {
        self.points[self.lowest].world
    }

    /// Yaw (degrees about local Y) that faces the liquid towards the spout
    pub fn spout_yaw_degrees(&self) -> f32 {
        crate::wrap_degrees(self.lowest as f32 * self.step_degrees())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Quat;

    #[test]
    fn test_ring_layout() {
        let ring = RimRing::new(4, 1.0, 2.0);
        assert_eq!(ring.len(), 4);
        let p = ring.points();
        assert!((p[0].local - Vec3::new(0.0, 2.0, 1.0)).length() < 1e-5);
        assert!((p[1].local - Vec3::new(1.0, 2.0, 0.0)).length() < 1e-5);
        assert!((p[2].local - Vec3::new(0.0, 2.0, -1.0)).length() < 1e-5);
        assert!((p[3].local - Vec3::new(-1.0, 2.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_upright_keeps_first_point() {
        let mut ring = RimRing::new(24, 0.3, 1.0);
        let idx = ring.refresh(&Transform::new(Vec3::new(1.0, 2.0, 3.0), Quat::IDENTITY));
        // All points level: ties keep the initial spout
        assert_eq!(idx, 0);
        assert!((ring.spout() - Vec3::new(1.0, 3.0, 3.3)).length() < 1e-5);
    }

    #[test]
    fn test_tilt_about_z_picks_negative_x_side() {
        let mut ring = RimRing::new(24, 0.3, 1.0);
        // Rolling about +Z lowers the -X side of the rim
        let rot = Quat::from_rotation_z(60f32.to_radians());
        let idx = ring.refresh(&Transform::new(Vec3::ZERO, rot));
        assert_eq!(idx, 18);
        assert!((ring.spout_yaw_degrees() - 270.0).abs() < 1e-3);
    }

    #[test]
    fn test_tilt_about_x_picks_negative_z_side() {
        let mut ring = RimRing::new(24, 0.3, 1.0);
        // Negative roll about X tips the opening towards -Z
        let rot = Quat::from_rotation_x(-45f32.to_radians());
        let idx = ring.refresh(&Transform::new(Vec3::ZERO, rot));
        assert_eq!(idx, 12);
    }

    #[test]
    fn test_returning_upright_keeps_previous_spout() {
        let mut ring = RimRing::new(24, 0.3, 1.0);
        ring.refresh(&Transform::new(Vec3::ZERO, Quat::from_rotation_z(0.5)));
        assert_eq!(ring.lowest_index(), 18);
        ring.refresh(&Transform::default());
        assert_eq!(ring.lowest_index(), 18);
    }
}
