//! Throw velocity tracking for held vessels
//!
//! Independent of the liquid model: records how a grabbed body has been moving
//! so the host can hand a believable velocity to its physics on release.

use std::collections::VecDeque;
use std::f32::consts::{PI, TAU};

use glam::Vec3;

use crate::Transform;
use crate::consts::THROW_HISTORY;

#[derive(Debug, Clone)]
pub struct ThrowTracker {
    velocities: VecDeque<Vec3>,
    capacity: usize,
    angular_velocity: Vec3,
    prev: Option<Transform>,
}

impl Default for ThrowTracker {
    fn default() -> Self {
        Self::new(THROW_HISTORY)
    }
}

impl ThrowTracker {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            velocities: VecDeque::with_capacity(capacity),
            capacity,
            angular_velocity: Vec3::ZERO,
            prev: None,
        }
    }

    /// Sample the body's placement after a tick of `dt` seconds
    pub fn update(&mut self, transform: &Transform, dt: f32) {
        let Some(prev) = self.prev.replace(*transform) else {
            return;
        };
        if !(dt > 0.0) {
            return;
        }

        let velocity = (transform.position - prev.position) / dt;
        if self.velocities.len() == self.capacity {
            self.velocities.pop_front();
        }
        self.velocities.push_back(velocity);

        let delta = transform.rotation * prev.rotation.inverse();
        let (axis, mut angle) = delta.normalize().to_axis_angle();
        if angle > PI {
            angle -= TAU;
        }
        self.angular_velocity = if angle.abs() <= f32::EPSILON || !axis.is_finite() {
            Vec3::ZERO
        } else {
            axis * (angle / dt)
        };
    }

    /// Mean of the recorded linear velocities
    pub fn average_velocity(&self) -> Vec3 {
        if self.velocities.is_empty() {
            return Vec3::ZERO;
        }
        self.velocities.iter().copied().sum::<Vec3>() / self.velocities.len() as f32
    }

    pub fn angular_velocity(&self) -> Vec3 {
        self.angular_velocity
    }

    pub fn samples(&self) -> usize {
        self.velocities.len()
    }

    /// Forget history, e.g. when the body is grabbed again
    pub fn clear(&mut self) {
        self.velocities.clear();
        self.angular_velocity = Vec3::ZERO;
        self.prev = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Quat;

    #[test]
    fn test_first_sample_only_primes() {
        let mut tracker = ThrowTracker::default();
        tracker.update(&Transform::new(Vec3::new(5.0, 0.0, 0.0), Quat::IDENTITY), 0.1);
        assert_eq!(tracker.samples(), 0);
        assert_eq!(tracker.average_velocity(), Vec3::ZERO);
    }

    #[test]
    fn test_linear_velocity() {
        let mut tracker = ThrowTracker::default();
        for i in 0..5 {
            let pos = Vec3::new(i as f32 * 0.2, 0.0, 0.0);
            tracker.update(&Transform::new(pos, Quat::IDENTITY), 0.1);
        }
        assert_eq!(tracker.samples(), 4);
        assert!((tracker.average_velocity() - Vec3::new(2.0, 0.0, 0.0)).length() < 1e-4);
        assert!(tracker.angular_velocity().length() < 1e-6);
    }

    #[test]
    fn test_history_is_bounded() {
        let mut tracker = ThrowTracker::new(3);
        for i in 0..10 {
            tracker.update(&Transform::new(Vec3::splat(i as f32), Quat::IDENTITY), 1.0);
        }
        assert_eq!(tracker.samples(), 3);
    }

    #[test]
    fn test_angular_velocity() {
        let mut tracker = ThrowTracker::default();
        tracker.update(&Transform::default(), 0.5);
        tracker.update(&Transform::new(Vec3::ZERO, Quat::from_rotation_y(0.5)), 0.5);
        assert!((tracker.angular_velocity() - Vec3::new(0.0, 1.0, 0.0)).length() < 1e-3);

        // Rotating back the short way gives a negative rate
        tracker.update(&Transform::default(), 0.5);
        assert!((tracker.angular_velocity() - Vec3::new(0.0, -1.0, 0.0)).length() < 1e-3);
    }

    #[test]
    fn test_zero_dt_is_ignored() {
        let mut tracker = ThrowTracker::default();
        tracker.update(&Transform::default(), 0.1);
        tracker.update(&Transform::new(Vec3::X, Quat::IDENTITY), 0.0);
        assert_eq!(tracker.samples(), 0);

        // The skipped sample still becomes the reference for the next one
        tracker.update(&Transform::new(Vec3::new(2.0, 0.0, 0.0), Quat::IDENTITY), 0.5);
        assert!((tracker.average_velocity() - Vec3::new(2.0, 0.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_clear_forgets_history() {
        let mut tracker = ThrowTracker::default();
        tracker.update(&Transform::default(), 0.1);
        tracker.update(&Transform::new(Vec3::X, Quat::from_rotation_y(0.3)), 0.1);
        assert_eq!(tracker.samples(), 1);

        tracker.clear();
        assert_eq!(tracker.samples(), 0);
        assert_eq!(tracker.angular_velocity(), Vec3::ZERO);
        // Next sample only primes again
        tracker.update(&Transform::new(Vec3::splat(9.0), Quat::IDENTITY), 0.1);
        assert_eq!(tracker.samples(), 0);
    }
}
