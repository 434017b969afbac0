//! Per-vessel fill level and pour state machine
//!
//! A vessel is Idle until its tilt reaches the spill threshold for its current
//! fill, then Pouring until it is tilted back. Overflowing is layered on top:
//! it is entered whenever incoming volume would push the fill past 100% and
//! lapses once the cooldown deadline passes without another overflow.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use super::geometry::{self, MeshFit};
use super::raycast::ReceivingMarker;
use super::rim::RimRing;
use super::state::VesselId;
use super::visual::{Emission, LiquidPose};
use crate::config::{DebugFlags, OverflowPolicy, VesselConfig};
use crate::consts::*;
use crate::{Transform, tilt_degrees};

/// Externally visible pour state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PourState {
    Idle,
    Pouring,
    /// Routing excess volume onward; may coincide with pouring
    Overflowing,
}

/// What happened to volume offered to a vessel
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReceiveOutcome {
    /// Taken in; `excess` is the rounding sliver clipped at 100%, if any
    Accepted { excess: f32 },
    /// Vessel was full; `forward` must be passed to whatever is below it
    Overflow { forward: f32 },
}

/// Volume leaving a vessel this tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PourOutput {
    pub volume: f32,
    /// Fill percent the vessel lost
    pub percent: f32,
    /// World position the stream leaves from
    pub spout: Vec3,
}

/// Serializable snapshot for logging and reports
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VesselReport {
    pub id: VesselId,
    pub fill_percent: f32,
    pub volume: f32,
    pub tilt_deg: f32,
    pub threshold_deg: f32,
    pub state: PourState,
    pub spout: Vec3,
}

/// A rigid cylindrical vessel holding liquid
#[derive(Debug, Clone)]
pub struct Vessel {
    pub id: VesselId,
    radius: f32,
    height: f32,
    total_volume: f32,
    fit: MeshFit,
    debug: DebugFlags,
    transform: Transform,
    rim: RimRing,
    fill_percent: f32,
    tilt_deg: f32,
    threshold_deg: f32,
    pouring: bool,
    overflowing: bool,
    /// Simulation time after which an overflow lapses
    overflow_until: f32,
    emission: Emission,
    pose: LiquidPose,
}

impl Vessel {
    /// Build a vessel; degenerate geometry is floored rather than rejected
    pub fn new(id: VesselId, config: &VesselConfig) -> Self {
        let mut radius = config.radius;
        let mut height = config.height;
        if !(radius > 0.0 && height > 0.0) {
            log::warn!(
                "Vessel {:?} has degenerate geometry (radius {}, height {}); clamping",
                id,
                radius,
                height
            );
            radius = radius.max(GEOMETRY_EPSILON);
            height = height.max(GEOMETRY_EPSILON);
        }

        let fill_percent = config.initial_percent();
        let transform = Transform::new(config.position, config.rotation);
        let mut rim = RimRing::new(config.rim_sample_count, config.spout_radius(), height);
        rim.refresh(&transform);

        let pose = LiquidPose {
            visible: fill_percent > VISIBILITY_THRESHOLD,
            ..Default::default()
        };

        Self {
            id,
            radius,
            height,
            total_volume: geometry::total_volume(radius, height),
            fit: MeshFit {
                surface_offset: config.surface_offset,
                y_scale: config.y_scale,
            },
            debug: config.debug,
            transform,
            rim,
            fill_percent,
            tilt_deg: tilt_degrees(config.rotation),
            threshold_deg: geometry::spill_threshold(fill_percent, radius, height),
            pouring: false,
            overflowing: false,
            overflow_until: 0.0,
            emission: Emission::default(),
            pose,
        }
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn total_volume(&self) -> f32 {
        self.total_volume
    }

    pub fn fill_percent(&self) -> f32 {
        self.fill_percent
    }

    /// Liquid volume currently held
    pub fn volume(&self) -> f32 {
        geometry::volume_at_percent(self.fill_percent, self.radius, self.height)
    }

    pub fn tilt_degrees(&self) -> f32 {
        self.tilt_deg
    }

    /// Spill threshold as of the last tick
    pub fn threshold_degrees(&self) -> f32 {
        self.threshold_deg
    }

    pub fn is_empty(&self) -> bool {
        self.fill_percent <= 0.0
    }

    pub fn is_pouring(&self) -> bool {
        self.pouring
    }

    pub fn is_overflowing(&self) -> bool {
        self.overflowing
    }

    pub fn state(&self) -> PourState {
        if self.overflowing {
            PourState::Overflowing
        } else if self.pouring {
            PourState::Pouring
        } else {
            PourState::Idle
        }
    }

    pub fn emission(&self) -> Emission {
        self.emission
    }

    pub fn pose(&self) -> &LiquidPose {
        &self.pose
    }

    pub fn rim(&self) -> &RimRing {
        &self.rim
    }

    /// Current spout (lowest rim point) in world space
    pub fn spout(&self) -> Vec3 {
        self.rim.spout()
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    /// Place the vessel; the spout follows at once, the pour state at the next tick
    pub fn set_transform(&mut self, transform: Transform) {
        self.transform = transform;
        self.rim.refresh(&self.transform);
    }

    pub fn set_rotation(&mut self, rotation: Quat) {
        self.transform.rotation = rotation;
        self.rim.refresh(&self.transform);
    }

    /// Disc across the opening that other spouts aim for
    pub fn marker(&self) -> ReceivingMarker {
        ReceivingMarker {
            vessel: self.id,
            center: self.transform.point_to_world(Vec3::new(0.0, self.height, 0.0)),
            normal: self.transform.up(),
            radius: self.radius,
        }
    }

    /// Advance one tick at simulation time `now`
    ///
    /// Returns the volume that left the vessel, if it poured.
    pub fn tick(&mut self, now: f32) -> Option<PourOutput> {
        self.rim.refresh(&self.transform);
        self.tilt_deg = tilt_degrees(self.transform.rotation);
        self.expire_overflow(now);

        if self.check_empty() {
            return None;
        }
        self.update_pose();
        self.pour()
    }

    fn expire_overflow(&mut self, now: f32) {
        if self.overflowing && now > self.overflow_until {
            self.overflowing = false;
            self.emission.active = self.pouring;
            log::debug!("Vessel {:?} stopped overflowing", self.id);
        }
    }

    /// Clamp the fill and hide everything once the vessel runs dry
    fn check_empty(&mut self) -> bool {
        if self.fill_percent > 100.0 {
            self.fill_percent = 100.0;
        }
        if self.fill_percent <= 0.0 {
            self.fill_percent = 0.0;
            self.pouring = false;
            self.emission.active = false;
            self.pose.visible = false;
            return true;
        }
        false
    }

    /// Recompute the liquid mesh targets and ease the joints towards them
    fn update_pose(&mut self) {
        let target = geometry::liquid_surface_pose(
            self.fill_percent,
            self.tilt_deg,
            self.radius,
            self.height,
            self.fit,
        );
        self.threshold_deg = target.threshold_deg;

        if !self.debug.freeze_motion {
            self.pose.upper_offset_y = target.upper_offset_y;
            self.pose.base_shift = target.base_shift;
        }
        if !self.debug.freeze_scale {
            self.pose.upper_scale = target.upper_scale;
            self.pose.lower_scale = target.lower_scale;
        }

        let surface = Quat::from_axis_angle(Vec3::NEG_X, target.surface_angle_deg.to_radians());
        self.pose.upper_rotation = self.pose.upper_rotation.slerp(surface, SURFACE_SLERP);
        let yaw = Quat::from_rotation_y(self.rim.spout_yaw_degrees().to_radians());
        self.pose.body_rotation = self.pose.body_rotation.slerp(yaw, YAW_SLERP);
    }

    fn pour(&mut self) -> Option<PourOutput> {
        let should_pour = self.tilt_deg >= self.threshold_deg;

        if should_pour && !self.pouring {
            self.pouring = true;
            self.emission.active = true;
            log::debug!(
                "Vessel {:?} started pouring at {:.1} deg (threshold {:.1}, fill {:.1}%)",
                self.id,
                self.tilt_deg,
                self.threshold_deg,
                self.fill_percent
            );
        }

        if !should_pour && self.pouring {
            if !self.overflowing {
                self.emission.active = false;
            }
            self.pouring = false;
            log::debug!("Vessel {:?} stopped pouring", self.id);
            return None;
        }

        if !self.pouring {
            return None;
        }

        let overpour = OVERPOUR_PER_DEGREE * (self.tilt_deg - self.threshold_deg);
        // Can't pour out more than is left
        let percent = (BASE_POUR_PERCENT + overpour).min(self.fill_percent);
        let before = self.fill_percent;
        let after = before - percent;
        if !self.debug.freeze_fill {
            self.fill_percent = after;
        }
        self.emission.sized_for_pour(percent);

        let volume = geometry::volume_at_percent(before, self.radius, self.height)
            - geometry::volume_at_percent(after, self.radius, self.height);
        Some(PourOutput {
            volume,
            percent,
            spout: self.rim.spout(),
        })
    }

    /// Offer incoming volume at simulation time `now`
    ///
    /// If it doesn't fit, the vessel starts (or keeps) overflowing and reports
    /// how much must be forwarded; under `Conserve` it tops itself up first.
    pub fn receive(
        &mut self,
        volume: f32,
        now: f32,
        policy: OverflowPolicy,
        cooldown: f32,
    ) -> ReceiveOutcome {
        if !(volume > 0.0) {
            return ReceiveOutcome::Accepted { excess: 0.0 };
        }
        let percent = geometry::percent_for_volume(volume, self.total_volume);

        if self.fill_percent >= 100.0 || self.fill_percent + percent > 100.0 + FILL_TOLERANCE {
            if !self.overflowing {
                self.overflowing = true;
                self.emission.active = true;
                log::debug!("Vessel {:?} overflowing", self.id);
            }
            self.overflow_until = now + cooldown;

            let forward = match policy {
                OverflowPolicy::Conserve => {
                    let room = (100.0 - self.fill_percent).max(0.0);
                    self.fill_percent = 100.0;
                    self.pose.visible = true;
                    self.total_volume * (percent - room) / 100.0
                }
                OverflowPolicy::ForwardIncoming => volume,
            };
            return ReceiveOutcome::Overflow { forward };
        }

        // Rounding may land just past 100%; hand the sliver back to the caller
        let room = 100.0 - self.fill_percent;
        let excess = if percent > room {
            self.total_volume * (percent - room) / 100.0
        } else {
            0.0
        };
        self.fill_percent = (self.fill_percent + percent).min(100.0);
        if !self.pose.visible && self.fill_percent > VISIBILITY_THRESHOLD {
            self.pose.visible = true;
        }
        ReceiveOutcome::Accepted { excess }
    }

    /// Size the overflow stream for volume being forwarded
    pub fn size_overflow(&mut self, volume: f32) {
        self.emission
            .sized_for_pour(volume / self.total_volume.max(f32::MIN_POSITIVE));
    }

    pub fn report(&self) -> VesselReport {
        VesselReport {
            id: self.id,
            fill_percent: self.fill_percent,
            volume: self.volume(),
            tilt_deg: self.tilt_deg,
            threshold_deg: self.threshold_deg,
            state: self.state(),
            spout: self.spout(),
        }
    }
}
