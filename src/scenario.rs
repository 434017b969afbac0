//! Scripted scenes
//!
//! A scenario owns a world plus a "hand" that tilts one held vessel along a
//! keyframed script, optionally with seeded jitter so runs stay reproducible.

use glam::{Quat, Vec3};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::config::{ConfigError, SceneConfig, SimConfig, TapConfig, VesselConfig};
use crate::sim::{ThrowTracker, VesselId, World, tick};
use crate::Transform;

/// Piecewise-linear tilt program: `(time_secs, tilt_deg)` keyframes
#[derive(Debug, Clone)]
pub struct HandScript {
    keyframes: Vec<(f32, f32)>,
}

impl HandScript {
    pub fn new(mut keyframes: Vec<(f32, f32)>) -> Self {
        keyframes.sort_by(|a, b| a.0.total_cmp(&b.0));
        Self { keyframes }
    }

    /// Hold upright while the tap runs, tip past 90 degrees, then set it down
    pub fn pour_and_return() -> Self {
        Self::new(vec![
            (0.0, 0.0),
            (4.0, 0.0),
            (6.0, 100.0),
            (9.0, 100.0),
            (10.0, 0.0),
        ])
    }

    /// Tilt at time `t`, held constant outside the keyframe range
    pub fn tilt_at(&self, t: f32) -> f32 {
        let Some(&(first_t, first_deg)) = self.keyframes.first() else {
            return 0.0;
        };
        if t <= first_t {
            return first_deg;
        }
        for pair in self.keyframes.windows(2) {
            let (t0, d0) = pair[0];
            let (t1, d1) = pair[1];
            if t <= t1 {
                let span = t1 - t0;
                if span <= 0.0 {
                    return d1;
                }
                return d0 + (d1 - d0) * (t - t0) / span;
            }
        }
        self.keyframes.last().map(|k| k.1).unwrap_or(0.0)
    }

    pub fn duration(&self) -> f32 {
        self.keyframes.last().map(|k| k.0).unwrap_or(0.0)
    }
}

pub struct Scenario {
    pub world: World,
    /// Vessel the hand is holding
    pub held: VesselId,
    pub hand: HandScript,
    pub tracker: ThrowTracker,
    rest: Transform,
    rng: Pcg32,
    jitter_deg: f32,
}

impl Scenario {
    pub fn new(world: World, held: VesselId, hand: HandScript, seed: u64) -> Self {
        let rest = world
            .vessel(held)
            .map(|v| *v.transform())
            .unwrap_or_default();
        Self {
            world,
            held,
            hand,
            tracker: ThrowTracker::default(),
            rest,
            rng: Pcg32::seed_from_u64(seed),
            jitter_deg: 0.0,
        }
    }

    /// Add up to `deg` degrees of random wobble to the hand each tick
    pub fn with_jitter(mut self, deg: f32) -> Self {
        self.jitter_deg = deg.abs();
        self
    }

    /// Tap above a held cup, a second cup beside it, and a tray under that
    pub fn bar_scene() -> SceneConfig {
        let mut tray = VesselConfig::new(0.45, 0.4)
            .with_fill(0.0)
            .at(Vec3::new(-1.0, -1.5, 0.2));
        tray.rim_sample_count = 32;
        SceneConfig {
            sim: SimConfig::default(),
            vessels: vec![
                VesselConfig::new(0.3, 1.0)
                    .with_fill(0.0)
                    .at(Vec3::new(0.0, 1.5, 0.0)),
                VesselConfig::new(0.25, 1.0)
                    .with_fill(0.0)
                    .at(Vec3::new(-1.0, 0.0, 0.0)),
                tray,
            ],
            taps: vec![TapConfig::new(0.05, Vec3::new(0.0, 3.0, 0.0))],
        }
    }

    /// The bar scene with the first cup in hand
    pub fn bar(seed: u64) -> Result<Self, ConfigError> {
        let world = World::from_scene(&Self::bar_scene())?;
        Ok(Self::new(world, VesselId(0), HandScript::pour_and_return(), seed))
    }

    /// Move the hand and advance the world one tick
    pub fn step(&mut self, dt: f32) {
        let mut tilt = self.hand.tilt_at(self.world.time);
        if self.jitter_deg > 0.0 {
            tilt += self.rng.random_range(-self.jitter_deg..=self.jitter_deg);
        }
        let transform = Transform::new(
            self.rest.position,
            self.rest.rotation * Quat::from_rotation_z(tilt.to_radians()),
        );
        if let Some(vessel) = self.world.vessel_mut(self.held) {
            vessel.set_transform(transform);
        }
        self.tracker.update(&transform, dt);
        tick(&mut self.world, dt);
    }

    /// Let go of the held vessel
    ///
    /// Returns the linear and angular release velocity and starts tracking
    /// afresh, ready for the next grab.
    pub fn release(&mut self) -> (Vec3, Vec3) {
        let velocity = (self.tracker.average_velocity(), self.tracker.angular_velocity());
        self.tracker.clear();
        velocity
    }

    /// Run for `seconds`, calling `on_second` after each whole simulated second
    pub fn run(&mut self, seconds: f32, dt: f32, mut on_second: impl FnMut(&World)) {
        if !(dt > 0.0) {
            return;
        }
        let ticks = (seconds / dt).round() as u64;
        let per_second = (1.0 / dt).round().max(1.0) as u64;
        for i in 1..=ticks {
            self.step(dt);
            if i % per_second == 0 {
                on_second(&self.world);
            }
        }
    }
}
