//! World state: every vessel and tap in a scene
//!
//! Vessels and taps live in arenas indexed by their id and are never removed,
//! so ids stay valid for the lifetime of the world and iteration order is
//! stable.

use serde::{Deserialize, Serialize};

use super::raycast::{MarkerCaster, ReceivingMarker};
use super::tap::Tap;
use super::vessel::{Vessel, VesselReport};
use super::visual::{EmitterId, VisualSink};
use crate::config::{ConfigError, SceneConfig, SimConfig, TapConfig, VesselConfig};

/// Handle to a vessel in a `World`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VesselId(pub usize);

/// Handle to a tap in a `World`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TapId(pub usize);

/// Running volume bookkeeping
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct VolumeLedger {
    /// Volume supplied by taps
    pub dispensed: f32,
    /// Volume that left a vessel or tap with nothing below to catch it
    pub spilled: f32,
}

/// Complete simulation state
#[derive(Debug, Clone)]
pub struct World {
    pub config: SimConfig,
    /// Simulation time in seconds
    pub time: f32,
    /// Simulation tick counter
    pub time_ticks: u64,
    pub ledger: VolumeLedger,
    pub(super) vessels: Vec<Vessel>,
    pub(super) taps: Vec<Tap>,
}

impl Default for World {
    fn default() -> Self {
        Self::new(SimConfig::default())
    }
}

impl World {
    pub fn new(config: SimConfig) -> Self {
        Self {
            config,
            time: 0.0,
            time_ticks: 0,
            ledger: VolumeLedger::default(),
            vessels: Vec::new(),
            taps: Vec::new(),
        }
    }

    /// Build a world from a validated scene
    pub fn from_scene(scene: &SceneConfig) -> Result<Self, ConfigError> {
        scene.validate()?;
        let mut world = Self::new(scene.sim.clone());
        for vessel in &scene.vessels {
            world.add_vessel(vessel);
        }
        for tap in &scene.taps {
            world.add_tap(tap);
        }
        log::info!(
            "World created with {} vessels and {} taps",
            world.vessels.len(),
            world.taps.len()
        );
        Ok(world)
    }

    pub fn add_vessel(&mut self, config: &VesselConfig) -> VesselId {
        let id = VesselId(self.vessels.len());
        self.vessels.push(Vessel::new(id, config));
        id
    }

    pub fn add_tap(&mut self, config: &TapConfig) -> TapId {
        let id = TapId(self.taps.len());
        self.taps.push(Tap::new(id, config));
        id
    }

    pub fn vessel(&self, id: VesselId) -> Option<&Vessel> {
        self.vessels.get(id.0)
    }

    pub fn vessel_mut(&mut self, id: VesselId) -> Option<&mut Vessel> {
        self.vessels.get_mut(id.0)
    }

    pub fn vessels(&self) -> &[Vessel] {
        &self.vessels
    }

    pub fn tap(&self, id: TapId) -> Option<&Tap> {
        self.taps.get(id.0)
    }

    pub fn taps(&self) -> &[Tap] {
        &self.taps
    }

    /// Receiving markers of every vessel at their current placement
    pub fn markers(&self) -> Vec<ReceivingMarker> {
        self.vessels.iter().map(Vessel::marker).collect()
    }

    /// Built-in caster over this world's markers
    pub fn marker_caster(&self) -> MarkerCaster {
        MarkerCaster::new(self.markers())
    }

    /// Total liquid held across all vessels
    pub fn total_liquid(&self) -> f32 {
        self.vessels.iter().map(Vessel::volume).sum()
    }

    /// Push current emission and liquid pose outputs to the renderer
    pub fn publish(&self, sink: &mut impl VisualSink) {
        for vessel in &self.vessels {
            sink.set_emission(EmitterId::Vessel(vessel.id), vessel.emission());
            sink.set_liquid_pose(vessel.id, vessel.pose());
        }
        for tap in &self.taps {
            for (i, spout) in tap.spouts().iter().enumerate() {
                sink.set_emission(
                    EmitterId::TapSpout {
                        tap: tap.id,
                        spout: i,
                    },
                    spout.emission,
                );
            }
        }
    }

    pub fn report(&self) -> WorldReport {
        WorldReport {
            time: self.time,
            time_ticks: self.time_ticks,
            ledger: self.ledger,
            total_liquid: self.total_liquid(),
            vessels: self.vessels.iter().map(Vessel::report).collect(),
        }
    }
}

/// Serializable world snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldReport {
    pub time: f32,
    pub time_ticks: u64,
    pub ledger: VolumeLedger,
    pub total_liquid: f32,
    pub vessels: Vec<VesselReport>,
}
