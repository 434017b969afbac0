//! Fixed liquid source
//!
//! A tap has no fill level of its own. Each spout streams `volume_per_second`
//! into whatever receiving vessel its downward cast finds, and stops emitting
//! when there is nothing to catch it.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::raycast::RayCaster;
use super::state::{TapId, VesselId};
use super::visual::Emission;
use crate::config::TapConfig;

/// One nozzle of a tap
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TapSpout {
    pub position: Vec3,
    pub emission: Emission,
}

#[derive(Debug, Clone)]
pub struct Tap {
    pub id: TapId,
    pub volume_per_second: f32,
    spouts: Vec<TapSpout>,
}

impl Tap {
    pub fn new(id: TapId, config: &TapConfig) -> Self {
        let emission = Emission::for_tap(config.volume_per_second);
        let spouts = config
            .spouts
            .iter()
            .map(|&position| TapSpout { position, emission })
            .collect();
        Self {
            id,
            volume_per_second: config.volume_per_second.max(0.0),
            spouts,
        }
    }

    pub fn spouts(&self) -> &[TapSpout] {
        &self.spouts
    }

    /// Work out where this tick's flow goes
    ///
    /// Returns one `(receiver, volume)` per spout that found a vessel. Spouts
    /// with nothing below them don't run, so no volume is produced for them.
    pub fn flow(
        &mut self,
        caster: &impl RayCaster,
        max_distance: f32,
        dt: f32,
    ) -> Vec<(VesselId, f32)> {
        let volume = self.volume_per_second * dt;
        let mut deliveries = Vec::new();
        for spout in &mut self.spouts {
            let receiver = caster
                .cast_down(spout.position, max_distance)
                .and_then(|hit| hit.receiver);
            spout.emission.active = receiver.is_some();
            if let Some(vessel) = receiver {
                deliveries.push((vessel, volume));
            }
        }
        deliveries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::raycast::{MarkerCaster, ReceivingMarker};

    fn caster_below(x: f32) -> MarkerCaster {
        MarkerCaster::new(vec![ReceivingMarker {
            vessel: VesselId(3),
            center: Vec3::new(x, 0.0, 0.0),
            normal: Vec3::Y,
            radius: 0.3,
        }])
    }

    #[test]
    fn test_flow_to_receiver() {
        let mut tap = Tap::new(TapId(0), &TapConfig::new(0.5, Vec3::new(0.0, 1.0, 0.0)));
        let deliveries = tap.flow(&caster_below(0.0), 5.0, 0.1);
        assert_eq!(deliveries.len(), 1);
        assert_eq!(deliveries[0].0, VesselId(3));
        assert!((deliveries[0].1 - 0.05).abs() < 1e-6);
        assert!(tap.spouts()[0].emission.active);
    }

    #[test]
    fn test_no_receiver_stops_emission() {
        let mut tap = Tap::new(TapId(0), &TapConfig::new(0.5, Vec3::new(0.0, 1.0, 0.0)));
        tap.flow(&caster_below(0.0), 5.0, 0.1);
        // Receiver slid out from under the spout
        let deliveries = tap.flow(&caster_below(2.0), 5.0, 0.1);
        assert!(deliveries.is_empty());
        assert!(!tap.spouts()[0].emission.active);
    }

    #[test]
    fn test_multiple_spouts() {
        let config = TapConfig {
            volume_per_second: 1.0,
            spouts: vec![Vec3::new(0.0, 1.0, 0.0), Vec3::new(5.0, 1.0, 0.0)],
        };
        let mut tap = Tap::new(TapId(1), &config);
        let deliveries = tap.flow(&caster_below(0.0), 5.0, 1.0);
        assert_eq!(deliveries.len(), 1);
        assert!(tap.spouts()[0].emission.active);
        assert!(!tap.spouts()[1].emission.active);
    }
}
