//! Volume hand-off between vessels
//!
//! The receiver below a spout is looked up fresh on every call and never
//! cached: a cup slid under a tap starts receiving on the very next tick.

use glam::Vec3;

use super::raycast::RayCaster;
use super::state::{VesselId, World};
use super::vessel::ReceiveOutcome;

/// Where a delivered volume ended up
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Delivery {
    /// Volume absorbed by vessels along the chain
    pub accepted: f32,
    /// Volume that ran out of receivers
    pub lost: f32,
    /// Number of overflow hand-offs
    pub hops: u32,
}

/// Receiving vessel directly below `origin`, ignoring `source`
pub fn receiver_below(
    caster: &impl RayCaster,
    origin: Vec3,
    max_distance: f32,
    source: Option<VesselId>,
) -> Option<VesselId> {
    let hit = caster.cast_down(origin, max_distance)?;
    hit.receiver.filter(|&id| Some(id) != source)
}

/// Receiving vessel below a vessel's current spout
pub fn find_receiver(world: &World, caster: &impl RayCaster, source: VesselId) -> Option<VesselId> {
    let vessel = world.vessel(source)?;
    receiver_below(
        caster,
        vessel.spout(),
        world.config.raycast_max_distance,
        Some(source),
    )
}

/// Hand `volume` to `target`, cascading overflow through vessels below it
pub fn deliver(
    world: &mut World,
    caster: &impl RayCaster,
    target: VesselId,
    volume: f32,
) -> Delivery {
    let now = world.time;
    let policy = world.config.overflow_policy;
    let cooldown = world.config.overflow_cooldown();
    let max_hops = world.config.max_transfer_hops;

    let mut delivery = Delivery::default();
    let mut target = target;
    let mut volume = volume;

    loop {
        let Some(vessel) = world.vessel_mut(target) else {
            delivery.lost += volume;
            break;
        };
        let forward = match vessel.receive(volume, now, policy, cooldown) {
            ReceiveOutcome::Accepted { excess } => {
                delivery.accepted += volume - excess;
                delivery.lost += excess;
                break;
            }
            ReceiveOutcome::Overflow { forward } => forward,
        };
        delivery.accepted += volume - forward;

        if delivery.hops >= max_hops {
            log::warn!(
                "Overflow chain from {:?} exceeded {} hops; dropping {:.5}",
                target,
                max_hops,
                forward
            );
            delivery.lost += forward;
            break;
        }

        let Some(next) = find_receiver(world, caster, target) else {
            log::trace!("Overflow from {:?} has no receiver; {:.5} lost", target, forward);
            delivery.lost += forward;
            break;
        };
        if let Some(vessel) = world.vessel_mut(target) {
            vessel.size_overflow(forward);
        }
        log::trace!("Overflow {:?} -> {:?}: {:.5}", target, next, forward);
        delivery.hops += 1;
        target = next;
        volume = forward;
    }

    world.ledger.spilled += delivery.lost;
    delivery
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{OverflowPolicy, VesselConfig};
    use crate::sim::vessel::PourState;

    /// Three cups stacked in a column, top to bottom
    fn column(fills: [f32; 3]) -> World {
        let mut world = World::default();
        for (i, fill) in fills.iter().enumerate() {
            let y = (2 - i) as f32 * 1.5;
            let mut config = VesselConfig::new(0.3, 1.0)
                .with_fill(*fill)
                .at(Vec3::new(0.0, y, 0.0));
            // Keep spouts well inside the opening of the cup below
            config.rim_radius = Some(0.2);
            world.add_vessel(&config);
        }
        world
    }

    #[test]
    fn test_plain_delivery() {
        let mut world = column([0.0, 0.0, 0.0]);
        let caster = world.marker_caster();
        let volume = world.vessels()[0].total_volume() * 0.2;
        let d = deliver(&mut world, &caster, VesselId(0), volume);
        assert_eq!(d.hops, 0);
        assert_eq!(d.lost, 0.0);
        assert!((world.vessels()[0].fill_percent() - 20.0).abs() < 1e-3);
    }

    #[test]
    fn test_overflow_routes_to_vessel_below() {
        let mut world = column([95.0, 0.0, 0.0]);
        let caster = world.marker_caster();
        let total = world.vessels()[0].total_volume();
        let d = deliver(&mut world, &caster, VesselId(0), total * 0.1);

        let top = &world.vessels()[0];
        assert!(top.fill_percent() <= 100.0);
        assert_eq!(top.state(), PourState::Overflowing);
        assert_eq!(d.hops, 1);
        assert!((world.vessels()[1].fill_percent() - 5.0).abs() < 1e-2);
        assert!((d.accepted - total * 0.1).abs() < 1e-5);
    }

    #[test]
    fn test_overflow_cascades_down_the_column() {
        let mut world = column([100.0, 100.0, 10.0]);
        let caster = world.marker_caster();
        let total = world.vessels()[0].total_volume();
        let d = deliver(&mut world, &caster, VesselId(0), total * 0.3);
        assert_eq!(d.hops, 2);
        assert!((world.vessels()[2].fill_percent() - 40.0).abs() < 1e-2);
        assert!(world.vessels()[1].is_overflowing());
    }

    #[test]
    fn test_overflow_with_nothing_below_is_lost() {
        let mut world = column([100.0, 100.0, 100.0]);
        let caster = world.marker_caster();
        let d = deliver(&mut world, &caster, VesselId(2), 0.01);
        assert_eq!(d.hops, 0);
        assert!((d.lost - 0.01).abs() < 1e-6);
        assert!((world.ledger.spilled - 0.01).abs() < 1e-6);
        assert_eq!(world.vessels()[2].fill_percent(), 100.0);
    }

    #[test]
    fn test_hop_limit() {
        let mut world = column([100.0, 100.0, 0.0]);
        world.config.max_transfer_hops = 1;
        let caster = world.marker_caster();
        let d = deliver(&mut world, &caster, VesselId(0), 0.01);
        assert_eq!(d.hops, 1);
        assert!(d.lost > 0.0);
        assert_eq!(world.vessels()[2].fill_percent(), 0.0);
    }

    #[test]
    fn test_forward_incoming_policy() {
        let mut world = column([95.0, 0.0, 0.0]);
        world.config.overflow_policy = OverflowPolicy::ForwardIncoming;
        let caster = world.marker_caster();
        let total = world.vessels()[0].total_volume();
        deliver(&mut world, &caster, VesselId(0), total * 0.1);
        assert_eq!(world.vessels()[0].fill_percent(), 95.0);
        assert!((world.vessels()[1].fill_percent() - 10.0).abs() < 1e-2);
    }

    #[test]
    fn test_receiver_ignores_source() {
        let world = column([0.0, 0.0, 0.0]);
        let caster = world.marker_caster();
        let above_top = Vec3::new(0.0, 5.0, 0.0);
        assert_eq!(receiver_below(&caster, above_top, 5.0, None), Some(VesselId(0)));
        assert_eq!(receiver_below(&caster, above_top, 5.0, Some(VesselId(0))), None);
    }
}
