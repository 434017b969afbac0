//! Per-tick world update
//!
//! Within a tick taps run first, then vessels in id order. Each vessel
//! refreshes its spout, recomputes its liquid pose, decides whether it pours
//! and hands the outgoing volume to whatever sits below the spout. A vessel may
//! both receive and pour in the same tick; the effects are applied in that
//! call order.

use super::raycast::RayCaster;
use super::state::{VesselId, World};
use super::transfer::{deliver, receiver_below};

/// Advance the world by `dt` seconds using its own receiving markers
pub fn tick(world: &mut World, dt: f32) {
    let caster = world.marker_caster();
    tick_with(world, &caster, dt);
}

/// Advance the world by `dt` seconds against an external ray caster
pub fn tick_with(world: &mut World, caster: &impl RayCaster, dt: f32) {
    world.time += dt;
    world.time_ticks += 1;
    let max_distance = world.config.raycast_max_distance;

    for t in 0..world.taps.len() {
        let deliveries = world.taps[t].flow(caster, max_distance, dt);
        for (receiver, volume) in deliveries {
            world.ledger.dispensed += volume;
            deliver(world, caster, receiver, volume);
        }
    }

    for i in 0..world.vessels.len() {
        let now = world.time;
        let Some(out) = world.vessels[i].tick(now) else {
            continue;
        };
        let source = VesselId(i);
        match receiver_below(caster, out.spout, max_distance, Some(source)) {
            Some(receiver) => {
                log::trace!("{:?} pours {:.5} into {:?}", source, out.volume, receiver);
                deliver(world, caster, receiver, out.volume);
            }
            None => {
                world.ledger.spilled += out.volume;
            }
        }
    }

    debug_assert!(
        world
            .vessels
            .iter()
            .all(|v| (0.0..=100.0).contains(&v.fill_percent())),
        "fill percent escaped [0, 100]"
    );
}
