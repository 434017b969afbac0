//! Deterministic pouring model
//!
//! All per-tick logic lives here. This module must stay pure and deterministic:
//! - Time only advances through explicit `dt`
//! - Stable iteration order (by vessel and tap id)
//! - No rendering or engine dependencies; the physics ray cast and the visual
//!   outputs are reached through traits

pub mod geometry;
pub mod raycast;
pub mod rim;
pub mod state;
pub mod tap;
pub mod tick;
pub mod transfer;
pub mod velocity;
pub mod vessel;
pub mod visual;

pub use geometry::{
    MeshFit, SurfacePose, effective_radius, liquid_height, liquid_surface_pose,
    percent_for_volume, spill_threshold, total_volume, volume_at_percent,
};
pub use raycast::{MarkerCaster, RayCaster, RayHit, ReceivingMarker};
pub use rim::{RimPoint, RimRing};
pub use state::{TapId, VesselId, VolumeLedger, World, WorldReport};
pub use tap::{Tap, TapSpout};
pub use tick::{tick, tick_with};
pub use transfer::{Delivery, deliver, find_receiver, receiver_below};
pub use velocity::ThrowTracker;
pub use vessel::{PourOutput, PourState, ReceiveOutcome, Vessel, VesselReport};
pub use visual::{Emission, EmitterId, LiquidPose, VisualSink};
