//! Closed-form cylinder liquid geometry
//!
//! The liquid is treated as filling the full circular cross-section up to the
//! liquid height H while at least half full, and as a shrinking circular cap
//! below that. Every function here is pure: (fill %, tilt, radius, height) in,
//! numbers out. Degenerate input is floored at `GEOMETRY_EPSILON` rather than
//! rejected.

use std::f32::consts::PI;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Total capacity of a cylinder
#[inline]
pub fn total_volume(radius: f32, height: f32) -> f32 {
    PI * radius * radius * height
}

/// Liquid height when upright
#[inline]
pub fn liquid_height(fill_percent: f32, height: f32) -> f32 {
    fill_percent * 0.01 * height
}

/// Radius the liquid still covers at the base
///
/// Below 50% the tilted liquid no longer reaches across the whole base.
#[inline]
pub fn effective_radius(fill_percent: f32, radius: f32) -> f32 {
    if fill_percent >= 50.0 {
        radius
    } else {
        radius * (fill_percent.max(0.0) / 50.0)
    }
}

/// Volume held at a given fill level
#[inline]
pub fn volume_at_percent(fill_percent: f32, radius: f32, height: f32) -> f32 {
    PI * radius * radius * liquid_height(fill_percent, height)
}

/// Convert a volume into the fill percent it represents in a vessel
#[inline]
pub fn percent_for_volume(volume: f32, total_volume: f32) -> f32 {
    100.0 * volume / total_volume.max(f32::MIN_POSITIVE)
}

/// Headroom between the liquid surface and the rim, floored at epsilon
#[inline]
fn headroom(fill_percent: f32, height: f32) -> f32 {
    (height - liquid_height(fill_percent, height)).max(GEOMETRY_EPSILON)
}

/// Tilt angle (degrees) at which liquid reaches the rim
///
/// 90 - atan(r / (height - H)). Emptier vessels must tilt further.
pub fn spill_threshold(fill_percent: f32, radius: f32, height: f32) -> f32 {
    let r = effective_radius(fill_percent, radius);
    let theta = (r / headroom(fill_percent, height)).atan();
    90.0 - theta.to_degrees()
}

/// How far past rest the vessel is towards its spill threshold, in [0, 1]
#[inline]
pub fn tilt_ratio(tilt_deg: f32, threshold_deg: f32) -> f32 {
    if threshold_deg <= GEOMETRY_EPSILON {
        return if tilt_deg > 0.0 { 1.0 } else { 0.0 };
    }
    (tilt_deg / threshold_deg).clamp(0.0, 1.0)
}

/// Target pose of the liquid mesh joints for one fill/tilt combination
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurfacePose {
    /// Spill threshold the pose was computed against (degrees)
    pub threshold_deg: f32,
    /// Local Y of the upper (surface) joint
    pub upper_offset_y: f32,
    /// Rotation of the upper joint about the vessel's -X axis (degrees)
    pub surface_angle_deg: f32,
    /// Non-uniform scale of the lower joint (only deviates below 50%)
    pub lower_scale: Vec3,
    /// Non-uniform scale of the upper joint
    pub upper_scale: Vec3,
    /// Shift of the whole liquid body along the vessel up axis (below 50%)
    pub base_shift: f32,
}

/// Mesh-specific knobs that don't change the volume model
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshFit {
    /// Unfillable height under the liquid surface joint
    pub surface_offset: f32,
    /// Vertical scale of the container mesh
    pub y_scale: f32,
}

impl Default for MeshFit {
    fn default() -> Self {
        Self {
            surface_offset: 0.0,
            y_scale: 1.0,
        }
    }
}

/// Compute the liquid joint pose for a fill level and tilt
///
/// The surface joint rises with H, rotates up to the spill threshold, and is
/// stretched so the mesh keeps covering the tilted opening: the span it must
/// cover is the hypotenuse of the axial space `x = 2 (height - H)` and the
/// liquid diameter `a = 2 r`.
pub fn liquid_surface_pose(
    fill_percent: f32,
    tilt_deg: f32,
    radius: f32,
    height: f32,
    fit: MeshFit,
) -> SurfacePose {
    let radius = radius.max(GEOMETRY_EPSILON);
    let height = height.max(GEOMETRY_EPSILON);
    let inv_y_scale = 1.0 / fit.y_scale.max(GEOMETRY_EPSILON);

    let h_liquid = liquid_height(fill_percent, height);
    let r = effective_radius(fill_percent, radius);
    let threshold_deg = spill_threshold(fill_percent, radius, height);
    let ratio = tilt_ratio(tilt_deg, threshold_deg);

    // 2r / tan(atan(r / d)) reduces to 2d and stays finite when r is zero
    let x_raw = 2.0 * headroom(fill_percent, height);
    let untouched = height - x_raw;
    let x = x_raw.clamp(0.0, height);

    let mut upper_offset_y = h_liquid * inv_y_scale + fit.surface_offset;
    let mut base_shift = 0.0;
    if fill_percent < 50.0 {
        upper_offset_y -= untouched / 2.0 * inv_y_scale * ratio;
    }
    if fill_percent <= 50.0 {
        let max_shift = BASE_SHIFT_UNIT + 2.0 * radius + BASE_SHIFT_PAD;
        base_shift = ratio * (max_shift - max_shift * (fill_percent.max(0.0) / 50.0));
    }

    let scale_dist = 2.0 * radius;
    let a = 2.0 * r;
    let mut lower_scale = Vec3::ONE;
    let mut side_scale = 0.0;
    if fill_percent <= 50.0 {
        let lower = a / scale_dist - 1.0;
        side_scale = lower;
        let s = (1.0 + ratio * lower).max(0.0);
        lower_scale = Vec3::new(s, 1.0, s);
    }
    let dist_needed = (x * x + a * a).sqrt();
    let stretch = dist_needed / scale_dist - 1.0;
    let upper_scale = Vec3::new(
        (1.0 + ratio * side_scale).max(0.0),
        1.0,
        (1.0 + ratio * stretch).max(0.0),
    );

    SurfacePose {
        threshold_deg,
        upper_offset_y,
        surface_angle_deg: tilt_deg.clamp(0.0, threshold_deg.max(0.0)),
        lower_scale,
        upper_scale,
        base_shift,
    }
}
