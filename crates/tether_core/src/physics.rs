//! Physics values exchanged across the boundary

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::handle::Handle;

/// How a force passed to `apply_force` is interpreted.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ForceMode {
    /// Continuous force, scaled by mass and the step duration.
    #[default]
    Force,
    /// Instant impulse, scaled by mass.
    Impulsive,
    /// Instant velocity change, ignores mass.
    VelocityChange,
    /// Continuous acceleration, ignores mass.
    Acceleration,
}

/// Collision volume of a collider, centered on its entity's world position.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub enum ColliderShape {
    Sphere { radius: f32 },
    Box { half_extents: Vec3 },
}

impl Default for ColliderShape {
    fn default() -> Self {
        ColliderShape::Sphere { radius: 0.5 }
    }
}

/// One intersection reported by a raycast.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RayHit {
    /// Entity owning the struck collider.
    pub entity: Handle,
    /// World-space hit point.
    pub position: Vec3,
    /// Outward surface normal at the hit point.
    pub normal: Vec3,
    /// Distance along the ray.
    pub distance: f32,
}

/// Layer mask matching every layer.
pub const ALL_LAYERS: u32 = u32::MAX;
