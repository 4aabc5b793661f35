//! Math value types
//!
//! Re-exports glam. Vectors and quaternions cross the boundary by value; the
//! scripting side never does more than pass them through.

pub use glam::{EulerRot, Quat, Vec2, Vec3};

/// Euler angles in degrees (XYZ order) for a rotation.
pub fn to_euler_degrees(rotation: Quat) -> Vec3 {
    let (x, y, z) = rotation.to_euler(EulerRot::XYZ);
    Vec3::new(x.to_degrees(), y.to_degrees(), z.to_degrees())
}

/// Rotation from Euler angles in degrees (XYZ order).
pub fn from_euler_degrees(angles: Vec3) -> Quat {
    Quat::from_euler(
        EulerRot::XYZ,
        angles.x.to_radians(),
        angles.y.to_radians(),
        angles.z.to_radians(),
    )
}
