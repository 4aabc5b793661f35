//! Rigid bodies, colliders and raycasts
//!
//! A minimal integrator: queued forces become velocity changes
//! on the next [`World::step`], gravity is added, and the owning entity
//! moves by `velocity * dt` in world space. Collision response is out of
//! scope; colliders only exist to be hit by rays.

use glam::Vec3;
use tether_core::native::{LogCalls, PhysicsCalls, RigidBodyCalls};
use tether_core::{ColliderShape, ComponentKey, ComponentType, ForceMode, Handle, RayHit, Severity};

use crate::records::{BodyData, ColliderData, ComponentState};
use crate::world::World;

const MAX_LAYER: u8 = 31;

impl World {
    fn body(&self, body: Handle) -> Option<&BodyData> {
        match &self.component(ComponentKey::new(body, ComponentType::RigidBody))?.state {
            ComponentState::RigidBody(data) => Some(data),
            _ => None,
        }
    }

    fn body_mut(&mut self, body: Handle) -> Option<&mut BodyData> {
        match &mut self
            .component_mut(ComponentKey::new(body, ComponentType::RigidBody))?
            .state
        {
            ComponentState::RigidBody(data) => Some(data),
            _ => None,
        }
    }

    fn collider(&self, collider: Handle) -> Option<&ColliderData> {
        match &self.component(ComponentKey::new(collider, ComponentType::Collider))?.state {
            ComponentState::Collider(data) => Some(data),
            _ => None,
        }
    }

    fn collider_mut(&mut self, collider: Handle) -> Option<&mut ColliderData> {
        match &mut self
            .component_mut(ComponentKey::new(collider, ComponentType::Collider))?
            .state
        {
            ComponentState::Collider(data) => Some(data),
            _ => None,
        }
    }

    /// Advance every rigid body by `dt` seconds.
    ///
    /// Bodies on inactive or static entities, and inactive bodies, do not
    /// move; forces queued on them are discarded.
    pub fn step(&mut self, dt: f32) {
        let gravity = Vec3::from(self.settings.gravity);
        let bodies: Vec<(Handle, Handle)> = self
            .table(ComponentType::RigidBody)
            .iter()
            .map(|(handle, record)| (handle, record.owner))
            .collect();

        for (body, owner) in bodies {
            let Some(entity) = self.entities.get(owner) else {
                continue;
            };
            let moves = entity.active && !entity.is_static;
            let transform = entity.transform;

            let Some(record) = self.component_mut(ComponentKey::new(body, ComponentType::RigidBody)) else {
                continue;
            };
            let moves = moves && record.active;
            let ComponentState::RigidBody(data) = &mut record.state else {
                continue;
            };

            if !moves {
                data.pending.clear();
                continue;
            }

            let mass = data.mass;
            for (force, mode) in data.pending.drain(..) {
                data.velocity += match mode {
                    ForceMode::Force => force / mass * dt,
                    ForceMode::Impulsive => force / mass,
                    ForceMode::VelocityChange => force,
                    ForceMode::Acceleration => force * dt,
                };
            }
            data.velocity += gravity * dt;
            let displacement = data.velocity * dt;
            let displacement = self.world_to_local_offset(owner, displacement);

            if let Some(local) = self.transform_data_mut(transform) {
                local.position += displacement;
            }
        }
    }
}

impl RigidBodyCalls for World {
    fn apply_force(&mut self, body: Handle, force: Vec3, mode: ForceMode) {
        if let Some(data) = self.body_mut(body) {
            data.pending.push((force, mode));
        }
    }

    fn velocity(&self, body: Handle) -> Option<Vec3> {
        self.body(body).map(|b| b.velocity)
    }

    fn mass(&self, body: Handle) -> Option<f32> {
        self.body(body).map(|b| b.mass)
    }

    fn set_mass(&mut self, body: Handle, mass: f32) {
        if !(mass > 0.0 && mass.is_finite()) {
            self.log(Severity::Warning, &format!("ignoring non-positive mass {mass}"));
            return;
        }
        if let Some(data) = self.body_mut(body) {
            data.mass = mass;
        }
    }
}

impl PhysicsCalls for World {
    fn raycast(&self, origin: Vec3, direction: Vec3, max_distance: f32, layer_mask: u32) -> Vec<RayHit> {
        let Some(direction) = direction.try_normalize() else {
            return Vec::new();
        };

        let mut hits = Vec::new();
        for (_, record) in self.table(ComponentType::Collider).iter() {
            if !record.active {
                continue;
            }
            let Some(entity) = self.entities.get(record.owner) else {
                continue;
            };
            if !entity.active {
                continue;
            }
            let ComponentState::Collider(collider) = &record.state else {
                continue;
            };
            if 1u32.checked_shl(u32::from(collider.layer)).unwrap_or(0) & layer_mask == 0 {
                continue;
            }
            let Some(placement) = self.world_transform(entity.transform) else {
                continue;
            };

            let scale = placement.scale.abs();
            let hit = match collider.shape {
                ColliderShape::Sphere { radius } => {
                    ray_sphere(origin, direction, placement.position, radius * scale.max_element())
                }
                ColliderShape::Box { half_extents } => {
                    let half = half_extents.abs() * scale;
                    ray_aabb(origin, direction, placement.position - half, placement.position + half)
                }
            };

            if let Some((distance, normal)) = hit {
                if distance <= max_distance {
                    hits.push(RayHit {
                        entity: record.owner,
                        position: origin + direction * distance,
                        normal,
                        distance,
                    });
                }
            }
        }

        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits
    }

    fn collider_shape(&self, collider: Handle) -> Option<ColliderShape> {
        self.collider(collider).map(|c| c.shape)
    }

    fn set_collider_shape(&mut self, collider: Handle, shape: ColliderShape) {
        if let Some(data) = self.collider_mut(collider) {
            data.shape = shape;
        }
    }

    fn collider_layer(&self, collider: Handle) -> Option<u8> {
        self.collider(collider).map(|c| c.layer)
    }

    fn set_collider_layer(&mut self, collider: Handle, layer: u8) {
        if layer > MAX_LAYER {
            self.log(
                Severity::Warning,
                &format!("collider layer {layer} out of range 0..={MAX_LAYER}"),
            );
            return;
        }
        if let Some(data) = self.collider_mut(collider) {
            data.layer = layer;
        }
    }
}

/// Entry distance and outward normal. A ray starting inside hits at zero.
fn ray_sphere(origin: Vec3, direction: Vec3, center: Vec3, radius: f32) -> Option<(f32, Vec3)> {
    let offset = origin - center;
    let b = offset.dot(direction);
    let c = offset.length_squared() - radius * radius;
    if c > 0.0 && b > 0.0 {
        return None;
    }
    let discriminant = b * b - c;
    if discriminant < 0.0 {
        return None;
    }

    let distance = (-b - discriminant.sqrt()).max(0.0);
    let point = origin + direction * distance;
    let normal = (point - center).try_normalize().unwrap_or(-direction);
    Some((distance, normal))
}

/// Slab test against an axis-aligned box.
fn ray_aabb(origin: Vec3, direction: Vec3, min: Vec3, max: Vec3) -> Option<(f32, Vec3)> {
    let mut near = f32::NEG_INFINITY;
    let mut far = f32::INFINITY;
    let mut normal = -direction;

    for axis in 0..3 {
        let (o, d) = (origin[axis], direction[axis]);
        if d.abs() < f32::EPSILON {
            if o < min[axis] || o > max[axis] {
                return None;
            }
            continue;
        }

        let t1 = (min[axis] - o) / d;
        let t2 = (max[axis] - o) / d;
        let (entry, exit) = if t1 < t2 { (t1, t2) } else { (t2, t1) };
        if entry > near {
            near = entry;
            let mut n = Vec3::ZERO;
            n[axis] = -d.signum();
            normal = n;
        }
        far = far.min(exit);
        if near > far || far < 0.0 {
            return None;
        }
    }

    if near < 0.0 {
        return Some((0.0, -direction));
    }
    Some((near, normal))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tether_core::native::{EntityCalls, TransformCalls};
    use tether_core::physics::ALL_LAYERS;

    fn collider_at(world: &mut World, position: Vec3, shape: ColliderShape) -> (Handle, Handle) {
        let e = world.create_entity("target");
        let t = world.entity_transform(e).unwrap();
        world.set_local_position(t, position);
        let c = world.add_component(e, ComponentType::Collider).unwrap();
        world.set_collider_shape(c, shape);
        (e, c)
    }

    #[test]
    fn test_ray_hits_sphere_front_face() {
        let mut world = World::new();
        let (e, _) = collider_at(&mut world, Vec3::new(0.0, 0.0, 5.0), ColliderShape::Sphere { radius: 1.0 });

        let hits = world.raycast(Vec3::ZERO, Vec3::Z, 10.0, ALL_LAYERS);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].entity, e);
        assert!(hits[0].position.abs_diff_eq(Vec3::new(0.0, 0.0, 4.0), 1e-5));
        assert!(hits[0].normal.abs_diff_eq(Vec3::NEG_Z, 1e-5));
    }

    #[test]
    fn test_ray_hits_box() {
        let mut world = World::new();
        collider_at(
            &mut world,
            Vec3::new(3.0, 0.0, 0.0),
            ColliderShape::Box {
                half_extents: Vec3::splat(0.5),
            },
        );

        let hits = world.raycast(Vec3::ZERO, Vec3::new(2.0, 0.0, 0.0), 10.0, ALL_LAYERS);
        assert_eq!(hits.len(), 1);
        assert!((hits[0].distance - 2.5).abs() < 1e-5);
        assert_eq!(hits[0].normal, Vec3::NEG_X);
    }

    #[test]
    fn test_hits_sorted_and_limited() {
        let mut world = World::new();
        let sphere = ColliderShape::Sphere { radius: 0.5 };
        let (far, _) = collider_at(&mut world, Vec3::new(0.0, 0.0, 8.0), sphere);
        let (near, _) = collider_at(&mut world, Vec3::new(0.0, 0.0, 3.0), sphere);
        collider_at(&mut world, Vec3::new(0.0, 0.0, 30.0), sphere);

        let hits = world.raycast(Vec3::ZERO, Vec3::Z, 10.0, ALL_LAYERS);
        let entities: Vec<_> = hits.iter().map(|h| h.entity).collect();
        assert_eq!(entities, vec![near, far]);
    }

    #[test]
    fn test_layer_mask_filters() {
        let mut world = World::new();
        let (_, c) = collider_at(&mut world, Vec3::new(0.0, 0.0, 5.0), ColliderShape::default());
        world.set_collider_layer(c, 4);

        assert!(world.raycast(Vec3::ZERO, Vec3::Z, 10.0, 1 << 3).is_empty());
        assert_eq!(world.raycast(Vec3::ZERO, Vec3::Z, 10.0, 1 << 4).len(), 1);
    }

    #[test]
    fn test_zero_direction_hits_nothing() {
        let mut world = World::new();
        collider_at(&mut world, Vec3::ZERO, ColliderShape::default());
        assert!(world.raycast(Vec3::ZERO, Vec3::ZERO, 10.0, ALL_LAYERS).is_empty());
    }

    #[test]
    fn test_inactive_entity_is_not_hit() {
        let mut world = World::new();
        let (e, _) = collider_at(&mut world, Vec3::new(0.0, 0.0, 5.0), ColliderShape::default());
        world.set_entity_active(e, false);
        assert!(world.raycast(Vec3::ZERO, Vec3::Z, 10.0, ALL_LAYERS).is_empty());
    }

    #[test]
    fn test_force_waits_for_step() {
        let mut world = World::with_settings(tether_services::WorldSettings {
            gravity: [0.0; 3],
            ..Default::default()
        });
        let e = world.create_entity("");
        let body = world.add_component(e, ComponentType::RigidBody).unwrap();
        world.set_mass(body, 2.0);

        world.apply_force(body, Vec3::new(4.0, 0.0, 0.0), ForceMode::Impulsive);
        assert_eq!(world.velocity(body), Some(Vec3::ZERO));

        world.step(0.5);
        assert_eq!(world.velocity(body), Some(Vec3::new(2.0, 0.0, 0.0)));
        let t = world.entity_transform(e).unwrap();
        assert_eq!(world.local_position(t), Some(Vec3::new(1.0, 0.0, 0.0)));
    }

    #[test]
    fn test_force_modes() {
        let mut world = World::with_settings(tether_services::WorldSettings {
            gravity: [0.0; 3],
            ..Default::default()
        });
        let e = world.create_entity("");
        let body = world.add_component(e, ComponentType::RigidBody).unwrap();
        world.set_mass(body, 2.0);

        world.apply_force(body, Vec3::X * 4.0, ForceMode::Force); // 4 / 2 * 0.5 = 1
        world.apply_force(body, Vec3::X * 3.0, ForceMode::VelocityChange); // 3
        world.apply_force(body, Vec3::X * 2.0, ForceMode::Acceleration); // 2 * 0.5 = 1
        world.step(0.5);
        assert_eq!(world.velocity(body), Some(Vec3::X * 5.0));
    }

    #[test]
    fn test_velocity_is_world_space_under_parent() {
        let mut world = World::with_settings(tether_services::WorldSettings {
            gravity: [0.0; 3],
            ..Default::default()
        });
        let parent = world.create_entity("parent");
        let pt = world.entity_transform(parent).unwrap();
        world.set_local_position(pt, Vec3::X);
        world.set_local_rotation(pt, glam::Quat::from_rotation_y(std::f32::consts::FRAC_PI_2));
        world.set_local_scale(pt, Vec3::splat(2.0));

        let child = world.create_entity("child");
        world.set_entity_parent(child, Some(parent));
        let ct = world.entity_transform(child).unwrap();
        let body = world.add_component(child, ComponentType::RigidBody).unwrap();
        world.apply_force(body, Vec3::X * 3.0, ForceMode::VelocityChange);

        world.step(1.0);
        let position = world.world_position(ct).unwrap();
        assert!(position.abs_diff_eq(Vec3::new(4.0, 0.0, 0.0), 1e-4));
    }

    #[test]
    fn test_gravity_and_static_bodies() {
        let mut world = World::new();
        let falling = world.create_entity("");
        let pinned = world.create_entity("");
        let a = world.add_component(falling, ComponentType::RigidBody).unwrap();
        let b = world.add_component(pinned, ComponentType::RigidBody).unwrap();
        world.set_entity_static(pinned, true);
        world.apply_force(b, Vec3::Y * 100.0, ForceMode::VelocityChange);

        world.step(1.0);
        assert!(world.velocity(a).unwrap().abs_diff_eq(Vec3::new(0.0, -9.81, 0.0), 1e-5));
        assert_eq!(world.velocity(b), Some(Vec3::ZERO));
        // Discarded, not deferred.
        world.set_entity_static(pinned, false);
        world.step(0.0);
        assert_eq!(world.velocity(b), Some(Vec3::ZERO));
    }

    #[test]
    fn test_invalid_mass_is_rejected() {
        let mut world = World::new();
        let e = world.create_entity("");
        let body = world.add_component(e, ComponentType::RigidBody).unwrap();
        world.set_mass(body, 0.0);
        assert_eq!(world.mass(body), Some(1.0));
        assert_eq!(world.diagnostics().len(), 1);
    }
}
