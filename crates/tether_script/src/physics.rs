//! Scene queries

use glam::Vec3;
use tether_core::native::PhysicsCalls;
use tether_core::physics::ALL_LAYERS;

use crate::entity::Entity;

/// One raycast intersection.
#[derive(Debug, Clone)]
pub struct RaycastHit {
    pub entity: Entity,
    pub position: Vec3,
    pub normal: Vec3,
    pub distance: f32,
}

pub struct Physics3D;

impl Physics3D {
    /// Every collider hit within `max_distance`, nearest first.
    pub fn raycast(
        engine: &(impl PhysicsCalls + ?Sized),
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
    ) -> Vec<RaycastHit> {
        Self::raycast_masked(engine, origin, direction, max_distance, ALL_LAYERS)
    }

    /// Like [`Physics3D::raycast`], limited to colliders whose layer bit is
    /// set in `layer_mask`.
    pub fn raycast_masked(
        engine: &(impl PhysicsCalls + ?Sized),
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        layer_mask: u32,
    ) -> Vec<RaycastHit> {
        engine
            .raycast(origin, direction, max_distance, layer_mask)
            .into_iter()
            .map(|hit| RaycastHit {
                entity: Entity::from_handle(hit.entity),
                position: hit.position,
                normal: hit.normal,
                distance: hit.distance,
            })
            .collect()
    }

    pub fn raycast_first(
        engine: &(impl PhysicsCalls + ?Sized),
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
    ) -> Option<RaycastHit> {
        Self::raycast(engine, origin, direction, max_distance)
            .into_iter()
            .next()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::EntityList;
    use crate::views::Collider;
    use tether_core::ColliderShape;
    use tether_world::World;

    fn place_target(world: &mut World, position: Vec3, layer: u8) -> Entity {
        let entity = EntityList::create_named(world, "target");
        entity.transform(&*world).unwrap().set_local_position(world, position);
        let collider = entity.add_component::<Collider>(world).unwrap();
        collider.set_shape(world, ColliderShape::Sphere { radius: 0.001 });
        collider.set_layer(world, layer);
        entity
    }

    #[test]
    fn test_raycast_hits_collider() {
        let mut world = World::new();
        let target = place_target(&mut world, Vec3::new(0.0, 0.0, 5.0), 0);

        let hits = Physics3D::raycast(&world, Vec3::ZERO, Vec3::Z, 10.0);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].entity, target);
        assert!(hits[0].position.abs_diff_eq(Vec3::new(0.0, 0.0, 5.0), 0.01));
        assert!(hits[0].normal.abs_diff_eq(Vec3::NEG_Z, 1e-4));
    }

    #[test]
    fn test_raycast_respects_max_distance() {
        let mut world = World::new();
        place_target(&mut world, Vec3::new(0.0, 0.0, 5.0), 0);

        assert!(Physics3D::raycast(&world, Vec3::ZERO, Vec3::Z, 2.0).is_empty());
        assert!(Physics3D::raycast(&world, Vec3::ZERO, Vec3::NEG_Z, 10.0).is_empty());
    }

    #[test]
    fn test_raycast_orders_nearest_first() {
        let mut world = World::new();
        let far = place_target(&mut world, Vec3::new(0.0, 0.0, 8.0), 0);
        let near = place_target(&mut world, Vec3::new(0.0, 0.0, 3.0), 0);

        let hits = Physics3D::raycast(&world, Vec3::ZERO, Vec3::Z, 10.0);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].entity, near);
        assert_eq!(hits[1].entity, far);
        assert_eq!(
            Physics3D::raycast_first(&world, Vec3::ZERO, Vec3::Z, 10.0).map(|h| h.entity),
            Some(near)
        );
    }

    #[test]
    fn test_raycast_layer_mask() {
        let mut world = World::new();
        place_target(&mut world, Vec3::new(0.0, 0.0, 3.0), 2);
        let other = place_target(&mut world, Vec3::new(0.0, 0.0, 6.0), 5);

        let hits = Physics3D::raycast_masked(&world, Vec3::ZERO, Vec3::Z, 10.0, 1 << 5);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].entity, other);
    }
}
