//! Transform hierarchy
//!
//! Local values are stored; world values are composed on demand by walking
//! the parent chain, so a read always reflects the current tree.

use glam::{Quat, Vec3};
use tether_core::native::TransformCalls;
use tether_core::{ComponentKey, ComponentType, Handle};

use crate::records::TransformData;
use crate::world::World;

impl World {
    /// World-space position, rotation and scale of a transform.
    pub(crate) fn world_transform(&self, transform: Handle) -> Option<TransformData> {
        let mut world = *self.transform_data(transform)?;
        let owner = self
            .component(ComponentKey::new(transform, ComponentType::Transform))?
            .owner;

        let mut parent = self.entities.get(owner).and_then(|r| r.parent);
        while let Some(entity) = parent {
            let Some(record) = self.entities.get(entity) else {
                break;
            };
            if let Some(local) = self.transform_data(record.transform) {
                world = TransformData {
                    position: local.position + local.rotation * (local.scale * world.position),
                    rotation: local.rotation * world.rotation,
                    scale: local.scale * world.scale,
                };
            }
            parent = record.parent;
        }
        Some(world)
    }

    /// A world-space offset expressed in the local space of `entity`.
    pub(crate) fn world_to_local_offset(&self, entity: Handle, offset: Vec3) -> Vec3 {
        let Some(parent) = self.entities.get(entity).and_then(|r| r.parent) else {
            return offset;
        };
        let Some(frame) = self
            .entities
            .get(parent)
            .and_then(|r| self.world_transform(r.transform))
        else {
            return offset;
        };
        // A zero scale axis collapses the child; leave that axis unscaled.
        let scale = Vec3::select(frame.scale.cmpeq(Vec3::ZERO), Vec3::ONE, frame.scale);
        (frame.rotation.inverse() * offset) / scale
    }
}

impl TransformCalls for World {
    fn local_position(&self, transform: Handle) -> Option<Vec3> {
        self.transform_data(transform).map(|t| t.position)
    }

    fn set_local_position(&mut self, transform: Handle, position: Vec3) {
        if let Some(data) = self.transform_data_mut(transform) {
            data.position = position;
        }
    }

    fn local_rotation(&self, transform: Handle) -> Option<Quat> {
        self.transform_data(transform).map(|t| t.rotation)
    }

    fn set_local_rotation(&mut self, transform: Handle, rotation: Quat) {
        if let Some(data) = self.transform_data_mut(transform) {
            data.rotation = rotation;
        }
    }

    fn local_scale(&self, transform: Handle) -> Option<Vec3> {
        self.transform_data(transform).map(|t| t.scale)
    }

    fn set_local_scale(&mut self, transform: Handle, scale: Vec3) {
        if let Some(data) = self.transform_data_mut(transform) {
            data.scale = scale;
        }
    }

    fn world_position(&self, transform: Handle) -> Option<Vec3> {
        self.world_transform(transform).map(|t| t.position)
    }

    fn world_rotation(&self, transform: Handle) -> Option<Quat> {
        self.world_transform(transform).map(|t| t.rotation)
    }

    fn world_scale(&self, transform: Handle) -> Option<Vec3> {
        self.world_transform(transform).map(|t| t.scale)
    }

    fn up(&self, transform: Handle) -> Option<Vec3> {
        self.local_rotation(transform).map(|r| r * Vec3::Y)
    }

    fn right(&self, transform: Handle) -> Option<Vec3> {
        self.local_rotation(transform).map(|r| r * Vec3::X)
    }

    fn forward(&self, transform: Handle) -> Option<Vec3> {
        self.local_rotation(transform).map(|r| r * Vec3::NEG_Z)
    }
}
