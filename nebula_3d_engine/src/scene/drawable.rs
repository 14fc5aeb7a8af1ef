/// Drawables as seen by the frame core.
///
/// The core never owns scene objects. Each frame the caller passes a slice
/// of drawables; batches refer back to them by index.

use std::sync::Arc;
use bitflags::bitflags;
use glam::{Mat4, Vec3, Vec4};
use crate::resource::{Material, Mesh};
use crate::scene::Aabb;

/// Anything the batch builder can draw
pub trait Drawable {
    /// Stable numeric id, keys the motion-vector history
    fn stable_id(&self) -> u64;

    /// None means nothing to draw with; the drawable is skipped
    fn material(&self) -> Option<&Arc<Material>>;

    fn mesh(&self) -> &Arc<Mesh>;

    /// Layer index tested against the view's layer mask
    fn layer(&self) -> u32 {
        0
    }

    fn world_matrix(&self) -> Mat4;

    /// Position used for depth sorting and light distance
    fn world_position(&self) -> Vec3 {
        self.world_matrix().w_axis.truncate()
    }

    fn is_visible(&self) -> bool {
        true
    }

    /// World-space bounds handed to the view's visibility test
    fn bounds(&self) -> Aabb;

    fn casts_shadows(&self) -> bool {
        true
    }

    /// Per-object tint written as `u_Tint`
    fn tint(&self) -> Vec4 {
        Vec4::ONE
    }

    /// Non-empty marks a GPU-instanced drawable: one draw call covers all
    fn instance_transforms(&self) -> &[Mat4] {
        &[]
    }

    /// Per-instance tints, empty or matching `instance_transforms` in length
    fn instance_tints(&self) -> &[Vec4] {
        &[]
    }
}

bitflags! {
    /// Scene object toggles
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct DrawableFlags: u32 {
        const VISIBLE      = 1 << 0;
        const CAST_SHADOWS = 1 << 1;
    }
}

/// Concrete drawable for callers without their own scene types
#[derive(Debug, Clone)]
pub struct SceneObject {
    id: u64,
    material: Option<Arc<Material>>,
    mesh: Arc<Mesh>,
    layer: u32,
    world: Mat4,
    local_bounds: Aabb,
    flags: DrawableFlags,
    tint: Vec4,
    instances: Vec<Mat4>,
    instance_tints: Vec<Vec4>,
}

impl SceneObject {
    /// Visible, shadow-casting object on layer 0 with unit bounds
    pub fn new(id: u64, material: Option<Arc<Material>>, mesh: Arc<Mesh>, world: Mat4) -> Self {
        Self {
            id,
            material,
            mesh,
            layer: 0,
            world,
            local_bounds: Aabb::new(Vec3::splat(-0.5), Vec3::splat(0.5)),
            flags: DrawableFlags::VISIBLE | DrawableFlags::CAST_SHADOWS,
            tint: Vec4::ONE,
            instances: Vec::new(),
            instance_tints: Vec::new(),
        }
    }

    pub fn with_layer(mut self, layer: u32) -> Self {
        self.layer = layer;
        self
    }

    pub fn with_bounds(mut self, local_bounds: Aabb) -> Self {
        self.local_bounds = local_bounds;
        self
    }

    pub fn with_flags(mut self, flags: DrawableFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_tint(mut self, tint: Vec4) -> Self {
        self.tint = tint;
        self
    }

    /// Make this object GPU-instanced. Transforms are relative to `world`
    pub fn with_instances(mut self, transforms: Vec<Mat4>, tints: Vec<Vec4>) -> Self {
        let world = self.world;
        self.instances = transforms.into_iter().map(|t| world * t).collect();
        self.instance_tints = tints;
        self
    }

    pub fn set_world_matrix(&mut self, world: Mat4) {
        let delta = world * self.world.inverse();
        for instance in &mut self.instances {
            *instance = delta * *instance;
        }
        self.world = world;
    }

    pub fn flags(&self) -> DrawableFlags {
        self.flags
    }
}

impl Drawable for SceneObject {
    fn stable_id(&self) -> u64 {
        self.id
    }

    fn material(&self) -> Option<&Arc<Material>> {
        self.material.as_ref()
    }

    fn mesh(&self) -> &Arc<Mesh> {
        &self.mesh
    }

    fn layer(&self) -> u32 {
        self.layer
    }

    fn world_matrix(&self) -> Mat4 {
        self.world
    }

    fn is_visible(&self) -> bool {
        self.flags.contains(DrawableFlags::VISIBLE)
    }

    fn bounds(&self) -> Aabb {
        match self.instances.split_first() {
            None => self.local_bounds.transformed(&self.world),
            Some((first, rest)) => rest.iter().fold(
                self.local_bounds.transformed(first),
                |acc, m| acc.union(&self.local_bounds.transformed(m)),
            ),
        }
    }

    fn casts_shadows(&self) -> bool {
        self.flags.contains(DrawableFlags::CAST_SHADOWS)
    }

    fn tint(&self) -> Vec4 {
        self.tint
    }

    fn instance_transforms(&self) -> &[Mat4] {
        &self.instances
    }

    fn instance_tints(&self) -> &[Vec4] {
        &self.instance_tints
    }
}

#[cfg(test)]
#[path = "drawable_tests.rs"]
mod tests;
