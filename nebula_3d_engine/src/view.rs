/// Per-view inputs to the frame core.
///
/// The Camera is a passive data container: the caller computes the view and
/// projection matrices and hands them over. Culling math stays outside this
/// crate behind the `VisibilityTest` seam.

use glam::{Mat4, Vec3, Vec4};
use crate::device::Viewport;
use crate::scene::Aabb;

// ===== CAMERA =====

/// Low-level camera. Computes nothing beyond derived matrices.
#[derive(Debug, Clone)]
pub struct Camera {
    view_matrix: Mat4,
    projection_matrix: Mat4,
    viewport: Viewport,
    near: f32,
    far: f32,
}

impl Camera {
    pub fn new(view: Mat4, projection: Mat4, viewport: Viewport, near: f32, far: f32) -> Self {
        Self {
            view_matrix: view,
            projection_matrix: projection,
            viewport,
            near,
            far,
        }
    }

    pub fn view_matrix(&self) -> &Mat4 {
        &self.view_matrix
    }

    pub fn projection_matrix(&self) -> &Mat4 {
        &self.projection_matrix
    }

    /// Combined view-projection matrix (projection * view)
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix * self.view_matrix
    }

    /// World-space position, taken from the inverse view matrix
    pub fn position(&self) -> Vec3 {
        self.view_matrix.inverse().w_axis.truncate()
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn near(&self) -> f32 {
        self.near
    }

    pub fn far(&self) -> f32 {
        self.far
    }
}

// ===== ENVIRONMENT =====

/// Fog and ambient lighting values written to the frame block
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Environment {
    pub fog_color: Vec4,
    pub fog_start: f32,
    pub fog_end: f32,
    pub fog_density: f32,
    pub ambient: Vec4,
}

impl Default for Environment {
    fn default() -> Self {
        Self {
            fog_color: Vec4::new(0.5, 0.5, 0.5, 1.0),
            fog_start: 0.0,
            fog_end: 1000.0,
            fog_density: 0.0,
            ambient: Vec4::new(0.1, 0.1, 0.1, 1.0),
        }
    }
}

// ===== VISIBILITY =====

/// Culling seam: decides whether world-space bounds are visible to a view
pub trait VisibilityTest {
    fn is_visible(&self, bounds: &Aabb) -> bool;
}

/// Accepts everything (no culling)
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysVisible;

impl VisibilityTest for AlwaysVisible {
    fn is_visible(&self, _bounds: &Aabb) -> bool {
        true
    }
}

// ===== VIEW CONTEXT =====

/// Everything the orchestrator needs to render one view
pub struct ViewContext<'a> {
    pub camera: &'a Camera,
    /// Bit `n` set means drawables on layer `n` are rendered
    pub layer_mask: u32,
    pub visibility: &'a dyn VisibilityTest,
    pub environment: Environment,
    /// Record current transforms for next frame's motion vectors
    pub track_motion: bool,
}

impl<'a> ViewContext<'a> {
    /// All layers, no culling, default environment, motion tracking on
    pub fn new(camera: &'a Camera) -> Self {
        Self {
            camera,
            layer_mask: u32::MAX,
            visibility: &AlwaysVisible,
            environment: Environment::default(),
            track_motion: true,
        }
    }

    /// Whether a drawable layer index passes the mask (layers >= 32 never do)
    pub fn accepts_layer(&self, layer: u32) -> bool {
        layer < 32 && self.layer_mask & (1 << layer) != 0
    }
}

#[cfg(test)]
#[path = "view_tests.rs"]
mod tests;
