/// CommandList trait - the narrow GPU surface the frame core records into

use glam::{Mat4, Vec4};
use crate::error::Result;
use crate::device::RenderState;
use crate::resource::{Mesh, ProgramId};
use crate::uniform::UniformValue;

/// Command list for recording rendering commands
///
/// Every call is treated as a synchronous boundary: the frame core never
/// suspends between two calls of the same batch.
pub trait CommandList: Send + Sync {
    /// Begin a render pass on the given target
    ///
    /// # Arguments
    ///
    /// * `target` - Where the pass renders (screen or shadow atlas)
    /// * `clear_values` - Clear values for attachments
    fn begin_render_pass(&mut self, target: RenderTarget, clear_values: &[ClearValue]) -> Result<()>;

    /// End the current render pass
    fn end_render_pass(&mut self) -> Result<()>;

    /// Set the viewport
    fn set_viewport(&mut self, viewport: Viewport) -> Result<()>;

    /// Set the scissor rectangle
    fn set_scissor(&mut self, scissor: Rect2D) -> Result<()>;

    /// Upload the per-frame uniform block shared by every program
    fn update_frame_block(&mut self, data: &[u8]) -> Result<()>;

    /// Bind a compiled program variant
    fn bind_program(&mut self, program: ProgramId) -> Result<()>;

    /// Write one named uniform of a program (the raw GPU upload)
    ///
    /// Callers go through `UniformCache::set_if_changed` so redundant
    /// writes never reach this method.
    fn set_uniform(&mut self, program: ProgramId, name: &str, value: &UniformValue) -> Result<()>;

    /// Apply fixed-function render state (depth, blend, culling)
    fn set_render_state(&mut self, state: &RenderState) -> Result<()>;

    /// Bind the vertex/index buffers of a mesh
    fn bind_mesh(&mut self, mesh: &Mesh) -> Result<()>;

    /// Draw the currently bound mesh once
    fn draw(&mut self, mesh: &Mesh) -> Result<()>;

    /// Draw the currently bound mesh once per instance transform
    ///
    /// # Arguments
    ///
    /// * `mesh` - Mesh to draw
    /// * `transforms` - Per-instance world matrices (one draw call covers all)
    /// * `tints` - Per-instance tints, empty when unused
    fn draw_instanced(&mut self, mesh: &Mesh, transforms: &[Mat4], tints: &[Vec4]) -> Result<()>;
}

/// Render pass destination
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderTarget {
    /// The view's color + depth attachments
    Screen,
    /// The shared depth-format shadow atlas texture
    ShadowAtlas,
}

/// Viewport dimensions and depth range
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub min_depth: f32,
    pub max_depth: f32,
}

impl Viewport {
    /// Full-depth viewport covering a texel rectangle
    pub fn from_rect(rect: Rect2D) -> Self {
        Self {
            x: rect.x as f32,
            y: rect.y as f32,
            width: rect.width as f32,
            height: rect.height as f32,
            min_depth: 0.0,
            max_depth: 1.0,
        }
    }

    /// Width / height, 1.0 for degenerate viewports
    pub fn aspect(&self) -> f32 {
        if self.height > 0.0 { self.width / self.height } else { 1.0 }
    }
}

/// 2D rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect2D {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

/// Clear value for an attachment
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClearValue {
    /// Color clear value (RGBA)
    Color([f32; 4]),
    /// Depth/stencil clear value
    DepthStencil { depth: f32, stencil: u32 },
}
