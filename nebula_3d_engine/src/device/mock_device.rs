/// Mock device and command list for unit tests (no GPU required)
///
/// The mock command list records every call as a string so tests can
/// assert on exact call sequences and counts.

use glam::{Mat4, Vec4};
use crate::device::{
    CommandList, GraphicsDevice, RenderTarget, Viewport, Rect2D, ClearValue, RenderState,
};
use crate::error::{Error, Result};
use crate::resource::{Mesh, ProgramId};
use crate::uniform::UniformValue;

// ============================================================================
// Mock Device
// ============================================================================

#[derive(Debug)]
pub struct MockDevice {
    pub max_texture_size: u32,
}

impl MockDevice {
    pub fn new(max_texture_size: u32) -> Self {
        Self { max_texture_size }
    }
}

impl GraphicsDevice for MockDevice {
    fn name(&self) -> &str {
        "mock"
    }

    fn max_texture_size(&self) -> u32 {
        self.max_texture_size
    }
}

// ============================================================================
// Mock CommandList
// ============================================================================

#[derive(Debug, Default)]
pub struct MockCommandList {
    pub commands: Vec<String>,
    pub viewports: Vec<Viewport>,
    pub uniforms: Vec<(ProgramId, String, UniformValue)>,
    /// Command prefix that makes the call return a backend error
    pub fail_on: Option<String>,
}

impl MockCommandList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of recorded commands equal to `name` or starting with `name:`
    pub fn count(&self, name: &str) -> usize {
        self.commands
            .iter()
            .filter(|c| *c == name || c.starts_with(&format!("{}:", name)))
            .count()
    }

    /// Number of writes of one uniform name
    pub fn uniform_writes(&self, name: &str) -> usize {
        self.uniforms.iter().filter(|(_, n, _)| n == name).count()
    }

    fn push(&mut self, command: String) -> Result<()> {
        if let Some(prefix) = &self.fail_on {
            if command.starts_with(prefix.as_str()) {
                return Err(Error::BackendError(format!("mock failure on '{}'", command)));
            }
        }
        self.commands.push(command);
        Ok(())
    }
}

impl CommandList for MockCommandList {
    fn begin_render_pass(&mut self, target: RenderTarget, _clear_values: &[ClearValue]) -> Result<()> {
        self.push(format!("begin_render_pass:{:?}", target))
    }

    fn end_render_pass(&mut self) -> Result<()> {
        self.push("end_render_pass".to_string())
    }

    fn set_viewport(&mut self, viewport: Viewport) -> Result<()> {
        self.viewports.push(viewport);
        self.push("set_viewport".to_string())
    }

    fn set_scissor(&mut self, _scissor: Rect2D) -> Result<()> {
        self.push("set_scissor".to_string())
    }

    fn update_frame_block(&mut self, data: &[u8]) -> Result<()> {
        self.push(format!("update_frame_block:{}", data.len()))
    }

    fn bind_program(&mut self, _program: ProgramId) -> Result<()> {
        self.push("bind_program".to_string())
    }

    fn set_uniform(&mut self, program: ProgramId, name: &str, value: &UniformValue) -> Result<()> {
        self.push(format!("set_uniform:{}", name))?;
        self.uniforms.push((program, name.to_string(), *value));
        Ok(())
    }

    fn set_render_state(&mut self, _state: &RenderState) -> Result<()> {
        self.push("set_render_state".to_string())
    }

    fn bind_mesh(&mut self, mesh: &Mesh) -> Result<()> {
        self.push(format!("bind_mesh:{}", mesh.name()))
    }

    fn draw(&mut self, mesh: &Mesh) -> Result<()> {
        self.push(format!("draw:{}", mesh.name()))
    }

    fn draw_instanced(&mut self, mesh: &Mesh, transforms: &[Mat4], _tints: &[Vec4]) -> Result<()> {
        self.push(format!("draw_instanced:{}:{}", mesh.name(), transforms.len()))
    }
}
