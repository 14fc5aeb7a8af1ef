//! Shared fixtures for frame integration tests
//!
//! Provides a recording command list and a fixed-capability device so the
//! whole frame can be driven without a GPU.

#![allow(dead_code)]

use std::sync::Arc;
use nebula_3d_engine::glam::{Mat4, Vec3, Vec4};
use nebula_3d_engine::nebula3d::Result;
use nebula_3d_engine::nebula3d::device::{
    ClearValue, CommandList, GraphicsDevice, Rect2D, RenderState, RenderTarget, Viewport,
};
use nebula_3d_engine::nebula3d::resource::{
    KeywordSet, Material, MaterialDesc, Mesh, MeshId, ProgramId, Shader, ShaderId, ShaderLibrary, ShaderPass,
};
use nebula_3d_engine::nebula3d::scene::SceneObject;
use nebula_3d_engine::nebula3d::uniform::UniformValue;
use nebula_3d_engine::nebula3d::view::Camera;

// ============================================================================
// DEVICE
// ============================================================================

pub struct TestDevice {
    pub max_texture_size: u32,
}

impl GraphicsDevice for TestDevice {
    fn name(&self) -> &str {
        "integration-test"
    }

    fn max_texture_size(&self) -> u32 {
        self.max_texture_size
    }
}

// ============================================================================
// RECORDING COMMAND LIST
// ============================================================================

/// One recorded backend call
#[derive(Debug, Clone, PartialEq)]
pub enum Recorded {
    BeginPass(RenderTarget),
    EndPass,
    Viewport(Viewport),
    Scissor(Rect2D),
    FrameBlock(usize),
    BindProgram(ProgramId),
    Uniform(String, UniformValue),
    RenderState,
    BindMesh(String),
    Draw(String),
    DrawInstanced(String, usize),
}

#[derive(Debug, Default)]
pub struct RecordingCommandList {
    pub calls: Vec<Recorded>,
}

impl RecordingCommandList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draws(&self) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Recorded::Draw(name) => Some(name.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn viewports(&self) -> Vec<Viewport> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Recorded::Viewport(v) => Some(*v),
                _ => None,
            })
            .collect()
    }

    pub fn uniform_writes(&self, name: &str) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, Recorded::Uniform(n, _) if n == name))
            .count()
    }
}

impl CommandList for RecordingCommandList {
    fn begin_render_pass(&mut self, target: RenderTarget, _clear_values: &[ClearValue]) -> Result<()> {
        self.calls.push(Recorded::BeginPass(target));
        Ok(())
    }

    fn end_render_pass(&mut self) -> Result<()> {
        self.calls.push(Recorded::EndPass);
        Ok(())
    }

    fn set_viewport(&mut self, viewport: Viewport) -> Result<()> {
        self.calls.push(Recorded::Viewport(viewport));
        Ok(())
    }

    fn set_scissor(&mut self, scissor: Rect2D) -> Result<()> {
        self.calls.push(Recorded::Scissor(scissor));
        Ok(())
    }

    fn update_frame_block(&mut self, data: &[u8]) -> Result<()> {
        self.calls.push(Recorded::FrameBlock(data.len()));
        Ok(())
    }

    fn bind_program(&mut self, program: ProgramId) -> Result<()> {
        self.calls.push(Recorded::BindProgram(program));
        Ok(())
    }

    fn set_uniform(&mut self, _program: ProgramId, name: &str, value: &UniformValue) -> Result<()> {
        self.calls.push(Recorded::Uniform(name.to_string(), *value));
        Ok(())
    }

    fn set_render_state(&mut self, _state: &RenderState) -> Result<()> {
        self.calls.push(Recorded::RenderState);
        Ok(())
    }

    fn bind_mesh(&mut self, mesh: &Mesh) -> Result<()> {
        self.calls.push(Recorded::BindMesh(mesh.name().to_string()));
        Ok(())
    }

    fn draw(&mut self, mesh: &Mesh) -> Result<()> {
        self.calls.push(Recorded::Draw(mesh.name().to_string()));
        Ok(())
    }

    fn draw_instanced(&mut self, mesh: &Mesh, transforms: &[Mat4], _tints: &[Vec4]) -> Result<()> {
        self.calls.push(Recorded::DrawInstanced(mesh.name().to_string(), transforms.len()));
        Ok(())
    }
}

// ============================================================================
// SCENE FIXTURES
// ============================================================================

pub fn camera() -> Camera {
    let view = Mat4::look_at_rh(Vec3::new(0.0, 2.0, 0.0), Vec3::new(0.0, 2.0, -1.0), Vec3::Y);
    let projection = Mat4::perspective_rh(1.0, 16.0 / 9.0, 0.1, 300.0);
    let viewport = Viewport::from_rect(Rect2D { x: 0, y: 0, width: 1280, height: 720 });
    Camera::new(view, projection, viewport, 0.1, 300.0)
}

/// Lit shader with a forward pass and a shadow caster pass, both compiled
pub fn lit_library() -> (Arc<Shader>, ShaderLibrary) {
    let shader = Arc::new(Shader::new(ShaderId(1), "standard", vec![
        ShaderPass::new("forward").with_tag("LightMode", "Forward"),
        ShaderPass::new("shadow").with_tag("LightMode", "ShadowCaster"),
    ]));
    let mut library = ShaderLibrary::new();
    library.register(ShaderId(1), 0, KeywordSet::new());
    library.register(ShaderId(1), 1, KeywordSet::new());
    (shader, library)
}

pub fn material(shader: &Arc<Shader>, keywords: KeywordSet) -> Arc<Material> {
    Arc::new(Material::new(MaterialDesc {
        shader: Some(Arc::clone(shader)),
        params: vec![("u_BaseColor".to_string(), UniformValue::Vec4(Vec4::ONE))],
        keywords,
        ..Default::default()
    }).unwrap())
}

pub fn object(id: u64, material: &Arc<Material>, mesh_name: &str, position: Vec3) -> SceneObject {
    let mesh = Arc::new(Mesh::new(MeshId(id), mesh_name, 24, 36));
    SceneObject::new(id, Some(Arc::clone(material)), mesh, Mat4::from_translation(position))
}
