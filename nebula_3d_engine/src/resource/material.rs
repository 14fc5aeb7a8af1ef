/// Resource-level material type.
///
/// A Material is a pure data description of a surface: which shader family
/// it renders with, which keywords select the compiled variant, the fixed
/// function render state, and named parameter/texture values written as
/// uniforms once per batch.
///
/// The material state hash summarizes everything that forces a state change
/// between two draws. Two materials with equal hashes can share a batch.

use std::hash::{Hash, Hasher};
use std::sync::Arc;
use rustc_hash::{FxHashSet, FxHasher};
use crate::error::Result;
use crate::engine_bail;
use crate::device::RenderState;
use crate::resource::shader::Shader;
use crate::resource::shader_library::KeywordSet;
use crate::uniform::{TextureHandle, UniformValue};

// ===== DESCRIPTORS =====

/// Material creation descriptor
#[derive(Debug, Clone, Default)]
pub struct MaterialDesc {
    pub shader: Option<Arc<Shader>>,
    pub params: Vec<(String, UniformValue)>,
    pub textures: Vec<(String, TextureHandle)>,
    pub keywords: KeywordSet,
    pub render_state: RenderState,
}

// ===== MATERIAL =====

/// Material resource: visual description of a surface
#[derive(Debug, Clone)]
pub struct Material {
    shader: Option<Arc<Shader>>,
    params: Vec<(String, UniformValue)>,
    keywords: KeywordSet,
    render_state: RenderState,
    state_hash: u64,
}

impl Material {
    /// Create a material from a descriptor
    ///
    /// Textures are stored as texture-valued parameters, so a slot name may
    /// not repeat across params and textures.
    pub fn new(desc: MaterialDesc) -> Result<Self> {
        let mut seen = FxHashSet::default();
        for name in desc.params.iter().map(|(n, _)| n).chain(desc.textures.iter().map(|(n, _)| n)) {
            if !seen.insert(name.as_str()) {
                engine_bail!("nebula3d::Material", "Duplicate parameter name '{}'", name);
            }
        }

        let mut params = desc.params;
        params.extend(
            desc.textures
                .into_iter()
                .map(|(name, handle)| (name, UniformValue::Texture(handle))),
        );

        let mut material = Self {
            shader: desc.shader,
            params,
            keywords: desc.keywords,
            render_state: desc.render_state,
            state_hash: 0,
        };
        material.rehash();
        Ok(material)
    }

    // ===== ACCESSORS =====

    pub fn shader(&self) -> Option<&Arc<Shader>> {
        self.shader.as_ref()
    }

    /// Parameters (including textures) in declaration order
    pub fn params(&self) -> &[(String, UniformValue)] {
        &self.params
    }

    pub fn param(&self, name: &str) -> Option<&UniformValue> {
        self.params.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn keywords(&self) -> &KeywordSet {
        &self.keywords
    }

    pub fn render_state(&self) -> &RenderState {
        &self.render_state
    }

    /// Hash of shader, keywords, render state and parameter values
    pub fn state_hash(&self) -> u64 {
        self.state_hash
    }

    /// A material can be drawn only with a shader that declares passes
    pub fn is_valid(&self) -> bool {
        self.shader.as_ref().is_some_and(|s| !s.passes().is_empty())
    }

    // ===== MUTATION =====

    /// Update an existing parameter. Returns false if the name is unknown
    pub fn set_param(&mut self, name: &str, value: UniformValue) -> bool {
        match self.params.iter_mut().find(|(n, _)| n == name) {
            Some(entry) => {
                entry.1 = value;
                self.rehash();
                true
            }
            None => false,
        }
    }

    pub fn enable_keyword(&mut self, keyword: &str) {
        if self.keywords.insert(keyword) {
            self.rehash();
        }
    }

    pub fn disable_keyword(&mut self, keyword: &str) {
        if self.keywords.remove(keyword) {
            self.rehash();
        }
    }

    pub fn set_render_state(&mut self, state: RenderState) {
        self.render_state = state;
        self.rehash();
    }

    fn rehash(&mut self) {
        let mut hasher = FxHasher::default();
        self.shader.as_ref().map(|s| s.id()).hash(&mut hasher);
        self.keywords.hash(&mut hasher);
        self.render_state.hash(&mut hasher);
        for (name, value) in &self.params {
            name.hash(&mut hasher);
            value.hash(&mut hasher);
        }
        self.state_hash = hasher.finish();
    }
}

#[cfg(test)]
#[path = "material_tests.rs"]
mod tests;
