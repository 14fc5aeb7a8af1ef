/// Shader families and their declared passes.
///
/// A Shader is the authoring-side description: an ordered list of passes,
/// each carrying string tags such as `LightMode=ShadowCaster` or
/// `RenderOrder=Transparent`. Compilation is external; compiled variants
/// are looked up through a `ProgramResolver`.

/// Shader family identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShaderId(pub u64);

/// A single pass of a shader, identified by its declaration index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderPass {
    name: String,
    tags: Vec<(String, String)>,
}

impl ShaderPass {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tags: Vec::new(),
        }
    }

    /// Builder-style tag insertion; a repeated key replaces the earlier value
    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        let value = value.into();
        match self.tags.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.tags.push((key, value)),
        }
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Value of a tag, if the pass declares it
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn tags(&self) -> &[(String, String)] {
        &self.tags
    }
}

/// Shader family: ordered passes
#[derive(Debug, Clone)]
pub struct Shader {
    id: ShaderId,
    name: String,
    passes: Vec<ShaderPass>,
}

impl Shader {
    pub fn new(id: ShaderId, name: impl Into<String>, passes: Vec<ShaderPass>) -> Self {
        Self {
            id,
            name: name.into(),
            passes,
        }
    }

    pub fn id(&self) -> ShaderId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Passes in declaration order
    pub fn passes(&self) -> &[ShaderPass] {
        &self.passes
    }

    pub fn pass(&self, index: usize) -> Option<&ShaderPass> {
        self.passes.get(index)
    }
}
