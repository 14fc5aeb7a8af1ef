/// Mesh reference as seen by the batching core.
///
/// Vertex storage lives in the backend; the frame core only needs a stable
/// identity to group by and the counts to reject degenerate meshes.

/// Stable mesh identity used in batch keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MeshId(pub u64);

/// Mesh handle
#[derive(Debug, Clone)]
pub struct Mesh {
    id: MeshId,
    name: String,
    vertex_count: u32,
    index_count: u32,
}

impl Mesh {
    pub fn new(id: MeshId, name: impl Into<String>, vertex_count: u32, index_count: u32) -> Self {
        Self {
            id,
            name: name.into(),
            vertex_count,
            index_count,
        }
    }

    pub fn id(&self) -> MeshId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    /// Number of indices (0 for non-indexed meshes)
    pub fn index_count(&self) -> u32 {
        self.index_count
    }

    /// A mesh without vertices contributes to no batch
    pub fn is_degenerate(&self) -> bool {
        self.vertex_count == 0
    }
}
