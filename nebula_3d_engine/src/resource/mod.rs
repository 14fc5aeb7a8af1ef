/// Resource module - meshes, shaders, materials and compiled program variants

pub mod mesh;
pub mod shader;
pub mod shader_library;
pub mod material;

pub use mesh::{Mesh, MeshId};
pub use shader::{Shader, ShaderId, ShaderPass};
pub use shader_library::{KeywordSet, ProgramId, ProgramResolver, ProgramVariant, ShaderLibrary};
pub use material::{Material, MaterialDesc};
