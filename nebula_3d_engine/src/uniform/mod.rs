/// Uniform module - typed values, the write-through cache and the frame block

pub mod value;
pub mod cache;
pub mod frame_uniforms;

pub use value::{UniformValue, TextureHandle, BufferHandle};
pub use cache::{UniformCache, UniformCacheStats};
pub use frame_uniforms::{FrameUniformBlock, FrameTime};
