/// GraphicsDevice trait - capability probe consumed at startup

/// Device capabilities the frame core needs to size its resources
pub trait GraphicsDevice: Send + Sync {
    /// Human-readable adapter name (for logs)
    fn name(&self) -> &str;

    /// Largest supported edge of a 2D depth texture, in texels
    fn max_texture_size(&self) -> u32;

    /// Whether a square depth texture of `size` texels can be created
    fn supports_depth_texture(&self, size: u32) -> bool {
        size <= self.max_texture_size()
    }
}
