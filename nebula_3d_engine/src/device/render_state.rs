/// Fixed-function render state applied once per batch

use bitflags::bitflags;

bitflags! {
    /// Render state toggles
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct RenderFlags: u32 {
        const DEPTH_TEST        = 1 << 0;
        const DEPTH_WRITE       = 1 << 1;
        const CULL_BACK         = 1 << 2;
        const CULL_FRONT        = 1 << 3;
        const BLEND             = 1 << 4;
        const ALPHA_TO_COVERAGE = 1 << 5;
    }
}

/// Color blend equation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BlendMode {
    #[default]
    Opaque,
    Alpha,
    Additive,
    Multiply,
}

/// Render state bound with a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RenderState {
    pub flags: RenderFlags,
    pub blend: BlendMode,
}

impl RenderState {
    /// Depth-tested, depth-written, back-face culled, no blending
    pub fn opaque() -> Self {
        Self {
            flags: RenderFlags::DEPTH_TEST | RenderFlags::DEPTH_WRITE | RenderFlags::CULL_BACK,
            blend: BlendMode::Opaque,
        }
    }

    /// Depth-tested without depth writes, alpha blended
    pub fn transparent() -> Self {
        Self {
            flags: RenderFlags::DEPTH_TEST | RenderFlags::CULL_BACK | RenderFlags::BLEND,
            blend: BlendMode::Alpha,
        }
    }

    /// Whether this state writes depth
    pub fn writes_depth(&self) -> bool {
        self.flags.contains(RenderFlags::DEPTH_WRITE)
    }
}

impl Default for RenderState {
    fn default() -> Self {
        Self::opaque()
    }
}
