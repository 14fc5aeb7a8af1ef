/*!
# Nebula 3D Engine

Per-frame core of the Nebula 3D renderer.

This crate turns a list of drawables and lights into a sequence of calls on
a backend-agnostic [`CommandList`](nebula3d::device::CommandList). It owns no
GPU objects itself: backends implement the device traits, and the frame core
decides what to draw, in which order, and with which uniforms.

## Architecture

- **ShadowAtlas**: guillotine allocator handing out shadow-map tiles
- **LightSelector**: picks the closest shadow casters per light type
- **ShadowPass**: reserves tiles and renders casters into the atlas
- **BatchBuilder**: groups drawables by material state, pass and mesh
- **UniformCache**: skips uniform writes whose value did not change
- **FrameOrchestrator**: drives shadow, scene and post passes per view
*/

// Internal modules
mod error;
mod engine;
pub mod log;
pub mod config;
pub mod device;
pub mod resource;
pub mod scene;
pub mod view;
pub mod uniform;
pub mod shadow;
pub mod batch;
pub mod post_process;
pub mod orchestrator;

// Main nebula3d namespace module
pub mod nebula3d {
    // Error types
    pub use crate::error::{Error, Result};

    // Engine singleton (logger host)
    pub use crate::engine::Engine;

    // Frame driver
    pub use crate::orchestrator::{FrameOrchestrator, FrameReport};

    // Logging sub-module (types only, NOT macros)
    pub mod log {
        pub use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};
    }

    pub mod config {
        pub use crate::config::*;
    }

    // Backend-facing traits
    pub mod device {
        pub use crate::device::*;
    }

    pub mod resource {
        pub use crate::resource::*;
    }

    pub mod scene {
        pub use crate::scene::*;
    }

    pub mod view {
        pub use crate::view::*;
    }

    pub mod uniform {
        pub use crate::uniform::*;
    }

    pub mod shadow {
        pub use crate::shadow::*;
    }

    pub mod batch {
        pub use crate::batch::*;
    }

    pub mod post_process {
        pub use crate::post_process::*;
    }
}

// Re-export math library at crate root
pub use glam;
