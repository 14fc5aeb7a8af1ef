/// Per-frame uniform block shared by every shader program.
///
/// Layout (std140-compatible, 352 bytes):
///   view, projection, view_projection, inverse_view (Mat4 each),
///   camera_position, screen (w, h, 1/w, 1/h), time (t, dt, frame, 0),
///   fog_color, fog_params (start, end, density, 0), ambient (Vec4 each).

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec4};
use crate::view::{Camera, Environment};

/// Frame timing supplied by the caller at `begin_frame`
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameTime {
    /// Seconds since start
    pub time: f32,
    /// Seconds since previous frame
    pub delta: f32,
    /// Monotonic frame counter
    pub frame: u64,
}

/// GPU layout of the per-frame block
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct FrameUniformBlock {
    pub view: Mat4,
    pub projection: Mat4,
    pub view_projection: Mat4,
    pub inverse_view: Mat4,
    pub camera_position: Vec4,
    pub screen: Vec4,
    pub time: Vec4,
    pub fog_color: Vec4,
    pub fog_params: Vec4,
    pub ambient: Vec4,
}

impl FrameUniformBlock {
    /// Size in bytes of the uploaded block
    pub const SIZE: usize = std::mem::size_of::<FrameUniformBlock>();

    pub fn new(camera: &Camera, environment: &Environment, time: FrameTime) -> Self {
        let viewport = camera.viewport();
        let (w, h) = (viewport.width, viewport.height);
        let inv = |v: f32| if v > 0.0 { 1.0 / v } else { 0.0 };

        Self {
            view: *camera.view_matrix(),
            projection: *camera.projection_matrix(),
            view_projection: camera.view_projection_matrix(),
            inverse_view: camera.view_matrix().inverse(),
            camera_position: camera.position().extend(1.0),
            screen: Vec4::new(w, h, inv(w), inv(h)),
            // Frame index loses precision past 2^24, fine for shader-side noise seeds
            time: Vec4::new(time.time, time.delta, time.frame as f32, 0.0),
            fog_color: environment.fog_color,
            fog_params: Vec4::new(environment.fog_start, environment.fog_end, environment.fog_density, 0.0),
            ambient: environment.ambient,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }
}

#[cfg(test)]
#[path = "frame_uniforms_tests.rs"]
mod tests;
