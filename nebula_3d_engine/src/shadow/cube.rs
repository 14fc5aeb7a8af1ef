/// Cube-face table for point-light shadows.
///
/// The six faces are rendered into a 3 x 2 grid inside one atlas
/// reservation:
///
/// ```text
///   row 0:  +X  -X  +Y
///   row 1:  -Y  +Z  -Z
/// ```

use std::f32::consts::FRAC_PI_2;
use glam::{Mat4, Vec3};

/// Near plane of every cube-face projection
pub const CUBE_FACE_NEAR: f32 = 0.05;

/// One face of a point light's shadow cube
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CubeFace {
    PositiveX,
    NegativeX,
    PositiveY,
    NegativeY,
    PositiveZ,
    NegativeZ,
}

impl CubeFace {
    /// Faces in render and grid order
    pub const ALL: [CubeFace; 6] = [
        CubeFace::PositiveX,
        CubeFace::NegativeX,
        CubeFace::PositiveY,
        CubeFace::NegativeY,
        CubeFace::PositiveZ,
        CubeFace::NegativeZ,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Look direction of the face camera
    pub fn forward(self) -> Vec3 {
        match self {
            CubeFace::PositiveX => Vec3::X,
            CubeFace::NegativeX => Vec3::NEG_X,
            CubeFace::PositiveY => Vec3::Y,
            CubeFace::NegativeY => Vec3::NEG_Y,
            CubeFace::PositiveZ => Vec3::Z,
            CubeFace::NegativeZ => Vec3::NEG_Z,
        }
    }

    /// Up vector paired with `forward` (cube-map convention)
    pub fn up(self) -> Vec3 {
        match self {
            CubeFace::PositiveY => Vec3::Z,
            CubeFace::NegativeY => Vec3::NEG_Z,
            _ => Vec3::NEG_Y,
        }
    }

    /// (column, row) inside the 3 x 2 grid
    pub fn grid_cell(self) -> (u32, u32) {
        let i = self.index() as u32;
        (i % 3, i / 3)
    }

    /// Texel origin of this face given the grid origin and face size
    pub fn tile_origin(self, grid_x: u32, grid_y: u32, face_size: u32) -> (u32, u32) {
        let (col, row) = self.grid_cell();
        (grid_x + col * face_size, grid_y + row * face_size)
    }

    /// 90-degree view-projection for this face of a light at `position`
    pub fn view_projection(self, position: Vec3, range: f32) -> Mat4 {
        let far = range.max(CUBE_FACE_NEAR * 2.0);
        let projection = Mat4::perspective_rh(FRAC_PI_2, 1.0, CUBE_FACE_NEAR, far);
        let view = Mat4::look_at_rh(position, position + self.forward(), self.up());
        projection * view
    }
}

#[cfg(test)]
#[path = "cube_tests.rs"]
mod tests;
