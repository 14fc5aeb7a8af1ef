/// Lights as consumed by the frame core.
///
/// A light is a tagged union over its kind. Everything shadow related that
/// is produced during a frame (atlas placement, light-space matrices) lives
/// in `ShadowRecord`, not on the light itself.

use glam::{Mat4, Vec3};

/// Requested shadow-map resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum ShadowResolution {
    Low,
    Medium,
    #[default]
    High,
    VeryHigh,
}

impl ShadowResolution {
    /// Edge length in texels
    pub fn pixels(self) -> u32 {
        match self {
            ShadowResolution::Low => 512,
            ShadowResolution::Medium => 1024,
            ShadowResolution::High => 2048,
            ShadowResolution::VeryHigh => 4096,
        }
    }
}

/// Number of directional shadow cascades
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CascadeCount {
    #[default]
    One,
    Two,
    Four,
}

impl CascadeCount {
    pub fn count(self) -> usize {
        match self {
            CascadeCount::One => 1,
            CascadeCount::Two => 2,
            CascadeCount::Four => 4,
        }
    }
}

/// Depth and normal-offset shadow bias
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadowBias {
    pub depth: f32,
    pub normal: f32,
}

impl Default for ShadowBias {
    fn default() -> Self {
        Self { depth: 0.005, normal: 0.4 }
    }
}

/// Kind-specific light parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LightKind {
    Directional { cascades: CascadeCount },
    Spot { range: f32, outer_angle: f32 },
    Point { range: f32 },
}

/// Light kind discriminant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LightType {
    Directional,
    Spot,
    Point,
}

/// A light source
#[derive(Debug, Clone, PartialEq)]
pub struct Light {
    pub id: u64,
    pub kind: LightKind,
    /// World transform; the light shines along its local -Z
    pub transform: Mat4,
    pub cast_shadows: bool,
    pub resolution: ShadowResolution,
    pub bias: ShadowBias,
    pub color: Vec3,
    pub intensity: f32,
}

impl Light {
    fn with_kind(id: u64, kind: LightKind, transform: Mat4) -> Self {
        Self {
            id,
            kind,
            transform,
            cast_shadows: true,
            resolution: ShadowResolution::default(),
            bias: ShadowBias::default(),
            color: Vec3::ONE,
            intensity: 1.0,
        }
    }

    pub fn directional(id: u64, transform: Mat4, cascades: CascadeCount) -> Self {
        Self::with_kind(id, LightKind::Directional { cascades }, transform)
    }

    /// `outer_angle` is the half-angle of the cone in radians
    pub fn spot(id: u64, transform: Mat4, range: f32, outer_angle: f32) -> Self {
        Self::with_kind(id, LightKind::Spot { range, outer_angle }, transform)
    }

    pub fn point(id: u64, position: Vec3, range: f32) -> Self {
        Self::with_kind(id, LightKind::Point { range }, Mat4::from_translation(position))
    }

    pub fn with_shadows(mut self, cast_shadows: bool) -> Self {
        self.cast_shadows = cast_shadows;
        self
    }

    pub fn with_resolution(mut self, resolution: ShadowResolution) -> Self {
        self.resolution = resolution;
        self
    }

    pub fn with_bias(mut self, bias: ShadowBias) -> Self {
        self.bias = bias;
        self
    }

    pub fn light_type(&self) -> LightType {
        match self.kind {
            LightKind::Directional { .. } => LightType::Directional,
            LightKind::Spot { .. } => LightType::Spot,
            LightKind::Point { .. } => LightType::Point,
        }
    }

    pub fn position(&self) -> Vec3 {
        self.transform.w_axis.truncate()
    }

    /// Normalized shine direction (local -Z in world space)
    pub fn direction(&self) -> Vec3 {
        (-self.transform.z_axis.truncate()).normalize_or(Vec3::NEG_Z)
    }
}

#[cfg(test)]
#[path = "light_tests.rs"]
mod tests;
