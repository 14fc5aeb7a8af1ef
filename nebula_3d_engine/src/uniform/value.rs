/// Typed uniform values.
///
/// Equality and hashing are bit-exact on floating data: two values are
/// equal only if a GPU upload of either would write identical bytes.
/// `-0.0 != 0.0` and `NaN == NaN` (same payload) under this rule.

use std::hash::{Hash, Hasher};
use glam::{Mat4, Vec2, Vec3, Vec4};

/// Opaque texture handle owned by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureHandle(pub u64);

/// Opaque buffer handle owned by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BufferHandle(pub u64);

/// A value written to a named uniform slot
#[derive(Debug, Clone, Copy)]
pub enum UniformValue {
    Float(f32),
    Int(i32),
    UInt(u32),
    Vec2(Vec2),
    Vec3(Vec3),
    Vec4(Vec4),
    Mat4(Mat4),
    Texture(TextureHandle),
    Buffer(BufferHandle),
}

impl UniformValue {
    fn discriminant(&self) -> u8 {
        match self {
            UniformValue::Float(_) => 0,
            UniformValue::Int(_) => 1,
            UniformValue::UInt(_) => 2,
            UniformValue::Vec2(_) => 3,
            UniformValue::Vec3(_) => 4,
            UniformValue::Vec4(_) => 5,
            UniformValue::Mat4(_) => 6,
            UniformValue::Texture(_) => 7,
            UniformValue::Buffer(_) => 8,
        }
    }

    /// Feed the raw bits of the payload to `f`, one u32 word at a time
    fn for_each_word(&self, mut f: impl FnMut(u32)) {
        match self {
            UniformValue::Float(v) => f(v.to_bits()),
            UniformValue::Int(v) => f(*v as u32),
            UniformValue::UInt(v) => f(*v),
            UniformValue::Vec2(v) => v.to_array().iter().for_each(|c| f(c.to_bits())),
            UniformValue::Vec3(v) => v.to_array().iter().for_each(|c| f(c.to_bits())),
            UniformValue::Vec4(v) => v.to_array().iter().for_each(|c| f(c.to_bits())),
            UniformValue::Mat4(m) => m.to_cols_array().iter().for_each(|c| f(c.to_bits())),
            UniformValue::Texture(TextureHandle(h)) | UniformValue::Buffer(BufferHandle(h)) => {
                f(*h as u32);
                f((*h >> 32) as u32);
            }
        }
    }
}

impl PartialEq for UniformValue {
    fn eq(&self, other: &Self) -> bool {
        use UniformValue::*;
        let bits = |a: &[f32], b: &[f32]| a.iter().zip(b).all(|(x, y)| x.to_bits() == y.to_bits());
        match (self, other) {
            (Float(a), Float(b)) => a.to_bits() == b.to_bits(),
            (Int(a), Int(b)) => a == b,
            (UInt(a), UInt(b)) => a == b,
            (Vec2(a), Vec2(b)) => bits(&a.to_array(), &b.to_array()),
            (Vec3(a), Vec3(b)) => bits(&a.to_array(), &b.to_array()),
            (Vec4(a), Vec4(b)) => bits(&a.to_array(), &b.to_array()),
            (Mat4(a), Mat4(b)) => bits(&a.to_cols_array(), &b.to_cols_array()),
            (Texture(a), Texture(b)) => a == b,
            (Buffer(a), Buffer(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for UniformValue {}

impl Hash for UniformValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u8(self.discriminant());
        self.for_each_word(|word| state.write_u32(word));
    }
}

impl From<f32> for UniformValue {
    fn from(v: f32) -> Self {
        UniformValue::Float(v)
    }
}

impl From<i32> for UniformValue {
    fn from(v: i32) -> Self {
        UniformValue::Int(v)
    }
}

impl From<u32> for UniformValue {
    fn from(v: u32) -> Self {
        UniformValue::UInt(v)
    }
}

impl From<Vec2> for UniformValue {
    fn from(v: Vec2) -> Self {
        UniformValue::Vec2(v)
    }
}

impl From<Vec3> for UniformValue {
    fn from(v: Vec3) -> Self {
        UniformValue::Vec3(v)
    }
}

impl From<Vec4> for UniformValue {
    fn from(v: Vec4) -> Self {
        UniformValue::Vec4(v)
    }
}

impl From<Mat4> for UniformValue {
    fn from(v: Mat4) -> Self {
        UniformValue::Mat4(v)
    }
}

impl From<TextureHandle> for UniformValue {
    fn from(v: TextureHandle) -> Self {
        UniformValue::Texture(v)
    }
}

impl From<BufferHandle> for UniformValue {
    fn from(v: BufferHandle) -> Self {
        UniformValue::Buffer(v)
    }
}

#[cfg(test)]
#[path = "value_tests.rs"]
mod tests;
