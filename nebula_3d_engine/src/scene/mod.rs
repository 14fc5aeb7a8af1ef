/// Scene module - drawables, bounds and lights supplied per frame

pub mod aabb;
pub mod drawable;
pub mod light;

pub use aabb::Aabb;
pub use drawable::{Drawable, DrawableFlags, SceneObject};
pub use light::{CascadeCount, Light, LightKind, LightType, ShadowBias, ShadowResolution};
