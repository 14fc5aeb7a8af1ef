/// Renderer configuration.
///
/// Plain structs with `Default` impls. Everything here is read once per
/// frame; changing a value takes effect on the next `begin_frame`.

use rustc_hash::FxHashMap;
use crate::batch::TagFilter;

// ===== SHADOWS =====

/// Distance-to-resolution falloff for spot and point shadows
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolutionFalloff {
    /// Resolution at or beyond `reference_distance`
    pub min_size: u32,
    /// Resolution at distance zero
    pub max_size: u32,
    pub reference_distance: f32,
}

impl Default for ResolutionFalloff {
    fn default() -> Self {
        Self {
            min_size: 256,
            max_size: 2048,
            reference_distance: 50.0,
        }
    }
}

impl ResolutionFalloff {
    /// Shadow-map edge length for a light at `distance` from the viewer
    ///
    /// Non-increasing in `distance` and always inside `[min_size, max_size]`.
    /// A swapped min/max pair is normalized first. A non-positive or NaN
    /// reference distance puts every light at the far end of the ramp.
    pub fn calculate_resolution(&self, distance: f32) -> u32 {
        let (lo, hi) = self.bounds();

        let t = if self.reference_distance > 0.0 && !distance.is_nan() {
            (distance / self.reference_distance).clamp(0.0, 1.0)
        } else {
            1.0
        };

        let size = (hi as f32 + (lo as f32 - hi as f32) * t).round();
        (size as u32).clamp(lo, hi)
    }

    /// Clamp a derived tile size into `[min_size, max_size]`
    pub fn clamp(&self, size: u32) -> u32 {
        let (lo, hi) = self.bounds();
        size.clamp(lo, hi)
    }

    fn bounds(&self) -> (u32, u32) {
        (self.min_size.min(self.max_size), self.min_size.max(self.max_size))
    }
}

/// Shadow rendering configuration
#[derive(Debug, Clone)]
pub struct ShadowConfig {
    /// Atlas edge length; None probes the device (8192 if supported, else 4096)
    pub atlas_size: Option<u32>,
    /// Smallest tile edge the atlas hands out
    pub min_tile_size: u32,
    pub max_spot_lights: usize,
    pub max_point_lights: usize,
    pub falloff: ResolutionFalloff,
    /// Blend between uniform (0.0) and logarithmic (1.0) cascade splits
    pub cascade_split_lambda: f32,
    /// Far end of the directional shadow range
    pub shadow_distance: f32,
    /// Pass tag selecting shadow-caster passes
    pub caster_filter: TagFilter,
}

impl Default for ShadowConfig {
    fn default() -> Self {
        Self {
            atlas_size: None,
            min_tile_size: 32,
            max_spot_lights: 4,
            max_point_lights: 4,
            falloff: ResolutionFalloff::default(),
            cascade_split_lambda: 0.5,
            shadow_distance: 100.0,
            caster_filter: TagFilter::equals("LightMode", "ShadowCaster"),
        }
    }
}

// ===== BATCHING =====

/// Explicit sort offsets per value of the order tag
#[derive(Debug, Clone, PartialEq)]
pub struct SortOffsets(FxHashMap<String, i64>);

impl SortOffsets {
    pub fn empty() -> Self {
        Self(FxHashMap::default())
    }

    pub fn set(&mut self, tag_value: impl Into<String>, offset: i64) {
        self.0.insert(tag_value.into(), offset);
    }

    /// Offset for a tag value; values without one keep declaration order
    pub fn get(&self, tag_value: &str) -> Option<i64> {
        self.0.get(tag_value).copied()
    }
}

impl Default for SortOffsets {
    fn default() -> Self {
        let mut offsets = Self::empty();
        offsets.set("Background", -1000);
        offsets.set("AlphaTest", 500);
        offsets.set("Transparent", 1000);
        offsets.set("Overlay", 2000);
        offsets
    }
}

/// Batch building configuration
#[derive(Debug, Clone)]
pub struct BatchConfig {
    pub sort_offsets: SortOffsets,
    /// Pass tag whose value selects a sort offset
    pub order_tag: String,
    /// Frames between motion-history purges; 0 purges every frame
    pub motion_purge_interval: u64,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            sort_offsets: SortOffsets::default(),
            order_tag: "RenderOrder".to_string(),
            motion_purge_interval: 60,
        }
    }
}

// ===== MAIN PASSES =====

/// Drawable order fed to a scene pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawOrder {
    /// Caller's order
    Submission,
    /// Farthest from the camera first
    BackToFront,
}

/// One batched scene pass of a view
#[derive(Debug, Clone)]
pub struct PassSpec {
    pub name: String,
    pub filter: TagFilter,
    pub order: DrawOrder,
}

/// Top-level renderer configuration
#[derive(Debug, Clone)]
pub struct RendererConfig {
    pub shadow: ShadowConfig,
    pub batch: BatchConfig,
    /// Scene passes in execution order (after the shadow pass)
    pub passes: Vec<PassSpec>,
}

impl Default for RendererConfig {
    fn default() -> Self {
        let forward = TagFilter::equals("LightMode", "Forward").or_untagged();
        Self {
            shadow: ShadowConfig::default(),
            batch: BatchConfig::default(),
            passes: vec![
                PassSpec {
                    name: "Opaque".to_string(),
                    filter: forward.clone().and(TagFilter::not_equals("RenderOrder", "Transparent")),
                    order: DrawOrder::Submission,
                },
                PassSpec {
                    name: "Transparent".to_string(),
                    filter: forward.and(TagFilter::equals("RenderOrder", "Transparent")),
                    order: DrawOrder::BackToFront,
                },
            ],
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
