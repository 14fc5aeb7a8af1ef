/// Bounded light selection.
///
/// Keeps at most one directional light and the K closest spot and point
/// lights (by squared distance to the viewer). The rest are excluded from
/// shadowing and lighting for the frame.

use glam::Vec3;
use crate::config::{ResolutionFalloff, ShadowConfig};
use crate::scene::{Light, LightType, ShadowResolution};

/// Move the `k` smallest items (by `key`) to the front, in ascending order
///
/// Repeated scan-and-swap: O(n * k). Items after position `k` are left in
/// unspecified order; on equal keys the earliest remaining item wins.
/// Returns the number of items placed (`min(k, n)`).
pub fn partial_select_closest<T>(items: &mut [T], k: usize, key: impl Fn(&T) -> f32) -> usize {
    let count = k.min(items.len());
    for i in 0..count {
        let mut best = i;
        for j in (i + 1)..items.len() {
            if key(&items[j]).total_cmp(&key(&items[best])).is_lt() {
                best = j;
            }
        }
        items.swap(i, best);
    }
    count
}

/// Edge length of cascade `cascade` for a directional light
///
/// The first cascade uses the requested resolution; each further cascade
/// halves it, down to `min_tile`.
pub fn cascade_resolution(requested: ShadowResolution, cascade: usize, min_tile: u32) -> u32 {
    let shift = cascade.min(31) as u32;
    (requested.pixels() >> shift).max(min_tile)
}

/// A light picked for this frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectedLight {
    /// Index into the caller's light slice
    pub index: usize,
    pub distance_sq: f32,
}

impl SelectedLight {
    pub fn distance(&self) -> f32 {
        self.distance_sq.sqrt()
    }
}

/// Result of one selection pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LightSelection {
    pub directional: Option<SelectedLight>,
    /// Closest first
    pub spots: Vec<SelectedLight>,
    /// Closest first
    pub points: Vec<SelectedLight>,
    /// Light indices dropped this frame, ascending
    pub excluded: Vec<usize>,
}

impl LightSelection {
    /// Selected light count across all kinds
    pub fn len(&self) -> usize {
        self.directional.iter().count() + self.spots.len() + self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every selected light, directional first
    pub fn iter(&self) -> impl Iterator<Item = &SelectedLight> {
        self.directional.iter().chain(self.spots.iter()).chain(self.points.iter())
    }
}

/// Chooses which lights take part in a frame
#[derive(Debug, Clone)]
pub struct LightSelector {
    pub max_spot_lights: usize,
    pub max_point_lights: usize,
    pub falloff: ResolutionFalloff,
}

impl LightSelector {
    pub fn new(config: &ShadowConfig) -> Self {
        Self {
            max_spot_lights: config.max_spot_lights,
            max_point_lights: config.max_point_lights,
            falloff: config.falloff,
        }
    }

    /// Partition `lights` by kind and keep the closest of each
    pub fn select(&self, lights: &[Light], viewer: Vec3) -> LightSelection {
        let mut directional = Vec::new();
        let mut spots = Vec::new();
        let mut points = Vec::new();

        for (index, light) in lights.iter().enumerate() {
            let candidate = SelectedLight {
                index,
                distance_sq: light.position().distance_squared(viewer),
            };
            match light.light_type() {
                LightType::Directional => directional.push(candidate),
                LightType::Spot => spots.push(candidate),
                LightType::Point => points.push(candidate),
            }
        }

        let by_distance = |l: &SelectedLight| l.distance_sq;
        let d = partial_select_closest(&mut directional, 1, by_distance);
        let s = partial_select_closest(&mut spots, self.max_spot_lights, by_distance);
        let p = partial_select_closest(&mut points, self.max_point_lights, by_distance);

        let mut excluded: Vec<usize> = directional[d..]
            .iter()
            .chain(&spots[s..])
            .chain(&points[p..])
            .map(|l| l.index)
            .collect();
        excluded.sort_unstable();

        directional.truncate(d);
        spots.truncate(s);
        points.truncate(p);

        LightSelection {
            directional: directional.first().copied(),
            spots,
            points,
            excluded,
        }
    }

    /// Spot-light tile size: distance falloff, capped by the light's request
    ///
    /// The result never leaves the falloff's `[min_size, max_size]` range,
    /// even when the request is below the floor.
    pub fn spot_resolution(&self, light: &Light, distance: f32) -> u32 {
        let size = self.falloff.calculate_resolution(distance).min(light.resolution.pixels());
        self.falloff.clamp(size)
    }

    /// Point-light face size: half the falloff so the 3 x 2 grid stays
    /// within reach of the atlas, capped by the light's request and kept
    /// inside `[min_size, max_size]`
    pub fn point_face_resolution(&self, light: &Light, distance: f32) -> u32 {
        let size = (self.falloff.calculate_resolution(distance) / 2).min(light.resolution.pixels());
        self.falloff.clamp(size)
    }
}

#[cfg(test)]
#[path = "selector_tests.rs"]
mod tests;
