/// Free-rectangle shadow atlas allocator.
///
/// Packs square or rectangular shadow tiles into one fixed-size depth
/// texture using Best-Short-Side-Fit guillotine packing. The atlas is
/// cleared once per frame, so freed space is never merged back.
///
/// Placement depends on the reservation sequence: callers reserve in a
/// stable order (nearest light first) to keep layouts deterministic.
///
/// # Example
///
/// ```ignore
/// let mut atlas = ShadowAtlas::new(4096, 32);
/// let tile = atlas.reserve(1024, 1024, light_id).unwrap();  // (0, 0)
/// atlas.clear();                                              // next frame
/// ```

use crate::error::{Error, Result};
use crate::device::{GraphicsDevice, Rect2D};
use crate::config::ShadowConfig;
use crate::{engine_debug, engine_info};

/// Atlas size used when the device supports it
pub const PREFERRED_ATLAS_SIZE: u32 = 8192;
/// Atlas size used otherwise
pub const FALLBACK_ATLAS_SIZE: u32 = 4096;

/// Free region in atlas texel space
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FreeRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl FreeRect {
    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

/// Region handed to a caller, valid until the next `clear`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AtlasReservation {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    pub owner: u64,
}

impl AtlasReservation {
    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    pub fn rect(&self) -> Rect2D {
        Rect2D {
            x: self.x as i32,
            y: self.y as i32,
            width: self.width,
            height: self.height,
        }
    }

    /// Whether two reservations share any texel
    pub fn overlaps(&self, other: &AtlasReservation) -> bool {
        self.x < other.x + other.width
            && other.x < self.x + self.width
            && self.y < other.y + other.height
            && other.y < self.y + self.height
    }
}

/// Guillotine allocator over one square texture
#[derive(Debug, Clone)]
pub struct ShadowAtlas {
    size: u32,
    min_tile: u32,
    free: Vec<FreeRect>,
    reservations: Vec<AtlasReservation>,
}

impl ShadowAtlas {
    /// Create a cleared atlas of `size` x `size` texels
    pub fn new(size: u32, min_tile: u32) -> Self {
        let mut atlas = Self {
            size,
            min_tile,
            free: Vec::new(),
            reservations: Vec::new(),
        };
        atlas.clear();
        atlas
    }

    /// Create the atlas from device capabilities
    ///
    /// Without an explicit size: 8192 if the device can create such a
    /// depth texture, else 4096. An explicit size the device cannot
    /// create is an initialization error.
    pub fn for_device(device: &dyn GraphicsDevice, config: &ShadowConfig) -> Result<Self> {
        let size = match config.atlas_size {
            Some(size) => {
                if size == 0 || !device.supports_depth_texture(size) {
                    return Err(Error::InitializationFailed(format!(
                        "Shadow atlas size {} not supported by '{}' (max {})",
                        size, device.name(), device.max_texture_size()
                    )));
                }
                size
            }
            None if device.supports_depth_texture(PREFERRED_ATLAS_SIZE) => PREFERRED_ATLAS_SIZE,
            None => FALLBACK_ATLAS_SIZE,
        };

        engine_info!("nebula3d::ShadowAtlas",
            "Shadow atlas {}x{} on '{}'", size, size, device.name());
        Ok(Self::new(size, config.min_tile_size))
    }

    /// Reset to a single free rectangle covering the whole atlas
    pub fn clear(&mut self) {
        self.free.clear();
        self.free.push(FreeRect { x: 0, y: 0, width: self.size, height: self.size });
        self.reservations.clear();
    }

    /// Reserve a `width` x `height` tile for `owner`
    ///
    /// Dimensions below the minimum tile size are raised to it. Returns
    /// None when a dimension exceeds the atlas or no free rectangle fits.
    pub fn reserve(&mut self, width: u32, height: u32, owner: u64) -> Option<AtlasReservation> {
        let width = width.max(self.min_tile);
        let height = height.max(self.min_tile);

        if width > self.size || height > self.size {
            engine_debug!("nebula3d::ShadowAtlas",
                "Tile {}x{} for owner {} exceeds atlas size {}", width, height, owner, self.size);
            return None;
        }

        let Some(index) = self.best_short_side_fit(width, height) else {
            engine_debug!("nebula3d::ShadowAtlas",
                "Atlas exhausted: no room for {}x{} (owner {})", width, height, owner);
            return None;
        };

        let chosen = self.free.remove(index);
        self.split(chosen, width, height);

        let reservation = AtlasReservation {
            x: chosen.x,
            y: chosen.y,
            width,
            height,
            owner,
        };
        self.reservations.push(reservation);
        Some(reservation)
    }

    /// Reserve a 3 x 2 grid of `face_size` tiles for a point light's cube faces
    pub fn reserve_cubemap(&mut self, face_size: u32, owner: u64) -> Option<AtlasReservation> {
        let face_size = face_size.max(self.min_tile);
        self.reserve(face_size.checked_mul(3)?, face_size.checked_mul(2)?, owner)
    }

    /// Index of the free rectangle with the smallest (short, long) leftover
    ///
    /// The first candidate wins ties, so the result only depends on the
    /// free-list order.
    fn best_short_side_fit(&self, width: u32, height: u32) -> Option<usize> {
        let mut best: Option<(usize, (u32, u32))> = None;
        for (i, rect) in self.free.iter().enumerate() {
            if rect.width < width || rect.height < height {
                continue;
            }
            let leftover_w = rect.width - width;
            let leftover_h = rect.height - height;
            let score = (leftover_w.min(leftover_h), leftover_w.max(leftover_h));
            if best.map_or(true, |(_, best_score)| score < best_score) {
                best = Some((i, score));
            }
        }
        best.map(|(i, _)| i)
    }

    /// Split the leftover of `rect` after placing `width` x `height` at its origin
    ///
    /// The cut runs along the axis with the smaller leftover, which keeps
    /// the larger leftover in one piece.
    fn split(&mut self, rect: FreeRect, width: u32, height: u32) {
        let leftover_w = rect.width - width;
        let leftover_h = rect.height - height;

        match (leftover_w > 0, leftover_h > 0) {
            (false, false) => {}
            (true, false) => self.free.push(FreeRect {
                x: rect.x + width, y: rect.y, width: leftover_w, height: rect.height,
            }),
            (false, true) => self.free.push(FreeRect {
                x: rect.x, y: rect.y + height, width: rect.width, height: leftover_h,
            }),
            (true, true) if leftover_w <= leftover_h => {
                self.free.push(FreeRect { x: rect.x + width, y: rect.y, width: leftover_w, height });
                self.free.push(FreeRect { x: rect.x, y: rect.y + height, width: rect.width, height: leftover_h });
            }
            (true, true) => {
                self.free.push(FreeRect { x: rect.x + width, y: rect.y, width: leftover_w, height: rect.height });
                self.free.push(FreeRect { x: rect.x, y: rect.y + height, width, height: leftover_h });
            }
        }
    }

    // ===== QUERIES =====

    /// Edge length in texels
    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn min_tile_size(&self) -> u32 {
        self.min_tile
    }

    pub fn free_rects(&self) -> &[FreeRect] {
        &self.free
    }

    /// Reservations made since the last clear, in order
    pub fn reservations(&self) -> &[AtlasReservation] {
        &self.reservations
    }

    pub fn free_area(&self) -> u64 {
        self.free.iter().map(FreeRect::area).sum()
    }

    pub fn used_area(&self) -> u64 {
        self.reservations.iter().map(AtlasReservation::area).sum()
    }
}

#[cfg(test)]
#[path = "atlas_tests.rs"]
mod tests;
