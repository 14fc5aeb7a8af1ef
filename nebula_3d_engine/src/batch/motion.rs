/// Motion-vector transform history.
///
/// Maps a drawable's stable id to its transform from the previous frame.
/// Ids not seen for a frame are purged every `purge_interval` frames
/// instead of on every draw. An interval of 0 purges every frame.

use glam::Mat4;
use rustc_hash::FxHashMap;
use crate::engine_debug;

#[derive(Debug, Clone, Copy)]
struct MotionEntry {
    current: Mat4,
    previous: Mat4,
    frame_seen: u64,
}

/// Previous-frame transforms keyed by drawable id
#[derive(Debug)]
pub struct MotionHistory {
    entries: FxHashMap<u64, MotionEntry>,
    purge_interval: u64,
}

impl MotionHistory {
    pub fn new(purge_interval: u64) -> Self {
        Self {
            entries: FxHashMap::default(),
            purge_interval: purge_interval.max(1),
        }
    }

    /// Record `transform` for `id` on `frame` and return its previous transform
    ///
    /// Repeated calls within one frame return the same previous transform.
    /// An id that is new, or was missing last frame, reports no motion.
    pub fn record(&mut self, id: u64, transform: Mat4, frame: u64) -> Mat4 {
        match self.entries.get_mut(&id) {
            Some(entry) if entry.frame_seen == frame => {
                entry.current = transform;
                entry.previous
            }
            Some(entry) => {
                entry.previous = if entry.frame_seen.checked_add(1) == Some(frame) { entry.current } else { transform };
                entry.current = transform;
                entry.frame_seen = frame;
                entry.previous
            }
            None => {
                self.entries.insert(id, MotionEntry { current: transform, previous: transform, frame_seen: frame });
                transform
            }
        }
    }

    /// Previous-frame transform last reported for `id`
    pub fn previous(&self, id: u64) -> Option<Mat4> {
        self.entries.get(&id).map(|e| e.previous)
    }

    /// Purge ids not seen on `frame` if `frame` is a purge frame
    ///
    /// Returns the number of purged entries.
    pub fn end_frame(&mut self, frame: u64) -> usize {
        if frame % self.purge_interval != 0 {
            return 0;
        }

        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.frame_seen == frame);
        let purged = before - self.entries.len();
        if purged > 0 {
            engine_debug!("nebula3d::MotionHistory",
                "Purged {} stale transforms on frame {}", purged, frame);
        }
        purged
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
#[path = "motion_tests.rs"]
mod tests;
