/// Render batches rebuilt every frame.

use std::sync::Arc;
use crate::resource::{Material, Mesh, MeshId};

/// Grouping key: drawables with equal keys share one state bind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BatchKey {
    pub material_state_hash: u64,
    pub pass_index: usize,
    pub mesh: MeshId,
}

/// Members of a batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchKind {
    /// Drawable indices sharing the key, in submission order
    Grouped(Vec<usize>),
    /// One GPU-instanced drawable, drawn with a single call
    Instanced(usize),
}

/// One material/program/mesh bind followed by one or more draws
#[derive(Debug, Clone)]
pub struct RenderBatch {
    pub key: BatchKey,
    /// Pass index plus the pass's tag sort offset
    pub sort_key: i64,
    pub material: Arc<Material>,
    pub mesh: Arc<Mesh>,
    pub kind: BatchKind,
}

impl RenderBatch {
    /// Drawable indices covered by this batch
    pub fn members(&self) -> &[usize] {
        match &self.kind {
            BatchKind::Grouped(indices) => indices,
            BatchKind::Instanced(index) => std::slice::from_ref(index),
        }
    }

    pub fn is_instanced(&self) -> bool {
        matches!(self.kind, BatchKind::Instanced(_))
    }
}

/// Per-build and per-draw counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchStats {
    pub batches: u32,
    pub instanced_batches: u32,
    pub draw_calls: u32,
    /// Program + render state + material binds
    pub state_binds: u32,
    /// Drawables rejected for a missing shader or an empty mesh
    pub skipped_drawables: u32,
    /// Batches skipped because no compiled program matched
    pub variant_misses: u32,
}

impl BatchStats {
    pub fn accumulate(&mut self, other: &BatchStats) {
        self.batches += other.batches;
        self.instanced_batches += other.instanced_batches;
        self.draw_calls += other.draw_calls;
        self.state_binds += other.state_binds;
        self.skipped_drawables += other.skipped_drawables;
        self.variant_misses += other.variant_misses;
    }
}
