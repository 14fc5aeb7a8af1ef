/// Batch module - grouping drawables into minimal state changes

pub mod tags;
pub mod batch;
pub mod motion;
pub mod builder;

pub use tags::TagFilter;
pub use batch::{BatchKey, BatchKind, BatchStats, RenderBatch};
pub use motion::MotionHistory;
pub use builder::{BatchBuilder, BatchView, DrawContext};
