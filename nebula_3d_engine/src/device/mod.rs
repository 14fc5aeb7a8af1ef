/// Device module - the GPU-facing traits the frame core records into

pub mod command_list;
pub mod graphics_device;
pub mod render_state;

pub use command_list::*;
pub use graphics_device::*;
pub use render_state::*;

// Mock device and command list for tests (no GPU required)
#[cfg(test)]
pub mod mock_device;
