/// Shadow module - atlas allocation, light selection and the shadow sub-pass

pub mod atlas;
pub mod cube;
pub mod selector;
pub mod pass;

pub use atlas::{AtlasReservation, FreeRect, ShadowAtlas, FALLBACK_ATLAS_SIZE, PREFERRED_ATLAS_SIZE};
pub use cube::CubeFace;
pub use selector::{cascade_resolution, partial_select_closest, LightSelection, LightSelector, SelectedLight};
pub use pass::{
    cascade_splits, shadow_globals, ShadowInputs, ShadowPass, ShadowRecord, ShadowSlot, ShadowState, ShadowTile,
};
