/// Shadow sub-pass.
///
/// Per frame, every light gets a `ShadowRecord`. Lights that are not
/// selected or do not cast shadows stay `NotCast`. Selected casters get one
/// tile per shadow map (1 to 4 cascades for directional lights, one tile
/// for spots, one 3 x 2 cube grid for points), each walking
///
/// ```text
///   Requested -> Reserved -> Rendered
///             \-> Failed            (atlas full: light renders unshadowed)
/// ```
///
/// Reservation order is deterministic: directional cascades first, then
/// spot and point lights merged by ascending distance to the viewer.

use std::f32::consts::PI;
use glam::{Mat4, Vec2, Vec3, Vec4};
use crate::error::Result;
use crate::config::ShadowConfig;
use crate::device::{ClearValue, Rect2D, RenderTarget, Viewport};
use crate::batch::{BatchBuilder, BatchView, DrawContext, RenderBatch, TagFilter};
use crate::scene::{Drawable, Light, LightKind, LightType, ShadowBias};
use crate::shadow::{cascade_resolution, CubeFace, LightSelection, LightSelector, ShadowAtlas, AtlasReservation};
use crate::uniform::UniformValue;
use crate::view::Camera;
use crate::engine_debug;

/// Near plane of spot-light projections
const SPOT_NEAR: f32 = 0.05;

// ===== STATES =====

/// Per-tile shadow state for the current frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShadowState {
    /// Shadows disabled or light not selected
    NotCast,
    Requested,
    Reserved,
    Rendered,
    /// Atlas had no room; treated like `NotCast` for the frame
    Failed,
}

/// Which shadow map of a light a tile holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShadowSlot {
    Cascade(u8),
    Spot,
    /// Six faces in a 3 x 2 grid
    Cube,
}

/// One atlas tile of a light
#[derive(Debug, Clone, PartialEq)]
pub struct ShadowTile {
    pub slot: ShadowSlot,
    pub state: ShadowState,
    /// Edge length of one face in texels
    pub resolution: u32,
    pub reservation: Option<AtlasReservation>,
    /// One matrix per face (6 for cubes, 1 otherwise), set once reserved
    pub light_space: Vec<Mat4>,
    /// Far distance covered by a cascade, 0 for other slots
    pub split_far: f32,
}

impl ShadowTile {
    fn requested(slot: ShadowSlot, resolution: u32) -> Self {
        Self {
            slot,
            state: ShadowState::Requested,
            resolution,
            reservation: None,
            light_space: Vec::new(),
            split_far: 0.0,
        }
    }

    pub fn face_count(&self) -> usize {
        match self.slot {
            ShadowSlot::Cube => CubeFace::ALL.len(),
            _ => 1,
        }
    }

    /// Texel rectangle of one face inside the atlas
    pub fn face_rect(&self, face: usize) -> Option<Rect2D> {
        let reservation = self.reservation?;
        match self.slot {
            ShadowSlot::Cube => {
                let cube_face = *CubeFace::ALL.get(face)?;
                let size = reservation.height / 2;
                let (x, y) = cube_face.tile_origin(reservation.x, reservation.y, size);
                Some(Rect2D { x: x as i32, y: y as i32, width: size, height: size })
            }
            _ if face == 0 => Some(reservation.rect()),
            _ => None,
        }
    }

    /// Normalized atlas rectangle of one face: (scale.x, scale.y, offset.x, offset.y)
    pub fn atlas_uv_rect(&self, face: usize, atlas_size: u32) -> Option<Vec4> {
        let rect = self.face_rect(face)?;
        let inv = 1.0 / atlas_size.max(1) as f32;
        Some(Vec4::new(
            rect.width as f32 * inv,
            rect.height as f32 * inv,
            rect.x as f32 * inv,
            rect.y as f32 * inv,
        ))
    }
}

/// Shadow bookkeeping for one light for one frame
#[derive(Debug, Clone, PartialEq)]
pub struct ShadowRecord {
    /// Index into the frame's light slice
    pub light_index: usize,
    pub light_id: u64,
    pub light_type: LightType,
    /// Distance to the viewer (0 when not selected)
    pub distance: f32,
    pub bias: ShadowBias,
    pub tiles: Vec<ShadowTile>,
}

impl ShadowRecord {
    fn not_cast(light_index: usize, light: &Light) -> Self {
        Self {
            light_index,
            light_id: light.id,
            light_type: light.light_type(),
            distance: 0.0,
            bias: light.bias,
            tiles: Vec::new(),
        }
    }

    /// Summary state: the most advanced state reached by any tile
    pub fn state(&self) -> ShadowState {
        let has = |state| self.tiles.iter().any(|t| t.state == state);
        if self.tiles.is_empty() {
            ShadowState::NotCast
        } else if has(ShadowState::Rendered) {
            ShadowState::Rendered
        } else if has(ShadowState::Reserved) {
            ShadowState::Reserved
        } else if has(ShadowState::Failed) {
            ShadowState::Failed
        } else {
            ShadowState::Requested
        }
    }

    /// Whether any shadow map of this light was rendered this frame
    pub fn is_shadowed(&self) -> bool {
        self.state() == ShadowState::Rendered
    }
}

// ===== CASCADES =====

/// Far distance of each cascade using the practical split scheme
///
/// Blends uniform (`lambda` 0) and logarithmic (`lambda` 1) splits over
/// `[near, far]`. The last split is always `far`.
pub fn cascade_splits(near: f32, far: f32, count: usize, lambda: f32) -> Vec<f32> {
    let near = near.max(1e-3);
    let far = far.max(near * 1.001);
    let lambda = lambda.clamp(0.0, 1.0);

    (1..=count)
        .map(|i| {
            let p = i as f32 / count as f32;
            let uniform = near + (far - near) * p;
            let log = near * (far / near).powf(p);
            uniform + (log - uniform) * lambda
        })
        .collect()
}

/// Up vector that is never parallel to `direction`
fn stable_up(direction: Vec3) -> Vec3 {
    if direction.y.abs() > 0.99 { Vec3::Z } else { Vec3::Y }
}

/// Light-space view-projection matrices for one tile
fn light_space_matrices(light: &Light, tile: &ShadowTile, camera: &Camera) -> Vec<Mat4> {
    match light.kind {
        LightKind::Directional { .. } => {
            // Bounding sphere of the cascade range around the viewer
            let center = camera.position();
            let radius = tile.split_far.max(1e-3);
            let direction = light.direction();
            let eye = center - direction * radius * 2.0;
            let view = Mat4::look_at_rh(eye, center, stable_up(direction));
            let projection = Mat4::orthographic_rh(-radius, radius, -radius, radius, 0.0, radius * 4.0);
            vec![projection * view]
        }
        LightKind::Spot { range, outer_angle } => {
            let position = light.position();
            let direction = light.direction();
            let fov = (outer_angle * 2.0).clamp(0.01, PI - 0.01);
            let projection = Mat4::perspective_rh(fov, 1.0, SPOT_NEAR, range.max(SPOT_NEAR * 2.0));
            let view = Mat4::look_at_rh(position, position + direction, stable_up(direction));
            vec![projection * view]
        }
        LightKind::Point { range } => CubeFace::ALL
            .iter()
            .map(|face| face.view_projection(light.position(), range))
            .collect(),
    }
}

// ===== SHADOW PASS =====

/// Per-frame inputs of a shadow pass
pub struct ShadowInputs<'a, D: Drawable> {
    pub lights: &'a [Light],
    pub selection: &'a LightSelection,
    pub camera: &'a Camera,
    pub drawables: &'a [D],
    /// Drawables that must not cast (hidden, non-casting, masked out)
    pub caster_excluded: &'a [usize],
    pub frame: u64,
}

/// Plans atlas tiles and renders shadow casters into them
#[derive(Debug, Clone)]
pub struct ShadowPass {
    selector: LightSelector,
    min_tile: u32,
    cascade_split_lambda: f32,
    shadow_distance: f32,
    caster_filter: TagFilter,
}

impl ShadowPass {
    pub fn new(config: &ShadowConfig) -> Self {
        Self {
            selector: LightSelector::new(config),
            min_tile: config.min_tile_size,
            cascade_split_lambda: config.cascade_split_lambda,
            shadow_distance: config.shadow_distance,
            caster_filter: config.caster_filter.clone(),
        }
    }

    pub fn selector(&self) -> &LightSelector {
        &self.selector
    }

    /// Create records for every light and reserve atlas tiles for selected casters
    pub fn plan(
        &self,
        lights: &[Light],
        selection: &LightSelection,
        camera: &Camera,
        atlas: &mut ShadowAtlas,
    ) -> Vec<ShadowRecord> {
        let mut records: Vec<ShadowRecord> = lights
            .iter()
            .enumerate()
            .map(|(i, light)| ShadowRecord::not_cast(i, light))
            .collect();

        // Directional first, then spots and points by ascending distance
        let mut queue: Vec<_> = selection.directional.iter().copied().collect();
        let mut local: Vec<_> = selection.spots.iter().chain(&selection.points).copied().collect();
        local.sort_by(|a, b| a.distance_sq.total_cmp(&b.distance_sq));
        queue.extend(local);

        for selected in queue {
            let light = &lights[selected.index];
            if !light.cast_shadows {
                continue;
            }
            let record = &mut records[selected.index];
            record.distance = selected.distance();
            record.tiles = self.request_tiles(light, record.distance, camera);

            for tile in &mut record.tiles {
                let reservation = match tile.slot {
                    ShadowSlot::Cube => atlas.reserve_cubemap(tile.resolution, light.id),
                    _ => atlas.reserve(tile.resolution, tile.resolution, light.id),
                };
                match reservation {
                    Some(reservation) => {
                        tile.reservation = Some(reservation);
                        tile.resolution = tile.resolution.max(atlas.min_tile_size());
                        tile.state = ShadowState::Reserved;
                        tile.light_space = light_space_matrices(light, tile, camera);
                    }
                    None => {
                        engine_debug!("nebula3d::ShadowPass",
                            "Light {} {:?} tile {:?} ({} px) failed to reserve; rendering unshadowed",
                            light.id, record.light_type, tile.slot, tile.resolution);
                        tile.state = ShadowState::Failed;
                    }
                }
            }
        }

        records
    }

    fn request_tiles(&self, light: &Light, distance: f32, camera: &Camera) -> Vec<ShadowTile> {
        match light.kind {
            LightKind::Directional { cascades } => {
                let splits = cascade_splits(camera.near(), self.shadow_distance, cascades.count(),
                    self.cascade_split_lambda);
                splits
                    .into_iter()
                    .enumerate()
                    .map(|(c, split_far)| ShadowTile {
                        split_far,
                        ..ShadowTile::requested(
                            ShadowSlot::Cascade(c as u8),
                            cascade_resolution(light.resolution, c, self.min_tile),
                        )
                    })
                    .collect()
            }
            LightKind::Spot { .. } => vec![ShadowTile::requested(
                ShadowSlot::Spot,
                self.selector.spot_resolution(light, distance),
            )],
            LightKind::Point { .. } => vec![ShadowTile::requested(
                ShadowSlot::Cube,
                self.selector.point_face_resolution(light, distance),
            )],
        }
    }

    /// Draw `casters` into every reserved tile and mark it rendered
    ///
    /// Returns the number of face renders issued. No render pass is begun
    /// when nothing was reserved.
    pub fn render<D: Drawable>(
        &self,
        records: &mut [ShadowRecord],
        drawables: &[D],
        casters: &[RenderBatch],
        frame: u64,
        builder: &mut BatchBuilder,
        ctx: &mut DrawContext<'_>,
    ) -> Result<usize> {
        let any_reserved = records
            .iter()
            .flat_map(|r| &r.tiles)
            .any(|t| t.state == ShadowState::Reserved);
        if !any_reserved {
            return Ok(0);
        }

        ctx.cmd.begin_render_pass(RenderTarget::ShadowAtlas, &[ClearValue::DepthStencil { depth: 1.0, stencil: 0 }])?;

        let mut face_renders = 0;
        for record in records.iter_mut() {
            let bias = Vec2::new(record.bias.depth, record.bias.normal);
            for tile in record.tiles.iter_mut().filter(|t| t.state == ShadowState::Reserved) {
                for (face, light_space) in tile.light_space.iter().enumerate() {
                    let Some(rect) = tile.face_rect(face) else { continue };
                    ctx.cmd.set_viewport(Viewport::from_rect(rect))?;
                    ctx.cmd.set_scissor(rect)?;

                    let globals = [
                        ("u_LightViewProjection".to_string(), UniformValue::Mat4(*light_space)),
                        ("u_ShadowBias".to_string(), UniformValue::Vec2(bias)),
                    ];
                    let view = BatchView {
                        view_projection: *light_space,
                        track_motion: false,
                        frame,
                        globals: &globals,
                    };
                    builder.draw(casters, drawables, &view, ctx)?;
                    face_renders += 1;
                }
                tile.state = ShadowState::Rendered;
            }
        }

        ctx.cmd.end_render_pass()?;
        Ok(face_renders)
    }

    /// Plan tiles, build caster batches once, and render them into the atlas
    pub fn run<D: Drawable>(
        &self,
        inputs: &ShadowInputs<'_, D>,
        atlas: &mut ShadowAtlas,
        builder: &mut BatchBuilder,
        ctx: &mut DrawContext<'_>,
    ) -> Result<Vec<ShadowRecord>> {
        let mut records = self.plan(inputs.lights, inputs.selection, inputs.camera, atlas);
        if records.iter().any(|r| r.state() == ShadowState::Reserved) {
            let casters = builder.build(inputs.drawables, &self.caster_filter, inputs.caster_excluded);
            self.render(&mut records, inputs.drawables, &casters, inputs.frame, builder, ctx)?;
        }
        Ok(records)
    }
}

/// Sampling uniforms for every rendered shadow face
///
/// Writes `u_ShadowMatrix[i]`, `u_ShadowAtlasRect[i]`, `u_ShadowBias[i]`
/// and `u_ShadowLight[i]` per face, then `u_ShadowCount`.
pub fn shadow_globals(records: &[ShadowRecord], atlas_size: u32) -> Vec<(String, UniformValue)> {
    let mut globals = Vec::new();
    let mut count = 0u32;

    for record in records {
        let bias = Vec2::new(record.bias.depth, record.bias.normal);
        for tile in record.tiles.iter().filter(|t| t.state == ShadowState::Rendered) {
            for (face, matrix) in tile.light_space.iter().enumerate() {
                let Some(uv_rect) = tile.atlas_uv_rect(face, atlas_size) else { continue };
                globals.push((format!("u_ShadowMatrix[{}]", count), UniformValue::Mat4(*matrix)));
                globals.push((format!("u_ShadowAtlasRect[{}]", count), UniformValue::Vec4(uv_rect)));
                globals.push((format!("u_ShadowBias[{}]", count), UniformValue::Vec2(bias)));
                globals.push((format!("u_ShadowLight[{}]", count), UniformValue::UInt(record.light_index as u32)));
                count += 1;
            }
        }
    }

    globals.push(("u_ShadowCount".to_string(), UniformValue::UInt(count)));
    globals
}

#[cfg(test)]
#[path = "pass_tests.rs"]
mod tests;
