/// Render batch builder.
///
/// Groups drawables by `(material state, pass index, mesh)` so N drawables
/// sharing a key cost one program/state/material bind and N per-object
/// uniform writes. Batches are stable-sorted by pass index plus the order
/// tag's sort offset, so submission order survives inside each batch and
/// across batches with equal sort keys.

use std::sync::Arc;
use glam::Mat4;
use rustc_hash::FxHashMap;
use crate::error::Result;
use crate::config::{BatchConfig, SortOffsets};
use crate::device::CommandList;
use crate::resource::ProgramResolver;
use crate::scene::Drawable;
use crate::uniform::{UniformCache, UniformValue};
use crate::batch::{BatchKey, BatchKind, BatchStats, MotionHistory, RenderBatch, TagFilter};
use crate::{engine_trace, engine_warn};

/// Per-view values shared by every batch of a draw
#[derive(Debug, Clone, Copy)]
pub struct BatchView<'a> {
    pub view_projection: Mat4,
    /// Record transforms for motion vectors and write `u_PrevModel`
    pub track_motion: bool,
    /// Frame counter keying the motion history
    pub frame: u64,
    /// Extra uniforms written once per batch (shadow data, light matrices)
    pub globals: &'a [(String, UniformValue)],
}

/// Collaborators used while issuing draws
pub struct DrawContext<'a> {
    pub resolver: &'a dyn ProgramResolver,
    pub cache: &'a mut UniformCache,
    pub motion: &'a mut MotionHistory,
    pub cmd: &'a mut dyn CommandList,
}

/// Builds and draws render batches
#[derive(Debug, Clone)]
pub struct BatchBuilder {
    sort_offsets: SortOffsets,
    order_tag: String,
    stats: BatchStats,
}

impl BatchBuilder {
    pub fn new(config: &BatchConfig) -> Self {
        Self {
            sort_offsets: config.sort_offsets.clone(),
            order_tag: config.order_tag.clone(),
            stats: BatchStats::default(),
        }
    }

    pub fn stats(&self) -> BatchStats {
        self.stats
    }

    pub fn reset_stats(&mut self) {
        self.stats = BatchStats::default();
    }

    /// Group drawables in submission order
    pub fn build<D: Drawable>(&mut self, drawables: &[D], filter: &TagFilter, excluded: &[usize]) -> Vec<RenderBatch> {
        let order: Vec<usize> = (0..drawables.len()).collect();
        self.build_ordered(drawables, &order, filter, excluded)
    }

    /// Group drawables visited in `order` (indices into `drawables`)
    ///
    /// Drawables sharing a batch key merge wherever they appear in `order`.
    /// Out-of-range indices in `order` or `excluded` are ignored.
    pub fn build_ordered<D: Drawable>(
        &mut self,
        drawables: &[D],
        order: &[usize],
        filter: &TagFilter,
        excluded: &[usize],
    ) -> Vec<RenderBatch> {
        self.group(drawables, order, filter, excluded, false)
    }

    /// Group drawables visited in `order`, merging only consecutive runs
    ///
    /// A drawable joins a batch only when the previous drawing drawable in
    /// `order` created or extended it. Interleaved keys split into separate
    /// batches, so a depth-sorted order is drawn exactly as given.
    pub fn build_sorted<D: Drawable>(
        &mut self,
        drawables: &[D],
        order: &[usize],
        filter: &TagFilter,
        excluded: &[usize],
    ) -> Vec<RenderBatch> {
        self.group(drawables, order, filter, excluded, true)
    }

    fn group<D: Drawable>(
        &mut self,
        drawables: &[D],
        order: &[usize],
        filter: &TagFilter,
        excluded: &[usize],
        consecutive: bool,
    ) -> Vec<RenderBatch> {
        let mut skip = vec![false; drawables.len()];
        for &index in excluded {
            if let Some(flag) = skip.get_mut(index) {
                *flag = true;
            }
        }

        let mut batches: Vec<RenderBatch> = Vec::new();
        let mut grouped: FxHashMap<BatchKey, usize> = FxHashMap::default();
        // Batches touched by the previous drawing drawable
        let mut last_run: Vec<(BatchKey, usize)> = Vec::new();

        for &index in order {
            if skip.get(index).copied().unwrap_or(true) {
                continue;
            }
            let drawable = &drawables[index];

            let material = match drawable.material() {
                Some(material) if material.is_valid() => material,
                _ => {
                    engine_trace!("nebula3d::BatchBuilder",
                        "Skipping drawable {}: material without a valid shader", drawable.stable_id());
                    self.stats.skipped_drawables += 1;
                    continue;
                }
            };
            let mesh = drawable.mesh();
            if mesh.is_degenerate() {
                engine_trace!("nebula3d::BatchBuilder",
                    "Skipping drawable {}: mesh '{}' has no vertices", drawable.stable_id(), mesh.name());
                self.stats.skipped_drawables += 1;
                continue;
            }
            let Some(shader) = material.shader() else { continue };
            let instanced = !drawable.instance_transforms().is_empty();
            let mut run: Vec<(BatchKey, usize)> = Vec::new();
            let mut drew = false;

            for (pass_index, pass) in shader.passes().iter().enumerate() {
                if !filter.matches(pass) {
                    continue;
                }

                let offset = pass
                    .tag(&self.order_tag)
                    .and_then(|value| self.sort_offsets.get(value))
                    .unwrap_or(0);
                let key = BatchKey {
                    material_state_hash: material.state_hash(),
                    pass_index,
                    mesh: mesh.id(),
                };

                if instanced {
                    batches.push(RenderBatch {
                        key,
                        sort_key: pass_index as i64 + offset,
                        material: Arc::clone(material),
                        mesh: Arc::clone(mesh),
                        kind: BatchKind::Instanced(index),
                    });
                    self.stats.instanced_batches += 1;
                    drew = true;
                    continue;
                }

                let existing = if consecutive {
                    last_run.iter().find(|(k, _)| *k == key).map(|&(_, slot)| slot)
                } else {
                    grouped.get(&key).copied()
                };
                match existing {
                    Some(slot) => {
                        if let BatchKind::Grouped(members) = &mut batches[slot].kind {
                            members.push(index);
                        }
                        run.push((key, slot));
                    }
                    None => {
                        let slot = batches.len();
                        grouped.insert(key, slot);
                        run.push((key, slot));
                        batches.push(RenderBatch {
                            key,
                            sort_key: pass_index as i64 + offset,
                            material: Arc::clone(material),
                            mesh: Arc::clone(mesh),
                            kind: BatchKind::Grouped(vec![index]),
                        });
                    }
                }
                drew = true;
            }

            if drew {
                last_run = run;
            }
        }

        batches.sort_by_key(|batch| batch.sort_key);
        self.stats.batches += batches.len() as u32;
        batches
    }

    /// Issue the draws for `batches` built from `drawables`
    ///
    /// A batch whose program variant cannot be resolved is skipped with a
    /// warning. Command-list failures abort and propagate.
    pub fn draw<D: Drawable>(
        &mut self,
        batches: &[RenderBatch],
        drawables: &[D],
        view: &BatchView<'_>,
        ctx: &mut DrawContext<'_>,
    ) -> Result<()> {
        for batch in batches {
            let Some(shader) = batch.material.shader() else { continue };
            let keywords = batch.material.keywords();
            let Some(program) = ctx.resolver.resolve(shader.id(), batch.key.pass_index, keywords) else {
                engine_warn!("nebula3d::BatchBuilder",
                    "No compiled variant for shader '{}' pass {} keywords {:?}; skipping {} drawable(s)",
                    shader.name(), batch.key.pass_index, keywords.iter().collect::<Vec<_>>(), batch.members().len());
                self.stats.variant_misses += 1;
                continue;
            };

            // Once per batch: program, render state, material and view uniforms, mesh
            ctx.cmd.bind_program(program.id)?;
            ctx.cmd.set_render_state(batch.material.render_state())?;
            self.stats.state_binds += 1;

            for (name, value) in batch.material.params() {
                ctx.cache.set_if_changed(&mut *ctx.cmd, program, name, *value)?;
            }
            ctx.cache.set_if_changed(&mut *ctx.cmd, program, "u_ViewProjection", view.view_projection.into())?;
            for (name, value) in view.globals {
                ctx.cache.set_if_changed(&mut *ctx.cmd, program, name, *value)?;
            }
            ctx.cmd.bind_mesh(&batch.mesh)?;

            match &batch.kind {
                BatchKind::Grouped(members) => {
                    for &index in members {
                        let drawable = &drawables[index];
                        let model = drawable.world_matrix();
                        ctx.cache.set_if_changed(&mut *ctx.cmd, program, "u_Model", model.into())?;
                        ctx.cache.set_if_changed(&mut *ctx.cmd, program, "u_ModelViewProjection",
                            (view.view_projection * model).into())?;
                        ctx.cache.set_if_changed(&mut *ctx.cmd, program, "u_Tint", drawable.tint().into())?;
                        if view.track_motion {
                            let previous = ctx.motion.record(drawable.stable_id(), model, view.frame);
                            ctx.cache.set_if_changed(&mut *ctx.cmd, program, "u_PrevModel", previous.into())?;
                        }
                        ctx.cmd.draw(&batch.mesh)?;
                        self.stats.draw_calls += 1;
                    }
                }
                BatchKind::Instanced(index) => {
                    let drawable = &drawables[*index];
                    if view.track_motion {
                        let previous = ctx.motion.record(drawable.stable_id(), drawable.world_matrix(), view.frame);
                        ctx.cache.set_if_changed(&mut *ctx.cmd, program, "u_PrevModel", previous.into())?;
                    }
                    ctx.cmd.draw_instanced(&batch.mesh, drawable.instance_transforms(), drawable.instance_tints())?;
                    self.stats.draw_calls += 1;
                }
            }
        }
        Ok(())
    }

    /// Build with `filter` and draw immediately
    pub fn build_and_draw<D: Drawable>(
        &mut self,
        drawables: &[D],
        filter: &TagFilter,
        excluded: &[usize],
        view: &BatchView<'_>,
        ctx: &mut DrawContext<'_>,
    ) -> Result<Vec<RenderBatch>> {
        let batches = self.build(drawables, filter, excluded);
        self.draw(&batches, drawables, view, ctx)?;
        Ok(batches)
    }
}

#[cfg(test)]
#[path = "builder_tests.rs"]
mod tests;
