/// Frame orchestrator.
///
/// Owns every piece of cross-view state (shadow atlas, uniform cache,
/// motion history, post chain) and drives one frame:
///
/// ```text
/// begin_frame(time)
///   render_view(view, drawables, lights, ...)   // once per view
///     1. upload the per-frame uniform block
///     2. layer mask + visibility -> excluded drawables
///     3. select lights, reserve atlas tiles, render shadow casters
///     4. scene passes (opaque, then transparent back-to-front)
///     5. post-process chain
/// end_frame()
/// ```
///
/// The atlas is cleared at `begin_frame`, so several views in one frame
/// share its space.

use crate::error::{Error, Result};
use crate::config::{DrawOrder, RendererConfig};
use crate::device::{ClearValue, CommandList, GraphicsDevice, Rect2D, RenderTarget};
use crate::batch::{BatchBuilder, BatchStats, BatchView, DrawContext, MotionHistory};
use crate::post_process::PostProcessChain;
use crate::resource::ProgramResolver;
use crate::scene::{Drawable, Light};
use crate::shadow::{shadow_globals, LightSelection, ShadowAtlas, ShadowInputs, ShadowPass, ShadowRecord, ShadowState};
use crate::uniform::{FrameTime, FrameUniformBlock, UniformCache, UniformCacheStats};
use crate::view::ViewContext;
use crate::{engine_info, engine_trace};

/// What happened while rendering one view
#[derive(Debug, Clone, Default)]
pub struct FrameReport {
    pub frame: u64,
    /// Drawables that passed the layer mask and visibility test
    pub visible_drawables: usize,
    pub culled_drawables: usize,
    pub selection: LightSelection,
    /// One record per input light, in input order
    pub shadows: Vec<ShadowRecord>,
    pub batches: BatchStats,
    pub uniforms: UniformCacheStats,
    pub atlas_used_area: u64,
    pub atlas_free_area: u64,
    pub post_effects: usize,
}

impl FrameReport {
    /// Lights whose shadow maps were rendered
    pub fn shadowed_lights(&self) -> usize {
        self.shadows.iter().filter(|r| r.state() == ShadowState::Rendered).count()
    }
}

/// Drives shadow, scene and post passes for each view of a frame
pub struct FrameOrchestrator {
    config: RendererConfig,
    atlas: ShadowAtlas,
    shadow_pass: ShadowPass,
    builder: BatchBuilder,
    uniform_cache: UniformCache,
    motion: MotionHistory,
    post_process: PostProcessChain,
    current: Option<FrameTime>,
}

impl FrameOrchestrator {
    /// Create the orchestrator and size the shadow atlas from the device
    pub fn new(device: &dyn GraphicsDevice, config: RendererConfig) -> Result<Self> {
        let atlas = ShadowAtlas::for_device(device, &config.shadow)?;
        engine_info!("nebula3d::FrameOrchestrator",
            "Frame orchestrator ready: {} scene pass(es), up to {} spot / {} point shadows",
            config.passes.len(), config.shadow.max_spot_lights, config.shadow.max_point_lights);

        Ok(Self {
            shadow_pass: ShadowPass::new(&config.shadow),
            builder: BatchBuilder::new(&config.batch),
            motion: MotionHistory::new(config.batch.motion_purge_interval),
            uniform_cache: UniformCache::new(),
            post_process: PostProcessChain::new(),
            atlas,
            config,
            current: None,
        })
    }

    // ===== FRAME LIFECYCLE =====

    /// Start a frame: clears the shadow atlas
    pub fn begin_frame(&mut self, time: FrameTime) -> Result<()> {
        if let Some(current) = self.current {
            return Err(Error::InvalidFrameState(format!(
                "begin_frame({}) called while frame {} is still open", time.frame, current.frame
            )));
        }
        self.atlas.clear();
        self.current = Some(time);
        Ok(())
    }

    /// Render one view of the current frame
    ///
    /// Invalid drawables, program variant misses and atlas exhaustion are
    /// absorbed and show up in the report. Command-list failures and
    /// post-process failures are returned.
    pub fn render_view<D: Drawable>(
        &mut self,
        view: &ViewContext<'_>,
        drawables: &[D],
        lights: &[Light],
        resolver: &dyn ProgramResolver,
        cmd: &mut dyn CommandList,
    ) -> Result<FrameReport> {
        let time = self.current.ok_or_else(|| {
            Error::InvalidFrameState("render_view called outside begin_frame/end_frame".to_string())
        })?;
        let camera = view.camera;
        self.builder.reset_stats();
        self.uniform_cache.reset_stats();

        // 1. Per-frame uniform block
        let block = FrameUniformBlock::new(camera, &view.environment, time);
        cmd.update_frame_block(block.as_bytes())?;

        // 2. Layer mask and visibility
        let mut main_excluded = Vec::new();
        let mut caster_excluded = Vec::new();
        for (index, drawable) in drawables.iter().enumerate() {
            let present = drawable.is_visible() && view.accepts_layer(drawable.layer());
            if !present || !drawable.casts_shadows() {
                caster_excluded.push(index);
            }
            if !present || !view.visibility.is_visible(&drawable.bounds()) {
                main_excluded.push(index);
            }
        }

        let mut ctx = DrawContext {
            resolver,
            cache: &mut self.uniform_cache,
            motion: &mut self.motion,
            cmd,
        };

        // 3. Light selection and shadow sub-pass
        let selection = self.shadow_pass.selector().select(lights, camera.position());
        let inputs = ShadowInputs {
            lights,
            selection: &selection,
            camera,
            drawables,
            caster_excluded: &caster_excluded,
            frame: time.frame,
        };
        let shadows = self.shadow_pass.run(&inputs, &mut self.atlas, &mut self.builder, &mut ctx)?;
        let globals = shadow_globals(&shadows, self.atlas.size());

        // 4. Scene passes
        let viewport = *camera.viewport();
        ctx.cmd.begin_render_pass(RenderTarget::Screen, &[
            ClearValue::Color(view.environment.fog_color.to_array()),
            ClearValue::DepthStencil { depth: 1.0, stencil: 0 },
        ])?;
        ctx.cmd.set_viewport(viewport)?;
        ctx.cmd.set_scissor(Rect2D {
            x: viewport.x as i32,
            y: viewport.y as i32,
            width: viewport.width as u32,
            height: viewport.height as u32,
        })?;

        let batch_view = BatchView {
            view_projection: camera.view_projection_matrix(),
            track_motion: view.track_motion,
            frame: time.frame,
            globals: &globals,
        };
        let eye = camera.position();
        for pass in &self.config.passes {
            let mut order: Vec<usize> = (0..drawables.len()).collect();
            let batches = match pass.order {
                DrawOrder::Submission => self.builder.build_ordered(drawables, &order, &pass.filter, &main_excluded),
                DrawOrder::BackToFront => {
                    let depth: Vec<f32> = drawables.iter().map(|d| d.world_position().distance_squared(eye)).collect();
                    order.sort_by(|&a, &b| depth[b].total_cmp(&depth[a]));
                    self.builder.build_sorted(drawables, &order, &pass.filter, &main_excluded)
                }
            };
            engine_trace!("nebula3d::FrameOrchestrator",
                "Pass '{}': {} batch(es)", pass.name, batches.len());
            self.builder.draw(&batches, drawables, &batch_view, &mut ctx)?;
        }
        ctx.cmd.end_render_pass()?;

        // 5. Post-process chain
        let post_effects = self.post_process.run(&mut *ctx.cmd, camera)?;

        let report = FrameReport {
            frame: time.frame,
            visible_drawables: drawables.len() - main_excluded.len(),
            culled_drawables: main_excluded.len(),
            selection,
            shadows,
            batches: self.builder.stats(),
            uniforms: self.uniform_cache.stats(),
            atlas_used_area: self.atlas.used_area(),
            atlas_free_area: self.atlas.free_area(),
            post_effects,
        };
        engine_trace!("nebula3d::FrameOrchestrator",
            "Frame {}: {} visible, {} batches, {} draw calls, {} shadowed light(s), {} uniform writes ({} skipped)",
            report.frame, report.visible_drawables, report.batches.batches, report.batches.draw_calls,
            report.shadowed_lights(), report.uniforms.writes, report.uniforms.skipped);
        Ok(report)
    }

    /// Close the frame and purge stale motion history on purge frames
    pub fn end_frame(&mut self) -> Result<()> {
        let time = self.current.take().ok_or_else(|| {
            Error::InvalidFrameState("end_frame called without begin_frame".to_string())
        })?;
        self.motion.end_frame(time.frame);
        Ok(())
    }

    // ===== ACCESSORS =====

    pub fn is_in_frame(&self) -> bool {
        self.current.is_some()
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    pub fn atlas(&self) -> &ShadowAtlas {
        &self.atlas
    }

    pub fn uniform_cache(&self) -> &UniformCache {
        &self.uniform_cache
    }

    /// Mutable cache access, e.g. to invalidate after a shader reload
    pub fn uniform_cache_mut(&mut self) -> &mut UniformCache {
        &mut self.uniform_cache
    }

    pub fn motion_history(&self) -> &MotionHistory {
        &self.motion
    }

    pub fn post_process_mut(&mut self) -> &mut PostProcessChain {
        &mut self.post_process
    }
}

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;
