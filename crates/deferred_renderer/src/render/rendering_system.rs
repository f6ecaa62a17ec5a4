//! # Rendering System
//!
//! Per-frame orchestrator of the deferred pipeline. It owns the graphics
//! device, the G-buffer, the pass state tracker and the resource provisioner,
//! and runs the fixed pass sequence once per frame.
//!
//! ## Pass Order
//!
//! Shadow → GBuffer → Lighting → Skybox → Transparency → PostProcess →
//! Debug → Composite → UI
//!
//! The skybox fills the lighting target after lighting so that transparent
//! objects blend over the sky rather than being overwritten by it.
//!
//! ## Failure Policy
//!
//! Every pass is opened and closed on the [`PassStateTracker`], even when it
//! fails. A pass whose GPU resources cannot be created is skipped for the
//! frame and the next pass runs. Every other error ends the frame.

use crate::core::PipelineConfig;
use crate::foundation::math::{Mat4, Vec3};
use crate::render::api::{CommandContext, GraphicsDevice, ShaderResourceView};
use crate::render::constants::{DebugVertex, FrameConstants, LightConstants};
use crate::render::debug_lines::{self, DebugLine};
use crate::render::gbuffer::GBuffer;
use crate::render::lighting::LightingEnvironment;
use crate::render::partition::RenderablePartition;
use crate::render::pass_state::{PassStateTracker, RenderPass};
use crate::render::passes::{self, LightingSamplers};
use crate::render::primitives::CameraContext;
use crate::render::provisioner::{ProvisionedTargets, ResourceProvisioner};
use crate::render::renderable::RenderableComponent;
use crate::render::surface::ColorSurface;
use crate::render::technique::Technique;
use crate::render::{RenderError, RenderResult};

/// Passes of one frame, in execution order
pub const FRAME_PASSES: [RenderPass; 9] = [
    RenderPass::Shadow,
    RenderPass::GBuffer,
    RenderPass::Lighting,
    RenderPass::Skybox,
    RenderPass::Transparency,
    RenderPass::PostProcess,
    RenderPass::Debug,
    RenderPass::Composite,
    RenderPass::Ui,
];

/// Why a pass did no work this frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Switched off in the configuration
    Disabled,
    /// A GPU resource the pass needs could not be created
    ResourceUnavailable,
}

/// What happened during one frame
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Passes that ran, in order
    pub passes_executed: Vec<RenderPass>,
    /// Passes that were opened and closed without running
    pub passes_skipped: Vec<(RenderPass, SkipReason)>,
    /// Draw calls recorded across all passes
    pub draw_calls: u32,
    /// Visible opaque components
    pub opaque_count: usize,
    /// Visible transparent components
    pub transparent_count: usize,
    /// Visible UI components
    pub ui_count: usize,
    /// Lights that rendered shadow maps
    pub shadow_casters: usize,
}

impl FrameStats {
    /// Whether `pass` ran
    pub fn executed(&self, pass: RenderPass) -> bool {
        self.passes_executed.contains(&pass)
    }

    /// Why `pass` was skipped, if it was
    pub fn skip_reason(&self, pass: RenderPass) -> Option<SkipReason> {
        self.passes_skipped.iter().find(|(p, _)| *p == pass).map(|(_, reason)| *reason)
    }
}

/// Everything the scene layer supplies for one frame
#[derive(Debug, Clone, Copy)]
pub struct FrameInput<'a> {
    /// Active camera; the frame is skipped without one
    pub camera: Option<&'a CameraContext>,
    /// Seconds since the previous frame
    pub delta_time: f32,
    /// Components to draw, in submission order
    pub renderables: &'a [RenderableComponent],
    /// Scene lights
    pub lighting: &'a LightingEnvironment,
    /// Line segments for this frame only
    pub debug_lines: &'a [DebugLine],
}

impl<'a> FrameInput<'a> {
    /// Input with a camera
    pub fn new(
        camera: &'a CameraContext,
        delta_time: f32,
        renderables: &'a [RenderableComponent],
        lighting: &'a LightingEnvironment,
    ) -> Self {
        Self {
            camera: Some(camera),
            delta_time,
            renderables,
            lighting,
            debug_lines: &[],
        }
    }

    /// Input without an active camera
    pub fn without_camera(delta_time: f32, renderables: &'a [RenderableComponent], lighting: &'a LightingEnvironment) -> Self {
        Self {
            camera: None,
            delta_time,
            renderables,
            lighting,
            debug_lines: &[],
        }
    }

    /// Attach per-frame debug lines
    pub fn with_debug_lines(mut self, lines: &'a [DebugLine]) -> Self {
        self.debug_lines = lines;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FinalColor {
    Lighting,
    PostProcess,
}

enum PassOutcome {
    Executed(u32),
    Skipped(SkipReason),
}

/// Values shared between the passes of one frame
struct FrameState<'f> {
    camera: &'f CameraContext,
    lighting: &'f LightingEnvironment,
    partition: RenderablePartition<'f>,
    debug_vertices: Vec<DebugVertex>,
    frame_constants: FrameConstants,
    shadow_matrices: Vec<Mat4>,
    shadows_ready: bool,
    final_color: FinalColor,
    stats: FrameStats,
}

/// Deferred rendering pipeline orchestrator
pub struct RenderingSystem<D: GraphicsDevice> {
    device: D,
    config: PipelineConfig,
    pass_state: PassStateTracker,
    gbuffer: GBuffer,
    provisioner: ResourceProvisioner,
    global_technique: Technique,
    skybox_texture: Option<ShaderResourceView>,
    debug_queue: Vec<DebugLine>,
    frame_count: u64,
    elapsed_time: f32,
}

impl<D: GraphicsDevice> RenderingSystem<D> {
    /// Create a rendering system around `device`
    ///
    /// No GPU resources are created until [`RenderingSystem::initialize`].
    pub fn new(device: D, config: PipelineConfig) -> RenderResult<Self> {
        config.validate()?;
        log::info!(
            "Creating rendering system (technique '{}', shadow maps {}px)",
            config.default_technique,
            config.shadow_map_resolution
        );

        Ok(Self {
            provisioner: ResourceProvisioner::new(&config),
            global_technique: Technique::deferred(config.default_technique.clone()),
            device,
            config,
            pass_state: PassStateTracker::new(),
            gbuffer: GBuffer::new(),
            skybox_texture: None,
            debug_queue: Vec::new(),
            frame_count: 0,
            elapsed_time: 0.0,
        })
    }

    /// Create the G-buffer for a `width` x `height` viewport
    pub fn initialize(&mut self, width: u32, height: u32) -> RenderResult<()> {
        if width == 0 || height == 0 {
            return Err(RenderError::InvalidViewport { width, height });
        }

        self.gbuffer.initialize(&mut self.device, width, height)?;
        self.provisioner.on_resize(&mut self.device, width, height);
        log::info!("Rendering system initialized at {}x{}", width, height);
        Ok(())
    }

    /// Recreate viewport-sized surfaces for a new viewport
    ///
    /// The shadow map array and pipeline states are kept.
    pub fn resize(&mut self, width: u32, height: u32) -> RenderResult<()> {
        if width == 0 || height == 0 {
            return Err(RenderError::InvalidViewport { width, height });
        }
        if self.gbuffer.size() == Some((width, height)) {
            return Ok(());
        }

        self.gbuffer.initialize(&mut self.device, width, height)?;
        self.provisioner.on_resize(&mut self.device, width, height);
        log::info!("Rendering system resized to {}x{}", width, height);
        Ok(())
    }

    /// Release every GPU object the pipeline created
    ///
    /// The system can be initialized again afterwards.
    pub fn release_resources(&mut self) {
        self.gbuffer.release(&mut self.device);
        self.provisioner.release_all(&mut self.device);
    }

    /// Render one frame
    ///
    /// Fails with [`RenderError::MissingCamera`] before any pass runs when
    /// `input` has no camera.
    #[allow(clippy::cast_possible_truncation)]
    pub fn render_frame(&mut self, ctx: &mut dyn CommandContext, input: &FrameInput<'_>) -> RenderResult<FrameStats> {
        let Some(camera) = input.camera else {
            log::error!("No active camera for frame {}; frame skipped", self.frame_count);
            return Err(RenderError::MissingCamera);
        };
        if !self.gbuffer.is_initialized() {
            return Err(RenderError::NotInitialized("RenderingSystem"));
        }

        self.elapsed_time += input.delta_time;

        let partition = RenderablePartition::build(input.renderables, camera.position());
        let queued = std::mem::take(&mut self.debug_queue);
        let debug_vertices = if self.config.passes.debug {
            let mut lines = queued;
            lines.extend_from_slice(input.debug_lines);
            debug_lines::to_vertices(&lines)
        } else {
            Vec::new()
        };

        let stats = FrameStats {
            opaque_count: partition.opaque.len(),
            transparent_count: partition.transparent.len(),
            ui_count: partition.ui.len(),
            ..FrameStats::default()
        };

        let mut frame = FrameState {
            camera,
            lighting: input.lighting,
            partition,
            debug_vertices,
            frame_constants: FrameConstants {
                time: self.elapsed_time,
                delta_time: input.delta_time,
                frame_index: self.frame_count as u32,
                _padding: 0,
            },
            shadow_matrices: Vec::new(),
            shadows_ready: false,
            final_color: FinalColor::Lighting,
            stats,
        };

        for pass in FRAME_PASSES {
            self.run_pass(ctx, pass, &mut frame)?;
        }

        self.frame_count += 1;
        log::trace!(
            "Frame {}: {} draw calls, {} passes skipped",
            self.frame_count,
            frame.stats.draw_calls,
            frame.stats.passes_skipped.len()
        );
        Ok(frame.stats)
    }

    /// Install the default technique by name
    pub fn set_global_technique_name(&mut self, name: impl Into<String>) {
        self.set_global_technique(Technique::deferred(name));
    }

    /// Install the default technique
    pub fn set_global_technique(&mut self, technique: Technique) {
        log::info!("Global technique set to {}", technique);
        self.global_technique = technique;
    }

    /// Technique used by components without their own
    pub fn global_technique(&self) -> &Technique {
        &self.global_technique
    }

    /// Install or remove the skybox texture
    pub fn set_skybox_texture(&mut self, texture: Option<ShaderResourceView>) {
        self.skybox_texture = texture;
    }

    /// Current skybox texture
    pub fn skybox_texture(&self) -> Option<ShaderResourceView> {
        self.skybox_texture
    }

    /// Queue a line for the next frame's debug pass
    pub fn draw_debug_line(&mut self, start: Vec3, end: Vec3, color: [f32; 4]) {
        self.debug_queue.push(DebugLine::new(start, end, color));
    }

    /// Queue the edges of an axis-aligned box for the next frame's debug pass
    pub fn draw_debug_box(&mut self, min: Vec3, max: Vec3, color: [f32; 4]) {
        self.debug_queue.extend(DebugLine::box_edges(min, max, color));
    }

    /// Lines queued for the next frame
    pub fn queued_debug_lines(&self) -> usize {
        self.debug_queue.len()
    }

    /// Graphics device
    pub fn device(&self) -> &D {
        &self.device
    }

    /// Graphics device, mutably
    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    /// Active configuration
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Pass state tracker
    pub fn pass_state(&self) -> &PassStateTracker {
        &self.pass_state
    }

    /// Lazily created resources
    pub fn provisioner(&self) -> &ResourceProvisioner {
        &self.provisioner
    }

    /// Geometry buffer
    pub fn gbuffer(&self) -> &GBuffer {
        &self.gbuffer
    }

    /// Completed frames
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Seconds of frame time rendered so far
    pub fn elapsed_time(&self) -> f32 {
        self.elapsed_time
    }

    fn run_pass(&mut self, ctx: &mut dyn CommandContext, pass: RenderPass, frame: &mut FrameState<'_>) -> RenderResult<()> {
        self.pass_state.begin_render_pass(pass)?;

        let outcome = if self.pass_enabled(pass) {
            self.execute_pass(ctx, pass, frame).map(PassOutcome::Executed)
        } else {
            Ok(PassOutcome::Skipped(SkipReason::Disabled))
        };

        let ended = self.pass_state.end_render_pass(pass);

        match outcome {
            Ok(PassOutcome::Executed(draws)) => {
                frame.stats.passes_executed.push(pass);
                frame.stats.draw_calls += draws;
            }
            Ok(PassOutcome::Skipped(reason)) => {
                log::trace!("{} pass skipped: {:?}", pass, reason);
                frame.stats.passes_skipped.push((pass, reason));
            }
            Err(e) if e.is_recoverable() => {
                log::warn!("{} pass skipped this frame: {}", pass, e);
                frame.stats.passes_skipped.push((pass, SkipReason::ResourceUnavailable));
            }
            Err(e) => {
                log::error!("{} pass failed: {}", pass, e);
                return Err(e);
            }
        }

        ended
    }

    fn pass_enabled(&self, pass: RenderPass) -> bool {
        let toggles = &self.config.passes;
        match pass {
            RenderPass::PostProcess => toggles.post_process,
            RenderPass::Skybox => toggles.skybox,
            RenderPass::Debug => toggles.debug,
            RenderPass::Ui => toggles.ui,
            _ => true,
        }
    }

    fn execute_pass(&mut self, ctx: &mut dyn CommandContext, pass: RenderPass, frame: &mut FrameState<'_>) -> RenderResult<u32> {
        match pass {
            RenderPass::Shadow => self.shadow_pass(ctx, frame),
            RenderPass::GBuffer => passes::render_geometry_pass(
                ctx,
                &mut self.gbuffer,
                frame.camera,
                &frame.partition.opaque,
                &self.global_technique,
                self.config.clear_color,
            ),
            RenderPass::Lighting => self.lighting_pass(ctx, frame),
            RenderPass::Skybox => self.skybox_pass(ctx, frame),
            RenderPass::Transparency => self.transparency_pass(ctx, frame),
            RenderPass::PostProcess => self.post_process_pass(ctx, frame),
            RenderPass::Debug => self.debug_pass(ctx, frame),
            RenderPass::Composite => self.composite_pass(ctx, frame),
            RenderPass::Ui => self.ui_pass(ctx, frame),
            RenderPass::None => Ok(0),
        }
    }

    fn shadow_pass(&mut self, ctx: &mut dyn CommandContext, frame: &mut FrameState<'_>) -> RenderResult<u32> {
        let focus = frame.camera.position();
        let extent = self.config.shadow_extent;
        let matrices: Vec<Mat4> = frame
            .lighting
            .shadow_casters()
            .filter_map(|light| light.shadow_view_projection(focus, extent))
            .collect();
        if matrices.is_empty() {
            return Ok(0);
        }

        let count = u32::try_from(matrices.len()).unwrap_or(u32::MAX);
        let states = self.provisioner.create_shadow_states(&mut self.device)?;
        self.provisioner.create_shadow_map_array(&mut self.device, count)?;
        let shadow_maps = self
            .provisioner
            .targets_mut()
            .shadow_maps
            .ok_or(RenderError::NotInitialized("shadow map array"))?;

        let casters: Vec<&RenderableComponent> = frame.partition.shadow_casters().collect();
        let draws = passes::render_shadow_pass(ctx, shadow_maps, states, &matrices, &casters)?;

        frame.stats.shadow_casters = matrices.len();
        frame.shadow_matrices = matrices;
        frame.shadows_ready = true;
        Ok(draws)
    }

    fn lighting_pass(&mut self, ctx: &mut dyn CommandContext, frame: &mut FrameState<'_>) -> RenderResult<u32> {
        self.provisioner.create_lighting_target(&mut self.device)?;
        let linear = self.provisioner.create_linear_sampler(&mut self.device)?;
        let shadow = if frame.shadows_ready {
            Some(self.provisioner.create_shadow_states(&mut self.device)?.sampler)
        } else {
            None
        };
        let lights = LightConstants::from_environment(frame.lighting, &frame.shadow_matrices);

        let targets = self.provisioner.targets_mut();
        let target = targets.lighting.ok_or(RenderError::NotInitialized("lighting target"))?;
        let shadow_maps = if frame.shadows_ready { targets.shadow_maps } else { None };

        passes::render_lighting_pass(
            ctx,
            &mut self.gbuffer,
            target,
            shadow_maps,
            LightingSamplers { linear, shadow },
            frame.camera,
            &lights,
        )
    }

    fn skybox_pass(&mut self, ctx: &mut dyn CommandContext, frame: &mut FrameState<'_>) -> RenderResult<u32> {
        let Some(texture) = self.skybox_texture else {
            return Ok(0);
        };

        let states = self.provisioner.create_skybox_states(&mut self.device)?;
        let sampler = self.provisioner.create_linear_sampler(&mut self.device)?;
        let target = self.provisioner.create_lighting_target(&mut self.device)?;
        let depth = self.gbuffer.depth_mut()?;

        passes::render_skybox_pass(ctx, target, depth, states, sampler, texture, frame.camera)
    }

    fn transparency_pass(&mut self, ctx: &mut dyn CommandContext, frame: &mut FrameState<'_>) -> RenderResult<u32> {
        if frame.partition.transparent.is_empty() {
            return Ok(0);
        }

        let states = self.provisioner.create_transparency_states(&mut self.device)?;
        let lights = LightConstants::from_environment(frame.lighting, &frame.shadow_matrices);
        let target = self.provisioner.create_lighting_target(&mut self.device)?;
        let depth = self.gbuffer.depth_mut()?;

        passes::render_transparency_pass(
            ctx,
            target,
            depth,
            states,
            frame.camera,
            &frame.partition.transparent,
            &lights,
            &self.global_technique,
        )
    }

    fn post_process_pass(&mut self, ctx: &mut dyn CommandContext, frame: &mut FrameState<'_>) -> RenderResult<u32> {
        self.provisioner.create_lighting_target(&mut self.device)?;
        self.provisioner.create_post_process_target(&mut self.device)?;
        let sampler = self.provisioner.create_linear_sampler(&mut self.device)?;

        let targets = self.provisioner.targets_mut();
        let source = targets.lighting.ok_or(RenderError::NotInitialized("lighting target"))?;
        let target = targets.post_process.ok_or(RenderError::NotInitialized("post-process target"))?;
        let depth = self.gbuffer.depth_mut()?;

        let draws = passes::render_post_process_pass(ctx, source, depth, target, sampler, &frame.frame_constants)?;
        frame.final_color = FinalColor::PostProcess;
        Ok(draws)
    }

    fn debug_pass(&mut self, ctx: &mut dyn CommandContext, frame: &mut FrameState<'_>) -> RenderResult<u32> {
        if frame.debug_vertices.is_empty() {
            return Ok(0);
        }

        let count = u32::try_from(frame.debug_vertices.len()).unwrap_or(u32::MAX);
        let buffer = self.provisioner.create_debug_line_buffer(&mut self.device, count)?;
        if frame.final_color == FinalColor::Lighting {
            self.provisioner.create_lighting_target(&mut self.device)?;
        }
        let target = final_color_target(self.provisioner.targets_mut(), frame.final_color)?;
        let depth = self.gbuffer.depth_mut()?;

        passes::render_debug_pass(ctx, target, depth, buffer, &frame.debug_vertices, frame.camera)
    }

    fn composite_pass(&mut self, ctx: &mut dyn CommandContext, frame: &mut FrameState<'_>) -> RenderResult<u32> {
        let sampler = self.provisioner.create_linear_sampler(&mut self.device)?;
        if frame.final_color == FinalColor::Lighting {
            self.provisioner.create_lighting_target(&mut self.device)?;
        }
        let source = final_color_target(self.provisioner.targets_mut(), frame.final_color)?;

        passes::render_composite_pass(ctx, source, sampler)
    }

    fn ui_pass(&mut self, ctx: &mut dyn CommandContext, frame: &mut FrameState<'_>) -> RenderResult<u32> {
        if frame.partition.ui.is_empty() {
            return Ok(0);
        }

        let states = self.provisioner.create_overlay_states(&mut self.device)?;
        passes::render_ui_pass(ctx, states, frame.camera, &frame.partition.ui, &self.global_technique)
    }
}

impl<D: GraphicsDevice> Drop for RenderingSystem<D> {
    fn drop(&mut self) {
        self.release_resources();
    }
}

fn final_color_target<'t>(targets: ProvisionedTargets<'t>, which: FinalColor) -> RenderResult<&'t mut ColorSurface> {
    match which {
        FinalColor::Lighting => targets.lighting.ok_or(RenderError::NotInitialized("lighting target")),
        FinalColor::PostProcess => targets.post_process.ok_or(RenderError::NotInitialized("post-process target")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::backends::recording::{RecordingContext, RecordingDevice};
    use crate::render::primitives::Camera;

    fn system(config: PipelineConfig) -> (RecordingDevice, RecordingContext, RenderingSystem<RecordingDevice>) {
        let mut device = RecordingDevice::new();
        let ctx = device.create_context(640, 480).unwrap();
        let mut system = RenderingSystem::new(device.clone(), config).unwrap();
        system.initialize(640, 480).unwrap();
        (device, ctx, system)
    }

    #[test]
    fn test_passes_run_in_fixed_order() {
        let (_device, mut ctx, mut system) = system(PipelineConfig::new().with_debug_pass(true));
        let camera = Camera::default().context(640, 480);
        let lighting = LightingEnvironment::new();

        let stats = system.render_frame(&mut ctx, &FrameInput::new(&camera, 0.016, &[], &lighting)).unwrap();
        assert_eq!(stats.passes_executed, FRAME_PASSES.to_vec());
        assert!(stats.passes_skipped.is_empty());
        assert_eq!(system.pass_state().current_pass(), RenderPass::None);
        assert_eq!(system.frame_count(), 1);
    }

    #[test]
    fn test_disabled_passes_are_reported() {
        let config = PipelineConfig::new().with_debug_pass(false);
        let (_device, mut ctx, mut system) = system(config);
        let camera = Camera::default().context(640, 480);
        let lighting = LightingEnvironment::new();

        let stats = system.render_frame(&mut ctx, &FrameInput::new(&camera, 0.016, &[], &lighting)).unwrap();
        assert_eq!(stats.skip_reason(RenderPass::Debug), Some(SkipReason::Disabled));
        assert_eq!(stats.passes_executed.len(), 8);
    }

    #[test]
    fn test_missing_camera_runs_no_pass() {
        let (device, mut ctx, mut system) = system(PipelineConfig::new());
        let lighting = LightingEnvironment::new();

        let result = system.render_frame(&mut ctx, &FrameInput::without_camera(0.016, &[], &lighting));
        assert!(matches!(result, Err(RenderError::MissingCamera)));
        assert!(device.commands().is_empty());
        assert_eq!(system.frame_count(), 0);
    }

    #[test]
    fn test_render_before_initialize_fails() {
        let mut device = RecordingDevice::new();
        let mut ctx = device.create_context(64, 64).unwrap();
        let mut system = RenderingSystem::new(device, PipelineConfig::new()).unwrap();
        let camera = Camera::default().context(64, 64);
        let lighting = LightingEnvironment::new();

        let result = system.render_frame(&mut ctx, &FrameInput::new(&camera, 0.0, &[], &lighting));
        assert!(matches!(result, Err(RenderError::NotInitialized(_))));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = PipelineConfig::new().with_shadow_map_resolution(1000);
        assert!(matches!(
            RenderingSystem::new(RecordingDevice::new(), config),
            Err(RenderError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_global_technique_by_name() {
        let (_device, _ctx, mut system) = system(PipelineConfig::new());
        assert_eq!(system.global_technique().name(), "Deferred");

        system.set_global_technique_name("Toon");
        assert_eq!(system.global_technique().name(), "Toon");

        system.set_global_technique(Technique::new("Flat", crate::render::technique::ShadingModel::Unlit));
        assert_eq!(system.global_technique().name(), "Flat");
    }

    #[test]
    fn test_debug_queue_drains_each_frame() {
        let (_device, mut ctx, mut system) = system(PipelineConfig::new().with_debug_pass(true));
        let camera = Camera::default().context(640, 480);
        let lighting = LightingEnvironment::new();

        system.draw_debug_box(Vec3::zeros(), Vec3::new(1.0, 1.0, 1.0), [1.0; 4]);
        assert_eq!(system.queued_debug_lines(), 12);

        let stats = system.render_frame(&mut ctx, &FrameInput::new(&camera, 0.016, &[], &lighting)).unwrap();
        assert!(stats.executed(RenderPass::Debug));
        assert_eq!(system.queued_debug_lines(), 0);
        assert!(system.provisioner().debug_line_buffer().is_some());
    }

    #[test]
    fn test_elapsed_time_accumulates() {
        let (_device, mut ctx, mut system) = system(PipelineConfig::new());
        let camera = Camera::default().context(640, 480);
        let lighting = LightingEnvironment::new();

        for _ in 0..4 {
            system.render_frame(&mut ctx, &FrameInput::new(&camera, 0.25, &[], &lighting)).unwrap();
        }
        assert!((system.elapsed_time() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_drop_releases_everything() {
        let (device, mut ctx, mut system) = system(PipelineConfig::new());
        let camera = Camera::default().context(640, 480);
        let lighting = LightingEnvironment::outdoor_daylight();
        system.render_frame(&mut ctx, &FrameInput::new(&camera, 0.016, &[], &lighting)).unwrap();

        drop(system);
        // Only the back buffer and its view remain
        assert_eq!(device.live_resource_count(), 2);
    }
}
