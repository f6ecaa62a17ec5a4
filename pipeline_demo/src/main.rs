//! Pipeline demo application
//!
//! Drives a small scene through the deferred pipeline on the headless
//! recording backend and logs what each frame did. A sun is switched on
//! partway through and the viewport is resized once.
//!
//! Usage: `pipeline_demo [config.toml|config.ron]`

use deferred_renderer::config::{Config, ConfigError};
use deferred_renderer::core::PipelineConfig;
use deferred_renderer::foundation::logging;
use deferred_renderer::foundation::math::{Mat4, Vec3};
use deferred_renderer::render::api::{DeviceError, MeshHandle};
use deferred_renderer::render::backends::{RecordingContext, RecordingDevice};
use deferred_renderer::render::provisioner::SHADOW_MAP_ARRAY_LABEL;
use deferred_renderer::render::{
    Camera, EntityId, FrameInput, Light, LightingEnvironment, RenderError, RenderableComponent,
    RenderingSystem,
};

const FRAME_COUNT: u32 = 8;
const SUNRISE_FRAME: u32 = 3;
const RESIZE_FRAME: u32 = 5;
const FRAME_TIME: f32 = 1.0 / 60.0;

#[derive(Debug, thiserror::Error)]
enum DemoError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    #[error("Device error: {0}")]
    Device(#[from] DeviceError),
}

struct PipelineDemo {
    device: RecordingDevice,
    ctx: RecordingContext,
    renderer: RenderingSystem<RecordingDevice>,
    camera: Camera,
    viewport: (u32, u32),
    scene: Vec<RenderableComponent>,
    lighting: LightingEnvironment,
    orbit_angle: f32,
}

impl PipelineDemo {
    fn new(config: PipelineConfig) -> Result<Self, DemoError> {
        let viewport = (1920, 1080);
        let mut device = RecordingDevice::new();
        let ctx = device.create_context(viewport.0, viewport.1)?;

        let mut renderer = RenderingSystem::new(device.clone(), config)?;
        renderer.initialize(viewport.0, viewport.1)?;

        let mut camera = Camera::perspective(Vec3::new(0.0, 6.0, -14.0), 60.0, aspect(viewport), 0.1, 200.0);
        camera.look_at(Vec3::zeros(), Vec3::y());

        Ok(Self {
            device,
            ctx,
            renderer,
            camera,
            viewport,
            scene: build_scene(),
            lighting: LightingEnvironment::new().with_ambient(Vec3::new(0.2, 0.2, 0.25), 0.3),
            orbit_angle: 0.0,
        })
    }

    fn run(&mut self) -> Result<(), DemoError> {
        for frame in 0..FRAME_COUNT {
            if frame == SUNRISE_FRAME {
                log::info!("Switching on the sun");
                let sun = Light::directional(Vec3::new(-0.4, -1.0, 0.3), Vec3::new(1.0, 0.95, 0.85), 1.2).with_shadows(true);
                self.lighting = self.lighting.clone().add_light(sun);
            }
            if frame == RESIZE_FRAME {
                self.resize(1280, 720)?;
            }

            self.update_camera();
            self.renderer.draw_debug_box(Vec3::new(-4.0, -0.5, -4.0), Vec3::new(4.0, 0.5, 4.0), [0.2, 1.0, 0.2, 1.0]);

            let camera = self.camera.context(self.viewport.0, self.viewport.1);
            let input = FrameInput::new(&camera, FRAME_TIME, &self.scene, &self.lighting);
            let stats = self.renderer.render_frame(&mut self.ctx, &input)?;

            log::info!(
                "Frame {}: {} passes, {} skipped, {} draws ({} opaque, {} transparent, {} ui, {} shadow casters)",
                frame,
                stats.passes_executed.len(),
                stats.passes_skipped.len(),
                stats.draw_calls,
                stats.opaque_count,
                stats.transparent_count,
                stats.ui_count,
                stats.shadow_casters
            );
        }

        let hazards = self.device.hazards();
        log::info!(
            "Rendered {} frames; shadow map allocations: {}; hazards: {}",
            self.renderer.frame_count(),
            self.device.allocation_count(SHADOW_MAP_ARRAY_LABEL),
            hazards.len()
        );
        for hazard in hazards {
            log::warn!("{}", hazard);
        }
        Ok(())
    }

    fn resize(&mut self, width: u32, height: u32) -> Result<(), DemoError> {
        log::info!("Resizing viewport to {}x{}", width, height);
        self.viewport = (width, height);
        self.ctx = self.device.create_context(width, height)?;
        self.renderer.resize(width, height)?;
        self.camera.set_aspect_ratio(aspect(self.viewport));
        Ok(())
    }

    fn update_camera(&mut self) {
        self.orbit_angle += 0.15;
        let position = Vec3::new(14.0 * self.orbit_angle.sin(), 6.0, -14.0 * self.orbit_angle.cos());
        self.camera.set_position(position);
        self.camera.look_at(Vec3::zeros(), Vec3::y());
    }
}

fn aspect((width, height): (u32, u32)) -> f32 {
    width as f32 / height as f32
}

fn build_scene() -> Vec<RenderableComponent> {
    let mut scene = Vec::new();
    let mut next_id = 0u64;
    let mut id = || {
        next_id += 1;
        next_id
    };

    for x in -2..2 {
        for z in -2..2 {
            let n = id();
            let position = Vec3::new(x as f32 * 2.0 + 1.0, 0.0, z as f32 * 2.0 + 1.0);
            scene.push(RenderableComponent::new(EntityId(n), MeshHandle(1), Mat4::new_translation(&position)));
        }
    }

    for (i, alpha) in [0.3, 0.5, 0.7].into_iter().enumerate() {
        let n = id();
        let position = Vec3::new(i as f32 * 2.5 - 2.5, 1.5, -3.0);
        scene.push(
            RenderableComponent::new_transparent(EntityId(n), MeshHandle(2), Mat4::new_translation(&position), alpha)
                .with_technique("Glass"),
        );
    }

    let n = id();
    let hud = Mat4::new_translation(&Vec3::new(16.0, 16.0, 0.0)) * Mat4::new_nonuniform_scaling(&Vec3::new(200.0, 40.0, 1.0));
    scene.push(RenderableComponent::new_ui(EntityId(n), MeshHandle(3), hud));

    scene
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = match std::env::args().nth(1) {
        Some(path) => PipelineConfig::load_from_file(&path)?,
        None => PipelineConfig::default(),
    };
    logging::init_with_level(&config.log_level);
    log::info!("Starting pipeline demo...");

    let mut demo = PipelineDemo::new(config)?;
    demo.run()?;

    log::info!("Pipeline demo finished");
    Ok(())
}
