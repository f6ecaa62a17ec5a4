//! # Resource Provisioner
//!
//! Owns every GPU object the passes create on first use: the lighting and
//! post-process targets, the shadow map array, immutable pipeline states and
//! the debug line buffer.
//!
//! ## Get-or-create
//!
//! Each `create_*` method returns the cached object when it exists and
//! creates it otherwise, so passes may call them every frame. Failures leave
//! the cache as it was and surface as [`RenderError::ResourceCreationFailed`].
//!
//! Viewport-sized targets are dropped on resize and recreated lazily. The
//! shadow map array only ever grows; the states never change once created.

use crate::core::PipelineConfig;
use crate::render::api::{
    AddressMode, BlendDesc, BlendStateHandle, BufferDesc, BufferHandle, BufferUsage,
    CompareFunction, CullMode, DepthStencilDesc, DepthStencilStateHandle, DepthStencilView,
    FilterMode, GraphicsDevice, RasterizerDesc, RasterizerStateHandle, SamplerDesc,
    SamplerStateHandle, ShaderResourceView, TextureDesc, TextureFormat, TextureHandle,
    TextureUsage,
};
use crate::render::constants::DebugVertex;
use crate::render::debug_lines::grown_capacity;
use crate::render::surface::{BindingState, ColorSurface};
use crate::render::{RenderError, RenderResult};

/// Label of the lighting target
pub const LIGHTING_TARGET_LABEL: &str = "lighting_target";
/// Label of the post-process target
pub const POST_PROCESS_TARGET_LABEL: &str = "post_process_target";
/// Label of the shadow map array texture
pub const SHADOW_MAP_ARRAY_LABEL: &str = "shadow_map_array";
/// Label of the debug line vertex buffer
pub const DEBUG_LINE_BUFFER_LABEL: &str = "debug_line_buffer";

/// Depth texture array with one slice per shadow-casting light
#[derive(Debug)]
pub struct ShadowMapArray {
    texture: TextureHandle,
    slices: Vec<DepthStencilView>,
    read: ShaderResourceView,
    resolution: u32,
    state: BindingState,
}

impl ShadowMapArray {
    /// Create an array of `count` slices of `resolution` x `resolution` texels
    ///
    /// Anything created before a failure is released again.
    pub fn create(device: &mut dyn GraphicsDevice, count: u32, resolution: u32) -> RenderResult<Self> {
        let desc = TextureDesc {
            label: SHADOW_MAP_ARRAY_LABEL,
            width: resolution,
            height: resolution,
            array_layers: count,
            format: TextureFormat::Depth32Float,
            usage: TextureUsage::DEPTH_STENCIL | TextureUsage::SHADER_RESOURCE,
        };
        let texture = device.create_texture(&desc)?;

        let mut slices = Vec::with_capacity(count as usize);
        for slice in 0..count {
            match device.create_depth_stencil_view(texture, Some(slice)) {
                Ok(view) => slices.push(view),
                Err(e) => {
                    release_views(device, &slices);
                    device.release(texture.id());
                    return Err(e.into());
                }
            }
        }

        let read = match device.create_shader_resource_view(texture) {
            Ok(view) => view,
            Err(e) => {
                release_views(device, &slices);
                device.release(texture.id());
                return Err(e.into());
            }
        };

        log::info!("Created shadow map array: {} slices at {}x{}", count, resolution, resolution);
        Ok(Self {
            texture,
            slices,
            read,
            resolution,
            state: BindingState::Unbound,
        })
    }

    /// Number of slices
    #[allow(clippy::cast_possible_truncation)]
    pub fn capacity(&self) -> u32 {
        self.slices.len() as u32
    }

    /// Slice width and height in texels
    pub fn resolution(&self) -> u32 {
        self.resolution
    }

    /// Backing texture
    pub fn texture(&self) -> TextureHandle {
        self.texture
    }

    /// Current binding
    pub fn binding_state(&self) -> BindingState {
        self.state
    }

    /// Write-binding of one slice, marking the array bound for writing
    pub fn bind_slice(&mut self, slice: u32) -> RenderResult<DepthStencilView> {
        self.check(BindingState::Write)?;
        let view = self.slices.get(slice as usize).copied().ok_or(RenderError::NotInitialized("shadow map slice"))?;
        self.state = BindingState::Write;
        Ok(view)
    }

    /// Read-binding of every slice, marking the array bound for reading
    pub fn bind_read(&mut self) -> RenderResult<ShaderResourceView> {
        self.check(BindingState::Read)?;
        self.state = BindingState::Read;
        Ok(self.read)
    }

    /// Mark the array unbound
    pub fn mark_unbound(&mut self) {
        self.state = BindingState::Unbound;
    }

    /// Release the views and texture
    pub fn release(self, device: &mut dyn GraphicsDevice) {
        release_views(device, &self.slices);
        device.release(self.read.id());
        device.release(self.texture.id());
        log::debug!("Released shadow map array ({} slices)", self.slices.len());
    }

    fn check(&self, requested: BindingState) -> RenderResult<()> {
        let conflicting = match requested {
            BindingState::Write => BindingState::Read,
            BindingState::Read => BindingState::Write,
            BindingState::Unbound => return Ok(()),
        };
        if self.state == conflicting {
            return Err(RenderError::BindingHazard {
                surface: SHADOW_MAP_ARRAY_LABEL,
                requested,
                current: self.state,
            });
        }
        Ok(())
    }
}

fn release_views(device: &mut dyn GraphicsDevice, views: &[DepthStencilView]) {
    for view in views {
        device.release(view.id());
    }
}

/// Blend and depth states for forward-shaded transparency
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransparencyStates {
    /// Source-alpha blending
    pub blend: BlendStateHandle,
    /// Depth test on, depth write off
    pub depth: DepthStencilStateHandle,
}

/// States for the background pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkyboxStates {
    /// Less-or-equal test against scene depth, depth write off
    pub depth: DepthStencilStateHandle,
    /// No culling, the camera sits inside the cube
    pub rasterizer: RasterizerStateHandle,
}

/// States for screen-space overlays
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlayStates {
    /// Source-alpha blending
    pub blend: BlendStateHandle,
    /// Depth test and write off
    pub depth: DepthStencilStateHandle,
}

/// States for rendering and sampling shadow maps
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShadowStates {
    /// Depth-biased rasterizer for the shadow pass
    pub rasterizer: RasterizerStateHandle,
    /// Comparison sampler for the lighting pass
    pub sampler: SamplerStateHandle,
}

/// Dynamic vertex buffer for debug lines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebugLineBuffer {
    /// Buffer handle
    pub buffer: BufferHandle,
    /// Capacity in vertices
    pub capacity: u32,
}

/// Disjoint mutable borrows of the provisioned targets
#[derive(Debug)]
pub struct ProvisionedTargets<'a> {
    /// Lighting target, if created
    pub lighting: Option<&'a mut ColorSurface>,
    /// Post-process target, if created
    pub post_process: Option<&'a mut ColorSurface>,
    /// Shadow map array, if created
    pub shadow_maps: Option<&'a mut ShadowMapArray>,
}

/// Get-or-create cache of lazily built GPU objects
#[derive(Debug)]
pub struct ResourceProvisioner {
    viewport: (u32, u32),
    shadow_resolution: u32,
    shadow_depth_bias: i32,
    initial_debug_line_capacity: u32,

    lighting_target: Option<ColorSurface>,
    post_process_target: Option<ColorSurface>,
    shadow_maps: Option<ShadowMapArray>,
    transparency_states: Option<TransparencyStates>,
    skybox_states: Option<SkyboxStates>,
    overlay_states: Option<OverlayStates>,
    shadow_states: Option<ShadowStates>,
    linear_sampler: Option<SamplerStateHandle>,
    debug_lines: Option<DebugLineBuffer>,
}

impl ResourceProvisioner {
    /// Create an empty provisioner
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            viewport: (0, 0),
            shadow_resolution: config.shadow_map_resolution,
            shadow_depth_bias: config.shadow_depth_bias,
            initial_debug_line_capacity: config.initial_debug_line_capacity,
            lighting_target: None,
            post_process_target: None,
            shadow_maps: None,
            transparency_states: None,
            skybox_states: None,
            overlay_states: None,
            shadow_states: None,
            linear_sampler: None,
            debug_lines: None,
        }
    }

    /// Viewport that targets are sized to
    pub fn viewport(&self) -> (u32, u32) {
        self.viewport
    }

    /// Change the viewport, dropping the targets sized to the old one
    pub fn on_resize(&mut self, device: &mut dyn GraphicsDevice, width: u32, height: u32) {
        if self.viewport == (width, height) {
            return;
        }
        self.viewport = (width, height);

        if let Some(target) = self.lighting_target.take() {
            target.release(device);
        }
        if let Some(target) = self.post_process_target.take() {
            target.release(device);
        }
        log::debug!("Provisioner viewport set to {}x{}", width, height);
    }

    /// Lighting target sized to the viewport
    pub fn create_lighting_target(&mut self, device: &mut dyn GraphicsDevice) -> RenderResult<&mut ColorSurface> {
        let target = match self.lighting_target.take() {
            Some(existing) => existing,
            None => {
                let (width, height) = self.viewport;
                let created = ColorSurface::create(device, LIGHTING_TARGET_LABEL, width, height, TextureFormat::Rgba16Float)?;
                log::info!("Created lighting target {}x{}", width, height);
                created
            }
        };
        Ok(self.lighting_target.insert(target))
    }

    /// Post-process target sized to the viewport
    pub fn create_post_process_target(&mut self, device: &mut dyn GraphicsDevice) -> RenderResult<&mut ColorSurface> {
        let target = match self.post_process_target.take() {
            Some(existing) => existing,
            None => {
                let (width, height) = self.viewport;
                let created = ColorSurface::create(device, POST_PROCESS_TARGET_LABEL, width, height, TextureFormat::Rgba8Unorm)?;
                log::info!("Created post-process target {}x{}", width, height);
                created
            }
        };
        Ok(self.post_process_target.insert(target))
    }

    /// Shadow map array with at least `count` slices
    ///
    /// A smaller or equal request reuses the existing array. A larger one
    /// creates a new array and releases the old one; if creation fails the
    /// old array is kept.
    pub fn create_shadow_map_array(&mut self, device: &mut dyn GraphicsDevice, count: u32) -> RenderResult<&mut ShadowMapArray> {
        match self.shadow_maps.take() {
            Some(existing) if existing.capacity() >= count => Ok(self.shadow_maps.insert(existing)),
            previous => {
                let created = match ShadowMapArray::create(device, count, self.shadow_resolution) {
                    Ok(array) => array,
                    Err(e) => {
                        self.shadow_maps = previous;
                        return Err(e);
                    }
                };
                if let Some(old) = previous {
                    log::info!("Growing shadow map array from {} to {} slices", old.capacity(), count);
                    old.release(device);
                }
                Ok(self.shadow_maps.insert(created))
            }
        }
    }

    /// Alpha blend state plus depth-test-on / depth-write-off state
    pub fn create_transparency_states(&mut self, device: &mut dyn GraphicsDevice) -> RenderResult<TransparencyStates> {
        if let Some(states) = self.transparency_states {
            return Ok(states);
        }

        let blend = device.create_blend_state(&BlendDesc::alpha_blending("transparency_blend"))?;
        let depth = device.create_depth_stencil_state(&DepthStencilDesc {
            label: "transparency_depth",
            depth_test: true,
            depth_write: false,
            compare: CompareFunction::Less,
        });
        let depth = match depth {
            Ok(depth) => depth,
            Err(e) => {
                device.release(blend.id());
                return Err(e.into());
            }
        };

        log::info!("Created transparency states");
        Ok(*self.transparency_states.insert(TransparencyStates { blend, depth }))
    }

    /// Depth and rasterizer states for the skybox
    pub fn create_skybox_states(&mut self, device: &mut dyn GraphicsDevice) -> RenderResult<SkyboxStates> {
        if let Some(states) = self.skybox_states {
            return Ok(states);
        }

        let depth = device.create_depth_stencil_state(&DepthStencilDesc {
            label: "skybox_depth",
            depth_test: true,
            depth_write: false,
            compare: CompareFunction::LessEqual,
        })?;
        let rasterizer = device.create_rasterizer_state(&RasterizerDesc {
            label: "skybox_rasterizer",
            cull_mode: CullMode::None,
            depth_bias: 0,
        });
        let rasterizer = match rasterizer {
            Ok(rasterizer) => rasterizer,
            Err(e) => {
                device.release(depth.id());
                return Err(e.into());
            }
        };

        log::info!("Created skybox states");
        Ok(*self.skybox_states.insert(SkyboxStates { depth, rasterizer }))
    }

    /// Blend and depth states for the UI overlay
    pub fn create_overlay_states(&mut self, device: &mut dyn GraphicsDevice) -> RenderResult<OverlayStates> {
        if let Some(states) = self.overlay_states {
            return Ok(states);
        }

        let blend = device.create_blend_state(&BlendDesc::alpha_blending("overlay_blend"))?;
        let depth = device.create_depth_stencil_state(&DepthStencilDesc {
            label: "overlay_depth",
            depth_test: false,
            depth_write: false,
            compare: CompareFunction::Always,
        });
        let depth = match depth {
            Ok(depth) => depth,
            Err(e) => {
                device.release(blend.id());
                return Err(e.into());
            }
        };

        log::info!("Created overlay states");
        Ok(*self.overlay_states.insert(OverlayStates { blend, depth }))
    }

    /// Depth-biased rasterizer and comparison sampler for shadows
    pub fn create_shadow_states(&mut self, device: &mut dyn GraphicsDevice) -> RenderResult<ShadowStates> {
        if let Some(states) = self.shadow_states {
            return Ok(states);
        }

        let rasterizer = device.create_rasterizer_state(&RasterizerDesc {
            label: "shadow_rasterizer",
            cull_mode: CullMode::Back,
            depth_bias: self.shadow_depth_bias,
        })?;
        let sampler = device.create_sampler_state(&SamplerDesc {
            label: "shadow_sampler",
            filter: FilterMode::Linear,
            address: AddressMode::Clamp,
            compare: Some(CompareFunction::LessEqual),
        });
        let sampler = match sampler {
            Ok(sampler) => sampler,
            Err(e) => {
                device.release(rasterizer.id());
                return Err(e.into());
            }
        };

        log::info!("Created shadow states (depth bias {})", self.shadow_depth_bias);
        Ok(*self.shadow_states.insert(ShadowStates { rasterizer, sampler }))
    }

    /// Linear clamp sampler used by full-screen passes
    pub fn create_linear_sampler(&mut self, device: &mut dyn GraphicsDevice) -> RenderResult<SamplerStateHandle> {
        if let Some(sampler) = self.linear_sampler {
            return Ok(sampler);
        }

        let sampler = device.create_sampler_state(&SamplerDesc {
            label: "linear_clamp_sampler",
            filter: FilterMode::Linear,
            address: AddressMode::Clamp,
            compare: None,
        })?;
        Ok(*self.linear_sampler.insert(sampler))
    }

    /// Debug line buffer holding at least `vertex_count` vertices
    ///
    /// Capacity starts at the configured initial capacity and doubles until
    /// the request fits. The buffer never shrinks.
    pub fn create_debug_line_buffer(&mut self, device: &mut dyn GraphicsDevice, vertex_count: u32) -> RenderResult<DebugLineBuffer> {
        let current = match self.debug_lines {
            Some(lines) if lines.capacity >= vertex_count => return Ok(lines),
            Some(lines) => lines.capacity,
            None => 0,
        };

        let capacity = grown_capacity(current, self.initial_debug_line_capacity, vertex_count);
        let buffer = device.create_buffer(&BufferDesc {
            label: DEBUG_LINE_BUFFER_LABEL,
            size: u64::from(capacity) * std::mem::size_of::<DebugVertex>() as u64,
            usage: BufferUsage::DynamicVertex,
        })?;

        if let Some(old) = self.debug_lines.take() {
            device.release(old.buffer.id());
        }
        log::info!("Debug line buffer capacity: {} vertices", capacity);
        Ok(*self.debug_lines.insert(DebugLineBuffer { buffer, capacity }))
    }

    /// Disjoint access to the lighting target, post-process target and shadow maps
    pub fn targets_mut(&mut self) -> ProvisionedTargets<'_> {
        ProvisionedTargets {
            lighting: self.lighting_target.as_mut(),
            post_process: self.post_process_target.as_mut(),
            shadow_maps: self.shadow_maps.as_mut(),
        }
    }

    /// Lighting target, if created
    pub fn lighting_target(&self) -> Option<&ColorSurface> {
        self.lighting_target.as_ref()
    }

    /// Post-process target, if created
    pub fn post_process_target(&self) -> Option<&ColorSurface> {
        self.post_process_target.as_ref()
    }

    /// Shadow map array, if created
    pub fn shadow_maps(&self) -> Option<&ShadowMapArray> {
        self.shadow_maps.as_ref()
    }

    /// Transparency states, if created
    pub fn transparency_states(&self) -> Option<TransparencyStates> {
        self.transparency_states
    }

    /// Debug line buffer, if created
    pub fn debug_line_buffer(&self) -> Option<DebugLineBuffer> {
        self.debug_lines
    }

    /// Release everything
    pub fn release_all(&mut self, device: &mut dyn GraphicsDevice) {
        if let Some(target) = self.lighting_target.take() {
            target.release(device);
        }
        if let Some(target) = self.post_process_target.take() {
            target.release(device);
        }
        if let Some(array) = self.shadow_maps.take() {
            array.release(device);
        }
        if let Some(states) = self.transparency_states.take() {
            device.release(states.blend.id());
            device.release(states.depth.id());
        }
        if let Some(states) = self.skybox_states.take() {
            device.release(states.depth.id());
            device.release(states.rasterizer.id());
        }
        if let Some(states) = self.overlay_states.take() {
            device.release(states.blend.id());
            device.release(states.depth.id());
        }
        if let Some(states) = self.shadow_states.take() {
            device.release(states.rasterizer.id());
            device.release(states.sampler.id());
        }
        if let Some(sampler) = self.linear_sampler.take() {
            device.release(sampler.id());
        }
        if let Some(lines) = self.debug_lines.take() {
            device.release(lines.buffer.id());
        }
        log::debug!("Provisioner released all resources");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::backends::recording::RecordingDevice;

    fn provisioner(device: &mut RecordingDevice) -> ResourceProvisioner {
        let config = PipelineConfig::new().with_shadow_map_resolution(512);
        let mut provisioner = ResourceProvisioner::new(&config);
        provisioner.on_resize(device, 1280, 720);
        provisioner
    }

    #[test]
    fn test_shadow_array_same_or_smaller_count_reuses() {
        let mut device = RecordingDevice::new();
        let mut provisioner = provisioner(&mut device);

        provisioner.create_shadow_map_array(&mut device, 2).unwrap();
        provisioner.create_shadow_map_array(&mut device, 2).unwrap();
        provisioner.create_shadow_map_array(&mut device, 1).unwrap();

        assert_eq!(device.allocation_count(SHADOW_MAP_ARRAY_LABEL), 1);
        assert_eq!(provisioner.shadow_maps().map(ShadowMapArray::capacity), Some(2));
    }

    #[test]
    fn test_shadow_array_grows_once() {
        let mut device = RecordingDevice::new();
        let mut provisioner = provisioner(&mut device);

        provisioner.create_shadow_map_array(&mut device, 1).unwrap();
        provisioner.create_shadow_map_array(&mut device, 3).unwrap();
        provisioner.create_shadow_map_array(&mut device, 3).unwrap();

        assert_eq!(device.allocation_count(SHADOW_MAP_ARRAY_LABEL), 2);
        let live = device.live_textures(SHADOW_MAP_ARRAY_LABEL);
        assert_eq!(live.len(), 1);
        assert_eq!(live[0].array_layers, 3);
        assert_eq!(live[0].width, 512);
    }

    #[test]
    fn test_failed_growth_keeps_existing_array() {
        let mut device = RecordingDevice::new();
        let mut provisioner = provisioner(&mut device);
        provisioner.create_shadow_map_array(&mut device, 1).unwrap();

        device.fail_allocations(SHADOW_MAP_ARRAY_LABEL);
        assert!(provisioner.create_shadow_map_array(&mut device, 4).is_err());
        assert_eq!(provisioner.shadow_maps().map(ShadowMapArray::capacity), Some(1));
    }

    #[test]
    fn test_shadow_array_binding_guard() {
        let mut device = RecordingDevice::new();
        let mut provisioner = provisioner(&mut device);
        let array = provisioner.create_shadow_map_array(&mut device, 2).unwrap();

        array.bind_slice(1).unwrap();
        assert!(matches!(array.bind_read(), Err(RenderError::BindingHazard { .. })));
        array.mark_unbound();
        array.bind_read().unwrap();
        assert!(array.bind_slice(0).is_err());
    }

    #[test]
    fn test_lighting_target_created_once_and_dropped_on_resize() {
        let mut device = RecordingDevice::new();
        let mut provisioner = provisioner(&mut device);

        provisioner.create_lighting_target(&mut device).unwrap();
        provisioner.create_lighting_target(&mut device).unwrap();
        assert_eq!(device.allocation_count(LIGHTING_TARGET_LABEL), 1);

        provisioner.on_resize(&mut device, 640, 360);
        assert!(provisioner.lighting_target().is_none());
        assert!(device.live_textures(LIGHTING_TARGET_LABEL).is_empty());

        let target = provisioner.create_lighting_target(&mut device).unwrap();
        assert_eq!(target.size(), (640, 360));
        assert_eq!(device.allocation_count(LIGHTING_TARGET_LABEL), 2);
    }

    #[test]
    fn test_resize_keeps_shadow_maps_and_states() {
        let mut device = RecordingDevice::new();
        let mut provisioner = provisioner(&mut device);
        provisioner.create_shadow_map_array(&mut device, 1).unwrap();
        let states = provisioner.create_transparency_states(&mut device).unwrap();

        provisioner.on_resize(&mut device, 100, 100);
        assert!(provisioner.shadow_maps().is_some());
        assert_eq!(provisioner.transparency_states(), Some(states));
    }

    #[test]
    fn test_transparency_states_cached() {
        let mut device = RecordingDevice::new();
        let mut provisioner = provisioner(&mut device);

        let first = provisioner.create_transparency_states(&mut device).unwrap();
        let second = provisioner.create_transparency_states(&mut device).unwrap();
        assert_eq!(first, second);
        assert_eq!(device.allocation_count("transparency_blend"), 1);
        assert_eq!(device.allocation_count("transparency_depth"), 1);
    }

    #[test]
    fn test_partial_state_failure_releases_blend() {
        let mut device = RecordingDevice::new();
        let mut provisioner = provisioner(&mut device);
        device.fail_allocations("transparency_depth");

        assert!(provisioner.create_transparency_states(&mut device).is_err());
        assert_eq!(device.live_resource_count(), 0);
        assert!(provisioner.transparency_states().is_none());
    }

    #[test]
    fn test_debug_buffer_doubles_and_never_shrinks() {
        let mut device = RecordingDevice::new();
        let mut provisioner = provisioner(&mut device);

        let first = provisioner.create_debug_line_buffer(&mut device, 10).unwrap();
        assert_eq!(first.capacity, 1024);

        let grown = provisioner.create_debug_line_buffer(&mut device, 3000).unwrap();
        assert_eq!(grown.capacity, 4096);

        let same = provisioner.create_debug_line_buffer(&mut device, 20).unwrap();
        assert_eq!(same, grown);
        assert_eq!(device.allocation_count(DEBUG_LINE_BUFFER_LABEL), 2);
        assert_eq!(device.live_resource_count(), 1);
    }

    #[test]
    fn test_release_all() {
        let mut device = RecordingDevice::new();
        let mut provisioner = provisioner(&mut device);
        provisioner.create_lighting_target(&mut device).unwrap();
        provisioner.create_post_process_target(&mut device).unwrap();
        provisioner.create_shadow_map_array(&mut device, 2).unwrap();
        provisioner.create_transparency_states(&mut device).unwrap();
        provisioner.create_skybox_states(&mut device).unwrap();
        provisioner.create_overlay_states(&mut device).unwrap();
        provisioner.create_shadow_states(&mut device).unwrap();
        provisioner.create_linear_sampler(&mut device).unwrap();
        provisioner.create_debug_line_buffer(&mut device, 1).unwrap();
        assert!(device.live_resource_count() > 0);

        provisioner.release_all(&mut device);
        assert_eq!(device.live_resource_count(), 0);
    }

    #[test]
    fn test_targets_mut_gives_disjoint_access() {
        let mut device = RecordingDevice::new();
        let mut provisioner = provisioner(&mut device);
        provisioner.create_lighting_target(&mut device).unwrap();
        provisioner.create_shadow_map_array(&mut device, 1).unwrap();

        let targets = provisioner.targets_mut();
        let lighting = targets.lighting.unwrap();
        let shadows = targets.shadow_maps.unwrap();
        lighting.bind_write().unwrap();
        shadows.bind_read().unwrap();
        assert!(targets.post_process.is_none());
    }
}
