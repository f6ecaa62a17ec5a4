//! Headless recording backend
//!
//! [`RecordingDevice`] and [`RecordingContext`] implement the device and
//! command-context traits without a GPU. Every created object is tracked in a
//! slot map, every command is appended to a log, and surface contents are
//! simulated well enough to tell a cleared surface from a rendered one.
//!
//! The backend also watches for read-after-write hazards (a texture bound as
//! a target and as a shader resource at the same time) and can be told to
//! fail allocations, which makes it the workhorse for pipeline tests and for
//! running the pipeline without a window.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::rc::Rc;

use slotmap::{DefaultKey, Key, KeyData, SlotMap};

use crate::render::api::{
    BlendDesc, BlendStateHandle, BufferDesc, BufferHandle, CommandContext, DepthStencilDesc,
    DepthStencilStateHandle, DepthStencilView, DeviceError, DeviceResult, GraphicsDevice,
    MeshHandle, RasterizerDesc, RasterizerStateHandle, RenderTargetView, ResourceId, SamplerDesc,
    SamplerStateHandle, ShaderResourceView, TextureDesc, TextureFormat, TextureHandle,
    TextureUsage, Viewport,
};

/// Simulated contents of a texture
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SurfaceContents {
    /// Never written
    Undefined,
    /// Cleared to a color and untouched since
    Color([f32; 4]),
    /// Cleared to a depth/stencil value and untouched since
    Depth {
        /// Depth clear value
        depth: f32,
        /// Stencil clear value
        stencil: u8,
    },
    /// Written by at least one draw since the last clear
    Rendered,
}

/// One command as submitted to a [`RecordingContext`]
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCommand {
    /// `set_viewport`
    SetViewport(Viewport),
    /// `clear_render_target`
    ClearRenderTarget {
        /// Cleared view
        view: RenderTargetView,
        /// Clear color
        color: [f32; 4],
    },
    /// `clear_depth_stencil`
    ClearDepthStencil {
        /// Cleared view
        view: DepthStencilView,
        /// Depth value
        depth: f32,
        /// Stencil value
        stencil: u8,
    },
    /// `set_render_targets`
    SetRenderTargets {
        /// Color targets
        colors: Vec<RenderTargetView>,
        /// Depth target
        depth: Option<DepthStencilView>,
    },
    /// `set_shader_resources`
    SetShaderResources {
        /// First slot
        start_slot: u32,
        /// Views bound from `start_slot` on
        views: Vec<ShaderResourceView>,
    },
    /// `clear_shader_resources`
    ClearShaderResources {
        /// First slot
        start_slot: u32,
        /// Number of slots
        count: u32,
    },
    /// `set_blend_state`
    SetBlendState(Option<BlendStateHandle>),
    /// `set_depth_stencil_state`
    SetDepthStencilState(Option<DepthStencilStateHandle>),
    /// `set_rasterizer_state`
    SetRasterizerState(Option<RasterizerStateHandle>),
    /// `set_samplers`
    SetSamplers {
        /// First slot
        start_slot: u32,
        /// Bound samplers
        samplers: Vec<SamplerStateHandle>,
    },
    /// `set_technique`
    SetTechnique(String),
    /// `update_constants`
    UpdateConstants {
        /// Constant slot
        slot: u32,
        /// Uploaded byte count
        size: usize,
    },
    /// `update_buffer`
    UpdateBuffer {
        /// Target buffer
        buffer: BufferHandle,
        /// Uploaded byte count
        size: usize,
    },
    /// `draw_mesh`
    DrawMesh {
        /// Drawn mesh
        mesh: MeshHandle,
        /// Technique active at draw time
        technique: String,
    },
    /// `draw`
    Draw {
        /// Vertex count
        vertex_count: u32,
        /// Technique active at draw time
        technique: String,
    },
    /// `draw_lines`
    DrawLines {
        /// Vertex buffer
        buffer: BufferHandle,
        /// Vertex count
        vertex_count: u32,
    },
}

impl RecordedCommand {
    /// Whether this command is a draw call
    pub fn is_draw(&self) -> bool {
        matches!(self, Self::DrawMesh { .. } | Self::Draw { .. } | Self::DrawLines { .. })
    }
}

#[derive(Debug, Clone, Copy)]
enum ViewKind {
    RenderTarget,
    DepthStencil,
    ShaderResource,
}

#[derive(Debug, Clone)]
enum ResourceRecord {
    Texture { desc: TextureDesc, contents: SurfaceContents },
    View { texture: ResourceId, kind: ViewKind },
    State { label: &'static str },
    Buffer { desc: BufferDesc },
}

#[derive(Debug, Default)]
struct RecordingState {
    resources: SlotMap<DefaultKey, ResourceRecord>,
    allocations: HashMap<&'static str, usize>,
    failing_labels: HashSet<&'static str>,
    fail_views: bool,
    commands: Vec<RecordedCommand>,
    bound_targets: Vec<ResourceId>,
    bound_depth: Option<ResourceId>,
    bound_resources: BTreeMap<u32, ResourceId>,
    technique: String,
    hazards: Vec<String>,
}

fn to_id(key: DefaultKey) -> ResourceId {
    ResourceId(key.data().as_ffi())
}

fn to_key(id: ResourceId) -> DefaultKey {
    KeyData::from_ffi(id.0).into()
}

impl RecordingState {
    fn insert(&mut self, record: ResourceRecord) -> ResourceId {
        to_id(self.resources.insert(record))
    }

    fn allocate(&mut self, label: &'static str, record: ResourceRecord) -> DeviceResult<ResourceId> {
        if self.failing_labels.contains(label) {
            log::debug!("Recording device: injected allocation failure for '{}'", label);
            return Err(DeviceError::OutOfMemory { label });
        }
        *self.allocations.entry(label).or_insert(0) += 1;
        Ok(self.insert(record))
    }

    fn texture(&self, id: ResourceId) -> DeviceResult<&TextureDesc> {
        match self.resources.get(to_key(id)) {
            Some(ResourceRecord::Texture { desc, .. }) => Ok(desc),
            _ => Err(DeviceError::UnknownResource(id)),
        }
    }

    fn create_view(&mut self, texture: ResourceId, kind: ViewKind, required: TextureUsage) -> DeviceResult<ResourceId> {
        let desc = *self.texture(texture)?;
        if self.fail_views {
            return Err(DeviceError::OutOfMemory { label: desc.label });
        }
        if !desc.usage.contains(required) {
            return Err(DeviceError::InvalidDescriptor {
                label: desc.label,
                reason: format!("texture usage {:?} does not allow {:?} views", desc.usage, kind),
            });
        }
        Ok(self.insert(ResourceRecord::View { texture, kind }))
    }

    fn view_texture(&self, view: ResourceId) -> Option<ResourceId> {
        match self.resources.get(to_key(view)) {
            Some(ResourceRecord::View { texture, .. }) => Some(*texture),
            _ => None,
        }
    }

    fn set_contents(&mut self, texture: ResourceId, value: SurfaceContents) {
        if let Some(ResourceRecord::Texture { contents, .. }) = self.resources.get_mut(to_key(texture)) {
            *contents = value;
        }
    }

    fn contents(&self, texture: ResourceId) -> Option<SurfaceContents> {
        match self.resources.get(to_key(texture)) {
            Some(ResourceRecord::Texture { contents, .. }) => Some(*contents),
            _ => None,
        }
    }

    fn label_of(&self, texture: ResourceId) -> &'static str {
        self.texture(texture).map_or("<unknown>", |desc| desc.label)
    }

    fn hazard(&mut self, message: String) {
        log::warn!("Recording device hazard: {}", message);
        self.hazards.push(message);
    }

    fn mark_targets_rendered(&mut self) {
        let targets: Vec<ResourceId> = self.bound_targets.iter().copied().chain(self.bound_depth).collect();
        for texture in targets {
            self.set_contents(texture, SurfaceContents::Rendered);
        }
    }
}

/// GPU-less graphics device that records what the pipeline asks of it
#[derive(Debug, Clone, Default)]
pub struct RecordingDevice {
    state: Rc<RefCell<RecordingState>>,
}

impl RecordingDevice {
    /// Create an empty device
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a command context presenting into a `width` x `height` back buffer
    pub fn create_context(&mut self, width: u32, height: u32) -> DeviceResult<RecordingContext> {
        let desc = TextureDesc::surface(
            "back_buffer",
            width,
            height,
            TextureFormat::Rgba8Unorm,
            TextureUsage::RENDER_TARGET,
        );
        let texture = self.create_texture(&desc)?;
        let back_buffer = self.create_render_target_view(texture)?;
        Ok(RecordingContext {
            state: Rc::clone(&self.state),
            back_buffer,
        })
    }

    /// Make every allocation labelled `label` fail until [`Self::allow_allocations`]
    pub fn fail_allocations(&mut self, label: &'static str) {
        self.state.borrow_mut().failing_labels.insert(label);
    }

    /// Undo [`Self::fail_allocations`] for `label`
    pub fn allow_allocations(&mut self, label: &'static str) {
        self.state.borrow_mut().failing_labels.remove(label);
    }

    /// Make every view creation fail
    pub fn fail_views(&mut self, fail: bool) {
        self.state.borrow_mut().fail_views = fail;
    }

    /// Successful texture, buffer and state allocations made under `label`
    pub fn allocation_count(&self, label: &str) -> usize {
        self.state.borrow().allocations.get(label).copied().unwrap_or(0)
    }

    /// Objects created and not yet released
    pub fn live_resource_count(&self) -> usize {
        self.state.borrow().resources.len()
    }

    /// Descriptor of a live texture
    pub fn texture_desc(&self, texture: TextureHandle) -> Option<TextureDesc> {
        self.state.borrow().texture(texture.id()).ok().copied()
    }

    /// Descriptors of live textures labelled `label`
    pub fn live_textures(&self, label: &str) -> Vec<TextureDesc> {
        self.state
            .borrow()
            .resources
            .values()
            .filter_map(|record| match record {
                ResourceRecord::Texture { desc, .. } if desc.label == label => Some(*desc),
                _ => None,
            })
            .collect()
    }

    /// Simulated contents of a texture
    pub fn surface_contents(&self, texture: TextureHandle) -> Option<SurfaceContents> {
        self.state.borrow().contents(texture.id())
    }

    /// Contents of the texture currently bound to shader slot `slot`
    pub fn contents_at_slot(&self, slot: u32) -> Option<SurfaceContents> {
        let state = self.state.borrow();
        let texture = state.bound_resources.get(&slot).copied()?;
        state.contents(texture)
    }

    /// Read-after-write hazards observed so far
    pub fn hazards(&self) -> Vec<String> {
        self.state.borrow().hazards.clone()
    }

    /// Every command recorded so far
    pub fn commands(&self) -> Vec<RecordedCommand> {
        self.state.borrow().commands.clone()
    }

    /// Number of draw calls recorded so far
    pub fn draw_count(&self) -> usize {
        self.state.borrow().commands.iter().filter(|c| c.is_draw()).count()
    }

    /// Forget recorded commands and hazards, keeping resources
    pub fn clear_commands(&mut self) {
        let mut state = self.state.borrow_mut();
        state.commands.clear();
        state.hazards.clear();
    }
}

impl GraphicsDevice for RecordingDevice {
    fn create_texture(&mut self, desc: &TextureDesc) -> DeviceResult<TextureHandle> {
        if desc.width == 0 || desc.height == 0 || desc.array_layers == 0 {
            return Err(DeviceError::InvalidDescriptor {
                label: desc.label,
                reason: format!("empty extent {}x{}x{}", desc.width, desc.height, desc.array_layers),
            });
        }
        if desc.format.is_depth() && desc.usage.contains(TextureUsage::RENDER_TARGET) {
            return Err(DeviceError::InvalidDescriptor {
                label: desc.label,
                reason: "depth formats cannot be color targets".to_string(),
            });
        }

        let record = ResourceRecord::Texture {
            desc: *desc,
            contents: SurfaceContents::Undefined,
        };
        self.state.borrow_mut().allocate(desc.label, record).map(TextureHandle)
    }

    fn create_render_target_view(&mut self, texture: TextureHandle) -> DeviceResult<RenderTargetView> {
        self.state
            .borrow_mut()
            .create_view(texture.id(), ViewKind::RenderTarget, TextureUsage::RENDER_TARGET)
            .map(RenderTargetView)
    }

    fn create_depth_stencil_view(&mut self, texture: TextureHandle, array_slice: Option<u32>) -> DeviceResult<DepthStencilView> {
        let mut state = self.state.borrow_mut();
        if let Some(slice) = array_slice {
            let desc = *state.texture(texture.id())?;
            if slice >= desc.array_layers {
                return Err(DeviceError::InvalidDescriptor {
                    label: desc.label,
                    reason: format!("slice {} out of {} layers", slice, desc.array_layers),
                });
            }
        }
        state
            .create_view(texture.id(), ViewKind::DepthStencil, TextureUsage::DEPTH_STENCIL)
            .map(DepthStencilView)
    }

    fn create_shader_resource_view(&mut self, texture: TextureHandle) -> DeviceResult<ShaderResourceView> {
        self.state
            .borrow_mut()
            .create_view(texture.id(), ViewKind::ShaderResource, TextureUsage::SHADER_RESOURCE)
            .map(ShaderResourceView)
    }

    fn create_blend_state(&mut self, desc: &BlendDesc) -> DeviceResult<BlendStateHandle> {
        let record = ResourceRecord::State { label: desc.label };
        self.state.borrow_mut().allocate(desc.label, record).map(BlendStateHandle)
    }

    fn create_depth_stencil_state(&mut self, desc: &DepthStencilDesc) -> DeviceResult<DepthStencilStateHandle> {
        let record = ResourceRecord::State { label: desc.label };
        self.state.borrow_mut().allocate(desc.label, record).map(DepthStencilStateHandle)
    }

    fn create_sampler_state(&mut self, desc: &SamplerDesc) -> DeviceResult<SamplerStateHandle> {
        let record = ResourceRecord::State { label: desc.label };
        self.state.borrow_mut().allocate(desc.label, record).map(SamplerStateHandle)
    }

    fn create_rasterizer_state(&mut self, desc: &RasterizerDesc) -> DeviceResult<RasterizerStateHandle> {
        let record = ResourceRecord::State { label: desc.label };
        self.state.borrow_mut().allocate(desc.label, record).map(RasterizerStateHandle)
    }

    fn create_buffer(&mut self, desc: &BufferDesc) -> DeviceResult<BufferHandle> {
        if desc.size == 0 {
            return Err(DeviceError::InvalidDescriptor {
                label: desc.label,
                reason: "zero-sized buffer".to_string(),
            });
        }
        let record = ResourceRecord::Buffer { desc: *desc };
        self.state.borrow_mut().allocate(desc.label, record).map(BufferHandle)
    }

    fn release(&mut self, resource: ResourceId) {
        let mut state = self.state.borrow_mut();
        match state.resources.remove(to_key(resource)) {
            Some(ResourceRecord::State { label }) => log::trace!("Released state '{}'", label),
            Some(ResourceRecord::Buffer { desc }) => log::trace!("Released buffer '{}'", desc.label),
            Some(_) => {}
            None => log::trace!("Ignoring release of unknown resource {:?}", resource),
        }
    }
}

/// Command context recording into the state of its [`RecordingDevice`]
#[derive(Debug)]
pub struct RecordingContext {
    state: Rc<RefCell<RecordingState>>,
    back_buffer: RenderTargetView,
}

impl RecordingContext {
    fn record(&self, command: RecordedCommand) {
        self.state.borrow_mut().commands.push(command);
    }
}

impl CommandContext for RecordingContext {
    fn back_buffer(&self) -> RenderTargetView {
        self.back_buffer
    }

    fn set_viewport(&mut self, viewport: Viewport) {
        self.record(RecordedCommand::SetViewport(viewport));
    }

    fn clear_render_target(&mut self, view: RenderTargetView, color: [f32; 4]) {
        let mut state = self.state.borrow_mut();
        if let Some(texture) = state.view_texture(view.id()) {
            state.set_contents(texture, SurfaceContents::Color(color));
        }
        state.commands.push(RecordedCommand::ClearRenderTarget { view, color });
    }

    fn clear_depth_stencil(&mut self, view: DepthStencilView, depth: f32, stencil: u8) {
        let mut state = self.state.borrow_mut();
        if let Some(texture) = state.view_texture(view.id()) {
            state.set_contents(texture, SurfaceContents::Depth { depth, stencil });
        }
        state.commands.push(RecordedCommand::ClearDepthStencil { view, depth, stencil });
    }

    fn set_render_targets(&mut self, colors: &[RenderTargetView], depth: Option<DepthStencilView>) {
        let mut state = self.state.borrow_mut();
        let targets: Vec<ResourceId> = colors.iter().filter_map(|v| state.view_texture(v.id())).collect();
        let depth_texture = depth.and_then(|v| state.view_texture(v.id()));

        for texture in targets.iter().chain(depth_texture.iter()) {
            if state.bound_resources.values().any(|bound| bound == texture) {
                let message = format!("'{}' bound as target while still bound as shader input", state.label_of(*texture));
                state.hazard(message);
            }
        }

        state.bound_targets = targets;
        state.bound_depth = depth_texture;
        state.commands.push(RecordedCommand::SetRenderTargets {
            colors: colors.to_vec(),
            depth,
        });
    }

    fn set_shader_resources(&mut self, start_slot: u32, views: &[ShaderResourceView]) {
        let mut state = self.state.borrow_mut();
        for (slot, view) in (start_slot..).zip(views) {
            let Some(texture) = state.view_texture(view.id()) else {
                continue;
            };
            if state.bound_targets.contains(&texture) || state.bound_depth == Some(texture) {
                let message = format!("'{}' bound as shader input while still bound as target", state.label_of(texture));
                state.hazard(message);
            }
            state.bound_resources.insert(slot, texture);
        }
        state.commands.push(RecordedCommand::SetShaderResources {
            start_slot,
            views: views.to_vec(),
        });
    }

    fn clear_shader_resources(&mut self, start_slot: u32, count: u32) {
        let mut state = self.state.borrow_mut();
        for slot in start_slot..start_slot + count {
            state.bound_resources.remove(&slot);
        }
        state.commands.push(RecordedCommand::ClearShaderResources { start_slot, count });
    }

    fn set_blend_state(&mut self, state: Option<BlendStateHandle>) {
        self.record(RecordedCommand::SetBlendState(state));
    }

    fn set_depth_stencil_state(&mut self, state: Option<DepthStencilStateHandle>) {
        self.record(RecordedCommand::SetDepthStencilState(state));
    }

    fn set_rasterizer_state(&mut self, state: Option<RasterizerStateHandle>) {
        self.record(RecordedCommand::SetRasterizerState(state));
    }

    fn set_samplers(&mut self, start_slot: u32, samplers: &[SamplerStateHandle]) {
        self.record(RecordedCommand::SetSamplers {
            start_slot,
            samplers: samplers.to_vec(),
        });
    }

    fn set_technique(&mut self, name: &str) {
        let mut state = self.state.borrow_mut();
        state.technique = name.to_string();
        state.commands.push(RecordedCommand::SetTechnique(name.to_string()));
    }

    fn update_constants(&mut self, slot: u32, data: &[u8]) {
        self.record(RecordedCommand::UpdateConstants { slot, size: data.len() });
    }

    fn update_buffer(&mut self, buffer: BufferHandle, data: &[u8]) {
        let mut state = self.state.borrow_mut();
        let capacity = match state.resources.get(to_key(buffer.id())) {
            Some(ResourceRecord::Buffer { desc }) => Some(desc.size),
            _ => None,
        };
        match capacity {
            Some(size) if (data.len() as u64) > size => {
                let message = format!("buffer update of {} bytes overflows {} byte buffer", data.len(), size);
                state.hazard(message);
            }
            None => state.hazard(format!("update of unknown buffer {:?}", buffer)),
            Some(_) => {}
        }
        state.commands.push(RecordedCommand::UpdateBuffer { buffer, size: data.len() });
    }

    fn draw_mesh(&mut self, mesh: MeshHandle) {
        let mut state = self.state.borrow_mut();
        state.mark_targets_rendered();
        let technique = state.technique.clone();
        state.commands.push(RecordedCommand::DrawMesh { mesh, technique });
    }

    fn draw(&mut self, vertex_count: u32, _first_vertex: u32) {
        let mut state = self.state.borrow_mut();
        state.mark_targets_rendered();
        let technique = state.technique.clone();
        state.commands.push(RecordedCommand::Draw { vertex_count, technique });
    }

    fn draw_lines(&mut self, buffer: BufferHandle, vertex_count: u32) {
        let mut state = self.state.borrow_mut();
        state.mark_targets_rendered();
        state.commands.push(RecordedCommand::DrawLines { buffer, vertex_count });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target_texture(device: &mut RecordingDevice, label: &'static str) -> TextureHandle {
        let desc = TextureDesc::surface(
            label,
            4,
            4,
            TextureFormat::Rgba8Unorm,
            TextureUsage::RENDER_TARGET | TextureUsage::SHADER_RESOURCE,
        );
        device.create_texture(&desc).unwrap()
    }

    #[test]
    fn test_allocation_counting_by_label() {
        let mut device = RecordingDevice::new();
        target_texture(&mut device, "a");
        target_texture(&mut device, "a");
        target_texture(&mut device, "b");

        assert_eq!(device.allocation_count("a"), 2);
        assert_eq!(device.allocation_count("b"), 1);
        assert_eq!(device.allocation_count("c"), 0);
    }

    #[test]
    fn test_injected_failure() {
        let mut device = RecordingDevice::new();
        device.fail_allocations("a");
        let desc = TextureDesc::surface("a", 4, 4, TextureFormat::Rgba8Unorm, TextureUsage::RENDER_TARGET);

        assert_eq!(device.create_texture(&desc), Err(DeviceError::OutOfMemory { label: "a" }));
        device.allow_allocations("a");
        assert!(device.create_texture(&desc).is_ok());
    }

    #[test]
    fn test_view_usage_is_validated() {
        let mut device = RecordingDevice::new();
        let desc = TextureDesc::surface("plain", 4, 4, TextureFormat::Rgba8Unorm, TextureUsage::SHADER_RESOURCE);
        let texture = device.create_texture(&desc).unwrap();

        assert!(matches!(
            device.create_render_target_view(texture),
            Err(DeviceError::InvalidDescriptor { .. })
        ));
    }

    #[test]
    fn test_clear_and_draw_update_contents() {
        let mut device = RecordingDevice::new();
        let mut ctx = device.create_context(4, 4).unwrap();
        let texture = target_texture(&mut device, "color");
        let view = device.create_render_target_view(texture).unwrap();

        ctx.clear_render_target(view, [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(device.surface_contents(texture), Some(SurfaceContents::Color([1.0, 0.0, 0.0, 1.0])));

        ctx.set_render_targets(&[view], None);
        ctx.draw(3, 0);
        assert_eq!(device.surface_contents(texture), Some(SurfaceContents::Rendered));
        assert_eq!(device.draw_count(), 1);
    }

    #[test]
    fn test_read_while_bound_as_target_is_a_hazard() {
        let mut device = RecordingDevice::new();
        let mut ctx = device.create_context(4, 4).unwrap();
        let texture = target_texture(&mut device, "color");
        let rtv = device.create_render_target_view(texture).unwrap();
        let srv = device.create_shader_resource_view(texture).unwrap();

        ctx.set_render_targets(&[rtv], None);
        ctx.set_shader_resources(0, &[srv]);
        assert_eq!(device.hazards().len(), 1);

        ctx.set_render_targets(&[], None);
        ctx.clear_shader_resources(0, 1);
        ctx.set_shader_resources(0, &[srv]);
        assert_eq!(device.hazards().len(), 1);
    }

    #[test]
    fn test_release_removes_resource() {
        let mut device = RecordingDevice::new();
        let texture = target_texture(&mut device, "color");
        assert_eq!(device.live_resource_count(), 1);

        device.release(texture.id());
        device.release(texture.id());
        assert_eq!(device.live_resource_count(), 0);
    }
}
