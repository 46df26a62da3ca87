#![allow(dead_code)]

use std::collections::hash_map::DefaultHasher;
use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use ash::prelude::VkResult;
use ash::vk::{self, Handle};
use parking_lot::Mutex;
use vulkan_recorder::*;

// Everything the mock backend and cache observed, in order
#[derive(Debug, Clone)]
pub enum Event {
    CreatePool(vk::CommandPoolCreateFlags),
    DestroyPool,
    ResetPool,
    Allocate(vk::CommandBuffer, vk::CommandBufferLevel),
    Free(vk::CommandBuffer),
    Begin(vk::CommandBuffer, Option<Inheritance>),
    End(vk::CommandBuffer),
    Reset(vk::CommandBuffer),
    Record(vk::CommandBuffer, Command),
    RenderPassRequest(Vec<SubpassInfo>),
    FramebufferRequest,
    GraphicsPipelineRequest { subpass: u32, blend_attachments: usize },
    ComputePipelineRequest,
    DescriptorSetRequest {
        layout: vk::DescriptorSetLayout,
        buffer_infos: BindingMap<vk::DescriptorBufferInfo>,
        image_infos: BindingMap<vk::DescriptorImageInfo>,
    },
}

impl Event {
    pub fn is_request(&self) -> bool {
        matches!(
            self,
            Event::RenderPassRequest(_)
                | Event::FramebufferRequest
                | Event::GraphicsPipelineRequest { .. }
                | Event::ComputePipelineRequest
                | Event::DescriptorSetRequest { .. }
        )
    }

    pub fn is_pipeline_request(&self) -> bool {
        matches!(self, Event::GraphicsPipelineRequest { .. } | Event::ComputePipelineRequest)
    }

    pub fn is_descriptor_set_request(&self) -> bool {
        matches!(self, Event::DescriptorSetRequest { .. })
    }
}

#[derive(Default)]
pub struct Log {
    events: Mutex<Vec<Event>>,

    // Makes the backend fail every command buffer reset while set
    pub fail_resets: AtomicBool,
}

impl Log {
    fn push(&self, event: Event) {
        self.events.lock().push(event);
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().clone()
    }

    // Forget everything seen so far
    pub fn clear(&self) {
        self.events.lock().clear();
    }

    pub fn requests(&self) -> Vec<Event> {
        self.events().into_iter().filter(Event::is_request).collect()
    }

    pub fn commands(&self) -> Vec<Command> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                Event::Record(_, command) => Some(command),
                _ => None,
            })
            .collect()
    }

    pub fn commands_of(&self, buffer: vk::CommandBuffer) -> Vec<Command> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                Event::Record(target, command) if target == buffer => Some(command),
                _ => None,
            })
            .collect()
    }
}

// Backend that hands out fake handles and logs every call
pub struct MockBackend {
    log: Arc<Log>,
    next_handle: AtomicU64,
}

impl MockBackend {
    fn handle<H: Handle>(&self) -> H {
        H::from_raw(self.next_handle.fetch_add(1, Ordering::Relaxed))
    }
}

impl Backend for MockBackend {
    unsafe fn create_command_pool(&self, _queue_family_index: u32, flags: vk::CommandPoolCreateFlags) -> VkResult<vk::CommandPool> {
        self.log.push(Event::CreatePool(flags));
        Ok(self.handle())
    }

    unsafe fn destroy_command_pool(&self, _pool: vk::CommandPool) {
        self.log.push(Event::DestroyPool);
    }

    unsafe fn reset_command_pool(&self, _pool: vk::CommandPool) -> VkResult<()> {
        self.log.push(Event::ResetPool);
        Ok(())
    }

    unsafe fn allocate_command_buffer(&self, _pool: vk::CommandPool, level: vk::CommandBufferLevel) -> VkResult<vk::CommandBuffer> {
        let buffer = self.handle();
        self.log.push(Event::Allocate(buffer, level));
        Ok(buffer)
    }

    unsafe fn free_command_buffer(&self, _pool: vk::CommandPool, buffer: vk::CommandBuffer) {
        self.log.push(Event::Free(buffer));
    }

    unsafe fn begin_command_buffer(&self, buffer: vk::CommandBuffer, _flags: vk::CommandBufferUsageFlags, inheritance: Option<Inheritance>) -> VkResult<()> {
        self.log.push(Event::Begin(buffer, inheritance));
        Ok(())
    }

    unsafe fn end_command_buffer(&self, buffer: vk::CommandBuffer) -> VkResult<()> {
        self.log.push(Event::End(buffer));
        Ok(())
    }

    unsafe fn reset_command_buffer(&self, buffer: vk::CommandBuffer) -> VkResult<()> {
        self.log.push(Event::Reset(buffer));
        if self.log.fail_resets.load(Ordering::Relaxed) {
            return Err(vk::Result::ERROR_OUT_OF_DEVICE_MEMORY);
        }
        Ok(())
    }

    unsafe fn record(&self, buffer: vk::CommandBuffer, command: Command) {
        self.log.push(Event::Record(buffer, command));
    }
}

fn hashed<H: Handle>(value: &impl Hash) -> H {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    H::from_raw(hasher.finish() | 1)
}

// Cache that derives handles from the request content, so identical requests get identical objects
pub struct MockCache {
    log: Arc<Log>,
}

impl ResourceCache for MockCache {
    fn request_render_pass(
        &self,
        attachments: &[Attachment],
        load_store_infos: &[LoadStoreInfo],
        subpasses: &[SubpassInfo],
    ) -> Result<Arc<RenderPass>> {
        self.log.push(Event::RenderPassRequest(subpasses.to_vec()));

        let is_color = |index: &u32| {
            attachments
                .get(*index as usize)
                .map(|attachment| !is_depth_stencil_format(attachment.format))
                .unwrap_or(false)
        };
        let color_output_counts = if subpasses.is_empty() {
            vec![(0..attachments.len() as u32).filter(is_color).count() as u32]
        } else {
            subpasses
                .iter()
                .map(|subpass| subpass.output_attachments.iter().filter(|index| is_color(index)).count() as u32)
                .collect()
        };

        let raw = hashed(&(attachments, load_store_infos, subpasses));
        Ok(Arc::new(RenderPass::new(raw, color_output_counts)))
    }

    fn request_framebuffer(&self, render_target: &RenderTarget, render_pass: &RenderPass) -> Result<Arc<Framebuffer>> {
        self.log.push(Event::FramebufferRequest);
        let views = render_target.views().iter().map(|view| view.raw).collect::<Vec<_>>();
        let raw = hashed(&(views, render_pass.raw()));
        Ok(Arc::new(Framebuffer::new(raw, render_target.extent())))
    }

    fn request_graphics_pipeline(&self, state: &PipelineState) -> Result<Arc<Pipeline>> {
        self.log.push(Event::GraphicsPipelineRequest {
            subpass: state.subpass_index(),
            blend_attachments: state.color_blend_state().attachments.len(),
        });
        Ok(Arc::new(Pipeline::new(hashed(state))))
    }

    fn request_compute_pipeline(&self, state: &PipelineState) -> Result<Arc<Pipeline>> {
        self.log.push(Event::ComputePipelineRequest);
        Ok(Arc::new(Pipeline::new(hashed(state))))
    }

    fn request_descriptor_set(
        &self,
        layout: &DescriptorSetLayout,
        buffer_infos: &BindingMap<vk::DescriptorBufferInfo>,
        image_infos: &BindingMap<vk::DescriptorImageInfo>,
    ) -> Result<Arc<DescriptorSet>> {
        self.log.push(Event::DescriptorSetRequest {
            layout: layout.raw(),
            buffer_infos: buffer_infos.clone(),
            image_infos: image_infos.clone(),
        });

        let buffers = buffer_infos
            .iter()
            .flat_map(|(binding, elements)| elements.iter().map(move |(element, info)| (*binding, *element, info.buffer, info.offset, info.range)))
            .collect::<Vec<_>>();
        let images = image_infos
            .iter()
            .flat_map(|(binding, elements)| elements.iter().map(move |(element, info)| (*binding, *element, info.image_view, info.sampler, info.image_layout)))
            .collect::<Vec<_>>();
        Ok(Arc::new(DescriptorSet::new(hashed(&(layout.raw(), buffers, images)))))
    }
}

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

// A device backed by the mocks plus the log they share
pub fn mock_device() -> (Arc<Log>, Device) {
    init_logger();
    let log = Arc::new(Log::default());
    let backend = MockBackend {
        log: log.clone(),
        next_handle: AtomicU64::new(0x100),
    };
    let cache = MockCache { log: log.clone() };
    (log, Device::new(Arc::new(backend), Arc::new(cache)))
}

pub fn set_layout(raw: u64, bindings: &[(u32, vk::DescriptorType)]) -> Arc<DescriptorSetLayout> {
    Arc::new(DescriptorSetLayout::new(
        vk::DescriptorSetLayout::from_raw(raw),
        bindings.iter().map(|&(binding, descriptor_type)| LayoutBinding {
            binding,
            descriptor_type,
            descriptor_count: 1,
            stage_flags: vk::ShaderStageFlags::ALL_GRAPHICS | vk::ShaderStageFlags::COMPUTE,
        }),
    ))
}

// Vertex + fragment layout over the given sets
pub fn graphics_layout(raw: u64, sets: &[(u32, &Arc<DescriptorSetLayout>)], push_constant_ranges: Vec<vk::PushConstantRange>) -> Arc<PipelineLayout> {
    let shader_modules = vec![
        ShaderModule::new(vk::ShaderModule::from_raw(raw * 16 + 1), vk::ShaderStageFlags::VERTEX),
        ShaderModule::new(vk::ShaderModule::from_raw(raw * 16 + 2), vk::ShaderStageFlags::FRAGMENT),
    ];
    layout(raw, shader_modules, sets, push_constant_ranges)
}

pub fn compute_layout(raw: u64, sets: &[(u32, &Arc<DescriptorSetLayout>)]) -> Arc<PipelineLayout> {
    let shader_modules = vec![ShaderModule::new(vk::ShaderModule::from_raw(raw * 16 + 3), vk::ShaderStageFlags::COMPUTE)];
    layout(raw, shader_modules, sets, Vec::new())
}

fn layout(
    raw: u64,
    shader_modules: Vec<ShaderModule>,
    sets: &[(u32, &Arc<DescriptorSetLayout>)],
    push_constant_ranges: Vec<vk::PushConstantRange>,
) -> Arc<PipelineLayout> {
    let set_layouts = sets.iter().map(|(set, layout)| (*set, Arc::clone(layout))).collect::<BTreeMap<_, _>>();
    Arc::new(PipelineLayout::new(vk::PipelineLayout::from_raw(raw), shader_modules, set_layouts, push_constant_ranges))
}

pub fn buffer(raw: u64) -> Buffer {
    Buffer::new(vk::Buffer::from_raw(raw), 4096)
}

pub fn view(raw: u64, format: vk::Format) -> ImageView {
    let aspect_mask = if is_depth_stencil_format(format) {
        vk::ImageAspectFlags::DEPTH
    } else {
        vk::ImageAspectFlags::COLOR
    };

    ImageView::new(
        vk::ImageView::from_raw(raw),
        vk::Image::from_raw(raw + 1000),
        format,
        vk::ImageSubresourceRange {
            aspect_mask,
            base_mip_level: 0,
            level_count: 1,
            base_array_layer: 0,
            layer_count: 1,
        },
    )
}

// Two color attachments followed by a depth attachment
pub fn render_target() -> RenderTarget {
    let views = vec![
        view(1, vk::Format::R8G8B8A8_UNORM),
        view(2, vk::Format::R16G16B16A16_SFLOAT),
        view(3, vk::Format::D32_SFLOAT),
    ];
    RenderTarget::new(vk::Extent2D { width: 800, height: 600 }, views)
}

pub fn full_viewport() -> vk::Viewport {
    vk::Viewport {
        x: 0.0,
        y: 0.0,
        width: 800.0,
        height: 600.0,
        min_depth: 0.0,
        max_depth: 1.0,
    }
}
