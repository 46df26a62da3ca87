use ash::prelude::VkResult;
use ash::vk;

use crate::recorder::{Command, Finish};

// Render pass state a secondary command buffer continues from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Inheritance {
    pub render_pass: vk::RenderPass,
    pub subpass: u32,
    pub framebuffer: vk::Framebuffer,
}

// The raw Vulkan entry points command recording goes through
// Implemented for ash::Device, and by anything that wants to capture the command stream instead
pub trait Backend: Send + Sync {
    unsafe fn create_command_pool(&self, queue_family_index: u32, flags: vk::CommandPoolCreateFlags) -> VkResult<vk::CommandPool>;
    unsafe fn destroy_command_pool(&self, pool: vk::CommandPool);
    unsafe fn reset_command_pool(&self, pool: vk::CommandPool) -> VkResult<()>;

    unsafe fn allocate_command_buffer(&self, pool: vk::CommandPool, level: vk::CommandBufferLevel) -> VkResult<vk::CommandBuffer>;
    unsafe fn free_command_buffer(&self, pool: vk::CommandPool, buffer: vk::CommandBuffer);

    unsafe fn begin_command_buffer(&self, buffer: vk::CommandBuffer, flags: vk::CommandBufferUsageFlags, inheritance: Option<Inheritance>) -> VkResult<()>;
    unsafe fn end_command_buffer(&self, buffer: vk::CommandBuffer) -> VkResult<()>;
    unsafe fn reset_command_buffer(&self, buffer: vk::CommandBuffer) -> VkResult<()>;

    // Write a single command into the command buffer
    unsafe fn record(&self, buffer: vk::CommandBuffer, command: Command);
}

impl Backend for ash::Device {
    unsafe fn create_command_pool(&self, queue_family_index: u32, flags: vk::CommandPoolCreateFlags) -> VkResult<vk::CommandPool> {
        let create_info = vk::CommandPoolCreateInfo::default()
            .flags(flags)
            .queue_family_index(queue_family_index);
        ash::Device::create_command_pool(self, &create_info, None)
    }

    unsafe fn destroy_command_pool(&self, pool: vk::CommandPool) {
        ash::Device::destroy_command_pool(self, pool, None);
    }

    unsafe fn reset_command_pool(&self, pool: vk::CommandPool) -> VkResult<()> {
        ash::Device::reset_command_pool(self, pool, vk::CommandPoolResetFlags::empty())
    }

    unsafe fn allocate_command_buffer(&self, pool: vk::CommandPool, level: vk::CommandBufferLevel) -> VkResult<vk::CommandBuffer> {
        let allocate_info = vk::CommandBufferAllocateInfo::default()
            .command_buffer_count(1)
            .command_pool(pool)
            .level(level);
        let buffers = self.allocate_command_buffers(&allocate_info)?;
        Ok(buffers[0])
    }

    unsafe fn free_command_buffer(&self, pool: vk::CommandPool, buffer: vk::CommandBuffer) {
        self.free_command_buffers(pool, &[buffer]);
    }

    unsafe fn begin_command_buffer(&self, buffer: vk::CommandBuffer, flags: vk::CommandBufferUsageFlags, inheritance: Option<Inheritance>) -> VkResult<()> {
        let inheritance_info = inheritance.map(|inheritance| {
            vk::CommandBufferInheritanceInfo::default()
                .render_pass(inheritance.render_pass)
                .subpass(inheritance.subpass)
                .framebuffer(inheritance.framebuffer)
        });

        let mut begin_info = vk::CommandBufferBeginInfo::default().flags(flags);
        if let Some(inheritance_info) = inheritance_info.as_ref() {
            begin_info = begin_info.inheritance_info(inheritance_info);
        }

        ash::Device::begin_command_buffer(self, buffer, &begin_info)
    }

    unsafe fn end_command_buffer(&self, buffer: vk::CommandBuffer) -> VkResult<()> {
        ash::Device::end_command_buffer(self, buffer)
    }

    unsafe fn reset_command_buffer(&self, buffer: vk::CommandBuffer) -> VkResult<()> {
        ash::Device::reset_command_buffer(self, buffer, vk::CommandBufferResetFlags::RELEASE_RESOURCES)
    }

    unsafe fn record(&self, buffer: vk::CommandBuffer, command: Command) {
        command.finish(self, buffer);
    }
}
