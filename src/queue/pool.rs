use ash::vk;

use crate::{Device, Error, Recorder, Result};

// How the command buffers of a pool get reset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResetMode {
    // All the buffers are reset at once through CommandPool::reset
    #[default]
    ResetPool,

    // Each buffer is reset on its own, the pool is created with RESET_COMMAND_BUFFER
    ResetIndividually,
}

// Abstraction around a Vulkan command pool
// Recorders borrow the pool they were allocated from and hand their buffer back on drop
pub struct CommandPool<'a> {
    device: &'a Device,

    // Underlying pool
    raw: vk::CommandPool,

    queue_family_index: u32,
    reset_mode: ResetMode,
}

impl<'a> CommandPool<'a> {
    // Create a command pool for a specific queue family
    pub fn new(device: &'a Device, queue_family_index: u32, reset_mode: ResetMode) -> Result<Self> {
        let flags = match reset_mode {
            ResetMode::ResetPool => vk::CommandPoolCreateFlags::empty(),
            ResetMode::ResetIndividually => vk::CommandPoolCreateFlags::RESET_COMMAND_BUFFER,
        };

        let raw = unsafe { device.backend.create_command_pool(queue_family_index, flags) }
            .map_err(Error::vulkan("Failed to create command pool"))?;
        log::debug!("Created command pool {:?} for queue family {} ({:?})", raw, queue_family_index, reset_mode);

        Ok(Self {
            device,
            raw,
            queue_family_index,
            reset_mode,
        })
    }

    // Allocate a single command buffer and wrap it in a recorder
    pub fn allocate(&self, level: vk::CommandBufferLevel) -> Result<Recorder<'_>> {
        let raw = unsafe { self.device.backend.allocate_command_buffer(self.raw, level) }
            .map_err(Error::vulkan("Failed to allocate command buffer"))?;
        log::debug!("Allocated {:?} command buffer {:?} from pool {:?}", level, raw, self.raw);
        Ok(Recorder::new(self, level, raw))
    }

    // Reset every command buffer allocated from this pool at once
    // Recorders should be moved back to their initial state with Recorder::reset(ResetMode::ResetPool)
    pub fn reset(&self) -> Result<()> {
        debug_assert_eq!(self.reset_mode, ResetMode::ResetPool);
        unsafe { self.device.backend.reset_command_pool(self.raw) }.map_err(Error::vulkan("Failed to reset command pool"))
    }

    pub fn device(&self) -> &'a Device {
        self.device
    }

    pub fn raw(&self) -> vk::CommandPool {
        self.raw
    }

    pub fn queue_family_index(&self) -> u32 {
        self.queue_family_index
    }

    pub fn reset_mode(&self) -> ResetMode {
        self.reset_mode
    }
}

impl Drop for CommandPool<'_> {
    fn drop(&mut self) {
        log::debug!("Destroying command pool {:?}", self.raw);
        unsafe {
            self.device.backend.destroy_command_pool(self.raw);
        }
    }
}
