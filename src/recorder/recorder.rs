use std::sync::Arc;

use ash::vk;

use super::Command;
use crate::error::contract_violation;
use crate::{
    CommandPool, DescriptorSetLayoutState, Device, Error, Framebuffer, Inheritance, PipelineState, RenderPass, ResetMode,
    ResourceBindingState, Result,
};

// Lifecycle of a command buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Initial,
    Recording,
    Executable,

    // A begin or end call failed at the driver level, the buffer must be reset or begun again
    Invalid,
}

// Render pass and framebuffer used by the current render pass scope
#[derive(Debug, Clone, Default)]
pub struct RenderPassBinding {
    pub render_pass: Option<Arc<RenderPass>>,
    pub framebuffer: Option<Arc<Framebuffer>>,
}

// A recorder wraps a single command buffer allocated from a pool
// It keeps track of the requested pipeline and descriptor state and only binds
// new objects right before draws and dispatches when something actually changed
pub struct Recorder<'a> {
    // Pool that allocated the command buffer, it gets the handle back on drop
    pub(crate) pool: &'a CommandPool<'a>,

    // Primary or secondary, fixed at allocation
    pub(crate) level: vk::CommandBufferLevel,

    // Raw command buffer
    pub(crate) raw: vk::CommandBuffer,

    pub(crate) state: State,
    pub(crate) current_render_pass: RenderPassBinding,
    pub(crate) pipeline_state: PipelineState,
    pub(crate) resource_binding_state: ResourceBindingState,
    pub(crate) descriptor_set_layout_state: DescriptorSetLayoutState,
}

impl<'a> Recorder<'a> {
    pub(crate) fn new(pool: &'a CommandPool<'a>, level: vk::CommandBufferLevel, raw: vk::CommandBuffer) -> Self {
        Self {
            pool,
            level,
            raw,
            state: State::Initial,
            current_render_pass: RenderPassBinding::default(),
            pipeline_state: PipelineState::default(),
            resource_binding_state: ResourceBindingState::default(),
            descriptor_set_layout_state: DescriptorSetLayoutState::default(),
        }
    }

    // Start recording. Secondary command buffers continue the render pass of the given primary
    pub fn begin(&mut self, flags: vk::CommandBufferUsageFlags, primary: Option<&Recorder>) -> Result<()> {
        if self.is_recording() {
            contract_violation!(
                Error::InvalidState("command buffer is already recording"),
                "Command buffer {:?} is already recording, call end before beginning again",
                self.raw
            );
        }

        self.pipeline_state.reset();
        self.resource_binding_state.reset();
        self.descriptor_set_layout_state.clear();

        let inheritance = if self.level == vk::CommandBufferLevel::SECONDARY {
            let Some(primary) = primary else {
                contract_violation!(
                    Error::InvalidArgument("secondary command buffers need a primary to inherit from"),
                    "A primary command buffer must be provided when beginning the secondary {:?}",
                    self.raw
                );
            };

            self.current_render_pass = primary.current_render_pass.clone();
            self.pipeline_state.set_subpass_index(primary.pipeline_state.subpass_index());
            self.pipeline_state.clear_dirty();

            Some(Inheritance {
                render_pass: self.current_render_pass.render_pass.as_ref().map(|pass| pass.raw()).unwrap_or_default(),
                subpass: self.pipeline_state.subpass_index(),
                framebuffer: self.current_render_pass.framebuffer.as_ref().map(|fb| fb.raw()).unwrap_or_default(),
            })
        } else {
            None
        };

        let result = unsafe { self.device().backend.begin_command_buffer(self.raw, flags, inheritance) };
        if let Err(result) = result {
            self.state = State::Invalid;
            return Err(Error::vulkan("Failed to begin command buffer")(result));
        }

        log::trace!("Began recording command buffer {:?} ({:?})", self.raw, self.level);
        self.state = State::Recording;
        Ok(())
    }

    // Stop recording, the command buffer can be submitted afterwards
    pub fn end(&mut self) -> Result<()> {
        if !self.is_recording() {
            contract_violation!(
                Error::InvalidState("command buffer is not recording"),
                "Command buffer {:?} is not recording, call begin before end",
                self.raw
            );
        }

        let result = unsafe { self.device().backend.end_command_buffer(self.raw) };
        if let Err(result) = result {
            self.state = State::Invalid;
            return Err(Error::vulkan("Failed to end command buffer")(result));
        }

        log::trace!("Finished recording command buffer {:?}", self.raw);
        self.state = State::Executable;
        Ok(())
    }

    // Go back to the initial state
    // The mode must be the one the pool was created with. With ResetPool the
    // hardware reset is left to CommandPool::reset
    pub fn reset(&mut self, reset_mode: ResetMode) -> Result<()> {
        if reset_mode != self.pool.reset_mode() {
            contract_violation!(
                Error::InvalidArgument("reset mode differs from the one of the pool"),
                "Command buffer reset mode {:?} must match the one used by the pool ({:?})",
                reset_mode,
                self.pool.reset_mode()
            );
        }

        self.current_render_pass = RenderPassBinding::default();

        if reset_mode == ResetMode::ResetIndividually {
            let result = unsafe { self.device().backend.reset_command_buffer(self.raw) };
            if let Err(result) = result {
                self.state = State::Invalid;
                return Err(Error::vulkan("Failed to reset command buffer")(result));
            }
        }

        self.state = State::Initial;
        Ok(())
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn is_recording(&self) -> bool {
        self.state == State::Recording
    }

    pub fn raw(&self) -> vk::CommandBuffer {
        self.raw
    }

    pub fn level(&self) -> vk::CommandBufferLevel {
        self.level
    }

    pub fn current_render_pass(&self) -> &RenderPassBinding {
        &self.current_render_pass
    }

    pub fn pipeline_state(&self) -> &PipelineState {
        &self.pipeline_state
    }

    pub fn resource_binding_state(&self) -> &ResourceBindingState {
        &self.resource_binding_state
    }

    pub fn descriptor_set_layout_state(&self) -> &DescriptorSetLayoutState {
        &self.descriptor_set_layout_state
    }

    pub(crate) fn device(&self) -> &'a Device {
        self.pool.device()
    }

    // Write a command into the underlying command buffer right away
    pub(crate) fn record(&self, command: impl Into<Command>) {
        debug_assert!(self.is_recording(), "Command buffer {:?} is not recording", self.raw);
        unsafe { self.device().backend.record(self.raw, command.into()) }
    }
}

impl Drop for Recorder<'_> {
    fn drop(&mut self) {
        log::trace!("Freeing command buffer {:?}", self.raw);
        unsafe {
            self.device().backend.free_command_buffer(self.pool.raw(), self.raw);
        }
    }
}
