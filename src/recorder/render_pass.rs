use std::fmt;

use ash::vk;

use super::{Finish, RenderPassBinding};
use crate::error::contract_violation;
use crate::{Error, LoadStoreInfo, Recorder, RenderTarget, Result, Subpass, SubpassInfo};

// Commands that open, advance and close render pass scopes
#[derive(Clone)]
pub enum RenderPassCommand {
    Begin {
        render_pass: vk::RenderPass,
        framebuffer: vk::Framebuffer,
        render_area: vk::Rect2D,
        clear_values: Vec<vk::ClearValue>,
        contents: vk::SubpassContents,
    },
    NextSubpass {
        contents: vk::SubpassContents,
    },
    End,
    ExecuteCommands {
        buffers: Vec<vk::CommandBuffer>,
    },
}

// Clear values are unions, only their count is printed
impl fmt::Debug for RenderPassCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderPassCommand::Begin { render_pass, framebuffer, render_area, clear_values, contents } => f
                .debug_struct("Begin")
                .field("render_pass", render_pass)
                .field("framebuffer", framebuffer)
                .field("render_area", render_area)
                .field("clear_values", &clear_values.len())
                .field("contents", contents)
                .finish(),
            RenderPassCommand::NextSubpass { contents } => f.debug_struct("NextSubpass").field("contents", contents).finish(),
            RenderPassCommand::End => f.write_str("End"),
            RenderPassCommand::ExecuteCommands { buffers } => f.debug_struct("ExecuteCommands").field("buffers", buffers).finish(),
        }
    }
}

impl Finish for RenderPassCommand {
    unsafe fn finish(self, device: &ash::Device, buffer: vk::CommandBuffer) {
        match self {
            RenderPassCommand::Begin { render_pass, framebuffer, render_area, clear_values, contents } => {
                let begin_info = vk::RenderPassBeginInfo::default()
                    .render_pass(render_pass)
                    .framebuffer(framebuffer)
                    .render_area(render_area)
                    .clear_values(&clear_values);
                device.cmd_begin_render_pass(buffer, &begin_info, contents);
            }
            RenderPassCommand::NextSubpass { contents } => device.cmd_next_subpass(buffer, contents),
            RenderPassCommand::End => device.cmd_end_render_pass(buffer),
            RenderPassCommand::ExecuteCommands { buffers } => device.cmd_execute_commands(buffer, &buffers),
        }
    }
}

impl Recorder<'_> {
    // Start a render pass over the whole render target
    // This drops every pipeline and descriptor binding made so far
    pub fn begin_render_pass<S: Subpass>(
        &mut self,
        render_target: &RenderTarget,
        load_store_infos: &[LoadStoreInfo],
        clear_values: &[vk::ClearValue],
        contents: vk::SubpassContents,
        subpasses: &[S],
    ) -> Result<()> {
        self.pipeline_state.reset();
        self.resource_binding_state.reset();
        self.descriptor_set_layout_state.clear();

        let subpass_infos = subpasses
            .iter()
            .map(|subpass| SubpassInfo {
                input_attachments: subpass.input_attachments().to_vec(),
                output_attachments: subpass.output_attachments().to_vec(),
            })
            .collect::<Vec<_>>();

        let cache = self.device().resource_cache();
        let render_pass = cache.request_render_pass(render_target.attachments(), load_store_infos, &subpass_infos)?;
        let framebuffer = cache.request_framebuffer(render_target, &render_pass)?;

        self.record(RenderPassCommand::Begin {
            render_pass: render_pass.raw(),
            framebuffer: framebuffer.raw(),
            render_area: vk::Rect2D {
                offset: vk::Offset2D::default(),
                extent: render_target.extent(),
            },
            clear_values: clear_values.to_vec(),
            contents,
        });

        // Blend attachments have to line up with the color outputs of the first subpass
        let color_outputs = render_pass.color_output_count(self.pipeline_state.subpass_index());
        self.pipeline_state.resize_color_blend_attachments(color_outputs);

        self.current_render_pass = RenderPassBinding {
            render_pass: Some(render_pass),
            framebuffer: Some(framebuffer),
        };
        Ok(())
    }

    // Move on to the next subpass. Fixed function state is kept, descriptor bindings are not
    pub fn next_subpass(&mut self) -> Result<()> {
        let Some(render_pass) = self.current_render_pass.render_pass.clone() else {
            contract_violation!(
                Error::InvalidState("no render pass has been begun"),
                "Command buffer {:?} has no active render pass to advance",
                self.raw
            );
        };

        let subpass_index = self.pipeline_state.subpass_index() + 1;
        if subpass_index >= render_pass.subpass_count() {
            contract_violation!(
                Error::InvalidState("subpass index past the last subpass of the render pass"),
                "Subpass {} does not exist, the render pass only has {} subpasses",
                subpass_index,
                render_pass.subpass_count()
            );
        }

        self.pipeline_state.set_subpass_index(subpass_index);
        self.pipeline_state.resize_color_blend_attachments(render_pass.color_output_count(subpass_index));

        self.resource_binding_state.reset();
        self.descriptor_set_layout_state.clear();

        self.record(RenderPassCommand::NextSubpass {
            contents: vk::SubpassContents::INLINE,
        });
        Ok(())
    }

    // Pipeline and binding state stays around for whatever gets recorded next
    // The render pass scope itself is closed, secondaries begun later inherit nothing
    pub fn end_render_pass(&mut self) {
        debug_assert!(
            self.current_render_pass.render_pass.is_some(),
            "Command buffer {:?} has no active render pass to end",
            self.raw
        );
        self.current_render_pass = RenderPassBinding::default();
        self.record(RenderPassCommand::End);
    }

    // Run secondary command buffers from within this primary
    pub fn execute_commands(&mut self, secondaries: &[&Recorder]) {
        debug_assert_eq!(self.level, vk::CommandBufferLevel::PRIMARY);
        let buffers = secondaries.iter().map(|secondary| secondary.raw()).collect();
        self.record(RenderPassCommand::ExecuteCommands { buffers });
    }
}
