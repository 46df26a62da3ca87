use ash::vk;

use super::Finish;
use crate::Recorder;

// State every pipeline leaves dynamic, set directly on the command buffer
#[derive(Debug, Clone)]
pub enum DynamicStateCommand {
    Viewport {
        first_viewport: u32,
        viewports: Vec<vk::Viewport>,
    },
    Scissor {
        first_scissor: u32,
        scissors: Vec<vk::Rect2D>,
    },
    LineWidth(f32),
    DepthBias {
        constant_factor: f32,
        clamp: f32,
        slope_factor: f32,
    },
    BlendConstants([f32; 4]),
    DepthBounds {
        min: f32,
        max: f32,
    },
    StencilCompareMask {
        face_mask: vk::StencilFaceFlags,
        compare_mask: u32,
    },
    StencilWriteMask {
        face_mask: vk::StencilFaceFlags,
        write_mask: u32,
    },
    StencilReference {
        face_mask: vk::StencilFaceFlags,
        reference: u32,
    },
}

impl Finish for DynamicStateCommand {
    unsafe fn finish(self, device: &ash::Device, buffer: vk::CommandBuffer) {
        match self {
            DynamicStateCommand::Viewport { first_viewport, viewports } => device.cmd_set_viewport(buffer, first_viewport, &viewports),
            DynamicStateCommand::Scissor { first_scissor, scissors } => device.cmd_set_scissor(buffer, first_scissor, &scissors),
            DynamicStateCommand::LineWidth(width) => device.cmd_set_line_width(buffer, width),
            DynamicStateCommand::DepthBias { constant_factor, clamp, slope_factor } => {
                device.cmd_set_depth_bias(buffer, constant_factor, clamp, slope_factor)
            }
            DynamicStateCommand::BlendConstants(constants) => device.cmd_set_blend_constants(buffer, &constants),
            DynamicStateCommand::DepthBounds { min, max } => device.cmd_set_depth_bounds(buffer, min, max),
            DynamicStateCommand::StencilCompareMask { face_mask, compare_mask } => {
                device.cmd_set_stencil_compare_mask(buffer, face_mask, compare_mask)
            }
            DynamicStateCommand::StencilWriteMask { face_mask, write_mask } => {
                device.cmd_set_stencil_write_mask(buffer, face_mask, write_mask)
            }
            DynamicStateCommand::StencilReference { face_mask, reference } => {
                device.cmd_set_stencil_reference(buffer, face_mask, reference)
            }
        }
    }
}

impl Recorder<'_> {
    pub fn set_viewport(&mut self, first_viewport: u32, viewports: &[vk::Viewport]) {
        self.record(DynamicStateCommand::Viewport {
            first_viewport,
            viewports: viewports.to_vec(),
        });
    }

    pub fn set_scissor(&mut self, first_scissor: u32, scissors: &[vk::Rect2D]) {
        self.record(DynamicStateCommand::Scissor {
            first_scissor,
            scissors: scissors.to_vec(),
        });
    }

    pub fn set_line_width(&mut self, line_width: f32) {
        self.record(DynamicStateCommand::LineWidth(line_width));
    }

    pub fn set_depth_bias(&mut self, constant_factor: f32, clamp: f32, slope_factor: f32) {
        self.record(DynamicStateCommand::DepthBias {
            constant_factor,
            clamp,
            slope_factor,
        });
    }

    pub fn set_blend_constants(&mut self, blend_constants: [f32; 4]) {
        self.record(DynamicStateCommand::BlendConstants(blend_constants));
    }

    pub fn set_depth_bounds(&mut self, min: f32, max: f32) {
        self.record(DynamicStateCommand::DepthBounds { min, max });
    }

    // Stencil masks and reference are dynamic, pipelines with stencil testing need them set before drawing
    pub fn set_stencil_compare_mask(&mut self, face_mask: vk::StencilFaceFlags, compare_mask: u32) {
        self.record(DynamicStateCommand::StencilCompareMask { face_mask, compare_mask });
    }

    pub fn set_stencil_write_mask(&mut self, face_mask: vk::StencilFaceFlags, write_mask: u32) {
        self.record(DynamicStateCommand::StencilWriteMask { face_mask, write_mask });
    }

    pub fn set_stencil_reference(&mut self, face_mask: vk::StencilFaceFlags, reference: u32) {
        self.record(DynamicStateCommand::StencilReference { face_mask, reference });
    }
}
