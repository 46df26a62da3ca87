use std::sync::Arc;

use ash::vk;
use smallvec::SmallVec;

use super::Finish;
use crate::error::contract_violation;
use crate::{
    Buffer, ColorBlendState, DepthStencilState, Error, ImageView, InputAssemblyState, MultisampleState, PipelineLayout,
    RasterizationState, Recorder, Result, Sampler, VertexInputState, ViewportState,
};

// Pipeline, descriptor set and push constant binds
#[derive(Debug, Clone)]
pub enum BindCommand {
    Pipeline {
        bind_point: vk::PipelineBindPoint,
        pipeline: vk::Pipeline,
    },
    DescriptorSets {
        bind_point: vk::PipelineBindPoint,
        layout: vk::PipelineLayout,
        first_set: u32,
        descriptor_sets: SmallVec<[vk::DescriptorSet; 1]>,
        dynamic_offsets: SmallVec<[u32; 4]>,
    },
    PushConstants {
        layout: vk::PipelineLayout,
        stages: vk::ShaderStageFlags,
        offset: u32,
        data: Vec<u8>,
    },
}

impl Finish for BindCommand {
    unsafe fn finish(self, device: &ash::Device, buffer: vk::CommandBuffer) {
        match self {
            BindCommand::Pipeline { bind_point, pipeline } => device.cmd_bind_pipeline(buffer, bind_point, pipeline),
            BindCommand::DescriptorSets { bind_point, layout, first_set, descriptor_sets, dynamic_offsets } => {
                device.cmd_bind_descriptor_sets(buffer, bind_point, layout, first_set, &descriptor_sets, &dynamic_offsets)
            }
            BindCommand::PushConstants { layout, stages, offset, data } => {
                device.cmd_push_constants(buffer, layout, stages, offset, &data)
            }
        }
    }
}

impl Recorder<'_> {
    // Use this layout (and its shader modules) for the next pipelines
    pub fn bind_pipeline_layout(&mut self, pipeline_layout: Arc<PipelineLayout>) {
        self.pipeline_state.set_pipeline_layout(pipeline_layout);
    }

    pub fn set_specialization_constant(&mut self, constant_id: u32, data: impl Into<Vec<u8>>) {
        self.pipeline_state.set_specialization_constant(constant_id, data.into());
    }

    // Same as set_specialization_constant, with the bytes taken from a plain value
    pub fn set_specialization_constant_value<T: bytemuck::Pod>(&mut self, constant_id: u32, value: &T) {
        self.set_specialization_constant(constant_id, bytemuck::bytes_of(value));
    }

    pub fn set_vertex_input_state(&mut self, state: VertexInputState) {
        self.pipeline_state.set_vertex_input_state(state);
    }

    pub fn set_input_assembly_state(&mut self, state: InputAssemblyState) {
        self.pipeline_state.set_input_assembly_state(state);
    }

    pub fn set_rasterization_state(&mut self, state: RasterizationState) {
        self.pipeline_state.set_rasterization_state(state);
    }

    pub fn set_viewport_state(&mut self, state: ViewportState) {
        self.pipeline_state.set_viewport_state(state);
    }

    pub fn set_multisample_state(&mut self, state: MultisampleState) {
        self.pipeline_state.set_multisample_state(state);
    }

    pub fn set_depth_stencil_state(&mut self, state: DepthStencilState) {
        self.pipeline_state.set_depth_stencil_state(state);
    }

    pub fn set_color_blend_state(&mut self, state: ColorBlendState) {
        self.pipeline_state.set_color_blend_state(state);
    }

    // Push constants go straight into the command buffer
    // Ranges the pipeline layout doesn't declare are skipped with a warning
    pub fn push_constants(&mut self, offset: u32, values: &[u8]) -> Result<()> {
        let Some(layout) = self.pipeline_state.pipeline_layout() else {
            contract_violation!(
                Error::MissingPipelineLayout,
                "Push constants need a pipeline layout, call bind_pipeline_layout first"
            );
        };

        let stages = u32::try_from(values.len())
            .map(|size| layout.push_constant_range_stage(offset, size))
            .unwrap_or_default();
        if stages.is_empty() {
            log::warn!(
                "Push constant range [{}, {}) not found in pipeline layout {:?}",
                offset,
                u64::from(offset) + values.len() as u64,
                layout.raw()
            );
            return Ok(());
        }

        self.record(BindCommand::PushConstants {
            layout: layout.raw(),
            stages,
            offset,
            data: values.to_vec(),
        });
        Ok(())
    }

    pub fn push_constants_value<T: bytemuck::Pod>(&mut self, offset: u32, value: &T) -> Result<()> {
        self.push_constants(offset, bytemuck::bytes_of(value))
    }

    // Request a buffer range at set/binding/element, bound on the next draw or dispatch
    pub fn bind_buffer(&mut self, buffer: &Buffer, offset: vk::DeviceSize, range: vk::DeviceSize, set: u32, binding: u32, array_element: u32) {
        self.resource_binding_state.bind_buffer(*buffer, offset, range, set, binding, array_element);
    }

    // Request a sampled image at set/binding/element
    pub fn bind_image(&mut self, view: &ImageView, sampler: &Sampler, set: u32, binding: u32, array_element: u32) {
        self.resource_binding_state.bind_image(*view, *sampler, set, binding, array_element);
    }

    // Request an image without a sampler (input attachments, storage images)
    pub fn bind_input(&mut self, view: &ImageView, set: u32, binding: u32, array_element: u32) {
        self.resource_binding_state.bind_input(*view, set, binding, array_element);
    }
}
