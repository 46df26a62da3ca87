use std::collections::BTreeMap;

use ash::prelude::VkResult;
use ash::vk;

use crate::{Pipeline, PipelineLayout, PipelineState};

// Packed specialization constants, kept alive until the pipeline is created
struct Specialization {
    entries: Vec<vk::SpecializationMapEntry>,
    data: Vec<u8>,
}

impl Specialization {
    fn new(constants: &BTreeMap<u32, Vec<u8>>) -> Self {
        let mut entries = Vec::with_capacity(constants.len());
        let mut data = Vec::new();

        for (&constant_id, bytes) in constants {
            entries.push(vk::SpecializationMapEntry {
                constant_id,
                offset: data.len() as u32,
                size: bytes.len(),
            });
            data.extend_from_slice(bytes);
        }

        Self { entries, data }
    }

    fn info(&self) -> vk::SpecializationInfo<'_> {
        vk::SpecializationInfo::default()
            .map_entries(&self.entries)
            .data(&self.data)
    }
}

fn bool32(value: bool) -> vk::Bool32 {
    value as vk::Bool32
}

// Dynamic state every graphics pipeline leaves to the command buffer
const DYNAMIC_STATES: [vk::DynamicState; 9] = [
    vk::DynamicState::VIEWPORT,
    vk::DynamicState::SCISSOR,
    vk::DynamicState::LINE_WIDTH,
    vk::DynamicState::DEPTH_BIAS,
    vk::DynamicState::BLEND_CONSTANTS,
    vk::DynamicState::DEPTH_BOUNDS,
    vk::DynamicState::STENCIL_COMPARE_MASK,
    vk::DynamicState::STENCIL_WRITE_MASK,
    vk::DynamicState::STENCIL_REFERENCE,
];

fn stencil_op_state(state: &crate::StencilOpState) -> vk::StencilOpState {
    vk::StencilOpState {
        fail_op: state.fail_op,
        pass_op: state.pass_op,
        depth_fail_op: state.depth_fail_op,
        compare_op: state.compare_op,
        compare_mask: !0,
        write_mask: !0,
        reference: 0,
    }
}

// Build a graphics pipeline from the full pipeline state snapshot
pub(crate) unsafe fn create_graphics_pipeline(
    device: &ash::Device,
    pipeline_cache: vk::PipelineCache,
    layout: &PipelineLayout,
    state: &PipelineState,
) -> VkResult<Pipeline> {
    let specialization = Specialization::new(state.specialization_constants());
    let specialization_info = specialization.info();

    let stages = layout
        .shader_modules()
        .iter()
        .map(|module| {
            vk::PipelineShaderStageCreateInfo::default()
                .stage(module.stage)
                .module(module.raw)
                .name(&module.entry_point)
                .specialization_info(&specialization_info)
        })
        .collect::<Vec<_>>();

    let vertex_input = state.vertex_input_state();
    let vertex_bindings = vertex_input
        .bindings
        .iter()
        .map(|binding| vk::VertexInputBindingDescription {
            binding: binding.binding,
            stride: binding.stride,
            input_rate: binding.input_rate,
        })
        .collect::<Vec<_>>();
    let vertex_attributes = vertex_input
        .attributes
        .iter()
        .map(|attribute| vk::VertexInputAttributeDescription {
            location: attribute.location,
            binding: attribute.binding,
            format: attribute.format,
            offset: attribute.offset,
        })
        .collect::<Vec<_>>();
    let vertex_input_info = vk::PipelineVertexInputStateCreateInfo::default()
        .vertex_binding_descriptions(&vertex_bindings)
        .vertex_attribute_descriptions(&vertex_attributes);

    let input_assembly = state.input_assembly_state();
    let input_assembly_info = vk::PipelineInputAssemblyStateCreateInfo::default()
        .topology(input_assembly.topology)
        .primitive_restart_enable(input_assembly.primitive_restart_enable);

    let viewport = state.viewport_state();
    let viewport_info = vk::PipelineViewportStateCreateInfo::default()
        .viewport_count(viewport.viewport_count)
        .scissor_count(viewport.scissor_count);

    let rasterization = state.rasterization_state();
    let rasterization_info = vk::PipelineRasterizationStateCreateInfo::default()
        .depth_clamp_enable(rasterization.depth_clamp_enable)
        .rasterizer_discard_enable(rasterization.rasterizer_discard_enable)
        .polygon_mode(rasterization.polygon_mode)
        .cull_mode(rasterization.cull_mode)
        .front_face(rasterization.front_face)
        .depth_bias_enable(rasterization.depth_bias_enable)
        .line_width(1.0);

    let multisample = state.multisample_state();
    let sample_mask = [multisample.sample_mask];
    let mut multisample_info = vk::PipelineMultisampleStateCreateInfo::default()
        .rasterization_samples(multisample.rasterization_samples)
        .sample_shading_enable(multisample.sample_shading_enable)
        .min_sample_shading(multisample.min_sample_shading)
        .alpha_to_coverage_enable(multisample.alpha_to_coverage_enable)
        .alpha_to_one_enable(multisample.alpha_to_one_enable);
    if multisample.sample_mask != 0 {
        multisample_info = multisample_info.sample_mask(&sample_mask);
    }

    let depth_stencil = state.depth_stencil_state();
    let depth_stencil_info = vk::PipelineDepthStencilStateCreateInfo::default()
        .depth_test_enable(depth_stencil.depth_test_enable)
        .depth_write_enable(depth_stencil.depth_write_enable)
        .depth_compare_op(depth_stencil.depth_compare_op)
        .depth_bounds_test_enable(depth_stencil.depth_bounds_test_enable)
        .stencil_test_enable(depth_stencil.stencil_test_enable)
        .front(stencil_op_state(&depth_stencil.front))
        .back(stencil_op_state(&depth_stencil.back));

    let color_blend = state.color_blend_state();
    let blend_attachments = color_blend
        .attachments
        .iter()
        .map(|attachment| vk::PipelineColorBlendAttachmentState {
            blend_enable: bool32(attachment.blend_enable),
            src_color_blend_factor: attachment.src_color_blend_factor,
            dst_color_blend_factor: attachment.dst_color_blend_factor,
            color_blend_op: attachment.color_blend_op,
            src_alpha_blend_factor: attachment.src_alpha_blend_factor,
            dst_alpha_blend_factor: attachment.dst_alpha_blend_factor,
            alpha_blend_op: attachment.alpha_blend_op,
            color_write_mask: attachment.color_write_mask,
        })
        .collect::<Vec<_>>();
    let color_blend_info = vk::PipelineColorBlendStateCreateInfo::default()
        .logic_op_enable(color_blend.logic_op_enable)
        .logic_op(color_blend.logic_op)
        .attachments(&blend_attachments)
        .blend_constants([1.0; 4]);

    let dynamic_info = vk::PipelineDynamicStateCreateInfo::default().dynamic_states(&DYNAMIC_STATES);

    let render_pass = state.render_pass().map(|pass| pass.raw()).unwrap_or_default();

    let create_info = vk::GraphicsPipelineCreateInfo::default()
        .stages(&stages)
        .vertex_input_state(&vertex_input_info)
        .input_assembly_state(&input_assembly_info)
        .viewport_state(&viewport_info)
        .rasterization_state(&rasterization_info)
        .multisample_state(&multisample_info)
        .depth_stencil_state(&depth_stencil_info)
        .color_blend_state(&color_blend_info)
        .dynamic_state(&dynamic_info)
        .layout(layout.raw())
        .render_pass(render_pass)
        .subpass(state.subpass_index());

    let pipelines = device
        .create_graphics_pipelines(pipeline_cache, &[create_info], None)
        .map_err(|(_, result)| result)?;
    log::debug!("Created graphics pipeline {:?} for subpass {}", pipelines[0], state.subpass_index());
    Ok(Pipeline::new(pipelines[0]))
}

// Build a compute pipeline from the compute shader of the layout
pub(crate) unsafe fn create_compute_pipeline(
    device: &ash::Device,
    pipeline_cache: vk::PipelineCache,
    layout: &PipelineLayout,
    state: &PipelineState,
) -> VkResult<Pipeline> {
    let module = layout
        .shader_modules()
        .iter()
        .find(|module| module.stage == vk::ShaderStageFlags::COMPUTE)
        .ok_or(vk::Result::ERROR_INITIALIZATION_FAILED)?;

    let specialization = Specialization::new(state.specialization_constants());
    let specialization_info = specialization.info();

    let stage = vk::PipelineShaderStageCreateInfo::default()
        .flags(vk::PipelineShaderStageCreateFlags::empty())
        .name(&module.entry_point)
        .stage(vk::ShaderStageFlags::COMPUTE)
        .module(module.raw)
        .specialization_info(&specialization_info);

    let create_info = vk::ComputePipelineCreateInfo::default()
        .layout(layout.raw())
        .stage(stage);

    let pipelines = device
        .create_compute_pipelines(pipeline_cache, &[create_info], None)
        .map_err(|(_, result)| result)?;
    log::debug!("Created compute pipeline {:?}", pipelines[0]);
    Ok(Pipeline::new(pipelines[0]))
}
