use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use ash::vk;

use crate::{PipelineLayout, RenderPass};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VertexBinding {
    pub binding: u32,
    pub stride: u32,
    pub input_rate: vk::VertexInputRate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VertexAttribute {
    pub location: u32,
    pub binding: u32,
    pub format: vk::Format,
    pub offset: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct VertexInputState {
    pub bindings: Vec<VertexBinding>,
    pub attributes: Vec<VertexAttribute>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InputAssemblyState {
    pub topology: vk::PrimitiveTopology,
    pub primitive_restart_enable: bool,
}

impl Default for InputAssemblyState {
    fn default() -> Self {
        Self {
            topology: vk::PrimitiveTopology::TRIANGLE_LIST,
            primitive_restart_enable: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RasterizationState {
    pub depth_clamp_enable: bool,
    pub rasterizer_discard_enable: bool,
    pub polygon_mode: vk::PolygonMode,
    pub cull_mode: vk::CullModeFlags,
    pub front_face: vk::FrontFace,
    pub depth_bias_enable: bool,
}

impl Default for RasterizationState {
    fn default() -> Self {
        Self {
            depth_clamp_enable: false,
            rasterizer_discard_enable: false,
            polygon_mode: vk::PolygonMode::FILL,
            cull_mode: vk::CullModeFlags::BACK,
            front_face: vk::FrontFace::COUNTER_CLOCKWISE,
            depth_bias_enable: false,
        }
    }
}

// Viewports and scissors themselves are dynamic state, only their count is baked in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ViewportState {
    pub viewport_count: u32,
    pub scissor_count: u32,
}

impl Default for ViewportState {
    fn default() -> Self {
        Self {
            viewport_count: 1,
            scissor_count: 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MultisampleState {
    pub rasterization_samples: vk::SampleCountFlags,
    pub sample_shading_enable: bool,
    pub min_sample_shading: f32,
    pub sample_mask: u32,
    pub alpha_to_coverage_enable: bool,
    pub alpha_to_one_enable: bool,
}

impl Default for MultisampleState {
    fn default() -> Self {
        Self {
            rasterization_samples: vk::SampleCountFlags::TYPE_1,
            sample_shading_enable: false,
            min_sample_shading: 0.0,
            sample_mask: 0,
            alpha_to_coverage_enable: false,
            alpha_to_one_enable: false,
        }
    }
}

impl Eq for MultisampleState {}

impl Hash for MultisampleState {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rasterization_samples.hash(state);
        self.sample_shading_enable.hash(state);
        self.min_sample_shading.to_bits().hash(state);
        self.sample_mask.hash(state);
        self.alpha_to_coverage_enable.hash(state);
        self.alpha_to_one_enable.hash(state);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StencilOpState {
    pub fail_op: vk::StencilOp,
    pub pass_op: vk::StencilOp,
    pub depth_fail_op: vk::StencilOp,
    pub compare_op: vk::CompareOp,
}

impl Default for StencilOpState {
    fn default() -> Self {
        Self {
            fail_op: vk::StencilOp::REPLACE,
            pass_op: vk::StencilOp::REPLACE,
            depth_fail_op: vk::StencilOp::REPLACE,
            compare_op: vk::CompareOp::NEVER,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DepthStencilState {
    pub depth_test_enable: bool,
    pub depth_write_enable: bool,
    pub depth_compare_op: vk::CompareOp,
    pub depth_bounds_test_enable: bool,
    pub stencil_test_enable: bool,
    pub front: StencilOpState,
    pub back: StencilOpState,
}

impl Default for DepthStencilState {
    fn default() -> Self {
        // Reversed depth, near plane at 1
        Self {
            depth_test_enable: true,
            depth_write_enable: true,
            depth_compare_op: vk::CompareOp::GREATER,
            depth_bounds_test_enable: false,
            stencil_test_enable: false,
            front: StencilOpState::default(),
            back: StencilOpState::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColorBlendAttachmentState {
    pub blend_enable: bool,
    pub src_color_blend_factor: vk::BlendFactor,
    pub dst_color_blend_factor: vk::BlendFactor,
    pub color_blend_op: vk::BlendOp,
    pub src_alpha_blend_factor: vk::BlendFactor,
    pub dst_alpha_blend_factor: vk::BlendFactor,
    pub alpha_blend_op: vk::BlendOp,
    pub color_write_mask: vk::ColorComponentFlags,
}

impl Default for ColorBlendAttachmentState {
    fn default() -> Self {
        Self {
            blend_enable: false,
            src_color_blend_factor: vk::BlendFactor::ONE,
            dst_color_blend_factor: vk::BlendFactor::ZERO,
            color_blend_op: vk::BlendOp::ADD,
            src_alpha_blend_factor: vk::BlendFactor::ONE,
            dst_alpha_blend_factor: vk::BlendFactor::ZERO,
            alpha_blend_op: vk::BlendOp::ADD,
            color_write_mask: vk::ColorComponentFlags::RGBA,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColorBlendState {
    pub logic_op_enable: bool,
    pub logic_op: vk::LogicOp,
    pub attachments: Vec<ColorBlendAttachmentState>,
}

impl Default for ColorBlendState {
    fn default() -> Self {
        Self {
            logic_op_enable: false,
            logic_op: vk::LogicOp::CLEAR,
            attachments: Vec::new(),
        }
    }
}

// Snapshot of everything needed to build a graphics or compute pipeline
// Setters only flag the state dirty when the value actually changes
#[derive(Debug, Clone, Default)]
pub struct PipelineState {
    pub(crate) pipeline_layout: Option<Arc<PipelineLayout>>,
    pub(crate) render_pass: Option<Arc<RenderPass>>,
    pub(crate) specialization_constants: BTreeMap<u32, Vec<u8>>,
    pub(crate) vertex_input: VertexInputState,
    pub(crate) input_assembly: InputAssemblyState,
    pub(crate) rasterization: RasterizationState,
    pub(crate) viewport: ViewportState,
    pub(crate) multisample: MultisampleState,
    pub(crate) depth_stencil: DepthStencilState,
    pub(crate) color_blend: ColorBlendState,
    pub(crate) subpass_index: u32,
    pub(crate) dirty: bool,
}

impl PipelineState {
    // Go back to the default state, the dirty bit is cleared as well
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    // Layouts sharing a raw handle still differ when they carry other shader modules
    pub fn set_pipeline_layout(&mut self, layout: Arc<PipelineLayout>) {
        let changed = match &self.pipeline_layout {
            Some(current) => {
                !Arc::ptr_eq(current, &layout)
                    && (current.raw != layout.raw || current.shader_modules != layout.shader_modules)
            }
            None => true,
        };

        self.pipeline_layout = Some(layout);
        if changed {
            self.dirty = true;
        }
    }

    pub fn pipeline_layout(&self) -> Option<&Arc<PipelineLayout>> {
        self.pipeline_layout.as_ref()
    }

    // Record the render pass the pipeline will be used with
    // This happens right before a pipeline request and must not re-dirty the state
    pub(crate) fn stamp_render_pass(&mut self, render_pass: Option<Arc<RenderPass>>) {
        self.render_pass = render_pass;
    }

    pub fn render_pass(&self) -> Option<&Arc<RenderPass>> {
        self.render_pass.as_ref()
    }

    pub fn set_specialization_constant(&mut self, constant_id: u32, data: Vec<u8>) {
        if self.specialization_constants.get(&constant_id) != Some(&data) {
            self.specialization_constants.insert(constant_id, data);
            self.dirty = true;
        }
    }

    pub fn specialization_constants(&self) -> &BTreeMap<u32, Vec<u8>> {
        &self.specialization_constants
    }

    pub fn set_vertex_input_state(&mut self, state: VertexInputState) {
        set_if_changed(&mut self.vertex_input, state, &mut self.dirty);
    }

    pub fn vertex_input_state(&self) -> &VertexInputState {
        &self.vertex_input
    }

    pub fn set_input_assembly_state(&mut self, state: InputAssemblyState) {
        set_if_changed(&mut self.input_assembly, state, &mut self.dirty);
    }

    pub fn input_assembly_state(&self) -> &InputAssemblyState {
        &self.input_assembly
    }

    pub fn set_rasterization_state(&mut self, state: RasterizationState) {
        set_if_changed(&mut self.rasterization, state, &mut self.dirty);
    }

    pub fn rasterization_state(&self) -> &RasterizationState {
        &self.rasterization
    }

    pub fn set_viewport_state(&mut self, state: ViewportState) {
        set_if_changed(&mut self.viewport, state, &mut self.dirty);
    }

    pub fn viewport_state(&self) -> &ViewportState {
        &self.viewport
    }

    pub fn set_multisample_state(&mut self, state: MultisampleState) {
        set_if_changed(&mut self.multisample, state, &mut self.dirty);
    }

    pub fn multisample_state(&self) -> &MultisampleState {
        &self.multisample
    }

    pub fn set_depth_stencil_state(&mut self, state: DepthStencilState) {
        set_if_changed(&mut self.depth_stencil, state, &mut self.dirty);
    }

    pub fn depth_stencil_state(&self) -> &DepthStencilState {
        &self.depth_stencil
    }

    pub fn set_color_blend_state(&mut self, state: ColorBlendState) {
        set_if_changed(&mut self.color_blend, state, &mut self.dirty);
    }

    pub fn color_blend_state(&self) -> &ColorBlendState {
        &self.color_blend
    }

    // Grow or shrink the blend attachments so they match the color outputs of the subpass
    pub(crate) fn resize_color_blend_attachments(&mut self, count: u32) {
        let mut blend = self.color_blend.clone();
        blend.attachments.resize(count as usize, ColorBlendAttachmentState::default());
        self.set_color_blend_state(blend);
    }

    pub fn set_subpass_index(&mut self, subpass_index: u32) {
        set_if_changed(&mut self.subpass_index, subpass_index, &mut self.dirty);
    }

    pub fn subpass_index(&self) -> u32 {
        self.subpass_index
    }
}

// Content hash used as the cache key for pipelines
// The layout and render pass are hashed by handle, everything else by value
impl Hash for PipelineState {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.pipeline_layout.as_ref().map(|layout| layout.raw).hash(state);
        if let Some(layout) = &self.pipeline_layout {
            layout.shader_modules.hash(state);
        }
        self.render_pass.as_ref().map(|pass| pass.raw).hash(state);
        self.specialization_constants.hash(state);
        self.vertex_input.hash(state);
        self.input_assembly.hash(state);
        self.rasterization.hash(state);
        self.viewport.hash(state);
        self.multisample.hash(state);
        self.depth_stencil.hash(state);
        self.color_blend.hash(state);
        self.subpass_index.hash(state);
    }
}

fn set_if_changed<T: PartialEq>(slot: &mut T, value: T, dirty: &mut bool) {
    if *slot != value {
        *slot = value;
        *dirty = true;
    }
}
