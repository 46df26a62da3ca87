use std::collections::BTreeMap;
use std::ffi::CString;
use std::sync::Arc;

use ash::vk;

// Raw buffer handle with the size it was created with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Buffer {
    pub raw: vk::Buffer,
    pub size: vk::DeviceSize,
}

impl Buffer {
    pub fn new(raw: vk::Buffer, size: vk::DeviceSize) -> Self {
        Self { raw, size }
    }
}

// Image view together with the image and subresources it covers
#[derive(Debug, Clone, Copy)]
pub struct ImageView {
    pub raw: vk::ImageView,
    pub image: vk::Image,
    pub format: vk::Format,
    pub subresource_range: vk::ImageSubresourceRange,
}

impl ImageView {
    pub fn new(raw: vk::ImageView, image: vk::Image, format: vk::Format, subresource_range: vk::ImageSubresourceRange) -> Self {
        Self { raw, image, format, subresource_range }
    }
}

// Views are identified by their handle
impl PartialEq for ImageView {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw && self.format == other.format
    }
}

impl Eq for ImageView {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Sampler {
    pub raw: vk::Sampler,
}

impl Sampler {
    pub fn new(raw: vk::Sampler) -> Self {
        Self { raw }
    }
}

// Compiled SPIR-V module plus the stage and entry point it is used for
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ShaderModule {
    pub raw: vk::ShaderModule,
    pub stage: vk::ShaderStageFlags,
    pub entry_point: CString,
}

impl ShaderModule {
    pub fn new(raw: vk::ShaderModule, stage: vk::ShaderStageFlags) -> Self {
        Self {
            raw,
            stage,
            entry_point: CString::from(c"main"),
        }
    }

    pub fn with_entry_point(mut self, entry_point: CString) -> Self {
        self.entry_point = entry_point;
        self
    }
}

// A single binding declared by a descriptor set layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LayoutBinding {
    pub binding: u32,
    pub descriptor_type: vk::DescriptorType,
    pub descriptor_count: u32,
    pub stage_flags: vk::ShaderStageFlags,
}

#[derive(Debug)]
pub struct DescriptorSetLayout {
    pub(crate) raw: vk::DescriptorSetLayout,
    pub(crate) bindings: BTreeMap<u32, LayoutBinding>,
}

impl DescriptorSetLayout {
    pub fn new(raw: vk::DescriptorSetLayout, bindings: impl IntoIterator<Item = LayoutBinding>) -> Self {
        Self {
            raw,
            bindings: bindings.into_iter().map(|b| (b.binding, b)).collect(),
        }
    }

    pub fn raw(&self) -> vk::DescriptorSetLayout {
        self.raw
    }

    // Look up the declared binding at this index
    pub fn binding(&self, index: u32) -> Option<&LayoutBinding> {
        self.bindings.get(&index)
    }

    pub fn bindings(&self) -> impl Iterator<Item = &LayoutBinding> {
        self.bindings.values()
    }
}

// Pipeline layout with the shader modules and set layouts it was built from
#[derive(Debug)]
pub struct PipelineLayout {
    pub(crate) raw: vk::PipelineLayout,
    pub(crate) shader_modules: Vec<ShaderModule>,
    pub(crate) set_layouts: BTreeMap<u32, Arc<DescriptorSetLayout>>,
    pub(crate) push_constant_ranges: Vec<vk::PushConstantRange>,
}

impl PipelineLayout {
    pub fn new(
        raw: vk::PipelineLayout,
        shader_modules: Vec<ShaderModule>,
        set_layouts: BTreeMap<u32, Arc<DescriptorSetLayout>>,
        push_constant_ranges: Vec<vk::PushConstantRange>,
    ) -> Self {
        Self {
            raw,
            shader_modules,
            set_layouts,
            push_constant_ranges,
        }
    }

    pub fn raw(&self) -> vk::PipelineLayout {
        self.raw
    }

    pub fn shader_modules(&self) -> &[ShaderModule] {
        &self.shader_modules
    }

    pub fn has_set_layout(&self, set: u32) -> bool {
        self.set_layouts.contains_key(&set)
    }

    pub fn set_layout(&self, set: u32) -> Option<&Arc<DescriptorSetLayout>> {
        self.set_layouts.get(&set)
    }

    pub fn set_layouts(&self) -> &BTreeMap<u32, Arc<DescriptorSetLayout>> {
        &self.set_layouts
    }

    pub fn push_constant_ranges(&self) -> &[vk::PushConstantRange] {
        &self.push_constant_ranges
    }

    // Union of the stages of every push constant range that fully contains [offset, offset + size)
    // A span that overflows u32 matches nothing
    pub fn push_constant_range_stage(&self, offset: u32, size: u32) -> vk::ShaderStageFlags {
        let Some(end) = offset.checked_add(size) else {
            return vk::ShaderStageFlags::empty();
        };

        self.push_constant_ranges
            .iter()
            .filter(|range| offset >= range.offset && u64::from(end) <= u64::from(range.offset) + u64::from(range.size))
            .fold(vk::ShaderStageFlags::empty(), |stages, range| stages | range.stage_flags)
    }
}

// Render pass plus the number of color outputs each of its subpasses writes
#[derive(Debug)]
pub struct RenderPass {
    pub(crate) raw: vk::RenderPass,
    pub(crate) color_output_counts: Vec<u32>,
}

impl RenderPass {
    pub fn new(raw: vk::RenderPass, color_output_counts: Vec<u32>) -> Self {
        Self { raw, color_output_counts }
    }

    pub fn raw(&self) -> vk::RenderPass {
        self.raw
    }

    pub fn subpass_count(&self) -> u32 {
        self.color_output_counts.len() as u32
    }

    pub fn color_output_count(&self, subpass: u32) -> u32 {
        self.color_output_counts.get(subpass as usize).copied().unwrap_or_default()
    }
}

#[derive(Debug)]
pub struct Framebuffer {
    pub(crate) raw: vk::Framebuffer,
    pub(crate) extent: vk::Extent2D,
}

impl Framebuffer {
    pub fn new(raw: vk::Framebuffer, extent: vk::Extent2D) -> Self {
        Self { raw, extent }
    }

    pub fn raw(&self) -> vk::Framebuffer {
        self.raw
    }

    pub fn extent(&self) -> vk::Extent2D {
        self.extent
    }
}

#[derive(Debug)]
pub struct Pipeline {
    pub(crate) raw: vk::Pipeline,
}

impl Pipeline {
    pub fn new(raw: vk::Pipeline) -> Self {
        Self { raw }
    }

    pub fn raw(&self) -> vk::Pipeline {
        self.raw
    }
}

#[derive(Debug)]
pub struct DescriptorSet {
    pub(crate) raw: vk::DescriptorSet,
}

impl DescriptorSet {
    pub fn new(raw: vk::DescriptorSet) -> Self {
        Self { raw }
    }

    pub fn raw(&self) -> vk::DescriptorSet {
        self.raw
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_constant_stage_lookup() {
        let ranges = vec![
            vk::PushConstantRange { stage_flags: vk::ShaderStageFlags::VERTEX, offset: 0, size: 64 },
            vk::PushConstantRange { stage_flags: vk::ShaderStageFlags::FRAGMENT, offset: 64, size: 16 },
        ];
        let layout = PipelineLayout::new(vk::PipelineLayout::null(), Vec::new(), BTreeMap::new(), ranges);

        assert_eq!(layout.push_constant_range_stage(0, 64), vk::ShaderStageFlags::VERTEX);
        assert_eq!(layout.push_constant_range_stage(64, 16), vk::ShaderStageFlags::FRAGMENT);
        assert!(layout.push_constant_range_stage(60, 8).is_empty());
        assert!(layout.push_constant_range_stage(u32::MAX - 1, 4).is_empty());
    }

    #[test]
    fn color_outputs_past_the_last_subpass() {
        let pass = RenderPass::new(vk::RenderPass::null(), vec![2, 1]);
        assert_eq!(pass.subpass_count(), 2);
        assert_eq!(pass.color_output_count(0), 2);
        assert_eq!(pass.color_output_count(5), 0);
    }
}
