use ash::vk;

// Check if the format carries a depth or stencil aspect
pub fn is_depth_stencil_format(format: vk::Format) -> bool {
    matches!(
        format,
        vk::Format::D16_UNORM
            | vk::Format::X8_D24_UNORM_PACK32
            | vk::Format::D32_SFLOAT
            | vk::Format::S8_UINT
            | vk::Format::D16_UNORM_S8_UINT
            | vk::Format::D24_UNORM_S8_UINT
            | vk::Format::D32_SFLOAT_S8_UINT
    )
}

// Descriptor types that are backed by a buffer range
pub fn is_buffer_descriptor_type(ty: vk::DescriptorType) -> bool {
    matches!(
        ty,
        vk::DescriptorType::UNIFORM_BUFFER
            | vk::DescriptorType::STORAGE_BUFFER
            | vk::DescriptorType::UNIFORM_BUFFER_DYNAMIC
            | vk::DescriptorType::STORAGE_BUFFER_DYNAMIC
    )
}

// Buffer descriptor types whose offset is supplied at bind time
pub fn is_dynamic_buffer_descriptor_type(ty: vk::DescriptorType) -> bool {
    matches!(
        ty,
        vk::DescriptorType::UNIFORM_BUFFER_DYNAMIC | vk::DescriptorType::STORAGE_BUFFER_DYNAMIC
    )
}

// Image layout a descriptor of this type expects, or None if images can't be bound to it
pub fn descriptor_image_layout(ty: vk::DescriptorType, format: vk::Format) -> Option<vk::ImageLayout> {
    match ty {
        vk::DescriptorType::COMBINED_IMAGE_SAMPLER | vk::DescriptorType::INPUT_ATTACHMENT => {
            if is_depth_stencil_format(format) {
                Some(vk::ImageLayout::DEPTH_STENCIL_READ_ONLY_OPTIMAL)
            } else {
                Some(vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL)
            }
        }
        vk::DescriptorType::STORAGE_IMAGE => Some(vk::ImageLayout::GENERAL),
        _ => None,
    }
}
