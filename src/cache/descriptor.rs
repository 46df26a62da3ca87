use std::hash::{Hash, Hasher};

use ash::prelude::VkResult;
use ash::vk;

use crate::{BindingMap, DescriptorSet, DescriptorSetLayout};

// Growing list of descriptor pools that can only allocate sets of one layout
pub(crate) struct DescriptorPool {
    pool_sizes: Vec<vk::DescriptorPoolSize>,
    sets_per_pool: u32,
    pools: Vec<vk::DescriptorPool>,
    allocated: u32,
}

impl DescriptorPool {
    pub(crate) fn new(layout: &DescriptorSetLayout, sets_per_pool: u32) -> Self {
        // Sum the descriptor counts per type, scaled by how many sets fit in one pool
        let mut pool_sizes: Vec<vk::DescriptorPoolSize> = Vec::new();
        for binding in layout.bindings() {
            let count = binding.descriptor_count * sets_per_pool;
            match pool_sizes.iter_mut().find(|size| size.ty == binding.descriptor_type) {
                Some(size) => size.descriptor_count += count,
                None => pool_sizes.push(vk::DescriptorPoolSize {
                    ty: binding.descriptor_type,
                    descriptor_count: count,
                }),
            }
        }

        Self {
            pool_sizes,
            sets_per_pool,
            pools: Vec::new(),
            allocated: 0,
        }
    }

    // Allocate a set, creating a fresh pool when the current one is full
    pub(crate) unsafe fn allocate(&mut self, device: &ash::Device, layout: vk::DescriptorSetLayout) -> VkResult<vk::DescriptorSet> {
        if self.pools.is_empty() || self.allocated == self.sets_per_pool {
            let create_info = vk::DescriptorPoolCreateInfo::default()
                .max_sets(self.sets_per_pool)
                .pool_sizes(&self.pool_sizes);
            let pool = device.create_descriptor_pool(&create_info, None)?;
            log::debug!("Created descriptor pool {:?} for layout {:?}", pool, layout);

            self.pools.push(pool);
            self.allocated = 0;
        }

        let layouts = [layout];
        let allocate_info = vk::DescriptorSetAllocateInfo::default()
            .descriptor_pool(self.pools.last().copied().unwrap_or_default())
            .set_layouts(&layouts);
        let sets = device.allocate_descriptor_sets(&allocate_info)?;
        self.allocated += 1;
        Ok(sets[0])
    }

    pub(crate) unsafe fn destroy(self, device: &ash::Device) {
        for pool in self.pools {
            device.destroy_descriptor_pool(pool, None);
        }
    }
}

// Write buffer and image infos into a freshly allocated set
pub(crate) unsafe fn write_descriptor_set(
    device: &ash::Device,
    set: vk::DescriptorSet,
    layout: &DescriptorSetLayout,
    buffer_infos: &BindingMap<vk::DescriptorBufferInfo>,
    image_infos: &BindingMap<vk::DescriptorImageInfo>,
) -> DescriptorSet {
    let mut writes = Vec::new();

    for (&binding, elements) in buffer_infos {
        let Some(declared) = layout.binding(binding) else { continue };
        for (&element, info) in elements {
            writes.push(
                vk::WriteDescriptorSet::default()
                    .dst_set(set)
                    .dst_binding(binding)
                    .dst_array_element(element)
                    .descriptor_type(declared.descriptor_type)
                    .buffer_info(std::slice::from_ref(info)),
            );
        }
    }

    for (&binding, elements) in image_infos {
        let Some(declared) = layout.binding(binding) else { continue };
        for (&element, info) in elements {
            writes.push(
                vk::WriteDescriptorSet::default()
                    .dst_set(set)
                    .dst_binding(binding)
                    .dst_array_element(element)
                    .descriptor_type(declared.descriptor_type)
                    .image_info(std::slice::from_ref(info)),
            );
        }
    }

    device.update_descriptor_sets(&writes, &[]);
    DescriptorSet::new(set)
}

// Content key of a descriptor set request
pub(crate) struct DescriptorSetKey<'a> {
    pub layout: vk::DescriptorSetLayout,
    pub buffer_infos: &'a BindingMap<vk::DescriptorBufferInfo>,
    pub image_infos: &'a BindingMap<vk::DescriptorImageInfo>,
}

impl Hash for DescriptorSetKey<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.layout.hash(state);

        for (binding, elements) in self.buffer_infos {
            for (element, info) in elements {
                (binding, element, info.buffer, info.offset, info.range).hash(state);
            }
        }

        // Separates buffer and image entries that share binding numbers
        u32::MAX.hash(state);

        for (binding, elements) in self.image_infos {
            for (element, info) in elements {
                (binding, element, info.sampler, info.image_view, info.image_layout).hash(state);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::content_hash;
    use crate::LayoutBinding;
    use ash::vk::Handle;

    #[test]
    fn pool_sizes_are_summed_per_type() {
        let layout = DescriptorSetLayout::new(
            vk::DescriptorSetLayout::null(),
            [
                LayoutBinding { binding: 0, descriptor_type: vk::DescriptorType::UNIFORM_BUFFER, descriptor_count: 1, stage_flags: vk::ShaderStageFlags::VERTEX },
                LayoutBinding { binding: 1, descriptor_type: vk::DescriptorType::UNIFORM_BUFFER, descriptor_count: 2, stage_flags: vk::ShaderStageFlags::VERTEX },
                LayoutBinding { binding: 2, descriptor_type: vk::DescriptorType::COMBINED_IMAGE_SAMPLER, descriptor_count: 1, stage_flags: vk::ShaderStageFlags::FRAGMENT },
            ],
        );

        let pool = DescriptorPool::new(&layout, 8);
        assert_eq!(pool.pool_sizes.len(), 2);
        assert_eq!(pool.pool_sizes[0].descriptor_count, 24);
        assert_eq!(pool.pool_sizes[1].descriptor_count, 8);
    }

    #[test]
    fn keys_differ_by_offset() {
        let mut a = BindingMap::new();
        a.entry(0).or_default().insert(0, vk::DescriptorBufferInfo { buffer: vk::Buffer::from_raw(1), offset: 0, range: 16 });
        let mut b = a.clone();
        b.entry(0).or_default().insert(0, vk::DescriptorBufferInfo { buffer: vk::Buffer::from_raw(1), offset: 16, range: 16 });
        let images = BindingMap::new();

        let key = |buffers: &BindingMap<vk::DescriptorBufferInfo>| content_hash(&DescriptorSetKey { layout: vk::DescriptorSetLayout::null(), buffer_infos: buffers, image_infos: &images });
        assert_eq!(key(&a), key(&a.clone()));
        assert_ne!(key(&a), key(&b));
    }
}
