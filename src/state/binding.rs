use std::collections::BTreeMap;

use ash::vk;

use crate::{Buffer, ImageView, Sampler};

// A resource requested for a single descriptor array element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceInfo {
    // Uniform or storage buffer range, dynamic or not
    Buffer {
        buffer: Buffer,
        offset: vk::DeviceSize,
        range: vk::DeviceSize,
    },

    // Sampled image with the sampler to read it through
    ImageSampler {
        view: ImageView,
        sampler: Sampler,
    },

    // Image without a sampler (input attachments, storage images)
    Image {
        view: ImageView,
    },
}

// Binding index -> array element -> resource
pub type BindingMap<T> = BTreeMap<u32, BTreeMap<u32, T>>;

// All the resources requested for one descriptor set
#[derive(Debug, Default, Clone)]
pub struct ResourceSet {
    resource_bindings: BindingMap<ResourceInfo>,
    dirty: bool,
}

impl ResourceSet {
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    pub fn resource_bindings(&self) -> &BindingMap<ResourceInfo> {
        &self.resource_bindings
    }

    // Store the resource, returns true if it differs from what was already there
    fn bind(&mut self, binding: u32, array_element: u32, info: ResourceInfo) -> bool {
        let elements = self.resource_bindings.entry(binding).or_default();
        if elements.get(&array_element) == Some(&info) {
            return false;
        }

        elements.insert(array_element, info);
        self.dirty = true;
        true
    }
}

// Resources the caller wants bound, keyed by set index (iterated in ascending order)
#[derive(Debug, Default, Clone)]
pub struct ResourceBindingState {
    set_bindings: BTreeMap<u32, ResourceSet>,
    dirty: bool,
}

impl ResourceBindingState {
    pub fn reset(&mut self) {
        self.set_bindings.clear();
        self.dirty = false;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    pub fn clear_set_dirty(&mut self, set: u32) {
        if let Some(resource_set) = self.set_bindings.get_mut(&set) {
            resource_set.clear_dirty();
        }
    }

    pub fn set_bindings(&self) -> &BTreeMap<u32, ResourceSet> {
        &self.set_bindings
    }

    pub fn bind_buffer(&mut self, buffer: Buffer, offset: vk::DeviceSize, range: vk::DeviceSize, set: u32, binding: u32, array_element: u32) {
        self.bind(set, binding, array_element, ResourceInfo::Buffer { buffer, offset, range });
    }

    pub fn bind_image(&mut self, view: ImageView, sampler: Sampler, set: u32, binding: u32, array_element: u32) {
        self.bind(set, binding, array_element, ResourceInfo::ImageSampler { view, sampler });
    }

    pub fn bind_input(&mut self, view: ImageView, set: u32, binding: u32, array_element: u32) {
        self.bind(set, binding, array_element, ResourceInfo::Image { view });
    }

    fn bind(&mut self, set: u32, binding: u32, array_element: u32, info: ResourceInfo) {
        if self.set_bindings.entry(set).or_default().bind(binding, array_element, info) {
            self.dirty = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ash::vk::Handle;

    fn buffer(raw: u64) -> Buffer {
        Buffer::new(vk::Buffer::from_raw(raw), 256)
    }

    #[test]
    fn binding_marks_set_and_state_dirty() {
        let mut state = ResourceBindingState::default();
        state.bind_buffer(buffer(1), 0, 64, 1, 0, 0);

        assert!(state.is_dirty());
        assert!(state.set_bindings()[&1].is_dirty());
        assert!(!state.set_bindings().contains_key(&0));
    }

    #[test]
    fn rebinding_identical_resource_is_a_no_op() {
        let mut state = ResourceBindingState::default();
        state.bind_buffer(buffer(1), 0, 64, 0, 0, 0);
        state.clear_dirty();
        state.clear_set_dirty(0);

        state.bind_buffer(buffer(1), 0, 64, 0, 0, 0);
        assert!(!state.is_dirty());
        assert!(!state.set_bindings()[&0].is_dirty());

        state.bind_buffer(buffer(1), 64, 64, 0, 0, 0);
        assert!(state.is_dirty());
        assert!(state.set_bindings()[&0].is_dirty());
    }

    #[test]
    fn sets_iterate_in_ascending_order() {
        let mut state = ResourceBindingState::default();
        for set in [3, 0, 2] {
            state.bind_buffer(buffer(set as u64 + 1), 0, 16, set, 0, 0);
        }

        let order: Vec<u32> = state.set_bindings().keys().copied().collect();
        assert_eq!(order, vec![0, 2, 3]);
    }

    #[test]
    fn reset_drops_all_sets() {
        let mut state = ResourceBindingState::default();
        state.bind_buffer(buffer(1), 0, 16, 0, 0, 0);
        state.reset();

        assert!(!state.is_dirty());
        assert!(state.set_bindings().is_empty());
    }
}
