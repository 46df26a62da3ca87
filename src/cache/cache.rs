use std::hash::{BuildHasher, Hash};
use std::sync::Arc;

use ash::vk;
use foldhash::HashMap;
use parking_lot::RwLock;

use crate::{
    Attachment, BindingMap, DescriptorSet, DescriptorSetLayout, Framebuffer, LoadStoreInfo, Pipeline, PipelineState,
    RenderPass, RenderTarget, Result, SubpassInfo,
};

// Content addressed source of every expensive object the recorder needs
// Requests with identical content must return the same object
pub trait ResourceCache: Send + Sync {
    fn request_render_pass(
        &self,
        attachments: &[Attachment],
        load_store_infos: &[LoadStoreInfo],
        subpasses: &[SubpassInfo],
    ) -> Result<Arc<RenderPass>>;

    fn request_framebuffer(&self, render_target: &RenderTarget, render_pass: &RenderPass) -> Result<Arc<Framebuffer>>;

    fn request_graphics_pipeline(&self, state: &PipelineState) -> Result<Arc<Pipeline>>;

    fn request_compute_pipeline(&self, state: &PipelineState) -> Result<Arc<Pipeline>>;

    fn request_descriptor_set(
        &self,
        layout: &DescriptorSetLayout,
        buffer_infos: &BindingMap<vk::DescriptorBufferInfo>,
        image_infos: &BindingMap<vk::DescriptorImageInfo>,
    ) -> Result<Arc<DescriptorSet>>;
}

// Stable 64-bit content hash used as the key of every cache map
pub(crate) fn content_hash<T: Hash + ?Sized>(value: &T) -> u64 {
    foldhash::quality::FixedState::default().hash_one(value)
}

// Insert-once map from content hash to a shared object
// Readers only contend when an entry is missing, creation happens under the write lock
// so two threads never build the same object twice
pub(crate) struct OnceCache<V> {
    inner: RwLock<HashMap<u64, Arc<V>>>,
}

impl<V> Default for OnceCache<V> {
    fn default() -> Self {
        Self {
            inner: RwLock::new(HashMap::default()),
        }
    }
}

impl<V> OnceCache<V> {
    pub(crate) fn get(&self, key: u64) -> Option<Arc<V>> {
        self.inner.read().get(&key).cloned()
    }

    // Return the object stored under key, or create and store it with f
    // If f fails the entry stays vacant
    pub(crate) fn get_or_try_insert(&self, key: u64, f: impl FnOnce() -> Result<V>) -> Result<Arc<V>> {
        if let Some(value) = self.get(key) {
            return Ok(value);
        }

        let mut inner = self.inner.write();
        if let Some(value) = inner.get(&key) {
            return Ok(value.clone());
        }

        let value = Arc::new(f()?);
        inner.insert(key, value.clone());
        Ok(value)
    }

    pub(crate) fn len(&self) -> usize {
        self.inner.read().len()
    }

    // Take every stored object out of the cache
    pub(crate) fn drain(&self) -> Vec<Arc<V>> {
        self.inner.write().drain().map(|(_, value)| value).collect()
    }
}
