use std::sync::Arc;

use ash::vk;
use foldhash::HashMap;
use parking_lot::Mutex;

use super::cache::{content_hash, OnceCache};
use super::descriptor::{write_descriptor_set, DescriptorPool, DescriptorSetKey};
use super::pipeline::{create_compute_pipeline, create_graphics_pipeline};
use super::render_pass::{create_framebuffer, create_render_pass};
use crate::{
    Attachment, BindingMap, DescriptorSet, DescriptorSetLayout, Error, Framebuffer, LoadStoreInfo, Pipeline,
    PipelineState, RenderPass, RenderTarget, ResourceCache, Result, SubpassInfo,
};

// Settings of the device backed resource cache
#[derive(Debug, Clone, Copy)]
pub struct CacheConfig {
    // How many descriptor sets a single descriptor pool can hold before a new one is created
    pub sets_per_pool: u32,

    // Driver side pipeline cache used when compiling pipelines (null to disable)
    pub pipeline_cache: vk::PipelineCache,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            sets_per_pool: 16,
            pipeline_cache: vk::PipelineCache::null(),
        }
    }
}

// Resource cache that creates the missing objects on an ash logical device
// Every object lives until the cache is dropped
pub struct DeviceCache {
    device: ash::Device,
    config: CacheConfig,
    render_passes: OnceCache<RenderPass>,
    framebuffers: OnceCache<Framebuffer>,
    graphics_pipelines: OnceCache<Pipeline>,
    compute_pipelines: OnceCache<Pipeline>,
    descriptor_sets: OnceCache<DescriptorSet>,
    descriptor_pools: Mutex<HashMap<vk::DescriptorSetLayout, DescriptorPool>>,
}

impl DeviceCache {
    pub fn new(device: ash::Device, config: CacheConfig) -> Self {
        Self {
            device,
            config,
            render_passes: OnceCache::default(),
            framebuffers: OnceCache::default(),
            graphics_pipelines: OnceCache::default(),
            compute_pipelines: OnceCache::default(),
            descriptor_sets: OnceCache::default(),
            descriptor_pools: Mutex::new(HashMap::default()),
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }
}

impl ResourceCache for DeviceCache {
    fn request_render_pass(
        &self,
        attachments: &[Attachment],
        load_store_infos: &[LoadStoreInfo],
        subpasses: &[SubpassInfo],
    ) -> Result<Arc<RenderPass>> {
        let key = content_hash(&(attachments, load_store_infos, subpasses));
        self.render_passes.get_or_try_insert(key, || unsafe {
            create_render_pass(&self.device, attachments, load_store_infos, subpasses)
                .map_err(Error::vulkan("Failed to create render pass"))
        })
    }

    fn request_framebuffer(&self, render_target: &RenderTarget, render_pass: &RenderPass) -> Result<Arc<Framebuffer>> {
        let views = render_target.views().iter().map(|view| view.raw).collect::<Vec<_>>();
        let extent = render_target.extent();
        let key = content_hash(&(views, extent.width, extent.height, render_pass.raw()));
        self.framebuffers.get_or_try_insert(key, || unsafe {
            create_framebuffer(&self.device, render_target, render_pass)
                .map_err(Error::vulkan("Failed to create framebuffer"))
        })
    }

    fn request_graphics_pipeline(&self, state: &PipelineState) -> Result<Arc<Pipeline>> {
        let layout = state.pipeline_layout().ok_or(Error::MissingPipelineLayout)?;
        let key = content_hash(state);
        self.graphics_pipelines.get_or_try_insert(key, || unsafe {
            create_graphics_pipeline(&self.device, self.config.pipeline_cache, layout, state)
                .map_err(Error::vulkan("Failed to create graphics pipeline"))
        })
    }

    fn request_compute_pipeline(&self, state: &PipelineState) -> Result<Arc<Pipeline>> {
        let layout = state.pipeline_layout().ok_or(Error::MissingPipelineLayout)?;
        let key = content_hash(&(layout.raw(), layout.shader_modules(), state.specialization_constants()));
        self.compute_pipelines.get_or_try_insert(key, || unsafe {
            create_compute_pipeline(&self.device, self.config.pipeline_cache, layout, state)
                .map_err(Error::vulkan("Failed to create compute pipeline"))
        })
    }

    fn request_descriptor_set(
        &self,
        layout: &DescriptorSetLayout,
        buffer_infos: &BindingMap<vk::DescriptorBufferInfo>,
        image_infos: &BindingMap<vk::DescriptorImageInfo>,
    ) -> Result<Arc<DescriptorSet>> {
        let key = content_hash(&DescriptorSetKey {
            layout: layout.raw(),
            buffer_infos,
            image_infos,
        });

        self.descriptor_sets.get_or_try_insert(key, || unsafe {
            let mut pools = self.descriptor_pools.lock();
            let pool = pools
                .entry(layout.raw())
                .or_insert_with(|| DescriptorPool::new(layout, self.config.sets_per_pool));
            let set = pool
                .allocate(&self.device, layout.raw())
                .map_err(Error::vulkan("Failed to allocate descriptor set"))?;
            Ok(write_descriptor_set(&self.device, set, layout, buffer_infos, image_infos))
        })
    }
}

impl Drop for DeviceCache {
    fn drop(&mut self) {
        log::debug!(
            "Destroying resource cache ({} pipelines, {} framebuffers, {} render passes, {} descriptor sets)",
            self.graphics_pipelines.len() + self.compute_pipelines.len(),
            self.framebuffers.len(),
            self.render_passes.len(),
            self.descriptor_sets.len(),
        );

        unsafe {
            for pipeline in self.graphics_pipelines.drain().into_iter().chain(self.compute_pipelines.drain()) {
                self.device.destroy_pipeline(pipeline.raw(), None);
            }

            for framebuffer in self.framebuffers.drain() {
                self.device.destroy_framebuffer(framebuffer.raw(), None);
            }

            for render_pass in self.render_passes.drain() {
                self.device.destroy_render_pass(render_pass.raw(), None);
            }

            // Sets are released together with their pools
            self.descriptor_sets.drain();
            for (_, pool) in self.descriptor_pools.lock().drain() {
                pool.destroy(&self.device);
            }
        }
    }
}
