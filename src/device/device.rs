use std::sync::Arc;

use crate::{Backend, CacheConfig, DeviceCache, ResourceCache};

// This is a logical device as seen by the recorders: the raw command entry points
// plus the cache that deduplicates every pipeline, render pass and descriptor set
pub struct Device {
    pub(crate) backend: Arc<dyn Backend>,
    pub(crate) cache: Arc<dyn ResourceCache>,
}

impl Device {
    // Combine a backend and a resource cache
    pub fn new(backend: Arc<dyn Backend>, cache: Arc<dyn ResourceCache>) -> Self {
        Self { backend, cache }
    }

    // Wrap an ash logical device, objects get created on demand by a DeviceCache
    pub fn from_raw(device: ash::Device, config: CacheConfig) -> Self {
        let cache = DeviceCache::new(device.clone(), config);
        log::debug!("Created the recording device with its resource cache");

        Self {
            backend: Arc::new(device),
            cache: Arc::new(cache),
        }
    }

    pub fn backend(&self) -> &dyn Backend {
        self.backend.as_ref()
    }

    pub fn resource_cache(&self) -> &dyn ResourceCache {
        self.cache.as_ref()
    }
}
