mod cache;
mod descriptor;
mod device;
mod pipeline;
mod render_pass;

pub use cache::ResourceCache;
pub(crate) use cache::content_hash;
pub use device::{CacheConfig, DeviceCache};
