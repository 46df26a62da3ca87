mod backend;
mod device;

pub use backend::*;
pub use device::*;
