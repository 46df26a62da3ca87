mod cache;
mod device;
mod error;
mod format;
mod queue;
mod recorder;
mod render_target;
mod resources;
mod state;

pub use cache::*;
pub use device::*;
pub use error::{Error, Result};
pub use format::*;
pub use queue::*;
pub use recorder::*;
pub use render_target::*;
pub use resources::*;
pub use state::*;
