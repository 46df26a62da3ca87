mod binding;
mod layout;
mod pipeline;

pub use binding::*;
pub use layout::*;
pub use pipeline::*;
