mod barrier;
mod bind;
mod buffer;
mod command;
mod draw;
mod dynamic;
mod flush;
mod image;
mod recorder;
mod render_pass;

pub use barrier::*;
pub use bind::*;
pub use buffer::*;
pub use command::*;
pub use draw::*;
pub use dynamic::*;
pub use image::*;
pub use recorder::*;
pub use render_pass::*;
