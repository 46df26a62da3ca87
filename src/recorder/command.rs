use ash::vk;

use super::{BarrierCommand, BindCommand, BufferCommand, DrawCommand, DynamicStateCommand, ImageCommand, RenderPassCommand};

// Anything that can be written into a raw command buffer
pub trait Finish {
    unsafe fn finish(self, device: &ash::Device, buffer: vk::CommandBuffer);
}

// Every command a recorder can emit, grouped by what it touches
#[derive(Debug, Clone)]
pub enum Command {
    Bind(BindCommand),
    Buffer(BufferCommand),
    Image(ImageCommand),
    Barrier(BarrierCommand),
    RenderPass(RenderPassCommand),
    DynamicState(DynamicStateCommand),
    Draw(DrawCommand),
}

impl Finish for Command {
    unsafe fn finish(self, device: &ash::Device, buffer: vk::CommandBuffer) {
        match self {
            Command::Bind(command) => command.finish(device, buffer),
            Command::Buffer(command) => command.finish(device, buffer),
            Command::Image(command) => command.finish(device, buffer),
            Command::Barrier(command) => command.finish(device, buffer),
            Command::RenderPass(command) => command.finish(device, buffer),
            Command::DynamicState(command) => command.finish(device, buffer),
            Command::Draw(command) => command.finish(device, buffer),
        }
    }
}

macro_rules! impl_into_command {
    ($($variant:ident => $ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Command {
                fn from(command: $ty) -> Self {
                    Command::$variant(command)
                }
            }
        )*
    };
}

impl_into_command! {
    Bind => BindCommand,
    Buffer => BufferCommand,
    Image => ImageCommand,
    Barrier => BarrierCommand,
    RenderPass => RenderPassCommand,
    DynamicState => DynamicStateCommand,
    Draw => DrawCommand,
}
