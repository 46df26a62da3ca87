use ash::vk;

use super::Finish;
use crate::{Buffer, Recorder, Result};

// Draws and dispatches, recorded after the lazy state flush
#[derive(Debug, Clone)]
pub enum DrawCommand {
    Draw {
        vertex_count: u32,
        instance_count: u32,
        first_vertex: u32,
        first_instance: u32,
    },
    DrawIndexed {
        index_count: u32,
        instance_count: u32,
        first_index: u32,
        vertex_offset: i32,
        first_instance: u32,
    },
    DrawIndirect {
        buffer: vk::Buffer,
        offset: vk::DeviceSize,
        draw_count: u32,
        stride: u32,
    },
    DrawIndexedIndirect {
        buffer: vk::Buffer,
        offset: vk::DeviceSize,
        draw_count: u32,
        stride: u32,
    },
    Dispatch {
        group_count_x: u32,
        group_count_y: u32,
        group_count_z: u32,
    },
    DispatchIndirect {
        buffer: vk::Buffer,
        offset: vk::DeviceSize,
    },
}

impl Finish for DrawCommand {
    unsafe fn finish(self, device: &ash::Device, buffer: vk::CommandBuffer) {
        match self {
            DrawCommand::Draw { vertex_count, instance_count, first_vertex, first_instance } => {
                device.cmd_draw(buffer, vertex_count, instance_count, first_vertex, first_instance)
            }
            DrawCommand::DrawIndexed { index_count, instance_count, first_index, vertex_offset, first_instance } => {
                device.cmd_draw_indexed(buffer, index_count, instance_count, first_index, vertex_offset, first_instance)
            }
            DrawCommand::DrawIndirect { buffer: src, offset, draw_count, stride } => {
                device.cmd_draw_indirect(buffer, src, offset, draw_count, stride)
            }
            DrawCommand::DrawIndexedIndirect { buffer: src, offset, draw_count, stride } => {
                device.cmd_draw_indexed_indirect(buffer, src, offset, draw_count, stride)
            }
            DrawCommand::Dispatch { group_count_x, group_count_y, group_count_z } => {
                device.cmd_dispatch(buffer, group_count_x, group_count_y, group_count_z)
            }
            DrawCommand::DispatchIndirect { buffer: src, offset } => device.cmd_dispatch_indirect(buffer, src, offset),
        }
    }
}

impl Recorder<'_> {
    pub fn draw(&mut self, vertex_count: u32, instance_count: u32, first_vertex: u32, first_instance: u32) -> Result<()> {
        self.flush(vk::PipelineBindPoint::GRAPHICS)?;
        self.record(DrawCommand::Draw {
            vertex_count,
            instance_count,
            first_vertex,
            first_instance,
        });
        Ok(())
    }

    pub fn draw_indexed(
        &mut self,
        index_count: u32,
        instance_count: u32,
        first_index: u32,
        vertex_offset: i32,
        first_instance: u32,
    ) -> Result<()> {
        self.flush(vk::PipelineBindPoint::GRAPHICS)?;
        self.record(DrawCommand::DrawIndexed {
            index_count,
            instance_count,
            first_index,
            vertex_offset,
            first_instance,
        });
        Ok(())
    }

    // Draw parameters are read from vk::DrawIndirectCommand entries in the buffer
    pub fn draw_indirect(&mut self, buffer: &Buffer, offset: vk::DeviceSize, draw_count: u32, stride: u32) -> Result<()> {
        self.flush(vk::PipelineBindPoint::GRAPHICS)?;
        self.record(DrawCommand::DrawIndirect {
            buffer: buffer.raw,
            offset,
            draw_count,
            stride,
        });
        Ok(())
    }

    pub fn draw_indexed_indirect(&mut self, buffer: &Buffer, offset: vk::DeviceSize, draw_count: u32, stride: u32) -> Result<()> {
        self.flush(vk::PipelineBindPoint::GRAPHICS)?;
        self.record(DrawCommand::DrawIndexedIndirect {
            buffer: buffer.raw,
            offset,
            draw_count,
            stride,
        });
        Ok(())
    }

    pub fn dispatch(&mut self, group_count_x: u32, group_count_y: u32, group_count_z: u32) -> Result<()> {
        self.flush(vk::PipelineBindPoint::COMPUTE)?;
        self.record(DrawCommand::Dispatch {
            group_count_x,
            group_count_y,
            group_count_z,
        });
        Ok(())
    }

    pub fn dispatch_indirect(&mut self, buffer: &Buffer, offset: vk::DeviceSize) -> Result<()> {
        self.flush(vk::PipelineBindPoint::COMPUTE)?;
        self.record(DrawCommand::DispatchIndirect {
            buffer: buffer.raw,
            offset,
        });
        Ok(())
    }
}
