use ash::vk;

use super::Finish;
use crate::{Buffer, Recorder};

// Enum that contains all the types of commands that can be applied to buffers
#[derive(Debug, Clone)]
pub enum BufferCommand {
    BindIndexBuffer {
        buffer: vk::Buffer,
        offset: vk::DeviceSize,
        index_type: vk::IndexType,
    },
    BindVertexBuffers {
        first_binding: u32,
        buffers: Vec<vk::Buffer>,
        offsets: Vec<vk::DeviceSize>,
    },
    CopyBuffer {
        src: vk::Buffer,
        dst: vk::Buffer,
        regions: Vec<vk::BufferCopy>,
    },
    CopyBufferToImage {
        src: vk::Buffer,
        dst: vk::Image,
        layout: vk::ImageLayout,
        regions: Vec<vk::BufferImageCopy>,
    },
    CopyImageToBuffer {
        src: vk::Image,
        layout: vk::ImageLayout,
        dst: vk::Buffer,
        regions: Vec<vk::BufferImageCopy>,
    },
    FillBuffer {
        dst: vk::Buffer,
        offset: vk::DeviceSize,
        size: vk::DeviceSize,
        data: u32,
    },
    UpdateBuffer {
        dst: vk::Buffer,
        offset: vk::DeviceSize,
        data: Vec<u8>,
    },
}

impl Finish for BufferCommand {
    unsafe fn finish(self, device: &ash::Device, buffer: vk::CommandBuffer) {
        match self {
            BufferCommand::BindIndexBuffer { buffer: index, offset, index_type } => {
                device.cmd_bind_index_buffer(buffer, index, offset, index_type)
            }
            BufferCommand::BindVertexBuffers { first_binding, buffers, offsets } => {
                device.cmd_bind_vertex_buffers(buffer, first_binding, &buffers, &offsets)
            }
            BufferCommand::CopyBuffer { src, dst, regions } => device.cmd_copy_buffer(buffer, src, dst, &regions),
            BufferCommand::CopyBufferToImage { src, dst, layout, regions } => {
                device.cmd_copy_buffer_to_image(buffer, src, dst, layout, &regions)
            }
            BufferCommand::CopyImageToBuffer { src, layout, dst, regions } => {
                device.cmd_copy_image_to_buffer(buffer, src, layout, dst, &regions)
            }
            BufferCommand::FillBuffer { dst, offset, size, data } => device.cmd_fill_buffer(buffer, dst, offset, size, data),
            BufferCommand::UpdateBuffer { dst, offset, data } => device.cmd_update_buffer(buffer, dst, offset, &data),
        }
    }
}

impl Recorder<'_> {
    // Bind an index buffer, takes effect immediately
    pub fn bind_index_buffer(&mut self, buffer: &Buffer, offset: vk::DeviceSize, index_type: vk::IndexType) {
        self.record(BufferCommand::BindIndexBuffer {
            buffer: buffer.raw,
            offset,
            index_type,
        });
    }

    // Bind vertex buffers starting at the given binding, one offset per buffer
    pub fn bind_vertex_buffers(&mut self, first_binding: u32, buffers: &[&Buffer], offsets: &[vk::DeviceSize]) {
        debug_assert_eq!(buffers.len(), offsets.len());
        self.record(BufferCommand::BindVertexBuffers {
            first_binding,
            buffers: buffers.iter().map(|buffer| buffer.raw).collect(),
            offsets: offsets.to_vec(),
        });
    }

    // Copy the first `size` bytes of a buffer to another buffer in GPU memory
    pub fn copy_buffer(&mut self, src: &Buffer, dst: &Buffer, size: vk::DeviceSize) {
        self.record(BufferCommand::CopyBuffer {
            src: src.raw,
            dst: dst.raw,
            regions: vec![vk::BufferCopy {
                src_offset: 0,
                dst_offset: 0,
                size,
            }],
        });
    }

    // The image must be in TRANSFER_DST_OPTIMAL
    pub fn copy_buffer_to_image(&mut self, src: &Buffer, dst: vk::Image, regions: &[vk::BufferImageCopy]) {
        self.record(BufferCommand::CopyBufferToImage {
            src: src.raw,
            dst,
            layout: vk::ImageLayout::TRANSFER_DST_OPTIMAL,
            regions: regions.to_vec(),
        });
    }

    // The image must be in TRANSFER_SRC_OPTIMAL
    pub fn copy_image_to_buffer(&mut self, src: vk::Image, dst: &Buffer, regions: &[vk::BufferImageCopy]) {
        self.record(BufferCommand::CopyImageToBuffer {
            src,
            layout: vk::ImageLayout::TRANSFER_SRC_OPTIMAL,
            dst: dst.raw,
            regions: regions.to_vec(),
        });
    }

    // Fill a buffer range with a repeated 32 bit value
    pub fn fill_buffer(&mut self, dst: &Buffer, offset: vk::DeviceSize, size: vk::DeviceSize, data: u32) {
        self.record(BufferCommand::FillBuffer {
            dst: dst.raw,
            offset,
            size,
            data,
        });
    }

    // Update the buffer using memory that is directly stored within the command buffer
    pub fn update_buffer(&mut self, dst: &Buffer, offset: vk::DeviceSize, data: &[u8]) {
        debug_assert!(data.len() % 4 == 0 && data.len() <= 65536, "inline updates are limited to 64KiB in multiples of 4");
        self.record(BufferCommand::UpdateBuffer {
            dst: dst.raw,
            offset,
            data: data.to_vec(),
        });
    }
}
