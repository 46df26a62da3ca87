use ash::vk;

use super::Finish;
use crate::{Buffer, ImageView, Recorder};

// Synchronization and layout transition of a single image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageMemoryBarrier {
    pub src_stage_mask: vk::PipelineStageFlags,
    pub dst_stage_mask: vk::PipelineStageFlags,
    pub src_access_mask: vk::AccessFlags,
    pub dst_access_mask: vk::AccessFlags,
    pub old_layout: vk::ImageLayout,
    pub new_layout: vk::ImageLayout,
}

impl Default for ImageMemoryBarrier {
    fn default() -> Self {
        Self {
            src_stage_mask: vk::PipelineStageFlags::BOTTOM_OF_PIPE,
            dst_stage_mask: vk::PipelineStageFlags::TOP_OF_PIPE,
            src_access_mask: vk::AccessFlags::empty(),
            dst_access_mask: vk::AccessFlags::empty(),
            old_layout: vk::ImageLayout::UNDEFINED,
            new_layout: vk::ImageLayout::UNDEFINED,
        }
    }
}

// Synchronization of a buffer range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferMemoryBarrier {
    pub src_stage_mask: vk::PipelineStageFlags,
    pub dst_stage_mask: vk::PipelineStageFlags,
    pub src_access_mask: vk::AccessFlags,
    pub dst_access_mask: vk::AccessFlags,
}

impl Default for BufferMemoryBarrier {
    fn default() -> Self {
        Self {
            src_stage_mask: vk::PipelineStageFlags::BOTTOM_OF_PIPE,
            dst_stage_mask: vk::PipelineStageFlags::TOP_OF_PIPE,
            src_access_mask: vk::AccessFlags::empty(),
            dst_access_mask: vk::AccessFlags::empty(),
        }
    }
}

// Pipeline barriers are written right away, there is no batching or tracking
#[derive(Debug, Clone)]
pub enum BarrierCommand {
    Image {
        image: vk::Image,
        subresource_range: vk::ImageSubresourceRange,
        barrier: ImageMemoryBarrier,
    },
    Buffer {
        buffer: vk::Buffer,
        offset: vk::DeviceSize,
        size: vk::DeviceSize,
        barrier: BufferMemoryBarrier,
    },
}

impl Finish for BarrierCommand {
    unsafe fn finish(self, device: &ash::Device, buffer: vk::CommandBuffer) {
        match self {
            BarrierCommand::Image { image, subresource_range, barrier } => {
                let image_barrier = vk::ImageMemoryBarrier::default()
                    .src_access_mask(barrier.src_access_mask)
                    .dst_access_mask(barrier.dst_access_mask)
                    .old_layout(barrier.old_layout)
                    .new_layout(barrier.new_layout)
                    .src_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
                    .dst_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
                    .image(image)
                    .subresource_range(subresource_range);

                device.cmd_pipeline_barrier(
                    buffer,
                    barrier.src_stage_mask,
                    barrier.dst_stage_mask,
                    vk::DependencyFlags::empty(),
                    &[],
                    &[],
                    &[image_barrier],
                );
            }
            BarrierCommand::Buffer { buffer: target, offset, size, barrier } => {
                let buffer_barrier = vk::BufferMemoryBarrier::default()
                    .src_access_mask(barrier.src_access_mask)
                    .dst_access_mask(barrier.dst_access_mask)
                    .src_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
                    .dst_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
                    .buffer(target)
                    .offset(offset)
                    .size(size);

                device.cmd_pipeline_barrier(
                    buffer,
                    barrier.src_stage_mask,
                    barrier.dst_stage_mask,
                    vk::DependencyFlags::empty(),
                    &[],
                    &[buffer_barrier],
                    &[],
                );
            }
        }
    }
}

impl Recorder<'_> {
    // Barrier over every subresource the view covers
    pub fn image_memory_barrier(&mut self, view: &ImageView, barrier: &ImageMemoryBarrier) {
        self.record(BarrierCommand::Image {
            image: view.image,
            subresource_range: view.subresource_range,
            barrier: *barrier,
        });
    }

    pub fn buffer_memory_barrier(&mut self, buffer: &Buffer, offset: vk::DeviceSize, size: vk::DeviceSize, barrier: &BufferMemoryBarrier) {
        self.record(BarrierCommand::Buffer {
            buffer: buffer.raw,
            offset,
            size,
            barrier: *barrier,
        });
    }
}
