use ash::vk;

use super::Finish;
use crate::Recorder;

// Image to image transfers. Sources are read in TRANSFER_SRC_OPTIMAL, destinations written in TRANSFER_DST_OPTIMAL
#[derive(Debug, Clone)]
pub enum ImageCommand {
    CopyImage {
        src: vk::Image,
        dst: vk::Image,
        regions: Vec<vk::ImageCopy>,
    },
    BlitImage {
        src: vk::Image,
        dst: vk::Image,
        regions: Vec<vk::ImageBlit>,
        filter: vk::Filter,
    },
}

impl Finish for ImageCommand {
    unsafe fn finish(self, device: &ash::Device, buffer: vk::CommandBuffer) {
        match self {
            ImageCommand::CopyImage { src, dst, regions } => device.cmd_copy_image(
                buffer,
                src,
                vk::ImageLayout::TRANSFER_SRC_OPTIMAL,
                dst,
                vk::ImageLayout::TRANSFER_DST_OPTIMAL,
                &regions,
            ),
            ImageCommand::BlitImage { src, dst, regions, filter } => device.cmd_blit_image(
                buffer,
                src,
                vk::ImageLayout::TRANSFER_SRC_OPTIMAL,
                dst,
                vk::ImageLayout::TRANSFER_DST_OPTIMAL,
                &regions,
                filter,
            ),
        }
    }
}

impl Recorder<'_> {
    pub fn copy_image(&mut self, src: vk::Image, dst: vk::Image, regions: &[vk::ImageCopy]) {
        self.record(ImageCommand::CopyImage {
            src,
            dst,
            regions: regions.to_vec(),
        });
    }

    // Scaled copy with nearest filtering
    pub fn blit_image(&mut self, src: vk::Image, dst: vk::Image, regions: &[vk::ImageBlit]) {
        self.record(ImageCommand::BlitImage {
            src,
            dst,
            regions: regions.to_vec(),
            filter: vk::Filter::NEAREST,
        });
    }
}
