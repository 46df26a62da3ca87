use ash::vk;

use crate::format::is_depth_stencil_format;
use crate::ImageView;

// Description of a render pass attachment slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Attachment {
    pub format: vk::Format,
    pub samples: vk::SampleCountFlags,
    pub usage: vk::ImageUsageFlags,
}

impl Attachment {
    pub fn new(format: vk::Format) -> Self {
        let usage = if is_depth_stencil_format(format) {
            vk::ImageUsageFlags::DEPTH_STENCIL_ATTACHMENT
        } else {
            vk::ImageUsageFlags::COLOR_ATTACHMENT
        };

        Self {
            format,
            samples: vk::SampleCountFlags::TYPE_1,
            usage,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LoadStoreInfo {
    pub load_op: vk::AttachmentLoadOp,
    pub store_op: vk::AttachmentStoreOp,
}

impl Default for LoadStoreInfo {
    fn default() -> Self {
        Self {
            load_op: vk::AttachmentLoadOp::CLEAR,
            store_op: vk::AttachmentStoreOp::STORE,
        }
    }
}

// Attachment indices a subpass reads as inputs and writes as outputs
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct SubpassInfo {
    pub input_attachments: Vec<u32>,
    pub output_attachments: Vec<u32>,
}

// Anything that can describe which attachments a subpass consumes and produces
pub trait Subpass {
    fn input_attachments(&self) -> &[u32];
    fn output_attachments(&self) -> &[u32];
}

impl Subpass for SubpassInfo {
    fn input_attachments(&self) -> &[u32] {
        &self.input_attachments
    }

    fn output_attachments(&self) -> &[u32] {
        &self.output_attachments
    }
}

impl<T: Subpass + ?Sized> Subpass for Box<T> {
    fn input_attachments(&self) -> &[u32] {
        (**self).input_attachments()
    }

    fn output_attachments(&self) -> &[u32] {
        (**self).output_attachments()
    }
}

impl<T: Subpass + ?Sized> Subpass for &T {
    fn input_attachments(&self) -> &[u32] {
        (**self).input_attachments()
    }

    fn output_attachments(&self) -> &[u32] {
        (**self).output_attachments()
    }
}

// Set of image views rendered into by a render pass, all sharing one extent
#[derive(Debug, Clone)]
pub struct RenderTarget {
    pub(crate) extent: vk::Extent2D,
    pub(crate) views: Vec<ImageView>,
    pub(crate) attachments: Vec<Attachment>,
}

impl RenderTarget {
    pub fn new(extent: vk::Extent2D, views: Vec<ImageView>) -> Self {
        let attachments = views.iter().map(|view| Attachment::new(view.format)).collect();
        Self {
            extent,
            views,
            attachments,
        }
    }

    // Override the derived attachment descriptions (multisampling, extra usage flags)
    pub fn with_attachments(mut self, attachments: Vec<Attachment>) -> Self {
        debug_assert_eq!(attachments.len(), self.views.len());
        self.attachments = attachments;
        self
    }

    pub fn extent(&self) -> vk::Extent2D {
        self.extent
    }

    pub fn views(&self) -> &[ImageView] {
        &self.views
    }

    pub fn attachments(&self) -> &[Attachment] {
        &self.attachments
    }
}
