use ash::prelude::VkResult;
use ash::vk;

use crate::format::is_depth_stencil_format;
use crate::{Attachment, Framebuffer, LoadStoreInfo, RenderPass, RenderTarget, SubpassInfo};

// Attachment references of a single subpass
#[derive(Default)]
struct SubpassReferences {
    inputs: Vec<vk::AttachmentReference>,
    colors: Vec<vk::AttachmentReference>,
    depth_stencil: Option<vk::AttachmentReference>,
}

impl SubpassReferences {
    fn new(attachments: &[Attachment], info: &SubpassInfo) -> Self {
        let is_depth = |index: u32| {
            attachments
                .get(index as usize)
                .map(|attachment| is_depth_stencil_format(attachment.format))
                .unwrap_or(false)
        };

        let inputs = info
            .input_attachments
            .iter()
            .map(|&attachment| vk::AttachmentReference {
                attachment,
                layout: if is_depth(attachment) {
                    vk::ImageLayout::DEPTH_STENCIL_READ_ONLY_OPTIMAL
                } else {
                    vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL
                },
            })
            .collect();

        let colors = info
            .output_attachments
            .iter()
            .filter(|&&attachment| !is_depth(attachment))
            .map(|&attachment| vk::AttachmentReference {
                attachment,
                layout: vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL,
            })
            .collect();

        // Prefer a depth attachment the subpass writes explicitly, otherwise use the first one
        // it doesn't read as an input
        let depth_stencil = info
            .output_attachments
            .iter()
            .copied()
            .find(|&attachment| is_depth(attachment))
            .or_else(|| (0..attachments.len() as u32).find(|&index| is_depth(index) && !info.input_attachments.contains(&index)))
            .map(|attachment| vk::AttachmentReference {
                attachment,
                layout: vk::ImageLayout::DEPTH_STENCIL_ATTACHMENT_OPTIMAL,
            });

        Self {
            inputs,
            colors,
            depth_stencil,
        }
    }
}

// Create a render pass from attachment formats, load/store ops and subpass attachment usage
pub(crate) unsafe fn create_render_pass(
    device: &ash::Device,
    attachments: &[Attachment],
    load_store_infos: &[LoadStoreInfo],
    subpasses: &[SubpassInfo],
) -> VkResult<RenderPass> {
    let descriptions = attachments
        .iter()
        .enumerate()
        .map(|(i, attachment)| {
            let ops = load_store_infos.get(i).copied().unwrap_or_default();
            let depth = is_depth_stencil_format(attachment.format);
            vk::AttachmentDescription::default()
                .format(attachment.format)
                .samples(attachment.samples)
                .load_op(ops.load_op)
                .store_op(ops.store_op)
                .stencil_load_op(vk::AttachmentLoadOp::DONT_CARE)
                .stencil_store_op(vk::AttachmentStoreOp::DONT_CARE)
                .initial_layout(vk::ImageLayout::UNDEFINED)
                .final_layout(if depth {
                    vk::ImageLayout::DEPTH_STENCIL_ATTACHMENT_OPTIMAL
                } else {
                    vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL
                })
        })
        .collect::<Vec<_>>();

    // A render pass needs at least one subpass, default to writing every color attachment
    let default_subpass;
    let subpasses = if subpasses.is_empty() {
        default_subpass = [SubpassInfo {
            input_attachments: Vec::new(),
            output_attachments: (0..attachments.len() as u32).collect(),
        }];
        &default_subpass[..]
    } else {
        subpasses
    };

    let references = subpasses
        .iter()
        .map(|info| SubpassReferences::new(attachments, info))
        .collect::<Vec<_>>();

    let subpass_descriptions = references
        .iter()
        .map(|refs| {
            let description = vk::SubpassDescription::default()
                .pipeline_bind_point(vk::PipelineBindPoint::GRAPHICS)
                .input_attachments(&refs.inputs)
                .color_attachments(&refs.colors);

            match refs.depth_stencil.as_ref() {
                Some(depth_stencil) => description.depth_stencil_attachment(depth_stencil),
                None => description,
            }
        })
        .collect::<Vec<_>>();

    // Each subpass reads what the previous one wrote
    let dependencies = (1..subpasses.len() as u32)
        .map(|subpass| {
            vk::SubpassDependency::default()
                .src_subpass(subpass - 1)
                .dst_subpass(subpass)
                .src_stage_mask(vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT | vk::PipelineStageFlags::LATE_FRAGMENT_TESTS)
                .dst_stage_mask(vk::PipelineStageFlags::FRAGMENT_SHADER)
                .src_access_mask(vk::AccessFlags::COLOR_ATTACHMENT_WRITE | vk::AccessFlags::DEPTH_STENCIL_ATTACHMENT_WRITE)
                .dst_access_mask(vk::AccessFlags::INPUT_ATTACHMENT_READ)
                .dependency_flags(vk::DependencyFlags::BY_REGION)
        })
        .collect::<Vec<_>>();

    let create_info = vk::RenderPassCreateInfo::default()
        .attachments(&descriptions)
        .subpasses(&subpass_descriptions)
        .dependencies(&dependencies);

    let raw = device.create_render_pass(&create_info, None)?;
    log::debug!(
        "Created render pass {:?} with {} attachments and {} subpasses",
        raw,
        attachments.len(),
        subpasses.len()
    );

    let color_output_counts = references.iter().map(|refs| refs.colors.len() as u32).collect();
    Ok(RenderPass::new(raw, color_output_counts))
}

// Create a framebuffer binding the render target views to the render pass
pub(crate) unsafe fn create_framebuffer(
    device: &ash::Device,
    render_target: &RenderTarget,
    render_pass: &RenderPass,
) -> VkResult<Framebuffer> {
    let views = render_target.views().iter().map(|view| view.raw).collect::<Vec<_>>();
    let extent = render_target.extent();

    let create_info = vk::FramebufferCreateInfo::default()
        .render_pass(render_pass.raw())
        .attachments(&views)
        .width(extent.width)
        .height(extent.height)
        .layers(1);

    let raw = device.create_framebuffer(&create_info, None)?;
    log::debug!("Created framebuffer {:?} ({}x{})", raw, extent.width, extent.height);
    Ok(Framebuffer::new(raw, extent))
}
