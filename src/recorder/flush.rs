use ash::vk;
use smallvec::SmallVec;

use super::BindCommand;
use crate::error::contract_violation;
use crate::format::{descriptor_image_layout, is_buffer_descriptor_type, is_dynamic_buffer_descriptor_type};
use crate::{BindingMap, DescriptorSetLayout, Error, Recorder, ResourceInfo, Result};

// Descriptor infos of one set, ready to be handed to the resource cache
#[derive(Default)]
struct SetInfos {
    buffer_infos: BindingMap<vk::DescriptorBufferInfo>,
    image_infos: BindingMap<vk::DescriptorImageInfo>,
    dynamic_offsets: SmallVec<[u32; 4]>,
}

impl SetInfos {
    // Resolve requested resources against the declared bindings of the set layout
    fn new(layout: &DescriptorSetLayout, resource_bindings: &BindingMap<ResourceInfo>) -> Self {
        let mut infos = Self::default();

        for (&binding, elements) in resource_bindings {
            // Bindings the layout doesn't know about are stale, ignore them
            let Some(declared) = layout.binding(binding) else { continue };
            let ty = declared.descriptor_type;

            for (&element, resource) in elements {
                match *resource {
                    ResourceInfo::Buffer { buffer, offset, range } if is_buffer_descriptor_type(ty) => {
                        let mut info = vk::DescriptorBufferInfo {
                            buffer: buffer.raw,
                            offset,
                            range,
                        };

                        // Dynamic offsets are given at bind time instead
                        if is_dynamic_buffer_descriptor_type(ty) {
                            infos.dynamic_offsets.push(info.offset as u32);
                            info.offset = 0;
                        }

                        infos.buffer_infos.entry(binding).or_default().insert(element, info);
                    }

                    ResourceInfo::ImageSampler { view, .. } | ResourceInfo::Image { view } => {
                        let sampler = match resource {
                            ResourceInfo::ImageSampler { sampler, .. } => sampler.raw,
                            _ => vk::Sampler::null(),
                        };

                        let Some(image_layout) = descriptor_image_layout(ty, view.format) else {
                            log::debug!("Skipping image at binding {binding}[{element}], unsupported descriptor type {ty:?}");
                            continue;
                        };

                        let info = vk::DescriptorImageInfo {
                            sampler,
                            image_view: view.raw,
                            image_layout,
                        };
                        infos.image_infos.entry(binding).or_default().insert(element, info);
                    }

                    ResourceInfo::Buffer { .. } => {
                        log::debug!("Skipping buffer at binding {binding}[{element}], it is declared as {ty:?}");
                    }
                }
            }
        }

        infos
    }
}

impl Recorder<'_> {
    // Flush both pipeline and descriptor state before a draw or dispatch
    pub(crate) fn flush(&mut self, bind_point: vk::PipelineBindPoint) -> Result<()> {
        if !self.is_recording() {
            contract_violation!(
                Error::InvalidState("command buffer is not recording"),
                "Command buffer {:?} must be recording to draw or dispatch",
                self.raw
            );
        }

        self.flush_pipeline_state(bind_point)?;
        self.flush_descriptor_state(bind_point)
    }

    // Bind a pipeline matching the current pipeline state, if it changed since the last flush
    pub fn flush_pipeline_state(&mut self, bind_point: vk::PipelineBindPoint) -> Result<()> {
        if self.pipeline_state.pipeline_layout().is_none() {
            contract_violation!(
                Error::MissingPipelineLayout,
                "No pipeline layout is bound to command buffer {:?}, call bind_pipeline_layout first",
                self.raw
            );
        }

        if !self.pipeline_state.is_dirty() {
            return Ok(());
        }

        self.pipeline_state.clear_dirty();
        let cache = self.device().resource_cache();

        let pipeline = match bind_point {
            vk::PipelineBindPoint::GRAPHICS => {
                self.pipeline_state.stamp_render_pass(self.current_render_pass.render_pass.clone());
                cache.request_graphics_pipeline(&self.pipeline_state)?
            }
            vk::PipelineBindPoint::COMPUTE => cache.request_compute_pipeline(&self.pipeline_state)?,
            _ => contract_violation!(
                Error::UnsupportedBindPoint(bind_point),
                "Only graphics and compute pipeline bind points are supported, got {:?}",
                bind_point
            ),
        };

        log::trace!("Binding pipeline {:?} to {:?}", pipeline.raw(), bind_point);
        self.record(BindCommand::Pipeline {
            bind_point,
            pipeline: pipeline.raw(),
        });
        Ok(())
    }

    // Bind descriptor sets for every set whose resources or layout changed since the last flush
    pub fn flush_descriptor_state(&mut self, bind_point: vk::PipelineBindPoint) -> Result<()> {
        let Some(pipeline_layout) = self.pipeline_state.pipeline_layout().cloned() else {
            contract_violation!(
                Error::MissingPipelineLayout,
                "No pipeline layout is bound to command buffer {:?}, call bind_pipeline_layout first",
                self.raw
            );
        };

        let update_sets = self.descriptor_set_layout_state.reconcile(&pipeline_layout);
        if !self.resource_binding_state.is_dirty() && update_sets.is_empty() {
            return Ok(());
        }

        self.resource_binding_state.clear_dirty();

        let pending = self
            .resource_binding_state
            .set_bindings()
            .iter()
            .filter(|(set, resource_set)| resource_set.is_dirty() || update_sets.contains(*set))
            .map(|(set, _)| *set)
            .collect::<SmallVec<[u32; 4]>>();

        for set in pending {
            self.resource_binding_state.clear_set_dirty(set);

            // Sets can be used sparsely, nothing to bind if the layout doesn't declare it
            let Some(set_layout) = pipeline_layout.set_layout(set).cloned() else {
                continue;
            };
            self.descriptor_set_layout_state.insert(set, set_layout.clone());

            let Some(resource_set) = self.resource_binding_state.set_bindings().get(&set) else {
                continue;
            };
            let infos = SetInfos::new(&set_layout, resource_set.resource_bindings());

            let descriptor_set = self.device().resource_cache().request_descriptor_set(
                &set_layout,
                &infos.buffer_infos,
                &infos.image_infos,
            )?;

            log::trace!("Binding descriptor set {:?} at set {}", descriptor_set.raw(), set);
            self.record(BindCommand::DescriptorSets {
                bind_point,
                layout: pipeline_layout.raw(),
                first_set: set,
                descriptor_sets: SmallVec::from_buf([descriptor_set.raw()]),
                dynamic_offsets: infos.dynamic_offsets,
            });
        }

        Ok(())
    }
}
