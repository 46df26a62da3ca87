use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use crate::{DescriptorSetLayout, PipelineLayout};

// Descriptor set layouts that were last bound, per set index
#[derive(Debug, Default, Clone)]
pub struct DescriptorSetLayoutState {
    bound: BTreeMap<u32, Arc<DescriptorSetLayout>>,
}

impl DescriptorSetLayoutState {
    pub fn clear(&mut self) {
        self.bound.clear();
    }

    pub fn get(&self, set: u32) -> Option<&Arc<DescriptorSetLayout>> {
        self.bound.get(&set)
    }

    pub fn is_empty(&self) -> bool {
        self.bound.is_empty()
    }

    pub(crate) fn insert(&mut self, set: u32, layout: Arc<DescriptorSetLayout>) {
        self.bound.insert(set, layout);
    }

    // Reconcile against a new pipeline layout
    // Returns the sets whose bound layout differs from the one the pipeline layout expects,
    // and forgets sets the pipeline layout doesn't declare anymore
    pub(crate) fn reconcile(&mut self, pipeline_layout: &PipelineLayout) -> BTreeSet<u32> {
        let changed = pipeline_layout
            .set_layouts()
            .iter()
            .filter_map(|(set, expected)| {
                let bound = self.bound.get(set)?;
                (bound.raw != expected.raw).then_some(*set)
            })
            .collect();

        self.bound.retain(|set, _| pipeline_layout.has_set_layout(*set));
        changed
    }
}
