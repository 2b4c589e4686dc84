//! Common test utilities and helpers

#![allow(dead_code)] // Test utilities may not all be used in every test file

pub mod builders;
pub mod mock_helpers;

use analitico_pipeline::pipeline::{PipelineContainer, PipelineEnvironment, PipelineEvent, PluginRecord};
use crossbeam_channel::Receiver;
use std::sync::Arc;

/// Environment with the built-in registry and default placement rules
pub fn builtin_env() -> Arc<PipelineEnvironment> {
    PipelineEnvironment::builtin()
}

/// Load `root` into a container whose rule follows the root's class
pub fn container_for(root: PluginRecord) -> PipelineContainer {
    PipelineContainer::for_record(builtin_env(), root).expect("pipeline should load")
}

/// Count events received so far without blocking
pub fn drain_events(events: &Receiver<PipelineEvent>) -> usize {
    events.try_iter().count()
}

/// Symbolic names in list order
pub fn names(records: &[PluginRecord]) -> Vec<String> {
    records.iter().map(|r| r.name.clone()).collect()
}
