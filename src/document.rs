//! Owner side: a parent item carrying a pipeline in its attributes.
//!
//! Datasets, recipes and endpoints are items shaped like
//! `{ "id": "...", "attributes": { "title"?: "...", "plugin"?: { ... } } }`.
//! `PipelineDocument` loads the `plugin` attribute into a container and writes
//! it back before the item is persisted. `SaveScheduler` turns a stream of
//! `Changed` events into a single save once the pipeline has been idle long
//! enough. Neither performs I/O; the caller fetches and stores items.

use crate::config::EngineConfig;
use crate::error::{PipelineError, Result, ResultExt};
use crate::pipeline::channel::PipelineEvent;
use crate::pipeline::container::PipelineContainer;
use crate::pipeline::record::{set_pointer, PluginRecord};
use crate::pipeline::registry::PipelineEnvironment;
use crossbeam_channel::Receiver;
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};

const PLUGIN_POINTER: &str = "/attributes/plugin";

/// A parent item and the live pipeline loaded from it.
pub struct PipelineDocument {
    item: Value,
    container: Option<PipelineContainer>,
}

impl PipelineDocument {
    /// Load an item. A missing, null or `false` `plugin` attribute means the
    /// item has no pipeline.
    pub fn load(env: &Arc<PipelineEnvironment>, item: Value) -> Result<Self> {
        if !item.is_object() {
            return Err(PipelineError::InvalidRecord(
                "item must be a JSON object".to_string(),
            ));
        }

        let container = match item.pointer(PLUGIN_POINTER) {
            None | Some(Value::Null) | Some(Value::Bool(false)) => None,
            Some(plugin) => {
                let record = PluginRecord::from_value(plugin.clone()).context("attributes.plugin")?;
                Some(PipelineContainer::for_record(Arc::clone(env), record)?)
            }
        };

        let doc = Self { item, container };
        tracing::info!(
            "Loaded item {} ({})",
            doc.title(),
            if doc.has_plugin() { "with pipeline" } else { "no pipeline" }
        );
        Ok(doc)
    }

    pub fn id(&self) -> &str {
        self.item.get("id").and_then(Value::as_str).unwrap_or("")
    }

    /// Title attribute, or the id when there is none.
    pub fn title(&self) -> &str {
        self.item
            .pointer("/attributes/title")
            .and_then(Value::as_str)
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| self.id())
    }

    pub fn has_plugin(&self) -> bool {
        self.container.is_some()
    }

    pub fn pipeline(&self) -> Option<&PipelineContainer> {
        self.container.as_ref()
    }

    pub fn pipeline_mut(&mut self) -> Option<&mut PipelineContainer> {
        self.container.as_mut()
    }

    /// Subscribe to pipeline changes, if the item has a pipeline.
    pub fn subscribe(&mut self) -> Option<Receiver<PipelineEvent>> {
        self.container.as_mut().map(PipelineContainer::subscribe)
    }

    pub fn item(&self) -> &Value {
        &self.item
    }

    /// Write the current pipeline into the item and return it for saving.
    pub fn save_item(&mut self) -> Result<&Value> {
        if let Some(container) = &self.container {
            let plugin = container.serialize().to_value()?;
            set_pointer(&mut self.item, PLUGIN_POINTER, plugin)?;
            tracing::debug!("Serialized pipeline into item {}", self.id());
        }
        Ok(&self.item)
    }

    /// Placement diagnostics for the loaded pipeline.
    pub fn placement_report(&self) -> PlacementReport {
        let Some(container) = &self.container else {
            return PlacementReport {
                title: self.title().to_string(),
                policy: None,
                misplaced: Vec::new(),
            };
        };
        let records = container.records();
        PlacementReport {
            title: self.title().to_string(),
            policy: Some(container.policy_name()),
            misplaced: container
                .placement_violations()
                .into_iter()
                .filter_map(|index| records.get(index).map(|r| (index, r.name.clone())))
                .collect(),
        }
    }

    pub fn into_item(mut self) -> Result<Value> {
        self.save_item()?;
        Ok(self.item)
    }
}

/// Outcome of checking an item's pipeline against its placement rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacementReport {
    pub title: String,
    /// Policy name, `None` when the item has no pipeline
    pub policy: Option<&'static str>,
    /// Position and symbolic name of every misplaced plugin
    pub misplaced: Vec<(usize, String)>,
}

impl PlacementReport {
    pub fn is_clean(&self) -> bool {
        self.misplaced.is_empty()
    }

    /// One line per finding, or a single summary line.
    pub fn lines(&self) -> Vec<String> {
        match self.policy {
            None => vec![format!("{}: no pipeline", self.title)],
            Some(policy) if self.is_clean() => vec![format!("{}: ok ({})", self.title, policy)],
            Some(_) => self
                .misplaced
                .iter()
                .map(|(index, name)| {
                    format!("{}: position {} holds misplaced {}", self.title, index, name)
                })
                .collect(),
        }
    }
}

/// Debounces change events into one save after a period of idleness.
///
/// The clock is passed in, so the scheduler holds no timer of its own.
#[derive(Debug, Clone)]
pub struct SaveScheduler {
    idle: Duration,
    deadline: Option<Instant>,
}

impl SaveScheduler {
    pub fn new(idle: Duration) -> Self {
        Self {
            idle,
            deadline: None,
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.autosave_idle())
    }

    /// A change happened at `now`; restart the idle period.
    pub fn notify(&mut self, now: Instant) {
        self.deadline = Some(now + self.idle);
    }

    /// Drain `events` and restart the idle period if any arrived.
    pub fn observe(&mut self, events: &Receiver<PipelineEvent>, now: Instant) -> usize {
        let count = events.try_iter().count();
        if count > 0 {
            self.notify(now);
        }
        count
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// True once when the idle period has elapsed; the pending save is then
    /// considered taken.
    pub fn due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    /// Drop the pending save, e.g. after an explicit save.
    pub fn cancel(&mut self) {
        self.deadline = None;
    }
}
