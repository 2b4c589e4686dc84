//! Pipeline container: The ordered list of plugin records and their live nodes.
//!
//! ```text
//!            PipelineRecord { plugins: [r0, r1, r2] }
//!                      │ load
//!                      ▼
//! records: [r0,            r1,            r2           ]
//! nodes:   [LiveNode#7,    LiveNode#8,    LiveNode#9   ]
//!           node + sub     node + sub     node + sub
//!                      │ collect_changes
//!                      ▼
//!            EventFanout ──► PipelineEvent::Changed ──► owners
//! ```
//!
//! `records` and `nodes` are parallel and always the same length. A live
//! node and the subscription to its change channel travel together through
//! every move and are dropped together on removal or reload, so change
//! notifications are tied to the instance, never to the position.
//!
//! Structural edits are all-or-nothing: the placement policy is consulted
//! and the new node is fully built before either list is touched.

use crate::error::{PipelineError, Result, ResultExt};
use crate::pipeline::channel::{change_channel, ChangeSubscription, EventFanout, PipelineEvent};
use crate::pipeline::id::InstanceId;
use crate::pipeline::node::{AnyNode, NodeEdit, ViewNode};
use crate::pipeline::placement::PlacementPolicy;
use crate::pipeline::plugin_kind::PluginKind;
use crate::pipeline::record::{PipelineRecord, PluginRecord};
use crate::pipeline::registry::PipelineEnvironment;
use crossbeam_channel::Receiver;
use std::sync::Arc;
use tracing::{debug, error, info, trace, warn};

/// A live node together with the receiving end of its change channel.
struct LiveNode {
    id: InstanceId,
    node: AnyNode,
    subscription: ChangeSubscription,
}

/// Owns one pipeline's ordered records and their live nodes.
pub struct PipelineContainer {
    env: Arc<PipelineEnvironment>,
    policy: Box<dyn PlacementPolicy>,
    /// Root record fields, without `plugins`
    root: PluginRecord,
    /// Whether the serialized root carries a `plugins` list
    plugins_present: bool,
    records: Vec<PluginRecord>,
    nodes: Vec<LiveNode>,
    events: EventFanout,
}

impl PipelineContainer {
    /// Empty container using `policy` for structural edits.
    pub fn new(env: Arc<PipelineEnvironment>, policy: Box<dyn PlacementPolicy>) -> Self {
        Self {
            env,
            policy,
            root: PluginRecord::new(PluginKind::Pipeline.symbolic_name()),
            plugins_present: false,
            records: Vec::new(),
            nodes: Vec::new(),
            events: EventFanout::default(),
        }
    }

    /// Container whose policy follows the configured rule for the record's
    /// class, loaded with `record`.
    pub fn for_record(env: Arc<PipelineEnvironment>, record: PipelineRecord) -> Result<Self> {
        let policy = env.policy_for(record.class_name());
        let mut container = Self::new(env, policy);
        container.load(record)?;
        Ok(container)
    }

    /// Replace the whole list. Every previous live node and subscription is
    /// dropped; on error the previous state is kept.
    pub fn load(&mut self, record: PipelineRecord) -> Result<()> {
        let PluginRecord {
            type_tag,
            name,
            plugins,
            payload,
        } = record;
        let plugins_present = plugins.is_some();
        let records = plugins.unwrap_or_default();

        let mut nodes = Vec::with_capacity(records.len());
        for (index, child) in records.iter().enumerate() {
            nodes.push(self.instantiate(index, child).with_context(|| format!("loading {}", name))?);
        }

        info!(
            "Loaded {} with {} plugins ({})",
            if name.is_empty() { "pipeline" } else { name.as_str() },
            records.len(),
            self.policy.name()
        );
        self.root = PluginRecord {
            type_tag,
            name,
            plugins: None,
            payload,
        };
        self.plugins_present = plugins_present;
        self.records = records;
        self.nodes = nodes;
        Ok(())
    }

    fn instantiate(&self, index: usize, record: &PluginRecord) -> Result<LiveNode> {
        let variant = self.env.resolver().lookup(&record.name).ok_or_else(|| {
            error!("No plugin variant at all for '{}' at position {}", record.name, index);
            PipelineError::UnresolvedPlugin {
                index,
                name: record.name.clone(),
            }
        })?;

        let mut node = variant.instantiate(&self.env);
        let id = InstanceId::next();
        let (emitter, subscription) = change_channel(id);
        node.attach(emitter);
        node.set_data(record.clone())
            .with_context(|| format!("binding {} at position {}", record.name, index))?;

        debug!("Instantiated {} as {} ({})", record.name, node.variant_name(), id);
        Ok(LiveNode {
            id,
            node,
            subscription,
        })
    }

    /// Insert `record` at `index`, shifting later nodes.
    ///
    /// Returns `Ok(false)` when the placement policy rejects the insert; the
    /// list is then unchanged.
    pub fn insert_at(&mut self, index: usize, record: PluginRecord) -> Result<bool> {
        let len = self.records.len();
        if index > len {
            return Err(PipelineError::IndexOutOfRange { index, len });
        }
        if !self.policy.can_insert(&record, index, &self.records) {
            warn!("{} rejected {} at position {}", self.policy.name(), record.name, index);
            return Ok(false);
        }

        let live = self.instantiate(index, &record)?;
        debug!("Inserted {} at position {}", record.name, index);
        self.records.insert(index, record);
        self.nodes.insert(index, live);
        self.plugins_present = true;
        self.events.emit(PipelineEvent::Changed);
        Ok(true)
    }

    /// Move the node at `from` to `to`, keeping its live instance.
    ///
    /// Returns `Ok(false)` when the placement policy rejects the move; the
    /// list is then unchanged.
    pub fn move_to(&mut self, from: usize, to: usize) -> Result<bool> {
        let len = self.records.len();
        for index in [from, to] {
            if index >= len {
                return Err(PipelineError::IndexOutOfRange { index, len });
            }
        }
        if !self.policy.can_move(from, to, &self.records) {
            warn!("{} rejected move {} -> {}", self.policy.name(), from, to);
            return Ok(false);
        }
        if from == to {
            return Ok(true);
        }

        let record = self.records.remove(from);
        self.records.insert(to, record);
        let live = self.nodes.remove(from);
        debug!("Moved {} from {} to {}", live.id, from, to);
        self.nodes.insert(to, live);
        self.events.emit(PipelineEvent::Changed);
        Ok(true)
    }

    /// Remove the node at `index`. Never rejected.
    ///
    /// The live node and its subscription are dropped here; anything it
    /// emitted but was not yet collected is discarded with them.
    pub fn remove_at(&mut self, index: usize) -> Result<PluginRecord> {
        let len = self.records.len();
        if index >= len {
            return Err(PipelineError::IndexOutOfRange { index, len });
        }
        let record = self.records.remove(index);
        let live = self.nodes.remove(index);
        debug!("Removed {} ({}) from position {}", record.name, live.id, index);
        drop(live);
        self.events.emit(PipelineEvent::Changed);
        Ok(record)
    }

    /// Apply an edit to the node at `index`.
    pub fn edit(&mut self, index: usize, edit: NodeEdit) -> Result<bool> {
        trace!("Edit {} on position {}", edit.label(), index);
        self.with_node_mut(index, |node| node.apply(edit))?
    }

    /// Run `f` on the node at `index`, then collect whatever it emitted.
    pub fn with_node_mut<R>(&mut self, index: usize, f: impl FnOnce(&mut AnyNode) -> R) -> Result<R> {
        let len = self.nodes.len();
        let live = self
            .nodes
            .get_mut(index)
            .ok_or(PipelineError::IndexOutOfRange { index, len })?;
        let out = f(&mut live.node);
        live.node.flush();
        self.collect_changes();
        Ok(out)
    }

    /// Run `f` on the container of the nested pipeline at `index`.
    pub fn with_pipeline_mut<R>(
        &mut self,
        index: usize,
        f: impl FnOnce(&mut PipelineContainer) -> R,
    ) -> Result<R> {
        let name = self
            .records
            .get(index)
            .map(|r| r.name.clone())
            .unwrap_or_default();
        self.with_node_mut(index, |node| node.as_pipeline_mut().map(f))?
            .ok_or(PipelineError::NotAPipeline(name))
    }

    /// Drain every live node's channel, write the emitted records back and
    /// notify owners once per emission. Returns the number of emissions.
    pub fn collect_changes(&mut self) -> usize {
        let mut count = 0;
        for index in 0..self.nodes.len() {
            let changes = self.nodes[index].subscription.drain();
            for change in changes {
                debug_assert_eq!(change.instance, self.nodes[index].id);
                self.records[index] = change.record;
                self.on_child_changed(index);
                count += 1;
            }
        }
        count
    }

    fn on_child_changed(&mut self, index: usize) {
        trace!("Plugin at position {} changed", index);
        self.events.emit(PipelineEvent::Changed);
    }

    /// Replace the root's own fields. `plugins` in `record` is ignored.
    pub fn set_root_fields(&mut self, record: PluginRecord) -> bool {
        let root = PluginRecord {
            plugins: None,
            ..record
        };
        if root == self.root {
            return false;
        }
        self.root = root;
        self.events.emit(PipelineEvent::Changed);
        true
    }

    /// Receive a `Changed` event for every change from now on.
    pub fn subscribe(&mut self) -> Receiver<PipelineEvent> {
        self.events.subscribe()
    }

    /// Would `insert_at(index, record)` be accepted? Does not mutate.
    pub fn can_insert(&self, record: &PluginRecord, index: usize) -> bool {
        index <= self.records.len() && self.policy.can_insert(record, index, &self.records)
    }

    /// Would `move_to(from, to)` be accepted? Does not mutate.
    pub fn can_move(&self, from: usize, to: usize) -> bool {
        let len = self.records.len();
        from < len && to < len && self.policy.can_move(from, to, &self.records)
    }

    /// Current pipeline as a persistable record.
    pub fn serialize(&self) -> PipelineRecord {
        let mut record = self.root.clone();
        if self.plugins_present || !self.records.is_empty() {
            record.plugins = Some(self.records.clone());
        }
        record
    }

    pub fn render(&self) -> Vec<ViewNode> {
        self.nodes.iter().map(|live| live.node.render()).collect()
    }

    /// Positions breaking the placement rule. Loading never enforces it.
    pub fn placement_violations(&self) -> Vec<usize> {
        self.policy.violations(&self.records)
    }

    pub fn records(&self) -> &[PluginRecord] {
        &self.records
    }

    pub fn root(&self) -> &PluginRecord {
        &self.root
    }

    pub fn node(&self, index: usize) -> Option<&AnyNode> {
        self.nodes.get(index).map(|live| &live.node)
    }

    pub fn instance_ids(&self) -> Vec<InstanceId> {
        self.nodes.iter().map(|live| live.id).collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn policy_name(&self) -> &'static str {
        self.policy.name()
    }

    pub fn env(&self) -> &Arc<PipelineEnvironment> {
        &self.env
    }
}
