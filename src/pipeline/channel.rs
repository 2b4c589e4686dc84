//! Change propagation between live nodes, their container and its owner.
//!
//! ```text
//! [node] ──ChangeEmitter──► ChangeSubscription ─┐
//! [node] ──ChangeEmitter──► ChangeSubscription ─┼─► container ──EventFanout──► owners
//! [node] ──ChangeEmitter──► ChangeSubscription ─┘
//! ```
//!
//! Each live node owns the sending half of its own channel; the receiving
//! half lives next to the node in the container's slot. Both are created
//! together and dropped together, so a removed node can never deliver a
//! notification to its former container.

use crate::pipeline::id::InstanceId;
use crate::pipeline::record::PluginRecord;
use crossbeam_channel::{unbounded, Receiver, Sender};

/// A payload change emitted by one live node.
#[derive(Debug, Clone)]
pub struct NodeChange {
    pub instance: InstanceId,
    /// The node's record after the change.
    pub record: PluginRecord,
}

/// Owner-facing pipeline events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineEvent {
    /// Something in the pipeline changed; the owner decides when to persist.
    Changed,
}

/// Sending half held by a live node.
#[derive(Debug)]
pub struct ChangeEmitter {
    instance: InstanceId,
    tx: Sender<NodeChange>,
}

impl ChangeEmitter {
    pub fn instance(&self) -> InstanceId {
        self.instance
    }

    /// Emit the node's current record.
    pub fn emit(&self, record: PluginRecord) {
        if self
            .tx
            .send(NodeChange {
                instance: self.instance,
                record,
            })
            .is_err()
        {
            tracing::trace!("{} emitted after its subscription was dropped", self.instance);
        }
    }
}

/// Receiving half held by the container, one per live node.
#[derive(Debug)]
pub struct ChangeSubscription {
    instance: InstanceId,
    rx: Receiver<NodeChange>,
}

impl ChangeSubscription {
    pub fn instance(&self) -> InstanceId {
        self.instance
    }

    /// Take every pending change without blocking.
    pub fn drain(&self) -> Vec<NodeChange> {
        self.rx.try_iter().collect()
    }
}

/// Create the channel pair for one node instance.
pub fn change_channel(instance: InstanceId) -> (ChangeEmitter, ChangeSubscription) {
    let (tx, rx) = unbounded();
    (
        ChangeEmitter { instance, tx },
        ChangeSubscription { instance, rx },
    )
}

/// Fan-out of pipeline events to any number of owners.
///
/// Subscribers whose receiver was dropped are pruned on the next emission.
#[derive(Debug, Default)]
pub struct EventFanout {
    subscribers: Vec<Sender<PipelineEvent>>,
}

impl EventFanout {
    pub fn subscribe(&mut self) -> Receiver<PipelineEvent> {
        let (tx, rx) = unbounded();
        self.subscribers.push(tx);
        rx
    }

    pub fn emit(&mut self, event: PipelineEvent) {
        self.subscribers.retain(|tx| tx.send(event).is_ok());
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}
