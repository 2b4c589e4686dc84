//! Placement policies consulted before structural edits.
//!
//! A policy is a pure decision function over the current ordered list. The
//! container asks it before every insert and move; a `false` answer leaves the
//! list exactly as it was.

use crate::pipeline::record::PluginRecord;

/// Decides whether a structural edit is legal.
#[cfg_attr(test, mockall::automock)]
pub trait PlacementPolicy: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// May `candidate` be inserted at `index` of `current`?
    fn can_insert(&self, candidate: &PluginRecord, index: usize, current: &[PluginRecord]) -> bool;

    /// May the node at `from` be moved to `to`?
    fn can_move(&self, from: usize, to: usize, current: &[PluginRecord]) -> bool;

    /// Positions of `current` that break the rule. Loading never enforces
    /// the rule, so persisted pipelines may carry violations.
    fn violations(&self, _current: &[PluginRecord]) -> Vec<usize> {
        Vec::new()
    }
}

/// Accepts every in-range edit.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnrestrictedPolicy;

impl PlacementPolicy for UnrestrictedPolicy {
    fn name(&self) -> &'static str {
        "unrestricted"
    }

    fn can_insert(&self, _candidate: &PluginRecord, _index: usize, _current: &[PluginRecord]) -> bool {
        true
    }

    fn can_move(&self, _from: usize, _to: usize, _current: &[PluginRecord]) -> bool {
        true
    }
}

/// Dataframe pipeline rule: index 0 belongs to source plugins, every other
/// index to non-source plugins.
///
/// Sources are recognised structurally by a marker in the symbolic name, so
/// no plugin has to be instantiated to decide.
#[derive(Debug, Clone)]
pub struct SourceFirstPolicy {
    marker: String,
}

impl SourceFirstPolicy {
    pub fn new(marker: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
        }
    }

    pub fn marker(&self) -> &str {
        &self.marker
    }

    fn is_source(&self, record: &PluginRecord) -> bool {
        record.is_source(&self.marker)
    }
}

impl PlacementPolicy for SourceFirstPolicy {
    fn name(&self) -> &'static str {
        "source_first"
    }

    fn can_insert(&self, candidate: &PluginRecord, index: usize, current: &[PluginRecord]) -> bool {
        if index > current.len() {
            return false;
        }
        let source = self.is_source(candidate);
        if index == 0 {
            // The current head shifts to 1; a second source there is never legal.
            source && !current.first().is_some_and(|head| self.is_source(head))
        } else {
            !source
        }
    }

    fn can_move(&self, from: usize, to: usize, current: &[PluginRecord]) -> bool {
        if from >= current.len() || to >= current.len() {
            return false;
        }
        if from == to {
            return true;
        }
        if to == 0 && !self.is_source(&current[from]) {
            return false;
        }
        // Moving the head away lets the second node slide into position 0.
        if from == 0 && !self.is_source(&current[1]) {
            return false;
        }
        true
    }

    fn violations(&self, current: &[PluginRecord]) -> Vec<usize> {
        current
            .iter()
            .enumerate()
            .skip(1)
            .filter(|(_, record)| self.is_source(record))
            .map(|(i, _)| i)
            .collect()
    }
}
