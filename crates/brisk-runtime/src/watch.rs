//! Mutation Watch
//!
//! Coalesces child-list mutations under the watched element into debounced
//! re-scans. Each insertion restarts the insertion timer, which binds every
//! distinct outermost mutation target incrementally. A removal cancels any
//! pending insertion bind and restarts the removal timer, which tears down every
//! removed subtree seen so far and runs a down-rebind.

use crate::scheduler::{Scheduler, Task, TimerId, WatchKind};
use brisk_dom::{Document, MutationRecord, MutationType, NodeId};

#[derive(Debug)]
pub struct MutationWatch {
    debounce_ms: u64,
    root: Option<NodeId>,
    insert_timer: Option<TimerId>,
    insert_targets: Vec<NodeId>,
    remove_timer: Option<TimerId>,
    removed: Vec<NodeId>,
}

impl MutationWatch {
    pub fn new(debounce_ms: u64) -> Self {
        Self {
            debounce_ms,
            root: None,
            insert_timer: None,
            insert_targets: Vec::new(),
            remove_timer: None,
            removed: Vec::new(),
        }
    }

    /// Start watching mutations at or under `root`
    pub fn watch(&mut self, root: NodeId) {
        self.root = Some(root);
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn is_watching(&self) -> bool {
        self.root.is_some()
    }

    /// Feed drained mutation records; returns how many were relevant
    pub fn observe(
        &mut self,
        document: &Document,
        records: Vec<MutationRecord>,
        scheduler: &mut Scheduler,
        now: u64,
    ) -> usize {
        let Some(root) = self.root else {
            return 0;
        };
        let mut relevant = 0;
        for record in records {
            if record.mutation_type != MutationType::ChildList
                || !document.contains(root, record.target)
            {
                continue;
            }
            relevant += 1;
            if !record.removed_nodes.is_empty() {
                // The down-rebind after removal covers pending insertions
                self.cancel_insert(scheduler);
                self.insert_targets.clear();
                if let Some(timer) = self.remove_timer.take() {
                    scheduler.clear(timer);
                }
                self.removed.extend(record.removed_nodes.iter().copied());
                self.remove_timer = Some(scheduler.set_timeout(
                    Task::Watch(WatchKind::Remove),
                    self.debounce_ms,
                    now,
                ));
            }
            if !record.added_nodes.is_empty() {
                self.cancel_insert(scheduler);
                if !self.insert_targets.contains(&record.target) {
                    self.insert_targets.push(record.target);
                }
                self.insert_timer = Some(scheduler.set_timeout(
                    Task::Watch(WatchKind::Insert),
                    self.debounce_ms,
                    now,
                ));
            }
        }
        relevant
    }

    fn cancel_insert(&mut self, scheduler: &mut Scheduler) {
        if let Some(timer) = self.insert_timer.take() {
            scheduler.clear(timer);
        }
    }

    /// Targets of a fired insertion timer, minus any nested in another one
    pub fn take_inserts(&mut self, document: &Document) -> Vec<NodeId> {
        self.insert_timer = None;
        let targets = std::mem::take(&mut self.insert_targets);
        targets
            .iter()
            .copied()
            .filter(|&t| document.is_connected(t))
            .filter(|&t| !targets.iter().any(|&o| o != t && document.contains(o, t)))
            .collect()
    }

    /// Removed roots accumulated for a fired removal timer
    pub fn take_removed(&mut self) -> Vec<NodeId> {
        self.remove_timer = None;
        std::mem::take(&mut self.removed)
    }

    /// Whether a re-scan is scheduled
    pub fn is_pending(&self) -> bool {
        self.insert_timer.is_some() || self.remove_timer.is_some()
    }
}
