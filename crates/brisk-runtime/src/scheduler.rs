//! Timers
//!
//! setTimeout/setInterval on an explicit millisecond clock. The runtime
//! owns the clock and advances it; nothing here reads wall time, so timer
//! behavior is deterministic under test.

use crate::Runtime;
use brisk_dom::NodeId;
use std::collections::HashMap;
use std::rc::Rc;

/// Timer handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(u32);

/// Debounced mutation re-scan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchKind {
    Insert,
    Remove,
}

/// Work run when a timer fires
#[derive(Clone)]
pub enum Task {
    /// Bind pass deferred from inside another pass
    Bind { roots: Vec<NodeId>, down: bool },
    /// Re-scan after the mutation debounce window
    Watch(WatchKind),
    /// Load (or reload) a view
    LoadView(NodeId),
    Callback(Rc<dyn Fn(&mut Runtime)>),
}

impl std::fmt::Debug for Task {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Task::Bind { roots, down } => f
                .debug_struct("Bind")
                .field("roots", roots)
                .field("down", down)
                .finish(),
            Task::Watch(kind) => f.debug_tuple("Watch").field(kind).finish(),
            Task::LoadView(id) => f.debug_tuple("LoadView").field(id).finish(),
            Task::Callback(_) => f.write_str("Callback"),
        }
    }
}

/// Timer entry
#[derive(Debug, Clone)]
pub struct Timer {
    pub id: TimerId,
    pub task: Task,
    pub due: u64,
    /// Period for intervals
    pub repeat: Option<u64>,
    seq: u64,
}

/// Timer manager
#[derive(Debug, Default)]
pub struct Scheduler {
    timers: HashMap<TimerId, Timer>,
    next_id: u32,
    next_seq: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    fn add(&mut self, task: Task, due: u64, repeat: Option<u64>) -> TimerId {
        self.next_id += 1;
        self.next_seq += 1;
        let id = TimerId(self.next_id);
        self.timers.insert(
            id,
            Timer {
                id,
                task,
                due,
                repeat,
                seq: self.next_seq,
            },
        );
        id
    }

    /// Add a timeout
    pub fn set_timeout(&mut self, task: Task, delay_ms: u64, now: u64) -> TimerId {
        self.add(task, now + delay_ms, None)
    }

    /// Add an interval (minimum period 1ms)
    pub fn set_interval(&mut self, task: Task, period_ms: u64, now: u64) -> TimerId {
        let period = period_ms.max(1);
        self.add(task, now + period, Some(period))
    }

    /// Clear a timer
    pub fn clear(&mut self, id: TimerId) -> bool {
        self.timers.remove(&id).is_some()
    }

    pub fn contains(&self, id: TimerId) -> bool {
        self.timers.contains_key(&id)
    }

    /// Take the earliest timer due at `now`; intervals are rescheduled one
    /// period after their due time
    pub fn pop_due(&mut self, now: u64) -> Option<(TimerId, Task)> {
        let id = self
            .timers
            .values()
            .filter(|t| t.due <= now)
            .min_by_key(|t| (t.due, t.seq))
            .map(|t| t.id)?;

        match self.timers.get(&id).and_then(|t| t.repeat) {
            Some(period) => {
                self.next_seq += 1;
                let seq = self.next_seq;
                let timer = self.timers.get_mut(&id)?;
                timer.due += period;
                timer.seq = seq;
                Some((id, timer.task.clone()))
            }
            None => self.timers.remove(&id).map(|t| (id, t.task)),
        }
    }

    /// Due time of the earliest timer
    pub fn next_due(&self) -> Option<u64> {
        self.timers.values().map(|t| t.due).min()
    }

    /// Check if there are pending timers
    pub fn has_pending(&self) -> bool {
        !self.timers.is_empty()
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view() -> Task {
        Task::LoadView(NodeId::NONE)
    }

    #[test]
    fn test_timeout_fires_once() {
        let mut tm = Scheduler::new();
        let id = tm.set_timeout(view(), 100, 0);
        assert!(tm.pop_due(99).is_none());
        assert_eq!(tm.pop_due(100).map(|(i, _)| i), Some(id));
        assert!(!tm.has_pending());
    }

    #[test]
    fn test_earliest_first_then_insertion_order() {
        let mut tm = Scheduler::new();
        let late = tm.set_timeout(view(), 50, 0);
        let first = tm.set_timeout(view(), 10, 0);
        let second = tm.set_timeout(view(), 10, 0);
        let order: Vec<TimerId> = std::iter::from_fn(|| tm.pop_due(100).map(|(i, _)| i)).collect();
        assert_eq!(order, vec![first, second, late]);
    }

    #[test]
    fn test_interval_reschedules_from_due_time() {
        let mut tm = Scheduler::new();
        let id = tm.set_interval(view(), 30, 0);
        assert_eq!(tm.pop_due(65).map(|(i, _)| i), Some(id));
        assert_eq!(tm.next_due(), Some(60));
        assert!(tm.pop_due(65).is_some());
        assert!(tm.pop_due(65).is_none());
        assert!(tm.clear(id));
        assert!(!tm.has_pending());
    }
}
