//! Priority queue with a delay gate
//!
//! Eligible tasks sit in a binary heap ordered by `(priority, scheduled_at,
//! seq)`. Tasks whose scheduled time has not arrived sit in a separate index
//! ordered by `(scheduled_at, seq)` and are promoted into the heap on every
//! dequeue, so a delayed task never blocks an eligible one and is never
//! popped and pushed back.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BinaryHeap};

use tokio::time::Instant;

use crate::domain::{Task, TaskId};

/// A queued reference to a pending task
#[derive(Debug, Clone)]
pub struct QueueEntry {
    pub task_id: TaskId,
    pub priority: u32,
    pub scheduled_at: Instant,
    pub seq: u64,
}

impl QueueEntry {
    /// Build an entry from a task's current priority and schedule
    pub fn for_task(task: &Task) -> Self {
        Self {
            task_id: task.id.clone(),
            priority: task.priority,
            scheduled_at: task.scheduled_at,
            seq: task.seq,
        }
    }
}

impl Eq for QueueEntry {}

impl PartialEq for QueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap: the most urgent entry must compare greatest
        other
            .priority
            .cmp(&self.priority)
            .then_with(|| other.scheduled_at.cmp(&self.scheduled_at))
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Result of asking the queue for work
#[derive(Debug, Clone)]
pub enum Dequeue {
    /// The most urgent eligible entry, removed from the queue
    Ready(QueueEntry),

    /// Nothing eligible yet; the earliest delayed entry becomes eligible at this instant
    NotYet(Instant),

    /// Nothing queued at all
    Empty,
}

/// Ready heap plus delay index
#[derive(Debug, Default)]
pub struct TaskQueue {
    ready: BinaryHeap<QueueEntry>,
    delayed: BTreeMap<(Instant, u64), QueueEntry>,
}

impl TaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry, O(log n)
    pub fn push(&mut self, entry: QueueEntry, now: Instant) {
        if entry.scheduled_at <= now {
            self.ready.push(entry);
        } else {
            self.delayed.insert((entry.scheduled_at, entry.seq), entry);
        }
    }

    /// Move every delayed entry whose time has come into the ready heap
    pub fn promote(&mut self, now: Instant) -> usize {
        let mut promoted = 0;
        while let Some(entry) = self.delayed.first_entry() {
            if entry.key().0 > now {
                break;
            }
            self.ready.push(entry.remove());
            promoted += 1;
        }
        promoted
    }

    /// Remove and return the most urgent eligible entry
    pub fn pop_eligible(&mut self, now: Instant) -> Dequeue {
        self.promote(now);

        if let Some(entry) = self.ready.pop() {
            return Dequeue::Ready(entry);
        }

        match self.delayed.keys().next() {
            Some(&(at, _)) => Dequeue::NotYet(at),
            None => Dequeue::Empty,
        }
    }

    /// Total entries, eligible or not
    pub fn len(&self) -> usize {
        self.ready.len() + self.delayed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ready.is_empty() && self.delayed.is_empty()
    }

    /// Entries already promoted to the ready heap
    #[cfg(test)]
    pub(crate) fn ready_len(&self) -> usize {
        self.ready.len()
    }

    /// Entries still waiting on the delay gate
    pub fn delayed_len(&self) -> usize {
        self.delayed.len()
    }

    /// Check whether an id is queued (linear scan)
    pub fn contains(&self, task_id: &TaskId) -> bool {
        self.ready.iter().any(|e| &e.task_id == task_id) || self.delayed.values().any(|e| &e.task_id == task_id)
    }

    /// Iterate all queued ids in no particular order
    pub fn task_ids(&self) -> impl Iterator<Item = &TaskId> {
        self.ready
            .iter()
            .map(|e| &e.task_id)
            .chain(self.delayed.values().map(|e| &e.task_id))
    }
}
