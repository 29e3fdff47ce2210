//! Virtual clock and cancellable task queue.
//!
//! Every delay in the crate is a task on a [`Scheduler`]. Hosts advance the
//! clock explicitly, so a full page choreography can be replayed in tests
//! without real timers.

use std::collections::BTreeMap;

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

/// Milliseconds of virtual time since the session was created.
pub type Millis = u64;

/// Handle of one scheduled task.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct TaskId(pub u64);

/// Deterministic timer queue.
///
/// Tasks fire in `(due, insertion)` order. Firing a task moves `now` to its
/// due time, so tasks scheduled from inside a handler are relative to the
/// moment the handler ran, like nested `setTimeout` calls.
#[derive(Debug)]
pub struct Scheduler<T> {
    now: Millis,
    next_seq: u64,
    queue: BTreeMap<(Millis, u64), T>,
    due_by_id: HashMap<u64, Millis>,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self {
            now: 0,
            next_seq: 0,
            queue: BTreeMap::new(),
            due_by_id: HashMap::new(),
        }
    }

    #[inline]
    pub fn now(&self) -> Millis {
        self.now
    }

    /// Schedule `task` to fire `delay` ms from now.
    pub fn schedule_in(&mut self, delay: Millis, task: T) -> TaskId {
        let due = self.now.saturating_add(delay);
        self.schedule_at(due, task)
    }

    /// Schedule `task` at an absolute time. Past times are clamped to now.
    pub fn schedule_at(&mut self, due: Millis, task: T) -> TaskId {
        let due = due.max(self.now);
        let seq = self.next_seq;
        self.next_seq = self.next_seq.wrapping_add(1);
        self.queue.insert((due, seq), task);
        self.due_by_id.insert(seq, due);
        TaskId(seq)
    }

    /// Cancel a pending task, returning it if it had not fired yet.
    pub fn cancel(&mut self, id: TaskId) -> Option<T> {
        let due = self.due_by_id.remove(&id.0)?;
        self.queue.remove(&(due, id.0))
    }

    #[inline]
    pub fn is_pending(&self, id: TaskId) -> bool {
        self.due_by_id.contains_key(&id.0)
    }

    #[inline]
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Due time of the earliest pending task.
    pub fn next_due(&self) -> Option<Millis> {
        self.queue.first_key_value().map(|((due, _), _)| *due)
    }

    /// Remove and return the earliest task due at or before `until`.
    pub fn pop_due(&mut self, until: Millis) -> Option<(TaskId, T)> {
        let (&(due, _), _) = self.queue.first_key_value()?;
        if due > until {
            return None;
        }
        let ((due, seq), task) = self.queue.pop_first()?;
        self.due_by_id.remove(&seq);
        self.now = self.now.max(due);
        Some((TaskId(seq), task))
    }

    /// Move the clock forward to `until` once every due task has run.
    #[inline]
    pub fn settle_at(&mut self, until: Millis) {
        self.now = self.now.max(until);
    }

    pub fn clear(&mut self) {
        self.queue.clear();
        self.due_by_id.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(s: &mut Scheduler<&'static str>, until: Millis) -> Vec<(Millis, &'static str)> {
        let mut fired = Vec::new();
        while let Some((_, task)) = s.pop_due(until) {
            fired.push((s.now(), task));
        }
        s.settle_at(until);
        fired
    }

    #[test]
    fn fires_in_due_then_insertion_order() {
        let mut s = Scheduler::new();
        s.schedule_in(200, "b");
        s.schedule_in(100, "a");
        s.schedule_in(200, "c");
        assert_eq!(drain(&mut s, 150), vec![(100, "a")]);
        assert_eq!(s.now(), 150);
        assert_eq!(drain(&mut s, 500), vec![(200, "b"), (200, "c")]);
        assert_eq!(s.now(), 500);
    }

    #[test]
    fn nested_scheduling_is_relative_to_fire_time() {
        let mut s = Scheduler::new();
        s.schedule_in(100, "outer");
        let (_, task) = s.pop_due(1000).expect("outer due");
        assert_eq!(task, "outer");
        s.schedule_in(50, "inner");
        assert_eq!(s.next_due(), Some(150));
    }

    #[test]
    fn cancel_removes_pending_task() {
        let mut s = Scheduler::new();
        let a = s.schedule_in(10, "a");
        let b = s.schedule_in(20, "b");
        assert_eq!(s.cancel(a), Some("a"));
        assert_eq!(s.cancel(a), None);
        assert!(!s.is_pending(a));
        assert!(s.is_pending(b));
        assert_eq!(drain(&mut s, 100), vec![(20, "b")]);
        assert_eq!(s.cancel(b), None);
    }

    #[test]
    fn past_due_times_are_clamped() {
        let mut s = Scheduler::new();
        s.settle_at(500);
        s.schedule_at(100, "late");
        assert_eq!(s.next_due(), Some(500));
    }
}
