//! Dispatch queue types

use std::collections::VecDeque;

use thiserror::Error;

use crate::domain::{ExternalId, WorkItem};

/// Returned by [`DispatchQueue::dequeue`] when nothing is waiting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("dispatch queue is empty")]
pub struct EmptyQueue;

/// A work item plus how many submissions of it have been issued
///
/// The item itself is never modified between attempts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedItem {
    pub item: WorkItem,
    pub attempts: u32,
}

impl QueuedItem {
    pub fn new(item: WorkItem) -> Self {
        Self { item, attempts: 0 }
    }
}

/// Unbounded FIFO of work items awaiting submission
#[derive(Debug, Default)]
pub struct DispatchQueue {
    items: VecDeque<QueuedItem>,
}

impl DispatchQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a fresh item at the tail
    pub fn enqueue(&mut self, item: WorkItem) {
        self.items.push_back(QueuedItem::new(item));
    }

    /// Put a previously dequeued item back at the tail, keeping its attempt count
    pub fn requeue(&mut self, queued: QueuedItem) {
        self.items.push_back(queued);
    }

    /// Remove and return the oldest item
    pub fn dequeue(&mut self) -> Result<QueuedItem, EmptyQueue> {
        self.items.pop_front().ok_or(EmptyQueue)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }
}

impl Extend<WorkItem> for DispatchQueue {
    fn extend<I: IntoIterator<Item = WorkItem>>(&mut self, iter: I) {
        self.items.extend(iter.into_iter().map(QueuedItem::new));
    }
}

impl FromIterator<WorkItem> for DispatchQueue {
    fn from_iter<I: IntoIterator<Item = WorkItem>>(iter: I) -> Self {
        let mut queue = Self::new();
        queue.extend(iter);
        queue
    }
}

/// Statistics for one dispatch run
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DispatchStats {
    pub total_submitted: u64,
    pub total_accepted: u64,
    pub total_rejected: u64,
    pub total_timed_out: u64,
    pub total_retried: u64,
    pub total_abandoned: u64,
    pub peak_queue_depth: usize,
    pub peak_in_flight: usize,
}

/// Outcome of a finished dispatch run
#[derive(Debug, Default)]
pub struct DispatchReport {
    /// Ids of created records, in completion order
    pub accepted: Vec<ExternalId>,
    /// Items dropped after exhausting the retry policy
    pub abandoned: Vec<QueuedItem>,
    pub stats: DispatchStats,
}

impl DispatchReport {
    /// True when every item was accepted
    pub fn is_complete(&self) -> bool {
        self.abandoned.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AssignmentOccurrence, WorkKind};
    use chrono::NaiveDate;
    use proptest::prelude::*;

    fn item(n: usize) -> WorkItem {
        WorkItem::Assignment(AssignmentOccurrence {
            title: format!("Homework {}", n),
            kind: WorkKind::Homework,
            due: NaiveDate::from_ymd_opt(2024, 1, 8).unwrap().and_hms_opt(23, 59, 0).unwrap(),
            parent: ExternalId::new("p"),
            mandatory: true,
        })
    }

    #[test]
    fn test_fifo_order() {
        let mut queue = DispatchQueue::new();
        queue.enqueue(item(1));
        queue.enqueue(item(2));
        queue.enqueue(item(3));

        assert_eq!(queue.len(), 3);
        assert_eq!(queue.dequeue().unwrap().item.title(), "Homework 1");
        assert_eq!(queue.dequeue().unwrap().item.title(), "Homework 2");
        assert_eq!(queue.dequeue().unwrap().item.title(), "Homework 3");
        assert!(queue.is_empty());
    }

    #[test]
    fn test_empty_dequeue_is_distinct() {
        let mut queue = DispatchQueue::new();
        assert!(queue.is_empty());
        assert_eq!(queue.dequeue(), Err(EmptyQueue));
    }

    #[test]
    fn test_requeue_goes_to_tail_and_keeps_attempts() {
        let mut queue: DispatchQueue = (1..=2).map(item).collect();
        let mut first = queue.dequeue().unwrap();
        first.attempts = 2;
        queue.requeue(first.clone());

        assert_eq!(queue.dequeue().unwrap().item.title(), "Homework 2");
        let back = queue.dequeue().unwrap();
        assert_eq!(back, first);
        assert_eq!(back.attempts, 2);
    }

    #[derive(Debug, Clone)]
    enum Op {
        Enqueue,
        Dequeue,
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![Just(Op::Enqueue), Just(Op::Dequeue)]
    }

    proptest! {
        #[test]
        fn prop_matches_vecdeque_model(ops in proptest::collection::vec(op(), 0..200)) {
            let mut queue = DispatchQueue::new();
            let mut model = VecDeque::new();
            let mut next = 0usize;

            for op in ops {
                match op {
                    Op::Enqueue => {
                        queue.enqueue(item(next));
                        model.push_back(next);
                        next += 1;
                    }
                    Op::Dequeue => {
                        let got = queue.dequeue().ok().map(|q| q.item.title().to_string());
                        let want = model.pop_front().map(|n| format!("Homework {}", n));
                        prop_assert_eq!(got, want);
                    }
                }
                prop_assert_eq!(queue.is_empty(), model.is_empty());
                prop_assert_eq!(queue.len(), model.len());
            }
        }
    }
}
