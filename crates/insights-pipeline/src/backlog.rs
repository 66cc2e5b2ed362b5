// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Bounded queue of batches awaiting delivery.
//!
//! Owned by the dispatcher task alone, so it needs no locking. Insertion
//! order is retry order. A delivery pass takes each batch from the front
//! exactly once and requeues the failures at the back, which leaves the
//! failed batches in their original relative order.

use std::collections::VecDeque;

use crate::aggregator::Batch;

#[derive(Debug)]
pub struct Backlog {
    batches: VecDeque<Batch>,
    capacity: usize,
}

impl Backlog {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            batches: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends a newly formed batch.
    ///
    /// # Errors
    ///
    /// Hands the batch back when the backlog is full. The caller decides what
    /// to do with it; the pipeline drops it.
    pub fn push_back(&mut self, batch: Batch) -> Result<(), Batch> {
        if self.is_full() {
            return Err(batch);
        }
        self.batches.push_back(batch);
        Ok(())
    }

    /// Takes the oldest batch.
    pub fn pop_front(&mut self) -> Option<Batch> {
        self.batches.pop_front()
    }

    /// Returns a batch taken by [`Backlog::pop_front`] during the current
    /// pass. Never grows the backlog beyond what it held before the pop.
    pub fn requeue(&mut self, batch: Batch) {
        debug_assert!(self.batches.len() < self.capacity);
        self.batches.push_back(batch);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.batches.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }

    #[must_use]
    pub fn is_full(&self) -> bool {
        self.batches.len() >= self.capacity
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn iter(&self) -> impl Iterator<Item = &Batch> {
        self.batches.iter()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::aggregator::Aggregator;
    use crate::event::Record;

    fn batch(tag: &str) -> Batch {
        let mut aggregator = Aggregator::new(10, 1000, 0.9);
        aggregator.add(Record::from(format!("{{\"tag\":\"{tag}\"}}").as_str()));
        aggregator.flush().unwrap()
    }

    fn tags(backlog: &Backlog) -> Vec<String> {
        backlog
            .iter()
            .map(|b| String::from_utf8(b.payload().to_vec()).unwrap())
            .collect()
    }

    #[test]
    fn test_push_back_preserves_insertion_order() {
        let mut backlog = Backlog::new(3);
        backlog.push_back(batch("a")).unwrap();
        backlog.push_back(batch("b")).unwrap();

        assert_eq!(
            tags(&backlog),
            vec![r#"[{"tag":"a"}]"#, r#"[{"tag":"b"}]"#]
        );
        assert_eq!(backlog.pop_front().unwrap(), batch("a"));
    }

    #[test]
    fn test_push_back_rejects_when_full() {
        let mut backlog = Backlog::new(1);
        backlog.push_back(batch("a")).unwrap();

        let rejected = backlog.push_back(batch("b")).unwrap_err();

        assert_eq!(rejected, batch("b"));
        assert_eq!(backlog.len(), 1);
        assert!(backlog.is_full());
    }

    #[test]
    fn test_requeue_during_pass_keeps_relative_order() {
        let mut backlog = Backlog::new(4);
        for tag in ["a", "b", "c", "d"] {
            backlog.push_back(batch(tag)).unwrap();
        }

        // "b" and "d" are delivered, "a" and "c" fail
        for _ in 0..backlog.len() {
            let next = backlog.pop_front().unwrap();
            if next == batch("a") || next == batch("c") {
                backlog.requeue(next);
            }
        }

        assert_eq!(
            tags(&backlog),
            vec![r#"[{"tag":"a"}]"#, r#"[{"tag":"c"}]"#]
        );
    }

    #[test]
    fn test_empty_backlog() {
        let mut backlog = Backlog::new(2);
        assert!(backlog.is_empty());
        assert!(!backlog.is_full());
        assert_eq!(backlog.capacity(), 2);
        assert!(backlog.pop_front().is_none());
    }
}
