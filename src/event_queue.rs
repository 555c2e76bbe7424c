// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Temporal Cascade Simulation Suite - Event Queue

use std::collections::BTreeMap;

use crate::types::{Event, NodeId, Time};

/// Ordering key for scheduled activations: earliest time first, then push
/// order, so simultaneous events drain FIFO.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct EventKey {
    pub time: Time,
    pub sequence: u64,
}

/// Min-time queue of node activations.
#[derive(Debug, Default)]
pub struct EventQueue {
    events: BTreeMap<EventKey, NodeId>,
    next_sequence: u64,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, node: NodeId, time: Time) {
        let key = EventKey { time, sequence: self.next_sequence };
        self.next_sequence += 1;
        self.events.insert(key, node);
    }

    pub fn pop(&mut self) -> Option<Event> {
        self.events
            .pop_first()
            .map(|(key, node)| Event { node, time: key.time })
    }

    pub fn peek_time(&self) -> Option<Time> {
        self.events.first_key_value().map(|(key, _)| key.time)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pops_in_time_order() {
        let mut q = EventQueue::new();
        q.push(1, 30);
        q.push(2, 10);
        q.push(3, 20);
        assert_eq!(q.peek_time(), Some(10));
        let order: Vec<NodeId> = std::iter::from_fn(|| q.pop()).map(|e| e.node).collect();
        assert_eq!(order, vec![2, 3, 1]);
        assert!(q.is_empty());
    }

    #[test]
    fn test_equal_times_are_fifo() {
        let mut q = EventQueue::new();
        q.push(9, 5);
        q.push(4, 5);
        q.push(7, 1);
        q.push(4, 5);
        assert_eq!(q.len(), 4);
        assert_eq!(q.pop(), Some(Event { node: 7, time: 1 }));
        assert_eq!(q.pop(), Some(Event { node: 9, time: 5 }));
        assert_eq!(q.pop(), Some(Event { node: 4, time: 5 }));
        assert_eq!(q.pop(), Some(Event { node: 4, time: 5 }));
        assert_eq!(q.pop(), None);
    }
}
