//! # Priority queue over discovered endpoints.
//!
//! Min-heap keyed by admission priority: lower values drain first. Equal
//! priorities drain in insertion order — the standard library heap is not
//! stable, so each item carries a monotonically increasing sequence number
//! as a secondary key.
//!
//! Priorities come from a name→priority map supplied at construction; names
//! absent from the map get the default. The lookup is option-typed, so an
//! explicit priority of 0 is honored rather than treated as "absent".

use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, HashMap};

use crate::services::ServiceEndpoint;

/// Priority assigned when nothing else applies.
pub const DEFAULT_SERVICE_PRIORITY: i64 = 99;

/// Heap node: an endpoint with its resolved admission priority.
#[derive(Clone, Debug)]
pub struct EndpointItem {
    pub priority: i64,
    pub endpoint: ServiceEndpoint,
    seq: u64,
}

impl PartialEq for EndpointItem {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority && self.seq == other.seq
    }
}

impl Eq for EndpointItem {}

impl PartialOrd for EndpointItem {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for EndpointItem {
    fn cmp(&self, other: &Self) -> Ordering {
        self.priority
            .cmp(&other.priority)
            .then(self.seq.cmp(&other.seq))
    }
}

/// Min-heap of endpoints keyed by `(priority, insertion order)`.
pub struct PriorityQueue {
    heap: BinaryHeap<Reverse<EndpointItem>>,
    priorities: HashMap<String, i64>,
    default_priority: i64,
    next_seq: u64,
}

impl PriorityQueue {
    /// Creates a queue resolving priorities through `priorities`, falling
    /// back to `default_priority` for unknown names.
    pub fn new(priorities: HashMap<String, i64>, default_priority: i64) -> Self {
        Self {
            heap: BinaryHeap::new(),
            priorities,
            default_priority,
            next_seq: 0,
        }
    }

    /// Enqueues an endpoint at its mapped priority (or the default).
    pub fn push(&mut self, endpoint: ServiceEndpoint) {
        let priority = self
            .priorities
            .get(&endpoint.name)
            .copied()
            .unwrap_or(self.default_priority);
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Reverse(EndpointItem {
            priority,
            endpoint,
            seq,
        }));
    }

    /// Removes and returns the lowest-priority item.
    pub fn pop(&mut self) -> Option<EndpointItem> {
        self.heap.pop().map(|Reverse(item)| item)
    }

    /// Number of queued items.
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// True when nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn endpoint(name: &str) -> ServiceEndpoint {
        ServiceEndpoint::bare(name, "10.0.0.1:80")
    }

    fn queue(pairs: &[(&str, i64)]) -> PriorityQueue {
        let map = pairs
            .iter()
            .map(|(n, p)| (n.to_string(), *p))
            .collect::<HashMap<_, _>>();
        PriorityQueue::new(map, DEFAULT_SERVICE_PRIORITY)
    }

    #[test]
    fn pops_yield_non_decreasing_priorities() {
        let mut q = queue(&[("a", 40), ("b", 7), ("c", 99), ("d", 7), ("e", 1)]);
        for name in ["a", "b", "c", "d", "e"] {
            q.push(endpoint(name));
        }

        let mut last = i64::MIN;
        while let Some(item) = q.pop() {
            assert!(item.priority >= last);
            last = item.priority;
        }
    }

    #[test]
    fn equal_priorities_drain_in_insertion_order() {
        let mut q = queue(&[("x", 5), ("y", 5), ("z", 5)]);
        for name in ["x", "y", "z"] {
            q.push(endpoint(name));
        }

        let order: Vec<String> = std::iter::from_fn(|| q.pop())
            .map(|i| i.endpoint.name)
            .collect();
        assert_eq!(order, ["x", "y", "z"]);
    }

    #[test]
    fn unmapped_names_get_the_default() {
        let mut q = queue(&[("known", 10)]);
        q.push(endpoint("unknown"));
        q.push(endpoint("known"));

        let first = q.pop().unwrap();
        assert_eq!(first.endpoint.name, "known");
        assert_eq!(first.priority, 10);
        let second = q.pop().unwrap();
        assert_eq!(second.priority, DEFAULT_SERVICE_PRIORITY);
    }

    #[test]
    fn explicit_zero_priority_is_honored() {
        let mut q = queue(&[("zero", 0)]);
        q.push(endpoint("other"));
        q.push(endpoint("zero"));

        assert_eq!(q.pop().unwrap().endpoint.name, "zero");
    }
}
