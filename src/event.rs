use crate::clock::VirtualTime;
use crate::process::ProcessId;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// A scheduled resumption of a suspended Process.
#[derive(Clone, Debug)]
pub struct Event {
    /// When the process should be resumed.
    pub time: VirtualTime,
    /// Insertion order; breaks ties between events at the same time.
    pub sequence: u64,
    /// The process to resume.
    pub process: ProcessId,
}

impl PartialEq for Event {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Event {}

// Reversed so that `BinaryHeap`, a max-heap, pops the earliest event first.
impl Ord for Event {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .time
            .total_cmp(&self.time)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

impl PartialOrd for Event {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Pending events ordered by (time, sequence).
///
/// Events sharing a timestamp come out in the order they were scheduled,
/// which is what makes a seeded run reproducible.
#[derive(Clone, Debug, Default)]
pub struct EventQueue {
    /// Pending events; the earliest is on top.
    heap: BinaryHeap<Event>,
    /// Sequence number handed to the next scheduled event.
    next_sequence: u64,
}

impl EventQueue {
    /// An empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules `process` to resume at `time`, returning the event's sequence number.
    pub fn schedule(&mut self, time: VirtualTime, process: ProcessId) -> u64 {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.heap.push(Event {
            time,
            sequence,
            process,
        });
        sequence
    }

    /// The time of the earliest pending event.
    pub fn peek_time(&self) -> Option<VirtualTime> {
        self.heap.peek().map(|e| e.time)
    }

    /// Removes and returns the earliest pending event.
    pub fn pop(&mut self) -> Option<Event> {
        self.heap.pop()
    }

    /// Number of pending events.
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Whether no event is pending.
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pops_earliest_first() {
        let mut queue = EventQueue::new();
        queue.schedule(5.0, ProcessId(0));
        queue.schedule(1.0, ProcessId(1));
        queue.schedule(3.0, ProcessId(2));

        let order: Vec<_> = std::iter::from_fn(|| queue.pop())
            .map(|e| e.process)
            .collect();
        assert_eq!(order, vec![ProcessId(1), ProcessId(2), ProcessId(0)]);
    }

    #[test]
    fn ties_fire_in_insertion_order() {
        let mut queue = EventQueue::new();
        for id in [4, 2, 9, 0] {
            queue.schedule(2.0, ProcessId(id));
        }
        queue.schedule(1.0, ProcessId(7));

        let order: Vec<_> = std::iter::from_fn(|| queue.pop())
            .map(|e| e.process.0)
            .collect();
        assert_eq!(order, vec![7, 4, 2, 9, 0]);
    }

    #[test]
    fn sequence_numbers_increase() {
        let mut queue = EventQueue::new();
        let a = queue.schedule(10.0, ProcessId(0));
        let b = queue.schedule(0.0, ProcessId(0));
        assert!(b > a);
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.peek_time(), Some(0.0));
    }
}
