use crate::clock::VirtualTime;
use crate::process::ProcessId;
use log::debug;
use std::collections::VecDeque;

/// Handle to a Resource owned by a Simulation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ResourceId(pub(crate) usize);

/// The outcome of asking a Resource for a slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Acquisition {
    /// A slot was free; the requester keeps running.
    Granted,
    /// Every slot is taken; the requester was parked on the wait list.
    Pending,
}

/// A parked request for a slot.
#[derive(Clone, Debug, PartialEq)]
pub struct Request {
    /// Who is waiting.
    pub process: ProcessId,
    /// When they started waiting.
    pub enqueued_at: VirtualTime,
}

/// A capacity-bounded pool (e.g. the agents of a call center) with a
/// first-come-first-served wait list.
///
/// `in_use` never exceeds `capacity`, and the wait list is only non-empty
/// while every slot is taken. Processes run one at a time, so no locking
/// is needed around either.
#[derive(Clone, Debug)]
pub struct Resource {
    /// Number of slots.
    capacity: usize,
    /// Slots currently taken.
    in_use: usize,
    /// Parked requests, oldest first.
    wait_list: VecDeque<Request>,
}

impl Resource {
    /// A pool with `capacity` slots. Zero-capacity pools are rejected by
    /// configuration validation before one is ever built.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            in_use: 0,
            wait_list: VecDeque::new(),
        }
    }

    /// Number of slots.
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Slots currently taken.
    pub const fn in_use(&self) -> usize {
        self.in_use
    }

    /// How many requests are waiting for a slot.
    pub fn queue_len(&self) -> usize {
        self.wait_list.len()
    }

    /// The parked requests, head first.
    pub fn waiting(&self) -> impl Iterator<Item = &Request> {
        self.wait_list.iter()
    }

    /// Takes a slot for `process` if one is free, otherwise parks it at the
    /// tail of the wait list.
    pub fn acquire(&mut self, process: ProcessId, now: VirtualTime) -> Acquisition {
        if self.in_use < self.capacity {
            self.in_use += 1;
            Acquisition::Granted
        } else {
            debug!("{process:?} waits at {now:.2}, {} ahead", self.wait_list.len());
            self.wait_list.push_back(Request {
                process,
                enqueued_at: now,
            });
            Acquisition::Pending
        }
    }

    /// Gives a slot back. If anyone is waiting, the slot passes straight to
    /// the head of the wait list and that request is returned so the caller
    /// can schedule its resumption.
    pub fn release(&mut self) -> Option<Request> {
        self.in_use = self.in_use.saturating_sub(1);
        let next = self.wait_list.pop_front()?;
        self.in_use += 1;
        Some(next)
    }
}
