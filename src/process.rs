use crate::clock::VirtualTime;
use crate::event::EventQueue;
use crate::resource::{Resource, ResourceId};
use dyn_clone::DynClone;
use log::{debug, warn};
use std::fmt::Debug;

/// Identity of a Process within a Simulation. Assigned sequentially on spawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProcessId(pub usize);

/// Lifecycle of a Process as seen by the scheduler.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ProcessState {
    /// Spawned; its first resume is scheduled but has not happened yet.
    Created,
    /// Suspended on a timeout or on a resource wait list.
    Waiting,
    /// Currently executing. At most one process is ever in this state.
    Running,
    /// Finished; no further events reference it.
    Terminated,
}

/// What a Process asks for when it hands control back to the scheduler.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Yield {
    /// Resume after `delay` units of virtual time.
    Timeout(VirtualTime),
    /// Take a slot of the resource. If one is free the process is resumed
    /// right away; otherwise it is resumed once a release hands it a slot.
    Acquire(ResourceId),
    /// The process is done.
    Terminate,
}

/// A suspendable unit of simulated behavior.
///
/// A Process is an explicit state machine: each call to `resume` runs it from
/// its current suspension point up to the next one and returns what it is
/// waiting for. `W` is the per-run world (statistics, trace, random source)
/// that every process receives through its [`Context`].
pub trait Process<W>: DynClone + Debug {
    /// A human readable name, used in logs.
    fn name(&self) -> &str;

    /// Runs until the next suspension point.
    fn resume(&mut self, ctx: &mut Context<'_, W>) -> Yield;
}

dyn_clone::clone_trait_object!(<W> Process<W>);

/// Everything a Process may touch while it is running.
pub struct Context<'a, W> {
    /// The running process.
    pub(crate) id: ProcessId,
    /// Virtual time of the event being handled.
    pub(crate) now: VirtualTime,
    /// The Simulation's pending events.
    pub(crate) events: &'a mut EventQueue,
    /// The Simulation's resource pools.
    pub(crate) resources: &'a mut [Resource],
    /// The per-run world.
    pub(crate) world: &'a mut W,
    /// Processes spawned during this resume, registered once it returns.
    pub(crate) spawned: &'a mut Vec<Box<dyn Process<W>>>,
    /// Id the first process spawned during this resume will get.
    pub(crate) next_id: usize,
}

impl<W> Context<'_, W> {
    /// The running process.
    pub const fn id(&self) -> ProcessId {
        self.id
    }

    /// Current virtual time.
    pub const fn now(&self) -> VirtualTime {
        self.now
    }

    /// The per-run world.
    pub fn world(&self) -> &W {
        &*self.world
    }

    /// Mutable access to the per-run world.
    pub fn world_mut(&mut self) -> &mut W {
        &mut *self.world
    }

    /// Starts a new process. Its first resume happens at the current virtual
    /// time, after every event already scheduled for this instant.
    pub fn spawn(&mut self, process: Box<dyn Process<W>>) -> ProcessId {
        let id = ProcessId(self.next_id + self.spawned.len());
        debug!("{:?} spawns {} as {id:?}", self.id, process.name());
        self.events.schedule(self.now, id);
        self.spawned.push(process);
        id
    }

    /// Gives back a slot of `resource`. If a request was waiting, the slot
    /// goes to it and its owner is resumed at the current time.
    pub fn release(&mut self, resource: ResourceId) {
        let Some(pool) = self.resources.get_mut(resource.0) else {
            warn!("{:?} released unknown {resource:?}", self.id);
            return;
        };
        if let Some(request) = pool.release() {
            debug!(
                "{:?} hands {resource:?} to {:?}, waiting since {:.2}",
                self.id, request.process, request.enqueued_at
            );
            self.events.schedule(self.now, request.process);
        }
    }

    /// Length of the wait list of `resource`.
    pub fn queue_len(&self, resource: ResourceId) -> usize {
        self.resources.get(resource.0).map_or(0, Resource::queue_len)
    }

    /// Slots of `resource` currently taken.
    pub fn in_use(&self, resource: ResourceId) -> usize {
        self.resources.get(resource.0).map_or(0, Resource::in_use)
    }
}
