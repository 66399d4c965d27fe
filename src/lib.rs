pub mod call_center;
pub mod clock;
pub mod config;
pub mod event;
pub mod experiment;
pub mod process;
pub mod processes;
pub mod resource;
pub mod stats;
pub mod trace;

pub use call_center::{CallCenter, CallCenterWorld, Outcome};
pub use clock::{VirtualClock, VirtualTime};
pub use config::{Config, ConfigError};
pub use process::{Context, Process, ProcessId, ProcessState, Yield};
pub use resource::{Acquisition, Resource, ResourceId};
pub use stats::{Report, Statistics};

use event::EventQueue;
use log::{debug, info, warn};

/// The current state of a Simulation.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum SimulationState {
    /// The Simulation has only been constructed.
    Constructed,
    /// The Simulation is actively simulating.
    Running,
    /// The Simulation reached its horizon or ran out of events.
    Completed,
}

/// Scheduler bookkeeping for one spawned Process.
#[derive(Clone, Debug)]
struct ProcessEntry<W> {
    /// Copied from the process at spawn time, dropped once it terminates.
    name: Option<String>,
    /// Where the process is in its lifecycle.
    state: ProcessState,
    /// Taken out while the process runs, dropped once it terminates.
    logic: Option<Box<dyn Process<W>>>,
}

impl<W> ProcessEntry<W> {
    /// A freshly spawned entry, not yet resumed.
    fn new(process: Box<dyn Process<W>>) -> Self {
        Self {
            name: Some(process.name().to_owned()),
            state: ProcessState::Created,
            logic: Some(process),
        }
    }
}

/// A Simulation struct holds all the state for any given simulation.
///
/// A Simulation is an engine that advances through its own virtual time. It
/// keeps a queue of pending events, each of which resumes one suspended
/// Process. Running the simulation repeatedly pops the earliest event, moves
/// the clock to it and lets that Process run until it suspends again.
///
/// Execution is strictly cooperative: exactly one Process runs at any virtual
/// instant, so shared state (resources, the world `W`) needs no locking.
///
/// `W` is the per-run world handed to every Process through its Context, e.g.
/// statistics and the random source of a call center model.
#[derive(Clone, Debug)]
pub struct Simulation<W> {
    /// The current virtual time of the Simulation.
    clock: VirtualClock,
    /// Pending resumptions, earliest first.
    events: EventQueue,
    /// Resource pools, indexed by ResourceId.
    resources: Vec<Resource>,
    /// Every process ever spawned, indexed by ProcessId.
    processes: Vec<ProcessEntry<W>>,
    /// The per-run world handed to each Process.
    world: W,
    /// The state of the Simulation.
    state: SimulationState,
}

impl<W> Simulation<W> {
    /// An empty Simulation at time zero owning `world`.
    pub fn new(world: W) -> Self {
        Self {
            clock: VirtualClock::default(),
            events: EventQueue::new(),
            resources: vec![],
            processes: vec![],
            world,
            state: SimulationState::Constructed,
        }
    }

    /// Adds a resource pool with `capacity` slots.
    pub fn add_resource(&mut self, capacity: usize) -> ResourceId {
        self.resources.push(Resource::new(capacity));
        ResourceId(self.resources.len() - 1)
    }

    /// Adds a process. Its first resume is scheduled at the current time.
    pub fn spawn(&mut self, process: Box<dyn Process<W>>) -> ProcessId {
        let id = ProcessId(self.processes.len());
        debug!("Spawning {} as {id:?}", process.name());
        self.events.schedule(self.clock.now(), id);
        self.processes.push(ProcessEntry::new(process));
        id
    }

    /// Runs the simulation until the next event lies beyond `until` or no
    /// events remain. Events scheduled exactly at `until` still fire.
    ///
    /// Processes still suspended afterwards are simply never resumed; any
    /// resource slots they hold stay taken. Calling `run` again with a later
    /// horizon picks up where the previous call stopped. A NaN horizon is
    /// refused and leaves the Simulation untouched.
    pub fn run(&mut self, until: VirtualTime) {
        if until.is_nan() {
            warn!("Refusing to run until NaN");
            return;
        }
        self.state = SimulationState::Running;
        info!(
            "Running simulation from {:.2} until {until:.2} with {} pending events",
            self.clock.now(),
            self.events.len()
        );

        while let Some(next) = self.events.peek_time() {
            if next > until {
                break;
            }
            let Some(event) = self.events.pop() else {
                break;
            };
            self.clock.advance_to(event.time);
            debug!(
                "Event #{} at {:.4} resumes {:?}",
                event.sequence, event.time, event.process
            );
            self.dispatch(event.process);
        }

        self.state = SimulationState::Completed;
        info!(
            "Simulation stopped at {:.2}; {} events left beyond the horizon",
            self.clock.now(),
            self.events.len()
        );
    }

    /// Resumes one process and handles whatever it suspends on.
    fn dispatch(&mut self, id: ProcessId) {
        let Some(entry) = self.processes.get_mut(id.0) else {
            warn!("Event for unknown {id:?}");
            return;
        };
        let Some(mut logic) = entry.logic.take() else {
            warn!("Skipping event for finished {id:?}");
            return;
        };
        entry.state = ProcessState::Running;

        let now = self.clock.now();
        let next_id = self.processes.len();
        let mut spawned = vec![];

        let state = loop {
            let mut ctx = Context {
                id,
                now,
                events: &mut self.events,
                resources: &mut self.resources,
                world: &mut self.world,
                spawned: &mut spawned,
                next_id,
            };
            match logic.resume(&mut ctx) {
                Yield::Timeout(delay) => {
                    // Also maps NaN to zero.
                    self.events.schedule(now + delay.max(0.0), id);
                    break ProcessState::Waiting;
                }
                Yield::Acquire(resource) => {
                    let Some(pool) = self.resources.get_mut(resource.0) else {
                        warn!("{} asked for unknown {resource:?}", logic.name());
                        break ProcessState::Terminated;
                    };
                    match pool.acquire(id, now) {
                        Acquisition::Granted => debug!("{} got {resource:?}", logic.name()),
                        Acquisition::Pending => break ProcessState::Waiting,
                    }
                }
                Yield::Terminate => break ProcessState::Terminated,
            }
        };

        if let Some(entry) = self.processes.get_mut(id.0) {
            entry.state = state;
            if state == ProcessState::Terminated {
                entry.name = None;
            } else {
                entry.logic = Some(logic);
            }
        }
        self.processes.extend(spawned.into_iter().map(ProcessEntry::new));
    }

    /// The current virtual time.
    pub const fn now(&self) -> VirtualTime {
        self.clock.now()
    }

    /// The state of the Simulation.
    pub const fn state(&self) -> &SimulationState {
        &self.state
    }

    /// The per-run world.
    pub const fn world(&self) -> &W {
        &self.world
    }

    /// Mutable access to the world, e.g. to seed statistics before a run.
    pub fn world_mut(&mut self) -> &mut W {
        &mut self.world
    }

    /// Consumes the Simulation, keeping only its world.
    pub fn into_world(self) -> W {
        self.world
    }

    /// The resource pool behind `id`, if it exists.
    pub fn resource(&self, id: ResourceId) -> Option<&Resource> {
        self.resources.get(id.0)
    }

    /// Lifecycle state of a spawned process.
    pub fn process_state(&self, id: ProcessId) -> Option<ProcessState> {
        self.processes.get(id.0).map(|p| p.state)
    }

    /// Name a process was spawned with. Cleared once it terminates.
    pub fn process_name(&self, id: ProcessId) -> Option<&str> {
        self.processes.get(id.0)?.name.as_deref()
    }

    /// Number of processes ever spawned, finished ones included.
    pub fn process_count(&self) -> usize {
        self.processes.len()
    }

    /// Events still waiting to fire.
    pub fn pending_events(&self) -> usize {
        self.events.len()
    }
}
