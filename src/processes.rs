//! The processes of the call center model.
//!
//! Each is a small state machine resumed by the scheduler. Customers run
//! to completion; the arrival generator and the queue monitor loop forever
//! and are simply never resumed again once the horizon is reached.

use crate::call_center::CallCenterWorld;
use crate::clock::VirtualTime;
use crate::config::ConfigError;
use crate::process::{Context, Process, Yield};
use crate::resource::ResourceId;
use crate::trace::TraceEvent;
use rand::Rng;
use rand_distr::{Distribution, Exp};

/// A source of durations: exponentially distributed around a mean, or fixed.
#[derive(Clone, Copy, Debug)]
pub enum Delay {
    /// Drawn from the seeded random source.
    Exponential(Exp<f64>),
    /// Always the same duration.
    Fixed(VirtualTime),
}

impl Delay {
    /// Exponential durations with the given mean.
    pub fn exponential(mean: f64) -> Result<Self, ConfigError> {
        const FIELD: &str = "mean delay";
        if !mean.is_finite() {
            return Err(ConfigError::NotFinite {
                field: FIELD,
                value: mean,
            });
        }
        if mean <= 0.0 {
            return Err(ConfigError::NonPositive {
                field: FIELD,
                value: mean,
            });
        }
        Exp::new(mean.recip())
            .map(Self::Exponential)
            .map_err(|_| ConfigError::NonPositive {
                field: FIELD,
                value: mean,
            })
    }

    /// Draws one duration.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> VirtualTime {
        match self {
            Self::Exponential(dist) => dist.sample(rng),
            Self::Fixed(duration) => *duration,
        }
    }
}

/// Where a customer is in its call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CustomerStage {
    /// Not yet on the line.
    Created,
    /// Parked on the agents' wait list, or about to be.
    WaitingForAgent,
    /// Talking to an agent.
    InService,
    /// Hung up.
    Terminated,
}

/// One caller: arrives, waits for a free agent, talks, hangs up.
#[derive(Clone, Debug)]
pub struct Customer {
    /// Shown in the trace, e.g. "Caller 3".
    name: String,
    /// The agent pool to call into.
    agents: ResourceId,
    /// Source of the call duration.
    service: Delay,
    /// Current stage of the call.
    stage: CustomerStage,
    /// When the caller got on the line.
    arrival_time: VirtualTime,
}

impl Customer {
    /// A caller that has not arrived yet.
    pub fn new(name: impl Into<String>, agents: ResourceId, service: Delay) -> Self {
        Self {
            name: name.into(),
            agents,
            service,
            stage: CustomerStage::Created,
            arrival_time: 0.0,
        }
    }

    /// Current stage of the call.
    pub const fn stage(&self) -> CustomerStage {
        self.stage
    }
}

impl Process<CallCenterWorld> for Customer {
    fn name(&self) -> &str {
        &self.name
    }

    fn resume(&mut self, ctx: &mut Context<'_, CallCenterWorld>) -> Yield {
        let now = ctx.now();
        match self.stage {
            CustomerStage::Created => {
                self.arrival_time = now;
                ctx.world_mut().record(TraceEvent::Arrived {
                    caller: self.name.clone(),
                    time: now,
                });
                self.stage = CustomerStage::WaitingForAgent;
                Yield::Acquire(self.agents)
            }
            CustomerStage::WaitingForAgent => {
                let waited = now - self.arrival_time;
                let world = ctx.world_mut();
                world.stats.wait_times.push(waited);
                world.record(TraceEvent::CallStarted {
                    caller: self.name.clone(),
                    time: now,
                    waited,
                });
                let duration = self.service.sample(&mut world.rng);
                self.stage = CustomerStage::InService;
                Yield::Timeout(duration)
            }
            CustomerStage::InService => {
                ctx.world_mut().record(TraceEvent::CallEnded {
                    caller: self.name.clone(),
                    time: now,
                });
                ctx.release(self.agents);
                ctx.world_mut().stats.finished_count += 1;
                self.stage = CustomerStage::Terminated;
                Yield::Terminate
            }
            CustomerStage::Terminated => Yield::Terminate,
        }
    }
}

/// Spawns a new customer after every inter-arrival gap, forever.
#[derive(Clone, Debug)]
pub struct ArrivalGenerator {
    /// The agent pool every spawned caller dials into.
    agents: ResourceId,
    /// Source of the gap between two callers.
    gap: Delay,
    /// Handed to every spawned caller.
    service: Delay,
    /// Callers spawned so far, used to number them.
    callers: usize,
    /// Set after the first resume, which only waits for the first gap.
    started: bool,
}

impl ArrivalGenerator {
    /// A generator that has not produced any caller yet.
    pub const fn new(agents: ResourceId, gap: Delay, service: Delay) -> Self {
        Self {
            agents,
            gap,
            service,
            callers: 0,
            started: false,
        }
    }
}

impl Process<CallCenterWorld> for ArrivalGenerator {
    fn name(&self) -> &str {
        "arrivals"
    }

    fn resume(&mut self, ctx: &mut Context<'_, CallCenterWorld>) -> Yield {
        if self.started {
            self.callers += 1;
            ctx.world_mut().stats.arrived_count += 1;
            ctx.spawn(Box::new(Customer::new(
                format!("Caller {}", self.callers),
                self.agents,
                self.service,
            )));
        }
        self.started = true;
        Yield::Timeout(self.gap.sample(&mut ctx.world_mut().rng))
    }
}

/// Samples the length of the agents' wait list at a fixed interval, forever.
#[derive(Clone, Debug)]
pub struct QueueMonitor {
    /// The pool whose wait list is sampled.
    agents: ResourceId,
    /// Time between two samples.
    interval: VirtualTime,
    /// Set after the first resume, which takes no sample.
    started: bool,
}

impl QueueMonitor {
    /// A monitor whose first sample is taken one `interval` after it starts.
    pub const fn new(agents: ResourceId, interval: VirtualTime) -> Self {
        Self {
            agents,
            interval,
            started: false,
        }
    }
}

impl Process<CallCenterWorld> for QueueMonitor {
    fn name(&self) -> &str {
        "queue monitor"
    }

    fn resume(&mut self, ctx: &mut Context<'_, CallCenterWorld>) -> Yield {
        if self.started {
            let waiting = ctx.queue_len(self.agents);
            ctx.world_mut().stats.queue_lengths.push(waiting);
        }
        self.started = true;
        Yield::Timeout(self.interval)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::{ProcessState, Simulation};

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    #[test]
    fn exponential_delay_needs_finite_positive_mean() {
        assert!(Delay::exponential(5.0).is_ok());
        assert!(Delay::exponential(0.0).is_err());
        assert!(Delay::exponential(-1.0).is_err());
        assert!(matches!(
            Delay::exponential(0.0),
            Err(ConfigError::NonPositive { .. })
        ));
        assert!(matches!(
            Delay::exponential(f64::NAN),
            Err(ConfigError::NotFinite { .. })
        ));
        assert!(matches!(
            Delay::exponential(f64::INFINITY),
            Err(ConfigError::NotFinite { .. })
        ));
    }

    #[test]
    fn delays_are_non_negative() {
        let mut world = CallCenterWorld::new(7);
        let delay = Delay::exponential(3.0).unwrap();
        assert!((0..1_000).all(|_| delay.sample(&mut world.rng) >= 0.0));
        assert_eq!(Delay::Fixed(2.5).sample(&mut world.rng), 2.5);
    }

    #[test]
    fn customer_walks_through_its_stages() {
        init();
        let mut simulation = Simulation::new(CallCenterWorld::new(1));
        let agents = simulation.add_resource(1);
        let id = simulation.spawn(Box::new(Customer::new(
            "Caller 1",
            agents,
            Delay::Fixed(4.0),
        )));

        simulation.run(3.0);
        assert_eq!(simulation.process_state(id), Some(ProcessState::Waiting));
        assert_eq!(simulation.resource(agents).unwrap().in_use(), 1);

        simulation.run(10.0);
        assert_eq!(simulation.process_state(id), Some(ProcessState::Terminated));
        assert_eq!(simulation.resource(agents).unwrap().in_use(), 0);

        let world = simulation.world();
        assert_eq!(world.stats.finished_count, 1);
        assert_eq!(world.stats.wait_times, vec![0.0]);
        let lines: Vec<String> = world.trace.iter().map(ToString::to_string).collect();
        assert_eq!(
            lines,
            vec![
                "Caller 1 arrives at time 0.00",
                "Caller 1 starts call at 0.00 (Waited 0.00 min)",
                "Caller 1 ends call at 4.00",
            ]
        );
    }

    #[test]
    fn generator_spawns_callers_after_each_gap() {
        init();
        let mut simulation = Simulation::new(CallCenterWorld::new(1));
        let agents = simulation.add_resource(10);
        simulation.spawn(Box::new(ArrivalGenerator::new(
            agents,
            Delay::Fixed(2.0),
            Delay::Fixed(100.0),
        )));
        simulation.run(7.0);

        let world = simulation.world();
        assert_eq!(world.stats.arrived_count, 3);
        let arrivals: Vec<(String, f64)> = world
            .trace
            .iter()
            .filter(|e| matches!(e, TraceEvent::Arrived { .. }))
            .map(|e| (e.caller().to_owned(), e.time()))
            .collect();
        assert_eq!(
            arrivals,
            vec![
                ("Caller 1".to_owned(), 2.0),
                ("Caller 2".to_owned(), 4.0),
                ("Caller 3".to_owned(), 6.0)
            ]
        );
        // Generator plus three customers, none finished.
        assert_eq!(simulation.process_count(), 4);
        assert_eq!(simulation.process_state(crate::ProcessId(0)), Some(ProcessState::Waiting));
    }

    #[test]
    fn monitor_samples_wait_list_each_interval() {
        init();
        let mut simulation = Simulation::new(CallCenterWorld::new(1));
        let agents = simulation.add_resource(1);
        simulation.spawn(Box::new(QueueMonitor::new(agents, 1.0)));
        for n in 0..3 {
            simulation.spawn(Box::new(Customer::new(
                format!("Caller {n}"),
                agents,
                Delay::Fixed(2.5),
            )));
        }
        simulation.run(6.0);

        // One in service and two waiting until 2.5, then one waiting until 5.0.
        assert_eq!(
            simulation.world().stats.queue_lengths,
            vec![2, 2, 1, 1, 0, 0]
        );
    }
}
