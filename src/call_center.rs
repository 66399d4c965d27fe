//! A call center: a pool of agents, randomly arriving callers, and a monitor
//! watching the queue, run for a fixed horizon.

use crate::config::{Config, ConfigError};
use crate::process::ProcessId;
use crate::processes::{ArrivalGenerator, Customer, Delay, QueueMonitor};
use crate::resource::ResourceId;
use crate::stats::{Report, Statistics};
use crate::trace::TraceEvent;
use crate::Simulation;
use log::{debug, info};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Per-run state shared by every call center process: the raw statistics,
/// the event trace, and the seeded random source.
#[derive(Clone, Debug)]
pub struct CallCenterWorld {
    /// Samples gathered by customers and the queue monitor.
    pub stats: Statistics,
    /// Every trace event, in the order it happened.
    pub trace: Vec<TraceEvent>,
    /// The only random source of the run.
    pub rng: StdRng,
}

impl CallCenterWorld {
    /// An empty world whose random source is seeded with `seed`.
    pub fn new(seed: u64) -> Self {
        Self {
            stats: Statistics::default(),
            trace: vec![],
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Logs `event` and appends it to the trace.
    pub(crate) fn record(&mut self, event: TraceEvent) {
        debug!("{event}");
        self.trace.push(event);
    }
}

/// What a finished run hands back to its caller.
#[derive(Clone, Debug, PartialEq)]
pub struct Outcome {
    /// The result record.
    pub report: Report,
    /// The raw samples behind the report.
    pub statistics: Statistics,
    /// The event trace of the run.
    pub trace: Vec<TraceEvent>,
    /// Callers holding an agent when the horizon was reached.
    pub in_service: usize,
    /// Callers still on the wait list when the horizon was reached.
    pub waiting: usize,
}

/// A call center simulation, built from a validated [`Config`].
#[derive(Clone, Debug)]
pub struct CallCenter {
    /// The validated parameters of the run.
    config: Config,
    /// The engine, with the generator and the monitor already spawned.
    simulation: Simulation<CallCenterWorld>,
    /// The agent pool.
    agents: ResourceId,
}

impl CallCenter {
    /// Exponential arrival gaps and call durations with the configured means.
    pub fn new(config: Config) -> Result<Self, ConfigError> {
        config.validate()?;
        let gap = Delay::exponential(config.arrival_gap)?;
        let service = Delay::exponential(config.service_time)?;
        Self::with_delays(config, gap, service)
    }

    /// A call center whose arrival gaps and call durations come from the
    /// given sources instead of the configured means.
    pub fn with_delays(config: Config, gap: Delay, service: Delay) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut simulation = Simulation::new(CallCenterWorld::new(config.seed));
        let agents = simulation.add_resource(config.num_agents);
        simulation.spawn(Box::new(ArrivalGenerator::new(agents, gap, service)));
        simulation.spawn(Box::new(QueueMonitor::new(agents, config.sample_time)));
        Ok(Self {
            config,
            simulation,
            agents,
        })
    }

    /// Puts a caller on the line at the current time, outside the regular
    /// arrival stream.
    pub fn add_caller(&mut self, name: &str, service: Delay) -> ProcessId {
        self.simulation.world_mut().stats.arrived_count += 1;
        let customer = Customer::new(name, self.agents, service);
        self.simulation.spawn(Box::new(customer))
    }

    /// The validated parameters of the run.
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// The engine before it is run.
    pub const fn simulation(&self) -> &Simulation<CallCenterWorld> {
        &self.simulation
    }

    /// The agent pool.
    pub const fn agents(&self) -> ResourceId {
        self.agents
    }

    /// Runs to the configured horizon and summarizes the run.
    pub fn run(mut self) -> Outcome {
        info!(
            "Call center with {} agents, arrivals every {:.2}, calls of {:.2}, seed {}",
            self.config.num_agents,
            self.config.arrival_gap,
            self.config.service_time,
            self.config.seed
        );
        self.simulation.run(self.config.sim_time);

        let (in_service, waiting) = self
            .simulation
            .resource(self.agents)
            .map_or((0, 0), |pool| (pool.in_use(), pool.queue_len()));
        let world = self.simulation.into_world();
        let report = world.stats.report(&self.config);
        info!(
            "{} callers arrived, {} served, {in_service} in service and {waiting} waiting at the horizon",
            report.arrived_count, report.finished_count
        );

        Outcome {
            report,
            statistics: world.stats,
            trace: world.trace,
            in_service,
            waiting,
        }
    }
}

/// Validates `config`, runs it, and returns the outcome.
pub fn simulate(config: &Config) -> Result<Outcome, ConfigError> {
    CallCenter::new(config.clone()).map(CallCenter::run)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    #[test]
    fn invalid_config_never_builds_a_simulation() {
        init();
        let config = Config {
            num_agents: 0,
            ..Default::default()
        };
        assert!(matches!(CallCenter::new(config), Err(ConfigError::NoAgents)));
        assert!(simulate(&Config {
            arrival_gap: -1.0,
            ..Default::default()
        })
        .is_err());
    }

    #[test]
    fn default_run_is_consistent() {
        init();
        let outcome = simulate(&Config::default()).unwrap();
        let stats = &outcome.statistics;

        assert_eq!(outcome.report.num_agents, 2);
        assert_eq!(stats.wait_times.len(), stats.finished_count + outcome.in_service);
        assert_eq!(
            stats.arrived_count,
            stats.finished_count + outcome.in_service + outcome.waiting
        );
        assert!(outcome.in_service <= 2);
        assert_eq!(stats.queue_lengths.len(), 30);
        assert!(stats.wait_times.iter().all(|w| *w >= 0.0));
    }

    #[test]
    fn fixed_delays_are_exact() {
        init();
        let config = Config {
            sim_time: 10.0,
            num_agents: 1,
            ..Default::default()
        };
        let outcome = CallCenter::with_delays(config, Delay::Fixed(3.0), Delay::Fixed(4.0))
            .unwrap()
            .run();

        // Arrivals at 3, 6, 9; the first call ends at 7, the second starts then.
        assert_eq!(outcome.statistics.arrived_count, 3);
        assert_eq!(outcome.statistics.finished_count, 1);
        assert_eq!(outcome.statistics.wait_times, vec![0.0, 1.0]);
        assert_eq!((outcome.in_service, outcome.waiting), (1, 1));
        assert_eq!(outcome.report.throughput, 0.1);
    }
}
