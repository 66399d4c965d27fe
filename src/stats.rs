use crate::clock::VirtualTime;
use crate::config::Config;
use std::fmt;

/// Raw samples collected while a call center runs.
///
/// Customers and the queue monitor write into it during the run; afterwards
/// it is only read, by [`Statistics::report`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Statistics {
    /// Callers that got on the line.
    pub arrived_count: usize,
    /// Callers whose call ended before the horizon.
    pub finished_count: usize,
    /// Time each served caller spent waiting for an agent, in grant order.
    pub wait_times: Vec<VirtualTime>,
    /// Wait list length at each monitor tick.
    pub queue_lengths: Vec<usize>,
}

impl Statistics {
    /// Mean wait of the served callers, 0 if nobody was served.
    pub fn average_wait(&self) -> f64 {
        mean(self.wait_times.iter().copied(), self.wait_times.len())
    }

    /// Mean of the wait list samples, 0 if none were taken.
    pub fn average_queue_length(&self) -> f64 {
        mean(
            self.queue_lengths.iter().map(|&n| n as f64),
            self.queue_lengths.len(),
        )
    }

    /// Finished calls per unit of virtual time over the whole horizon.
    pub fn throughput(&self, sim_time: VirtualTime) -> f64 {
        self.finished_count as f64 / sim_time
    }

    /// Estimated fraction of time agents are busy: throughput times mean
    /// call length, spread over the agents. This is derived from completed
    /// calls, not measured busy time, so it is rough when few calls finish.
    pub fn utilization(&self, sim_time: VirtualTime, service_time: f64, num_agents: usize) -> f64 {
        self.throughput(sim_time) * service_time / num_agents as f64
    }

    /// Summarizes the samples into the result record of a run.
    pub fn report(&self, config: &Config) -> Report {
        Report {
            num_agents: config.num_agents,
            average_wait: self.average_wait(),
            average_queue_length: self.average_queue_length(),
            throughput: self.throughput(config.sim_time),
            utilization: self.utilization(config.sim_time, config.service_time, config.num_agents),
            arrived_count: self.arrived_count,
            finished_count: self.finished_count,
        }
    }
}

/// Arithmetic mean of `count` samples; 0 for an empty set.
fn mean(samples: impl Iterator<Item = f64>, count: usize) -> f64 {
    if count == 0 {
        return 0.0;
    }
    samples.sum::<f64>() / count as f64
}

/// The result record of a call center run.
///
/// Values are kept at full precision; `Display` rounds to two decimals.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Report {
    /// Capacity of the agent pool.
    pub num_agents: usize,
    /// Mean wait of the served callers, in minutes.
    pub average_wait: f64,
    /// Mean number of callers on the wait list.
    pub average_queue_length: f64,
    /// Finished calls per minute.
    pub throughput: f64,
    /// Estimated share of agent time spent on calls.
    pub utilization: f64,
    /// Callers that got on the line.
    pub arrived_count: usize,
    /// Calls that ended before the horizon.
    pub finished_count: usize,
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Agents:               {}", self.num_agents)?;
        writeln!(f, "Callers arrived:      {}", self.arrived_count)?;
        writeln!(f, "Calls finished:       {}", self.finished_count)?;
        writeln!(f, "Average wait:         {:.2} min", self.average_wait)?;
        writeln!(f, "Average queue length: {:.2}", self.average_queue_length)?;
        writeln!(f, "Throughput:           {:.2} calls/min", self.throughput)?;
        write!(f, "Utilization:          {:.2}", self.utilization)
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn empty_samples_average_to_zero() {
        let stats = Statistics::default();
        assert_eq!(stats.average_wait(), 0.0);
        assert_eq!(stats.average_queue_length(), 0.0);
        assert_eq!(stats.throughput(30.0), 0.0);
        assert_eq!(stats.utilization(30.0, 8.0, 2), 0.0);
    }

    #[test]
    fn averages_use_every_sample() {
        let stats = Statistics {
            wait_times: vec![0.0, 9.0, 3.0],
            queue_lengths: vec![0, 1, 2, 1],
            ..Default::default()
        };
        assert!(approx(stats.average_wait(), 4.0));
        assert!(approx(stats.average_queue_length(), 1.0));
    }

    #[test]
    fn utilization_is_estimated_from_throughput() {
        let stats = Statistics {
            finished_count: 5,
            ..Default::default()
        };
        assert!(approx(stats.throughput(100.0), 0.05));
        assert!(approx(stats.utilization(100.0, 8.0, 2), 0.2));
    }

    #[test]
    fn report_carries_counts_and_metrics() {
        let stats = Statistics {
            arrived_count: 7,
            finished_count: 5,
            wait_times: vec![1.0, 2.0],
            queue_lengths: vec![3],
        };
        let config = Config {
            sim_time: 100.0,
            num_agents: 2,
            service_time: 8.0,
            ..Default::default()
        };
        let report = stats.report(&config);
        assert_eq!(report.num_agents, 2);
        assert_eq!(report.arrived_count, 7);
        assert_eq!(report.finished_count, 5);
        assert!(approx(report.average_wait, 1.5));
        assert!(approx(report.average_queue_length, 3.0));
        assert!(approx(report.utilization, 0.2));
    }

    #[test]
    fn display_rounds_to_two_decimals() {
        let report = Report {
            num_agents: 3,
            average_wait: 1.23456,
            throughput: 0.1,
            utilization: 2.0 / 3.0,
            ..Default::default()
        };
        let text = report.to_string();
        assert!(text.contains("Average wait:         1.23 min"));
        assert!(text.contains("Throughput:           0.10 calls/min"));
        assert!(text.ends_with("Utilization:          0.67"));
    }
}
