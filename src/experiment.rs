use crate::call_center::simulate;
use crate::config::{Config, ConfigError};
use crate::stats::Report;

/// ObjectiveScore is a measure of how a run performed according to an
/// objective function. Higher is better.
pub type ObjectiveScore = f64;

/// Runs `config` `replications` times with seeds `seed`, `seed + 1`, ...
/// and returns one report per run, in seed order.
pub fn replicate(config: &Config, replications: u64) -> Result<Vec<Report>, ConfigError> {
    (0..replications)
        .map(|i| simulate(&config.with_seed(config.seed.wrapping_add(i))).map(|o| o.report))
        .collect()
}

/// Runs the same configuration and seed once per agent count, so the
/// reports differ only in capacity.
pub fn compare_agent_counts(config: &Config, counts: &[usize]) -> Result<Vec<Report>, ConfigError> {
    counts
        .iter()
        .map(|&agents| simulate(&config.with_agents(agents)).map(|o| o.report))
        .collect()
}

/// The report that maximizes `objective_function`. NaN scores never win.
///
/// A typical objective trades waiting against staffing, e.g.
/// `|r| -(r.average_wait + r.num_agents as f64)`.
pub fn best_by(
    reports: &[Report],
    objective_function: impl Fn(&Report) -> ObjectiveScore,
) -> Option<&Report> {
    let mut best: Option<(&Report, ObjectiveScore)> = None;
    for report in reports {
        let score = objective_function(report);
        if score.is_nan() {
            continue;
        }
        match best {
            Some((_, high_score)) if high_score >= score => {}
            _ => best = Some((report, score)),
        }
    }
    best.map(|(report, _)| report)
}

/// Averages the metrics of several reports, e.g. replications of one
/// configuration. Counts are averaged with integer division.
pub fn mean_report(reports: &[Report]) -> Option<Report> {
    let first = reports.first()?;
    let n = reports.len();
    let avg = |f: fn(&Report) -> f64| reports.iter().map(f).sum::<f64>() / n as f64;

    Some(Report {
        num_agents: first.num_agents,
        average_wait: avg(|r| r.average_wait),
        average_queue_length: avg(|r| r.average_queue_length),
        throughput: avg(|r| r.throughput),
        utilization: avg(|r| r.utilization),
        arrived_count: reports.iter().map(|r| r.arrived_count).sum::<usize>() / n,
        finished_count: reports.iter().map(|r| r.finished_count).sum::<usize>() / n,
    })
}
