//! Command line front end: builds a Config, runs the call center and prints
//! the trace and the rounded result record.

use callsim::call_center::simulate;
use callsim::config::parse_agent_count;
use callsim::experiment::{compare_agent_counts, mean_report, replicate};
use callsim::{Config, ConfigError, Report};
use clap::Parser;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

/// Call center simulation
#[derive(Parser, Debug)]
#[command(
    name = "callsim",
    about = "Discrete-event simulation of a call center with a fixed number of agents."
)]
struct Cli {
    /// Path to a TOML config file; flags below override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Horizon of the run, in minutes
    #[arg(long)]
    sim_time: Option<f64>,

    /// Number of agents
    #[arg(short, long)]
    agents: Option<usize>,

    /// Mean minutes between two callers
    #[arg(long)]
    arrival_gap: Option<f64>,

    /// Mean call duration in minutes
    #[arg(long)]
    service_time: Option<f64>,

    /// Minutes between two queue length samples
    #[arg(long)]
    sample_time: Option<f64>,

    /// Random seed
    #[arg(short, long)]
    seed: Option<u64>,

    /// Ask for the number of agents on the terminal
    #[arg(long, conflicts_with = "agents")]
    prompt_agents: bool,

    /// Compare several agent counts on the same seed (e.g. --compare 1,2,3)
    #[arg(long, value_delimiter = ',', num_args = 1..)]
    compare: Vec<usize>,

    /// Average the report over this many seeds
    #[arg(short, long, default_value_t = 1)]
    replications: u64,

    /// Do not print the event trace
    #[arg(short, long)]
    quiet: bool,
}

impl Cli {
    /// Defaults, then the config file, then flags, then the prompt.
    fn build_config(&self) -> Result<Config, ConfigError> {
        let mut config = match &self.config {
            Some(path) => Config::load(path)?,
            None => Config::default(),
        };
        if let Some(sim_time) = self.sim_time {
            config.sim_time = sim_time;
        }
        if let Some(agents) = self.agents {
            config.num_agents = agents;
        }
        if let Some(arrival_gap) = self.arrival_gap {
            config.arrival_gap = arrival_gap;
        }
        if let Some(service_time) = self.service_time {
            config.service_time = service_time;
        }
        if let Some(sample_time) = self.sample_time {
            config.sample_time = sample_time;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if self.prompt_agents {
            config.num_agents = prompt_agent_count()?;
        }
        config.validate()?;
        Ok(config)
    }
}

/// Asks for the number of agents on stdin.
fn prompt_agent_count() -> Result<usize, ConfigError> {
    print!("Enter number of agents: ");
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    parse_agent_count(&answer)
}

/// Prints `report` under a title.
fn print_report(title: &str, report: &Report) {
    println!("\n{title}");
    println!("{report}");
}

/// Runs whatever mode the flags select.
fn run(cli: &Cli) -> Result<(), ConfigError> {
    let config = cli.build_config()?;
    println!("SIMPLE CALL CENTER SIMULATION\n");

    if !cli.compare.is_empty() {
        for report in compare_agent_counts(&config, &cli.compare)? {
            print_report(&format!("{} agents", report.num_agents), &report);
        }
        return Ok(());
    }

    if cli.replications > 1 {
        let reports = replicate(&config, cli.replications)?;
        if let Some(mean) = mean_report(&reports) {
            print_report(
                &format!("Mean of {} replications", reports.len()),
                &mean,
            );
        }
        return Ok(());
    }

    let outcome = simulate(&config)?;
    if !cli.quiet {
        for event in &outcome.trace {
            println!("{event}");
        }
    }
    print_report("Results", &outcome.report);
    Ok(())
}

/// The single line printed to stderr when a run is rejected.
fn error_line(error: &ConfigError) -> String {
    format!("error: {error}")
}

/// Parses flags, runs, and maps configuration errors to a failing exit code.
fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", error_line(&e));
            ExitCode::FAILURE
        }
    }
}
