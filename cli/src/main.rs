//! CLI for replaying side effect scenarios against an effect store
//!
//! A scenario is a YAML file naming a built-in reducer, the initial state and
//! a list of steps: dispatches, scheduler turns, manual flushes and reducer
//! replacements.
//!
//! # Examples
//!
//! ```bash
//! # help menu
//! r-sidefx --help
//!
//! # replay a scenario
//! r-sidefx --scenario scenario.yml
//! ```
use clap::Parser;
use color_eyre::eyre::Result;
use itertools::Itertools;
use log::*;
use r_sidefx::options::Validation;
use std::path::PathBuf;

mod counter;
mod scenario;

use scenario::{Report, Scenario};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
/// CLI for replaying side effect scenarios against an effect store
struct Args {
    /// Path to the YAML scenario to replay
    #[arg(short, long)]
    scenario: PathBuf,

    /// Accept plain actions yielded by reducers, overriding the scenario
    #[arg(long, default_value_t = false)]
    permissive: bool,

    /// Output final report in json instead of table text
    #[arg(long, default_value_t = false)]
    json: bool,

    /// Only print final output nothing else
    #[arg(short, long, default_value_t = false)]
    quiet: bool,

    /// Prints debug logs including those from r-sidefx
    #[arg(long, default_value_t = false)]
    debug: bool,
}

#[doc(hidden)]
fn initialize_logger(args: &Args) -> Result<()> {
    let filter = if args.quiet {
        simplelog::LevelFilter::Error
    } else if args.debug {
        simplelog::LevelFilter::Debug
    } else {
        simplelog::LevelFilter::Info
    };

    simplelog::TermLogger::init(
        filter,
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    Ok(())
}

#[doc(hidden)]
fn apply_args(args: &Args, scenario: &mut Scenario) {
    if args.permissive {
        scenario.validation = Validation::Permissive;
    }
}

#[doc(hidden)]
fn print_args(args: &Args, scenario: &Scenario) {
    info!("configuration:");
    info!("scenario:   {}", args.scenario.display());
    info!("reducer:    {}", scenario.reducer);
    info!("validation: {:?}", scenario.validation);
    info!("steps:      {}", scenario.steps.len());
    info!("json:       {}", args.json);
    info!("quiet:      {}", args.quiet);
}

#[doc(hidden)]
fn render_report(args: &Args, report: &Report) -> Result<String> {
    if args.json {
        return Ok(serde_json::to_string(report)?);
    }

    let mut state_table = prettytable::Table::new();
    state_table.add_row(prettytable::row![
        "COUNT", "PONGS", "TURNS", "PENDING",
    ]);
    state_table.add_row(prettytable::row![
        report.state.count,
        report.state.pongs,
        report.turns,
        report.pending_effects
    ]);

    let mut effects_table = prettytable::Table::new();
    effects_table.add_row(prettytable::row!["#", "EFFECT"]);
    for (i, entry) in report.effects.iter().enumerate() {
        let position = i + 1;
        effects_table.add_row(prettytable::row![position, entry]);
    }

    let mut out = format!("{state_table}\n{effects_table}");

    if !report.flushed.is_empty() {
        out.push_str(&format!(
            "\nflushed: {}\n",
            report.flushed.iter().join(", ")
        ));
    }

    Ok(out)
}

#[doc(hidden)]
fn main() -> Result<()> {
    color_eyre::install()?;

    let args = Args::parse();

    initialize_logger(&args)?;

    let mut scenario = Scenario::load(&args.scenario)?;

    apply_args(&args, &mut scenario);

    print_args(&args, &scenario);

    let report = scenario::run(&scenario)?;

    info!("final report:");
    println!("{}", render_report(&args, &report)?);

    Ok(())
}

#[cfg(test)]
#[path = "./main_tests.rs"]
mod tests;
