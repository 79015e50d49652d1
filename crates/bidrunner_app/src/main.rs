mod config;
mod logging;

use std::thread;
use std::time::Duration;

use anyhow::{anyhow, bail, Result};
use bidrunner_core::{JobParameters, StatusReport};
use bidrunner_engine::{EngineEvent, EngineHandle};
use clap::{Parser, Subcommand};
use runner_logging::runner_info;

use crate::logging::LogDestination;

#[derive(Parser)]
#[command(name = "bidrunner")]
#[command(about = "Launch bid runs and follow their status from the shared queue")]
struct Cli {
    /// Echo engine logs to the terminal in addition to ./bidrunner.log.
    #[arg(long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Launch a new bid run
    Submit {
        bid_name: String,
        input_bucket: String,
        auction_shapefile: String,
        output_bucket: String,

        /// Exit right after the launch instead of following the status
        #[arg(long)]
        no_follow: bool,
    },
    /// One status check: queue messages for the bid, plus the task state
    /// when this session launched it
    Status { bid_name: String },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::initialize(if cli.verbose {
        LogDestination::Both
    } else {
        LogDestination::File
    });

    let app_config = config::load(&config::default_path())?;
    let (runner_config, credentials) = app_config.into_engine()?;
    runner_info!(
        "configured for cluster {} / queue {}",
        runner_config.cluster,
        runner_config.queue_url
    );
    let engine = EngineHandle::new(runner_config, credentials);

    match cli.command {
        Commands::Submit {
            bid_name,
            input_bucket,
            auction_shapefile,
            output_bucket,
            no_follow,
        } => {
            let parameters =
                JobParameters::new(&bid_name, input_bucket, auction_shapefile, output_bucket);
            parameters
                .validate()
                .map_err(|err| anyhow!("incomplete submission: {err}"))?;

            engine.launch(parameters);
            let handle = match wait_for_event(&engine) {
                EngineEvent::Launched { result } => result?,
                other => bail!("unexpected engine event: {other:?}"),
            };
            println!("created new task: {}", handle.task_ids.join(", "));

            if no_follow {
                println!("run `bidrunner status {bid_name}` later to pick up queue messages");
                return Ok(());
            }
            follow(&engine, &bid_name)
        }
        Commands::Status { bid_name } => {
            engine.check_status(&bid_name);
            match wait_for_event(&engine) {
                EngineEvent::Status { report } => {
                    print_report(&report);
                    Ok(())
                }
                other => bail!("unexpected engine event: {other:?}"),
            }
        }
    }
}

/// Keep checking until the task reports STOPPED. Each round's receive call
/// long-polls the queue, so this loop paces itself.
fn follow(engine: &EngineHandle, bid_name: &str) -> Result<()> {
    println!("following '{bid_name}'; press Ctrl-C to stop");
    loop {
        engine.check_status(bid_name);
        match wait_for_event(engine) {
            EngineEvent::Status { report } => {
                print_report(&report);
                if report
                    .job_state
                    .as_ref()
                    .is_some_and(|state| state.0 == "STOPPED")
                {
                    println!("task stopped");
                    return Ok(());
                }
            }
            other => bail!("unexpected engine event: {other:?}"),
        }
    }
}

fn print_report(report: &StatusReport) {
    match &report.job_state {
        Some(state) => println!("task - status: {state}"),
        None => println!("task - no state this round"),
    }
    if report.messages.is_empty() {
        println!("queue - no new messages");
    }
    for message in &report.messages {
        println!("queue - {message}");
    }
}

fn wait_for_event(engine: &EngineHandle) -> EngineEvent {
    loop {
        if let Some(event) = engine.try_recv() {
            return event;
        }
        thread::sleep(Duration::from_millis(20));
    }
}
