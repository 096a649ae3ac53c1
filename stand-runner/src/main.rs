mod config;
mod reporter;
mod sim;

use std::io::{self, BufRead};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use clap::Parser;
use shared::stand_hal::{OperatorButton, StandCommand};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use tsc_rs::actuators::ActuatorBank;
use tsc_rs::interlock::Interlock;
use tsc_rs::messages::MessageBoard;
use tsc_rs::schedule::FiringSchedule;
use tsc_rs::sensing::SensingPipeline;
use tsc_rs::state_store::StateStore;
use tsc_rs::tasks::{control_task, sensing_task};
use tsc_rs::Tsc;

use crate::sim::SimStand;

/// Static-fire test stand controller, dry-run harness against a simulated
/// plant. Telemetry records stream to stdout; operator inputs arrive on
/// stdin.
#[derive(Parser)]
#[command(version)]
struct Args {
    /// Stand configuration file (JSON); bench defaults when omitted.
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    let config = match config::load_config(args.config.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            error!(%err, "could not load stand configuration");
            std::process::exit(1);
        }
    };

    if !FiringSchedule::from_config(&config.sequence).is_ordered() {
        error!("sequence timings do not produce an ordered firing schedule");
        std::process::exit(1);
    }

    let stand = SimStand::new(config.calibration);
    let (sensors, actuators) = stand.split();

    let lock_timeout = Duration::from_millis(config.lock_timeout_ms);
    let store = Arc::new(StateStore::new(lock_timeout));
    let interlock = Arc::new(Interlock::new());
    let messages = Arc::new(MessageBoard::new());
    let bank = Arc::new(ActuatorBank::new(Box::new(actuators), lock_timeout));

    let pipeline = SensingPipeline::new(&config, store.clone(), interlock.clone(), bank.clone());
    let sampling_period = Duration::from_millis(config.sampling_period_ms);
    let control_period = Duration::from_millis(config.control_period_ms);
    let telemetry_period = Duration::from_millis(config.telemetry_period_ms);

    let tsc = Tsc::new(
        config,
        bank,
        store.clone(),
        interlock,
        messages.clone(),
    );

    let running = Arc::new(AtomicBool::new(true));
    let (command_tx, command_rx) = mpsc::channel();

    let mut join_handles = Vec::new();

    let task_running = running.clone();
    join_handles.push(thread::spawn(move || {
        sensing_task(Box::new(sensors), pipeline, sampling_period, task_running);
    }));

    let task_running = running.clone();
    join_handles.push(thread::spawn(move || {
        control_task(tsc, command_rx, control_period, task_running);
    }));

    let task_running = running.clone();
    join_handles.push(thread::spawn(move || {
        reporter::reporter_task(
            store,
            messages,
            Box::new(io::stdout()),
            telemetry_period,
            task_running,
        );
    }));

    info!("stand controller running; type 'help' for operator commands");
    operator_loop(&stand, &command_tx);

    running.store(false, Ordering::Relaxed);
    for join_handle in join_handles {
        if let Err(err) = join_handle.join() {
            error!("error joining thread: {err:?}");
        }
    }

    info!("shut down gracefully");
}

/// Blocking stdin loop mapping operator lines to stand commands and
/// simulated button presses. Returns on `quit` or end of input.
fn operator_loop(stand: &SimStand, commands: &mpsc::Sender<StandCommand>) {
    let stdin = io::stdin();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(_) => break,
        };

        let mut words = line.split_whitespace();
        let verb = match words.next() {
            Some(verb) => verb,
            None => continue,
        };

        let command = match verb {
            "quit" | "exit" => break,
            "reset" => Some(StandCommand::Reset),
            "abort" => Some(StandCommand::Abort),
            "test" => Some(StandCommand::StartTest),
            "end-test" => Some(StandCommand::EndTest),
            "press" | "release" => {
                match parse_button(words.next()) {
                    Some(button) => stand.set_button(button, verb == "press"),
                    None => eprintln!("unknown button; one of: vent heating ignition feeding main"),
                }
                None
            }
            "help" => {
                eprintln!("commands: reset abort test end-test quit");
                eprintln!("buttons:  press|release vent|heating|ignition|feeding|main");
                None
            }
            _ => {
                eprintln!("unknown command '{verb}'; type 'help'");
                None
            }
        };

        if let Some(command) = command {
            if commands.send(command).is_err() {
                break;
            }
        }
    }
}

fn parse_button(word: Option<&str>) -> Option<OperatorButton> {
    match word? {
        "vent" => Some(OperatorButton::Vent),
        "heating" => Some(OperatorButton::Heating),
        "ignition" => Some(OperatorButton::Ignition),
        "feeding" => Some(OperatorButton::FeedingValve),
        "main" => Some(OperatorButton::MainValve),
        _ => None,
    }
}
