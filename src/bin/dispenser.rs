//! Console driver for the vending and filling station controllers.
//!
//! Reads one event per line from stdin (coin/product labels or `RETURN` for
//! the vending machine, `D`/`U` for the filling station) and ticks the machine
//! every poll period so timeouts fire without input. `quit` or EOF exits.

use clap::{Parser, Subcommand};
use dispenser::config::{DispenserConfig, LogLevel};
use dispenser::cooler::{ConsoleValve, CoolerEvent, CoolerState, NullValve, ValveSink, WaterCooler};
use dispenser::engine::{drive, ChannelSource};
use dispenser::vending::{Catalog, ConsoleSink, NullSink, Vending, VendingSink, VendingState};
use dispenser::{Controller, MachineError, StateMachine, StateMachineBuilder, SystemClock};
use std::io::BufRead;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::Duration;
use tracing::{info, warn, Level};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "dispenser", version, about = "Vending and water filling station simulator")]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Log as JSON
    #[arg(long)]
    json: bool,

    /// Poll period in milliseconds
    #[arg(long, default_value_t = 200)]
    tick_ms: u64,

    /// Discard actuator output instead of printing it
    #[arg(long)]
    null_sink: bool,

    /// Print the transition history as JSON on exit
    #[arg(long)]
    snapshot: bool,

    #[command(subcommand)]
    machine: Machine,
}

#[derive(Debug, Clone, Copy, Subcommand)]
enum Machine {
    /// Coin-operated vending dispenser
    Vending,
    /// Water bottle filling station
    Cooler,
}

fn level(log_level: LogLevel) -> Level {
    match log_level {
        LogLevel::Trace => Level::TRACE,
        LogLevel::Debug => Level::DEBUG,
        LogLevel::Info => Level::INFO,
        LogLevel::Warn => Level::WARN,
        LogLevel::Error => Level::ERROR,
    }
}

/// Setup tracing subscriber based on CLI arguments and the config file.
fn setup_tracing(args: &Args, config: &DispenserConfig) {
    let level = if args.verbose {
        Level::DEBUG
    } else {
        level(config.log_level)
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    if args.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .compact()
            .init();
    }
}

/// Forward parsed stdin lines over a channel. The sender is dropped on EOF
/// or `quit`, which closes the source.
fn spawn_reader<E, P>(parse: P) -> Receiver<E>
where
    E: Send + 'static,
    P: Fn(&str) -> Result<E, MachineError> + Send + 'static,
{
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if line.eq_ignore_ascii_case("quit") {
                break;
            }
            match parse(line) {
                Ok(event) => {
                    if tx.send(event).is_err() {
                        break;
                    }
                }
                Err(err) => warn!(%err, "ignoring input"),
            }
        }
    });
    rx
}

fn print_snapshot<C: Controller>(machine: &StateMachine<C>) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(machine.history())?);
    Ok(())
}

fn run_vending(args: &Args, config: &DispenserConfig) -> Result<(), Box<dyn std::error::Error>> {
    let catalog = config.vending.catalog();
    print_menu(&catalog);

    let sink: Box<dyn VendingSink> = if args.null_sink {
        Box::new(NullSink)
    } else {
        Box::new(ConsoleSink)
    };
    let controller = Vending::new(catalog.clone(), sink)?;
    let mut machine = StateMachineBuilder::new(controller)
        .states(VendingState::ALL.iter().copied())
        .initial(VendingState::Waiting)
        .history_limit(config.history_limit)
        .build()?;
    info!(machine = %machine.id(), "vending machine ready");

    let rx = spawn_reader(move |label| catalog.parse_event(label));
    let mut source = ChannelSource::new(rx, Duration::from_millis(args.tick_ms));

    let mut last_balance = machine.controller().balance_message();
    let updates = drive(&mut machine, &mut source, |machine| {
        let balance = machine.controller().balance_message();
        if balance != last_balance {
            println!("{balance}");
            last_balance = balance;
        }
    })?;
    info!(updates, "input closed");

    if args.snapshot {
        print_snapshot(&machine)?;
    }
    Ok(())
}

fn print_menu(catalog: &Catalog) {
    println!("ENTER COINS");
    for (id, value) in catalog.coins() {
        println!("  {id:<10} {value}¢");
    }
    println!("SELECT ITEM");
    for product in catalog.products() {
        println!("  {:<10} ¢{}", product.id, product.price);
    }
    println!("RETURN to get your coins back, quit to exit");
}

fn run_cooler(args: &Args, config: &DispenserConfig) -> Result<(), Box<dyn std::error::Error>> {
    let valve: Box<dyn ValveSink> = if args.null_sink {
        Box::new(NullValve)
    } else {
        Box::new(ConsoleValve)
    };
    let controller = WaterCooler::new(config.cooler.fill_timeout(), valve);
    let mut machine = StateMachineBuilder::new(controller)
        .states(CoolerState::ALL.iter().copied())
        .initial(CoolerState::Waiting)
        .clock(SystemClock)
        .history_limit(config.history_limit)
        .build()?;
    info!(machine = %machine.id(), timeout = ?config.cooler.fill_timeout(), "filling station ready");
    println!("D = bottle detected, U = bottle removed, quit to exit");

    let rx = spawn_reader(CoolerEvent::parse);
    let mut source = ChannelSource::new(rx, Duration::from_millis(args.tick_ms));

    let mut last_state = machine.current_state().copied();
    let updates = drive(&mut machine, &mut source, |machine| {
        let state = machine.current_state().copied();
        if state != last_state {
            if let Some(state) = state {
                println!("\n[{state}]");
            }
            last_state = state;
        }
    })?;
    info!(updates, "input closed");

    if args.snapshot {
        print_snapshot(&machine)?;
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => DispenserConfig::load_validated(path)?,
        None => DispenserConfig::default(),
    };
    setup_tracing(&args, &config);

    match args.machine {
        Machine::Vending => run_vending(&args, &config),
        Machine::Cooler => run_cooler(&args, &config),
    }
}
