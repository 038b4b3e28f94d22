//! qecsim Command-Line Interface
//!
//! Runs five-qubit code experiments under thermal relaxation:
//!
//! ```text
//! qecsim fidelity -n 8 --data-process recovery
//! qecsim sweep --config sweep.yaml --output sweep.json
//! qecsim encoding --theta 1.57
//! qecsim idle --t-max 100000 --points 11
//! ```

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use clap::{Parser, Subcommand};
use console::style;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::{encoding, fidelity, idle, sweep, version};

/// qecsim - [[5,1,3]] code simulation with thermal relaxation noise
#[derive(Parser)]
#[command(name = "qecsim")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Logical fidelity over stabilizer cycles
    Fidelity(fidelity::FidelityArgs),

    /// Fit logical lifetimes over a grid of T1, T2 and gate times
    Sweep(sweep::SweepArgs),

    /// Fidelity of the noisy encoder
    Encoding(encoding::EncodingArgs),

    /// Idle decay of a bare qubit against the code block
    Idle(idle::IdleArgs),

    /// Show version information
    Version,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = match &cli.command {
        Commands::Fidelity(args) => fidelity::execute(args),
        Commands::Sweep(args) => sweep::execute(args),
        Commands::Encoding(args) => encoding::execute(args),
        Commands::Idle(args) => idle::execute(args),
        Commands::Version => {
            version::execute();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{} {:#}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }

    Ok(())
}
