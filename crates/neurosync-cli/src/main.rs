use anyhow::Result;
use clap::{Parser, Subcommand};
use neurosync_core::{EngineConfig, PlaybackMode, ResultExt, SimulatedSensor};
use std::path::PathBuf;

mod drivers;
mod headless;
mod tui;

/// NeuroSync - biofeedback trainer simulator
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Engine configuration file (.toml or .json)
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Wait for every cue to finish before the next tick
    #[arg(long, global = true)]
    blocking_audio: bool,

    /// Enable verbose debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the engine headless; buttons are read from stdin (n, b, s, s+n)
    Run {
        /// Attention knob position (0-4095)
        #[arg(long, default_value = "2048")]
        attention: u16,

        /// Relaxation knob position (0-4095)
        #[arg(long, default_value = "2048")]
        relaxation: u16,

        /// Random walk of the knobs, in ADC counts per tick
        #[arg(long, default_value = "0")]
        drift: u16,

        /// Seed for the sensor noise
        #[arg(long)]
        seed: Option<u64>,

        /// Stop after this many ticks
        #[arg(long)]
        ticks: Option<u64>,

        /// Print a JSON report on exit
        #[arg(long)]
        json: bool,

        /// Do not print frames
        #[arg(short, long)]
        quiet: bool,
    },

    /// Interactive terminal dashboard
    Ui {
        /// Initial attention knob position (0-4095)
        #[arg(long, default_value = "2048")]
        attention: u16,

        /// Initial relaxation knob position (0-4095)
        #[arg(long, default_value = "2048")]
        relaxation: u16,
    },

    /// Print the default configuration, or write it to a file
    Config {
        /// Output file (.toml or .json); prints TOML to stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn init_tracing(verbose: bool) {
    if verbose {
        tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::new("debug"))
            .with_target(true)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
            )
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }
}

fn load_config(cli: &Cli) -> Result<EngineConfig> {
    let mut config = match &cli.config {
        Some(path) => EngineConfig::from_file(path)
            .with_context(|| format!("Failed to load {}", path.display()))?,
        None => EngineConfig::default(),
    };
    if cli.blocking_audio {
        config = config.with_playback(PlaybackMode::Blocking);
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // The dashboard owns the terminal; log nowhere
    if !matches!(cli.command, Commands::Ui { .. }) {
        init_tracing(cli.verbose);
    }

    let config = load_config(&cli)?;

    match cli.command {
        Commands::Run {
            attention,
            relaxation,
            drift,
            seed,
            ticks,
            json,
            quiet,
        } => {
            if !quiet {
                print_banner(&config);
            }
            let opts = headless::RunOptions {
                attention_knob: attention,
                relaxation_knob: relaxation,
                drift,
                seed,
                ticks,
                json,
                quiet,
            };
            headless::run(config, opts).await?;
        }
        Commands::Ui {
            attention,
            relaxation,
        } => {
            let sensor = SimulatedSensor::new(attention, relaxation);
            let runtime = tokio::runtime::Handle::current();
            tokio::task::spawn_blocking(move || tui::run_tui(config, sensor, runtime)).await??;
        }
        Commands::Config { output } => match output {
            Some(path) => {
                EngineConfig::default()
                    .to_file(&path)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                println!("Wrote default configuration to {}", path.display());
            }
            None => println!("{}", toml::to_string_pretty(&EngineConfig::default())?),
        },
    }

    Ok(())
}

fn print_banner(config: &EngineConfig) {
    println!();
    println!("╔═══════════════════════════════════════════════╗");
    println!("║        NEUROSYNC - BIOFEEDBACK TRAINER        ║");
    println!("╚═══════════════════════════════════════════════╝");
    println!();
    println!("   ├─ tick      {} ms", config.tick_interval_ms);
    println!("   ├─ debounce  {} ms", config.debounce_ms);
    println!(
        "   └─ training  {} s, {} levels",
        config.training.session_timeout_secs, config.training.max_level
    );
    println!();
    println!("Buttons: n = NEXT, b = BACK, s = SET, s+n = SET with NEXT held");
    println!("Press Ctrl+C to stop");
    println!();
}
