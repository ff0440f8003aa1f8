use clap::{Parser, Subcommand};
use std::path::Path;
use tracing_subscriber::EnvFilter;

use terragen::cli::commands;
use terragen::config::{PresetLibrary, SimulationConfig};
use terragen::persistence::HistoryFormat;

#[derive(Parser)]
#[command(name = "terragen")]
#[command(about = "Procedural hex terrain generation with a daily weather and ecology simulation")]
#[command(version)]
struct Cli {
    /// Path to a run configuration file (built-in defaults when omitted)
    #[arg(short, long)]
    config: Option<String>,

    /// Path to a preset library (built-in presets when omitted or unusable)
    #[arg(short, long)]
    presets: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the initial terrain and print it
    Generate {
        /// Base preset name
        #[arg(long)]
        preset: Option<String>,

        /// Run seed (0 draws a random one)
        #[arg(long)]
        seed: Option<u64>,

        /// Write the rectangular heightmap to this file as JSON
        #[arg(long)]
        heightmap: Option<String>,
    },

    /// Simulate days and export the history
    Run {
        /// Number of days to simulate
        #[arg(short, long)]
        days: Option<u32>,

        /// Base preset name
        #[arg(long)]
        preset: Option<String>,

        /// Run seed (0 draws a random one)
        #[arg(long)]
        seed: Option<u64>,

        /// History output directory
        #[arg(short, long)]
        output: Option<String>,

        /// History format: json or bincode
        #[arg(short, long)]
        format: Option<HistoryFormat>,
    },

    /// List available presets
    Presets,

    /// Show one day of an exported history
    Inspect {
        /// History file (.json or .bin)
        file: String,

        /// Day index (defaults to the last recorded day)
        #[arg(long)]
        day: Option<u64>,
    },
}

fn init_logging(level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}

fn main() {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => match SimulationConfig::from_file(Path::new(path)) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error loading config: {}", e);
                std::process::exit(1);
            }
        },
        None => SimulationConfig::default(),
    };

    init_logging(&config.log_level, cli.log_json);

    let presets = PresetLibrary::load_or_builtin(cli.presets.as_deref().map(Path::new));

    match cli.command {
        Commands::Generate {
            preset,
            seed,
            heightmap,
        } => {
            if let Some(p) = preset {
                config.preset = p;
            }
            if let Some(s) = seed {
                config.seed = s;
            }
            let heightmap = heightmap.as_deref().map(Path::new);
            if let Err(e) = commands::generate(&config, &presets, heightmap) {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }

        Commands::Run {
            days,
            preset,
            seed,
            output,
            format,
        } => {
            if let Some(d) = days {
                config.days = d;
            }
            if let Some(p) = preset {
                config.preset = p;
            }
            if let Some(s) = seed {
                config.seed = s;
            }
            if let Some(o) = output {
                config.history_directory = o;
            }
            if let Some(f) = format {
                config.history_format = f;
            }
            if let Err(e) = commands::run_simulation(&config, &presets) {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }

        Commands::Presets => commands::list_presets(&presets),

        Commands::Inspect { file, day } => {
            if let Err(e) = commands::inspect(Path::new(&file), day) {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
    }
}
