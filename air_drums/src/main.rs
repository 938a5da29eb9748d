//! air_drums — command line entry point.

use std::path::PathBuf;

use air_drums::app::run;
use air_drums::audio::AudioChoice;
use air_drums::config::AppConfig;
use clap::{ArgAction, Parser};
use region_mask::ColumnMapping;
use tracing::error;

/// Play drums in the air with a red stick and a webcam.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Opts {
    /// TOML config file; relative asset paths resolve against its directory
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Audio backend
    #[arg(long, value_enum)]
    audio: Option<AudioChoice>,

    /// Camera device index
    #[arg(long)]
    camera: Option<u32>,

    /// Show the camera image unmirrored
    #[arg(long)]
    no_mirror: bool,

    /// Spread four instruments evenly instead of stacking the fourth on the third
    #[arg(long)]
    symmetric_layout: bool,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    dump_config: bool,

    /// Log verbosity (-v info, -vv debug, -vvv trace); AIR_DRUMS_LOG overrides
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn install_tracing(opts: &Opts) -> Result<(), tracing_subscriber::util::TryInitError> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter_layer = EnvFilter::try_from_env("AIR_DRUMS_LOG").unwrap_or_else(|_| {
        EnvFilter::new(match opts.verbose {
            0 => "air_drums=warn,air_kit=warn,region_mask=warn",
            1 => "air_drums=info,air_kit=info,region_mask=info",
            2 => "air_drums=debug,air_kit=debug,region_mask=debug",
            _ => "air_drums=trace,air_kit=trace,region_mask=trace",
        })
    });

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt::layer())
        .try_init()
}

fn load_config(opts: &Opts) -> Result<AppConfig, air_drums::config::ConfigError> {
    let mut cfg = match &opts.config {
        Some(path) => AppConfig::load_file(path)?,
        None       => AppConfig::default(),
    };
    if let Some(audio) = opts.audio {
        cfg.audio.backend = audio;
    }
    if let Some(index) = opts.camera {
        cfg.camera.index = index;
    }
    if opts.no_mirror {
        cfg.camera.mirror = false;
    }
    if opts.symmetric_layout {
        cfg.trigger.layout = ColumnMapping::Symmetric;
    }
    Ok(cfg)
}

fn main() {
    let opts = Opts::parse();
    if let Err(e) = install_tracing(&opts) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    let cfg = match load_config(&opts) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    if opts.dump_config {
        match cfg.to_toml_string() {
            Ok(text) => print!("{}", text),
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
        return;
    }

    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║              Air Drums — hit the pads with a red stick       ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();

    #[cfg(feature = "camera")]
    println!("  Mode: webcam {}", cfg.camera.index);
    #[cfg(not(feature = "camera"))]
    println!("  Mode: Mouse simulation  (use --features camera for a webcam)");
    println!("  Kit:  {}", cfg
        .instruments
        .iter()
        .map(|i| i.kind.name())
        .collect::<Vec<_>>()
        .join(", "));
    println!("  Quit: press '{}'", cfg.trigger.quit_key);
    println!();

    if let Err(e) = run(cfg) {
        error!(error = %e, "air_drums failed");
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
