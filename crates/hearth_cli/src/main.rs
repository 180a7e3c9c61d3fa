//! Hearth CLI
//!
//! Simulate the hero motion headlessly and manage `hearth.toml`.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use hearth_animation::SpringConfig;
use hearth_core::Breakpoint;
use hearth_hero::HeroConfig;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod simulate;

use simulate::SimulationOptions;

#[derive(Parser)]
#[command(name = "hearth")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Hero scroll-motion engine CLI", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a scroll script against a mounted hero
    Simulate {
        /// Configuration file (defaults apply when omitted)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Rendered height of the hero element in pixels
        #[arg(long, default_value = "1000")]
        height: f32,

        /// Viewport width in pixels
        #[arg(long, default_value = "1280")]
        width: f32,

        /// Comma-separated scroll offsets
        #[arg(
            short,
            long,
            value_delimiter = ',',
            allow_negative_numbers = true,
            default_value = "0,100,250,500,750,1000,1200"
        )]
        scroll: Vec<f32>,

        /// Frames stepped after each scroll sample
        #[arg(short, long, default_value = "30")]
        frames: usize,

        /// Simulated frame rate
        #[arg(long, default_value = "60")]
        fps: f32,

        /// Emit JSON lines instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Print the default configuration, or write it to a file
    Config {
        /// Output path
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Validate a configuration file
    Check {
        /// Configuration file
        #[arg(default_value = "hearth.toml")]
        path: PathBuf,
    },

    /// Show engine defaults
    Info,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    match cli.command {
        Commands::Simulate {
            config,
            height,
            width,
            scroll,
            frames,
            fps,
            json,
        } => cmd_simulate(
            config.as_deref(),
            SimulationOptions {
                height,
                width,
                scroll,
                frames_per_sample: frames,
                fps,
            },
            json,
        ),

        Commands::Config { output, force } => cmd_config(output.as_deref(), force),

        Commands::Check { path } => cmd_check(&path),

        Commands::Info => cmd_info(),
    }
}

fn load_config(path: Option<&Path>) -> Result<HeroConfig> {
    match path {
        Some(path) => HeroConfig::load(path)
            .with_context(|| format!("Failed to load {}", path.display())),
        None => Ok(HeroConfig::default()),
    }
}

fn cmd_simulate(config: Option<&Path>, options: SimulationOptions, json: bool) -> Result<()> {
    let config = load_config(config)?;

    info!(
        "Simulating {} samples, {} frames each at {}fps",
        options.scroll.len(),
        options.frames_per_sample,
        options.fps
    );
    let steps = simulate::run(&config, &options)?;

    if json {
        print!("{}", simulate::format_json_lines(&steps)?);
    } else {
        print!("{}", simulate::format_table(&steps));
    }
    Ok(())
}

fn cmd_config(output: Option<&Path>, force: bool) -> Result<()> {
    let config = HeroConfig::default();

    match output {
        Some(path) => {
            if path.exists() && !force {
                anyhow::bail!(
                    "{} already exists. Pass --force to overwrite it.",
                    path.display()
                );
            }
            config
                .save(path)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!("Wrote default configuration to {}", path.display());
        }
        None => {
            let text = config.to_toml().context("Failed to render configuration")?;
            print!("{}", text);
        }
    }
    Ok(())
}

fn cmd_check(path: &Path) -> Result<()> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let config = HeroConfig::from_toml_str(&content)
        .with_context(|| format!("Invalid configuration in {}", path.display()))?;

    println!("{}: ok", path.display());
    println!("  gate:     {}", config.gate.breakpoint);
    println!("  layers:   {:?}", config.parallax.multipliers);
    println!(
        "  spring:   stiffness {} damping {} mass {} (ratio {:.2})",
        config.parallax.spring.stiffness,
        config.parallax.spring.damping,
        config.parallax.spring.mass,
        config.parallax.spring.damping_ratio()
    );
    println!(
        "  entrance: {} blocks, {}ms + {}ms stagger",
        config.entrance.blocks, config.entrance.duration_ms, config.entrance.stagger_ms
    );
    Ok(())
}

fn cmd_info() -> Result<()> {
    println!("Hearth hero motion engine");
    println!("=========================");
    println!();
    println!("Version: {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Breakpoints:");
    for bp in Breakpoint::ALL {
        println!("  - {:<2} >= {}px", bp.name(), bp.min_width());
    }
    println!();

    let spring = SpringConfig::parallax();
    println!("Parallax spring:");
    println!("  - stiffness {}", spring.stiffness);
    println!("  - damping   {}", spring.damping);
    println!("  - mass      {}", spring.mass);
    println!(
        "  - rest      {} px / {} px/s",
        spring.rest_delta, spring.rest_speed
    );
    println!("  - damping ratio {:.2}", spring.damping_ratio());
    println!();

    let config = HeroConfig::default();
    println!("Default layers: {:?}", config.parallax.multipliers);
    println!("Default gate:   {}", config.gate.breakpoint);

    Ok(())
}
