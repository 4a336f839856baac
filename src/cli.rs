//! Command-line interface for gridpaint.
//!
//! This module handles CLI argument parsing and the subcommands that finish
//! without replaying anything.

use clap::{Parser, Subcommand};
use gridpaint_config::{LogLevel, RenderConfig};
use std::path::PathBuf;

/// gridpaint - replay a recorded redraw stream into a PNG
#[derive(Parser)]
#[command(name = "gridpaint")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Log level (error, warn, info, debug, trace, off)
    #[arg(long, global = true, value_name = "LEVEL", value_parser = parse_log_level)]
    pub log_level: Option<LogLevel>,

    /// Config file to use instead of the default location
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Apply a newline-delimited JSON redraw stream and write the composed surface
    Replay {
        /// Input file, one redraw batch per line
        input: PathBuf,

        /// PNG to write
        #[arg(short, long, value_name = "PATH", default_value = "gridpaint.png")]
        output: PathBuf,

        /// Font file to rasterize with (block glyphs when omitted)
        #[arg(long, value_name = "PATH")]
        font: Option<PathBuf>,

        /// Font size in logical pixels
        #[arg(long, value_name = "SIZE", default_value_t = 14.0)]
        font_size: f32,

        /// Create the base grid with this many columns before replaying
        #[arg(long, value_name = "COLS", requires = "height")]
        width: Option<usize>,

        /// Create the base grid with this many rows before replaying
        #[arg(long, value_name = "ROWS", requires = "width")]
        height: Option<usize>,

        /// Device pixel ratio of the output surface
        #[arg(long, value_name = "RATIO", default_value_t = 1.0)]
        dpr: f32,
    },
    /// Print the effective configuration as YAML
    DumpConfig,
}

fn parse_log_level(value: &str) -> Result<LogLevel, String> {
    LogLevel::parse(value).ok_or_else(|| format!("unknown log level '{value}'"))
}

/// What the replay run was asked to do.
#[derive(Clone, Debug)]
pub struct ReplayOptions {
    pub input: PathBuf,
    pub output: PathBuf,
    pub font: Option<PathBuf>,
    pub font_size: f32,
    /// Base grid size in cells.
    pub base_size: Option<(usize, usize)>,
    pub dpr: f32,
}

/// Options that apply to every run.
#[derive(Clone, Debug)]
pub struct RuntimeOptions {
    pub log_level: Option<LogLevel>,
    pub config: Option<PathBuf>,
    pub replay: ReplayOptions,
}

/// Result of CLI processing
pub enum CliResult {
    /// Go on and replay
    Continue(RuntimeOptions),
    /// Exit with the given code (subcommand completed)
    Exit(i32),
}

/// Load the config named on the command line, or the default one.
pub fn load_config(path: Option<&PathBuf>) -> anyhow::Result<RenderConfig> {
    match path {
        Some(path) => RenderConfig::load_from_path(path),
        None => RenderConfig::load(),
    }
}

/// Process CLI arguments and handle subcommands
pub fn process_cli() -> CliResult {
    let cli = Cli::parse();

    match cli.command {
        Commands::DumpConfig => {
            let result = load_config(cli.config.as_ref()).and_then(|config| config.to_yaml());
            match result {
                Ok(yaml) => {
                    print!("{yaml}");
                    CliResult::Exit(0)
                }
                Err(e) => {
                    eprintln!("gridpaint: error: {e:#}");
                    CliResult::Exit(1)
                }
            }
        }
        Commands::Replay {
            input,
            output,
            font,
            font_size,
            width,
            height,
            dpr,
        } => CliResult::Continue(RuntimeOptions {
            log_level: cli.log_level,
            config: cli.config,
            replay: ReplayOptions {
                input,
                output,
                font,
                font_size,
                base_size: width.zip(height),
                dpr,
            },
        }),
    }
}
