//! Banner configuration
//!
//! Merges the global configuration file, built-in defaults, and command-line
//! overrides into one immutable snapshot. Precedence per field: CLI > file >
//! default. The file is read permissively: absent, unreadable, or malformed
//! all behave as if it defined nothing.

use clap::Parser;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

use crate::constants::{defaults, paths};

/// Command-line overrides. Unset options defer to the config file, then to
/// the built-in defaults. The hide flags are one-directional: they can force
/// a banner off, never on.
#[derive(Parser, Debug, Clone, Default)]
#[command(
    name = "classification-banner",
    about = "Persistent classification banner docked to the screen edges"
)]
pub struct Args {
    /// Classification message
    #[arg(short, long)]
    pub message: Option<String>,

    /// Foreground (text) color
    #[arg(short, long)]
    pub fgcolor: Option<String>,

    /// Background color
    #[arg(short, long)]
    pub bgcolor: Option<String>,

    /// Font face
    #[arg(long)]
    pub face: Option<String>,

    /// Font size
    #[arg(long)]
    pub size: Option<String>,

    /// Font weight
    #[arg(long)]
    pub weight: Option<String>,

    /// Disable the top banner
    #[arg(long)]
    pub hide_top: bool,

    /// Disable the bottom banner
    #[arg(long)]
    pub hide_bottom: bool,
}

/// Fields the global configuration file may define. Every key is optional
/// and unknown keys are ignored.
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    message: Option<String>,
    fgcolor: Option<String>,
    bgcolor: Option<String>,
    face: Option<String>,
    size: Option<String>,
    weight: Option<String>,
    show_top: Option<bool>,
    show_bottom: Option<bool>,
}

/// Immutable configuration snapshot, rebuilt fresh on every relaunch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BannerConfig {
    pub message: String,
    pub fgcolor: String,
    pub bgcolor: String,
    pub face: String,
    pub size: String,
    pub weight: String,
    pub show_top: bool,
    pub show_bottom: bool,
}

/// Resolve the effective configuration from the global file and CLI args.
pub fn resolve(args: &Args) -> BannerConfig {
    merge(args, &load_file(Path::new(paths::CONFIG_FILE)))
}

fn load_file(path: &Path) -> FileConfig {
    match fs::read_to_string(path) {
        Ok(contents) => parse_file(path, &contents),
        Err(e) => {
            debug!(path = %path.display(), error = %e, "config file not readable, using defaults");
            FileConfig::default()
        }
    }
}

fn parse_file(path: &Path, contents: &str) -> FileConfig {
    match toml::from_str::<FileConfig>(contents) {
        Ok(file) => file,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "malformed config file, treating as empty");
            FileConfig::default()
        }
    }
}

fn merge(args: &Args, file: &FileConfig) -> BannerConfig {
    fn pick(cli: &Option<String>, file: &Option<String>, default: &str) -> String {
        cli.clone()
            .or_else(|| file.clone())
            .unwrap_or_else(|| default.to_string())
    }

    BannerConfig {
        message: pick(&args.message, &file.message, defaults::MESSAGE),
        fgcolor: pick(&args.fgcolor, &file.fgcolor, defaults::FGCOLOR),
        bgcolor: pick(&args.bgcolor, &file.bgcolor, defaults::BGCOLOR),
        face: pick(&args.face, &file.face, defaults::FACE),
        size: pick(&args.size, &file.size, defaults::SIZE),
        weight: pick(&args.weight, &file.weight, defaults::WEIGHT),
        show_top: !args.hide_top && file.show_top.unwrap_or(true),
        show_bottom: !args.hide_bottom && file.show_bottom.unwrap_or(true),
    }
}
