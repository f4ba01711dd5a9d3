#![forbid(unsafe_code)]

mod banner;
mod color;
mod config;
mod constants;
mod controller;
mod font;
mod probe;
mod x11_utils;

use clap::Parser;
use tracing::{info, Level as TraceLevel};
use tracing_subscriber::FmtSubscriber;
use x11rb::connection::Connection;
use x11rb::protocol::randr::{ConnectionExt as RandrExt, NotifyMask};

use config::Args;
use controller::Controller;
use x11_utils::{AppContext, CachedAtoms};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse log level from environment variable
    let log_level = match std::env::var("LOG_LEVEL")
        .unwrap_or_else(|_| "info".to_string())
        .to_lowercase()
        .as_str()
    {
        "trace" => TraceLevel::TRACE,
        "debug" => TraceLevel::DEBUG,
        "warn" => TraceLevel::WARN,
        "error" => TraceLevel::ERROR,
        _ => TraceLevel::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    // Sole startup precondition: a graphical display session must exist.
    if std::env::var_os("DISPLAY").is_none() {
        eprintln!("Error: DISPLAY environment variable not set.");
        std::process::exit(1);
    }

    let args = Args::parse();

    let (conn, screen_num) = x11rb::connect(None)?;
    let screen = &conn.setup().roots[screen_num];
    info!(
        screen = screen_num,
        width = screen.width_in_pixels,
        height = screen.height_in_pixels,
        "connected to x11"
    );

    let atoms = CachedAtoms::new(&conn)?;

    // Display-change notifications (resolution change, monitor topology)
    conn.randr_select_input(screen.root, NotifyMask::SCREEN_CHANGE)?;
    conn.flush()?;

    let ctx = AppContext {
        conn: &conn,
        screen,
        atoms: &atoms,
    };

    let mut controller = Controller::new(ctx, args);
    // Runs until externally terminated; returning means a fatal error.
    controller.run()?;
    Ok(())
}
