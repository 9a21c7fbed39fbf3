//! Application entry point for the infinite tree viewer.
//!
//! This binary sets up logging and eframe/egui, and delegates all
//! interactive logic to [`Viewer`] from the `viewer` module.

mod frames;
mod viewer;

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use viewer::Viewer;

/// Starts the native eframe application.
///
/// Log output goes to stderr and honours `RUST_LOG`, defaulting to `info`.
///
/// ### Returns
/// - `Ok(())` if the application runs to completion without errors.
/// - `Err` if eframe fails to create the native window or event loop.
fn main() -> eframe::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let options = eframe::NativeOptions::default();

    eframe::run_native(
        "Infinite Tree",
        options,
        Box::new(|cc| Ok(Box::new(Viewer::new(cc.egui_ctx.clone())))),
    )
}
