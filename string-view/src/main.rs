//! Application entry point for the cosmic string viewer.
//!
//! This binary installs the logger, sets up eframe/egui and delegates all
//! interactive logic and rendering to [`Viewer`] from the `viewer` module.

mod viewer;

use viewer::Viewer;

/// Starts the native eframe application.
///
/// Log output goes through `env_logger`; set `RUST_LOG=debug` to see
/// per-string and per-loop messages from the engine.
///
/// ### Returns
/// - `Ok(())` if the application runs to completion without errors.
/// - `Err` if eframe fails to create the native window or event loop.
fn main() -> eframe::Result<()> {
    env_logger::init();
    let options = eframe::NativeOptions::default();

    eframe::run_native(
        "Cosmic Strings",
        options,
        Box::new(|_cc| {
            // Generates the default ensemble before the first frame.
            Ok(Box::new(Viewer::new()))
        }),
    )
}
