//! Application entry point for the procedural branch tree viewer.
//!
//! This binary sets up logging and eframe/egui, then delegates all
//! interactive logic and rendering to [`Viewer`] from the `viewer` module.

mod viewer;

use viewer::Viewer;

/// Starts the native eframe application.
///
/// Logging is configured through `RUST_LOG` and defaults to `info`.
///
/// ### Returns
/// - `Ok(())` if the application runs to completion without errors.
/// - `Err` if eframe fails to create the native window or event loop.
fn main() -> eframe::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let options = eframe::NativeOptions::default();

    eframe::run_native(
        "Branch Tree",
        options,
        Box::new(|_cc| Ok(Box::new(Viewer::new()))),
    )
}
