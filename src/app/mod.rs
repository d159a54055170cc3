//! Application module
//!
//! Contains the egui previewer and its UI state.

mod palette;
mod previewer_app;
pub mod state;

pub use previewer_app::PreviewerApp;
