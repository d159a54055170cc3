//! Render module
//!
//! Maps reel state onto symbol strips for drawing.

pub mod reel_view;

pub use reel_view::{
    asset_path, strip_window, ReelStrip, StripWindow, VisibleSymbol, DEFAULT_STRIP_LENGTH,
};
