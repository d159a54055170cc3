//! Configuration module
//!
//! Contains the layout manifest and the speed preset catalog.

pub mod manifest;
pub mod speed_preset;

pub use manifest::*;
pub use speed_preset::*;
