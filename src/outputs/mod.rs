//! Rendering of article and bookmark lists for the terminal.
//!
//! # Submodules
//!
//! - [`text`]: Human-readable listing with formatted dates and bookmark markers
//! - [`json`]: The same data as JSON for scripting

pub mod json;
pub mod text;
