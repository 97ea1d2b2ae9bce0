//! certdeck: a terminal explorer for graduation certificate NFTs
//!
//! The binary wires these modules into a crossterm/ratatui loop; the
//! library target exists so the filter engine and app state can be driven
//! from integration tests.

pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod infrastructure;
pub mod logging;
pub mod modules;
pub mod ui;
