//! Feature modules
//!
//! - export: CSV / JSON export of the visible certificates

pub mod export;
