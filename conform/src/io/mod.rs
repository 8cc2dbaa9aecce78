//! I/O helpers for the harness: configuration, entry discovery, processes.

pub mod config;
pub mod entries;
pub mod process;
