//! Command implementations for the `pronounce` binary.
pub mod commands;
