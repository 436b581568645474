//! Core library for dashgate.
//!
//! Holds the session negotiator, folder picker and datasource history
//! viewer, along with the configuration, logging and HTTP plumbing they
//! share. The `dashgate` binary is a thin layer over these components.

pub mod api;
pub mod config;
pub mod folders;
pub mod history;
pub mod logging;
pub mod login;
pub mod notice;
pub mod session_store;

#[cfg(test)]
mod testing;
