//! Command handlers.
//!
//! Handlers are thin: they take a composed context from the bootstrap, call
//! into the scheduler or the store, and format output for the terminal.
//! They hold no business logic and never open connections themselves.

pub mod check_config;
pub mod errors;
pub mod once;
pub mod projects;
pub mod run;
