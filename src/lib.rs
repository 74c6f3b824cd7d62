pub mod apis;
pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod pipeline;
pub mod types;

// Layered boundaries for the fetch helper
pub mod app;
pub mod infra;

// Domain data shapes shared across layers
pub mod domain;
