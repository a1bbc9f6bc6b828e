//! `mortality-infra` library crate.
//!
//! The binary (`mortinfra`) is a thin wrapper around this library so that:
//!
//! - the pipeline is testable without spawning processes
//! - ingest, statistics and charts stay reusable on their own

pub mod app;
pub mod classify;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod logging;
pub mod math;
pub mod plot;
pub mod report;
