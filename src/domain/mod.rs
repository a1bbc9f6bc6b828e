//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - cleaned mortality records (`MortalityRecord`) and their joined form (`AnalyzedRecord`)
//! - census infrastructure rows (`CensusArea`)
//! - the infrastructure group label (`InfraGroup`)
//! - the IBGE state-code table (`UF_CODES`)
//! - the run configuration (`AnalysisConfig`)

pub mod types;

pub use types::*;
