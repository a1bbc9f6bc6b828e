//! Input/output helpers.
//!
//! - death-record CSV ingest + cleaning (`mortality`)
//! - census infrastructure table ingest (`census`)
//! - working-table CSV export (`export`)

pub mod census;
pub mod export;
pub mod mortality;

pub use census::*;
pub use export::*;
pub use mortality::*;
