//! Name normalization, infrastructure tiers and group assignment.
//!
//! The census identifies places by city name while death records carry IBGE
//! codes; the two meet on an accent-free, uppercase municipality name.

pub mod groups;
pub mod normalize;
pub mod tiers;

pub use groups::*;
pub use normalize::*;
pub use tiers::*;
