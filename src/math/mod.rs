//! Statistical utilities: descriptive statistics, histograms, KDE and Welch's t-test.

pub mod describe;
pub mod histogram;
pub mod kde;
pub mod special;
pub mod ttest;

pub use describe::*;
pub use histogram::*;
pub use kde::*;
pub use ttest::*;
