//! Library components of the county-stats command line.

pub mod export;
pub mod logging;
