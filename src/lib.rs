//! Merit-order electricity market simulator with coal-to-gas switching analysis.

#[cfg(feature = "api")]
pub mod api;
/// BI long-format export and metric taxonomy.
pub mod bi;
pub mod config;
pub mod error;
pub mod io;
/// Clearing engine, indicators, switching price and batch runner.
pub mod market;

pub use error::ValidationError;
