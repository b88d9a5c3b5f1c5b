//! Output adapters.

pub mod export;
