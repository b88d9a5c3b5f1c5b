//! Validation errors raised by the market core.

use thiserror::Error;

/// Errors surfaced by dispatch and switching-price computations.
///
/// A supply shortage is not represented here: it is a regular
/// [`DispatchResult`](crate::market::types::DispatchResult) with
/// `demand_met == false`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// Dispatch was requested for a roster without plants.
    #[error("cannot dispatch an empty plant roster")]
    EmptyRoster,

    /// The roster has no `Coal` plant to price against gas.
    #[error("no coal plants found in roster")]
    NoCoalPlants,

    /// The roster has no `Gas` or `Gas Peaker` plant.
    #[error("no gas plants found in roster")]
    NoGasPlants,

    /// Gas is not strictly less carbon-intensive than coal per electric MWh.
    #[error(
        "invalid emission factors: gas emission rate {gas_rate:.4} t/MWh must be below \
         coal emission rate {coal_rate:.4} t/MWh"
    )]
    NonPositiveEmissionSpread {
        /// Coal emission rate (t/MWh_electric).
        coal_rate: f64,
        /// Gas emission rate (t/MWh_electric).
        gas_rate: f64,
    },

    /// A switching-price constant is outside its physical range.
    #[error("invalid switching constant `{field}`: {reason}")]
    InvalidSwitchingConfig { field: &'static str, reason: String },

    /// The switching-price formula produced a NaN or infinite value.
    #[error("switching price is not finite: {value}")]
    NonFiniteSwitchingPrice {
        /// Value returned by the formula (€/t).
        value: f64,
    },

    /// A plant parameter is outside its physical range.
    #[error("invalid plant `{name}`: {reason}")]
    InvalidPlant { name: String, reason: String },

    /// A scenario parameter is outside its physical range.
    #[error("invalid scenario `{name}`: {reason}")]
    InvalidScenario { name: String, reason: String },
}
