//! Coal-to-gas switching price.
//!
//! The switching price is the carbon price at which an average coal plant and
//! an average gas plant have the same generation cost per electric MWh:
//!
//! ```text
//! (gas_fuel / η_gas − coal_fuel / η_coal) / (EF_coal / η_coal − EF_gas / η_gas)
//! ```
//!
//! Only average fuel costs come from the roster; efficiencies and emission
//! factors are calculator constants.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::ValidationError;

use super::types::{PlantRoster, Technology};

/// Maximum SRMC gap (€/MWh) tolerated between coal and gas at the switching price.
pub const SELF_CHECK_TOLERANCE_EUR_MWH: f64 = 0.01;

/// Reference plant constants for the switching-price calculation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SwitchingConfig {
    /// Coal thermal efficiency (0, 1].
    pub coal_efficiency: f64,
    /// Gas thermal efficiency (0, 1].
    pub gas_efficiency: f64,
    /// Coal emission factor (t/MWh_thermal).
    pub coal_emission_factor: f64,
    /// Gas emission factor (t/MWh_thermal).
    pub gas_emission_factor: f64,
}

impl Default for SwitchingConfig {
    fn default() -> Self {
        Self {
            coal_efficiency: 0.38,
            gas_efficiency: 0.55,
            coal_emission_factor: 0.34,
            gas_emission_factor: 0.20,
        }
    }
}

/// Outcome of the switching-price calculation for one roster.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SwitchingPriceResult {
    /// Carbon price equalizing coal and gas generation cost (€/t).
    pub switching_price_eur_ton: f64,
    /// Mean coal fuel cost (€/MWh_thermal).
    pub coal_fuel_cost_eur_mwh: f64,
    /// Mean gas fuel cost (€/MWh_thermal).
    pub gas_fuel_cost_eur_mwh: f64,
    /// Coal fuel cost per electric MWh.
    pub coal_generation_cost_eur_mwh: f64,
    /// Gas fuel cost per electric MWh.
    pub gas_generation_cost_eur_mwh: f64,
    /// Coal emissions per electric MWh (t/MWh).
    pub coal_emission_rate_t_mwh: f64,
    /// Gas emissions per electric MWh (t/MWh).
    pub gas_emission_rate_t_mwh: f64,
    /// Coal SRMC evaluated at the switching price.
    pub coal_srmc_at_switching_eur_mwh: f64,
    /// Gas SRMC evaluated at the switching price.
    pub gas_srmc_at_switching_eur_mwh: f64,
    /// `true` when both SRMCs agree within [`SELF_CHECK_TOLERANCE_EUR_MWH`].
    pub formula_validated: bool,
}

impl SwitchingConfig {
    /// Checks efficiencies are in (0, 1] and emission factors are finite and
    /// non-negative.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidSwitchingConfig`] naming the first
    /// offending constant.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for (field, value) in [
            ("coal_efficiency", self.coal_efficiency),
            ("gas_efficiency", self.gas_efficiency),
        ] {
            if !(value > 0.0 && value <= 1.0) {
                return Err(ValidationError::InvalidSwitchingConfig {
                    field,
                    reason: format!("efficiency {value} must be in (0.0, 1.0]"),
                });
            }
        }
        for (field, value) in [
            ("coal_emission_factor", self.coal_emission_factor),
            ("gas_emission_factor", self.gas_emission_factor),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ValidationError::InvalidSwitchingConfig {
                    field,
                    reason: format!("emission factor {value} must be finite and >= 0"),
                });
            }
        }
        Ok(())
    }
}

impl SwitchingPriceResult {
    /// Computes the switching price for `roster`.
    ///
    /// # Errors
    ///
    /// * [`ValidationError::InvalidSwitchingConfig`] when a constant in
    ///   `config` is out of range.
    /// * [`ValidationError::NoCoalPlants`] / [`ValidationError::NoGasPlants`]
    ///   when a partition is empty.
    /// * [`ValidationError::NonPositiveEmissionSpread`] when gas is not
    ///   strictly less carbon-intensive than coal per electric MWh.
    /// * [`ValidationError::NonFiniteSwitchingPrice`] when the formula
    ///   overflows.
    ///
    /// # Examples
    ///
    /// ```
    /// use merit_sim::market::switching::{SwitchingConfig, SwitchingPriceResult};
    /// use merit_sim::market::types::{Plant, PlantRoster, Technology};
    ///
    /// let roster = PlantRoster::new(vec![
    ///     Plant::new("Coal_Test", Technology::Coal, 500.0, 25.0),
    ///     Plant::new("Gas_Test", Technology::Gas, 500.0, 45.0),
    /// ])
    /// .unwrap();
    /// let sp = SwitchingPriceResult::compute(&roster, &SwitchingConfig::default()).unwrap();
    /// assert!(sp.formula_validated);
    /// ```
    pub fn compute(
        roster: &PlantRoster,
        config: &SwitchingConfig,
    ) -> Result<Self, ValidationError> {
        config.validate()?;

        let coal_fuel =
            mean_fuel_cost(roster, |t| t == Technology::Coal).ok_or(ValidationError::NoCoalPlants)?;
        let gas_fuel =
            mean_fuel_cost(roster, Technology::is_gas_family).ok_or(ValidationError::NoGasPlants)?;

        let coal_gen = coal_fuel / config.coal_efficiency;
        let gas_gen = gas_fuel / config.gas_efficiency;
        let coal_rate = config.coal_emission_factor / config.coal_efficiency;
        let gas_rate = config.gas_emission_factor / config.gas_efficiency;

        let spread = coal_rate - gas_rate;
        if spread.is_nan() || spread <= 0.0 {
            return Err(ValidationError::NonPositiveEmissionSpread {
                coal_rate,
                gas_rate,
            });
        }

        let switching_price = (gas_gen - coal_gen) / spread;
        if !switching_price.is_finite() {
            return Err(ValidationError::NonFiniteSwitchingPrice {
                value: switching_price,
            });
        }
        let coal_at = coal_gen + switching_price * coal_rate;
        let gas_at = gas_gen + switching_price * gas_rate;
        let formula_validated = (coal_at - gas_at).abs() < SELF_CHECK_TOLERANCE_EUR_MWH;

        if formula_validated {
            debug!(switching_price, coal_at, gas_at, "switching price computed");
        } else {
            warn!(
                switching_price,
                coal_at,
                gas_at,
                "coal and gas SRMC disagree at the switching price"
            );
        }

        Ok(Self {
            switching_price_eur_ton: switching_price,
            coal_fuel_cost_eur_mwh: coal_fuel,
            gas_fuel_cost_eur_mwh: gas_fuel,
            coal_generation_cost_eur_mwh: coal_gen,
            gas_generation_cost_eur_mwh: gas_gen,
            coal_emission_rate_t_mwh: coal_rate,
            gas_emission_rate_t_mwh: gas_rate,
            coal_srmc_at_switching_eur_mwh: coal_at,
            gas_srmc_at_switching_eur_mwh: gas_at,
            formula_validated,
        })
    }

    /// Coal and gas generation cost at an arbitrary carbon price, `(coal, gas)`.
    pub fn costs_at(&self, carbon_price_eur_ton: f64) -> (f64, f64) {
        (
            self.coal_generation_cost_eur_mwh
                + carbon_price_eur_ton * self.coal_emission_rate_t_mwh,
            self.gas_generation_cost_eur_mwh + carbon_price_eur_ton * self.gas_emission_rate_t_mwh,
        )
    }
}

impl fmt::Display for SwitchingPriceResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Coal-to-Gas Switching Analysis ---")?;
        writeln!(
            f,
            "Switching price:       {:.2} EUR/t",
            self.switching_price_eur_ton
        )?;
        writeln!(
            f,
            "Coal fuel cost:        {:.2} EUR/MWh_th ({:.2} EUR/MWh_el, {:.4} t/MWh_el)",
            self.coal_fuel_cost_eur_mwh,
            self.coal_generation_cost_eur_mwh,
            self.coal_emission_rate_t_mwh
        )?;
        writeln!(
            f,
            "Gas fuel cost:         {:.2} EUR/MWh_th ({:.2} EUR/MWh_el, {:.4} t/MWh_el)",
            self.gas_fuel_cost_eur_mwh,
            self.gas_generation_cost_eur_mwh,
            self.gas_emission_rate_t_mwh
        )?;
        writeln!(
            f,
            "SRMC at switching:     coal {:.2} / gas {:.2} EUR/MWh",
            self.coal_srmc_at_switching_eur_mwh, self.gas_srmc_at_switching_eur_mwh
        )?;
        write!(f, "Formula validated:     {}", self.formula_validated)
    }
}

fn mean_fuel_cost(roster: &PlantRoster, include: impl Fn(Technology) -> bool) -> Option<f64> {
    let (sum, count) = roster
        .plants()
        .iter()
        .filter(|p| include(p.technology))
        .fold((0.0_f64, 0_usize), |(s, n), p| {
            (s + p.fuel_cost_eur_mwh, n + 1)
        });
    (count > 0).then(|| sum / count as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::types::Plant;

    fn pair(coal_fuel: f64, gas_fuel: f64) -> PlantRoster {
        PlantRoster::new(vec![
            Plant::new("Coal_Test", Technology::Coal, 500.0, coal_fuel),
            Plant::new("Gas_Test", Technology::Gas, 500.0, gas_fuel),
        ])
        .unwrap()
    }

    #[test]
    fn reference_pair_matches_closed_form() {
        let sp = SwitchingPriceResult::compute(&pair(25.0, 45.0), &SwitchingConfig::default())
            .unwrap();
        let expected = ((45.0 / 0.55) - (25.0 / 0.38)) / ((0.34 / 0.38) - (0.20 / 0.55));
        assert!((sp.switching_price_eur_ton - expected).abs() < 1e-9);
        assert!((sp.switching_price_eur_ton - 30.18).abs() < 0.01);
        assert!(sp.formula_validated);
        assert!(
            (sp.coal_srmc_at_switching_eur_mwh - sp.gas_srmc_at_switching_eur_mwh).abs() < 0.01
        );
    }

    #[test]
    fn fuel_costs_are_averaged_per_partition() {
        let roster = PlantRoster::new(vec![
            Plant::new("Coal_1", Technology::Coal, 500.0, 20.0),
            Plant::new("Coal_2", Technology::Coal, 500.0, 30.0),
            Plant::new("Lignite_1", Technology::Lignite, 500.0, 5.0),
            Plant::new("Gas_1", Technology::Gas, 500.0, 40.0),
            Plant::new("Peaker_1", Technology::GasPeaker, 100.0, 50.0),
        ])
        .unwrap();
        let sp = SwitchingPriceResult::compute(&roster, &SwitchingConfig::default()).unwrap();
        assert_eq!(sp.coal_fuel_cost_eur_mwh, 25.0);
        assert_eq!(sp.gas_fuel_cost_eur_mwh, 45.0);
    }

    #[test]
    fn missing_partitions_are_reported() {
        let gas_only =
            PlantRoster::new(vec![Plant::new("G", Technology::Gas, 1.0, 40.0)]).unwrap();
        assert_eq!(
            SwitchingPriceResult::compute(&gas_only, &SwitchingConfig::default()),
            Err(ValidationError::NoCoalPlants)
        );
        let coal_only =
            PlantRoster::new(vec![Plant::new("C", Technology::Coal, 1.0, 20.0)]).unwrap();
        assert_eq!(
            SwitchingPriceResult::compute(&coal_only, &SwitchingConfig::default()),
            Err(ValidationError::NoGasPlants)
        );
    }

    #[test]
    fn gas_dirtier_than_coal_is_rejected() {
        let config = SwitchingConfig {
            gas_emission_factor: 0.60,
            ..SwitchingConfig::default()
        };
        let err = SwitchingPriceResult::compute(&pair(25.0, 45.0), &config).unwrap_err();
        assert!(matches!(err, ValidationError::NonPositiveEmissionSpread { .. }));
    }

    #[test]
    fn equal_emission_rates_are_rejected() {
        let config = SwitchingConfig {
            coal_efficiency: 0.5,
            gas_efficiency: 0.5,
            coal_emission_factor: 0.2,
            gas_emission_factor: 0.2,
        };
        assert!(SwitchingPriceResult::compute(&pair(25.0, 45.0), &config).is_err());
    }

    #[test]
    fn zero_efficiency_is_rejected() {
        let config = SwitchingConfig {
            coal_efficiency: 0.0,
            ..SwitchingConfig::default()
        };
        assert_eq!(
            SwitchingPriceResult::compute(&pair(25.0, 45.0), &config).unwrap_err(),
            ValidationError::InvalidSwitchingConfig {
                field: "coal_efficiency",
                reason: "efficiency 0 must be in (0.0, 1.0]".to_string(),
            }
        );
    }

    #[test]
    fn out_of_range_constants_are_rejected() {
        let cases = [
            SwitchingConfig {
                gas_efficiency: 1.5,
                ..SwitchingConfig::default()
            },
            SwitchingConfig {
                gas_efficiency: f64::NAN,
                ..SwitchingConfig::default()
            },
            SwitchingConfig {
                coal_emission_factor: f64::INFINITY,
                ..SwitchingConfig::default()
            },
            SwitchingConfig {
                gas_emission_factor: -0.1,
                ..SwitchingConfig::default()
            },
        ];
        for config in cases {
            let err = SwitchingPriceResult::compute(&pair(25.0, 45.0), &config).unwrap_err();
            assert!(
                matches!(err, ValidationError::InvalidSwitchingConfig { .. }),
                "{config:?}: {err}"
            );
        }
    }

    #[test]
    fn overflowing_fuel_cost_is_rejected() {
        let roster = pair(-f64::MAX, f64::MAX);
        let err = SwitchingPriceResult::compute(&roster, &SwitchingConfig::default()).unwrap_err();
        assert!(matches!(err, ValidationError::NonFiniteSwitchingPrice { .. }));
    }

    #[test]
    fn report_lists_switching_price() {
        let sp = SwitchingPriceResult::compute(&pair(25.0, 45.0), &SwitchingConfig::default())
            .unwrap();
        let report = sp.to_string();
        assert!(report.contains("Switching price:       30.18 EUR/t"));
        assert!(report.ends_with("true"));
    }

    #[test]
    fn cheap_gas_gives_negative_switching_price() {
        let sp = SwitchingPriceResult::compute(&pair(40.0, 10.0), &SwitchingConfig::default())
            .unwrap();
        assert!(sp.switching_price_eur_ton < 0.0);
        let (coal, gas) = sp.costs_at(0.0);
        assert!(gas < coal);
    }
}
