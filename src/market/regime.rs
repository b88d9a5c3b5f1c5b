//! Market regime relative to the coal-to-gas switching price.

use std::fmt;

use serde::Serialize;

use super::switching::SwitchingPriceResult;

/// Carbon prices within this distance (€/t) of the switching price count as equal.
pub const REGIME_TOLERANCE_EUR_TON: f64 = 1e-9;

/// Which fuel sits lower in the merit order at a given carbon price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum MarketRegime {
    /// Carbon price below the switching price: coal is cheaper.
    #[serde(rename = "COAL-DOMINATED")]
    CoalDominated,
    /// Carbon price above the switching price: gas is cheaper.
    #[serde(rename = "GAS-DOMINATED")]
    GasDominated,
    /// Carbon price at the switching price: coal and gas cost the same.
    #[serde(rename = "TRANSITION")]
    Transition,
}

impl MarketRegime {
    /// Classifies `carbon_price` against `switching_price`.
    pub fn classify(carbon_price_eur_ton: f64, switching_price_eur_ton: f64) -> Self {
        let diff = carbon_price_eur_ton - switching_price_eur_ton;
        if diff.abs() <= REGIME_TOLERANCE_EUR_TON {
            MarketRegime::Transition
        } else if diff < 0.0 {
            MarketRegime::CoalDominated
        } else {
            MarketRegime::GasDominated
        }
    }

    /// Summary table label.
    pub fn label(self) -> &'static str {
        match self {
            MarketRegime::CoalDominated => "COAL-DOMINATED",
            MarketRegime::GasDominated => "GAS-DOMINATED",
            MarketRegime::Transition => "TRANSITION",
        }
    }

    /// Technology that is cheaper to run in this regime.
    pub fn cheaper_fuel(self) -> &'static str {
        match self {
            MarketRegime::CoalDominated => "Coal",
            MarketRegime::GasDominated => "Gas",
            MarketRegime::Transition => "Coal/Gas (Indifferent)",
        }
    }

    /// One-line explanation of the regime.
    pub fn explanation(self) -> &'static str {
        match self {
            MarketRegime::CoalDominated => {
                "Carbon price is below switching point. Coal plants are more economical than gas."
            }
            MarketRegime::GasDominated => {
                "Carbon price is above switching point. Gas plants are more economical than coal."
            }
            MarketRegime::Transition => {
                "Carbon price is at switching point. Coal and gas have equal generation costs."
            }
        }
    }
}

impl fmt::Display for MarketRegime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Position of one carbon price relative to the switching price.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegimeInterpretation {
    /// Regime of the carbon price relative to the switching price.
    pub regime: MarketRegime,
    /// Carbon price interpreted (€/t).
    pub carbon_price_eur_ton: f64,
    /// Switching price it is compared against (€/t).
    pub switching_price_eur_ton: f64,
    /// `carbon_price − switching_price` (€/t).
    pub carbon_price_vs_switching_eur: f64,
    /// Deviation relative to the switching price (%). `None` when the
    /// switching price is zero.
    pub carbon_price_vs_switching_pct: Option<f64>,
}

impl RegimeInterpretation {
    /// Interprets `carbon_price_eur_ton` against a computed switching price.
    pub fn new(carbon_price_eur_ton: f64, switching: &SwitchingPriceResult) -> Self {
        let switching_price = switching.switching_price_eur_ton;
        let diff = carbon_price_eur_ton - switching_price;
        let pct = (switching_price.abs() > REGIME_TOLERANCE_EUR_TON)
            .then(|| diff / switching_price * 100.0);

        Self {
            regime: MarketRegime::classify(carbon_price_eur_ton, switching_price),
            carbon_price_eur_ton,
            switching_price_eur_ton: switching_price,
            carbon_price_vs_switching_eur: diff,
            carbon_price_vs_switching_pct: pct,
        }
    }

    pub fn is_coal_cheaper(&self) -> bool {
        self.regime == MarketRegime::CoalDominated
    }

    pub fn is_gas_cheaper(&self) -> bool {
        self.regime == MarketRegime::GasDominated
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::switching::SwitchingConfig;
    use crate::market::types::{Plant, PlantRoster, Technology};

    fn switching() -> SwitchingPriceResult {
        let roster = PlantRoster::new(vec![
            Plant::new("Coal_Test", Technology::Coal, 500.0, 25.0),
            Plant::new("Gas_Test", Technology::Gas, 500.0, 45.0),
        ])
        .unwrap();
        SwitchingPriceResult::compute(&roster, &SwitchingConfig::default()).unwrap()
    }

    #[test]
    fn classification_follows_sign_of_difference() {
        let sp = switching();
        assert!(RegimeInterpretation::new(10.0, &sp).is_coal_cheaper());
        assert!(RegimeInterpretation::new(70.0, &sp).is_gas_cheaper());
        let at = RegimeInterpretation::new(sp.switching_price_eur_ton, &sp);
        assert_eq!(at.regime, MarketRegime::Transition);
        assert_eq!(at.regime.cheaper_fuel(), "Coal/Gas (Indifferent)");
    }

    #[test]
    fn deviation_is_signed_and_relative() {
        let sp = switching();
        let s = sp.switching_price_eur_ton;
        let i = RegimeInterpretation::new(2.0 * s, &sp);
        assert!((i.carbon_price_vs_switching_eur - s).abs() < 1e-9);
        let pct = i.carbon_price_vs_switching_pct.unwrap();
        assert!((pct - 100.0).abs() < 1e-9);
    }

    #[test]
    fn zero_switching_price_has_no_percentage() {
        let mut sp = switching();
        sp.switching_price_eur_ton = 0.0;
        let i = RegimeInterpretation::new(25.0, &sp);
        assert_eq!(i.regime, MarketRegime::GasDominated);
        assert_eq!(i.carbon_price_vs_switching_pct, None);
    }

    #[test]
    fn labels_match_summary_vocabulary() {
        assert_eq!(MarketRegime::CoalDominated.to_string(), "COAL-DOMINATED");
        assert_eq!(MarketRegime::GasDominated.label(), "GAS-DOMINATED");
        assert_eq!(MarketRegime::Transition.label(), "TRANSITION");
    }
}
