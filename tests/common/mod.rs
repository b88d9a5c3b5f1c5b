//! Shared test fixtures for integration tests.

#![allow(dead_code)]

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use merit_sim::config::{Case, CaseConfig};
use merit_sim::market::types::{Plant, PlantRoster, Scenario, Technology};

/// Two-plant validation roster: coal 25 €/MWh_th vs gas 45 €/MWh_th.
pub fn reference_pair() -> PlantRoster {
    PlantRoster::new(vec![
        Plant::new("Coal_Test", Technology::Coal, 500.0, 25.0),
        Plant::new("Gas_Test", Technology::Gas, 500.0, 45.0),
    ])
    .unwrap()
}

/// Built `german_2024` preset.
pub fn german_case() -> Case {
    CaseConfig::german_2024().build().unwrap()
}

/// Seeded RNG so property checks are reproducible.
pub fn rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Random valid roster of 1 to 12 plants across all technologies.
pub fn random_roster(rng: &mut StdRng) -> PlantRoster {
    let n = rng.random_range(1..=12);
    let plants = (0..n)
        .map(|i| {
            let tech = Technology::ALL[rng.random_range(0..Technology::ALL.len())];
            let fuel = if tech.is_variable_renewable() || tech == Technology::Hydro {
                0.0
            } else {
                rng.random_range(0.0..60.0)
            };
            Plant::new(
                format!("Plant_{i}"),
                tech,
                rng.random_range(0.0..2_000.0),
                fuel,
            )
            .with_efficiency(rng.random_range(0.25..=1.0))
        })
        .collect();
    PlantRoster::new(plants).unwrap()
}

/// Random valid scenario with demand up to 1.2x the roster's nameplate.
pub fn random_scenario(rng: &mut StdRng, roster: &PlantRoster) -> Scenario {
    Scenario::new(
        "Random",
        rng.random_range(0.0..=1.2 * roster.nameplate_mw()),
        rng.random_range(0.0..150.0),
        rng.random_range(0.0..=1.0),
        rng.random_range(0.0..=1.0),
    )
}
