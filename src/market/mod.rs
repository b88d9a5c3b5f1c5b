//! Merit-order market clearing, switching price and scenario summaries.

pub mod aggregate;
pub mod clearing;
pub mod dispatch;
pub mod regime;
pub mod srmc;
pub mod summary;
pub mod switching;
pub mod types;

pub use dispatch::dispatch_scenario;
pub use regime::{MarketRegime, RegimeInterpretation};
pub use summary::{BatchOutcome, SummaryRow, run_batch};
pub use switching::{SwitchingConfig, SwitchingPriceResult};
pub use types::{DispatchLine, DispatchResult, Plant, PlantRoster, Scenario, Technology};
