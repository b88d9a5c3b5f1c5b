//! Declarative metric classification and unit inference.
//!
//! Both rule sets are ordered tables of keyword groups. A metric name is
//! matched case-insensitively by substring, and the first rule with a
//! matching keyword wins.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

/// Unit reported when no unit rule matches.
pub const UNKNOWN_UNIT: &str = "-";

/// One row of a rule table: any keyword matching yields `value`.
#[derive(Debug, Clone, Copy)]
pub struct Rule<T: 'static> {
    /// Substrings compared case-insensitively against the metric name.
    pub keywords: &'static [&'static str],
    /// Result of the rule when a keyword matches.
    pub value: T,
}

impl<T: 'static> Rule<T> {
    pub const fn new(keywords: &'static [&'static str], value: T) -> Self {
        Self { keywords, value }
    }

    /// Returns `true` when any keyword occurs in the lowercased `name`.
    fn matches(&self, name: &str) -> bool {
        self.keywords
            .iter()
            .any(|k| name.contains(&k.to_lowercase()))
    }
}

/// Filtering category of a BI metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum MetricCategory {
    Economic,
    Environmental,
    Technical,
    Other,
}

impl MetricCategory {
    pub const ALL: [MetricCategory; 4] = [
        MetricCategory::Economic,
        MetricCategory::Environmental,
        MetricCategory::Technical,
        MetricCategory::Other,
    ];

    pub fn label(self) -> &'static str {
        match self {
            MetricCategory::Economic => "Economic",
            MetricCategory::Environmental => "Environmental",
            MetricCategory::Technical => "Technical",
            MetricCategory::Other => "Other",
        }
    }
}

impl fmt::Display for MetricCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for MetricCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MetricCategory::ALL
            .into_iter()
            .find(|c| c.label().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                format!(
                    "unknown data type \"{s}\", expected one of: Economic, Environmental, \
                     Technical, Other"
                )
            })
    }
}

/// Category rules in priority order.
pub const CATEGORY_RULES: &[Rule<MetricCategory>] = &[
    Rule {
        keywords: &["Price", "Cost", "Revenue", "Surplus", "EUR"],
        value: MetricCategory::Economic,
    },
    Rule {
        keywords: &["Emissions", "Carbon", "Intensity", "CO2", "Renewable"],
        value: MetricCategory::Environmental,
    },
    Rule {
        keywords: &["Generation", "Demand", "Capacity", "MW", "Curtailment", "Avail"],
        value: MetricCategory::Technical,
    },
];

/// Unit rules in priority order.
pub const UNIT_RULES: &[Rule<&str>] = &[
    Rule::new(&["eur"], "€"),
    Rule::new(&["price"], "€/MWh"),
    Rule::new(&["cost"], "€"),
    Rule::new(&["revenue"], "€"),
    Rule::new(&["surplus"], "€"),
    Rule::new(&["mw"], "MW"),
    Rule::new(&["demand"], "MW"),
    Rule::new(&["generation"], "MW"),
    Rule::new(&["capacity"], "MW"),
    Rule::new(&["emissions"], "tons CO₂"),
    Rule::new(&["intensity"], "t/MWh or g/kWh"),
    Rule::new(&["share"], "%"),
    Rule::new(&["avail"], "%"),
    Rule::new(&["curtailment"], "MW"),
    Rule::new(&["carbon_price"], "€/ton"),
];

/// Returns the value of the first rule with a keyword contained in `name`.
pub fn first_match<T: Copy>(rules: &[Rule<T>], name: &str) -> Option<T> {
    let name = name.to_lowercase();
    rules
        .iter()
        .find(|rule| rule.matches(&name))
        .map(|rule| rule.value)
}

/// Category of a metric, `Other` when nothing matches.
pub fn classify_metric(name: &str) -> MetricCategory {
    first_match(CATEGORY_RULES, name).unwrap_or(MetricCategory::Other)
}

/// Unit of a metric, [`UNKNOWN_UNIT`] when nothing matches.
pub fn metric_unit(name: &str) -> &'static str {
    first_match(UNIT_RULES, name).unwrap_or(UNKNOWN_UNIT)
}
