// [libs/core/pricing/src/inputs.rs]
//! Pricing inputs and their declared update cadence (spec §4.4: carbon
//! price daily, per-node emission weekly, per-node rebate monthly).

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// How often an input is expected to be refreshed. Used only to flag a
/// stale quote to callers; the pricing formulas themselves don't care.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpdateFrequency {
    Daily,
    Weekly,
    Monthly,
}

impl UpdateFrequency {
    fn max_age(self) -> Duration {
        match self {
            UpdateFrequency::Daily => Duration::days(1),
            UpdateFrequency::Weekly => Duration::weeks(1),
            UpdateFrequency::Monthly => Duration::days(30),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingInputs {
    /// CAD per kg of carbon, refreshed daily.
    pub carbon_price_per_kg: f64,
    /// Grams of CO2 per bounce for one node, refreshed weekly.
    pub emission_per_node_g: f64,
    /// CAD rebate applied per node, refreshed monthly.
    pub rebate_per_node: f64,
    /// Market demand signal in `[0, 1]`.
    pub market_demand: f64,
    /// Scales how strongly demand moves the adjusted price.
    pub demand_multiplier: f64,
    /// Scales the adjusted price by the footprint of the serving node.
    pub carbon_footprint_multiplier: f64,

    pub carbon_price_updated_at: DateTime<Utc>,
    pub emission_updated_at: DateTime<Utc>,
    pub rebate_updated_at: DateTime<Utc>,
}

impl PricingInputs {
    /// Names every input whose declared cadence has been exceeded as of
    /// `now`. An empty result means the quote rests on fresh inputs.
    pub fn stale_fields(&self, now: DateTime<Utc>) -> Vec<&'static str> {
        let mut stale = Vec::new();
        if now - self.carbon_price_updated_at > UpdateFrequency::Daily.max_age() {
            stale.push("carbon_price_per_kg");
        }
        if now - self.emission_updated_at > UpdateFrequency::Weekly.max_age() {
            stale.push("emission_per_node_g");
        }
        if now - self.rebate_updated_at > UpdateFrequency::Monthly.max_age() {
            stale.push("rebate_per_node");
        }
        stale
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_inputs_report_no_staleness() {
        let now = Utc::now();
        let inputs = PricingInputs {
            carbon_price_per_kg: 65.0,
            emission_per_node_g: 150.0,
            rebate_per_node: 0.0,
            market_demand: 0.0,
            demand_multiplier: 0.0,
            carbon_footprint_multiplier: 1.0,
            carbon_price_updated_at: now,
            emission_updated_at: now,
            rebate_updated_at: now,
        };
        assert!(inputs.stale_fields(now).is_empty());
    }

    #[test]
    fn expired_carbon_price_is_flagged() {
        let now = Utc::now();
        let inputs = PricingInputs {
            carbon_price_per_kg: 65.0,
            emission_per_node_g: 150.0,
            rebate_per_node: 0.0,
            market_demand: 0.0,
            demand_multiplier: 0.0,
            carbon_footprint_multiplier: 1.0,
            carbon_price_updated_at: now - Duration::days(3),
            emission_updated_at: now,
            rebate_updated_at: now,
        };
        assert_eq!(inputs.stale_fields(now), vec!["carbon_price_per_kg"]);
    }
}
