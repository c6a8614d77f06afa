// [libs/core/pricing/src/quote.rs]
//! Output of a pricing computation (spec §4.4).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TokenPriceQuote {
    /// `(emissionPerNode_g / 1000) * carbonPricePerKg`, clamped nowhere.
    pub base_node_price: f64,
    /// `max(0, baseNodePrice - rebatePerNode)`.
    pub effective_node_price: f64,
    /// `effectiveNodePrice / TOKENS_PER_NODE`.
    pub base_token_price: f64,
    /// `baseTokenPrice * (1 + marketDemand * demandMultiplier) * carbonFootprintMultiplier`.
    pub adjusted_token_price: f64,
}
