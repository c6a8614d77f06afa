// [libs/core/pricing/src/lib.rs]
/*!
 * =================================================================
 * APARATO: CARBON PRICING ENGINE (C4)
 * CLASIFICACIÓN: CORE DOMAIN
 * RESPONSABILIDAD: PRECIO DE TOKEN LIGADO AL COSTO DE CARBONO
 *
 * Implementa el contrato numérico de §4.4 como funciones puras de sus
 * entradas: el motor no retiene estado entre cotizaciones, solo valida
 * la frescura declarada de sus insumos (precio de carbono diario,
 * emisión semanal, rebate mensual) antes de emitir una cotización al
 * Registro de Tokens (C3).
 * =================================================================
 */

pub mod inputs;
pub mod quote;
pub mod rebate;

pub use inputs::{PricingInputs, UpdateFrequency};
pub use quote::TokenPriceQuote;
pub use rebate::carbon_savings_rebate_per_gb;

/// Fixed conversion ATOMIC uses between a node's effective price and one
/// token's base price (spec §4.4).
pub const TOKENS_PER_NODE: f64 = 1.0;

/// Clamps negative intermediate values to zero before token-price
/// computation (spec §4.4's contract).
fn clamp_nonnegative(value: f64) -> f64 {
    if value > 0.0 {
        value
    } else {
        0.0
    }
}

/// Pure function of its inputs (spec §4.4's contract): same `PricingInputs`
/// always yields the same `TokenPriceQuote`.
pub fn quote(inputs: &PricingInputs) -> TokenPriceQuote {
    let base_node_price = (inputs.emission_per_node_g / 1000.0) * inputs.carbon_price_per_kg;
    let effective_node_price = clamp_nonnegative(base_node_price - inputs.rebate_per_node);
    let base_token_price = effective_node_price / TOKENS_PER_NODE;
    let adjusted_token_price = base_token_price
        * (1.0 + inputs.market_demand * inputs.demand_multiplier)
        * inputs.carbon_footprint_multiplier;

    TokenPriceQuote {
        base_node_price,
        effective_node_price,
        base_token_price,
        adjusted_token_price,
    }
}
