// [apps/atomic-cli/src/commands/price.rs]
//! `price` (C4, spec §4.4, §6): prints the current token price quote.

use atomic_core_pricing::quote;
use serde_json::{json, Value};
use tracing::info;

use crate::directives::AtomicDirectives;
use crate::failure::CliError;

pub fn run(directives: &AtomicDirectives) -> Result<Value, CliError> {
    let inputs = directives.pricing_inputs();
    let result = quote(&inputs);
    info!(base_token_price = result.base_token_price, "price quote computed");

    Ok(json!({
        "baseNodePrice": result.base_node_price,
        "effectiveNodePrice": result.effective_node_price,
        "baseTokenPrice": result.base_token_price,
        "adjustedTokenPrice": result.adjusted_token_price,
    }))
}
