// [apps/atomic-cli/src/commands/mint.rs]
//! `mint --class <c>` (C3, spec §4.3, §6).

use atomic_core_pricing::quote;
use atomic_domain_token_registry::{NodeIdentity, TokenRegistry};
use serde_json::{json, Value};
use tracing::info;

use crate::directives::AtomicDirectives;
use crate::failure::CliError;
use crate::persistence;

pub fn run(directives: &AtomicDirectives, class: &str) -> Result<Value, CliError> {
    let keypair = persistence::load_or_generate_keypair(&directives.ledger_dir, &directives.node_serial, &directives.signer_backend)?;
    let identity = NodeIdentity::new(directives.node_serial.clone());
    let registry = TokenRegistry::new(identity, keypair);

    let carbon_quote = quote(&directives.pricing_inputs());
    let (token, presented) = registry
        .mint(class, &carbon_quote)
        .map_err(|e| CliError::generic(e.to_string()))?;

    let snapshot = registry
        .snapshot(token.token_id)
        .expect("mint always inserts the minted token into the registry");
    persistence::persist_token(&directives.ledger_dir, &snapshot)?;

    info!(token_id = %token.token_id, class, "token minted and persisted");

    Ok(json!({
        "tokenId": token.token_id,
        "tokenClass": token.token_class,
        "issuingSerialNumber": token.issuing_serial_number,
        "state": format!("{:?}", token.state),
        "mintedAt": token.minted_at,
        "associatedCarbonCost": token.associated_carbon_cost,
        "presentedBlob": presented.encrypted_blob,
    }))
}
