// [libs/domain/bonding/src/validator.rs]
//! The level-specific validator (spec §4.7 step 2): checks count, checks
//! no atom is already consumed, and that all atoms reference
//! `ACTIVE`/`ALLOCATED` tokens.

use atomic_domain_model::{Atom, TokenState};
use atomic_domain_token_registry::TokenRegistry;

/// `constituents` must already be the atoms read for one channel (or the
/// single combined channel above `Byte`); `fanin` is the expected count.
/// Ordering tie-breaks are the caller's job (ledger insertion order,
/// spec §4.7) — this function only checks the batch is well-formed.
pub fn validate_constituents(constituents: &[Atom], fanin: u32, registry: &TokenRegistry) -> Result<(), String> {
    if constituents.len() != fanin as usize {
        return Err(format!("expected {fanin} constituents, read {}", constituents.len()));
    }

    for atom in constituents {
        match registry.state_of(atom.token_id) {
            Some(TokenState::Active) | Some(TokenState::Allocated) => {}
            Some(other) => return Err(format!("constituent atom {} references token in state {other:?}", atom.index)),
            None => return Err(format!("constituent atom {} references an unknown token", atom.index)),
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use atomic_core_crypto::{SignatureBackend, Signer};
    use atomic_core_pricing::TokenPriceQuote;
    use atomic_domain_model::{zero_hash, Level};
    use atomic_domain_token_registry::NodeIdentity;
    use chrono::Utc;
    use uuid::Uuid;

    fn sample_atom(token_id: Uuid, index: u64) -> Atom {
        Atom {
            level: Level::Bit,
            index,
            particle: None,
            frequency: 500.0,
            timestamp: Utc::now(),
            token_id,
            iv: None,
            auth_tag: None,
            encrypted_payload: None,
            constituents: Vec::new(),
            hash: zero_hash(),
        }
    }

    fn sample_quote() -> TokenPriceQuote {
        TokenPriceQuote { base_node_price: 9.75, effective_node_price: 9.75, base_token_price: 9.75, adjusted_token_price: 9.75 }
    }

    #[test]
    fn rejects_wrong_count() {
        let registry = TokenRegistry::new(NodeIdentity::new("S-1"), Signer::generate(SignatureBackend::Legacy).unwrap());
        let (token, _) = registry.mint("HQ", &sample_quote()).unwrap();
        let atoms = vec![sample_atom(token.token_id, 0)];
        assert!(validate_constituents(&atoms, 8, &registry).is_err());
    }

    #[test]
    fn rejects_unknown_token() {
        let registry = TokenRegistry::new(NodeIdentity::new("S-1"), Signer::generate(SignatureBackend::Legacy).unwrap());
        let atoms = vec![sample_atom(Uuid::new_v4(), 0)];
        assert!(validate_constituents(&atoms, 1, &registry).is_err());
    }

    #[test]
    fn accepts_active_token() {
        let registry = TokenRegistry::new(NodeIdentity::new("S-1"), Signer::generate(SignatureBackend::Legacy).unwrap());
        let (token, _) = registry.mint("HQ", &sample_quote()).unwrap();
        let atoms = vec![sample_atom(token.token_id, 0)];
        assert!(validate_constituents(&atoms, 1, &registry).is_ok());
    }
}
