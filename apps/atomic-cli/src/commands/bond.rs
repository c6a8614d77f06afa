// [apps/atomic-cli/src/commands/bond.rs]
//! `bond --address <A> --level <L>` (C7, spec §4.7): forces one bond
//! attempt, rehydrating every token this node has minted so the
//! validator can resolve constituents' `tokenId`s regardless of which
//! `mint` invocation produced them.

use atomic_domain_bonding::{BondOutcome, Bonder, BondingError};
use atomic_domain_model::{Address, Level};
use atomic_domain_token_registry::{NodeIdentity, TokenRegistry};
use atomic_infra_ledger::{AuditLog, AuditOp, AuditRecord, LedgerStore};
use chrono::Utc;
use serde_json::{json, Value};
use std::str::FromStr;
use tracing::info;

use crate::directives::AtomicDirectives;
use crate::failure::CliError;
use crate::persistence;

pub fn run(directives: &AtomicDirectives, address: &str, level: &str) -> Result<Value, CliError> {
    let address = Address::from_hex(address).map_err(CliError::input)?;
    let level = Level::from_str(level).map_err(CliError::input)?;

    let keypair = persistence::load_or_generate_keypair(&directives.ledger_dir, &directives.node_serial, &directives.signer_backend)?;
    let identity = NodeIdentity::new(directives.node_serial.clone());
    let registry = TokenRegistry::new(identity, keypair);
    persistence::rehydrate_all_tokens(&directives.ledger_dir, &registry)?;

    let ledger = LedgerStore::open(directives.ledger_dir.join("ledger"));
    let bonder = Bonder::new(address, level);

    let outcome = bonder.try_bond(&ledger, &registry).map_err(map_bonding_error)?;

    match outcome {
        BondOutcome::InsufficientAtoms => Err(CliError::insufficient_atoms(format!(
            "address {address} does not yet have enough atoms at {} to bond into {level}",
            level.predecessor().map(|p| p.to_string()).unwrap_or_else(|| "n/a".to_string())
        ))),
        BondOutcome::Bonded(atom) => {
            let audit = AuditLog::open(directives.ledger_dir.join("audit"));
            audit
                .append(
                    address,
                    AuditRecord {
                        op: AuditOp::Bond,
                        level,
                        particle: None,
                        atom_index: atom.index,
                        token_id: atom.token_id,
                        timestamp: Utc::now(),
                    },
                )
                .map_err(|e| CliError::io(format!("audit append failed: {e}")))?;

            info!(address = %address, level = %level, index = atom.index, "bond completed");
            Ok(json!({
                "address": address.to_hex(),
                "level": level.as_str(),
                "index": atom.index,
                "frequency": atom.frequency,
                "constituents": atom.constituents.len(),
            }))
        }
    }
}

fn map_bonding_error(error: BondingError) -> CliError {
    match error {
        BondingError::ValidatorRejected(reason) => CliError::validator_rejected(reason),
        BondingError::Quarantine(reason) => CliError::io(reason),
        BondingError::Ledger(e) => CliError::io(e.to_string()),
    }
}
