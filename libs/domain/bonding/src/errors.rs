// [libs/domain/bonding/src/errors.rs]
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BondingError {
    /// Spec §7 `ValidatorRejected`: logged, triggers bounded back-off.
    /// Not fatal — the bonder leaves constituents unconsumed and retries.
    #[error("[BOND_VALIDATOR_REJECTED]: {0}")]
    ValidatorRejected(String),

    /// Spec §7 `BondQuarantine`: lower consumed but higher append
    /// failed; manual replay required.
    #[error("[BOND_QUARANTINE]: append of the bonded atom failed after constituents were read: {0}")]
    Quarantine(String),

    #[error(transparent)]
    Ledger(#[from] atomic_infra_ledger::LedgerError),
}
