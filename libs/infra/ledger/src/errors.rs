// [libs/infra/ledger/src/errors.rs]
use thiserror::Error;

use crate::key::LogKey;

#[derive(Error, Debug)]
pub enum LedgerError {
    /// Spec §7 `LedgerIOError`: persistence failure, retried locally with
    /// bounded jitter by the caller.
    #[error("[LEDGER_IO_FAULT]: {log}: {source}")]
    Io {
        log: LogKey,
        #[source]
        source: std::io::Error,
    },

    /// Spec §7 `LedgerInvariantError`: hash-chain break or cursor
    /// mismatch. Quarantines the log; fatal until operator clears.
    #[error("[LEDGER_INVARIANT_FAULT]: {log}: {reason}")]
    Invariant { log: LogKey, reason: String },

    /// The log's quarantine marker is present; appends refused (spec §4.1).
    #[error("[LEDGER_QUARANTINED]: {0} refuses further appends until cleared")]
    Quarantined(LogKey),

    #[error("[LEDGER_SERIALIZATION_FAULT]: {0}")]
    Serialization(#[from] serde_json::Error),
}
