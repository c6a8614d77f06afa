// [libs/domain/sharder/src/errors.rs]
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SharderError {
    /// Spec §4.5 step 1: `Token.validate` failure.
    #[error("[SHARDER_ACCESS_DENIED]: token rejected: {0}")]
    AccessDenied(String),

    #[error("[SHARDER_EMPTY_PAYLOAD]: refusing to shard a zero-byte payload")]
    EmptyPayload,

    /// Spec §5, backpressure: the ledger's append latency is over budget,
    /// so new shard requests are refused outright rather than queued.
    #[error("[SHARDER_BACKPRESSURE]: ledger write latency p99 of {p99_ms:.1}ms exceeds the {threshold_ms:.1}ms budget")]
    Backpressure { p99_ms: f64, threshold_ms: f64 },

    #[error(transparent)]
    Crypto(#[from] atomic_core_crypto::CryptoError),
}
