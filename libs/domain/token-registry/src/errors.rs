// [libs/domain/token-registry/src/errors.rs]
//! Error catalog for C3, in the teacher's tagged-variant style. Mapped
//! onto the spec §7 taxonomy kinds in SPEC_FULL.md §10.

use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum TokenRegistryError {
    /// Spec §7 `AccessDenied` / `TokenInvalid{wrongHost}`.
    #[error("[TOKEN_WRONG_HOST]: token {token_id} was minted for serial {minted_for}, presented on {presented_by}")]
    WrongHost {
        token_id: Uuid,
        minted_for: String,
        presented_by: String,
    },

    /// Spec §7 `TokenInvalid{replay}`: a second `USE` of a `REDEEMED` token.
    #[error("[TOKEN_REPLAY]: token {0} already REDEEMED")]
    AlreadyRedeemed(Uuid),

    /// Spec §7 `TokenInvalid{revoked}`.
    #[error("[TOKEN_REVOKED]: token {0} has been revoked")]
    Revoked(Uuid),

    #[error("[TOKEN_NOT_FOUND]: no token registered with id {0}")]
    NotFound(Uuid),

    #[error("[TOKEN_BAD_STATE]: token {token_id} expected state {expected}, found {actual:?}")]
    UnexpectedState {
        token_id: Uuid,
        expected: &'static str,
        actual: atomic_domain_model::TokenState,
    },

    #[error("[TOKEN_ISSUER_MISMATCH]: token {token_id} is owned by node {owner}, not {requester}")]
    IssuingNodeMismatch {
        token_id: Uuid,
        owner: String,
        requester: String,
    },

    #[error("[TOKEN_IDENTITY_UNREADABLE]: cannot read hardware serial identity: {0}")]
    IdentityUnreadable(String),

    #[error("[TOKEN_WIRE_FAULT]: presented blob failed to decrypt or decode: {0}")]
    MalformedPresentation(String),

    #[error(transparent)]
    Crypto(#[from] atomic_core_crypto::CryptoError),
}
