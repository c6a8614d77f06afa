// [libs/domain/model/src/token.rs]
//! Proof-of-Access token record (spec §3, "Token") and its lifecycle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// `MINT -> ACTIVE -> (optionally ALLOCATED) -> REDEEMED | REVOKED`.
/// Never deletes; transitions are logged by the Token Registry (C3), not
/// mutated in place by callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenState {
    Active,
    Allocated,
    Redeemed,
    Revoked,
}

/// Which asymmetric primitive signed this token. Spec §9 leaves the
/// concrete post-quantum choice as a pluggable config key; this type only
/// records which backend was used so `validate` can select the matching
/// verifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenVersion {
    Quantum,
    Legacy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    pub token_id: Uuid,
    pub token_class: String,
    pub issuing_serial_number: String,
    pub version: TokenVersion,
    pub signature: Vec<u8>,
    pub minted_at: DateTime<Utc>,
    pub state: TokenState,
    pub associated_carbon_cost: f64,
}

impl Token {
    /// `I4`: an atom's `tokenId` must reference a token `ACTIVE` at the
    /// atom's timestamp. Callers join this against their own clock; the
    /// type itself only reports current-state membership.
    pub fn is_usable(&self) -> bool {
        matches!(self.state, TokenState::Active | TokenState::Allocated)
    }
}
