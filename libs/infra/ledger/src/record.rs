// [libs/infra/ledger/src/record.rs]
//! On-disk record framing and canonical body encoding (spec §6):
//! `{len:u32}{body}{entryHash:32B}`, `body` with stable key order and
//! fixed 2-fractional-digit decimal strings for `frequency`.

use atomic_domain_model::{Atom, ConstituentRef, Hash32, Level, Particle};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Serialize, Deserialize)]
struct CanonicalAtomBody {
    level: Level,
    index: u64,
    particle: Option<Particle>,
    frequency: String,
    timestamp: chrono::DateTime<chrono::Utc>,
    token_id: Uuid,
    iv: Option<Vec<u8>>,
    auth_tag: Option<Vec<u8>>,
    encrypted_payload: Option<Vec<u8>>,
    constituents: Vec<ConstituentRef>,
}

/// Serializes an atom's body (everything except the trailing
/// `entryHash`) with the fixed 2-decimal frequency string the wire
/// format requires.
pub fn canonical_body_bytes(atom: &Atom) -> Vec<u8> {
    let body = CanonicalAtomBody {
        level: atom.level,
        index: atom.index,
        particle: atom.particle,
        frequency: format!("{:.2}", atom.frequency),
        timestamp: atom.timestamp,
        token_id: atom.token_id,
        iv: atom.iv.clone(),
        auth_tag: atom.auth_tag.clone(),
        encrypted_payload: atom.encrypted_payload.clone(),
        constituents: atom.constituents.clone(),
    };
    serde_json::to_vec(&body).expect("canonical atom body is always serializable")
}

pub fn atom_from_body(body: &[u8], hash: Hash32) -> Result<Atom, serde_json::Error> {
    let parsed: CanonicalAtomBody = serde_json::from_slice(body)?;
    Ok(Atom {
        level: parsed.level,
        index: parsed.index,
        particle: parsed.particle,
        frequency: parsed.frequency.parse().unwrap_or(0.0),
        timestamp: parsed.timestamp,
        token_id: parsed.token_id,
        iv: parsed.iv,
        auth_tag: parsed.auth_tag,
        encrypted_payload: parsed.encrypted_payload,
        constituents: parsed.constituents,
        hash,
    })
}

/// `{len:u32}{body}{entryHash:32B}`.
pub fn frame_record(body: &[u8], entry_hash: Hash32) -> Vec<u8> {
    let mut framed = Vec::with_capacity(4 + body.len() + 32);
    framed.extend_from_slice(&(body.len() as u32).to_le_bytes());
    framed.extend_from_slice(body);
    framed.extend_from_slice(entry_hash.as_bytes());
    framed
}

/// Parses every `{len}{body}{hash}` record out of a full log buffer, in
/// order. Stops (without error) at a truncated trailing record, which a
/// crash during a previous in-flight append could leave behind; the
/// next append's temp-file-then-rename simply starts from the last
/// complete record.
pub fn parse_records(buffer: &[u8]) -> Vec<(Vec<u8>, Hash32)> {
    let mut records = Vec::new();
    let mut offset = 0usize;
    while offset + 4 <= buffer.len() {
        let len = u32::from_le_bytes(buffer[offset..offset + 4].try_into().unwrap()) as usize;
        let body_start = offset + 4;
        let body_end = body_start + len;
        let hash_end = body_end + 32;
        if hash_end > buffer.len() {
            break;
        }
        let body = buffer[body_start..body_end].to_vec();
        let mut hash_bytes = [0u8; 32];
        hash_bytes.copy_from_slice(&buffer[body_end..hash_end]);
        records.push((body, Hash32::from_bytes(hash_bytes)));
        offset = hash_end;
    }
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use atomic_domain_model::zero_hash;
    use chrono::Utc;

    fn sample_atom() -> Atom {
        Atom {
            level: Level::Bit,
            index: 0,
            particle: Some(Particle::Proton),
            frequency: 123.456,
            timestamp: Utc::now(),
            token_id: Uuid::nil(),
            iv: Some(vec![1, 2, 3]),
            auth_tag: Some(vec![4, 5, 6]),
            encrypted_payload: Some(vec![1]),
            constituents: Vec::new(),
            hash: zero_hash(),
        }
    }

    #[test]
    fn frequency_round_trips_with_two_decimals() {
        let atom = sample_atom();
        let body = canonical_body_bytes(&atom);
        let restored = atom_from_body(&body, zero_hash()).unwrap();
        assert_eq!(restored.frequency, 123.46);
    }

    #[test]
    fn two_records_parse_back_in_order() {
        let atom_a = sample_atom();
        let mut atom_b = sample_atom();
        atom_b.index = 1;

        let body_a = canonical_body_bytes(&atom_a);
        let hash_a = atomic_domain_model::hashing::chain_hash(&zero_hash(), &body_a);
        let body_b = canonical_body_bytes(&atom_b);
        let hash_b = atomic_domain_model::hashing::chain_hash(&hash_a, &body_b);

        let mut buffer = frame_record(&body_a, hash_a);
        buffer.extend(frame_record(&body_b, hash_b));

        let records = parse_records(&buffer);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].1, hash_a);
        assert_eq!(records[1].1, hash_b);
    }

    #[test]
    fn truncated_trailing_record_is_dropped() {
        let atom = sample_atom();
        let body = canonical_body_bytes(&atom);
        let hash = atomic_domain_model::hashing::chain_hash(&zero_hash(), &body);
        let mut buffer = frame_record(&body, hash);
        buffer.truncate(buffer.len() - 5);
        assert!(parse_records(&buffer).is_empty());
    }
}
