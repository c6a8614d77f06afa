// [libs/domain/model/src/lib.rs]
/*!
 * =================================================================
 * APARATO: ATOMIC DOMAIN MODEL (V1.0)
 * CLASIFICACIÓN: DOMAIN CORE
 * RESPONSABILIDAD: TIPOS COMPARTIDOS DEL NÚCLEO (Atom, Token, Hashing)
 *
 * Define las estructuras inmutables descritas en la especificación del
 * sistema: el atomo jerárquico, el token de Proof-of-Access y las
 * primitivas de hash-chaining (`Hash32`, `chain_hash`) que
 * `atomic-infra-ledger` usa para encadenar sus propios registros.
 * Ningún otro crate debe redefinir estos tipos; todos los componentes
 * (C1-C9) dependen de este vocabulario.
 * =================================================================
 */

pub mod address;
pub mod atom;
pub mod hashing;
pub mod level;
pub mod particle;
pub mod token;

pub use address::Address;
pub use atom::{Atom, BounceRate, ConstituentRef};
pub use hashing::{zero_hash, Hash32};
pub use level::Level;
pub use particle::Particle;
pub use token::{Token, TokenState, TokenVersion};
