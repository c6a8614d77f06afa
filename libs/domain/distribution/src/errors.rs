// [libs/domain/distribution/src/errors.rs]
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DistributionError {
    /// Spec §4.6: "empty roster ⇒ `NoNodesAvailable`".
    #[error("[DISTRIBUTION_NO_NODES]: node roster is empty, cannot place atoms for address {0}")]
    NoNodesAvailable(String),
}
