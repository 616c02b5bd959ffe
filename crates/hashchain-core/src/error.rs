use thiserror::Error;

/// Everything that can go wrong while hashing, searching or building.
/// Validation findings are not errors; see [`crate::validate::Fault`].
#[derive(Debug, Error)]
pub enum ChainError {
    #[error("payload cannot be canonically serialized: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid proof parameters: last_proof={last_proof}, modulus={modulus} (both must be positive)")]
    InvalidProofParameters { last_proof: u64, modulus: u64 },

    #[error("unknown proof variant tag {0:?}")]
    UnknownProofVariant(String),

    #[error("requested {requested} blocks but only {supplied} payloads were supplied")]
    ArityMismatch { requested: usize, supplied: usize },

    #[error("cannot build a chain from an empty payload list")]
    EmptyPayloadList,

    #[error("cannot extend a chain that has no tip")]
    EmptyChain,

    #[error("no proof found within {iterations} iterations")]
    ProofNotFound { iterations: u64 },
}
