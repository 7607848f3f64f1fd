use thiserror::Error;

#[derive(Debug, Error)]
pub enum MddError {
    #[error("IO: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON: {0}")]
    SerdeJson(#[from] serde_json::Error),

    #[error("Persist: {0}")]
    Persist(#[from] tempfile::PersistError),

    #[error("expected item count must be at least 1 (got {0})")]
    InvalidExpectedItems(u64),

    #[error("false positive rate must lie strictly between 0 and 1 (got {0})")]
    InvalidFpRate(f64),

    #[error("bit field size {0} is out of range")]
    InvalidSize(i64),

    #[error("truncated filter: missing {field}")]
    Truncated { field: &'static str },

    #[error("bad filter header: size={size} hash_count={hash_count}")]
    InvalidHeader { size: u64, hash_count: u64 },

    #[error("bit field buffer holds {got} bytes, expected {expected}")]
    BufferLength { expected: usize, got: usize },

    #[error("{name}: {alg} digest mismatch (expected {expected}, got {got})")]
    DigestMismatch { name: String, alg: String, expected: String, got: String },

    #[error("unknown hash algorithm: {0}")]
    UnknownHashAlg(String),

    #[error("not found: {0}")]
    NotFound(String),
}

pub type Result<T> = std::result::Result<T, MddError>;
