use thiserror::Error;

/// Why a cost value was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CostError {
    #[error("{0} is not between 4 and 31")]
    OutOfRange(u32),

    #[error("cost field is not two decimal digits")]
    NotDigits,
}

/// Why an encoded hash is structurally malformed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum HashFormatError {
    #[error("expected 60 bytes, got {0}")]
    Length(usize),

    #[error("expected '$' after the cost, found byte {0:#04x}")]
    Separator(u8),
}

/// Errors produced while hashing or verifying a password.
///
/// Every variant describes a defect in the caller's input; none of them
/// are transient.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BcryptError {
    #[error("Invalid password: password cannot be empty")]
    EmptyPassword,

    #[error("Invalid password: {len} bytes exceeds the 72 byte maximum")]
    PasswordTooLong { len: usize },

    #[error("Invalid cost: {0}")]
    InvalidCost(CostError),

    #[error("Invalid salt length: expected 22 encoded characters, got {0}")]
    InvalidSaltLength(usize),

    #[error("Invalid salt: does not decode to 16 bytes")]
    InvalidSalt,

    #[error("Invalid hash: {0}")]
    InvalidHash(HashFormatError),

    #[error("Invalid version: unsupported identifier {0:?}")]
    InvalidVersion(String),
}
