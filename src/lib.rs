//! bcrypt password hashing, built on the expensive-key-schedule Blowfish
//! variant (EksBlowfish).
//!
//! bcrypt is a password hashing function designed by Niels Provos and David
//! Mazières, based on the Blowfish cipher, and presented in 1999 at the
//! Usenix Security Symposium. Its cost parameter doubles the work of the key
//! schedule with every increment.
//!
//! Hashes use the standard 60-character modular crypt format, compatible
//! with OpenBSD, Openwall and other bcrypt implementations:
//!
//! ```text
//! $2b$10$N9qo8uLOickgx2ZMRZoMyeIjZAgcfl7p92ldGxad68LJZdL17lhWy
//! ```
//!
//! ## Examples
//!
//! ```rust
//! use bcrypt_eks::{hash, verify};
//!
//! let hashed = hash("hunter2", 4).unwrap();
//! assert!(verify("hunter2", &hashed).unwrap());
//! assert!(!verify("hunter3", &hashed).unwrap());
//! ```
//!
//! Hashing with a known salt, or a different format version:
//!
//! ```rust
//! use bcrypt_eks::{Hasher, Version};
//!
//! let hashed = Hasher::new(Version::V2a)
//!     .hash_with_salt("U*U", 5, "CCCCCCCCCCCCCCCCCCCCC.")
//!     .unwrap();
//! assert_eq!(
//!     hashed.as_str(),
//!     "$2a$05$CCCCCCCCCCCCCCCCCCCCC.E5YPO9kmyuRGyh0XouQYb4YMJKvyOeW"
//! );
//! ```

pub mod base64;
mod blowfish;
mod constants;
mod eks;
mod error;
mod hasher;
mod verifier;
mod version;

pub use error::{BcryptError, CostError, HashFormatError};
pub use hasher::{
    Cost, EncodedHash, Hasher, Salt, DEFAULT_COST, DIGEST_LEN, ENCODED_DIGEST_LEN, ENCODED_LEN,
    ENCODED_SALT_LEN, MAX_COST, MIN_COST, SALT_LEN,
};
pub use verifier::{constant_time_eq, verify, HashParts};
pub use version::{Version, MAX_PASSWORD_LEN};

/// Hashes `password` as a `$2b$` hash with a freshly generated salt.
///
/// ## Errors
///
/// `EmptyPassword`, `PasswordTooLong` (over 72 bytes) or `InvalidCost`
/// (outside 4..=31).
pub fn hash(password: impl AsRef<[u8]>, cost: u32) -> Result<EncodedHash, BcryptError> {
    Hasher::default().hash(password, cost)
}

/// Hashes `password` as a `$2b$` hash with the 22-character encoded `salt`.
pub fn hash_with_salt(
    password: impl AsRef<[u8]>,
    cost: u32,
    salt: &str,
) -> Result<EncodedHash, BcryptError> {
    Hasher::default().hash_with_salt(password, cost, salt)
}
