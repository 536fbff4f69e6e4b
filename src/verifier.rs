//! Checking a password against a stored hash.
//!
//! ```text
//! $2b$12$R9h/cIPz0gi.URNNX3kh2OPST9/PgBkqquzi.Ss7KIUgO2t0jWMUW
//! \__/\/ \____________________/\_____________________________/
//!  Alg Cost       Salt                      Digest
//! ```

use crate::error::{BcryptError, CostError, HashFormatError};
use crate::hasher::{Hasher, ENCODED_LEN, ENCODED_SALT_LEN};
use crate::version::Version;

const COST_START: usize = 4;
const SEPARATOR: usize = 6;
const SALT_START: usize = 7;
const DIGEST_START: usize = SALT_START + ENCODED_SALT_LEN;

/// The fields of an encoded hash, borrowed from the input.
///
/// Parsing checks structure only: the total length, the version identifier,
/// that the cost field is two digits and the `$` that follows it. The cost
/// range and the salt contents are checked when the hash is recomputed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HashParts<'a> {
    pub version: Version,
    pub cost: u32,
    pub salt: &'a [u8],
    pub digest: &'a [u8],
}

impl<'a> HashParts<'a> {
    pub fn parse(hash: &'a [u8]) -> Result<Self, BcryptError> {
        if hash.len() != ENCODED_LEN {
            return Err(BcryptError::InvalidHash(HashFormatError::Length(hash.len())));
        }

        let version = Version::from_identifier(&hash[..COST_START])?;

        let (tens, ones) = (hash[COST_START], hash[COST_START + 1]);
        if !tens.is_ascii_digit() || !ones.is_ascii_digit() {
            return Err(BcryptError::InvalidCost(CostError::NotDigits));
        }
        let cost = u32::from(tens - b'0') * 10 + u32::from(ones - b'0');

        if hash[SEPARATOR] != b'$' {
            return Err(BcryptError::InvalidHash(HashFormatError::Separator(hash[SEPARATOR])));
        }

        Ok(HashParts {
            version,
            cost,
            salt: &hash[SALT_START..DIGEST_START],
            digest: &hash[DIGEST_START..],
        })
    }

    /// The encoded salt as text. Non-ASCII bytes can never decode to a salt.
    pub fn salt_str(&self) -> Result<&'a str, BcryptError> {
        std::str::from_utf8(self.salt).map_err(|_| BcryptError::InvalidSalt)
    }
}

/// Compares two encoded hashes, touching every byte regardless of where
/// they first differ.
pub fn constant_time_eq(a: &[u8; ENCODED_LEN], b: &[u8; ENCODED_LEN]) -> bool {
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}

/// Verifies `password` against an encoded bcrypt `hash`.
///
/// Structural problems with `hash` are errors rather than `false`, so a
/// corrupted stored hash is distinguishable from a wrong password.
pub fn verify(password: impl AsRef<[u8]>, hash: impl AsRef<[u8]>) -> Result<bool, BcryptError> {
    let hash = hash.as_ref();
    let parts = HashParts::parse(hash)?;

    tracing::debug!(version = %parts.version, cost = parts.cost, "verifying bcrypt hash");

    let recomputed = Hasher::new(parts.version).hash_with_salt_bytes(password, parts.cost, parts.salt)?;

    let expected: &[u8; ENCODED_LEN] = hash
        .try_into()
        .map_err(|_| BcryptError::InvalidHash(HashFormatError::Length(hash.len())))?;
    let actual: &[u8; ENCODED_LEN] = recomputed
        .as_bytes()
        .try_into()
        .map_err(|_| BcryptError::InvalidHash(HashFormatError::Length(recomputed.as_bytes().len())))?;

    let matched = constant_time_eq(actual, expected);
    tracing::trace!(matched, "bcrypt verification finished");
    Ok(matched)
}

#[cfg(test)]
mod tests {
    use super::*;

    const KNOWN: &str = "$2a$05$CCCCCCCCCCCCCCCCCCCCC.E5YPO9kmyuRGyh0XouQYb4YMJKvyOeW";

    #[test]
    fn parse_splits_fields() -> Result<(), BcryptError> {
        let parts = HashParts::parse(KNOWN.as_bytes())?;
        assert_eq!(parts.version, Version::V2a);
        assert_eq!(parts.cost, 5);
        assert_eq!(parts.salt_str()?, "CCCCCCCCCCCCCCCCCCCCC.");
        assert_eq!(parts.digest, b"E5YPO9kmyuRGyh0XouQYb4YMJKvyOeW");
        Ok(())
    }

    #[test]
    fn parse_rejects_wrong_length() {
        for hash in ["", "$2a$10$invalid", "$2a$10", "not a hash"] {
            assert_eq!(
                HashParts::parse(hash.as_bytes()),
                Err(BcryptError::InvalidHash(HashFormatError::Length(hash.len())))
            );
        }
        let long = format!("{KNOWN}x");
        assert_eq!(
            HashParts::parse(long.as_bytes()),
            Err(BcryptError::InvalidHash(HashFormatError::Length(61)))
        );
    }

    #[test]
    fn parse_rejects_bad_version_and_cost() {
        let filler = "A".repeat(53);
        assert_eq!(
            HashParts::parse(format!("$2z$10${filler}").as_bytes()),
            Err(BcryptError::InvalidVersion("$2z$".into()))
        );
        assert_eq!(
            HashParts::parse(format!("$2a$1x${filler}").as_bytes()),
            Err(BcryptError::InvalidCost(CostError::NotDigits))
        );
        assert_eq!(
            HashParts::parse(format!("$2a$ 5${filler}").as_bytes()),
            Err(BcryptError::InvalidCost(CostError::NotDigits))
        );
    }

    #[test]
    fn out_of_range_cost_fails_on_recompute() {
        let hash = format!("$2a$99${}", "A".repeat(53));
        assert_eq!(
            verify("test", &hash),
            Err(BcryptError::InvalidCost(CostError::OutOfRange(99)))
        );
        let hash = format!("$2a$03${}", "A".repeat(53));
        assert_eq!(
            verify("test", &hash),
            Err(BcryptError::InvalidCost(CostError::OutOfRange(3)))
        );
    }

    #[test]
    fn parse_rejects_missing_separator() {
        let hash = KNOWN.replacen("$CC", "xCC", 1);
        assert_eq!(
            HashParts::parse(hash.as_bytes()),
            Err(BcryptError::InvalidHash(HashFormatError::Separator(b'x')))
        );
        assert_eq!(
            verify("U*U", &hash),
            Err(BcryptError::InvalidHash(HashFormatError::Separator(b'x')))
        );
    }

    // Password and cost problems are reported before anything about the
    // salt, even when the salt bytes are not text at all.
    #[test]
    fn non_ascii_salt_keeps_validation_order() {
        let mut hash = b"$2b$99$".to_vec();
        hash.push(0xff);
        hash.extend_from_slice(&[b'A'; 52]);
        assert_eq!(hash.len(), ENCODED_LEN);

        assert_eq!(verify("", &hash), Err(BcryptError::EmptyPassword));
        assert_eq!(
            verify([b'a'; 73], &hash),
            Err(BcryptError::PasswordTooLong { len: 73 })
        );
        assert_eq!(
            verify("pw", &hash),
            Err(BcryptError::InvalidCost(CostError::OutOfRange(99)))
        );

        hash[4..6].copy_from_slice(b"04");
        assert_eq!(verify("pw", &hash), Err(BcryptError::InvalidSalt));
    }

    #[test]
    fn undecodable_salt_is_an_error() {
        let hash = format!("$2b$04$!{}", "A".repeat(52));
        assert_eq!(verify("test", &hash), Err(BcryptError::InvalidSalt));
    }

    #[test]
    fn constant_time_eq_checks_every_byte() {
        let a = [b'a'; ENCODED_LEN];
        let mut b = a;
        assert!(constant_time_eq(&a, &b));
        b[0] = b'b';
        assert!(!constant_time_eq(&a, &b));
        b[0] = b'a';
        b[ENCODED_LEN - 1] = b'b';
        assert!(!constant_time_eq(&a, &b));
    }

    #[test]
    fn verify_known_hash() -> Result<(), BcryptError> {
        assert!(verify("U*U", KNOWN)?);
        assert!(!verify("U*U*", KNOWN)?);
        assert!(!verify("U*", KNOWN)?);
        Ok(())
    }

    #[test]
    fn tampered_digest_fails() -> Result<(), BcryptError> {
        let mut tampered = KNOWN.to_string();
        tampered.replace_range(59.., "X");
        assert!(!verify("U*U", &tampered)?);
        Ok(())
    }
}
