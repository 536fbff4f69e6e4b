use std::fmt;
use std::str::FromStr;

use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use zeroize::Zeroizing;

use crate::base64;
use crate::eks::{self, WordStream};
use crate::error::{BcryptError, CostError};
use crate::verifier::HashParts;
use crate::version::{Version, MAX_PASSWORD_LEN};

/// Raw salt length in bytes.
pub const SALT_LEN: usize = 16;
/// Encoded salt length in characters.
pub const ENCODED_SALT_LEN: usize = 22;
/// Digest bytes kept in the encoded hash (the 24th is dropped).
pub const DIGEST_LEN: usize = 23;
/// Encoded digest length in characters.
pub const ENCODED_DIGEST_LEN: usize = 31;
/// Total length of an encoded hash.
pub const ENCODED_LEN: usize = 60;

pub const MIN_COST: u32 = 4;
pub const MAX_COST: u32 = 31;
pub const DEFAULT_COST: u32 = 10;

const MAGIC: &[u8; 24] = b"OrpheanBeholderScryDoubt";
const MAGIC_WORDS: usize = 6;
const DIGEST_ROUNDS: usize = 64;

/// A bcrypt work factor: the base-2 logarithm of the key schedule rounds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Cost(u32);

impl Cost {
    pub fn new(log_rounds: u32) -> Result<Self, BcryptError> {
        if !(MIN_COST..=MAX_COST).contains(&log_rounds) {
            return Err(BcryptError::InvalidCost(CostError::OutOfRange(log_rounds)));
        }
        Ok(Cost(log_rounds))
    }

    pub const fn log_rounds(self) -> u32 {
        self.0
    }

    /// Number of expensive key schedule iterations, `2^cost`.
    pub const fn rounds(self) -> u64 {
        1u64 << self.0
    }
}

impl Default for Cost {
    fn default() -> Self {
        Cost(DEFAULT_COST)
    }
}

impl fmt::Display for Cost {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:02}", self.0)
    }
}

/// 16 raw salt bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Salt([u8; SALT_LEN]);

impl Salt {
    pub const fn from_bytes(bytes: [u8; SALT_LEN]) -> Self {
        Salt(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; SALT_LEN] {
        &self.0
    }

    /// Draws a fresh salt from the operating system's secure RNG.
    pub fn generate() -> Self {
        Self::generate_with(&mut OsRng)
    }

    /// Draws a fresh salt from `rng`.
    pub fn generate_with<R: RngCore + CryptoRng + ?Sized>(rng: &mut R) -> Self {
        let mut salt = [0u8; SALT_LEN];
        rng.fill_bytes(&mut salt);
        Salt(salt)
    }

    /// The canonical 22-character encoding.
    pub fn encode(&self) -> String {
        let mut encoded = base64::encode(&self.0, SALT_LEN);
        encoded.truncate(ENCODED_SALT_LEN);
        encoded
    }

    /// Decodes an encoded salt. Characters past the first 22 are ignored.
    pub fn decode(encoded: &str) -> Result<Self, BcryptError> {
        Self::decode_bytes(encoded.as_bytes())
    }

    /// Like [`Salt::decode`], for salt text taken straight out of a stored
    /// hash. Bytes outside the alphabet (including non-ASCII) are `InvalidSalt`.
    pub fn decode_bytes(encoded: &[u8]) -> Result<Self, BcryptError> {
        if encoded.len() < ENCODED_SALT_LEN {
            return Err(BcryptError::InvalidSaltLength(encoded.len()));
        }

        let decoded = base64::decode(encoded, SALT_LEN);
        let bytes: [u8; SALT_LEN] = decoded.try_into().map_err(|_| BcryptError::InvalidSalt)?;
        Ok(Salt(bytes))
    }
}

/// A complete 60-character bcrypt hash string.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct EncodedHash(String);

impl EncodedHash {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// Splits the hash into its fields.
    pub fn parts(&self) -> Result<HashParts<'_>, BcryptError> {
        HashParts::parse(self.as_bytes())
    }
}

impl fmt::Display for EncodedHash {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for EncodedHash {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl AsRef<[u8]> for EncodedHash {
    fn as_ref(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl From<EncodedHash> for String {
    fn from(hash: EncodedHash) -> Self {
        hash.0
    }
}

/// Accepts any string with a valid structure (length, version, cost digits).
/// Whether the digest matches anything is only known to [`crate::verify`].
impl FromStr for EncodedHash {
    type Err = BcryptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HashParts::parse(s.as_bytes())?;
        Ok(EncodedHash(s.to_string()))
    }
}

/// Validates the password against `version`'s rules and returns the key
/// material: at most 72 bytes followed by a single NUL.
///
/// A password that already ends in NUL is not terminated twice.
fn key_material(password: &[u8], version: Version) -> Result<Zeroizing<Vec<u8>>, BcryptError> {
    if password.is_empty() {
        return Err(BcryptError::EmptyPassword);
    }

    let raw = password.strip_suffix(&[0u8]).unwrap_or(password);
    if raw.len() > MAX_PASSWORD_LEN && version.enforces_length_limit() {
        return Err(BcryptError::PasswordTooLong { len: raw.len() });
    }

    let raw = &raw[..raw.len().min(MAX_PASSWORD_LEN)];
    let mut key = Zeroizing::new(Vec::with_capacity(raw.len() + 1));
    key.extend_from_slice(raw);
    key.push(0);
    Ok(key)
}

/// Runs the key schedule, then enciphers the magic text 64 times.
fn digest(key: &[u8], salt: &Salt, cost: Cost) -> [u8; 4 * MAGIC_WORDS] {
    let state = eks::setup(key, salt.as_bytes(), cost);

    let mut cdata = [0u32; MAGIC_WORDS];
    let mut stream = WordStream::new(MAGIC);
    for word in cdata.iter_mut() {
        *word = stream.next_word();
    }

    for _ in 0..DIGEST_ROUNDS {
        for pair in cdata.chunks_exact_mut(2) {
            let (l, r) = state.encipher(pair[0], pair[1]);
            pair[0] = l;
            pair[1] = r;
        }
    }

    let mut out = [0u8; 4 * MAGIC_WORDS];
    for (chunk, word) in out.chunks_exact_mut(4).zip(cdata) {
        chunk.copy_from_slice(&word.to_be_bytes());
    }
    out
}

/// Produces bcrypt hashes tagged with one [`Version`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Hasher {
    version: Version,
}

impl Hasher {
    pub const fn new(version: Version) -> Self {
        Hasher { version }
    }

    pub const fn version(&self) -> Version {
        self.version
    }

    /// Hashes `password` with a freshly generated salt.
    pub fn hash(&self, password: impl AsRef<[u8]>, cost: u32) -> Result<EncodedHash, BcryptError> {
        self.hash_with_rng(password, cost, &mut OsRng)
    }

    /// Hashes `password` with a salt drawn from `rng`.
    pub fn hash_with_rng<R: RngCore + CryptoRng + ?Sized>(
        &self,
        password: impl AsRef<[u8]>,
        cost: u32,
        rng: &mut R,
    ) -> Result<EncodedHash, BcryptError> {
        let salt = Salt::generate_with(rng).encode();
        self.hash_with_salt(password, cost, &salt)
    }

    /// Hashes `password` with the encoded salt `salt`.
    ///
    /// The first 22 characters of `salt` are copied verbatim into the
    /// output; anything after them is ignored.
    pub fn hash_with_salt(
        &self,
        password: impl AsRef<[u8]>,
        cost: u32,
        salt: &str,
    ) -> Result<EncodedHash, BcryptError> {
        self.hash_with_salt_bytes(password, cost, salt.as_bytes())
    }

    /// [`Hasher::hash_with_salt`] over raw salt text. Password, cost and
    /// salt are validated in that order before any cipher work.
    pub(crate) fn hash_with_salt_bytes(
        &self,
        password: impl AsRef<[u8]>,
        cost: u32,
        salt: &[u8],
    ) -> Result<EncodedHash, BcryptError> {
        let key = key_material(password.as_ref(), self.version)?;
        let cost = Cost::new(cost)?;
        let raw_salt = Salt::decode_bytes(salt)?;

        tracing::debug!(version = %self.version, cost = cost.log_rounds(), "computing bcrypt hash");

        let digest = digest(&key, &raw_salt, cost);

        let mut encoded = String::with_capacity(ENCODED_LEN);
        encoded.push_str(self.version.identifier());
        encoded.push_str(&cost.to_string());
        encoded.push('$');
        // Decoding 16 bytes consumed 22 alphabet characters, so these are ASCII.
        encoded.extend(salt[..ENCODED_SALT_LEN].iter().map(|&b| char::from(b)));
        encoded.push_str(&base64::encode(&digest, DIGEST_LEN));
        debug_assert_eq!(encoded.len(), ENCODED_LEN);

        Ok(EncodedHash(encoded))
    }
}
