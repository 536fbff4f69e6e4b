//! The expensive key schedule ("EksBlowfish setup").
//!
//! `setup` seeds a fresh [`CipherState`] from the password and salt, then
//! re-keys it alternately with the password and the salt `2^cost` times.

use crate::blowfish::{CipherState, ROUNDS};
use crate::hasher::{Cost, SALT_LEN};

/// Reads big-endian words from a byte slice, wrapping to the start when
/// the slice runs out.
pub(crate) struct WordStream<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> WordStream<'a> {
    pub(crate) fn new(data: &'a [u8]) -> Self {
        WordStream { data, pos: 0 }
    }

    pub(crate) fn next_word(&mut self) -> u32 {
        let mut word = 0u32;
        for _ in 0..4 {
            if self.pos >= self.data.len() {
                self.pos = 0;
            }
            word = (word << 8) | u32::from(self.data[self.pos]);
            self.pos += 1;
        }
        word
    }
}

fn xor_key_into_p(state: &mut CipherState, key: &[u8]) {
    let mut stream = WordStream::new(key);
    for p in state.p.iter_mut() {
        *p ^= stream.next_word();
    }
}

/// Replaces P and then every S-box entry with successive encipherments of a
/// running block. When `salt` is given, two salt words are folded into the
/// block before each encipherment.
fn refill(state: &mut CipherState, mut salt: Option<&mut WordStream<'_>>) {
    let mut datal = 0u32;
    let mut datar = 0u32;

    let mut next = |cipher: &CipherState| {
        if let Some(salt) = salt.as_deref_mut() {
            datal ^= salt.next_word();
            datar ^= salt.next_word();
        }
        let (l, r) = cipher.encipher(datal, datar);
        datal = l;
        datar = r;
        (l, r)
    };

    for i in (0..ROUNDS + 2).step_by(2) {
        let (l, r) = next(&*state);
        state.p[i] = l;
        state.p[i + 1] = r;
    }

    for i in 0..4 {
        for k in (0..256).step_by(2) {
            let (l, r) = next(&*state);
            state.s[i][k] = l;
            state.s[i][k + 1] = r;
        }
    }
}

/// Salted key expansion; run once before the expensive loop.
pub(crate) fn expand_state(state: &mut CipherState, key: &[u8], salt: &[u8; SALT_LEN]) {
    xor_key_into_p(state, key);
    let mut salt = WordStream::new(salt);
    refill(state, Some(&mut salt));
}

/// Unsalted key expansion; the body of the expensive loop.
pub(crate) fn expand0_state(state: &mut CipherState, key: &[u8]) {
    xor_key_into_p(state, key);
    refill(state, None);
}

/// Builds the final cipher state for `key` (already NUL-terminated and at
/// most 73 bytes) and `salt`.
pub(crate) fn setup(key: &[u8], salt: &[u8; SALT_LEN], cost: Cost) -> CipherState {
    debug_assert!(!key.is_empty() && key.len() <= 73);

    let mut state = CipherState::new();
    expand_state(&mut state, key, salt);

    for _ in 0..cost.rounds() {
        expand0_state(&mut state, key);
        expand0_state(&mut state, salt);
    }

    state
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn word_stream_wraps_short_input() {
        let mut stream = WordStream::new(b"abc");
        assert_eq!(stream.next_word(), u32::from_be_bytes(*b"abca"));
        assert_eq!(stream.next_word(), u32::from_be_bytes(*b"bcab"));
        assert_eq!(stream.next_word(), u32::from_be_bytes(*b"cabc"));
    }

    #[test]
    fn word_stream_reads_big_endian() {
        let mut stream = WordStream::new(&[0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08]);
        assert_eq!(stream.next_word(), 0x01020304);
        assert_eq!(stream.next_word(), 0x05060708);
        assert_eq!(stream.next_word(), 0x01020304);
    }

    // With an all-zero salt the salted expansion is the plain Blowfish key
    // schedule, so the classic Blowfish vectors apply.
    #[test]
    fn zero_salt_expansion_is_blowfish() {
        let cases: [([u8; 8], (u32, u32), (u32, u32)); 2] = [
            ([0x00; 8], (0x00000000, 0x00000000), (0x4ef99745, 0x6198dd78)),
            ([0xff; 8], (0xffffffff, 0xffffffff), (0x51866fd5, 0xb85ecb8a)),
        ];

        for (key, plain, cipher) in cases {
            let mut state = CipherState::new();
            expand_state(&mut state, &key, &[0; SALT_LEN]);
            assert_eq!(state.encipher(plain.0, plain.1), cipher);
        }
    }

    #[test]
    fn setup_depends_on_cost() {
        let salt = [7u8; SALT_LEN];
        let low = setup(b"secret\0", &salt, Cost::new(4).unwrap());
        let high = setup(b"secret\0", &salt, Cost::new(5).unwrap());
        assert_ne!(low.p, high.p);
    }

    #[test]
    fn setup_is_deterministic() {
        let salt = [7u8; SALT_LEN];
        let a = setup(b"secret\0", &salt, Cost::new(4).unwrap());
        let b = setup(b"secret\0", &salt, Cost::new(4).unwrap());
        assert_eq!(a.p, b.p);
        assert_eq!(a.s, b.s);
    }
}
