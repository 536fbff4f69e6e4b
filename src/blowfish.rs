use zeroize::Zeroize;

use crate::constants::{INITIAL_P, INITIAL_S};

/// Number of Feistel rounds.
pub(crate) const ROUNDS: usize = 16;

/// The mutable Blowfish key schedule: 18 subkeys and four 256-entry S-boxes.
///
/// Each hash call owns exactly one of these. It starts from the pi
/// constants, is rewritten by the key schedule, and is wiped on drop.
pub(crate) struct CipherState {
    pub(crate) p: [u32; ROUNDS + 2],
    pub(crate) s: [[u32; 256]; 4],
}

impl CipherState {
    pub(crate) fn new() -> Self {
        CipherState {
            p: INITIAL_P,
            s: INITIAL_S,
        }
    }

    #[inline(always)]
    fn f(&self, x: u32) -> u32 {
        let [a, b, c, d] = x.to_be_bytes();
        let h = self.s[0][usize::from(a)].wrapping_add(self.s[1][usize::from(b)]);
        (h ^ self.s[2][usize::from(c)]).wrapping_add(self.s[3][usize::from(d)])
    }

    /// Enciphers one 64-bit block held as two big-endian halves.
    #[inline]
    pub(crate) fn encipher(&self, mut xl: u32, mut xr: u32) -> (u32, u32) {
        xl ^= self.p[0];

        for i in (1..=ROUNDS).step_by(2) {
            xr ^= self.f(xl) ^ self.p[i];
            xl ^= self.f(xr) ^ self.p[i + 1];
        }

        (xr ^ self.p[ROUNDS + 1], xl)
    }
}

impl Drop for CipherState {
    fn drop(&mut self) {
        self.p.zeroize();
        for sbox in self.s.iter_mut() {
            sbox.zeroize();
        }
    }
}
