//! The bcrypt flavour of base64.
//!
//! Same 3-byte to 4-character grouping as standard base64, but with the
//! alphabet `./A-Za-z0-9` and no `=` padding. A trailing 1 or 2 byte group
//! produces 2 or 3 characters.

/// bcrypt's base64 alphabet, indexed by 6-bit value.
pub const BCRYPT_BASE64: &[u8; 64] = b"./ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

const INVALID: u8 = 0xff;

static DECODE_TABLE: [u8; 128] = {
    let mut table = [INVALID; 128];
    let mut i = 0;
    while i < BCRYPT_BASE64.len() {
        table[BCRYPT_BASE64[i] as usize] = i as u8;
        i += 1;
    }
    table
};

fn char64(c: u8) -> Option<u8> {
    match DECODE_TABLE.get(usize::from(c)) {
        Some(&v) if v != INVALID => Some(v),
        _ => None,
    }
}

/// Number of characters produced when encoding `len` bytes.
pub const fn encoded_len(len: usize) -> usize {
    (len * 4 + 2) / 3
}

/// Encodes the first `count` bytes of `input` (or all of it, if shorter).
pub fn encode(input: &[u8], count: usize) -> String {
    let input = &input[..count.min(input.len())];
    let mut output = String::with_capacity(encoded_len(input.len()));

    for chunk in input.chunks(3) {
        let b1 = u32::from(chunk[0]);
        let b2 = chunk.get(1).map(|&b| u32::from(b)).unwrap_or(0);
        let b3 = chunk.get(2).map(|&b| u32::from(b)).unwrap_or(0);

        let triple = (b1 << 16) | (b2 << 8) | b3;

        output.push(BCRYPT_BASE64[(triple >> 18) as usize] as char);
        output.push(BCRYPT_BASE64[(triple >> 12 & 0x3f) as usize] as char);

        if chunk.len() > 1 {
            output.push(BCRYPT_BASE64[(triple >> 6 & 0x3f) as usize] as char);
        }
        if chunk.len() > 2 {
            output.push(BCRYPT_BASE64[(triple & 0x3f) as usize] as char);
        }
    }

    output
}

/// Decodes at most `max_len` bytes from `input`.
///
/// Never fails: decoding stops at the first character outside the alphabet
/// (or once `max_len` bytes are produced) and returns the whole bytes
/// decoded so far. Callers check the returned length.
pub fn decode(input: &[u8], max_len: usize) -> Vec<u8> {
    let mut output = Vec::with_capacity(max_len);
    let mut off = 0;

    while off + 1 < input.len() && output.len() < max_len {
        let (Some(c1), Some(c2)) = (char64(input[off]), char64(input[off + 1])) else {
            break;
        };
        off += 2;

        output.push((c1 << 2) | ((c2 & 0x30) >> 4));
        if output.len() >= max_len || off >= input.len() {
            break;
        }

        let Some(c3) = char64(input[off]) else {
            break;
        };
        off += 1;

        output.push(((c2 & 0x0f) << 4) | ((c3 & 0x3c) >> 2));
        if output.len() >= max_len || off >= input.len() {
            break;
        }

        let Some(c4) = char64(input[off]) else {
            break;
        };
        off += 1;

        output.push(((c3 & 0x03) << 6) | c4);
    }

    output
}
