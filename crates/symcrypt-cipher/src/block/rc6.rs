//! RC6-32/20/b
//!
//! Block words are loaded little-endian, matching the published test vectors.

use symcrypt_core::{Algorithm, SymcryptError, SymcryptResult};
use zeroize::Zeroize;

use super::{check_block_len, load_words, store_words, BlockCipher};
use crate::BLOCK_SIZE;

const ROUNDS: usize = 20;
const SCHEDULE_LEN: usize = 2 * ROUNDS + 4;

const P32: u32 = 0xB7E1_5163;
const Q32: u32 = 0x9E37_79B9;

/// lg(w) for w = 32
const LG_W: u32 = 5;

/// RC6 with 20 rounds over 32-bit words. Round keys are zeroized on drop.
pub struct Rc6 {
    round_keys: [u32; SCHEDULE_LEN],
}

impl Rc6 {
    /// Accepts 128-, 192- or 256-bit keys.
    pub fn new(key: &[u8]) -> SymcryptResult<Self> {
        if !matches!(key.len(), 16 | 24 | 32) {
            return Err(SymcryptError::Config(format!(
                "RC6 key must be 128, 192 or 256 bits, got {} bits",
                key.len() * 8
            )));
        }
        Ok(Self {
            round_keys: expand_key(key),
        })
    }
}

/// Three passes mixing the key words `L` into the magic-constant table `S`.
fn expand_key(key: &[u8]) -> [u32; SCHEDULE_LEN] {
    let mut l: Vec<u32> = key
        .chunks(4)
        .map(|chunk| {
            let mut word = [0u8; 4];
            word[..chunk.len()].copy_from_slice(chunk);
            u32::from_le_bytes(word)
        })
        .collect();

    let mut s = [0u32; SCHEDULE_LEN];
    s[0] = P32;
    for i in 1..SCHEDULE_LEN {
        s[i] = s[i - 1].wrapping_add(Q32);
    }

    let (mut a, mut b) = (0u32, 0u32);
    let (mut i, mut j) = (0usize, 0usize);
    for _ in 0..3 * SCHEDULE_LEN.max(l.len()) {
        a = s[i].wrapping_add(a).wrapping_add(b).rotate_left(3);
        s[i] = a;
        b = l[j].wrapping_add(a).wrapping_add(b).rotate_left(a.wrapping_add(b) & 31);
        l[j] = b;
        i = (i + 1) % SCHEDULE_LEN;
        j = (j + 1) % l.len();
    }

    l.zeroize();
    s
}

/// f(x) = (x * (2x + 1)) <<< lg w
#[inline]
fn quadratic(x: u32) -> u32 {
    x.wrapping_mul(x.wrapping_mul(2).wrapping_add(1))
        .rotate_left(LG_W)
}

impl BlockCipher for Rc6 {
    fn algorithm(&self) -> Algorithm {
        Algorithm::Rc6
    }

    fn block_size(&self) -> usize {
        BLOCK_SIZE
    }

    fn encrypt_block(&self, block: &mut [u8]) -> SymcryptResult<()> {
        check_block_len(block, BLOCK_SIZE)?;
        let s = &self.round_keys;
        let [mut a, mut b, mut c, mut d] = load_words(block);

        b = b.wrapping_add(s[0]);
        d = d.wrapping_add(s[1]);
        for i in 1..=ROUNDS {
            let t = quadratic(b);
            let u = quadratic(d);
            a = (a ^ t).rotate_left(u & 31).wrapping_add(s[2 * i]);
            c = (c ^ u).rotate_left(t & 31).wrapping_add(s[2 * i + 1]);
            (a, b, c, d) = (b, c, d, a);
        }
        a = a.wrapping_add(s[2 * ROUNDS + 2]);
        c = c.wrapping_add(s[2 * ROUNDS + 3]);

        store_words([a, b, c, d], block);
        Ok(())
    }

    fn decrypt_block(&self, block: &mut [u8]) -> SymcryptResult<()> {
        check_block_len(block, BLOCK_SIZE)?;
        let s = &self.round_keys;
        let [mut a, mut b, mut c, mut d] = load_words(block);

        c = c.wrapping_sub(s[2 * ROUNDS + 3]);
        a = a.wrapping_sub(s[2 * ROUNDS + 2]);
        for i in (1..=ROUNDS).rev() {
            (a, b, c, d) = (d, a, b, c);
            let u = quadratic(d);
            let t = quadratic(b);
            c = c.wrapping_sub(s[2 * i + 1]).rotate_right(t & 31) ^ u;
            a = a.wrapping_sub(s[2 * i]).rotate_right(u & 31) ^ t;
        }
        d = d.wrapping_sub(s[1]);
        b = b.wrapping_sub(s[0]);

        store_words([a, b, c, d], block);
        Ok(())
    }
}

impl Drop for Rc6 {
    fn drop(&mut self) {
        self.round_keys.zeroize();
    }
}

impl std::fmt::Debug for Rc6 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rc6")
            .field("round_keys", &"[REDACTED]")
            .finish()
    }
}
