//! Serpent (32 rounds, bitslice form)
//!
//! Follows the bitslice description from the AES submission: the block is
//! four little-endian words, bit `i` of the four words forms the nibble fed to
//! the round's S-box, and every round but the last ends with the linear
//! transform. Keys shorter than 256 bits are padded with a single 1 bit.

use symcrypt_core::{Algorithm, SymcryptError, SymcryptResult};
use zeroize::Zeroize;

use super::{check_block_len, load_words, store_words, BlockCipher};
use crate::BLOCK_SIZE;

const ROUNDS: usize = 32;
const PHI: u32 = 0x9E37_79B9;

type Words = [u32; 4];

const SBOX: [[u8; 16]; 8] = [
    [3, 8, 15, 1, 10, 6, 5, 11, 14, 13, 4, 2, 7, 0, 9, 12],
    [15, 12, 2, 7, 9, 0, 5, 10, 1, 11, 14, 8, 6, 13, 3, 4],
    [8, 6, 7, 9, 3, 12, 10, 15, 13, 1, 14, 4, 0, 11, 5, 2],
    [0, 15, 11, 8, 12, 9, 6, 3, 13, 1, 2, 4, 10, 7, 5, 14],
    [1, 15, 8, 3, 12, 0, 11, 6, 2, 5, 4, 10, 9, 14, 7, 13],
    [15, 5, 2, 11, 4, 10, 9, 12, 0, 3, 14, 8, 13, 6, 7, 1],
    [7, 2, 12, 5, 8, 4, 6, 11, 14, 9, 1, 15, 13, 3, 10, 0],
    [1, 13, 15, 0, 14, 8, 2, 11, 7, 4, 12, 10, 9, 3, 5, 6],
];

const SBOX_INV: [[u8; 16]; 8] = invert_sboxes(&SBOX);

const fn invert_sboxes(boxes: &[[u8; 16]; 8]) -> [[u8; 16]; 8] {
    let mut inv = [[0u8; 16]; 8];
    let mut b = 0;
    while b < 8 {
        let mut i = 0;
        while i < 16 {
            inv[b][boxes[b][i] as usize] = i as u8;
            i += 1;
        }
        b += 1;
    }
    inv
}

/// Serpent with 128- to 256-bit keys. Subkeys are zeroized on drop.
pub struct Serpent {
    subkeys: [Words; ROUNDS + 1],
}

impl Serpent {
    /// Accepts any key from 8 to 256 bits in whole bytes.
    pub fn new(key: &[u8]) -> SymcryptResult<Self> {
        if key.is_empty() || key.len() > 32 {
            return Err(SymcryptError::Config(format!(
                "Serpent key must be 8 to 256 bits, got {} bits",
                key.len() * 8
            )));
        }
        Ok(Self {
            subkeys: key_schedule(key),
        })
    }
}

fn key_schedule(key: &[u8]) -> [Words; ROUNDS + 1] {
    let mut padded = [0u8; 32];
    padded[..key.len()].copy_from_slice(key);
    if key.len() < 32 {
        padded[key.len()] = 0x01;
    }

    // w[-8..-1] followed by the 132 prekey words
    let mut w = [0u32; 8 + 4 * (ROUNDS + 1)];
    for (word, bytes) in w.iter_mut().zip(padded.chunks_exact(4)) {
        *word = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
    }
    for i in 0..4 * (ROUNDS + 1) {
        let slot = i + 8;
        w[slot] = (w[slot - 8] ^ w[slot - 5] ^ w[slot - 3] ^ w[slot - 1] ^ PHI ^ i as u32)
            .rotate_left(11);
    }

    let mut subkeys = [[0u32; 4]; ROUNDS + 1];
    for (i, subkey) in subkeys.iter_mut().enumerate() {
        let base = 8 + 4 * i;
        let prekey = [w[base], w[base + 1], w[base + 2], w[base + 3]];
        // K0 uses S3, K1 uses S2, ... descending
        *subkey = substitute(&SBOX[(ROUNDS + 3 - i) % 8], prekey);
    }

    padded.zeroize();
    w.zeroize();
    subkeys
}

/// Apply a 4-bit S-box across the 32 bit-slices of the block.
fn substitute(sbox: &[u8; 16], x: Words) -> Words {
    let mut out = [0u32; 4];
    for bit in 0..32 {
        let nibble = ((x[0] >> bit) & 1)
            | ((x[1] >> bit) & 1) << 1
            | ((x[2] >> bit) & 1) << 2
            | ((x[3] >> bit) & 1) << 3;
        let s = u32::from(sbox[nibble as usize]);
        for (lane, word) in out.iter_mut().enumerate() {
            *word |= ((s >> lane) & 1) << bit;
        }
    }
    out
}

fn linear_transform([mut x0, mut x1, mut x2, mut x3]: Words) -> Words {
    x0 = x0.rotate_left(13);
    x2 = x2.rotate_left(3);
    x1 ^= x0 ^ x2;
    x3 ^= x2 ^ (x0 << 3);
    x1 = x1.rotate_left(1);
    x3 = x3.rotate_left(7);
    x0 ^= x1 ^ x3;
    x2 ^= x3 ^ (x1 << 7);
    x0 = x0.rotate_left(5);
    x2 = x2.rotate_left(22);
    [x0, x1, x2, x3]
}

fn inverse_linear_transform([mut x0, mut x1, mut x2, mut x3]: Words) -> Words {
    x2 = x2.rotate_right(22);
    x0 = x0.rotate_right(5);
    x2 ^= x3 ^ (x1 << 7);
    x0 ^= x1 ^ x3;
    x3 = x3.rotate_right(7);
    x1 = x1.rotate_right(1);
    x3 ^= x2 ^ (x0 << 3);
    x1 ^= x0 ^ x2;
    x2 = x2.rotate_right(3);
    x0 = x0.rotate_right(13);
    [x0, x1, x2, x3]
}

#[inline]
fn mix_key(x: Words, k: &Words) -> Words {
    [x[0] ^ k[0], x[1] ^ k[1], x[2] ^ k[2], x[3] ^ k[3]]
}

impl BlockCipher for Serpent {
    fn algorithm(&self) -> Algorithm {
        Algorithm::Serpent
    }

    fn block_size(&self) -> usize {
        BLOCK_SIZE
    }

    fn encrypt_block(&self, block: &mut [u8]) -> SymcryptResult<()> {
        check_block_len(block, BLOCK_SIZE)?;
        let mut x = load_words(block);

        for round in 0..ROUNDS {
            x = substitute(&SBOX[round % 8], mix_key(x, &self.subkeys[round]));
            x = if round == ROUNDS - 1 {
                mix_key(x, &self.subkeys[ROUNDS])
            } else {
                linear_transform(x)
            };
        }

        store_words(x, block);
        Ok(())
    }

    fn decrypt_block(&self, block: &mut [u8]) -> SymcryptResult<()> {
        check_block_len(block, BLOCK_SIZE)?;
        let mut x = mix_key(load_words(block), &self.subkeys[ROUNDS]);

        for round in (0..ROUNDS).rev() {
            if round != ROUNDS - 1 {
                x = inverse_linear_transform(x);
            }
            x = mix_key(substitute(&SBOX_INV[round % 8], x), &self.subkeys[round]);
        }

        store_words(x, block);
        Ok(())
    }
}

impl Drop for Serpent {
    fn drop(&mut self) {
        self.subkeys.zeroize();
    }
}

impl std::fmt::Debug for Serpent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Serpent")
            .field("subkeys", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn encrypt_hex(key: &str, plaintext: &str) -> String {
        let cipher = Serpent::new(&hex::decode(key).unwrap()).unwrap();
        let mut block = hex::decode(plaintext).unwrap();
        cipher.encrypt_block(&mut block).unwrap();
        hex::encode(block)
    }

    #[test]
    fn test_nessie_set1_vector0() {
        assert_eq!(
            encrypt_hex(
                "80000000000000000000000000000000",
                "00000000000000000000000000000000"
            ),
            "264e5481eff42a4606abda06c0bfda3d"
        );
    }

    #[test]
    fn test_zero_key_zero_block() {
        assert_eq!(
            encrypt_hex(
                "00000000000000000000000000000000",
                "00000000000000000000000000000000"
            ),
            "3620b17ae6a993d09618b8768266bae9"
        );
    }

    #[test]
    fn test_inverse_sboxes() {
        for (sbox, inv) in SBOX.iter().zip(SBOX_INV.iter()) {
            for n in 0..16u8 {
                assert_eq!(inv[sbox[n as usize] as usize], n);
            }
        }
    }

    #[test]
    fn test_linear_transform_inverts() {
        let x = [0xDEAD_BEEF, 0x0123_4567, 0x89AB_CDEF, 0xFEDC_BA98];
        assert_eq!(inverse_linear_transform(linear_transform(x)), x);
    }

    #[test]
    fn test_short_and_long_keys() {
        assert!(Serpent::new(&[1u8; 16]).is_ok());
        assert!(Serpent::new(&[1u8; 24]).is_ok());
        assert!(Serpent::new(&[1u8; 32]).is_ok());
        assert!(matches!(Serpent::new(&[]), Err(SymcryptError::Config(_))));
        assert!(Serpent::new(&[1u8; 33]).is_err());
    }

    #[test]
    fn test_key_padding_distinguishes_lengths() {
        // A 16-byte key and the same key extended with zeros must differ:
        // only the short key receives the trailing 1 bit.
        let short = Serpent::new(&[9u8; 16]).unwrap();
        let mut long_key = [0u8; 32];
        long_key[..16].copy_from_slice(&[9u8; 16]);
        let long = Serpent::new(&long_key).unwrap();

        let mut a = [0u8; 16];
        let mut b = [0u8; 16];
        short.encrypt_block(&mut a).unwrap();
        long.encrypt_block(&mut b).unwrap();
        assert_ne!(a, b);
    }

    proptest! {
        #[test]
        fn roundtrip(key in proptest::collection::vec(any::<u8>(), 16..=32),
                     block in proptest::array::uniform16(any::<u8>())) {
            let cipher = Serpent::new(&key).unwrap();
            let mut buf = block;
            cipher.encrypt_block(&mut buf).unwrap();
            cipher.decrypt_block(&mut buf).unwrap();
            prop_assert_eq!(buf, block);
        }
    }
}
