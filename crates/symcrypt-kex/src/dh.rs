//! Diffie-Hellman over a safe-prime group
//!
//! Domain parameters are a safe prime `p = 2q + 1` and a generator `g` of the
//! full multiplicative group. Each party draws a private exponent, publishes
//! `g^x mod p`, and derives the shared key from the peer's public value.
//!
//! Shared key bytes: `peer^x mod p`, big-endian at the byte width of `p`
//! (leading zeros kept), truncated to the first `key_bits / 8` bytes.

use num_bigint::{BigUint, RandBigInt};
use num_traits::One;
use rand::{CryptoRng, Rng};
use symcrypt_core::{KexConfig, SymcryptError, SymcryptResult};
use tracing::{debug, info};
use zeroize::Zeroize;

use crate::prime::{generate_safe_prime, is_probable_prime};

/// Smallest modulus `generate_parameters` will produce
pub const MIN_PRIME_BITS: u64 = 16;

/// Shared group parameters `(p, g)`
#[derive(Clone, PartialEq, Eq)]
pub struct DhParams {
    p: BigUint,
    g: BigUint,
}

impl DhParams {
    /// Accept externally supplied parameters. `p` must be an odd prime of at
    /// least [`MIN_PRIME_BITS`] bits and `g` must lie in `[2, p - 2]`.
    /// Primality is checked with the default [`KexConfig`] round count.
    pub fn new(p: BigUint, g: BigUint) -> SymcryptResult<Self> {
        let rounds = KexConfig::default().miller_rabin_rounds;
        Self::new_with_rng(p, g, rounds, &mut rand::thread_rng())
    }

    /// [`DhParams::new`] with `rounds` Miller-Rabin rounds drawn from `rng`.
    pub fn new_with_rng<R: Rng + ?Sized>(
        p: BigUint,
        g: BigUint,
        rounds: u32,
        rng: &mut R,
    ) -> SymcryptResult<Self> {
        if p.bits() < MIN_PRIME_BITS {
            return Err(SymcryptError::KeyExchange(format!(
                "modulus has {} bits, need at least {MIN_PRIME_BITS}",
                p.bits()
            )));
        }
        if !is_probable_prime(&p, rounds, rng) {
            return Err(SymcryptError::KeyExchange("modulus is not prime".into()));
        }
        if !in_open_group(&g, &p) {
            return Err(SymcryptError::KeyExchange(
                "generator must lie in [2, p - 2]".into(),
            ));
        }
        Ok(Self { p, g })
    }

    /// Parse big-endian unsigned byte strings as they travel in messages.
    pub fn from_bytes_be(p: &[u8], g: &[u8]) -> SymcryptResult<Self> {
        Self::new(BigUint::from_bytes_be(p), BigUint::from_bytes_be(g))
    }

    /// Generate a fresh `bits`-bit safe prime and its smallest full-order
    /// generator, using `rounds` Miller-Rabin rounds per test.
    pub fn generate_with_rng<R: Rng + ?Sized>(bits: u64, rounds: u32, rng: &mut R) -> SymcryptResult<Self> {
        if bits < MIN_PRIME_BITS {
            return Err(SymcryptError::KeyExchange(format!(
                "requested {bits}-bit modulus, need at least {MIN_PRIME_BITS}"
            )));
        }
        let (p, q) = generate_safe_prime(bits, rounds, rng);
        let g = full_order_generator(&p, &q);
        info!(bits, generator = %g, "generated Diffie-Hellman parameters");
        Ok(Self { p, g })
    }

    /// Generate parameters sized by `config`.
    pub fn generate(config: &KexConfig) -> SymcryptResult<Self> {
        Self::generate_with_rng(
            config.prime_bits,
            config.miller_rabin_rounds,
            &mut rand::thread_rng(),
        )
    }

    pub fn p(&self) -> &BigUint {
        &self.p
    }

    pub fn g(&self) -> &BigUint {
        &self.g
    }

    pub fn p_bytes(&self) -> Vec<u8> {
        self.p.to_bytes_be()
    }

    pub fn g_bytes(&self) -> Vec<u8> {
        self.g.to_bytes_be()
    }

    /// Byte width of the modulus
    pub fn byte_len(&self) -> usize {
        byte_width(&self.p)
    }
}

impl std::fmt::Debug for DhParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DhParams")
            .field("p_bits", &self.p.bits())
            .field("g", &self.g)
            .finish()
    }
}

/// For a safe prime the group order is `2q`, so any `g` with `g^q != 1`
/// (and `g != p - 1`) has order `2q`.
fn full_order_generator(p: &BigUint, q: &BigUint) -> BigUint {
    let one = BigUint::one();
    let mut g = BigUint::from(2u32);
    while g.modpow(q, p) == one {
        g += 1u32;
    }
    g
}

fn in_open_group(x: &BigUint, p: &BigUint) -> bool {
    let two = BigUint::from(2u32);
    *x >= two && *p > two && *x <= p - &two
}

fn byte_width(n: &BigUint) -> usize {
    (n.bits() as usize + 7) / 8
}

/// Generate domain parameters with a `bits`-bit safe prime.
pub fn generate_parameters(bits: u64) -> SymcryptResult<DhParams> {
    DhParams::generate_with_rng(
        bits,
        KexConfig::default().miller_rabin_rounds,
        &mut rand::thread_rng(),
    )
}

/// A private exponent. Its byte form is wiped on drop and never printed.
#[derive(Clone)]
pub struct PrivateKey {
    bytes: Vec<u8>,
}

impl PrivateKey {
    pub fn from_bytes_be(bytes: &[u8]) -> SymcryptResult<Self> {
        if BigUint::from_bytes_be(bytes) < BigUint::from(2u32) {
            return Err(SymcryptError::KeyExchange(
                "private exponent must be at least 2".into(),
            ));
        }
        Ok(Self {
            bytes: bytes.to_vec(),
        })
    }

    /// Draw a uniformly random exponent in `[2, 2^bits)`.
    pub fn generate_with_rng<R: Rng + CryptoRng + ?Sized>(bits: u64, rng: &mut R) -> SymcryptResult<Self> {
        if bits < 2 {
            return Err(SymcryptError::KeyExchange(format!(
                "private exponent needs at least 2 bits, got {bits}"
            )));
        }
        let two = BigUint::from(2u32);
        let upper = BigUint::one() << bits;
        let exponent = rng.gen_biguint_range(&two, &upper);
        Ok(Self {
            bytes: exponent.to_bytes_be(),
        })
    }

    pub(crate) fn exponent(&self) -> BigUint {
        BigUint::from_bytes_be(&self.bytes)
    }

    pub fn bits(&self) -> u64 {
        self.exponent().bits()
    }
}

impl Drop for PrivateKey {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}

impl std::fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrivateKey")
            .field("exponent", &"[REDACTED]")
            .finish()
    }
}

/// Generate a private exponent of at most `bits` bits.
pub fn generate_private_key(bits: u64) -> SymcryptResult<PrivateKey> {
    PrivateKey::generate_with_rng(bits, &mut rand::thread_rng())
}

/// `g^private mod p`
pub fn generate_public_key(private_key: &PrivateKey, params: &DhParams) -> BigUint {
    params.g.modpow(&private_key.exponent(), &params.p)
}

/// Symmetric key material agreed through Diffie-Hellman. Wiped on drop.
pub struct SharedKey {
    bytes: Vec<u8>,
}

impl SharedKey {
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl Drop for SharedKey {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}

impl std::fmt::Debug for SharedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedKey")
            .field("len", &self.bytes.len())
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

/// Derive `key_bits / 8` bytes of shared key from the peer's public value.
///
/// Fails with `KeyExchange` if the peer value is outside `[2, p - 2]`, if
/// `key_bits` is not a positive multiple of 8, or if `p` is narrower than
/// the requested key.
pub fn derive_shared_key(
    peer_public_key: &BigUint,
    private_key: &PrivateKey,
    p: &BigUint,
    key_bits: u32,
) -> SymcryptResult<SharedKey> {
    if key_bits == 0 || key_bits % 8 != 0 {
        return Err(SymcryptError::KeyExchange(format!(
            "key size must be a positive multiple of 8 bits, got {key_bits}"
        )));
    }
    if !in_open_group(peer_public_key, p) {
        return Err(SymcryptError::KeyExchange(
            "peer public key must lie in [2, p - 2]".into(),
        ));
    }
    let key_len = key_bits as usize / 8;
    let width = byte_width(p);
    if width < key_len {
        return Err(SymcryptError::KeyExchange(format!(
            "{}-bit modulus cannot supply a {key_bits}-bit key",
            p.bits()
        )));
    }

    let secret = peer_public_key.modpow(&private_key.exponent(), p);
    let mut encoded = secret.to_bytes_be();
    let mut full = vec![0u8; width - encoded.len()];
    full.extend_from_slice(&encoded);
    encoded.zeroize();

    let bytes = full[..key_len].to_vec();
    full.zeroize();
    debug!(key_bits, modulus_bits = p.bits(), "derived shared key");
    Ok(SharedKey { bytes })
}

/// One participant's half of an exchange: parameters plus own key pair.
#[derive(Debug)]
pub struct KeyExchange {
    params: DhParams,
    private_key: PrivateKey,
    public_key: BigUint,
}

impl KeyExchange {
    /// Draw a private exponent sized by `config` and compute the public value.
    pub fn new(params: DhParams, config: &KexConfig) -> SymcryptResult<Self> {
        let private_key = PrivateKey::generate_with_rng(config.private_key_bits, &mut rand::thread_rng())?;
        Ok(Self::with_private_key(params, private_key))
    }

    pub fn with_private_key(params: DhParams, private_key: PrivateKey) -> Self {
        let public_key = generate_public_key(&private_key, &params);
        Self {
            params,
            private_key,
            public_key,
        }
    }

    pub fn params(&self) -> &DhParams {
        &self.params
    }

    pub fn private_key(&self) -> &PrivateKey {
        &self.private_key
    }

    pub fn public_key(&self) -> &BigUint {
        &self.public_key
    }

    pub fn public_key_bytes(&self) -> Vec<u8> {
        self.public_key.to_bytes_be()
    }

    pub fn shared_key(&self, peer_public_key: &BigUint, key_bits: u32) -> SymcryptResult<SharedKey> {
        derive_shared_key(peer_public_key, &self.private_key, &self.params.p, key_bits)
    }
}
