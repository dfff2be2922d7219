//! Probable-prime generation (trial division + Miller-Rabin)

use num_bigint::{BigUint, RandBigInt};
use num_traits::{One, Zero};
use rand::Rng;

const SIEVE_LIMIT: usize = 1000;
const SMALL_PRIME_COUNT: usize = 168;

/// Every prime below 1000
const SMALL_PRIMES: [u32; SMALL_PRIME_COUNT] = small_primes();

const fn small_primes() -> [u32; SMALL_PRIME_COUNT] {
    let mut composite = [false; SIEVE_LIMIT];
    let mut primes = [0u32; SMALL_PRIME_COUNT];
    let mut found = 0;
    let mut n = 2;
    while n < SIEVE_LIMIT {
        if !composite[n] {
            primes[found] = n as u32;
            found += 1;
            let mut multiple = n * n;
            while multiple < SIEVE_LIMIT {
                composite[multiple] = true;
                multiple += n;
            }
        }
        n += 1;
    }
    primes
}

/// Outcome of trial division by the small primes.
enum Sieve {
    Prime,
    Composite,
    Unknown,
}

fn trial_divide(n: &BigUint) -> Sieve {
    for &p in &SMALL_PRIMES {
        let p = BigUint::from(p);
        if *n == p {
            return Sieve::Prime;
        }
        if (n % &p).is_zero() {
            return Sieve::Composite;
        }
    }
    Sieve::Unknown
}

/// Miller-Rabin with `rounds` random bases after trial division. A composite
/// passes with probability at most 4^-rounds.
pub fn is_probable_prime<R: Rng + ?Sized>(n: &BigUint, rounds: u32, rng: &mut R) -> bool {
    if *n < BigUint::from(2u32) {
        return false;
    }
    match trial_divide(n) {
        Sieve::Prime => return true,
        Sieve::Composite => return false,
        Sieve::Unknown => {}
    }

    // n > 1000 from here, so [2, n-1) is a non-empty base range
    let one = BigUint::one();
    let two = BigUint::from(2u32);
    let n_minus_one = n - &one;
    let s = n_minus_one.trailing_zeros().unwrap_or(0);
    let d = &n_minus_one >> s;

    'witness: for _ in 0..rounds {
        let a = rng.gen_biguint_range(&two, &n_minus_one);
        let mut x = a.modpow(&d, n);
        if x == one || x == n_minus_one {
            continue;
        }
        for _ in 1..s {
            x = x.modpow(&two, n);
            if x == n_minus_one {
                continue 'witness;
            }
        }
        return false;
    }
    true
}

/// Random `bits`-bit odd candidate with the top bit set.
fn candidate<R: Rng + ?Sized>(bits: u64, rng: &mut R) -> BigUint {
    let mut n = rng.gen_biguint(bits);
    n |= BigUint::one() << (bits - 1);
    n |= BigUint::one();
    n
}

/// Probable prime of exactly `bits` bits. `bits` must be at least 2.
pub fn generate_prime<R: Rng + ?Sized>(bits: u64, rounds: u32, rng: &mut R) -> BigUint {
    debug_assert!(bits >= 2);
    loop {
        let n = candidate(bits, rng);
        if is_probable_prime(&n, rounds, rng) {
            return n;
        }
    }
}

/// Safe prime `p = 2q + 1` of exactly `bits` bits; returns `(p, q)`.
/// `bits` must be at least 3.
pub fn generate_safe_prime<R: Rng + ?Sized>(bits: u64, rounds: u32, rng: &mut R) -> (BigUint, BigUint) {
    debug_assert!(bits >= 3);
    loop {
        let q = candidate(bits - 1, rng);
        let p = (&q << 1u32) + 1u32;
        // cheap filters on both halves before any exponentiation
        if matches!(trial_divide(&q), Sieve::Composite) || matches!(trial_divide(&p), Sieve::Composite) {
            continue;
        }
        if is_probable_prime(&q, rounds, rng) && is_probable_prime(&p, rounds, rng) {
            return (p, q);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_small_prime_table() {
        assert_eq!(SMALL_PRIMES[0], 2);
        assert_eq!(SMALL_PRIMES[1], 3);
        assert_eq!(SMALL_PRIMES[SMALL_PRIME_COUNT - 1], 997);
    }

    #[test]
    fn test_known_primes_and_composites() {
        let mut rng = StdRng::seed_from_u64(1);
        for p in [2u64, 3, 5, 997, 1009, 7919, 104_729, 2_147_483_647] {
            assert!(is_probable_prime(&BigUint::from(p), 16, &mut rng), "{p}");
        }
        // 561 and 41041 are Carmichael numbers
        for c in [0u64, 1, 4, 561, 1_000_001, 41_041, 2_147_483_649] {
            assert!(!is_probable_prime(&BigUint::from(c), 16, &mut rng), "{c}");
        }
    }

    #[test]
    fn test_mersenne_127() {
        let mut rng = StdRng::seed_from_u64(2);
        let m127 = (BigUint::one() << 127u32) - 1u32;
        assert!(is_probable_prime(&m127, 16, &mut rng));
        let m127_squared = &m127 * &m127;
        assert!(!is_probable_prime(&m127_squared, 16, &mut rng));
    }

    #[test]
    fn test_generated_prime_has_requested_size() {
        let mut rng = StdRng::seed_from_u64(3);
        for bits in [16u64, 64, 128] {
            let p = generate_prime(bits, 16, &mut rng);
            assert_eq!(p.bits(), bits);
        }
    }

    #[test]
    fn test_safe_prime_structure() {
        let mut rng = StdRng::seed_from_u64(4);
        let (p, q) = generate_safe_prime(64, 16, &mut rng);
        assert_eq!(p.bits(), 64);
        assert_eq!(p, (&q << 1u32) + 1u32);
        assert!(is_probable_prime(&q, 16, &mut rng));
    }
}
