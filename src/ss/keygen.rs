use num::Integer;
use num_bigint::BigInt;
use num_traits::Zero;
use rand::Rng;
use tracing::{debug, info};

use crate::ss::error::{Result, SsError};
use crate::ss::keys::{KeyPair, PrivateKey, PublicKey};
use crate::ss::numtheory::{gcd, make_prime, mod_inverse};

/// Every value produced while generating one key pair. `p` and `q` live here
/// only long enough to be reported, they are never written out.
#[derive(Debug)]
pub struct KeyMaterial {
    pub p: BigInt,
    pub q: BigInt,
    pub n: BigInt,
    pub pq: BigInt,
    pub d: BigInt,
}

impl KeyMaterial {
    pub fn key_pair(&self, owner: String) -> KeyPair {
        KeyPair {
            public: PublicKey { n: self.n.clone(), owner },
            private: PrivateKey { pq: self.pq.clone(), d: self.d.clone() },
        }
    }
}

/// Picks primes `p`, `q` with `bits(p) + bits(p) + bits(q)` around `nbits`
/// and returns `(p, q, n = p * p * q)`.
///
/// A pair is redrawn while `p == q`, `q | p - 1` or `p | q - 1`, any of which
/// leaves `n` without an inverse modulo `lcm(p - 1, q - 1)` or breaks
/// decryption.
pub fn make_pub<R: Rng + ?Sized>(nbits: u64, iters: u64, attempts: u64, rng: &mut R) -> Result<(BigInt, BigInt, BigInt)> {
    if nbits < 5 {
        return Err(SsError::InvalidKeySize(nbits));
    }
    let p_bits = rng.gen_range(nbits / 5..2 * nbits / 5);
    let q_bits = nbits - 2 * p_bits;
    info!("Splitting {} bits: p {} bits, q {} bits", nbits, p_bits, q_bits);
    loop {
        let p = make_prime(p_bits, iters, attempts, rng)?;
        let q = make_prime(q_bits, iters, attempts, rng)?;
        let p_minus_1: BigInt = &p - 1u32;
        let q_minus_1: BigInt = &q - 1u32;
        if p == q || p_minus_1.is_multiple_of(&q) || q_minus_1.is_multiple_of(&p) {
            debug!("Rejected prime pair p = {}, q = {}", p, q);
            continue;
        }
        let n = &p * &p * &q;
        return Ok((p, q, n));
    }
}

/// Derives `(pq, d)` with `d = n^-1 mod lcm(p - 1, q - 1)`.
pub fn make_priv(p: &BigInt, q: &BigInt) -> Result<(BigInt, BigInt)> {
    let pq = p * q;
    let p_minus_1: BigInt = p - 1u32;
    let q_minus_1: BigInt = q - 1u32;
    let lambda = (&p_minus_1 * &q_minus_1) / gcd(&p_minus_1, &q_minus_1);
    let n = p * &pq;
    let d = mod_inverse(&n, &lambda);
    if d.is_zero() {
        return Err(SsError::NoInverse { a: n, n: lambda });
    }
    Ok((pq, d))
}

pub fn generate_key<R: Rng + ?Sized>(nbits: u64, iters: u64, attempts: u64, rng: &mut R) -> Result<KeyMaterial> {
    let (p, q, n) = make_pub(nbits, iters, attempts, rng)?;
    let (pq, d) = make_priv(&p, &q)?;
    info!("Generated {}-bit public key", n.bits());
    Ok(KeyMaterial { p, q, n, pq, d })
}

#[cfg(test)]
mod tests {
    use std::error::Error;
    use num::Integer;
    use num_bigint::BigInt;
    use num_traits::One;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use crate::ss::error::SsError;
    use crate::ss::numtheory::{gcd, is_prime, pow_mod};
    use super::{generate_key, make_priv, make_pub};

    #[test]
    fn test_make_pub() -> Result<(), Box<dyn Error>> {
        let mut rng = StdRng::seed_from_u64(42);
        let (p, q, n) = make_pub(256, 50, 1_000_000, &mut rng)?;
        assert_eq!(n, &p * &p * &q);
        assert!(is_prime(&p, 50, &mut rng) && is_prime(&q, 50, &mut rng));
        assert!((257..=259).contains(&n.bits()), "n has {} bits", n.bits());
        assert!(p != q);
        assert!(!(&p - 1u32).is_multiple_of(&q) && !(&q - 1u32).is_multiple_of(&p));
        Ok(())
    }

    #[test]
    fn test_make_pub_bits_split() -> Result<(), Box<dyn Error>> {
        for seed in 0..8 {
            let mut rng = StdRng::seed_from_u64(seed);
            let (p, q, _) = make_pub(100, 20, 1_000_000, &mut rng)?;
            // make_prime hands back one bit more than asked for
            let (p_bits, q_bits) = (p.bits() - 1, q.bits() - 1);
            assert!((20..40).contains(&p_bits), "p_bits = {}", p_bits);
            assert_eq!(2 * p_bits + q_bits, 100);
        }
        Ok(())
    }

    #[test]
    fn test_make_pub_rejects_weak_pairs() -> Result<(), Box<dyn Error>> {
        // 5 bits: p from {2, 3}, q from {11, 13}. p = 2 always divides q - 1
        // and 3 | 13 - 1, so (3, 11) is the only pair that may come back.
        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            let (p, q, n) = make_pub(5, 20, 10_000, &mut rng)?;
            assert!(p != q, "seed {}: p == q", seed);
            assert!(!(&p - 1u32).is_multiple_of(&q), "seed {}: {} | {} - 1", seed, q, p);
            assert!(!(&q - 1u32).is_multiple_of(&p), "seed {}: {} | {} - 1", seed, p, q);
            assert_eq!((p.clone(), q.clone(), n), (BigInt::from(3), BigInt::from(11), BigInt::from(99)));
            make_priv(&p, &q)?;
        }
        Ok(())
    }

    #[test]
    fn test_make_pub_too_small() {
        let mut rng = StdRng::seed_from_u64(0);
        assert!(matches!(make_pub(4, 10, 100, &mut rng), Err(SsError::InvalidKeySize(4))));
    }

    #[test]
    fn test_make_priv_simple_data() -> Result<(), Box<dyn Error>> {
        let (p, q) = (BigInt::from(11), BigInt::from(7));
        let (pq, d) = make_priv(&p, &q)?;
        assert_eq!(pq, BigInt::from(77));
        let lambda = BigInt::from(30);
        let n = BigInt::from(847);
        assert!((&n * &d % &lambda).is_one());
        for m in 0..77 {
            let m = BigInt::from(m);
            let c = pow_mod(&m, &n, &n);
            assert_eq!(pow_mod(&c, &d, &pq), m);
        }
        Ok(())
    }

    #[test]
    fn test_make_priv_no_inverse() {
        // 3 | 7 - 1, so gcd(7 * 7 * 3, lcm(6, 2)) = 3
        match make_priv(&BigInt::from(7), &BigInt::from(3)) {
            Err(SsError::NoInverse { a, n }) => {
                assert_eq!(a, BigInt::from(147));
                assert_eq!(n, BigInt::from(6));
                assert!(gcd(&a, &n) > BigInt::one());
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_generate_key() -> Result<(), Box<dyn Error>> {
        let mut rng = StdRng::seed_from_u64(5);
        let key = generate_key(128, 30, 1_000_000, &mut rng)?;
        assert_eq!(key.pq, &key.p * &key.q);
        assert_eq!(key.n, &key.p * &key.pq);
        let pair = key.key_pair("alice".to_string());
        assert_eq!(pair.public.n, key.n);
        assert_eq!(pair.public.owner, "alice");
        assert_eq!(pair.private.d, key.d);
        Ok(())
    }
}
