use chrono::Local;
use num::Integer;
use num_bigint::{BigInt, RandBigInt};
use num_traits::{One, Signed, Zero};
use rand::Rng;
use tracing::debug;

use crate::ss::error::{Result, SsError};

/// Euclid's algorithm. Works on copies, the caller's values are untouched.
pub fn gcd(a: &BigInt, b: &BigInt) -> BigInt {
    let (mut a, mut b) = (a.clone(), b.clone());
    while !b.is_zero() {
        let t = &a % &b;
        a = b;
        b = t;
    }
    a
}

/// Inverse of `a` modulo `n` by the extended Euclidean algorithm.
///
/// Returns zero when `a` and `n` are not coprime, callers must treat that as
/// "no inverse" rather than as a value.
pub fn mod_inverse(a: &BigInt, n: &BigInt) -> BigInt {
    let (mut r, mut r1) = (n.clone(), a.clone());
    let (mut t, mut t1): (BigInt, BigInt) = (Zero::zero(), One::one());
    while !r1.is_zero() {
        let q = r.div_floor(&r1);
        let next_r = &r - &q * &r1;
        r = std::mem::replace(&mut r1, next_r);
        let next_t = &t - &q * &t1;
        t = std::mem::replace(&mut t1, next_t);
    }
    if r > BigInt::one() {
        return Zero::zero();
    }
    if t.is_negative() {
        t += n;
    }
    t
}

/// Square-and-multiply `a^d mod n`. `d` must not be negative.
pub fn pow_mod(a: &BigInt, d: &BigInt, n: &BigInt) -> BigInt {
    let mut v: BigInt = BigInt::one().mod_floor(n);
    let mut p = a.mod_floor(n);
    let mut d = d.clone();
    while d.is_positive() {
        if d.is_odd() {
            v = (&v * &p).mod_floor(n);
        }
        p = (&p * &p).mod_floor(n);
        d >>= 1;
    }
    v
}

/// Miller-Rabin with `iters` random witnesses drawn from `rng`.
pub fn is_prime<R: Rng + ?Sized>(n: &BigInt, iters: u64, rng: &mut R) -> bool {
    let two = BigInt::from(2);
    if *n == two || *n == BigInt::from(3) {
        return true;
    }
    if n.is_even() || *n < two {
        return false;
    }
    let n_minus_1: BigInt = n - 1u32;
    let mut r = n_minus_1.clone();
    let mut s: u64 = 0;
    while r.is_even() {
        r >>= 1;
        s += 1;
    }
    for _ in 0..iters {
        // witness in [2, n - 2]
        let a = rng.gen_bigint_range(&two, &n_minus_1);
        let mut y = pow_mod(&a, &r, n);
        if y.is_one() || y == n_minus_1 {
            continue;
        }
        let mut j = 1;
        while j < s && y != n_minus_1 {
            y = pow_mod(&y, &two, n);
            if y.is_one() {
                return false;
            }
            j += 1;
        }
        if y != n_minus_1 {
            return false;
        }
    }
    true
}

/// Samples `bits + 1` bit candidates until one passes [`is_prime`].
///
/// Candidates whose top bit is clear are thrown away. Gives up with
/// [`SsError::PrimeNotFound`] after `attempts` draws.
pub fn make_prime<R: Rng + ?Sized>(bits: u64, iters: u64, attempts: u64, rng: &mut R) -> Result<BigInt> {
    let start = Local::now().timestamp_millis();
    for try_times in 1..=attempts {
        let candidate = BigInt::from(rng.gen_biguint(bits + 1));
        if candidate.bits() < bits + 1 {
            continue;
        }
        if is_prime(&candidate, iters, rng) {
            debug!("Done generation of {}-bit prime in {} tries after {} ms",
                bits + 1, try_times, Local::now().timestamp_millis() - start);
            return Ok(candidate);
        }
    }
    debug!("Failed generation of {}-bit prime in {} tries after {} ms",
        bits + 1, attempts, Local::now().timestamp_millis() - start);
    Err(SsError::PrimeNotFound { bits: bits + 1, attempts })
}
