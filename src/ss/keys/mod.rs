pub mod key_writer;
pub mod key_reader;
pub mod key_pair;

pub use key_pair::*;

use num_bigint::BigInt;

/// Public half: `n = p * p * q`, used as both modulus and exponent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKey {
    pub n: BigInt,
    pub owner: String,
}

/// Private half: modulus `pq = p * q` and exponent `d`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrivateKey {
    pub pq: BigInt,
    pub d: BigInt,
}

pub fn describe(name: &str, x: &BigInt) -> String {
    format!("{} ({} bits) = {}", name, x.bits(), x)
}

impl PublicKey {
    pub fn info(&self) {
        eprintln!("user = {}", self.owner);
        eprintln!("{}", describe("n", &self.n));
    }
}

impl PrivateKey {
    pub fn info(&self) {
        eprintln!("{}", describe("pq", &self.pq));
        eprintln!("{}", describe("d ", &self.d));
    }
}
