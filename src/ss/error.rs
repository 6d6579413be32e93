use std::io;
use num_bigint::BigInt;

#[derive(Debug, thiserror::Error)]
pub enum SsError {
    #[error("Malformed hexadecimal number: {0:?}")]
    MalformedNumber(String),

    #[error("{a} has no inverse modulo {n}")]
    NoInverse { a: BigInt, n: BigInt },

    #[error("Could not find a {bits}-bit prime in {attempts} attempts")]
    PrimeNotFound { bits: u64, attempts: u64 },

    #[error("Invalid key size: {0} bits, need at least 5")]
    InvalidKeySize(u64),

    #[error("Modulus too small for block encoding: {0} bytes per block")]
    BlockTooSmall(usize),

    #[error("Decrypted block does not start with the 0xFF marker")]
    MissingMarker,

    #[error("Decrypted block of {len} bytes exceeds capacity {capacity}")]
    BlockOverflow { len: usize, capacity: usize },

    #[error("Unable to allocate a {0} byte block")]
    Allocation(usize),

    #[error("Key pair check failed: {0}")]
    KeyMismatch(String),

    #[error("Bad key file: {0}")]
    KeyFormat(String),

    #[error("Unknown run mode {0:?}! available: generate(default), encrypt, decrypt, test")]
    UnknownMode(String),

    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, SsError>;
