use chrono::Local;
use lazy_static::lazy_static;
use mut_static::MutStatic;
use crate::SS;

/// Candidates `make_prime` draws before giving up.
pub const MAX_PRIME_ATTEMPTS: u64 = 1_000_000;
/// Random blocks pushed through a key pair in test mode.
pub const TEST_BLOCKS: u64 = 64;
/// Random plaintext size for test mode when reading from stdin.
pub const TEST_BYTES: usize = 4096;

lazy_static! {
    pub static ref CONFIG_DEF: SS = SS {
        mode: String::from("generate"),
        key: String::from("ss"),
        user: std::env::var("USER").unwrap_or_else(|_| String::from("nobody")),
        input: String::from("stdin"),
        output: String::from("stdout"),
        bits: 256,
        iters: 50,
        seed: Local::now().timestamp() as u64,
        attempts: MAX_PRIME_ATTEMPTS,
        verbose: false,
        silent: false,
    };
    pub static ref SILENT: MutStatic<bool> =
        MutStatic::new();
}

/// Unset counts as silent, so library callers and tests get no progress bars.
pub fn silent() -> bool {
    SILENT.read().map(|s| *s).unwrap_or(true)
}
