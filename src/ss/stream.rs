use std::io::{BufRead, Read, Write};
use indicatif::{ProgressBar, ProgressStyle};
use num_bigint::BigInt;
use tracing::info;

use crate::ss::codec::{decode_block, decrypt_capacity, encode_block, encrypt_capacity, read_record, write_record};
use crate::ss::config::silent;
use crate::ss::error::{Result, SsError};
use crate::ss::numtheory::pow_mod;

/// `c = m^n mod n`, the public key is modulus and exponent at once.
pub fn encrypt(m: &BigInt, n: &BigInt) -> BigInt {
    pow_mod(m, n, n)
}

pub fn decrypt(c: &BigInt, d: &BigInt, pq: &BigInt) -> BigInt {
    pow_mod(c, d, pq)
}

/// Fills `buf` with up to `bytes` bytes. A short count means the stream ended.
pub fn read_source<R: Read + ?Sized>(reader: &mut R, buf: &mut Vec<u8>, bytes: usize) -> Result<usize> {
    buf.clear();
    (&mut *reader).take(bytes as u64).read_to_end(buf)?;
    Ok(buf.len())
}

fn alloc_block(bytes: usize) -> Result<Vec<u8>> {
    let mut block = Vec::new();
    block.try_reserve_exact(bytes).map_err(|_| SsError::Allocation(bytes))?;
    Ok(block)
}

fn progress(action: &str) -> ProgressBar {
    if silent() {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner()
        .template("{spinner:.green} [{elapsed_precise}] {msg} {bytes} ({bytes_per_sec})")
        .unwrap_or_else(|_| ProgressStyle::default_spinner()));
    pb.set_message(action.to_string());
    pb
}

/// Encrypts `reader` into hex records on `writer`, `k - 1` plaintext bytes
/// per record where `k` is [`encrypt_capacity`] of `n`.
pub fn encrypt_file<R: Read + ?Sized, W: Write + ?Sized>(reader: &mut R, writer: &mut W, n: &BigInt) -> Result<()> {
    let k = encrypt_capacity(n);
    if k < 2 {
        return Err(SsError::BlockTooSmall(k));
    }
    let mut source = alloc_block(k - 1)?;
    let pb = progress("encrypting");
    let (mut blocks, mut total) = (0u64, 0u64);
    loop {
        let read = read_source(reader, &mut source, k - 1)?;
        if read == 0 {
            break;
        }
        write_record(writer, &encrypt(&encode_block(&source), n))?;
        blocks += 1;
        total += read as u64;
        pb.inc(read as u64);
    }
    writer.flush()?;
    pb.finish_and_clear();
    info!("Encrypted {} bytes into {} blocks, block size {}", total, blocks, k);
    Ok(())
}

/// Inverse of [`encrypt_file`]: one record per line in, marker-stripped
/// plaintext out.
pub fn decrypt_file<R: BufRead + ?Sized, W: Write + ?Sized>(reader: &mut R, writer: &mut W, d: &BigInt, pq: &BigInt) -> Result<()> {
    let k = decrypt_capacity(pq);
    if k < 2 {
        return Err(SsError::BlockTooSmall(k));
    }
    let mut block = alloc_block(k)?;
    let pb = progress("decrypting");
    let (mut blocks, mut total) = (0u64, 0u64);
    while let Some(c) = read_record(reader)? {
        decode_block(&decrypt(&c, d, pq), k, &mut block)?;
        writer.write_all(&block)?;
        blocks += 1;
        total += block.len() as u64;
        pb.inc(block.len() as u64);
    }
    writer.flush()?;
    pb.finish_and_clear();
    info!("Decrypted {} blocks into {} bytes", blocks, total);
    Ok(())
}
