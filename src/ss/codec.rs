//! Block and record encodings shared by the stream and key file code.
//!
//! A block is the plaintext payload with [`MARKER`] in front, read as a
//! big-endian unsigned integer. The marker keeps leading zero bytes of the
//! payload alive through the integer round trip. A record is one integer in
//! uppercase hexadecimal followed by `\n`.

use std::io::{BufRead, Write};
use num_bigint::{BigInt, Sign};

use crate::ss::error::{Result, SsError};

pub const MARKER: u8 = 0xFF;

/// Block size in bytes (marker included) for encrypting under public `n`.
pub fn encrypt_capacity(n: &BigInt) -> usize {
    (n.sqrt().bits().saturating_sub(1) / 8) as usize
}

/// Block size in bytes (marker included) for decrypting under private `pq`.
pub fn decrypt_capacity(pq: &BigInt) -> usize {
    (pq.bits().saturating_sub(1) / 8) as usize
}

pub fn encode_block(payload: &[u8]) -> BigInt {
    let mut block = Vec::with_capacity(payload.len() + 1);
    block.push(MARKER);
    block.extend_from_slice(payload);
    BigInt::from_bytes_be(Sign::Plus, &block)
}

/// Exports `m` into `payload` with the marker byte stripped, checking the
/// block fits `capacity`. `payload` is overwritten, not appended to.
pub fn decode_block(m: &BigInt, capacity: usize, payload: &mut Vec<u8>) -> Result<()> {
    let (_, block) = m.to_bytes_be();
    if block.len() > capacity {
        return Err(SsError::BlockOverflow { len: block.len(), capacity });
    }
    if block.first() != Some(&MARKER) {
        return Err(SsError::MissingMarker);
    }
    payload.clear();
    payload.extend_from_slice(&block[1..]);
    Ok(())
}

pub fn to_hex(x: &BigInt) -> String {
    format!("{:X}", x)
}

/// Strict hexadecimal parse: surrounding whitespace is dropped, anything but
/// hex digits (signs, `0x`, separators) is rejected.
pub fn parse_hex(s: &str) -> Result<BigInt> {
    let digits = s.trim();
    if digits.is_empty() || !digits.bytes().all(|c| c.is_ascii_hexdigit()) {
        return Err(SsError::MalformedNumber(digits.to_string()));
    }
    BigInt::parse_bytes(digits.as_bytes(), 16)
        .ok_or_else(|| SsError::MalformedNumber(digits.to_string()))
}

pub fn write_record<W: Write + ?Sized>(writer: &mut W, x: &BigInt) -> Result<()> {
    writeln!(writer, "{}", to_hex(x))?;
    Ok(())
}

/// Next record from `reader`, `None` once the stream is exhausted. Blank
/// lines are skipped.
pub fn read_record<R: BufRead + ?Sized>(reader: &mut R) -> Result<Option<BigInt>> {
    let mut line = Vec::new();
    loop {
        line.clear();
        if reader.read_until(b'\n', &mut line)? == 0 {
            return Ok(None);
        }
        let text = std::str::from_utf8(&line)
            .map_err(|_| SsError::MalformedNumber(String::from_utf8_lossy(&line).trim().to_string()))?;
        if !text.trim().is_empty() {
            return parse_hex(text).map(Some);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error;
    use std::io::Cursor;
    use num_bigint::BigInt;
    use crate::ss::error::SsError;
    use super::{decode_block, decrypt_capacity, encode_block, encrypt_capacity, parse_hex, read_record, to_hex, write_record};

    #[test]
    fn test_capacity() {
        // isqrt(2^64) = 2^32, 33 bits
        let n = BigInt::from(1u128 << 64);
        assert_eq!(encrypt_capacity(&n), 4);
        assert_eq!(decrypt_capacity(&BigInt::from(0x1_0000u32)), 2);
        assert_eq!(decrypt_capacity(&BigInt::from(0xffffu32)), 1);
        assert_eq!(encrypt_capacity(&BigInt::from(0)), 0);
    }

    #[test]
    fn test_block_keeps_leading_zeros() -> Result<(), Box<dyn Error>> {
        let payload = [0u8, 0, 7, 0];
        let m = encode_block(&payload);
        assert_eq!(m.to_bytes_be().1, vec![0xff, 0, 0, 7, 0]);
        let mut out = vec![9u8; 8];
        decode_block(&m, 5, &mut out)?;
        assert_eq!(out, payload.to_vec());
        let empty = encode_block(&[]);
        assert_eq!(empty, BigInt::from(0xff));
        decode_block(&empty, 1, &mut out)?;
        assert!(out.is_empty());
        Ok(())
    }

    #[test]
    fn test_block_rejects_bad_input() {
        let mut out = Vec::new();
        assert!(matches!(decode_block(&BigInt::from(0x7f01), 4, &mut out), Err(SsError::MissingMarker)));
        assert!(matches!(decode_block(&BigInt::from(0), 4, &mut out), Err(SsError::MissingMarker)));
        assert!(matches!(
            decode_block(&encode_block(&[1, 2, 3]), 3, &mut out),
            Err(SsError::BlockOverflow { len: 4, capacity: 3 })
        ));
    }

    #[test]
    fn test_hex() -> Result<(), Box<dyn Error>> {
        let x = BigInt::from(0xdeadbeefu32);
        assert_eq!(to_hex(&x), "DEADBEEF");
        assert_eq!(parse_hex("DEADBEEF\n")?, x);
        assert_eq!(parse_hex("deadbeef")?, x);
        assert_eq!(to_hex(&BigInt::from(0)), "0");
        for bad in ["", "  \n", "0x1F", "-1F", "12G4", "1_0"] {
            assert!(matches!(parse_hex(bad), Err(SsError::MalformedNumber(_))), "{:?}", bad);
        }
        Ok(())
    }

    #[test]
    fn test_records() -> Result<(), Box<dyn Error>> {
        let mut buf = Vec::new();
        write_record(&mut buf, &BigInt::from(255))?;
        write_record(&mut buf, &BigInt::from(4096))?;
        assert_eq!(buf, b"FF\n1000\n");
        buf.extend_from_slice(b"\n\nA");
        let mut reader = Cursor::new(buf);
        assert_eq!(read_record(&mut reader)?, Some(BigInt::from(255)));
        assert_eq!(read_record(&mut reader)?, Some(BigInt::from(4096)));
        assert_eq!(read_record(&mut reader)?, Some(BigInt::from(10)));
        assert_eq!(read_record(&mut reader)?, None);
        Ok(())
    }

    #[test]
    fn test_record_not_utf8() {
        let mut reader = Cursor::new(vec![0xc3u8, 0x28, b'\n']);
        assert!(matches!(read_record(&mut reader), Err(SsError::MalformedNumber(_))));
    }
}
