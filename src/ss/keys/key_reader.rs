use std::fs::File;
use std::io::{BufRead, BufReader};

use crate::ss::codec::parse_hex;
use crate::ss::error::{Result, SsError};
use crate::ss::keys::{PrivateKey, PublicKey};

fn read_field<R: BufRead + ?Sized>(reader: &mut R, name: &str) -> Result<String> {
    let mut line = String::new();
    if reader.read_line(&mut line)? == 0 || line.trim().is_empty() {
        return Err(SsError::KeyFormat(format!("missing {}", name)));
    }
    Ok(line.trim().to_string())
}

impl PublicKey {
    pub fn read<R: BufRead + ?Sized>(reader: &mut R) -> Result<Self> {
        let n = parse_hex(&read_field(reader, "n")?)?;
        let owner = read_field(reader, "owner")?;
        Self::check_owner(&owner)?;
        Ok(Self { n, owner })
    }

    pub fn load(path: &str) -> Result<Self> {
        Self::read(&mut BufReader::new(File::open(path)?))
    }
}

impl PrivateKey {
    pub fn read<R: BufRead + ?Sized>(reader: &mut R) -> Result<Self> {
        let pq = parse_hex(&read_field(reader, "pq")?)?;
        let d = parse_hex(&read_field(reader, "d")?)?;
        Ok(Self { pq, d })
    }

    pub fn load(path: &str) -> Result<Self> {
        Self::read(&mut BufReader::new(File::open(path)?))
    }
}
