use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};

use crate::ss::codec::to_hex;
use crate::ss::error::{Result, SsError};
use crate::ss::keys::{PrivateKey, PublicKey};

impl PublicKey {
    /// The owner line must be a single non-empty word.
    pub fn check_owner(owner: &str) -> Result<()> {
        if owner.is_empty() || owner.chars().any(char::is_whitespace) {
            return Err(SsError::KeyFormat(format!("owner {:?} must be one non-empty word", owner)));
        }
        Ok(())
    }

    /// Writes `n` in hex and the owner, one per line.
    pub fn write<W: Write + ?Sized>(&self, writer: &mut W) -> Result<()> {
        Self::check_owner(&self.owner)?;
        write!(writer, "{}\n{}\n", to_hex(&self.n), self.owner)?;
        Ok(())
    }

    pub fn create(path: &str) -> Result<File> {
        Ok(File::create(path)?)
    }

    pub fn save_to(&self, file: File) -> Result<()> {
        let mut writer = BufWriter::new(file);
        self.write(&mut writer)?;
        writer.flush()?;
        Ok(())
    }
}

impl PrivateKey {
    /// Writes `pq` and `d` in hex, one per line.
    pub fn write<W: Write + ?Sized>(&self, writer: &mut W) -> Result<()> {
        write!(writer, "{}\n{}\n", to_hex(&self.pq), to_hex(&self.d))?;
        Ok(())
    }

    /// Like [`PublicKey::create`], but the file is readable by its owner only.
    pub fn create(path: &str) -> Result<File> {
        Ok(create_private(path)?)
    }

    pub fn save_to(&self, file: File) -> Result<()> {
        let mut writer = BufWriter::new(file);
        self.write(&mut writer)?;
        writer.flush()?;
        Ok(())
    }
}

#[cfg(unix)]
fn create_private(path: &str) -> std::io::Result<File> {
    use std::fs::Permissions;
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
    let file = OpenOptions::new().write(true).create(true).truncate(true).mode(0o600).open(path)?;
    // mode() only applies to new files
    file.set_permissions(Permissions::from_mode(0o600))?;
    Ok(file)
}

#[cfg(not(unix))]
fn create_private(path: &str) -> std::io::Result<File> {
    OpenOptions::new().write(true).create(true).truncate(true).open(path)
}

#[cfg(test)]
mod tests {
    use std::error::Error;
    use num_bigint::BigInt;
    use crate::ss::error::SsError;
    use crate::ss::keys::{PrivateKey, PublicKey};

    #[test]
    fn test_write_public() -> Result<(), Box<dyn Error>> {
        let key = PublicKey { n: BigInt::from(0xabcdefu32), owner: "chiro".to_string() };
        let mut buf = Vec::new();
        key.write(&mut buf)?;
        assert_eq!(String::from_utf8(buf)?, "ABCDEF\nchiro\n");
        Ok(())
    }

    #[test]
    fn test_write_private() -> Result<(), Box<dyn Error>> {
        let key = PrivateKey { pq: BigInt::from(77), d: BigInt::from(13) };
        let mut buf = Vec::new();
        key.write(&mut buf)?;
        assert_eq!(String::from_utf8(buf)?, "4D\nD\n");
        Ok(())
    }

    #[test]
    fn test_write_rejects_owner() {
        for owner in ["", "two words", "tab\there"] {
            let key = PublicKey { n: BigInt::from(1), owner: owner.to_string() };
            assert!(matches!(key.write(&mut Vec::new()), Err(SsError::KeyFormat(_))), "{:?}", owner);
        }
    }
}
