use std::fs::File;
use std::io::Cursor;
use rand::Rng;
use tracing::info;

use crate::ss::codec::{encode_block, encrypt_capacity};
use crate::ss::error::{Result, SsError};
use crate::ss::keys::{PrivateKey, PublicKey};
use crate::ss::stream::{decrypt, decrypt_file, encrypt, encrypt_file};

/// Open handles on both files of a pair, see [`KeyPair::create`].
#[derive(Debug)]
pub struct KeyFiles {
    path_public: String,
    path_private: String,
    public: File,
    private: File,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPair {
    pub public: PublicKey,
    pub private: PrivateKey,
}

impl KeyPair {
    /// `(<base>.pub, <base>.priv)`
    pub fn paths(base: &str) -> (String, String) {
        (format!("{}.pub", base), format!("{}.priv", base))
    }

    pub fn load(base: &str) -> Result<Self> {
        let (path_public, path_private) = Self::paths(base);
        Ok(Self { public: PublicKey::load(&path_public)?, private: PrivateKey::load(&path_private)? })
    }

    /// Creates (or truncates) `<base>.priv` and then `<base>.pub` without
    /// writing either, so an unusable path is reported before any key exists.
    pub fn create(base: &str) -> Result<KeyFiles> {
        let (path_public, path_private) = Self::paths(base);
        let private = PrivateKey::create(&path_private)?;
        let public = PublicKey::create(&path_public)?;
        Ok(KeyFiles { path_public, path_private, public, private })
    }

    /// The private half is written first.
    pub fn save_to(&self, files: KeyFiles) -> Result<()> {
        self.private.save_to(files.private)?;
        self.public.save_to(files.public)?;
        info!("Generated key files: {}, {}", files.path_public, files.path_private);
        Ok(())
    }

    /// Pushes `blocks` random blocks and then `data` as a whole stream through
    /// both halves, failing with [`SsError::KeyMismatch`] on the first
    /// difference.
    pub fn check<R: Rng + ?Sized>(&self, data: &[u8], blocks: u64, rng: &mut R) -> Result<()> {
        let (n, pq, d) = (&self.public.n, &self.private.pq, &self.private.d);
        let k = encrypt_capacity(n);
        if k < 2 {
            return Err(SsError::BlockTooSmall(k));
        }
        for i in 0..blocks {
            let mut payload = vec![0u8; rng.gen_range(0..k)];
            rng.fill(&mut payload[..]);
            let m = encode_block(&payload);
            if decrypt(&encrypt(&m, n), d, pq) != m {
                return Err(SsError::KeyMismatch(format!("block {} of {} bytes did not survive", i, payload.len() + 1)));
            }
        }
        let mut cipher = Vec::new();
        encrypt_file(&mut Cursor::new(data), &mut cipher, n)?;
        let mut plain = Vec::new();
        match decrypt_file(&mut Cursor::new(cipher), &mut plain, d, pq) {
            Ok(()) if plain == data => {}
            Ok(()) => return Err(SsError::KeyMismatch("stream round trip differs".to_string())),
            Err(SsError::MissingMarker) | Err(SsError::BlockOverflow { .. }) =>
                return Err(SsError::KeyMismatch("stream round trip broke block framing".to_string())),
            Err(e) => return Err(e),
        }
        info!("Test pass: {} blocks and {} bytes", blocks, data.len());
        Ok(())
    }
}
