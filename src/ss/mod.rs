use std::fs::File;
use std::io;
use std::io::{BufReader, BufWriter, Read, Write};
use clap::Parser;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use tracing::info;

pub mod codec;
pub mod config;
pub mod error;
pub mod keygen;
pub mod keys;
pub mod numtheory;
pub mod stream;

use config::*;
use error::{Result, SsError};
use keygen::generate_key;
use keys::*;
use stream::{decrypt_file, encrypt_file};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunMode {
    Generate,
    Encrypt,
    Decrypt,
    Test,
}

#[macro_export]
macro_rules! ss_t {
    ($CONFIG: expr, $NAME: ident) => {
#[derive(Debug, Clone, Parser)]
#[clap(version, about = "Schmidt-Samoa key generation, encryption and decryption")]
pub struct $NAME {
    #[clap(short, long, value_parser, default_value = $CONFIG.mode.as_str(), help = "Run mode: generate, encrypt, decrypt, test")]
    pub mode: String,
    #[clap(short, long, value_parser, default_value = $CONFIG.key.as_str(), help = "Key path, generate/detect `path.pub' and `path.priv'")]
    pub key: String,
    #[clap(short, long, value_parser, default_value = $CONFIG.user.as_str(), help = "Owner name stored in the public key")]
    pub user: String,
    #[clap(short, long, value_parser, default_value = $CONFIG.input.as_str(), help = "Input filename")]
    pub input: String,
    #[clap(short, long, value_parser, default_value = $CONFIG.output.as_str(), help = "Output filename")]
    pub output: String,
    #[clap(short, long, value_parser, default_value_t = $CONFIG.bits, help = "Minimum bits needed for public key n")]
    pub bits: u64,
    #[clap(long, value_parser, default_value_t = $CONFIG.iters, help = "Miller Rabin iterations for testing primes")]
    pub iters: u64,
    #[clap(long, value_parser, default_value_t = $CONFIG.seed, help = "Random seed, defaults to the current time")]
    pub seed: u64,
    #[clap(long, value_parser, default_value_t = $CONFIG.attempts, help = "Candidates to try before giving up on a prime")]
    pub attempts: u64,
    #[clap(short, long, value_parser, default_value_t = $CONFIG.verbose, help = "Print key material")]
    pub verbose: bool,
    #[clap(short = 'q', long, value_parser, default_value_t = $CONFIG.silent, help = "Disable log output")]
    pub silent: bool,
}
    };
}

ss_t!(CONFIG_DEF, SS);

impl SS {
    pub fn reader(&self) -> Result<Box<dyn Read>> {
        Ok(match self.input.as_str() {
            "stdin" => Box::new(io::stdin()),
            f => Box::new(File::open(f)?)
        })
    }

    pub fn writer(&self) -> Result<Box<dyn Write>> {
        Ok(match self.output.as_str() {
            "stdout" => Box::new(BufWriter::new(io::stdout())),
            f => Box::new(BufWriter::new(File::create(f)?))
        })
    }

    pub fn run_mode(&self) -> Result<RunMode> {
        match self.mode.as_str() {
            "encrypt" => Ok(RunMode::Encrypt),
            "decrypt" => Ok(RunMode::Decrypt),
            "generate" => Ok(RunMode::Generate),
            "test" => Ok(RunMode::Test),
            m => Err(SsError::UnknownMode(m.to_string()))
        }
    }

    fn rng(&self) -> StdRng {
        info!("Random seed {}", self.seed);
        StdRng::seed_from_u64(self.seed)
    }

    pub fn run(&self) -> Result<()> {
        match self.run_mode()? {
            RunMode::Generate => {
                PublicKey::check_owner(&self.user)?;
                let files = KeyPair::create(&self.key)?;
                let mut rng = self.rng();
                let material = generate_key(self.bits, self.iters, self.attempts, &mut rng)?;
                let key_pair = material.key_pair(self.user.clone());
                key_pair.save_to(files)?;
                if self.verbose {
                    eprintln!("user = {}", self.user);
                    eprintln!("{}", describe("p ", &material.p));
                    eprintln!("{}", describe("q ", &material.q));
                    eprintln!("{}", describe("n ", &material.n));
                    eprintln!("{}", describe("d ", &material.d));
                    eprintln!("{}", describe("pq", &material.pq));
                }
            }
            RunMode::Encrypt => {
                let (path_public, _) = KeyPair::paths(&self.key);
                let key = PublicKey::load(&path_public)?;
                if self.verbose { key.info(); }
                let mut reader = self.reader()?;
                let mut writer = self.writer()?;
                encrypt_file(&mut reader, &mut writer, &key.n)?;
            }
            RunMode::Decrypt => {
                let (_, path_private) = KeyPair::paths(&self.key);
                let key = PrivateKey::load(&path_private)?;
                if self.verbose { key.info(); }
                let mut reader = BufReader::new(self.reader()?);
                let mut writer = self.writer()?;
                decrypt_file(&mut reader, &mut writer, &key.d, &key.pq)?;
            }
            RunMode::Test => {
                let key_pair = KeyPair::load(&self.key)?;
                if self.verbose {
                    key_pair.public.info();
                    key_pair.private.info();
                }
                let mut rng = self.rng();
                let mut data = Vec::new();
                if self.input == "stdin" {
                    data.resize(TEST_BYTES, 0);
                    rng.fill_bytes(&mut data);
                } else {
                    self.reader()?.read_to_end(&mut data)?;
                }
                key_pair.check(&data, TEST_BLOCKS, &mut rng)?;
            }
        }
        Ok(())
    }
}
