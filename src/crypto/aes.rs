use openssl::symm::{Cipher, Crypter, Mode};
use snafu::{ensure, ResultExt};

pub mod ecb;
pub mod cbc;

use crate::util::{CipherSnafu, InvalidBlockAlignmentSnafu, InvalidKeySnafu, Result};

pub const BLOCK_SIZE: usize = 16;

/// An invertible transform of a single block, keyed at construction.
///
/// The chaining modes in `ecb` and `cbc` only ever talk to the primitive
/// through this trait.
pub trait BlockCipher {
    fn encrypt_block(&self, block: [u8; BLOCK_SIZE]) -> Result<[u8; BLOCK_SIZE]>;
    fn decrypt_block(&self, block: [u8; BLOCK_SIZE]) -> Result<[u8; BLOCK_SIZE]>;
}

/// Raw AES block transform backed by OpenSSL. No padding, no chaining.
#[derive(Clone)]
pub struct Aes {
    cipher: Cipher,
    key: Vec<u8>,
}

impl Aes {
    pub fn new(key: &[u8]) -> Result<Self> {
        let cipher = match key.len() {
            16 => Cipher::aes_128_ecb(),
            24 => Cipher::aes_192_ecb(),
            32 => Cipher::aes_256_ecb(),
            length => return InvalidKeySnafu { length }.fail(),
        };
        Ok(Self { cipher, key: key.to_vec() })
    }

    fn crypt(&self, mode: Mode, block: [u8; BLOCK_SIZE]) -> Result<[u8; BLOCK_SIZE]> {
        let mut crypter = Crypter::new(self.cipher, mode, &self.key, None)
            .context(CipherSnafu)?;
        crypter.pad(false);
        let mut out = [0u8; BLOCK_SIZE + BLOCK_SIZE];
        let count = crypter.update(&block, &mut out)
            .context(CipherSnafu)?;
        crypter.finalize(&mut out[count..])
            .context(CipherSnafu)?;
        Ok(to_block(&out[..BLOCK_SIZE]))
    }
}

impl BlockCipher for Aes {
    fn encrypt_block(&self, block: [u8; BLOCK_SIZE]) -> Result<[u8; BLOCK_SIZE]> {
        self.crypt(Mode::Encrypt, block)
    }

    fn decrypt_block(&self, block: [u8; BLOCK_SIZE]) -> Result<[u8; BLOCK_SIZE]> {
        self.crypt(Mode::Decrypt, block)
    }
}

// Callers hand in chunks_exact(BLOCK_SIZE) slices
pub(crate) fn to_block(chunk: &[u8]) -> [u8; BLOCK_SIZE] {
    let mut block = [0u8; BLOCK_SIZE];
    block.copy_from_slice(chunk);
    block
}

pub(crate) fn ensure_aligned(buf: &[u8]) -> Result<()> {
    ensure!(
        buf.len() % BLOCK_SIZE == 0,
        InvalidBlockAlignmentSnafu { length: buf.len(), block_size: BLOCK_SIZE }
    );
    Ok(())
}
