use log::{debug, info};
use rand::{Rng, RngCore};
use rand::rngs::OsRng;
use std::ops::RangeInclusive;

use crate::crypto::aes::{cbc::cbc_encrypt, ecb::ecb_encrypt, Aes, BlockCipher, BLOCK_SIZE};
use crate::crypto::common::{detect_ecb, generate_random_bytes, pad};
use crate::util::Result;

pub trait Oracle: Fn(&[u8]) -> Result<Vec<u8>> {}
impl<T: Fn(&[u8]) -> Result<Vec<u8>>> Oracle for T {}

pub fn get_id_oracle() -> Box<dyn Oracle> {
    Box::new(move |buf: &[u8]| -> Result<Vec<u8>> {
        Ok(buf.to_vec())
    })
}

// An inverted range means no padding at all
fn random_padding(len: &RangeInclusive<usize>) -> Vec<u8> {
    if len.is_empty() {
        return Vec::new();
    }
    let mut rng = rand::thread_rng();
    let pad_len: usize = rng.gen_range(len.clone());
    let mut padding = vec![0u8; pad_len];
    rng.fill_bytes(&mut padding);
    padding
}

impl dyn Oracle {
    pub fn pullback_add_left_padding(self: Box<dyn Oracle>, lpad: &[u8]) -> Box<dyn Oracle> {
        let owned_lpad = lpad.to_owned();
        Box::new(move |buf: &[u8]| -> Result<Vec<u8>> {
            let joined = [
                owned_lpad.as_slice(),
                buf,
            ].concat();
            self(&joined)
        })
    }

    pub fn pullback_add_right_padding(self: Box<dyn Oracle>, rpad: &[u8]) -> Box<dyn Oracle> {
        let owned_rpad = rpad.to_owned();
        Box::new(move |buf: &[u8]| -> Result<Vec<u8>> {
            let joined = [
                buf,
                owned_rpad.as_slice(),
            ].concat();
            self(&joined)
        })
    }

    // The padding is drawn once, when the oracle is built
    pub fn pullback_add_random_left_padding(self: Box<dyn Oracle>, len: &RangeInclusive<usize>) -> Box<dyn Oracle> {
        self.pullback_add_left_padding(&random_padding(len))
    }

    pub fn pullback_add_random_right_padding(self: Box<dyn Oracle>, len: &RangeInclusive<usize>) -> Box<dyn Oracle> {
        self.pullback_add_right_padding(&random_padding(len))
    }

    pub fn pushforward_pad(self: Box<dyn Oracle>, block_size: usize) -> Box<dyn Oracle> {
        Box::new(move |buf: &[u8]| -> Result<Vec<u8>> {
            let out = self(buf)?;
            pad(&out, block_size)
        })
    }

    pub fn pushforward_ecb_encrypt<C: BlockCipher + 'static>(self: Box<dyn Oracle>, cipher: C) -> Box<dyn Oracle> {
        Box::new(move |buf: &[u8]| -> Result<Vec<u8>> {
            let plaintext = self(buf)?;
            ecb_encrypt(&cipher, &plaintext)
        })
    }

    pub fn pushforward_cbc_encrypt<C: BlockCipher + 'static>(self: Box<dyn Oracle>, cipher: C, iv: [u8; BLOCK_SIZE]) -> Box<dyn Oracle> {
        Box::new(move |buf: &[u8]| -> Result<Vec<u8>> {
            let plaintext = self(buf)?;
            cbc_encrypt(&cipher, &plaintext, &iv)
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    Ecb,
    Cbc,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExperimentConfig {
    pub trials: usize,
    pub prefix_len: RangeInclusive<usize>,
    pub suffix_len: RangeInclusive<usize>,
    /// Chosen plaintext fed to the oracle on every trial.
    pub plaintext: Vec<u8>,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        // Three blocks of one byte leave two identical aligned blocks for any
        // prefix of up to one block
        Self {
            trials: 100,
            prefix_len: 5..=10,
            suffix_len: 5..=10,
            plaintext: vec![b'A'; 3 * BLOCK_SIZE],
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ModeTally {
    pub trials: usize,
    pub used_ecb: usize,
    pub used_cbc: usize,
    pub predicted_ecb: usize,
    pub predicted_cbc: usize,
    pub correct: usize,
}

impl ModeTally {
    fn record(&mut self, used: Mode, predicted: Mode) {
        self.trials += 1;
        match used {
            Mode::Ecb => self.used_ecb += 1,
            Mode::Cbc => self.used_cbc += 1,
        }
        match predicted {
            Mode::Ecb => self.predicted_ecb += 1,
            Mode::Cbc => self.predicted_cbc += 1,
        }
        if used == predicted {
            self.correct += 1;
        }
    }
}

/// Encrypts `input` under a fresh random key, wrapped in random bytes on
/// both sides, with ECB or CBC picked by a coin flip. Returns the mode that
/// was actually used alongside the ciphertext.
pub fn encryption_oracle(input: &[u8], config: &ExperimentConfig) -> Result<(Mode, Vec<u8>)> {
    let key: [u8; 16] = generate_random_bytes();
    let cipher = Aes::new(&key)?;
    let mode = if OsRng.gen::<bool>() { Mode::Ecb } else { Mode::Cbc };

    let padded = get_id_oracle()
        .pullback_add_random_left_padding(&config.prefix_len)
        .pullback_add_random_right_padding(&config.suffix_len)
        .pushforward_pad(BLOCK_SIZE);
    let oracle = match mode {
        Mode::Ecb => padded.pushforward_ecb_encrypt(cipher),
        Mode::Cbc => padded.pushforward_cbc_encrypt(cipher, generate_random_bytes()),
    };
    Ok((mode, oracle(input)?))
}

pub fn detect_mode(ciphertext: &[u8]) -> Result<Mode> {
    Ok(if detect_ecb(ciphertext, BLOCK_SIZE)? { Mode::Ecb } else { Mode::Cbc })
}

pub fn run_mode_experiment(config: &ExperimentConfig) -> Result<ModeTally> {
    let mut tally = ModeTally::default();
    for trial in 0..config.trials {
        let (used, ciphertext) = encryption_oracle(&config.plaintext, config)?;
        let predicted = detect_mode(&ciphertext)?;
        debug!("trial {}: used {:?}, detected {:?}", trial, used, predicted);
        tally.record(used, predicted);
    }
    info!(
        "ecb used {} / detected {}, cbc used {} / detected {}, {} of {} correct",
        tally.used_ecb, tally.predicted_ecb,
        tally.used_cbc, tally.predicted_cbc,
        tally.correct, tally.trials,
    );
    Ok(tally)
}
