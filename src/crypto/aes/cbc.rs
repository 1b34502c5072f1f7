use snafu::ensure;

use crate::crypto::aes::{ensure_aligned, to_block, Aes, BlockCipher, BLOCK_SIZE};
use crate::util::{IvLengthMismatchSnafu, Result};

fn check_iv(iv: &[u8]) -> Result<[u8; BLOCK_SIZE]> {
    ensure!(iv.len() == BLOCK_SIZE, IvLengthMismatchSnafu { length: iv.len() });
    Ok(to_block(iv))
}

fn xor_block(a: [u8; BLOCK_SIZE], b: &[u8; BLOCK_SIZE]) -> [u8; BLOCK_SIZE] {
    let mut out = a;
    out.iter_mut()
        .zip(b.iter())
        .for_each(|(x, y)| *x ^= y );
    out
}

pub fn cbc_encrypt<C: BlockCipher + ?Sized>(cipher: &C, buf: &[u8], iv: &[u8]) -> Result<Vec<u8>> {
    let mut chain = check_iv(iv)?;
    ensure_aligned(buf)?;
    let mut out = Vec::with_capacity(buf.len());
    for block in buf.chunks_exact(BLOCK_SIZE) {
        chain = cipher.encrypt_block(xor_block(to_block(block), &chain))?;
        out.extend_from_slice(&chain);
    }
    Ok(out)
}

pub fn cbc_decrypt<C: BlockCipher + ?Sized>(cipher: &C, buf: &[u8], iv: &[u8]) -> Result<Vec<u8>> {
    let mut chain = check_iv(iv)?;
    ensure_aligned(buf)?;
    let mut out = Vec::with_capacity(buf.len());
    for block in buf.chunks_exact(BLOCK_SIZE) {
        let block = to_block(block);
        out.extend_from_slice(&xor_block(cipher.decrypt_block(block)?, &chain));
        chain = block;
    }
    Ok(out)
}

pub fn aes_cbc_encrypt(buf: &[u8], key: &[u8], iv: &[u8]) -> Result<Vec<u8>> {
    cbc_encrypt(&Aes::new(key)?, buf, iv)
}

pub fn aes_cbc_decrypt(buf: &[u8], key: &[u8], iv: &[u8]) -> Result<Vec<u8>> {
    cbc_decrypt(&Aes::new(key)?, buf, iv)
}

#[cfg(test)]
mod tests {
    use openssl::symm::{Cipher, Crypter, Mode};

    use super::*;
    use crate::crypto::common::{detect_ecb, generate_random_bytes, pad};
    use crate::util::Error;

    #[test]
    fn test_aes_cbc_known_answer() {
        let key = hex!("2b7e151628aed2a6abf7158809cf4f3c");
        let iv = hex!("000102030405060708090a0b0c0d0e0f");
        let plaintext = hex!("6bc1bee22e409f96e93d7e117393172aae2d8a571e03ac9c9eb76fac45af8e51");
        let expected = hex!("7649abac8119b246cee98e9b12e9197d5086cb9b507219ee95db113a917678b2");
        let ciphertext = aes_cbc_encrypt(&plaintext, &key, &iv).unwrap();
        assert_eq!(expected.to_vec(), ciphertext);
        assert_eq!(plaintext.to_vec(), aes_cbc_decrypt(&ciphertext, &key, &iv).unwrap());
    }

    #[test]
    fn test_aes_cbc_matches_openssl() {
        let key: [u8; 16] = generate_random_bytes();
        let iv: [u8; 16] = generate_random_bytes();
        let plaintext = pad(b"Say -- Play that funky music Say, go white boy, go white boy go", BLOCK_SIZE).unwrap();

        let mut crypter = Crypter::new(Cipher::aes_128_cbc(), Mode::Encrypt, &key, Some(&iv)).unwrap();
        crypter.pad(false);
        let mut theirs = vec![0u8; plaintext.len() + BLOCK_SIZE];
        let mut count = crypter.update(&plaintext, &mut theirs).unwrap();
        count += crypter.finalize(&mut theirs[count..]).unwrap();
        theirs.truncate(count);

        assert_eq!(theirs, aes_cbc_encrypt(&plaintext, &key, &iv).unwrap());
    }

    #[test]
    fn test_aes_cbc_encrypt_and_decrypt() {
        let plaintext = pad(b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ", BLOCK_SIZE).unwrap();
        let key = b"YELLOW SUBMARINE";
        let iv = b"yellow submarine";
        let ciphertext = aes_cbc_encrypt(&plaintext, key, iv).unwrap();
        let result = aes_cbc_decrypt(&ciphertext, key, iv).unwrap();
        assert_eq!(plaintext, result);

        for _ in 0..20 {
            let key: [u8; 24] = generate_random_bytes();
            let iv: [u8; 16] = generate_random_bytes();
            let ciphertext = aes_cbc_encrypt(&plaintext, &key, &iv).unwrap();
            assert_eq!(plaintext, aes_cbc_decrypt(&ciphertext, &key, &iv).unwrap());
        }
    }

    #[test]
    fn test_aes_cbc_hides_repeated_blocks() {
        let key: [u8; 16] = generate_random_bytes();
        let iv: [u8; 16] = generate_random_bytes();
        let plaintext = vec![b'A'; 4 * BLOCK_SIZE];
        let ciphertext = aes_cbc_encrypt(&plaintext, &key, &iv).unwrap();
        assert!(!detect_ecb(&ciphertext, BLOCK_SIZE).unwrap());
    }

    #[test]
    fn test_aes_cbc_zero_iv_first_block_is_ecb() {
        let key = b"YELLOW SUBMARINE";
        let iv = [0u8; BLOCK_SIZE];
        let plaintext = b"YELLOW SUBMARINE";
        let cbc = aes_cbc_encrypt(plaintext, key, &iv).unwrap();
        let ecb = crate::crypto::aes::ecb::aes_ecb_encrypt(plaintext, key).unwrap();
        assert_eq!(ecb, cbc);
    }

    #[test]
    fn test_aes_cbc_validation() {
        let key = [0u8; 16];
        assert!(matches!(
            aes_cbc_encrypt(&[0u8; 32], &key, &[0u8; 8]),
            Err(Error::IvLengthMismatch { length: 8 })
        ));
        assert!(matches!(
            aes_cbc_decrypt(&[0u8; 32], &key, &[0u8; 17]),
            Err(Error::IvLengthMismatch { length: 17 })
        ));
        assert!(matches!(
            aes_cbc_encrypt(&[0u8; 31], &key, &[0u8; 16]),
            Err(Error::InvalidBlockAlignment { length: 31, block_size: 16 })
        ));
        assert!(matches!(
            aes_cbc_decrypt(&[0u8; 33], &key, &[0u8; 16]),
            Err(Error::InvalidBlockAlignment { length: 33, block_size: 16 })
        ));
        assert!(matches!(
            aes_cbc_encrypt(&[0u8; 32], &[0u8; 12], &[0u8; 16]),
            Err(Error::InvalidKey { length: 12 })
        ));
    }
}
