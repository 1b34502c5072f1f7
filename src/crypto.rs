pub mod aes;
pub mod common;
pub mod oracle;
pub mod xor;

#[cfg(test)]
mod generic_tests {
    use crate::crypto::aes::{cbc, ecb, BLOCK_SIZE};
    use crate::crypto::common::{detect_ecb, generate_random_bytes, pad};
    use crate::crypto::xor::{self, attack};
    use crate::stats::ENGLISH;

    #[test]
    fn test_break_single_byte_xor_then_repeating_key() {
        let plaintext = b"I'm back and I'm ringin' the bell \nA rockin' on the mike while the fly girls yell";
        let single = xor::byte_xor(plaintext, 0x5a);
        let recovered = attack::recover_single_byte_key(&single, &ENGLISH).unwrap();
        assert_eq!(0x5a, recovered.key);

        let repeated = xor::repeating_key_xor(plaintext, b"ICE").unwrap();
        let recovered = attack::recover_repeating_key(&repeated, 3, &ENGLISH).unwrap();
        assert_eq!(b"ICE".to_vec(), recovered.key);
        assert_eq!(plaintext.to_vec(), recovered.plaintext);
    }

    #[test]
    fn test_find_ecb_ciphertext_among_cbc() {
        let key: [u8; 16] = generate_random_bytes();
        let plaintext = pad(&[b"YELLOW SUBMARINE".repeat(3), b"and a tail".to_vec()].concat(), BLOCK_SIZE).unwrap();
        let mut ciphertexts: Vec<Vec<u8>> = (0..9)
            .map(|_| {
                let iv: [u8; 16] = generate_random_bytes();
                cbc::aes_cbc_encrypt(&plaintext, &key, &iv).unwrap()
            })
            .collect();
        ciphertexts.insert(6, ecb::aes_ecb_encrypt(&plaintext, &key).unwrap());

        let results: Vec<usize> = ciphertexts.iter()
            .enumerate()
            .filter(|(_, c)| detect_ecb(c, BLOCK_SIZE).unwrap() )
            .map(|(i, _)| i )
            .collect();
        assert_eq!(vec![6], results);
    }
}
