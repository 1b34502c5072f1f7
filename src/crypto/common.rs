use rand::RngCore;
use rand::rngs::OsRng;
use snafu::ensure;
use std::collections::HashSet;

use crate::util::{
    InvalidBlockAlignmentSnafu,
    InvalidPaddingSnafu,
    LengthMismatchSnafu,
    Result,
};

/// Filler used by `pad`. Every padding byte has this value regardless of the
/// padding length, which is NOT PKCS#7; use `pad_pkcs_7` when the other side
/// expects the standard scheme.
pub const PAD_BYTE: u8 = 0x04;

pub fn hamming_distance(buf1: &[u8], buf2: &[u8]) -> Result<u32> {
    ensure!(buf1.len() == buf2.len(), LengthMismatchSnafu { left: buf1.len(), right: buf2.len() });
    Ok(buf1.iter()
        .zip(buf2.iter())
        .map(|(x,y)| x ^ y )
        .map(|z| z.count_ones() )
        .sum())
}

#[test]
fn test_hamming_distance() {
    let s1: String = "this is a test".to_string();
    let s2: String = "wokka wokka!!!".to_string();
    let dist = hamming_distance(&s1.as_bytes(), &s2.as_bytes()).unwrap();
    assert_eq!(dist, 37);
    assert!(hamming_distance(b"ab", b"abc").is_err());
}

pub fn normalised_hamming_distance(buf1: &[u8], buf2: &[u8]) -> Result<f64> {
    let dist = hamming_distance(buf1, buf2)?;
    Ok((dist as f64) / (buf1.len().max(1) as f64))
}

pub fn repeating_block(arr: &[u8], size: usize) -> Option<(usize, Vec<u8>)> {
    if size == 0 {
        return None;
    }
    let mut blocks: HashSet<&[u8]> = HashSet::new();
    for (idx, block) in arr.chunks(size).enumerate() {
        if !blocks.insert(block) {
            return Some((idx, block.to_vec()));
        }
    }
    None
}

#[test]
fn test_repeating_block() {
    let arr = b"aaabbbcccaaa";
    assert_eq!(Some((3, b"aaa".to_vec())), repeating_block(arr, 3));
    assert_eq!(None,                       repeating_block(arr, 4));
    assert_eq!(None,                       repeating_block(arr, 0));
}

/// True when any `block_size` block of `buf` occurs twice, the signature of
/// ECB encrypting repeated plaintext.
pub fn detect_ecb(buf: &[u8], block_size: usize) -> Result<bool> {
    ensure!(
        block_size > 0 && buf.len() % block_size == 0,
        InvalidBlockAlignmentSnafu { length: buf.len(), block_size }
    );
    Ok(repeating_block(buf, block_size).is_some())
}

#[test]
fn test_detect_ecb() {
    let repeated = [[7u8; 16], [1u8; 16], [7u8; 16]].concat();
    assert!(detect_ecb(&repeated, 16).unwrap());
    let distinct: Vec<u8> = (0..48).collect();
    assert!(!detect_ecb(&distinct, 16).unwrap());
    assert!(!detect_ecb(&[], 16).unwrap());
    assert!(detect_ecb(&distinct[..47], 16).is_err());
    assert!(detect_ecb(&distinct, 0).is_err());
}

// An already aligned buffer is returned unchanged
pub fn pad(buf: &[u8], block_size: usize) -> Result<Vec<u8>> {
    ensure!(block_size > 0, InvalidBlockAlignmentSnafu { length: buf.len(), block_size });
    let remainder = block_size - (buf.len() % block_size);
    if remainder == block_size {
        return Ok(buf.to_vec());
    }
    Ok([buf, vec![PAD_BYTE; remainder].as_slice()].concat())
}

#[test]
fn test_pad() {
    let case = b"YELLOW SUBMARINE";
    assert_eq!(b"YELLOW SUBMARINE\x04\x04\x04\x04".to_vec(), pad(case, 20).unwrap());
    assert_eq!(case.to_vec(), pad(case, 16).unwrap());
    assert_eq!(case.to_vec(), pad(case, 8).unwrap());

    // The filler does not encode the padding length
    let padded = pad(b"ICE", 16).unwrap();
    assert_eq!(16, padded.len());
    assert!(padded[3..].iter().all(|&b| b == PAD_BYTE ));

    assert_eq!(Vec::<u8>::new(), pad(b"", 16).unwrap());
    assert!(pad(case, 0).is_err());
}

// Always pads, with a whole block when already a multiple, so that stripping
// is unambiguous
pub fn pad_pkcs_7(buf: &[u8], block_size: usize) -> Result<Vec<u8>> {
    ensure!(
        block_size > 0 && block_size <= u8::MAX as usize,
        InvalidBlockAlignmentSnafu { length: buf.len(), block_size }
    );
    let padding_length = block_size - (buf.len() % block_size);
    Ok([buf, vec![padding_length as u8; padding_length].as_slice()].concat())
}

#[test]
fn test_pad_pkcs_7() {
    let case = b"YELLOW SUBMARINE";
    let expected = b"YELLOW SUBMARINE\x04\x04\x04\x04".to_vec();
    assert_eq!(expected, pad_pkcs_7(case, 20).unwrap());

    let expected_2 = [
        case.to_vec(),
        vec![16; 16],
    ].concat();
    assert_eq!(expected_2, pad_pkcs_7(case, case.len()).unwrap());
    assert!(pad_pkcs_7(case, 256).is_err());
}

pub fn strip_pad_pkcs_7(buf: &[u8], block_size: usize) -> Result<Vec<u8>> {
    ensure!(
        block_size > 0 && buf.len() % block_size == 0,
        InvalidBlockAlignmentSnafu { length: buf.len(), block_size }
    );
    let &final_byte = buf.last().ok_or_else(|| InvalidPaddingSnafu.build())?;
    let padding_len = final_byte as usize;
    ensure!(
        padding_len > 0
            && padding_len <= block_size
            && padding_len <= buf.len()
            && buf.iter().rev().take(padding_len).all(|&b| b == final_byte ),
        InvalidPaddingSnafu
    );
    Ok(buf[..(buf.len() - padding_len)].to_vec())
}

#[test]
fn test_strip_pad_pkcs_7() {
    use crate::util::Error;

    let case = b"YELLOW SUBMARINE\x04\x04\x04\x04";
    let expected = b"YELLOW SUBMARINE".to_vec();
    assert_eq!(expected, strip_pad_pkcs_7(case, 20).unwrap());
    assert!(matches!(strip_pad_pkcs_7(case, 16), Err(Error::InvalidBlockAlignment { .. })));

    let case_2 = pad_pkcs_7(&expected, 16).unwrap();
    assert_eq!(expected, strip_pad_pkcs_7(&case_2, 16).unwrap());

    let case_3 = b"ICE ICE BABY\x04\x04\x04\x04";
    assert_eq!(b"ICE ICE BABY".to_vec(), strip_pad_pkcs_7(case_3, 16).unwrap());

    let case_4 = b"ICE ICE BABY\x05\x05\x05\x05";
    assert!(matches!(strip_pad_pkcs_7(case_4, 16), Err(Error::InvalidPadding)));

    let case_5 = b"ICE ICE BABY\x01\x02\x03\x04";
    assert!(matches!(strip_pad_pkcs_7(case_5, 16), Err(Error::InvalidPadding)));

    let case_6 = b"ICE ICE BABY\x00\x00\x00\x00";
    assert!(matches!(strip_pad_pkcs_7(case_6, 16), Err(Error::InvalidPadding)));
}

/// Key and IV material, straight from the operating system.
pub fn generate_random_bytes<const N: usize>() -> [u8; N] {
    let mut data = [0u8; N];
    OsRng.fill_bytes(&mut data);
    data
}

#[test]
fn test_generate_random_bytes() {
    let key_1: [u8; 16] = generate_random_bytes();
    let key_2: [u8; 16] = generate_random_bytes();
    assert_ne!(key_1, key_2);
}
