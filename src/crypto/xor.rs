use snafu::ensure;

use crate::util::{EmptyKeySnafu, LengthMismatchSnafu, Result};

pub mod attack;

pub fn fixed_xor(buf1: &[u8], buf2: &[u8]) -> Result<Vec<u8>> {
    ensure!(buf1.len() == buf2.len(), LengthMismatchSnafu { left: buf1.len(), right: buf2.len() });
    Ok(buf1.iter()
        .zip(buf2.iter())
        .map(|(x,y)| x ^ y)
        .collect())
}

#[test]
fn test_fixed_xor() {
    let case_buf1 = hex!("1c0111001f010100061a024b53535009181c");
    let case_buf2 = hex!("686974207468652062756c6c277320657965");
    let expected = hex!("746865206b696420646f6e277420706c6179");
    let result = fixed_xor(&case_buf1, &case_buf2).unwrap();
    assert_eq!(result, expected);
    assert_eq!(fixed_xor(&result, &case_buf2).unwrap(), case_buf1);
}

#[test]
fn test_fixed_xor_length_mismatch() {
    use crate::util::Error;
    let result = fixed_xor(b"abc", b"ab");
    assert!(matches!(result, Err(Error::LengthMismatch { left: 3, right: 2 })));
}

pub fn byte_xor(buf: &[u8], b: u8) -> Vec<u8> {
    buf.iter()
        .map(|x| x ^ b )
        .collect()
}

#[test]
fn test_byte_xor() {
    assert_eq!(byte_xor(b"\x00\x01\xff", 0x0f), vec![0x0f, 0x0e, 0xf0]);
    assert!(byte_xor(b"", 0x42).is_empty());
}

pub fn repeating_key_xor(buf: &[u8], key: &[u8]) -> Result<Vec<u8>> {
    ensure!(!key.is_empty(), EmptyKeySnafu);
    Ok(buf.iter()
        .zip(key.iter().cycle())
        .map(|(x,k)| x ^ k )
        .collect())
}

#[test]
fn test_repeating_key_xor() {
    let case = b"Burning 'em, if you ain't quick and nimble\nI go crazy when I hear a cymbal";
    let key = b"ICE";
    let encoded = repeating_key_xor(case, key).unwrap();
    let expected = hex!("0b3637272a2b2e63622c2e69692a23693a2a3c6324202d623d63343c2a26226324272765272a282b2f20430a652e2c652a3124333a653e2b2027630c692b20283165286326302e27282f");
    assert_eq!(encoded, expected);
    assert_eq!(repeating_key_xor(&encoded, key).unwrap(), case);
}

#[test]
fn test_repeating_key_xor_empty_key() {
    use crate::util::Error;
    assert!(matches!(repeating_key_xor(b"abc", b""), Err(Error::EmptyKey)));
    assert!(repeating_key_xor(b"", b"k").unwrap().is_empty());
}
