use snafu::Snafu;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    #[snafu(display("buffers differ in length ({left} vs {right})"))]
    LengthMismatch { left: usize, right: usize },

    #[snafu(display("key must not be empty"))]
    EmptyKey,

    #[snafu(display("reference corpus must not be empty"))]
    EmptyCorpus,

    #[snafu(display("input must not be empty"))]
    EmptyInput,

    #[snafu(display("need at least {needed} bytes, got {available}"))]
    InsufficientData { needed: usize, available: usize },

    #[snafu(display("invalid key length {length}"))]
    InvalidKeyLength { length: usize },

    #[snafu(display("length {length} is not a multiple of block size {block_size}"))]
    InvalidBlockAlignment { length: usize, block_size: usize },

    #[snafu(display("IV must be one block long, got {length} bytes"))]
    IvLengthMismatch { length: usize },

    #[snafu(display("block cipher rejected a {length} byte key"))]
    InvalidKey { length: usize },

    #[snafu(display("malformed padding"))]
    InvalidPadding,

    #[snafu(display("block cipher failure: {source}"))]
    Cipher { source: openssl::error::ErrorStack },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

// Rows shorter than the first one simply contribute nothing to the missing columns
pub(crate) fn transpose<T>(original: &[&[T]]) -> Vec<Vec<T>> where T: Clone {
    let width = match original.first() {
        Some(row) => row.len(),
        None      => return Vec::new(),
    };
    let mut transposed = (0..width).map(|_| vec![]).collect::<Vec<_>>();

    for original_row in original {
        for (item, transposed_row) in original_row.iter().zip(&mut transposed) {
            transposed_row.push(item.clone());
        }
    }

    transposed
}

#[test]
fn test_transpose() {
    let v1 = vec![1, 2];
    let v2 = vec![3, 4];
    let v3 = vec![5, 6];
    let blocks = vec![v1.as_slice(), v2.as_slice(), v3.as_slice()];
    let transposed = transpose(blocks.as_slice());
    assert_eq!(transposed.len(), 2);
    assert_eq!(transposed[0], vec![1, 3, 5]);
    assert_eq!(transposed[1], vec![2, 4, 6]);
}

#[test]
fn test_transpose_ragged_last_row() {
    let blocks: Vec<&[u8]> = b"abcdefg".chunks(3).collect();
    let transposed = transpose(&blocks);
    assert_eq!(transposed, vec![b"adg".to_vec(), b"be".to_vec(), b"cf".to_vec()]);
    assert!(transpose::<u8>(&[]).is_empty());
}
