use itertools::Itertools;
use log::{debug, trace, warn};
use snafu::ensure;

use crate::crypto::{common, xor};
use crate::stats::ScoringTable;
use crate::util::{self, EmptyInputSnafu, InsufficientDataSnafu, InvalidKeyLengthSnafu, Result};

/// A guessed key together with the plaintext it produces and that
/// plaintext's score.
#[derive(Clone, Debug, PartialEq)]
pub struct KeyCandidate<K> {
    pub key: K,
    pub plaintext: Vec<u8>,
    pub score: f64,
}

/// Bounds of the key length search.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyLengthSearch {
    pub min_len: usize,
    pub max_len: usize,
    /// Adjacent window pairs averaged per candidate length.
    pub pairs: usize,
}

impl Default for KeyLengthSearch {
    fn default() -> Self {
        Self { min_len: 2, max_len: 40, pairs: 2 }
    }
}

impl KeyLengthSearch {
    pub fn required_len(&self) -> usize {
        2 * self.pairs * self.max_len
    }
}

// Strictly greater wins, so ties keep the earlier candidate
fn better<K>(best: KeyCandidate<K>, next: KeyCandidate<K>) -> KeyCandidate<K> {
    if next.score > best.score { next } else { best }
}

pub fn recover_single_byte_key(buf: &[u8], table: &ScoringTable) -> Result<KeyCandidate<u8>> {
    ensure!(!buf.is_empty(), EmptyInputSnafu);

    let candidates = (0..=u8::MAX)
        .map(|key| {
            let plaintext = xor::byte_xor(buf, key);
            table.score(&plaintext)
                .map(|score| KeyCandidate { key, plaintext, score })
        });
    let best = itertools::process_results(candidates, |it| it.reduce(better))?
        .ok_or_else(|| EmptyInputSnafu.build())?;

    if best.score <= 0f64 {
        debug!("no single byte key scored above zero, keeping key {:#04x}", best.key);
    }
    trace!("single byte key {:#04x} scored {}", best.key, best.score);
    Ok(best)
}

/// Recovers the best single byte key of every line and returns the index of
/// the line that decrypts most convincingly. Empty lines are skipped but keep
/// their place in the numbering.
pub fn detect_single_byte_xor<T: AsRef<[u8]>>(lines: &[T], table: &ScoringTable) -> Result<(usize, KeyCandidate<u8>)> {
    let candidates = lines.iter()
        .map(|line| line.as_ref() )
        .enumerate()
        .filter(|(_, line)| !line.is_empty() )
        .map(|(idx, line)| recover_single_byte_key(line, table).map(|c| (idx, c)) );
    let (idx, best) = itertools::process_results(candidates, |it| {
            it.reduce(|best, next| if next.1.score > best.1.score { next } else { best })
        })?
        .ok_or_else(|| EmptyInputSnafu.build())?;
    debug!("line {} decrypts with key {:#04x} (score {})", idx, best.key, best.score);
    Ok((idx, best))
}

/// Normalised Hamming distance for every candidate key length, closest
/// first. Equal distances keep ascending key length order.
pub fn rank_key_lengths(buf: &[u8], search: &KeyLengthSearch) -> Result<Vec<(usize, f64)>> {
    ensure!(
        search.min_len > 0 && search.min_len <= search.max_len,
        InvalidKeyLengthSnafu { length: search.min_len }
    );
    ensure!(search.pairs > 0, InvalidKeyLengthSnafu { length: search.max_len });
    ensure!(
        buf.len() >= search.required_len(),
        InsufficientDataSnafu { needed: search.required_len(), available: buf.len() }
    );

    let mut keysizes = (search.min_len..=search.max_len)
        .map(|keysize| -> Result<(usize, f64)> {
            let total = buf.chunks_exact(keysize)
                .take(2 * search.pairs)
                .tuples()
                .map(|(first, second)| common::normalised_hamming_distance(first, second) )
                .sum::<Result<f64>>()?;
            let distance = total / (search.pairs as f64);
            trace!("keysize {} has normalised distance {}", keysize, distance);
            Ok((keysize, distance))
        })
        .collect::<Result<Vec<(usize, f64)>>>()?;
    keysizes.sort_by(|(_, d1), (_, d2)| d1.total_cmp(d2) );
    Ok(keysizes)
}

pub fn estimate_key_length(buf: &[u8], search: &KeyLengthSearch) -> Result<usize> {
    let keysizes = rank_key_lengths(buf, search)?;
    let &(keysize, distance) = keysizes.first()
        .ok_or_else(|| InvalidKeyLengthSnafu { length: search.max_len }.build())?;
    debug!("estimated key length {} (normalised distance {})", keysize, distance);
    Ok(keysize)
}

/// Solves a repeating key XOR of known key length one key position at a
/// time. A trailing partial block still contributes to the leading columns.
pub fn recover_repeating_key(buf: &[u8], keysize: usize, table: &ScoringTable) -> Result<KeyCandidate<Vec<u8>>> {
    ensure!(keysize > 0, InvalidKeyLengthSnafu { length: keysize });
    ensure!(buf.len() >= keysize, InsufficientDataSnafu { needed: keysize, available: buf.len() });

    let blocks: Vec<&[u8]> = buf.chunks(keysize).collect();
    let transposed = util::transpose(&blocks);
    let key = transposed.iter()
        .enumerate()
        .map(|(column, bytes)| -> Result<u8> {
            let candidate = recover_single_byte_key(bytes, table)?;
            if candidate.score <= 0f64 {
                warn!("key position {} has no plausible byte, using {:#04x}", column, candidate.key);
            }
            Ok(candidate.key)
        })
        .collect::<Result<Vec<u8>>>()?;

    let plaintext = xor::repeating_key_xor(buf, &key)?;
    let score = table.score(&plaintext)?;
    Ok(KeyCandidate { key, plaintext, score })
}

/// Tries the `candidates` most likely key lengths and keeps whichever key
/// yields the best scoring plaintext.
pub fn break_repeating_key_xor(
    buf: &[u8],
    table: &ScoringTable,
    search: &KeyLengthSearch,
    candidates: usize,
) -> Result<KeyCandidate<Vec<u8>>> {
    let keysizes = rank_key_lengths(buf, search)?;
    let recovered = keysizes.iter()
        .take(candidates.max(1))
        .map(|&(keysize, _)| recover_repeating_key(buf, keysize, table) );
    let best = itertools::process_results(recovered, |it| it.reduce(better))?
        .ok_or_else(|| InvalidKeyLengthSnafu { length: search.max_len }.build())?;
    debug!("recovered {} byte key (score {})", best.key.len(), best.score);
    Ok(best)
}
