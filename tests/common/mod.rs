//! Shared builders for the integration suites.

#![allow(dead_code)]

use bitrank::RankBitVec;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Lengths crossing the word, block and superblock boundaries of the
/// default configuration, plus a multi-superblock size.
pub const LENGTHS: &[usize] = &[0, 1, 63, 64, 65, 511, 512, 513, 16383, 16384, 16385];

/// The large length used for the heavyweight end-to-end checks.
pub const LARGE_LENGTH: usize = (1 << 22) + 7;

/// A vector with bit `pos` set iff `pos % period == 0`, tables built.
pub fn alternating_bitvec<const B: usize, const H: usize>(
    length: usize,
    period: usize,
) -> RankBitVec<B, H> {
    let mut bitvec = RankBitVec::new(length).unwrap();
    for pos in 0..length {
        bitvec.set_bit(pos, pos % period == 0);
    }
    bitvec.update();
    bitvec
}

/// A Bernoulli-filled vector, tables built.
pub fn random_bitvec<const B: usize, const H: usize>(
    length: usize,
    fill_ratio: f64,
    seed: u64,
) -> RankBitVec<B, H> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut bitvec = RankBitVec::new(length).unwrap();
    for pos in 0..length {
        bitvec.set_bit(pos, rng.gen_bool(fill_ratio));
    }
    bitvec.update();
    bitvec
}

/// Ones counted bit by bit, independent of the rank tables.
pub fn count_ones<const B: usize, const H: usize>(bitvec: &RankBitVec<B, H>) -> usize {
    (0..bitvec.length())
        .filter(|&pos| bitvec.is_set(pos))
        .count()
}
