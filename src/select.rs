//! Sampled select over a rank-combined bit vector.
//!
//! For every `STRIDE`-th one and zero the structure records which superblock
//! contains that occurrence. A query then only has to search the short
//! window between two consecutive samples: first over superblock prefixes,
//! then over the block headers inside the winning superblock, then a word
//! scan and an intra-word select. For the default stride of 32768 the
//! samples add ~0.2% on top of the bit vector.

use crate::Select;
use crate::broadword::{prefetch, select_in_word, setbits};
use crate::popcount::popcount_word;
use crate::rank::RankBitVec;
use crate::storage::{AllocError, FixedWords};

/// Select support for a [`RankBitVec`].
///
/// Holds a borrow of its bit vector; the vector must outlive the index.
/// `BINARY_SEARCH` switches the superblock and block searches between a
/// branch-free prefetching binary search and a linear scan. `STRIDE` is the
/// sampling period in occurrences and must be a power of two.
///
/// The sample arrays are sized from the one/zero counts at construction.
/// Mutating the vector so that those counts change requires a fresh index;
/// [`update`](Self::update) alone only re-derives the samples for a payload
/// with the same counts.
#[derive(Debug)]
pub struct SelectIndex<
    'a,
    const BLOCK_WIDTH: usize = 512,
    const HEADER_WIDTH: usize = 14,
    const BINARY_SEARCH: bool = true,
    const STRIDE: usize = 32768,
> {
    bitvec: &'a RankBitVec<BLOCK_WIDTH, HEADER_WIDTH>,
    zero_samples: FixedWords,
    one_samples: FixedWords,
}

impl<'a, const B: usize, const H: usize, const BINARY_SEARCH: bool, const STRIDE: usize>
    SelectIndex<'a, B, H, BINARY_SEARCH, STRIDE>
{
    const BLOCK_DATA_WIDTH: usize = RankBitVec::<B, H>::BLOCK_DATA_WIDTH;
    const WORDS_PER_BLOCK: usize = RankBitVec::<B, H>::WORDS_PER_BLOCK;
    const BLOCKS_PER_SUPERBLOCK: usize = RankBitVec::<B, H>::BLOCKS_PER_SUPERBLOCK;
    const SUPERBLOCK_DATA_WIDTH: usize = RankBitVec::<B, H>::SUPERBLOCK_DATA_WIDTH;

    const STRIDE_OK: () = assert!(STRIDE.is_power_of_two(), "stride must be a power of two");

    /// Builds a select index for `bitvec`, whose rank tables must be
    /// up to date and which must contain exactly `num_ones` one-bits.
    pub fn new(
        bitvec: &'a RankBitVec<B, H>,
        num_ones: usize,
    ) -> Result<Self, AllocError> {
        let () = Self::STRIDE_OK;

        // One slot per stride plus the trailing sentinel.
        let num_zeros = bitvec.length() - num_ones;
        let mut index = Self {
            bitvec,
            zero_samples: FixedWords::new(num_zeros / STRIDE + 2)?,
            one_samples: FixedWords::new(num_ones / STRIDE + 2)?,
        };
        index.update();

        Ok(index)
    }

    /// Re-derives the samples from the bit vector's current payload.
    pub fn update(&mut self) {
        if self.bitvec.length() == 0 {
            return;
        }

        let mut cur_one = 0usize;
        let mut cur_zero = 0usize;

        let mut total_ones = 0usize;
        let mut total_zeros = 0usize;

        let mut threshold_one = 0usize;
        let mut threshold_zero = 0usize;

        let num_blocks = self.bitvec.num_blocks();
        for num_block in 0..num_blocks {
            let ones = self.bitvec.block_popcount(num_block) as usize;
            let zeros = if num_block == num_blocks - 1 {
                // The unused tail of the last block is padding, not zeros.
                let padding = num_blocks * Self::BLOCK_DATA_WIDTH - self.bitvec.length();
                Self::BLOCK_DATA_WIDTH - ones - padding
            } else {
                Self::BLOCK_DATA_WIDTH - ones
            };

            total_ones += ones;
            total_zeros += zeros;

            let num_superblock =
                ((num_block * Self::BLOCK_DATA_WIDTH) / Self::SUPERBLOCK_DATA_WIDTH) as u64;

            // Sample k marks the superblock holding the (k * STRIDE + 1)-th
            // occurrence; the first non-empty block emits sample 0 for both.
            while total_ones >= threshold_one {
                self.one_samples[cur_one] = num_superblock;
                cur_one += 1;
                threshold_one += STRIDE;
            }
            while total_zeros >= threshold_zero {
                self.zero_samples[cur_zero] = num_superblock;
                cur_zero += 1;
                threshold_zero += STRIDE;
            }
        }

        // One more sample each, so "the next sample" exists for occurrences
        // in the last window.
        let last_superblock = (self.bitvec.num_superblocks() - 1) as u64;
        self.one_samples[cur_one] = last_superblock;
        self.zero_samples[cur_zero] = last_superblock;

        tracing::debug!(
            one_samples = cur_one + 1,
            zero_samples = cur_zero + 1,
            "select samples rebuilt"
        );
    }

    /// Position of the `rank`-th one. Requires `1 <= rank <= num_ones`.
    pub fn select1(&self, mut rank: usize) -> usize {
        debug_assert!(rank >= 1);

        // Phase 1: the window of superblocks between the nearest samples.
        let nearest_sample = (rank - 1) / STRIDE;
        let mut num_superblock = self.one_samples[nearest_sample] as usize;
        let last_superblock = self.one_samples[nearest_sample + 1] as usize;

        // Phase 2: the superblock holding the rank-th one.
        let superblock_ranks = self.bitvec.superblock_ranks();
        if BINARY_SEARCH {
            let mut length = last_superblock - num_superblock + 1;
            while length > 1 {
                let half = length / 2;
                length -= half;

                // The conditional move below denies the branch predictor its
                // speculative loads, so fetch both next candidates by hand.
                prefetch(&superblock_ranks[num_superblock + length / 2]);
                prefetch(&superblock_ranks[num_superblock + length / 2 + half]);

                num_superblock +=
                    usize::from((superblock_ranks[num_superblock + half] as usize) < rank) * half;
            }
        } else {
            while num_superblock < last_superblock
                && (superblock_ranks[num_superblock + 1] as usize) < rank
            {
                num_superblock += 1;
            }
        }
        rank -= superblock_ranks[num_superblock] as usize;

        // Phase 3: the block within the superblock. Block headers hold the
        // number of ones before the block within its superblock.
        let words = self.bitvec.words();
        let block_rank =
            |num_block: usize| (words[num_block * Self::WORDS_PER_BLOCK] & setbits(H, 0)) as usize;

        let mut num_block = num_superblock * Self::BLOCKS_PER_SUPERBLOCK;
        if BINARY_SEARCH {
            let mut length = Self::BLOCKS_PER_SUPERBLOCK;
            while length > 1 {
                let half = length / 2;
                length -= half;

                prefetch(&words[(num_block + length / 2) * Self::WORDS_PER_BLOCK]);
                prefetch(&words[(num_block + length / 2 + half) * Self::WORDS_PER_BLOCK]);

                num_block += usize::from(block_rank(num_block + half) < rank) * half;
            }
        } else {
            let last_block = self
                .bitvec
                .num_blocks()
                .min((num_superblock + 1) * Self::BLOCKS_PER_SUPERBLOCK)
                - 1;
            while num_block < last_block && block_rank(num_block + 1) < rank {
                num_block += 1;
            }
        }
        rank -= block_rank(num_block);

        // Phase 4: the word within the block. The first word only counts its
        // payload bits; this jump is perfectly predictable, so no cmov.
        let block = &words[num_block * Self::WORDS_PER_BLOCK..];
        let mut num_word = 0usize;
        loop {
            let word_rank = if num_word == 0 {
                popcount_word(block[0] >> H) as usize
            } else {
                popcount_word(block[num_word]) as usize
            };

            if word_rank >= rank {
                break;
            }
            rank -= word_rank;
            num_word += 1;
        }

        // Phase 5: intra-word select, with the header cleared out of the
        // first word so its rank bits are not mistaken for payload.
        let word = if num_word == 0 {
            block[0] & !setbits(H, 0)
        } else {
            block[num_word]
        };

        num_block * Self::BLOCK_DATA_WIDTH + num_word * 64 + select_in_word(word, rank) - H
    }

    /// Position of the `rank`-th zero. Requires `1 <= rank <= num_zeros`.
    ///
    /// Mirrors [`select1`](Self::select1), with the rank of a structural
    /// unit holding `m` payload bits computed as `m - ones` instead.
    pub fn select0(&self, mut rank: usize) -> usize {
        debug_assert!(rank >= 1);

        let nearest_sample = (rank - 1) / STRIDE;
        let mut num_superblock = self.zero_samples[nearest_sample] as usize;
        let last_superblock = self.zero_samples[nearest_sample + 1] as usize;

        let superblock_ranks = self.bitvec.superblock_ranks();
        let superblock_zeros = |num_superblock: usize| {
            num_superblock * Self::SUPERBLOCK_DATA_WIDTH
                - superblock_ranks[num_superblock] as usize
        };

        if BINARY_SEARCH {
            let mut length = last_superblock - num_superblock + 1;
            while length > 1 {
                let half = length / 2;
                length -= half;

                prefetch(&superblock_ranks[num_superblock + length / 2]);
                prefetch(&superblock_ranks[num_superblock + length / 2 + half]);

                num_superblock += usize::from(superblock_zeros(num_superblock + half) < rank) * half;
            }
        } else {
            while num_superblock < last_superblock
                && superblock_zeros(num_superblock + 1) < rank
            {
                num_superblock += 1;
            }
        }
        rank -= superblock_zeros(num_superblock);

        let words = self.bitvec.words();
        let block_zeros = |num_block: usize| {
            let header = (words[num_block * Self::WORDS_PER_BLOCK] & setbits(H, 0)) as usize;
            (num_block % Self::BLOCKS_PER_SUPERBLOCK) * Self::BLOCK_DATA_WIDTH - header
        };

        let mut num_block = num_superblock * Self::BLOCKS_PER_SUPERBLOCK;
        if BINARY_SEARCH {
            let mut length = Self::BLOCKS_PER_SUPERBLOCK;
            while length > 1 {
                let half = length / 2;
                length -= half;

                prefetch(&words[(num_block + length / 2) * Self::WORDS_PER_BLOCK]);
                prefetch(&words[(num_block + length / 2 + half) * Self::WORDS_PER_BLOCK]);

                num_block += usize::from(block_zeros(num_block + half) < rank) * half;
            }
        } else {
            let last_block = self
                .bitvec
                .num_blocks()
                .min((num_superblock + 1) * Self::BLOCKS_PER_SUPERBLOCK)
                - 1;
            while num_block < last_block && block_zeros(num_block + 1) < rank {
                num_block += 1;
            }
        }
        rank -= block_zeros(num_block);

        // Word scan counting zeros; the header bits are forced to one so
        // they never count.
        let block = &words[num_block * Self::WORDS_PER_BLOCK..];
        let mut num_word = 0usize;
        loop {
            let word_rank = if num_word == 0 {
                popcount_word(!(block[0] | setbits(H, 0))) as usize
            } else {
                popcount_word(!block[num_word]) as usize
            };

            if word_rank >= rank {
                break;
            }
            rank -= word_rank;
            num_word += 1;
        }

        let word = if num_word == 0 {
            block[0] | setbits(H, 0)
        } else {
            block[num_word]
        };

        num_block * Self::BLOCK_DATA_WIDTH + num_word * 64 + select_in_word(!word, rank) - H
    }

    /// Heap footprint of the sample arrays, in bits.
    #[inline]
    pub fn memory_space_bits(&self) -> usize {
        (self.zero_samples.len() + self.one_samples.len()) * 64
    }
}

impl<const B: usize, const H: usize, const BIN: bool, const STRIDE: usize> Select
    for SelectIndex<'_, B, H, BIN, STRIDE>
{
    #[inline]
    fn select0(&self, rank: usize) -> usize {
        SelectIndex::select0(self, rank)
    }

    #[inline]
    fn select1(&self, rank: usize) -> usize {
        SelectIndex::select1(self, rank)
    }
}
