//! Property-based tests for the rank/select structures.

use bitrank::{NaiveRank, NaiveSelect, Rank, RankBitVec, Select, SelectIndex};
use proptest::prelude::*;

fn build_bitvec(bits: &[bool]) -> RankBitVec {
    let mut bitvec = RankBitVec::new(bits.len()).unwrap();
    for (pos, &bit) in bits.iter().enumerate() {
        bitvec.set_bit(pos, bit);
    }
    bitvec.update();
    bitvec
}

proptest! {
    /// rank0(p) + rank1(p) == p
    #[test]
    fn prop_rank_sum(bits in prop::collection::vec(any::<bool>(), 0..3000)) {
        let bitvec = build_bitvec(&bits);
        for pos in 0..=bits.len() {
            prop_assert_eq!(bitvec.rank0(pos) + bitvec.rank1(pos), pos as u64);
        }
    }

    /// rank1 is monotone and steps by at most one.
    #[test]
    fn prop_rank_monotonic(bits in prop::collection::vec(any::<bool>(), 0..3000)) {
        let bitvec = build_bitvec(&bits);

        let mut previous = 0;
        for pos in 0..=bits.len() {
            let rank = bitvec.rank1(pos);
            prop_assert!(rank >= previous && rank <= previous + 1,
                "rank1({}) = {} after {}", pos, rank, previous);
            previous = rank;
        }
    }

    /// rank1 matches the naive oracle everywhere.
    #[test]
    fn prop_rank_matches_naive(bits in prop::collection::vec(any::<bool>(), 1..3000)) {
        let bitvec = build_bitvec(&bits);
        let naive = NaiveRank::new(&bitvec).unwrap();

        for pos in 0..=bits.len() {
            prop_assert_eq!(bitvec.rank1(pos), naive.rank1(pos), "rank1({})", pos);
        }
    }

    /// rank1(i + 1) - rank1(i) == 1 exactly at the set bits.
    #[test]
    fn prop_rank_access_coherence(bits in prop::collection::vec(any::<bool>(), 1..3000)) {
        let bitvec = build_bitvec(&bits);

        for (pos, &bit) in bits.iter().enumerate() {
            prop_assert_eq!(bitvec.is_set(pos), bit);
            prop_assert_eq!(bitvec.rank1(pos + 1) - bitvec.rank1(pos) == 1, bit);
        }
    }

    /// select finds every occurrence at its payload position.
    #[test]
    fn prop_select_matches_naive(bits in prop::collection::vec(any::<bool>(), 1..3000)) {
        let bitvec = build_bitvec(&bits);
        let num_ones = bits.iter().filter(|&&bit| bit).count();

        let select: SelectIndex = SelectIndex::new(&bitvec, num_ones).unwrap();
        let naive = NaiveSelect::new(&bitvec, num_ones).unwrap();

        for rank in 1..=num_ones {
            prop_assert_eq!(select.select1(rank), naive.select1(rank), "select1({})", rank);
        }
        for rank in 1..=bits.len() - num_ones {
            prop_assert_eq!(select.select0(rank), naive.select0(rank), "select0({})", rank);
        }
    }

    /// rank_b(select_b(k)) == k - 1 and the selected bit has value b.
    #[test]
    fn prop_select_is_inverse_of_rank(bits in prop::collection::vec(any::<bool>(), 1..3000)) {
        let bitvec = build_bitvec(&bits);
        let num_ones = bits.iter().filter(|&&bit| bit).count();
        let select: SelectIndex = SelectIndex::new(&bitvec, num_ones).unwrap();

        for rank in 1..=num_ones {
            let pos = select.select1(rank);
            prop_assert!(bitvec.is_set(pos));
            prop_assert_eq!(bitvec.rank1(pos), rank as u64 - 1);
        }
        for rank in 1..=bits.len() - num_ones {
            let pos = select.select0(rank);
            prop_assert!(!bitvec.is_set(pos));
            prop_assert_eq!(bitvec.rank0(pos), rank as u64 - 1);
        }
    }

    /// Narrow and wide block configurations agree on every answer.
    #[test]
    fn prop_configurations_agree(bits in prop::collection::vec(any::<bool>(), 1..2000)) {
        let narrow = build_bitvec(&bits);

        let mut wide = RankBitVec::<1024, 15>::new(bits.len()).unwrap();
        for (pos, &bit) in bits.iter().enumerate() {
            wide.set_bit(pos, bit);
        }
        wide.update();

        for pos in 0..=bits.len() {
            prop_assert_eq!(narrow.rank1(pos), wide.rank1(pos), "rank1({})", pos);
        }

        let num_ones = bits.iter().filter(|&&bit| bit).count();
        let narrow_select: SelectIndex = SelectIndex::new(&narrow, num_ones).unwrap();
        let wide_select = SelectIndex::<1024, 15, false, 8192>::new(&wide, num_ones).unwrap();
        for rank in 1..=num_ones {
            prop_assert_eq!(narrow_select.select1(rank), wide_select.select1(rank));
        }
    }

    /// Writing one bit never disturbs another.
    #[test]
    fn prop_mutation_isolation(
        bits in prop::collection::vec(any::<bool>(), 2..2000),
        flip_ratio in 0.0..1.0f64,
    ) {
        let mut bitvec = build_bitvec(&bits);
        let flip = (flip_ratio * (bits.len() - 1) as f64) as usize;

        bitvec.set_bit(flip, !bits[flip]);

        for (pos, &bit) in bits.iter().enumerate() {
            let expected = if pos == flip { !bit } else { bit };
            prop_assert_eq!(bitvec.is_set(pos), expected, "pos={}", pos);
        }
    }
}
