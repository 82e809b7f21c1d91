//! Memref descriptor layout and flat-buffer encode/decode (spec.md §4.3,
//! "Memref decoding").

/// `words(R) = 3 + 2R`: `[allocated, aligned, offset, sizes[R], strides[R]]`.
pub const fn memref_words(rank: u32) -> usize {
    3 + 2 * rank as usize
}

/// Total output words for one result, accounting for the triple-memref +
/// local-offsets encoding used for distributed, non-scalar arrays
/// (spec.md §4.3). For local arrays and 0-rank arrays this is just
/// `memref_words(rank)`; for distributed arrays (rank 0 or more) it is
/// three data memrefs (left halo, local data, right halo) plus one 1-D
/// `uint64` memref of local offsets.
pub const fn ptensor_words(rank: u32, is_distributed: bool) -> usize {
    if is_distributed {
        3 * memref_words(rank) + memref_words(1)
    } else {
        memref_words(rank)
    }
}

/// A decoded memref descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Memref {
    pub allocated: usize,
    pub aligned: usize,
    pub offset: usize,
    pub sizes: Vec<usize>,
    pub strides: Vec<usize>,
}

impl Memref {
    pub fn rank(&self) -> u32 {
        self.sizes.len() as u32
    }
}

/// Decode one memref of `rank` from the front of `words`, returning the
/// decoded memref and the remaining slice.
pub fn decode_memref(words: &[usize], rank: u32) -> (Memref, &[usize]) {
    let rank = rank as usize;
    let needed = memref_words(rank as u32);
    assert!(
        words.len() >= needed,
        "memref decode underrun: need {needed} words, have {}",
        words.len()
    );
    let allocated = words[0];
    let aligned = words[1];
    let offset = words[2];
    let sizes = words[3..3 + rank].to_vec();
    let strides = words[3 + rank..3 + 2 * rank].to_vec();
    (
        Memref {
            allocated,
            aligned,
            offset,
            sizes,
            strides,
        },
        &words[needed..],
    )
}

/// Encode a memref back to its flat word form (used by tests that
/// fabricate output buffers, and by `NullBackend`).
pub fn encode_memref(m: &Memref, out: &mut Vec<usize>) {
    out.push(m.allocated);
    out.push(m.aligned);
    out.push(m.offset);
    out.extend_from_slice(&m.sizes);
    out.extend_from_slice(&m.strides);
}

/// The fully decoded result of one output slot: either a single memref
/// (local/0-rank) or the distributed triple + local-offsets memref.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedResult {
    Local(Memref),
    Distributed {
        left_halo: Memref,
        local: Memref,
        right_halo: Memref,
        local_offsets: Memref,
    },
}

/// Decode one result (spec.md §4.3's "Memref decoding") from the front of
/// `words`, returning the decoded result and the remaining slice.
pub fn decode_result(words: &[usize], rank: u32, is_distributed: bool) -> (DecodedResult, &[usize]) {
    if is_distributed {
        let (left_halo, rest) = decode_memref(words, rank);
        let (local, rest) = decode_memref(rest, rank);
        let (right_halo, rest) = decode_memref(rest, rank);
        let (local_offsets, rest) = decode_memref(rest, 1);
        (
            DecodedResult::Distributed {
                left_halo,
                local,
                right_halo,
                local_offsets,
            },
            rest,
        )
    } else {
        let (m, rest) = decode_memref(words, rank);
        (DecodedResult::Local(m), rest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memref_words_formula() {
        assert_eq!(memref_words(0), 3);
        assert_eq!(memref_words(1), 5);
        assert_eq!(memref_words(4), 11);
    }

    #[test]
    fn ptensor_words_local_matches_memref_words() {
        assert_eq!(ptensor_words(2, false), memref_words(2));
        assert_eq!(ptensor_words(0, false), memref_words(0));
    }

    #[test]
    fn ptensor_words_distributed_is_triple_plus_offsets() {
        // 3 data memrefs of rank 1 + one rank-1 offsets memref.
        assert_eq!(ptensor_words(1, true), 3 * memref_words(1) + memref_words(1));
    }

    #[test]
    fn decode_memref_round_trips_encode() {
        let m = Memref {
            allocated: 0x1000,
            aligned: 0x1000,
            offset: 0,
            sizes: vec![10, 20],
            strides: vec![20, 1],
        };
        let mut words = Vec::new();
        encode_memref(&m, &mut words);
        assert_eq!(words.len(), memref_words(2));
        let (decoded, rest) = decode_memref(&words, 2);
        assert_eq!(decoded, m);
        assert!(rest.is_empty());
    }

    #[test]
    fn decode_result_consumes_exact_local_word_count() {
        let m = Memref {
            allocated: 1,
            aligned: 1,
            offset: 0,
            sizes: vec![10],
            strides: vec![1],
        };
        let mut words = Vec::new();
        encode_memref(&m, &mut words);
        words.push(0xdead); // trailing word belonging to the next result
        let (decoded, rest) = decode_result(&words, 1, false);
        assert_eq!(decoded, DecodedResult::Local(m));
        assert_eq!(rest, &[0xdead]);
    }

    #[test]
    fn decode_result_distributed_consumes_exact_word_count() {
        let data = Memref {
            allocated: 1,
            aligned: 1,
            offset: 0,
            sizes: vec![5],
            strides: vec![1],
        };
        let offsets = Memref {
            allocated: 2,
            aligned: 2,
            offset: 0,
            sizes: vec![1],
            strides: vec![1],
        };
        let mut words = Vec::new();
        encode_memref(&data, &mut words); // left halo
        encode_memref(&data, &mut words); // local
        encode_memref(&data, &mut words); // right halo
        encode_memref(&offsets, &mut words); // local offsets
        assert_eq!(words.len(), ptensor_words(1, true));

        let (decoded, rest) = decode_result(&words, 1, true);
        assert!(rest.is_empty());
        match decoded {
            DecodedResult::Distributed {
                left_halo,
                local,
                right_halo,
                local_offsets,
            } => {
                assert_eq!(left_halo, data);
                assert_eq!(local, data);
                assert_eq!(right_halo, data);
                assert_eq!(local_offsets, offsets);
            }
            other => panic!("expected Distributed, got {other:?}"),
        }
    }
}
