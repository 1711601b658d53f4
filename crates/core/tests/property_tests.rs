//! Property-based tests for the encoder's invariants.

mod common;

use common::decode;
use parhuff_core::{
    chunk::split_even,
    frequency::{FrequencyCounter, FrequencyTable},
    huffman::CodeBuilder,
    pool::encode_chunks,
    Artifact, ChunkPlan, Encoder, EncoderConfig,
};
use proptest::prelude::*;
use std::sync::Arc;

fn config(workers: usize, chunks: usize) -> EncoderConfig {
    EncoderConfig {
        counting_workers: workers,
        encoding_workers: workers,
        chunking: ChunkPlan::Count(chunks),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_round_trip(
        data in prop::collection::vec(any::<u8>(), 0..4096),
        workers in 1usize..6,
        chunks in 1usize..20,
    ) {
        let compressed = Encoder::new(config(workers, chunks))
            .unwrap()
            .compress(&data)
            .unwrap();
        let parsed = Artifact::from_bytes(&compressed.artifact.to_bytes()).unwrap();

        prop_assert_eq!(parsed.original_len, data.len() as u64);
        prop_assert_eq!(decode(&parsed), data);
    }

    #[test]
    fn prop_round_trip_small_alphabet(
        data in prop::collection::vec(0u8..4, 1..4096),
        chunks in 1usize..20,
    ) {
        let artifact = Encoder::new(config(3, chunks))
            .unwrap()
            .compress(&data)
            .unwrap()
            .artifact;
        prop_assert_eq!(decode(&artifact), data);
    }

    #[test]
    fn prop_codes_are_prefix_free(
        data in prop::collection::vec(any::<u8>(), 1..2048),
    ) {
        let table = FrequencyTable::from_bytes(&data);
        let (_, codes) = CodeBuilder::build(&table).unwrap();

        prop_assert!(codes.is_prefix_free());
        prop_assert_eq!(codes.len(), table.distinct());
        prop_assert!(codes.iter().all(|(_, c)| c.len() >= 1));
    }

    #[test]
    fn prop_code_construction_deterministic(
        data in prop::collection::vec(any::<u8>(), 0..2048),
    ) {
        let table = FrequencyTable::from_bytes(&data);
        let (_, first) = CodeBuilder::build(&table).unwrap();
        let (_, second) = CodeBuilder::build(&table.clone()).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_frequency_invariant_to_chunking(
        data in prop::collection::vec(any::<u8>(), 0..4096),
        chunks in 1usize..40,
        workers in 1usize..8,
    ) {
        let input: Arc<[u8]> = Arc::from(data.as_slice());
        let table = FrequencyCounter::new(workers).unwrap().count(&split_even(input, chunks));

        prop_assert_eq!(table.total(), data.len() as u64);
        prop_assert_eq!(table, FrequencyTable::from_bytes(&data));
    }

    #[test]
    fn prop_encoding_invariant_to_pool_size(
        data in prop::collection::vec(any::<u8>(), 1..4096),
        chunks in 1usize..20,
        workers in 2usize..8,
    ) {
        let input: Arc<[u8]> = Arc::from(data.as_slice());
        let (_, codes) = CodeBuilder::build(&FrequencyTable::from_bytes(&data)).unwrap();
        let codes = Arc::new(codes);

        let single = encode_chunks(split_even(Arc::clone(&input), chunks), Arc::clone(&codes), 1).unwrap();
        let pooled = encode_chunks(split_even(input, chunks), codes, workers).unwrap();
        prop_assert_eq!(single, pooled);
    }

    #[test]
    fn prop_payload_size_matches_code_lengths(
        data in prop::collection::vec(any::<u8>(), 0..4096),
    ) {
        let table = FrequencyTable::from_bytes(&data);
        let (_, codes) = CodeBuilder::build(&table).unwrap();
        let artifact = Encoder::new(config(2, 4)).unwrap().compress(&data).unwrap().artifact;

        prop_assert_eq!(artifact.bit_len(), codes.encoded_bits(&table));
        prop_assert_eq!(artifact.payload.len() as u64, artifact.bit_len().div_ceil(8));
    }
}
