mod common;

use agires::lzw;
use common::lzw_compress;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use test_log::test;

fn check(payload: &[u8]) {
    let packed = lzw_compress(payload);
    let expanded = lzw::expand(&packed, payload.len()).unwrap();
    assert_eq!(expanded, payload, "{} byte payload", payload.len());
}

#[test]
fn random_bytes_expand_unchanged() {
    let mut rng = StdRng::seed_from_u64(0x4147_4921);
    for len in [1usize, 2, 17, 300, 4000, 20000] {
        let payload: Vec<u8> = (0..len).map(|_| rng.gen()).collect();
        check(&payload);
    }
}

#[test]
fn small_alphabets_fill_the_dictionary() {
    let mut rng = StdRng::seed_from_u64(7);
    for alphabet in [2u8, 4, 16] {
        let payload: Vec<u8> = (0..30000).map(|_| rng.gen_range(0..alphabet)).collect();
        check(&payload);
    }
}

#[test]
fn long_runs_expand_unchanged() {
    check(&[0u8; 5000]);
    let stripes: Vec<u8> = (0..8000u32).map(|i| (i / 100) as u8).collect();
    check(&stripes);
}

#[test]
fn capacity_limits_the_output() {
    let payload: Vec<u8> = (0..1000u32).map(|i| (i % 97) as u8).collect();
    let packed = lzw_compress(&payload);
    assert_eq!(lzw::expand(&packed, 400).unwrap(), &payload[..400]);
    assert!(matches!(
        lzw::expand(&packed, 1200),
        Err(agires::ResourceError::Truncated {
            expected: 1200,
            produced: 1000
        })
    ));
}
