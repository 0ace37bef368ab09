//! Property-based tests for the multipart parser.
//!
//! These tests use proptest to generate random part sets and random ways of
//! fragmenting their encoded bodies, and check that decoding does not depend
//! on where the chunk boundaries fall.

mod common;

use common::PartTuple;
use formstream_core::{DecoderConfig, Error};
use proptest::prelude::*;

/// Strategy for field names (no quotes or line breaks; backslashes allowed).
fn valid_name() -> impl Strategy<Value = String> {
    prop::string::string_regex(r"[a-zA-Z0-9_\\\[\]-]{1,20}")
        .expect("Failed to create name regex strategy")
}

/// Strategy for optional filenames.
fn valid_filename() -> impl Strategy<Value = Option<String>> {
    prop::option::of(
        prop::string::string_regex(r"[a-zA-Z0-9 _.;\\-]{1,24}")
            .expect("Failed to create filename regex strategy"),
    )
}

/// Strategy for optional media types.
fn valid_content_type() -> impl Strategy<Value = Option<String>> {
    prop::option::of(prop_oneof![
        Just("text/plain".to_string()),
        Just("application/octet-stream".to_string()),
        Just("image/png".to_string()),
        Just("text/html; charset=utf-8".to_string()),
    ])
}

/// Strategy for payloads, biased towards protocol-looking bytes.
fn valid_payload() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(
        prop_oneof![
            4 => any::<u8>(),
            1 => Just(b'\r'),
            1 => Just(b'\n'),
            1 => Just(b'-'),
        ],
        0..512,
    )
}

fn valid_part() -> impl Strategy<Value = PartTuple> {
    (valid_name(), valid_filename(), valid_content_type(), valid_payload())
}

fn valid_parts() -> impl Strategy<Value = Vec<PartTuple>> {
    prop::collection::vec(valid_part(), 0..6)
}

proptest! {
    /// Property: encoding tuples and decoding the body reproduces them exactly.
    #[test]
    fn prop_roundtrip(tuples in valid_parts()) {
        let body = common::body_from_tuples(&tuples);
        let parts = common::decode_whole(&body).unwrap();

        prop_assert_eq!(parts.len(), tuples.len());
        for (part, (name, filename, content_type, payload)) in parts.iter().zip(&tuples) {
            prop_assert_eq!(part.name(), name.as_str());
            prop_assert_eq!(part.filename(), filename.as_deref());
            prop_assert_eq!(part.content_type(), content_type.as_deref());
            prop_assert_eq!(part.payload().as_ref(), payload.as_slice());
        }
    }

    /// Property: any fragmentation of the body decodes to the same parts.
    #[test]
    fn prop_chunk_boundary_independence(
        tuples in valid_parts(),
        cuts in prop::collection::vec(any::<prop::sample::Index>(), 0..16),
    ) {
        let body = common::body_from_tuples(&tuples);
        let mut offsets: Vec<usize> = cuts.iter().map(|i| i.index(body.len() + 1)).collect();
        offsets.sort_unstable();

        let whole = common::decode_whole(&body).unwrap();
        let split = common::decode_split(&body, &offsets).unwrap();
        prop_assert_eq!(split, whole);
    }

    /// Property: buffer sizing never changes the decoded result.
    #[test]
    fn prop_growth_increment_independence(
        tuples in valid_parts(),
        increment in 1usize..64,
        chunk in 1usize..97,
    ) {
        let body = common::body_from_tuples(&tuples);
        let config = DecoderConfig::new().initial_capacity(0).growth_increment(increment);
        let cuts: Vec<usize> = (chunk..body.len()).step_by(chunk).collect();

        let expected = common::decode_whole(&body).unwrap();
        let parts = common::decode_split_with(&body, &cuts, &config).unwrap();
        prop_assert_eq!(parts, expected);
    }

    /// Property: any strict prefix missing the terminal delimiter is unterminated.
    #[test]
    fn prop_truncated_body_is_unterminated(
        tuples in valid_parts(),
        cut in any::<prop::sample::Index>(),
    ) {
        let body = common::body_from_tuples(&tuples);
        // The trailing CRLF after "--boundary--" is optional
        let cut = cut.index(body.len() - 2);

        let result = common::decode_whole(&body[..cut]);
        prop_assert!(matches!(result, Err(Error::UnterminatedBody)), "cut at {}", cut);
    }
}

#[test]
fn test_every_two_way_split_of_multi_part_body() {
    let tuples: Vec<PartTuple> = vec![
        ("text".into(), None, None, b"plain value".to_vec()),
        (
            "file".into(),
            Some("x.txt".into()),
            Some("text/plain".into()),
            b"line\r\n--almost\r\n".to_vec(),
        ),
        ("empty".into(), None, None, Vec::new()),
    ];
    let body = common::body_from_tuples(&tuples);
    let whole = common::decode_whole(&body).unwrap();
    assert_eq!(whole.len(), 3);

    for split in 0..=body.len() {
        assert_eq!(common::decode_split(&body, &[split]).unwrap(), whole, "split at {split}");
    }
}

#[test]
fn test_byte_by_byte_matches_whole() {
    let tuples: Vec<PartTuple> = vec![
        ("a".into(), None, None, b"1".to_vec()),
        ("b".into(), Some("b.bin".into()), None, vec![0, 13, 10, 45, 45, 255]),
    ];
    let body = common::body_from_tuples(&tuples);

    assert_eq!(
        common::decode_chunked(&body, 1).unwrap(),
        common::decode_whole(&body).unwrap()
    );
}

#[test]
fn test_large_payload_exceeds_growth_increment() {
    let payload: Vec<u8> = (0..(4 * 1024 * 1024 + 123)).map(|i| (i % 251) as u8).collect();
    let tuples: Vec<PartTuple> = vec![(
        "big".into(),
        Some("big.bin".into()),
        Some("application/octet-stream".into()),
        payload.clone(),
    )];
    let body = common::body_from_tuples(&tuples);

    let parts = common::decode_chunked(&body, 256 * 1024).unwrap();
    assert_eq!(parts.len(), 1);
    assert_eq!(parts[0].len(), payload.len());
    assert_eq!(parts[0].payload().as_ref(), payload.as_slice());
}
