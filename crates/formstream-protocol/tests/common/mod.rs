//! Common test utilities for protocol integration tests.
//!
//! Helpers fall into two groups:
//!
//! 1. **Body helpers** (`body_*`) - Build wire bodies from part tuples
//! 2. **Decode helpers** (`decode_*`) - Run the parser over a body split in a given way
//!
//! Every decode helper goes through `MultipartParser::feed` and `finish`, so
//! the same assertions apply no matter how the input was fragmented.

#![allow(dead_code)]

use formstream_core::{Boundary, DecoderConfig, Part, Result};
use formstream_protocol::{MultipartParser, format_body};

/// Boundary long enough that random payloads never contain it.
pub const TEST_BOUNDARY: &str = "----formstreamTestBoundary9f8e7d6c5b4a";

pub fn boundary() -> Boundary {
    Boundary::new(TEST_BOUNDARY).expect("test boundary is valid")
}

/// One part as `(name, filename, content_type, payload)`.
pub type PartTuple = (String, Option<String>, Option<String>, Vec<u8>);

pub fn to_part((name, filename, content_type, payload): &PartTuple) -> Part {
    let mut part = Part::new(name.clone(), payload.clone());
    if let Some(filename) = filename {
        part = part.with_filename(filename.clone());
    }
    if let Some(content_type) = content_type {
        part = part.with_content_type(content_type.clone());
    }
    part
}

/// Encode tuples into a valid body under [`TEST_BOUNDARY`].
pub fn body_from_tuples(tuples: &[PartTuple]) -> Vec<u8> {
    let parts: Vec<Part> = tuples.iter().map(to_part).collect();
    format_body(&boundary(), &parts)
        .expect("generated parts are encodable")
        .to_vec()
}

/// Decode a body delivered as a single chunk.
pub fn decode_whole(body: &[u8]) -> Result<Vec<Part>> {
    decode_split(body, &[])
}

/// Decode a body cut at the given (sorted) offsets.
pub fn decode_split(body: &[u8], cuts: &[usize]) -> Result<Vec<Part>> {
    decode_split_with(body, cuts, &DecoderConfig::default())
}

pub fn decode_split_with(body: &[u8], cuts: &[usize], config: &DecoderConfig) -> Result<Vec<Part>> {
    let mut parser = MultipartParser::with_config(boundary(), config);
    let mut start = 0;
    for &cut in cuts {
        let cut = cut.clamp(start, body.len());
        parser.feed(&body[start..cut])?;
        start = cut;
    }
    parser.feed(&body[start..])?;
    parser.finish()
}

/// Decode a body in fixed-size chunks.
pub fn decode_chunked(body: &[u8], chunk_size: usize) -> Result<Vec<Part>> {
    let mut parser = MultipartParser::new(boundary());
    for chunk in body.chunks(chunk_size.max(1)) {
        parser.feed(chunk)?;
    }
    parser.finish()
}
