//! Shared helpers for transport integration tests.

#![allow(dead_code)]

use bytes::Bytes;
use formstream_core::{Boundary, Part};
use formstream_protocol::MultipartBuilder;
use tracing_subscriber::EnvFilter;

pub const TEST_BOUNDARY: &str = "----formstreamTransportBoundary42";

/// Install a test-writer subscriber once; honours `RUST_LOG`
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn boundary() -> Boundary {
    Boundary::new(TEST_BOUNDARY).expect("test boundary is valid")
}

/// Parts used by most tests: a text field, a file and an empty field
pub fn sample_parts() -> Vec<Part> {
    vec![
        Part::new("username", "marmota"),
        Part::new("avatar", vec![0xAB; 64 * 1024])
            .with_filename("avatar.png")
            .with_content_type("image/png"),
        Part::new("bio", ""),
    ]
}

pub fn sample_body() -> Bytes {
    MultipartBuilder::new(boundary())
        .parts(sample_parts())
        .expect("sample parts are encodable")
        .build()
}
