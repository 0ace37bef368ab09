//! Decoder configuration.
//!
//! The defaults reproduce the unbounded behaviour of the decoder: a 4 MiB
//! growth step and no part size or part count limits. Hosts that embed the
//! decoder usually deserialize this from their own configuration file.
//!
//! ```
//! use formstream_core::DecoderConfig;
//!
//! let config = DecoderConfig::new()
//!     .max_part_size(10 * 1024 * 1024)
//!     .max_parts(100);
//!
//! assert_eq!(config.max_part_size, Some(10 * 1024 * 1024));
//! ```

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_GROWTH_INCREMENT, DEFAULT_INITIAL_CAPACITY};

/// Tuning knobs for one decode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecoderConfig {
    /// First buffer allocation in bytes.
    pub initial_capacity: usize,

    /// Fixed buffer growth step in bytes.
    pub growth_increment: usize,

    /// Largest accepted part payload, if any.
    pub max_part_size: Option<usize>,

    /// Largest accepted number of parts, if any.
    pub max_parts: Option<usize>,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            initial_capacity: DEFAULT_INITIAL_CAPACITY,
            growth_increment: DEFAULT_GROWTH_INCREMENT,
            max_part_size: None,
            max_parts: None,
        }
    }
}

impl DecoderConfig {
    /// Create a configuration with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the initial buffer capacity.
    #[must_use]
    pub fn initial_capacity(mut self, bytes: usize) -> Self {
        self.initial_capacity = bytes;
        self
    }

    /// Set the buffer growth increment. Zero is treated as one byte.
    #[must_use]
    pub fn growth_increment(mut self, bytes: usize) -> Self {
        self.growth_increment = bytes;
        self
    }

    /// Reject parts whose payload exceeds `bytes`.
    #[must_use]
    pub fn max_part_size(mut self, bytes: usize) -> Self {
        self.max_part_size = Some(bytes);
        self
    }

    /// Reject bodies with more than `count` parts.
    #[must_use]
    pub fn max_parts(mut self, count: usize) -> Self {
        self.max_parts = Some(count);
        self
    }

    /// Growth increment with the zero case normalised.
    #[must_use]
    pub fn effective_growth_increment(&self) -> usize {
        self.growth_increment.max(1)
    }
}
