pub mod config;
pub mod constants;
pub mod error;
pub mod types;

pub use config::DecoderConfig;
pub use error::{BoxError, Error, Result};
pub use types::*;

/// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
