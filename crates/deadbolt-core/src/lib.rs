pub mod constants;
pub mod digest;
pub mod error;
pub mod types;

pub use digest::{Sha256Digest, TokenDigest};
pub use error::{Error, Result};
pub use types::*;

/// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
