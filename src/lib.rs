//! This file is the root of the `huffpack` Rust crate.
//!
//! Its responsibilities are strictly limited to:
//! 1.  Declaring all the top-level modules of the library (`kernels`, `framing`,
//!     `bridge`, etc.) so the Rust compiler knows they exist.
//! 2.  Re-exporting the handful of types most callers need, so that
//!     `huffpack::HuffmanCodec` works without knowing the module layout.

//==================================================================================
// 0. Constants
//==================================================================================
/// The crate version, automatically set from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//==================================================================================
// 1. Module Declarations
//==================================================================================
#[macro_use]
pub mod observability; // Make macros available throughout the crate

pub mod bridge;
pub mod config;
pub mod error;
pub mod framing;
pub mod kernels;
pub mod source;
pub mod traits;

// Used by `log_metric!` so the macro resolves from any crate.
#[doc(hidden)]
pub use log as __log;

//==================================================================================
// 2. Public API Re-exports
//==================================================================================
pub use bridge::HuffmanCodec;
pub use config::{CodecConfig, ContainerVersion};
pub use error::{HuffpackError, Result};
pub use kernels::{CodeTable, EncodedSegments, HuffmanMetadata};
pub use observability::enable_verbose_logging;
pub use source::{FileChunkSource, MemoryChunkSource};
pub use traits::{ChunkPass, ChunkSource, Codec, Encoded};
