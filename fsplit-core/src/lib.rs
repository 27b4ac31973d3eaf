#![forbid(unsafe_code)]

pub mod config;
pub mod domain;
pub mod error;
pub mod layout;
pub mod stream;

pub mod util {
    pub mod fsx;
    pub mod hex;
}

pub mod assemble;
pub mod split;
pub mod verify;

// Re-exports: stable API surface
pub use assemble::{assemble_dir, assemble_files, list_chunk_dir, validate_sources};
pub use config::{AssembleOptions, ChunkOrder, DEFAULT_BLOCK_SIZE, IoOptions};
pub use domain::{AssembleReport, ChunkRow, SplitReport};
pub use error::{Result, SplitError};
pub use layout::{ChunkLayout, ChunkPolicy};
pub use split::{plan_by_parts, plan_by_size, split_by_parts, split_by_size};
pub use verify::{digest_chunks, digest_file, verify_chunks, verify_files};
