//! Chunk boundary arithmetic and the on-disk naming contract.
//!
//! A chunk file is named `{base}-{index}.split`, where `index` is a plain
//! base-10 number starting at 0 with no padding. Every chunk holds exactly
//! `bytes_per_chunk` bytes except the last, which holds the remainder.

use crate::error::{Result, SplitError};
use serde::Serialize;
use std::path::{Path, PathBuf};

pub const CHUNK_SUFFIX: &str = ".split";

pub fn chunk_file_name(base_name: &str, index: u64) -> String {
    format!("{base_name}-{index}{CHUNK_SUFFIX}")
}

pub fn chunk_path(dir: &Path, base_name: &str, index: u64) -> PathBuf {
    dir.join(chunk_file_name(base_name, index))
}

/// Splits `{base}-{index}.split` into its base name and index.
///
/// Returns `None` for anything that does not follow the naming contract,
/// including zero-padded indices.
pub fn parse_chunk_name(name: &str) -> Option<(&str, u64)> {
    let stem = name.strip_suffix(CHUNK_SUFFIX)?;
    let (base, digits) = stem.rsplit_once('-')?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if digits.len() > 1 && digits.starts_with('0') {
        return None;
    }
    let index = digits.parse().ok()?;
    Some((base, index))
}

/// Base names end up inside file names, so they cannot carry separators.
pub fn validate_base_name(base_name: &str) -> Result<()> {
    if base_name.is_empty() {
        return Err(SplitError::InvalidArgument("base name is empty".into()));
    }
    if base_name.contains(['/', '\\']) || base_name == "." || base_name == ".." {
        return Err(SplitError::InvalidArgument(format!(
            "base name must be a plain file name: {base_name}"
        )));
    }
    Ok(())
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChunkPolicy {
    /// Fixed number of bytes per chunk.
    Size(u64),
    /// Target number of chunks; converted to `ceil(size / parts)` bytes.
    Parts(u64),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ChunkLayout {
    pub source_size: u64,
    pub bytes_per_chunk: u64,
}

/// A single planned chunk file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChunkSpec {
    pub index: u64,
    pub len: u64,
    pub path: PathBuf,
}

impl ChunkLayout {
    pub fn new(source_size: u64, policy: ChunkPolicy) -> Result<Self> {
        let bytes_per_chunk = match policy {
            ChunkPolicy::Size(0) => {
                return Err(SplitError::InvalidArgument(
                    "bytes per chunk must be greater than zero".into(),
                ));
            }
            ChunkPolicy::Size(n) => n,
            ChunkPolicy::Parts(0) => {
                return Err(SplitError::InvalidArgument(
                    "parts must be greater than zero".into(),
                ));
            }
            // an empty source still needs a non-zero divisor
            ChunkPolicy::Parts(parts) => source_size.div_ceil(parts).max(1),
        };
        Ok(Self {
            source_size,
            bytes_per_chunk,
        })
    }

    pub fn chunk_count(&self) -> u64 {
        self.source_size.div_ceil(self.bytes_per_chunk)
    }

    /// Length of chunk `index`, or `None` past the end.
    pub fn chunk_len(&self, index: u64) -> Option<u64> {
        let count = self.chunk_count();
        if index >= count {
            return None;
        }
        if index + 1 < count {
            return Some(self.bytes_per_chunk);
        }
        match self.source_size % self.bytes_per_chunk {
            0 => Some(self.bytes_per_chunk),
            rem => Some(rem),
        }
    }

    /// Chunk lengths in index order, computed as the iterator advances.
    pub fn chunk_lens(&self) -> impl Iterator<Item = u64> + '_ {
        (0..self.chunk_count()).filter_map(|i| self.chunk_len(i))
    }

    /// Planned chunk files in index order. Nothing is collected up front, so
    /// very small chunks on a large source cost no memory before streaming.
    pub fn specs<'a>(
        &'a self,
        dir: &'a Path,
        base_name: &'a str,
    ) -> impl Iterator<Item = ChunkSpec> + 'a {
        (0..self.chunk_count()).zip(self.chunk_lens()).map(move |(index, len)| ChunkSpec {
            index,
            len,
            path: chunk_path(dir, base_name, index),
        })
    }
}
