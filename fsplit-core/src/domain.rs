// fsplit_core/src/domain.rs
use serde::Serialize;
use std::path::PathBuf;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ChunkRow {
    pub index: u64,
    pub path: PathBuf,
    pub len: u64,
}

#[derive(Clone, Debug, Serialize)]
pub struct SplitReport {
    pub source: PathBuf,
    pub source_size: u64,
    pub bytes_per_chunk: u64,
    pub chunks: Vec<ChunkRow>,
    /// Leftover chunks from an earlier, larger run that were removed.
    pub stale_removed: u64,
    pub source_deleted: bool,
}

impl SplitReport {
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    pub fn written_bytes(&self) -> u64 {
        self.chunks.iter().map(|c| c.len).sum()
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct AssembleReport {
    pub destination: PathBuf,
    pub sources: Vec<ChunkRow>,
    pub total_bytes: u64,
    pub sources_deleted: u64,
}
