use crate::config::{IoOptions, effective_io};
use crate::domain::{ChunkRow, SplitReport};
use crate::error::{Result, SplitError};
use crate::layout::{ChunkLayout, ChunkPolicy, chunk_path, parse_chunk_name, validate_base_name};
use crate::stream::BlockCopier;
use crate::util::fsx::{check_source_file, prepare_dest_dir, remove_file_best_effort};

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::{debug, info, trace, warn};

/// Computes the chunk layout for `source` without writing anything.
pub fn plan_by_size(source: &Path, bytes_per_chunk: u64) -> Result<ChunkLayout> {
    let size = check_source_file(source)?;
    ChunkLayout::new(size, ChunkPolicy::Size(bytes_per_chunk))
}

pub fn plan_by_parts(source: &Path, parts: u64) -> Result<ChunkLayout> {
    let size = check_source_file(source)?;
    ChunkLayout::new(size, ChunkPolicy::Parts(parts))
}

/// Splits `source` into roughly `parts` chunks of `ceil(size / parts)` bytes.
///
/// Rounding up means small sources can produce fewer than `parts` chunks.
pub fn split_by_parts(
    source: &Path,
    dest_dir: &Path,
    parts: u64,
    base_name: &str,
    delete_source: bool,
    opts: Option<&IoOptions>,
) -> Result<SplitReport> {
    let layout = plan_by_parts(source, parts)?;
    debug!(
        source = %source.display(),
        parts,
        bytes_per_chunk = layout.bytes_per_chunk,
        "split by parts"
    );
    split_by_size(
        source,
        dest_dir,
        layout.bytes_per_chunk,
        base_name,
        delete_source,
        opts,
    )
}

/// Splits `source` into `{base_name}-{index}.split` files of
/// `bytes_per_chunk` bytes each inside `dest_dir`; the last one holds the
/// remainder.
///
/// All validation happens before the first chunk is created. A failure while
/// streaming leaves the chunks written so far in place.
pub fn split_by_size(
    source: &Path,
    dest_dir: &Path,
    bytes_per_chunk: u64,
    base_name: &str,
    delete_source: bool,
    opts: Option<&IoOptions>,
) -> Result<SplitReport> {
    let io = effective_io(opts)?;
    validate_base_name(base_name)?;
    let layout = plan_by_size(source, bytes_per_chunk)?;
    let count = layout.chunk_count();
    let source_real = fs::canonicalize(source)?;
    reject_source_overwrite(&source_real, dest_dir, base_name, count)?;
    prepare_dest_dir(dest_dir)?;

    debug!(
        source = %source.display(),
        size = layout.source_size,
        bytes_per_chunk,
        chunks = count,
        block_size = io.block_size,
        "splitting file"
    );

    let mut input = File::open(source)?;
    let mut copier = BlockCopier::new(io.block_size);
    let mut chunks = Vec::new();

    for spec in layout.specs(dest_dir, base_name) {
        trace!(index = spec.index, len = spec.len, path = %spec.path.display(), "writing chunk");
        let mut out = BufWriter::new(File::create(&spec.path)?);
        copier.copy_exact(&mut input, &mut out, spec.len)?;
        out.flush()?;
        chunks.push(ChunkRow {
            index: spec.index,
            path: spec.path,
            len: spec.len,
        });
    }
    drop(input);

    let stale_removed = remove_stale_chunks(dest_dir, base_name, count, &source_real);

    let source_deleted = delete_source && remove_file_best_effort(source);

    info!(
        source = %source.display(),
        chunks = chunks.len(),
        bytes = copier.total(),
        "split complete"
    );

    Ok(SplitReport {
        source: source.to_path_buf(),
        source_size: layout.source_size,
        bytes_per_chunk: layout.bytes_per_chunk,
        chunks,
        stale_removed,
        source_deleted,
    })
}

/// Fails when one of the first `count` chunk slots in `dest_dir` resolves to
/// the source, since creating that chunk would truncate it before it is read.
fn reject_source_overwrite(
    source_real: &Path,
    dest_dir: &Path,
    base_name: &str,
    count: u64,
) -> Result<()> {
    // a missing directory cannot hold the source
    let Ok(entries) = fs::read_dir(dest_dir) else {
        return Ok(());
    };
    for entry in entries.flatten() {
        let name = entry.file_name();
        let Some((base, index)) = name.to_str().and_then(parse_chunk_name) else {
            continue;
        };
        if base != base_name || index >= count {
            continue;
        }
        let path = entry.path();
        if resolves_to(&path, source_real) {
            return Err(SplitError::destination(
                path,
                format!("chunk {index} would overwrite the source file"),
            ));
        }
    }
    Ok(())
}

fn resolves_to(path: &Path, real: &Path) -> bool {
    fs::canonicalize(path).is_ok_and(|p| p == real)
}

/// Removes `{base_name}-{k}.split` for `k = from, from + 1, ...` until the
/// first gap. Never touches the file at `keep`.
fn remove_stale_chunks(dir: &Path, base_name: &str, from: u64, keep: &Path) -> u64 {
    let mut removed = 0;
    let mut index = from;
    loop {
        let path = chunk_path(dir, base_name, index);
        if !path.is_file() || resolves_to(&path, keep) {
            break;
        }
        if !remove_file_best_effort(&path) {
            break;
        }
        removed += 1;
        index += 1;
    }
    if removed > 0 {
        warn!(dir = %dir.display(), base_name, removed, "removed stale chunks from an earlier split");
    }
    removed
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::tempdir;

    fn unrelated(dir: &Path) -> PathBuf {
        let p = dir.join("unrelated");
        fs::write(&p, b"").unwrap();
        fs::canonicalize(p).unwrap()
    }

    #[test]
    fn stale_purge_stops_at_first_gap() {
        let dir = tempdir().unwrap();
        let keep = unrelated(dir.path());
        for i in [3u64, 4, 6] {
            fs::write(chunk_path(dir.path(), "s", i), b"x").unwrap();
        }
        assert_eq!(remove_stale_chunks(dir.path(), "s", 3, &keep), 2);
        assert!(chunk_path(dir.path(), "s", 6).exists());
    }

    #[test]
    fn stale_purge_ignores_other_bases() {
        let dir = tempdir().unwrap();
        let keep = unrelated(dir.path());
        fs::write(chunk_path(dir.path(), "other", 2), b"x").unwrap();
        assert_eq!(remove_stale_chunks(dir.path(), "s", 2, &keep), 0);
        assert!(chunk_path(dir.path(), "other", 2).exists());
    }

    #[test]
    fn stale_purge_never_removes_the_source() {
        let dir = tempdir().unwrap();
        let src = chunk_path(dir.path(), "f", 9);
        fs::write(&src, vec![1u8; 81]).unwrap();
        fs::write(chunk_path(dir.path(), "f", 10), b"x").unwrap();

        let keep = fs::canonicalize(&src).unwrap();
        assert_eq!(remove_stale_chunks(dir.path(), "f", 9, &keep), 0);
        assert!(src.exists());
    }

    #[test]
    fn source_named_like_a_later_chunk_survives_split() {
        let dir = tempdir().unwrap();
        let src = chunk_path(dir.path(), "f", 9);
        fs::write(&src, vec![5u8; 81]).unwrap();

        let report = split_by_size(&src, dir.path(), 10, "f", false, None).unwrap();

        assert_eq!(report.chunk_count(), 9);
        assert_eq!(report.stale_removed, 0);
        assert_eq!(fs::read(&src).unwrap(), vec![5u8; 81]);
    }

    #[test]
    fn chunk_slot_holding_the_source_is_rejected() {
        let dir = tempdir().unwrap();
        let src = chunk_path(dir.path(), "f", 0);
        fs::write(&src, vec![3u8; 81]).unwrap();

        let err = split_by_size(&src, dir.path(), 10, "f", false, None).unwrap_err();

        assert!(matches!(err, SplitError::DestinationInvalid { .. }));
        assert_eq!(fs::metadata(&src).unwrap().len(), 81);
        assert!(!chunk_path(dir.path(), "f", 1).exists());
    }

    #[test]
    fn source_under_another_base_name_splits_in_place() {
        let dir = tempdir().unwrap();
        let src = chunk_path(dir.path(), "g", 0);
        fs::write(&src, vec![4u8; 25]).unwrap();

        let report = split_by_size(&src, dir.path(), 10, "f", false, None).unwrap();

        assert_eq!(report.chunk_count(), 3);
        assert_eq!(fs::metadata(&src).unwrap().len(), 25);
    }
}
