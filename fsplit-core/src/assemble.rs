use crate::config::{AssembleOptions, ChunkOrder, IoOptions, effective_io};
use crate::domain::{AssembleReport, ChunkRow};
use crate::error::{IssueKind, Result, SourceIssue, SplitError};
use crate::layout::parse_chunk_name;
use crate::stream::BlockCopier;
use crate::util::fsx::{
    check_source_dir, prepare_dest_file, remove_file_best_effort, scan_sources,
};

use std::fs::{self, File};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, trace, warn};
use walkdir::WalkDir;

/// Checks each source and returns every failure, in input order. An empty
/// result means all sources exist, are regular files and can be opened.
pub fn validate_sources<P: AsRef<Path>>(sources: &[P]) -> Vec<SourceIssue> {
    scan_sources(sources)
}

/// Lists the regular files directly inside `source_dir` in assembly order.
///
/// Entries that cannot be resolved (a dangling symlink, say) are reported
/// together as `InvalidSources` rather than aborting on the first one.
pub fn list_chunk_dir(source_dir: &Path, order: ChunkOrder) -> Result<Vec<PathBuf>> {
    check_source_dir(source_dir)?;

    let mut files = Vec::new();
    let mut issues = Vec::new();
    for e in WalkDir::new(source_dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
    {
        match e {
            Ok(e) if e.file_type().is_file() => files.push(e.into_path()),
            Ok(_) => {}
            Err(err) => match err.path().map(Path::to_path_buf) {
                Some(path) => {
                    let kind = match err.io_error().map(std::io::Error::kind) {
                        Some(ErrorKind::NotFound) => IssueKind::NotFound,
                        _ => IssueKind::Unreadable,
                    };
                    issues.push(SourceIssue { path, kind });
                }
                None => return Err(std::io::Error::from(err).into()),
            },
        }
    }
    if !issues.is_empty() {
        return Err(SplitError::InvalidSources(issues));
    }
    if files.is_empty() {
        return Err(SplitError::SourceDirectoryEmpty(source_dir.to_path_buf()));
    }

    sort_sources(&mut files, order);
    Ok(files)
}

pub fn sort_sources(paths: &mut [PathBuf], order: ChunkOrder) {
    match order {
        ChunkOrder::Lexical => paths.sort(),
        ChunkOrder::Index => paths.sort_by_cached_key(|p| index_key(p)),
    }
}

fn index_key(path: &Path) -> (String, Option<u64>, PathBuf) {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    match parse_chunk_name(&name) {
        Some((base, index)) => (base.to_owned(), Some(index), path.to_path_buf()),
        None => (name, None, path.to_path_buf()),
    }
}

/// Assembles every file in `source_dir` into `destination`.
///
/// With `delete_sources`, the chunk files and then the (now empty) directory
/// are removed after a successful run.
pub fn assemble_dir(
    source_dir: &Path,
    destination: &Path,
    delete_sources: bool,
    opts: Option<&AssembleOptions>,
) -> Result<AssembleReport> {
    let order = opts.map(|o| o.order).unwrap_or_default();
    let sources = list_chunk_dir(source_dir, order)?;
    debug!(dir = %source_dir.display(), files = sources.len(), ?order, "assembling directory");

    let report = assemble_files(&sources, destination, delete_sources, opts.map(|o| &o.io))?;

    if delete_sources {
        if let Err(e) = fs::remove_dir(source_dir) {
            warn!(dir = %source_dir.display(), error = %e, "could not remove source directory");
        }
    }
    Ok(report)
}

/// Concatenates `sources`, in the given order, into a fresh `destination`.
///
/// Sources are validated before the destination is touched. A failure while
/// streaming leaves a partial destination behind.
pub fn assemble_files<P: AsRef<Path>>(
    sources: &[P],
    destination: &Path,
    delete_sources: bool,
    opts: Option<&IoOptions>,
) -> Result<AssembleReport> {
    let io = effective_io(opts)?;
    if sources.is_empty() {
        return Err(SplitError::InvalidArgument("no source files given".into()));
    }

    let issues = validate_sources(sources);
    if !issues.is_empty() {
        return Err(SplitError::InvalidSources(issues));
    }
    reject_self_reference(sources, destination)?;

    let mut out = BufWriter::new(prepare_dest_file(destination)?);
    debug!(destination = %destination.display(), sources = sources.len(), "assembling file");

    let mut copier = BlockCopier::new(io.block_size);
    let mut rows = Vec::with_capacity(sources.len());

    for (i, src) in sources.iter().enumerate() {
        let src = src.as_ref();
        let mut input = File::open(src)?;
        let len = input.metadata()?.len();
        trace!(part = %src.display(), size = len, "assemble part");
        copier.copy_exact(&mut input, &mut out, len)?;
        rows.push(ChunkRow {
            index: i as u64,
            path: src.to_path_buf(),
            len,
        });
    }
    out.flush()?;
    drop(out);

    let mut sources_deleted = 0;
    if delete_sources {
        debug!("deleting sources");
        for row in &rows {
            if remove_file_best_effort(&row.path) {
                sources_deleted += 1;
            }
        }
    }

    info!(
        destination = %destination.display(),
        parts = rows.len(),
        bytes = copier.total(),
        "assemble complete"
    );

    Ok(AssembleReport {
        destination: destination.to_path_buf(),
        sources: rows,
        total_bytes: copier.total(),
        sources_deleted,
    })
}

/// Truncating the destination would destroy a source it is also read from.
fn reject_self_reference<P: AsRef<Path>>(sources: &[P], destination: &Path) -> Result<()> {
    let Ok(dest) = fs::canonicalize(destination) else {
        return Ok(());
    };
    for src in sources {
        if fs::canonicalize(src.as_ref()).is_ok_and(|s| s == dest) {
            return Err(SplitError::destination(
                destination,
                "destination is also one of the sources",
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(paths: &[PathBuf]) -> Vec<String> {
        paths
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect()
    }

    fn shuffled() -> Vec<PathBuf> {
        ["t-10.split", "t-2.split", "t-0.split", "t-1.split", "notes.txt"]
            .iter()
            .map(|n| Path::new("d").join(n))
            .collect()
    }

    #[test]
    fn index_order_is_numeric() {
        let mut v = shuffled();
        sort_sources(&mut v, ChunkOrder::Index);
        assert_eq!(
            names(&v),
            ["notes.txt", "t-0.split", "t-1.split", "t-2.split", "t-10.split"]
        );
    }

    #[test]
    fn lexical_order_is_plain_string_sort() {
        let mut v = shuffled();
        sort_sources(&mut v, ChunkOrder::Lexical);
        assert_eq!(
            names(&v),
            ["notes.txt", "t-0.split", "t-1.split", "t-10.split", "t-2.split"]
        );
    }

    #[cfg(unix)]
    #[test]
    fn dangling_link_is_reported_per_item() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("x-0.split"), b"a").unwrap();
        let dangling = dir.path().join("x-1.split");
        std::os::unix::fs::symlink(dir.path().join("gone"), &dangling).unwrap();

        match list_chunk_dir(dir.path(), ChunkOrder::Index) {
            Err(SplitError::InvalidSources(issues)) => {
                assert_eq!(issues.len(), 1);
                assert_eq!(issues[0].path, dangling);
                assert_eq!(issues[0].kind, IssueKind::NotFound);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn index_order_groups_by_base_name() {
        let mut v: Vec<PathBuf> = ["b-0.split", "a-1.split", "b-1.split", "a-0.split"]
            .iter()
            .map(PathBuf::from)
            .collect();
        sort_sources(&mut v, ChunkOrder::Index);
        assert_eq!(names(&v), ["a-0.split", "a-1.split", "b-0.split", "b-1.split"]);
    }
}
