use std::path::{Path, PathBuf};

use fsplit_core::error::{Result, SplitError};
use fsplit_core::util::hex::parse_hex_array;
use fsplit_core::verify::verify_digest;
use fsplit_core::{
    AssembleOptions, AssembleReport, ChunkLayout, ChunkOrder, ChunkRow, IoOptions, SplitReport,
    assemble_dir, assemble_files, digest_file, list_chunk_dir, plan_by_parts, plan_by_size,
    split_by_parts, split_by_size, verify_chunks, verify_files,
};
use serde::Serialize;
use tracing::debug;

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let s = serde_json::to_string_pretty(value)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
    println!("{s}");
    Ok(())
}

fn print_rows(rows: &[ChunkRow]) {
    for r in rows {
        println!("#{:<5} {:>12}  {}", r.index, r.len, r.path.display());
    }
}

fn default_base_name(source: &Path) -> Result<String> {
    source
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| {
            SplitError::InvalidArgument(format!(
                "cannot derive a base name from {}",
                source.display()
            ))
        })
}

#[allow(clippy::too_many_arguments)]
pub fn handle_split(
    source: PathBuf,
    dest: PathBuf,
    size: Option<u64>,
    parts: Option<u64>,
    base_name: Option<String>,
    delete_source: bool,
    block_size: usize,
    dry_run: bool,
    json: bool,
) -> Result<()> {
    let io = IoOptions::new(block_size)?;
    let base_name = match base_name {
        Some(b) => b,
        None => default_base_name(&source)?,
    };
    debug!(base_name = %base_name, ?size, ?parts, dry_run, "split arguments");

    if dry_run {
        let layout = match (size, parts) {
            (Some(s), _) => plan_by_size(&source, s)?,
            (None, Some(p)) => plan_by_parts(&source, p)?,
            (None, None) => return Err(missing_policy()),
        };
        return print_plan(&layout, &dest, &base_name, json);
    }

    let report = match (size, parts) {
        (Some(s), _) => split_by_size(&source, &dest, s, &base_name, delete_source, Some(&io))?,
        (None, Some(p)) => split_by_parts(&source, &dest, p, &base_name, delete_source, Some(&io))?,
        (None, None) => return Err(missing_policy()),
    };
    print_split(&report, json)
}

fn missing_policy() -> SplitError {
    SplitError::InvalidArgument("either --size or --parts is required".into())
}

#[derive(Serialize)]
struct PlanView<'a> {
    #[serde(flatten)]
    layout: &'a ChunkLayout,
    chunk_count: u64,
    chunks: Vec<ChunkRow>,
}

fn print_plan(layout: &ChunkLayout, dest: &Path, base_name: &str, json: bool) -> Result<()> {
    let chunks: Vec<ChunkRow> = layout
        .specs(dest, base_name)
        .map(|s| ChunkRow {
            index: s.index,
            path: s.path,
            len: s.len,
        })
        .collect();
    if json {
        return print_json(&PlanView {
            layout,
            chunk_count: layout.chunk_count(),
            chunks,
        });
    }
    print_rows(&chunks);
    eprintln!(
        "plan: {} bytes -> {} chunk(s) of {} bytes",
        layout.source_size,
        layout.chunk_count(),
        layout.bytes_per_chunk
    );
    Ok(())
}

fn print_split(report: &SplitReport, json: bool) -> Result<()> {
    if json {
        return print_json(report);
    }
    print_rows(&report.chunks);
    eprintln!(
        "split: {} ({} bytes) -> {} chunk(s)",
        report.source.display(),
        report.source_size,
        report.chunk_count()
    );
    if report.stale_removed > 0 {
        eprintln!("split: removed {} stale chunk(s)", report.stale_removed);
    }
    if report.source_deleted {
        eprintln!("split: deleted {}", report.source.display());
    }
    Ok(())
}

pub fn handle_assemble(
    dest: PathBuf,
    dir: Option<PathBuf>,
    files: Vec<PathBuf>,
    delete_sources: bool,
    order: ChunkOrder,
    block_size: usize,
    json: bool,
) -> Result<()> {
    let io = IoOptions::new(block_size)?;
    debug!(?dir, files = files.len(), ?order, "assemble arguments");
    let report = match dir {
        Some(d) => {
            let opts = AssembleOptions { io, order };
            assemble_dir(&d, &dest, delete_sources, Some(&opts))?
        }
        None => assemble_files(&files, &dest, delete_sources, Some(&io))?,
    };
    print_assemble(&report, json)
}

fn print_assemble(report: &AssembleReport, json: bool) -> Result<()> {
    if json {
        return print_json(report);
    }
    print_rows(&report.sources);
    eprintln!(
        "assemble: {} chunk(s) -> {} ({} bytes)",
        report.sources.len(),
        report.destination.display(),
        report.total_bytes
    );
    Ok(())
}

pub fn handle_verify(
    file: PathBuf,
    against: Option<PathBuf>,
    chunks: Vec<PathBuf>,
    chunk_dir: Option<PathBuf>,
    expect: Option<String>,
    order: ChunkOrder,
    block_size: usize,
) -> Result<()> {
    let io = IoOptions::new(block_size)?;
    if let Some(other) = against {
        verify_files(&file, &other, Some(&io))?;
    } else if let Some(digest_hex) = expect {
        let expected = parse_hex_array::<32>(&digest_hex)?;
        verify_digest(&file, &expected, Some(&io))?;
    } else if let Some(dir) = chunk_dir {
        let listed = list_chunk_dir(&dir, order)?;
        verify_chunks(&file, &listed, Some(&io))?;
    } else if !chunks.is_empty() {
        verify_chunks(&file, &chunks, Some(&io))?;
    } else {
        return Err(SplitError::InvalidArgument(
            "nothing to verify against".into(),
        ));
    }
    eprintln!("verify: OK");
    Ok(())
}

pub fn handle_digest(files: Vec<PathBuf>, block_size: usize) -> Result<()> {
    let io = IoOptions::new(block_size)?;
    for f in &files {
        let d = digest_file(f, Some(&io))?;
        println!("{}  {}", hex::encode(d), f.display());
    }
    Ok(())
}
