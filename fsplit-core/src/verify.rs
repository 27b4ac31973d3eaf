//! BLAKE3 content checks. Not used by split or assemble themselves.

use crate::config::{IoOptions, effective_io};
use crate::error::{Result, SplitError};
use crate::stream::BlockCopier;

use std::fs::File;
use std::path::Path;

pub type Digest = [u8; 32];

pub fn digest_file(path: &Path, opts: Option<&IoOptions>) -> Result<Digest> {
    digest_chunks(&[path], opts)
}

/// Digest of the concatenation of `paths`, in order.
pub fn digest_chunks<P: AsRef<Path>>(paths: &[P], opts: Option<&IoOptions>) -> Result<Digest> {
    let io = effective_io(opts)?;
    let mut hasher = blake3::Hasher::new();
    let mut copier = BlockCopier::new(io.block_size);
    for p in paths {
        let mut f = File::open(p.as_ref())?;
        let len = f.metadata()?.len();
        copier.copy_exact(&mut f, &mut hasher, len)?;
    }
    Ok(*hasher.finalize().as_bytes())
}

pub fn verify_digest(path: &Path, expected: &Digest, opts: Option<&IoOptions>) -> Result<()> {
    let got = digest_file(path, opts)?;
    compare(expected, &got)
}

/// Fails with `VerifyMismatch` unless both files hold the same bytes.
pub fn verify_files(original: &Path, candidate: &Path, opts: Option<&IoOptions>) -> Result<()> {
    let expected = digest_file(original, opts)?;
    verify_digest(candidate, &expected, opts)
}

/// Checks that `chunks`, concatenated in order, reproduce `original`.
pub fn verify_chunks<P: AsRef<Path>>(
    original: &Path,
    chunks: &[P],
    opts: Option<&IoOptions>,
) -> Result<()> {
    let expected = digest_file(original, opts)?;
    let got = digest_chunks(chunks, opts)?;
    compare(&expected, &got)
}

fn compare(expected: &Digest, got: &Digest) -> Result<()> {
    if expected != got {
        return Err(SplitError::VerifyMismatch {
            expected: hex::encode(expected),
            actual: hex::encode(got),
        });
    }
    Ok(())
}
