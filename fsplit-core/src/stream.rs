use crate::error::{Result, SplitError};
use std::io::{ErrorKind, Read, Write};

/// Moves exact byte counts from a reader to a writer through one reusable
/// fixed-size buffer.
pub struct BlockCopier {
    buf: Vec<u8>,
    total: u64,
}

impl BlockCopier {
    pub fn new(block_size: usize) -> Self {
        Self {
            buf: vec![0u8; block_size],
            total: 0,
        }
    }

    pub fn block_size(&self) -> usize {
        self.buf.len()
    }

    /// Bytes moved across every call so far.
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Copies exactly `len` bytes: whole blocks while more than a block is
    /// left, then one short block for the rest. Never reads beyond `len`.
    pub fn copy_exact<R, W>(&mut self, r: &mut R, w: &mut W, len: u64) -> Result<u64>
    where
        R: Read + ?Sized,
        W: Write + ?Sized,
    {
        let block = self.buf.len() as u64;
        let mut remaining = len;

        while remaining > block {
            read_full(r, &mut self.buf, len, len - remaining)?;
            w.write_all(&self.buf)?;
            remaining -= block;
        }

        if remaining > 0 {
            let tail = &mut self.buf[..remaining as usize];
            read_full(r, tail, len, len - remaining)?;
            w.write_all(tail)?;
        }

        self.total += len;
        Ok(len)
    }
}

/// Fills `buf` completely, looping over partial reads.
fn read_full<R: Read + ?Sized>(
    r: &mut R,
    buf: &mut [u8],
    expected: u64,
    done: u64,
) -> Result<()> {
    let mut filled = 0usize;
    while filled < buf.len() {
        match r.read(&mut buf[filled..]) {
            Ok(0) => {
                return Err(SplitError::ShortRead {
                    expected,
                    actual: done + filled as u64,
                });
            }
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    /// Hands out at most `step` bytes per read call.
    struct Trickle<R> {
        inner: R,
        step: usize,
    }

    impl<R: Read> Read for Trickle<R> {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            let n = buf.len().min(self.step);
            self.inner.read(&mut buf[..n])
        }
    }

    fn sample(n: usize) -> Vec<u8> {
        (0..n).map(|i| (i * 31 % 251) as u8).collect()
    }

    #[test]
    fn copies_whole_and_partial_blocks() {
        let data = sample(100);
        let mut r = Cursor::new(data.clone());
        let mut out = Vec::new();
        let mut c = BlockCopier::new(8);

        c.copy_exact(&mut r, &mut out, 37).unwrap();
        c.copy_exact(&mut r, &mut out, 63).unwrap();

        assert_eq!(out, data);
        assert_eq!(c.total(), 100);
    }

    #[test]
    fn stops_at_the_requested_length() {
        let data = sample(50);
        let mut r = Cursor::new(data.clone());
        let mut out = Vec::new();
        BlockCopier::new(16)
            .copy_exact(&mut r, &mut out, 20)
            .unwrap();
        assert_eq!(out, &data[..20]);
        assert_eq!(r.position(), 20);
    }

    #[test]
    fn survives_partial_reads() {
        let data = sample(1000);
        let mut r = Trickle {
            inner: Cursor::new(data.clone()),
            step: 3,
        };
        let mut out = Vec::new();
        BlockCopier::new(64)
            .copy_exact(&mut r, &mut out, 1000)
            .unwrap();
        assert_eq!(out, data);
    }

    #[test]
    fn early_eof_is_a_short_read() {
        let mut r = Cursor::new(sample(10));
        let mut out = Vec::new();
        let err = BlockCopier::new(4)
            .copy_exact(&mut r, &mut out, 15)
            .unwrap_err();
        assert!(matches!(
            err,
            SplitError::ShortRead {
                expected: 15,
                actual: 10
            }
        ));
    }

    #[test]
    fn zero_length_is_a_no_op() {
        let mut r = Cursor::new(sample(4));
        let mut out = Vec::new();
        let mut c = BlockCopier::new(4);
        assert_eq!(c.copy_exact(&mut r, &mut out, 0).unwrap(), 0);
        assert!(out.is_empty());
        assert_eq!(c.block_size(), 4);
    }
}
