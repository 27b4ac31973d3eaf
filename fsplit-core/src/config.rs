use crate::error::{Result, SplitError};
use serde::{Deserialize, Serialize};

/// Transfer buffer size used by every streaming copy unless overridden.
pub const DEFAULT_BLOCK_SIZE: usize = 8192;

/// Streaming parameters shared by split, assemble and verify.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IoOptions {
    /// Size in bytes of the fixed transfer buffer. Unrelated to chunk size.
    pub block_size: usize,
}

impl Default for IoOptions {
    fn default() -> Self {
        Self {
            block_size: DEFAULT_BLOCK_SIZE,
        }
    }
}

impl IoOptions {
    pub fn new(block_size: usize) -> Result<Self> {
        let opts = Self { block_size };
        opts.validate()?;
        Ok(opts)
    }

    pub fn validate(&self) -> Result<()> {
        if self.block_size == 0 {
            return Err(SplitError::InvalidArgument(
                "block size must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

/// How a directory listing is turned into an assembly order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChunkOrder {
    /// Plain string sort of the paths. `x-10.split` lands before `x-2.split`.
    Lexical,
    /// Chunk names sort by base name, then by numeric index; anything else
    /// falls back to its file name.
    #[default]
    Index,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssembleOptions {
    pub io: IoOptions,
    pub order: ChunkOrder,
}

pub(crate) fn effective_io(opts: Option<&IoOptions>) -> Result<IoOptions> {
    let io = opts.copied().unwrap_or_default();
    io.validate()?;
    Ok(io)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_8k_blocks() {
        assert_eq!(IoOptions::default().block_size, 8192);
        assert_eq!(effective_io(None).unwrap(), IoOptions::default());
    }

    #[test]
    fn zero_block_size_is_rejected() {
        assert!(matches!(
            IoOptions::new(0),
            Err(SplitError::InvalidArgument(_))
        ));
        let raw = IoOptions { block_size: 0 };
        assert!(effective_io(Some(&raw)).is_err());
    }

    #[test]
    fn index_order_is_the_default() {
        assert_eq!(AssembleOptions::default().order, ChunkOrder::Index);
    }
}
