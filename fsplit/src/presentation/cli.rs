use clap::{ArgGroup, Parser, Subcommand, ValueEnum};
use fsplit_core::{ChunkOrder, DEFAULT_BLOCK_SIZE};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about = "fsplit: split files into chunks and put them back together", long_about = None)]
pub struct Cli {
    /// More log output (-v info, -vv debug, -vvv trace). RUST_LOG applies when absent.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum OrderArg {
    /// plain string sort of file names
    Lexical,
    /// numeric chunk index
    #[default]
    Index,
}

impl From<OrderArg> for ChunkOrder {
    fn from(o: OrderArg) -> Self {
        match o {
            OrderArg::Lexical => ChunkOrder::Lexical,
            OrderArg::Index => ChunkOrder::Index,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Split a file into `{base}-{index}.split` chunk files
    #[command(group(ArgGroup::new("policy").required(true).args(["size", "parts"])))]
    Split {
        source: PathBuf,
        /// destination directory (created if missing)
        dest: PathBuf,
        /// bytes per chunk; accepts K, M and G suffixes (binary)
        #[arg(long, value_parser = parse_size)]
        size: Option<u64>,
        /// number of chunks to aim for
        #[arg(long)]
        parts: Option<u64>,
        /// chunk name prefix; defaults to the source file name
        #[arg(long = "base-name")]
        base_name: Option<String>,
        /// remove the source after every chunk is written
        #[arg(long)]
        delete_source: bool,
        #[arg(long, default_value_t = DEFAULT_BLOCK_SIZE, value_parser = parse_block_size)]
        block_size: usize,
        /// print the chunk plan without writing anything
        #[arg(long)]
        dry_run: bool,
        #[arg(long)]
        json: bool,
    },

    /// Concatenate chunk files back into one file
    #[command(group(ArgGroup::new("input").required(true).args(["dir", "files"])))]
    Assemble {
        dest: PathBuf,
        /// directory holding the chunk files
        #[arg(long)]
        dir: Option<PathBuf>,
        /// explicit chunk files, in order
        #[arg(long, num_args = 1..)]
        files: Vec<PathBuf>,
        /// remove the chunks (and the --dir directory) afterwards
        #[arg(long)]
        delete_sources: bool,
        /// how a --dir listing is ordered
        #[arg(long, value_enum, default_value_t = OrderArg::Index)]
        order: OrderArg,
        #[arg(long, default_value_t = DEFAULT_BLOCK_SIZE, value_parser = parse_block_size)]
        block_size: usize,
        #[arg(long)]
        json: bool,
    },

    /// Check a file against another file, a chunk set, or a BLAKE3 digest
    #[command(group(ArgGroup::new("target").required(true).args(["against", "chunks", "chunk_dir", "expect"])))]
    Verify {
        file: PathBuf,
        #[arg(long)]
        against: Option<PathBuf>,
        #[arg(long, num_args = 1..)]
        chunks: Vec<PathBuf>,
        #[arg(long = "chunk-dir")]
        chunk_dir: Option<PathBuf>,
        /// 32-byte hex digest
        #[arg(long)]
        expect: Option<String>,
        #[arg(long, value_enum, default_value_t = OrderArg::Index)]
        order: OrderArg,
        #[arg(long, default_value_t = DEFAULT_BLOCK_SIZE, value_parser = parse_block_size)]
        block_size: usize,
    },

    /// Print BLAKE3 digests
    Digest {
        #[arg(required = true)]
        files: Vec<PathBuf>,
        #[arg(long, default_value_t = DEFAULT_BLOCK_SIZE, value_parser = parse_block_size)]
        block_size: usize,
    },
}

/// Parses `1024`, `64K`, `10M`, `2G` (binary multiples, case-insensitive).
pub fn parse_size(s: &str) -> Result<u64, String> {
    let s = s.trim();
    let (digits, mult) = match s.char_indices().last() {
        Some((i, c)) if c.is_ascii_alphabetic() => {
            let mult: u64 = match c.to_ascii_uppercase() {
                'K' => 1 << 10,
                'M' => 1 << 20,
                'G' => 1 << 30,
                _ => return Err(format!("unknown size suffix '{c}'")),
            };
            (&s[..i], mult)
        }
        _ => (s, 1),
    };
    let n: u64 = digits
        .parse()
        .map_err(|e| format!("invalid size '{s}': {e}"))?;
    let bytes = n
        .checked_mul(mult)
        .ok_or_else(|| format!("size '{s}' overflows"))?;
    if bytes == 0 {
        return Err("size must be greater than zero".into());
    }
    Ok(bytes)
}

fn parse_block_size(s: &str) -> Result<usize, String> {
    let n = parse_size(s)?;
    usize::try_from(n).map_err(|_| format!("block size '{s}' too large"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn sizes_with_suffixes() {
        assert_eq!(parse_size("10"), Ok(10));
        assert_eq!(parse_size("64k"), Ok(64 * 1024));
        assert_eq!(parse_size("10M"), Ok(10 * 1024 * 1024));
        assert_eq!(parse_size("2G"), Ok(2 << 30));
        assert!(parse_size("0").is_err());
        assert!(parse_size("5T").is_err());
        assert!(parse_size("abc").is_err());
    }

    #[test]
    fn split_needs_a_policy() {
        assert!(Cli::try_parse_from(["fsplit", "split", "a", "b"]).is_err());
        assert!(
            Cli::try_parse_from(["fsplit", "split", "a", "b", "--size", "1", "--parts", "2"])
                .is_err()
        );
        assert!(Cli::try_parse_from(["fsplit", "split", "a", "b", "--parts", "2"]).is_ok());
    }
}
