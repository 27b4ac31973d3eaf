pub mod handlers;

use crate::presentation::cli::{Cli, Commands};
use clap::Parser;
use fsplit_core::error::Result;
use tracing_subscriber::EnvFilter;

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    dispatch(cli)
}

/// Logs go to stderr so stdout stays clean for reports.
fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

pub fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Split {
            source,
            dest,
            size,
            parts,
            base_name,
            delete_source,
            block_size,
            dry_run,
            json,
        } => handlers::handle_split(
            source,
            dest,
            size,
            parts,
            base_name,
            delete_source,
            block_size,
            dry_run,
            json,
        ),
        Commands::Assemble {
            dest,
            dir,
            files,
            delete_sources,
            order,
            block_size,
            json,
        } => handlers::handle_assemble(
            dest,
            dir,
            files,
            delete_sources,
            order.into(),
            block_size,
            json,
        ),
        Commands::Verify {
            file,
            against,
            chunks,
            chunk_dir,
            expect,
            order,
            block_size,
        } => handlers::handle_verify(
            file,
            against,
            chunks,
            chunk_dir,
            expect,
            order.into(),
            block_size,
        ),
        Commands::Digest { files, block_size } => handlers::handle_digest(files, block_size),
    }
}
