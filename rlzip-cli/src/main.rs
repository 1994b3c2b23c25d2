//! rlzip CLI - a pure-Rust lzip (.lz) compressor/decompressor
//!
//! A drop-in command-line tool compatible with the lzip ecosystem:
//! compressing, decompressing, testing, and listing `.lz` members.

mod commands;
mod error;
mod utils;

use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use commands::{cmd_compress, cmd_decompress, cmd_list, cmd_test};
use rlzip_format::stream::TrailingDataPolicy;
use std::io;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "rlzip")]
#[command(author, version, about = "Pure Rust lzip (.lz) compressor/decompressor")]
#[command(long_about = "
rlzip is a Pure Rust implementation of the lzip (.lz) compressed file
format: a CRC-checked container around an LZMA stream.

Examples:
  rlzip compress file.txt
  rlzip compress -9 -o out.lz file.txt
  rlzip compress -c file.txt > file.txt.lz
  rlzip decompress file.txt.lz
  rlzip test archive.lz
  rlzip list --verbose archive.lz
")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compress files into lzip (.lz) members
    #[command(alias = "c")]
    Compress {
        /// Files to compress (use "-" for stdin)
        files: Vec<PathBuf>,

        /// Output file (only valid with a single input file)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write the compressed stream to stdout instead of a file
        #[arg(short = 'c', long = "stdout")]
        to_stdout: bool,

        /// Compression level, 0 (fastest) to 9 (best)
        #[arg(short = 'L', long, default_value_t = 6, value_parser = clap::value_parser!(u8).range(0..=9))]
        level: u8,

        /// Upper bound, in bytes, on each member's uncompressed data; 0 means
        /// unbounded (a single member for the whole input)
        #[arg(short = 'b', long = "member-size", default_value_t = 0)]
        member_size: u64,

        /// Keep (don't delete) the input files after compression
        #[arg(short, long)]
        keep: bool,

        /// Overwrite existing output files without prompting
        #[arg(short, long)]
        force: bool,

        /// Show per-file compression statistics
        #[arg(short, long)]
        verbose: bool,
    },

    /// Decompress lzip (.lz) members
    #[command(alias = "d")]
    Decompress {
        /// Files to decompress (use "-" for stdin)
        files: Vec<PathBuf>,

        /// Output file (only valid with a single input file)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write the decompressed data to stdout instead of a file
        #[arg(short = 'c', long = "stdout")]
        to_stdout: bool,

        /// Keep (don't delete) the input files after decompression
        #[arg(short, long)]
        keep: bool,

        /// Overwrite existing output files without prompting
        #[arg(short, long)]
        force: bool,

        /// Show per-file decompression statistics
        #[arg(short, long)]
        verbose: bool,

        /// How to react to bytes after the last valid member
        #[arg(long, value_enum, default_value_t = TrailingPolicyArg::Strict)]
        trailing: TrailingPolicyArg,
    },

    /// Test the integrity of lzip members without writing output
    #[command(alias = "t")]
    Test {
        /// Files to test
        files: Vec<PathBuf>,

        /// Show a result line for every file
        #[arg(short, long)]
        verbose: bool,
    },

    /// List the members of one or more lzip files
    #[command(alias = "l")]
    List {
        /// Files to list
        files: Vec<PathBuf>,

        /// Show a line per member, not just a per-file summary
        #[arg(short, long)]
        verbose: bool,

        /// Output as JSON (machine-readable)
        #[arg(short, long)]
        json: bool,
    },

    /// Generate shell completion scripts
    #[command(hide = true)]
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Trailing-data policy (for clap `ValueEnum`); mirrors
/// [`TrailingDataPolicy`] one-for-one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
enum TrailingPolicyArg {
    /// Any trailing non-member data is an error.
    #[default]
    Strict,
    /// Silently stop at the first non-member bytes.
    Ignore,
    /// Accept a magic-like prefix without error.
    Loose,
}

impl From<TrailingPolicyArg> for TrailingDataPolicy {
    fn from(arg: TrailingPolicyArg) -> Self {
        match arg {
            TrailingPolicyArg::Strict => TrailingDataPolicy::Strict,
            TrailingPolicyArg::Ignore => TrailingDataPolicy::Ignore,
            TrailingPolicyArg::Loose => TrailingDataPolicy::Loose,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Compress {
            files,
            output,
            to_stdout,
            level,
            member_size,
            keep,
            force,
            verbose,
        } => cmd_compress(
            &files,
            output.as_deref(),
            to_stdout,
            level,
            member_size,
            keep,
            force,
            verbose,
        ),
        Commands::Decompress {
            files,
            output,
            to_stdout,
            keep,
            force,
            verbose,
            trailing,
        } => cmd_decompress(
            &files,
            output.as_deref(),
            to_stdout,
            keep,
            force,
            verbose,
            trailing.into(),
        ),
        Commands::Test { files, verbose } => cmd_test(&files, verbose),
        Commands::List {
            files,
            verbose,
            json,
        } => cmd_list(&files, verbose, json),
        Commands::Completion { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "rlzip", &mut io::stdout());
            return;
        }
    };

    if let Err(e) = result {
        eprintln!("rlzip: {e}");
        std::process::exit(e.exit_code());
    }
}
