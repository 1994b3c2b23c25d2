//! Compress command implementation.

use crate::error::Result;
use crate::utils::{
    confirm_overwrite, copy_metadata, create_progress_bar, default_compressed_name, format_ratio,
    format_size, read_input, remove_input_unless_kept,
};
use rlzip_core::CompressionLevel;
use rlzip_format::stream::encode_stream;
use rlzip_lzma::EncoderOptions;
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::{Path, PathBuf};

#[allow(clippy::too_many_arguments)]
pub fn cmd_compress(
    files: &[PathBuf],
    output: Option<&Path>,
    to_stdout: bool,
    level: u8,
    member_size: u64,
    keep: bool,
    force: bool,
    verbose: bool,
) -> Result<()> {
    if files.is_empty() {
        return Err("no input files given".into());
    }
    if output.is_some() && files.len() > 1 {
        return Err("--output requires a single input file".into());
    }

    let opts = EncoderOptions::from_level(CompressionLevel::new(level));
    let progress = create_progress_bar(files.len() as u64, verbose && files.len() > 1);

    if to_stdout {
        let mut out = BufWriter::new(stdout().lock());
        for file in files {
            let data = read_input(file)?;
            let infos = encode_stream(data.as_slice(), &opts, member_size, &mut out)?;
            if verbose {
                report(file, data.len(), &infos);
            }
            remove_input_unless_kept(file, true, true);
            progress.inc(1);
        }
        out.flush()?;
        progress.finish_and_clear();
        return Ok(());
    }

    for file in files {
        let data = read_input(file)?;
        let out_path = match output {
            Some(p) => p.to_path_buf(),
            None => default_compressed_name(file),
        };

        if !confirm_overwrite(&out_path, force)? {
            println!("Skipping {}", file.display());
            continue;
        }

        let mut out = BufWriter::new(File::create(&out_path)?);
        let infos = encode_stream(data.as_slice(), &opts, member_size, &mut out)?;
        out.flush()?;

        copy_metadata(file, &out_path);
        remove_input_unless_kept(file, keep, false);

        if verbose {
            report(file, data.len(), &infos);
            println!("  -> {}", out_path.display());
        }
        progress.inc(1);
    }

    progress.finish_and_clear();
    Ok(())
}

fn report(file: &Path, input_size: u64, infos: &[rlzip_format::MemberInfo]) {
    let compressed: u64 = infos.iter().map(|m| m.member_size).sum();
    println!(
        "{}: {} -> {} ({} member{}, {})",
        file.display(),
        format_size(input_size),
        format_size(compressed),
        infos.len(),
        if infos.len() == 1 { "" } else { "s" },
        format_ratio(input_size, compressed)
    );
}
