//! Decompress command implementation.

use crate::error::Result;
use crate::utils::{
    confirm_overwrite, copy_metadata, create_progress_bar, default_decompressed_name,
    format_ratio, format_size, read_input, remove_input_unless_kept,
};
use rlzip_format::stream::{TrailingDataPolicy, decode_stream};
use std::fs::File;
use std::io::{BufWriter, Cursor, Write, stdout};
use std::path::{Path, PathBuf};

#[allow(clippy::too_many_arguments)]
pub fn cmd_decompress(
    files: &[PathBuf],
    output: Option<&Path>,
    to_stdout: bool,
    keep: bool,
    force: bool,
    verbose: bool,
    trailing: TrailingDataPolicy,
) -> Result<()> {
    if files.is_empty() {
        return Err("no input files given".into());
    }
    if output.is_some() && files.len() > 1 {
        return Err("--output requires a single input file".into());
    }

    let progress = create_progress_bar(files.len() as u64, verbose && files.len() > 1);

    if to_stdout {
        let mut out = BufWriter::new(stdout().lock());
        for file in files {
            let compressed = read_input(file)?;
            let infos = decode_stream(Cursor::new(compressed.as_slice()), &mut out, trailing)?;
            if verbose {
                report(file, compressed.len(), &infos);
            }
            remove_input_unless_kept(file, true, true);
            progress.inc(1);
        }
        out.flush()?;
        progress.finish_and_clear();
        return Ok(());
    }

    for file in files {
        let compressed = read_input(file)?;
        let out_path = match output {
            Some(p) => p.to_path_buf(),
            None => default_decompressed_name(file).ok_or_else(|| {
                format!(
                    "{}: unknown suffix, use --output to name the decompressed file",
                    file.display()
                )
            })?,
        };

        if !confirm_overwrite(&out_path, force)? {
            println!("Skipping {}", file.display());
            continue;
        }

        let mut out = BufWriter::new(File::create(&out_path)?);
        let infos = decode_stream(Cursor::new(compressed.as_slice()), &mut out, trailing)?;
        out.flush()?;

        copy_metadata(file, &out_path);
        remove_input_unless_kept(file, keep, false);

        if verbose {
            report(file, compressed.len(), &infos);
            println!("  -> {}", out_path.display());
        }
        progress.inc(1);
    }

    progress.finish_and_clear();
    Ok(())
}

fn report(file: &Path, compressed_size: u64, infos: &[rlzip_format::MemberInfo]) {
    let decompressed: u64 = infos.iter().map(|m| m.data_size).sum();
    println!(
        "{}: {} -> {} ({} member{}, {})",
        file.display(),
        format_size(compressed_size),
        format_size(decompressed),
        infos.len(),
        if infos.len() == 1 { "" } else { "s" },
        format_ratio(decompressed, compressed_size)
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use rlzip_core::CompressionLevel;
    use rlzip_format::stream::encode_stream;
    use rlzip_lzma::EncoderOptions;

    #[test]
    fn test_decompress_roundtrip_buffer() {
        let opts = EncoderOptions::from_level(CompressionLevel::DEFAULT);
        let data = b"hello, rlzip\n".to_vec();
        let mut compressed = Vec::new();
        encode_stream(&data, &opts, 0, &mut compressed).unwrap();

        let mut out = Vec::new();
        let infos =
            decode_stream(Cursor::new(&compressed), &mut out, TrailingDataPolicy::Strict)
                .unwrap();
        assert_eq!(out, data);
        assert_eq!(infos.len(), 1);
    }
}
