//! Test command implementation: verify member integrity without writing
//! the decompressed data anywhere (mirrors lzip's `-t`).

use crate::error::Result;
use rlzip_format::stream::{TrailingDataPolicy, decode_stream};
use std::io::Cursor;
use std::path::PathBuf;

pub fn cmd_test(files: &[PathBuf], verbose: bool) -> Result<()> {
    if files.is_empty() {
        return Err("no input files given".into());
    }

    let mut ok_count = 0usize;
    let mut error_count = 0usize;
    let mut errors: Vec<(PathBuf, String)> = Vec::new();

    for file in files {
        let compressed = std::fs::read(file)?;
        let mut sink = std::io::sink();

        match decode_stream(Cursor::new(&compressed), &mut sink, TrailingDataPolicy::Strict) {
            Ok(infos) => {
                ok_count += 1;
                if verbose {
                    println!(
                        "  OK: {} ({} member{})",
                        file.display(),
                        infos.len(),
                        if infos.len() == 1 { "" } else { "s" }
                    );
                }
            }
            Err(e) => {
                error_count += 1;
                errors.push((file.clone(), e.to_string()));
                if verbose {
                    println!("  FAILED: {} - {}", file.display(), e);
                }
            }
        }
    }

    if files.len() > 1 || verbose {
        println!();
        println!("Test results:");
        println!("  Total files tested: {}", files.len());
        println!("  OK: {ok_count}");
        println!("  Failed: {error_count}");
    }

    if !errors.is_empty() && !verbose {
        println!();
        println!("Errors:");
        for (file, err) in &errors {
            println!("  {}: {}", file.display(), err);
        }
    }

    if error_count > 0 {
        std::process::exit(2);
    }

    Ok(())
}
