//! List command implementation: summarize the members of one or more lzip
//! files without extracting their contents (mirrors lzip's `-l`).

use crate::error::Result;
use crate::utils::{format_ratio, format_size};
use rlzip_format::MemberInfo;
use rlzip_format::stream::{TrailingDataPolicy, decode_stream};
use serde::Serialize;
use std::io::Cursor;
use std::path::PathBuf;

/// JSON-serializable summary of one member within a listed file.
#[derive(Debug, Serialize)]
struct MemberJson {
    data_size: u64,
    member_size: u64,
    data_crc: u32,
    dict_size: u32,
}

impl MemberJson {
    fn from_info(info: &MemberInfo) -> Self {
        Self {
            data_size: info.data_size,
            member_size: info.member_size,
            data_crc: info.data_crc,
            dict_size: info.header.dict_size,
        }
    }
}

/// JSON-serializable summary of one listed file.
#[derive(Debug, Serialize)]
struct FileJson {
    file: String,
    compressed_size: u64,
    members: Vec<MemberJson>,
}

pub fn cmd_list(files: &[PathBuf], verbose: bool, json: bool) -> Result<()> {
    if files.is_empty() {
        return Err("no input files given".into());
    }

    let mut listings = Vec::with_capacity(files.len());
    for file in files {
        let compressed = std::fs::read(file)?;
        let mut sink = std::io::sink();
        let infos = decode_stream(Cursor::new(&compressed), &mut sink, TrailingDataPolicy::Ignore)?;
        listings.push((file.clone(), compressed.len() as u64, infos));
    }

    if json {
        let output: Vec<FileJson> = listings
            .iter()
            .map(|(file, compressed_size, infos)| FileJson {
                file: file.display().to_string(),
                compressed_size: *compressed_size,
                members: infos.iter().map(MemberJson::from_info).collect(),
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    let mut grand_compressed = 0u64;
    let mut grand_data = 0u64;

    for (file, compressed_size, infos) in &listings {
        println!("{}", file.display());
        if verbose {
            println!(
                "{:>12} {:>12} {:>7} {:>10}  member",
                "data size", "comp. size", "ratio", "dict size"
            );
            for (i, info) in infos.iter().enumerate() {
                println!(
                    "{:>12} {:>12} {:>7} {:>10}  #{} (crc {:#010x})",
                    info.data_size,
                    info.member_size,
                    format_ratio(info.data_size, info.member_size),
                    format_size(info.header.dict_size as u64),
                    i + 1,
                    info.data_crc,
                );
            }
        }

        let data_size: u64 = infos.iter().map(|m| m.data_size).sum();
        println!(
            "  {} member{}, {} -> {} ({})",
            infos.len(),
            if infos.len() == 1 { "" } else { "s" },
            format_size(data_size),
            format_size(*compressed_size),
            format_ratio(data_size, *compressed_size)
        );

        grand_compressed += compressed_size;
        grand_data += data_size;
    }

    if listings.len() > 1 {
        println!();
        println!(
            "total: {} -> {} ({})",
            format_size(grand_data),
            format_size(grand_compressed),
            format_ratio(grand_data, grand_compressed)
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rlzip_core::CompressionLevel;
    use rlzip_format::stream::encode_stream;
    use rlzip_lzma::EncoderOptions;

    #[test]
    fn test_list_reports_member_sizes() {
        let opts = EncoderOptions::from_level(CompressionLevel::DEFAULT);
        let data = b"hello\n".to_vec();
        let mut compressed = Vec::new();
        let written = encode_stream(&data, &opts, 0, &mut compressed).unwrap();

        let mut sink = std::io::sink();
        let infos =
            decode_stream(Cursor::new(&compressed), &mut sink, TrailingDataPolicy::Strict)
                .unwrap();
        assert_eq!(infos, written);
    }

    #[test]
    fn test_json_output_escapes_control_bytes_in_filename() {
        let file = FileJson {
            file: "weird\u{7}name.lz".to_string(),
            compressed_size: 42,
            members: vec![MemberJson {
                data_size: 10,
                member_size: 42,
                data_crc: 0xdead_beef,
                dict_size: 1 << 20,
            }],
        };
        let json = serde_json::to_string_pretty(&file).unwrap();
        assert!(json.contains("\\u0007"));
        assert!(serde_json::from_str::<serde_json::Value>(&json).is_ok());
    }
}
