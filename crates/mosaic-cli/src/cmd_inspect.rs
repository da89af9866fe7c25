/// Implementation of `mosaic inspect`.
///
/// Splits a capture file into frames and prints one line per frame,
/// followed by the splitter's counters. With `--json` the frame list is
/// printed as a JSON array on stdout and the counters go to stderr.
///
/// # Output format
///
/// ```text
/// #0    0x000000  SBF  4007.2 PVTGeodetic len=96 tow=345600.000 wnc=2300
///             0000  24 40 3f 1c a7 4f 60 00 00 80 99 14 fc 08 04 00  $@?..O`.........
///             ...
/// #1    0x000060  NMEA $GPGGA,123519,4807.038,N*47
/// ---
/// 2 frames (1 SBF, 1 NMEA), 0 CRC errors, 0 bytes skipped
/// ```
use std::fs;

use anyhow::{Context, Result};
use mosaic_decoder::CaptureReport;

use crate::InspectArgs;

/// Run the `mosaic inspect` command.
///
/// # Errors
///
/// Returns an error if the file cannot be read. Corrupt frames are not an
/// error; they show up in the skipped-byte and CRC counters.
pub fn run(args: &InspectArgs) -> Result<()> {
    let bytes =
        fs::read(&args.file).with_context(|| format!("cannot read {}", args.file.display()))?;
    let report = CaptureReport::from_capture(&bytes);

    if args.json {
        let json = serde_json::to_string_pretty(&report.frames)
            .context("failed to serialize frame list")?;
        println!("{json}");
        eprintln!("{}", serde_json::to_string(&report.stats)?);
        return Ok(());
    }

    for frame in &report.frames {
        println!("{frame}");
        if args.show_hex {
            for line in hex_dump(&bytes[frame.offset..frame.offset + frame.len]) {
                println!("            {line}");
            }
        }
    }

    println!("---");
    println!("{}", report.summary());
    Ok(())
}

/// 16 bytes per line: offset, hex pairs, printable ASCII.
fn hex_dump(bytes: &[u8]) -> Vec<String> {
    bytes
        .chunks(16)
        .enumerate()
        .map(|(i, chunk)| {
            let pairs: Vec<String> = chunk.iter().map(|b| hex::encode([*b])).collect();
            let ascii: String = chunk
                .iter()
                .map(|&b| if b.is_ascii_graphic() { b as char } else { '.' })
                .collect();
            format!("{:04x}  {:<47}  {ascii}", i * 16, pairs.join(" "))
        })
        .collect()
}
