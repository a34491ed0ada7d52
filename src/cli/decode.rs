use std::path::{Path, PathBuf};

use anyhow::{Result, anyhow};
use indicatif::MultiProgress;

use super::command::{Cli, DecodeArgs, ModeArgs};
use super::config::scan_config;
use super::output::{plan_dumps, write_dumps};
use super::progress::create_progress_bar;
use crate::input::read_capture;
use piezolog::process::scan::{CaptureScanner, ScanMode};
use piezolog::structs::frame::DecodedFrame;

pub fn cmd_decode(args: &DecodeArgs, cli: &Cli, multi: Option<&MultiProgress>) -> Result<()> {
    let frames = scan_capture(&args.input, &args.mode, cli, multi)?;

    if frames.is_empty() {
        log::info!("No capture found in {}", args.input.display());
        return Ok(());
    }

    let output_dir = args.output_path.clone().unwrap_or_else(|| PathBuf::from("."));
    if !output_dir.is_dir() {
        return Err(anyhow!(
            "Output path is not a directory: {}",
            output_dir.display()
        ));
    }

    let plan = plan_dumps(&output_dir, &frames, args.force)?;
    write_dumps(&plan)?;
    for (path, frame) in &plan {
        log::info!(
            "Dump {} ({} samples) -> {}",
            frame.index,
            frame.samples.len(),
            path.display()
        );
    }

    log::info!("Wrote {} dump file(s) to {}", plan.len(), output_dir.display());

    Ok(())
}

/// Reads and decodes a whole capture.
///
/// Nothing is returned unless every frame decodes.
pub fn scan_capture(
    input: &Path,
    mode: &ModeArgs,
    cli: &Cli,
    multi: Option<&MultiProgress>,
) -> Result<Vec<DecodedFrame>> {
    let config = scan_config(cli, mode)?;
    if let ScanMode::Legacy { width } = config.mode {
        log::info!("Legacy capture, sample width {width}");
    }

    let capture = read_capture(input)?;
    let scanner = CaptureScanner::new(config);

    let pb = multi
        .map(|multi| create_progress_bar(multi, "decoding frames"))
        .transpose()?;

    let mut frames = Vec::new();
    let mut iter = scanner.frames(&capture);
    let result = iter.try_for_each(|frame| {
        let frame = frame?;
        let source = frame
            .header
            .map_or("legacy".to_string(), |h| h.source.to_string());
        log::info!(
            "Dump {} ({source}): Reading {} Bits",
            frame.index,
            frame.payload_bits
        );
        if frame.dropped_bits > 0 {
            log::debug!(
                "Dump {}: {} trailing bit(s) shorter than a sample dropped",
                frame.index,
                frame.dropped_bits
            );
        }

        if let Some(pb) = &pb {
            pb.inc(1);
        }
        frames.push(frame);
        Ok::<_, anyhow::Error>(())
    });

    if let Some(pb) = pb {
        pb.finish_with_message(format!("{} frame(s) located", iter.frames_located()));
    }

    result.map_err(|e| anyhow!("Decoding {} failed: {e}", input.display()))?;

    Ok(frames)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::command::Commands;
    use clap::Parser as ClapParser;
    use piezolog::process::EXAMPLE_DATA;

    const INPUT_NAME: &str = "capture.dat";

    fn run_decode(input: &Path, output_dir: &Path, extra: &[&str]) -> Result<()> {
        let mut argv = vec![
            "piezologd".to_string(),
            "decode".to_string(),
            input.display().to_string(),
            "--output-path".to_string(),
            output_dir.display().to_string(),
        ];
        argv.extend(extra.iter().map(|arg| arg.to_string()));

        let cli = Cli::try_parse_from(argv)?;
        let Commands::Decode(args) = &cli.command else {
            panic!("expected decode");
        };
        cmd_decode(args, &cli, None)
    }

    /// Decodes `capture` into the directory that also holds the input file.
    fn decode_in_tempdir(
        capture: &[u8],
        extra: &[&str],
    ) -> Result<(tempfile::TempDir, Result<()>)> {
        let dir = tempfile::tempdir()?;
        let input = dir.path().join(INPUT_NAME);
        std::fs::write(&input, capture)?;

        let result = run_decode(&input, dir.path(), extra);
        Ok((dir, result))
    }

    fn dir_entries(dir: &Path) -> Result<Vec<String>> {
        let mut names = std::fs::read_dir(dir)?
            .map(|entry| Ok(entry?.file_name().to_string_lossy().into_owned()))
            .collect::<Result<Vec<_>>>()?;
        names.sort();
        Ok(names)
    }

    #[test]
    fn writes_one_dump_per_frame() -> Result<()> {
        let (dir, result) = decode_in_tempdir(EXAMPLE_DATA, &[])?;
        result?;

        assert_eq!(
            dir_entries(dir.path())?,
            vec!["adc_data_1.txt", "capture.dat", "comp_data_2.txt"]
        );
        assert_eq!(
            std::fs::read_to_string(dir.path().join("adc_data_1.txt"))?,
            "Frequency = 250000\nSample Width = 5\n\n1\n-2\n3\n-4\n5\n-6\n7\n-8\n"
        );
        assert_eq!(
            std::fs::read_to_string(dir.path().join("comp_data_2.txt"))?,
            "Frequency = 25000000\nSample Width = 8\n\n-128\n127\n0\n-1\n"
        );
        Ok(())
    }

    #[test]
    fn aborted_scan_writes_nothing() -> Result<()> {
        let mut capture = EXAMPLE_DATA.to_vec();
        capture.extend_from_slice(&[0x80, 0x7F, 0x5A, 0x00, 0x08, 0x12, 0x7F, 0x80]);

        let (dir, result) = decode_in_tempdir(&capture, &[])?;

        let err = result.expect_err("unrecognized source must abort");
        assert!(err.to_string().contains("0x5A"));
        assert_eq!(dir_entries(dir.path())?, vec![INPUT_NAME]);
        Ok(())
    }

    #[test]
    fn legacy_without_start_marker_writes_nothing() -> Result<()> {
        let (dir, result) = decode_in_tempdir(&[0x00, 0x11, 0x7F, 0x80], &["--legacy"])?;
        result?;

        assert_eq!(dir_entries(dir.path())?, vec![INPUT_NAME]);
        Ok(())
    }

    #[test]
    fn existing_dump_needs_force() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let input = dir.path().join(INPUT_NAME);
        std::fs::write(&input, EXAMPLE_DATA)?;
        let stale = dir.path().join("comp_data_2.txt");
        std::fs::write(&stale, "old\n")?;

        assert!(run_decode(&input, dir.path(), &[]).is_err());
        assert!(!dir.path().join("adc_data_1.txt").exists());
        assert_eq!(std::fs::read_to_string(&stale)?, "old\n");

        run_decode(&input, dir.path(), &["--force"])?;
        assert!(dir.path().join("adc_data_1.txt").exists());
        assert!(std::fs::read_to_string(&stale)?.starts_with("Frequency = 25000000"));
        Ok(())
    }
}
