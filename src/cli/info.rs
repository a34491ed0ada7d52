use anyhow::Result;
use indicatif::MultiProgress;

use super::command::{Cli, InfoArgs};
use super::decode::scan_capture;
use piezolog::structs::frame::DecodedFrame;

pub fn cmd_info(args: &InfoArgs, cli: &Cli, multi: Option<&MultiProgress>) -> Result<()> {
    log::info!("Analyzing capture: {}", args.input.display());

    let frames = scan_capture(&args.input, &args.mode, cli, multi)?;

    if frames.is_empty() {
        println!("No capture found in the file.");
        return Ok(());
    }

    for frame in &frames {
        println!("{}", frame_line(frame));
    }
    println!("{}", totals_line(&frames));

    Ok(())
}

fn frame_line(frame: &DecodedFrame) -> String {
    let (source, frequency) = match frame.header {
        Some(header) => (
            header.source.to_string(),
            header
                .frequency_hz()
                .map_or("unset".to_string(), |hz| format!("{hz} Hz")),
        ),
        None => ("legacy".to_string(), "-".to_string()),
    };

    format!(
        "Frame {:>4}: {source:<6} freq {frequency:<12} width {:<3} payload {} bits, {} samples, {} bits dropped",
        frame.index,
        frame.sample_width,
        frame.payload_bits,
        frame.samples.len(),
        frame.dropped_bits,
    )
}

fn totals_line(frames: &[DecodedFrame]) -> String {
    let samples: usize = frames.iter().map(|f| f.samples.len()).sum();
    let bits: u64 = frames.iter().map(|f| f.payload_bits).sum();
    format!(
        "Total: {} frame(s), {samples} samples, {bits} payload bits",
        frames.len()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use piezolog::process::EXAMPLE_DATA;
    use piezolog::process::scan::{CaptureScanner, ScanConfig};

    #[test]
    fn summarizes_example_capture() -> anyhow::Result<()> {
        let frames = CaptureScanner::new(ScanConfig::default()).scan(EXAMPLE_DATA)?;

        assert!(frame_line(&frames[0]).starts_with("Frame    1: ADC    freq 250000 Hz"));
        assert!(frame_line(&frames[1]).contains("COMP   freq 25000000 Hz"));
        assert_eq!(
            totals_line(&frames),
            "Total: 2 frame(s), 12 samples, 72 payload bits"
        );
        Ok(())
    }

    #[test]
    fn legacy_line_shows_configured_width() -> anyhow::Result<()> {
        let capture = [0x80, 0x7F, 0x12, 0x34, 0x7F, 0x80];
        let frames = CaptureScanner::new(ScanConfig::legacy(5)).scan(&capture)?;

        assert_eq!(
            frame_line(&frames[0]),
            "Frame    1: legacy freq -            width 5   payload 16 bits, 3 samples, 1 bits dropped"
        );
        Ok(())
    }
}
