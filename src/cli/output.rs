use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Result, anyhow};
use piezolog::structs::frame::DecodedFrame;

pub const LEGACY_DUMP_NAME: &str = "data.csv";

/// Dump file name for a decoded frame, e.g. `adc_data_1.txt`.
pub fn dump_file_name(frame: &DecodedFrame) -> String {
    match frame.header {
        Some(header) => format!("{}_data_{}.txt", header.source.tag(), frame.index),
        None => LEGACY_DUMP_NAME.to_string(),
    }
}

/// Pairs every frame with its target path. Existing files are only replaced
/// when `force` is set, and a directory is never replaced.
pub fn plan_dumps<'a>(
    output_dir: &Path,
    frames: &'a [DecodedFrame],
    force: bool,
) -> Result<Vec<(PathBuf, &'a DecodedFrame)>> {
    let mut plan = Vec::with_capacity(frames.len());

    for frame in frames {
        let path = output_dir.join(dump_file_name(frame));
        if path.is_dir() {
            return Err(anyhow!(
                "Output file {} is a directory",
                path.display()
            ));
        }
        if path.exists() {
            if !force {
                return Err(anyhow!(
                    "Output file already exists: {} (use --force to overwrite)",
                    path.display()
                ));
            }
            log::warn!("Overwriting {}", path.display());
        }
        plan.push((path, frame));
    }

    Ok(plan)
}

/// Writes every planned dump or none of them.
///
/// Dumps are staged next to their targets and renamed into place once all
/// of them were written.
pub fn write_dumps(plan: &[(PathBuf, &DecodedFrame)]) -> Result<()> {
    let mut staged = Vec::with_capacity(plan.len());

    for (path, frame) in plan {
        let part = staging_path(path);
        if let Err(e) = write_dump_file(&part, frame) {
            remove_staged(&staged);
            let _ = fs::remove_file(&part);
            return Err(e);
        }
        staged.push(part);
    }

    for (i, (part, (path, _))) in staged.iter().zip(plan).enumerate() {
        if let Err(e) = fs::rename(part, path) {
            remove_staged(&staged[i..]);
            let written: Vec<String> = plan[..i]
                .iter()
                .map(|(path, _)| path.display().to_string())
                .collect();
            return Err(anyhow!(
                "Failed to move dump into {}: {e} (already written: [{}])",
                path.display(),
                written.join(", ")
            ));
        }
    }

    Ok(())
}

fn staging_path(path: &Path) -> PathBuf {
    let name = path.file_name().unwrap_or_default().to_string_lossy();
    path.with_file_name(format!(".{name}.part"))
}

fn remove_staged(staged: &[PathBuf]) {
    for part in staged {
        if let Err(e) = fs::remove_file(part) {
            log::warn!("Failed to remove {}: {e}", part.display());
        }
    }
}

/// Writes the text dump of one frame.
///
/// Framed dumps start with the sampling parameters followed by an empty
/// line. Legacy dumps hold only the samples.
pub fn write_dump<W: Write>(writer: &mut W, frame: &DecodedFrame) -> Result<()> {
    if let Some(header) = frame.header {
        writeln!(writer, "Frequency = {}", header.frequency_hz().unwrap_or(0))?;
        writeln!(writer, "Sample Width = {}", frame.sample_width)?;
        writeln!(writer)?;
    }

    for sample in &frame.samples {
        writeln!(writer, "{sample}")?;
    }

    Ok(())
}

fn write_dump_file(path: &Path, frame: &DecodedFrame) -> Result<()> {
    let file = File::create(path)
        .map_err(|e| anyhow!("Failed to create {}: {e}", path.display()))?;
    let mut writer = BufWriter::new(file);
    write_dump(&mut writer, frame)?;
    writer.flush()?;
    Ok(())
}
