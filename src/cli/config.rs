use std::path::Path;

use anyhow::{Result, anyhow};
use log::Level;
use serde::Deserialize;

use super::command::{Cli, ModeArgs};
use piezolog::process::scan::{
    DEFAULT_LEGACY_WIDTH, DEFAULT_TRAILING_RESERVE_BITS, Markers, ScanConfig, ScanMode,
};

/// Capture format settings read from a YAML file.
///
/// ```yaml
/// mode: legacy
/// width: 5
/// start_marker: "0x807F"
/// end_marker: "0x7F80"
/// trailing_reserve_bits: 16
/// ```
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CaptureConfig {
    pub mode: Option<CaptureMode>,
    pub width: Option<u32>,
    pub start_marker: Option<String>,
    pub end_marker: Option<String>,
    pub trailing_reserve_bits: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptureMode {
    Framed,
    Legacy,
}

impl CaptureConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| anyhow!("Failed to read config {}: {e}", path.display()))?;
        Self::from_yaml(&text).map_err(|e| anyhow!("Invalid config {}: {e}", path.display()))
    }

    pub fn from_yaml(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml_ng::from_str(text)?)
    }
}

/// Parses a marker such as `"0x807F"`, `"807F"` or `"80 7F"` into bytes.
pub fn parse_marker(text: &str) -> Result<Vec<u8>> {
    let trimmed = text.trim();
    let hex: String = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed)
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '_')
        .collect();

    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(anyhow!("Marker {text:?} is not valid hex"));
    }
    if hex.is_empty() || hex.len() % 2 != 0 {
        return Err(anyhow!(
            "Marker {text:?} must be a non-empty whole number of hex bytes"
        ));
    }

    (0..hex.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .map_err(|e| anyhow!("Marker {text:?} is not valid hex: {e}"))
        })
        .collect()
}

/// Builds the scanner configuration from the config file (if any) and the
/// command line. Command line flags take precedence.
pub fn scan_config(cli: &Cli, mode: &ModeArgs) -> Result<ScanConfig> {
    let file = match &cli.config {
        Some(path) => CaptureConfig::load(path)?,
        None => CaptureConfig::default(),
    };
    merge(&file, mode, cli.strict)
}

pub fn merge(file: &CaptureConfig, mode: &ModeArgs, strict: bool) -> Result<ScanConfig> {
    let legacy = mode.legacy || file.mode == Some(CaptureMode::Legacy);
    let width = mode.width.or(file.width).unwrap_or(DEFAULT_LEGACY_WIDTH);

    if !legacy && mode.width.is_some() {
        log::warn!("--width only applies to legacy captures, framed captures carry their own width");
    }

    let defaults = Markers::default();
    let markers = Markers {
        start: match &file.start_marker {
            Some(text) => parse_marker(text)?,
            None => defaults.start,
        },
        end: match &file.end_marker {
            Some(text) => parse_marker(text)?,
            None => defaults.end,
        },
    };

    Ok(ScanConfig {
        mode: if legacy {
            ScanMode::Legacy { width }
        } else {
            ScanMode::Framed
        },
        markers,
        trailing_reserve_bits: file
            .trailing_reserve_bits
            .unwrap_or(DEFAULT_TRAILING_RESERVE_BITS),
        fail_level: if strict { Level::Warn } else { Level::Error },
    })
}
