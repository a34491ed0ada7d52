#![doc = include_str!("../README.md")]
//!
//! ## Technical Overview
//!
//! Decoder for capture logs recorded by the piezo test platform's
//! data-acquisition link.
//!
//! ### Capture Organization
//!
//! **External Structure**: an undifferentiated byte stream in which frames are
//! delimited by the sentinels `0x80 0x7F` (start) and `0x7F 0x80` (end).
//! **Internal Structure**: an optional 3-byte header (source, frequency code,
//! sample width) followed by the serialized sample payload.
//!
//! ### Serialization
//!
//! The hardware emits bytes last-to-first and every sample LSB first. Samples
//! are packed without padding, so a sample may straddle a byte boundary and
//! widths need not be multiples of eight.
//!
//! ### Capture Modes
//!
//! - Framed: any number of frames, each with its own header
//! - Legacy: one headerless frame with an externally supplied sample width
//!
//! ## Quick Start
//!
//! ```rust
//! use piezolog::process::EXAMPLE_DATA;
//! use piezolog::process::scan::{CaptureScanner, ScanConfig};
//!
//! let scanner = CaptureScanner::new(ScanConfig::default());
//!
//! for frame in scanner.scan(EXAMPLE_DATA)? {
//!     println!(
//!         "frame {}: {:?} Hz, {} samples",
//!         frame.index,
//!         frame.frequency_hz(),
//!         frame.samples.len()
//!     );
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

/// Processing pipeline for capture logs.
///
/// 1. **Frame Location** ([`process::locate`]): Finds sentinel-delimited
///    frames.
///
/// 2. **Normalization** ([`process::normalize`]): Reverses byte and bit order.
///
/// 3. **Unpacking** ([`process::unpack`]): Decodes fixed-width signed samples.
///
/// 4. **Scanning** ([`process::scan`]): Runs the steps above over a capture.
pub mod process;

/// Data structures representing capture format components.
///
/// - **Frame Header** ([`structs::header`]): Source, frequency and width
/// - **Frames** ([`structs::frame`]): Located and decoded frames
pub mod structs;

/// Utility functions and supporting infrastructure.
///
/// - **Bit Buffer** ([`utils::bit_buffer`]): Packed bit storage and transforms
/// - **Bitstream I/O** ([`utils::bitstream_io`]): Bit-level reading
/// - **Error Handling** ([`utils::errors`]): Error types
pub mod utils;
