/// Frame boundary detection.
///
/// Provides the [`FrameLocator`](locate::FrameLocator), which finds
/// sentinel-delimited frames at byte-aligned positions of a capture.
pub mod locate;

/// Bit order normalization.
///
/// Undoes the byte-order and bit-order inversion applied by the capture link.
pub mod normalize;

/// Sample unpacking.
///
/// Slices a normalized buffer into fixed-width chunks and decodes them as
/// two's-complement integers.
pub mod unpack;

/// Whole-capture scanning.
///
/// Provides the [`CaptureScanner`](scan::CaptureScanner), which drives
/// location, header parsing, normalization and unpacking over a capture and
/// produces [`DecodedFrame`](crate::structs::frame::DecodedFrame) records.
pub mod scan;

/// Capture synthesis.
///
/// Provides the [`CaptureEncoder`](encode::CaptureEncoder), the inverse of
/// the decoding pipeline.
pub mod encode;

/// Two framed segments: an ADC frame (code 0, 5-bit samples `1, -2, 3, -4,
/// 5, -6, 7, -8`) and a comparator frame (code 5, 8-bit samples `-128, 127,
/// 0, -1`), surrounded by filler bytes.
pub const EXAMPLE_DATA: &[u8] = &[
    0x00, 0x11, 0x80, 0x7F, 0x41, 0x00, 0x05, 0xC1, 0x0F, 0x5E, 0xF4, 0xC1, 0x7F, 0x80, 0xAA,
    0x80, 0x7F, 0x43, 0x05, 0x08, 0x80, 0x7F, 0x00, 0xFF, 0x7F, 0x80, 0x00,
];
