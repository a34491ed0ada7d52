use crate::structs::header::FrameHeader;
use crate::utils::bit_buffer::BitBuffer;

/// A decoded sample. Its effective width is the frame's sample width.
pub type Sample = i64;

/// Bit offsets of one delimited frame inside a capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameBounds {
    /// First bit after the start marker.
    pub start_bit: u64,
    /// First bit of the end marker.
    pub end_bit: u64,
}

/// A located frame whose payload has not been normalized yet.
///
/// The payload excludes the header and the trailing reserve.
#[derive(Debug, Clone)]
pub struct Frame {
    pub start_offset: u64,
    pub end_offset: u64,
    pub header: Option<FrameHeader>,
    pub payload: BitBuffer,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedFrame {
    /// 1-based position in discovery order.
    pub index: usize,
    /// `None` for legacy captures, which carry no header.
    pub header: Option<FrameHeader>,
    pub samples: Vec<Sample>,
    /// Width the samples were unpacked with. Legacy frames take it from the
    /// scan configuration.
    pub sample_width: u32,
    pub start_offset: u64,
    pub end_offset: u64,
    pub payload_bits: u64,
    /// Trailing payload bits shorter than one sample.
    pub dropped_bits: u64,
}

impl DecodedFrame {
    pub fn frequency_hz(&self) -> Option<u32> {
        self.header.and_then(|h| h.frequency_hz())
    }
}
