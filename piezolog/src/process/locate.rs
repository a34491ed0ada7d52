use log::trace;

use crate::structs::frame::FrameBounds;
use crate::utils::bit_buffer::BitBuffer;
use crate::utils::errors::ScanError;

/// Start sentinel written by the capture firmware.
pub const START_MARKER: [u8; 2] = [0x80, 0x7F];

/// End sentinel written by the capture firmware.
pub const END_MARKER: [u8; 2] = [0x7F, 0x80];

/// Byte patterns delimiting frames.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Markers {
    pub start: Vec<u8>,
    pub end: Vec<u8>,
}

impl Default for Markers {
    fn default() -> Self {
        Self {
            start: START_MARKER.to_vec(),
            end: END_MARKER.to_vec(),
        }
    }
}

impl Markers {
    pub fn start_bits(&self) -> u64 {
        (self.start.len() as u64) << 3
    }

    pub fn end_bits(&self) -> u64 {
        (self.end.len() as u64) << 3
    }
}

/// Finds sentinel-delimited frames at byte-aligned positions.
///
/// Marker bytes occurring inside a payload are indistinguishable from real
/// delimiters and are treated as such.
#[derive(Debug, Clone, Default)]
pub struct FrameLocator {
    markers: Markers,
}

impl FrameLocator {
    pub fn new(markers: Markers) -> Self {
        Self { markers }
    }

    pub fn markers(&self) -> &Markers {
        &self.markers
    }

    /// Locates the next frame at or after the bit `cursor`.
    ///
    /// A cursor that is not byte-aligned is rounded up to the next byte.
    /// Returns `Ok(None)` once no further start marker exists, and
    /// [`ScanError::UnterminatedFrame`] when a start marker has no end marker
    /// after it.
    pub fn find_next_frame(
        &self,
        buffer: &BitBuffer,
        cursor: u64,
    ) -> Result<Option<FrameBounds>, ScanError> {
        let bytes = aligned_bytes(buffer);
        let from = cursor.div_ceil(8) as usize;

        let Some(start) = find_pattern(bytes, &self.markers.start, from) else {
            trace!("No start marker at or after bit {cursor}");
            return Ok(None);
        };
        let start_bit = ((start + self.markers.start.len()) as u64) << 3;

        let Some(end) = find_pattern(bytes, &self.markers.end, start + self.markers.start.len())
        else {
            return Err(ScanError::UnterminatedFrame { start_bit });
        };

        Ok(Some(FrameBounds {
            start_bit,
            end_bit: (end as u64) << 3,
        }))
    }

    /// Cursor for the following search: the bit right after the end marker.
    pub fn next_cursor(&self, bounds: &FrameBounds) -> u64 {
        bounds.end_bit + self.markers.end_bits()
    }
}

/// Whole bytes of `buffer`; a trailing partial byte can never hold a marker.
fn aligned_bytes(buffer: &BitBuffer) -> &[u8] {
    let whole = (buffer.len() >> 3) as usize;
    &buffer.as_bytes()[..whole]
}

fn find_pattern(haystack: &[u8], pattern: &[u8], from: usize) -> Option<usize> {
    if pattern.is_empty() || from >= haystack.len() {
        return None;
    }
    haystack[from..]
        .windows(pattern.len())
        .position(|window| window == pattern)
        .map(|pos| pos + from)
}
