use crate::process::locate::Markers;
use crate::structs::frame::Sample;
use crate::structs::header::FrameHeader;
use crate::utils::bit_buffer::{BitBuffer, MAX_CHUNK_WIDTH, reverse_chunk};
use crate::utils::errors::EncodeError;

/// Serializes samples the way the capture hardware does.
///
/// This is the exact inverse of the decoding pipeline and is mainly used to
/// synthesize captures. The payload is zero-padded to a whole byte; when the
/// padding is at least `width` bits long it decodes as extra zero samples.
#[derive(Debug, Clone, Default)]
pub struct CaptureEncoder {
    markers: Markers,
}

impl CaptureEncoder {
    pub fn new(markers: Markers) -> Self {
        Self { markers }
    }

    /// Encodes samples into payload bytes.
    pub fn encode_payload(&self, samples: &[Sample], width: u32) -> Result<Vec<u8>, EncodeError> {
        if width == 0 || width > MAX_CHUNK_WIDTH {
            return Err(EncodeError::UnsupportedWidth(width));
        }

        let mut buffer = BitBuffer::with_capacity(samples.len() as u64 * width as u64 + 7);
        for &value in samples {
            buffer.push_bits(reverse_chunk(to_pattern(value, width)?, width), width);
        }
        while !buffer.is_byte_aligned() {
            buffer.push(false);
        }

        buffer.bit_reverse();
        buffer.byte_reverse()?;
        Ok(buffer.into_bytes())
    }

    /// Encodes a complete framed capture segment: start marker, header,
    /// payload and end marker.
    pub fn encode_frame(
        &self,
        header: &FrameHeader,
        samples: &[Sample],
    ) -> Result<Vec<u8>, EncodeError> {
        let payload = self.encode_payload(samples, header.sample_width as u32)?;

        let mut out = Vec::with_capacity(
            self.markers.start.len() + 3 + payload.len() + self.markers.end.len(),
        );
        out.extend_from_slice(&self.markers.start);
        out.extend_from_slice(&header.to_bytes());
        out.extend_from_slice(&payload);
        out.extend_from_slice(&self.markers.end);
        Ok(out)
    }

    /// Encodes a legacy capture segment, which has no header.
    pub fn encode_legacy(&self, samples: &[Sample], width: u32) -> Result<Vec<u8>, EncodeError> {
        let payload = self.encode_payload(samples, width)?;

        let mut out = Vec::with_capacity(
            self.markers.start.len() + payload.len() + self.markers.end.len(),
        );
        out.extend_from_slice(&self.markers.start);
        out.extend_from_slice(&payload);
        out.extend_from_slice(&self.markers.end);
        Ok(out)
    }
}

/// Low `width` bits of `value`, rejecting values outside the signed range.
fn to_pattern(value: Sample, width: u32) -> Result<u64, EncodeError> {
    if width < MAX_CHUNK_WIDTH {
        let min = -(1i64 << (width - 1));
        let max = (1i64 << (width - 1)) - 1;
        if value < min || value > max {
            return Err(EncodeError::SampleOutOfRange { value, width });
        }
        Ok(value as u64 & ((1u64 << width) - 1))
    } else {
        Ok(value as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::normalize::{Trim, normalize};
    use crate::process::unpack::unpack;
    use crate::structs::header::SourceKind;

    fn decode(bytes: Vec<u8>, width: u32) -> anyhow::Result<Vec<Sample>> {
        let mut payload = BitBuffer::from(bytes);
        normalize(&mut payload, Trim::None)?;
        Ok(unpack(&payload, width)?)
    }

    #[test]
    fn known_payload() -> anyhow::Result<()> {
        let encoder = CaptureEncoder::default();

        assert_eq!(
            encoder.encode_payload(&[1, -2, 3, -4, 5, -6, 7, -8], 5)?,
            vec![0xC1, 0x0F, 0x5E, 0xF4, 0xC1]
        );
        assert_eq!(
            encoder.encode_payload(&[-128, 127, 0, -1], 8)?,
            vec![0x80, 0x7F, 0x00, 0xFF]
        );
        Ok(())
    }

    #[test]
    fn round_trip_across_widths() -> anyhow::Result<()> {
        let encoder = CaptureEncoder::default();

        for width in 1..=64u32 {
            let min = if width == 64 { i64::MIN } else { -(1i64 << (width - 1)) };
            let max = if width == 64 { i64::MAX } else { (1i64 << (width - 1)) - 1 };
            // Eight samples always fill whole bytes, so no padding sample appears.
            let samples: Vec<Sample> = vec![
                min,
                max,
                0,
                (-1i64).max(min),
                1i64.min(max),
                min / 2,
                max / 3,
                min + 1,
            ];

            let decoded = decode(encoder.encode_payload(&samples, width)?, width)?;
            assert_eq!(decoded, samples, "width {width}");
        }
        Ok(())
    }

    #[test]
    fn padding_shorter_than_width_is_dropped() -> anyhow::Result<()> {
        let encoder = CaptureEncoder::default();
        let samples = [-2048, 2047, 100, -100, 7];

        let decoded = decode(encoder.encode_payload(&samples, 12)?, 12)?;
        assert_eq!(decoded, samples);
        Ok(())
    }

    #[test]
    fn wide_padding_decodes_as_zero() -> anyhow::Result<()> {
        let encoder = CaptureEncoder::default();

        let payload = encoder.encode_payload(&[1], 3)?;
        assert_eq!(payload, vec![0x01]);
        assert_eq!(decode(payload, 3)?, vec![1, 0]);
        Ok(())
    }

    #[test]
    fn rejects_out_of_range_samples() {
        let encoder = CaptureEncoder::default();

        assert_eq!(
            encoder.encode_payload(&[16], 5),
            Err(EncodeError::SampleOutOfRange {
                value: 16,
                width: 5
            })
        );
        assert_eq!(
            encoder.encode_payload(&[0], 0),
            Err(EncodeError::UnsupportedWidth(0))
        );
    }

    #[test]
    fn frame_layout() -> anyhow::Result<()> {
        let header = FrameHeader {
            source: SourceKind::Comparator,
            freq_code: 5,
            sample_width: 8,
        };
        let frame = CaptureEncoder::default().encode_frame(&header, &[-128, 127, 0, -1])?;

        assert_eq!(
            frame,
            vec![0x80, 0x7F, 0x43, 0x05, 0x08, 0x80, 0x7F, 0x00, 0xFF, 0x7F, 0x80]
        );
        Ok(())
    }
}
