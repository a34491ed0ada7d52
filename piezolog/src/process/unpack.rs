use crate::structs::frame::Sample;
use crate::utils::bit_buffer::{BitBuffer, MAX_CHUNK_WIDTH, reverse_chunk, to_signed_int};
use crate::utils::errors::BitBufferError;

/// Decodes a normalized buffer into signed `width`-bit samples.
///
/// Each chunk is bit-reversed on its own before the two's-complement decode.
/// Trailing bits shorter than one chunk are dropped. A width of zero yields
/// no samples.
pub fn unpack(normalized: &BitBuffer, width: u32) -> Result<Vec<Sample>, BitBufferError> {
    Ok(samples(normalized, width)?.collect())
}

/// Lazy form of [`unpack`].
///
/// Widths above 64 bits are only rejected when the buffer is long enough to
/// hold a sample of that width.
pub fn samples(
    normalized: &BitBuffer,
    width: u32,
) -> Result<impl Iterator<Item = Sample> + '_, BitBufferError> {
    if width > MAX_CHUNK_WIDTH && normalized.len() >= width as u64 {
        return Err(BitBufferError::UnsupportedWidth(width));
    }

    Ok(normalized
        .chunks(width)
        .map(move |chunk| to_signed_int(reverse_chunk(chunk, width), width)))
}

/// Number of samples and dropped bits for a payload of `payload_bits`.
pub fn sample_count(payload_bits: u64, width: u32) -> (u64, u64) {
    if width == 0 {
        return (0, payload_bits);
    }
    let width = width as u64;
    (payload_bits / width, payload_bits % width)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::normalize::{Trim, normalize};

    #[test]
    fn palindromic_chunks() -> anyhow::Result<()> {
        let normalized = BitBuffer::from_bit_str("1000110101");

        // 10001 and 10101 read the same reversed: -15 and -11.
        assert_eq!(unpack(&normalized, 5)?, vec![-15, -11]);
        Ok(())
    }

    #[test]
    fn chunk_bits_are_reversed() -> anyhow::Result<()> {
        let normalized = BitBuffer::from_bit_str("1100000110");

        // 11000 -> 00011, 00110 -> 01100
        assert_eq!(unpack(&normalized, 5)?, vec![3, 12]);
        Ok(())
    }

    #[test]
    fn raw_payload_pipeline() -> anyhow::Result<()> {
        let decode = |bytes: &[u8], width| -> anyhow::Result<Vec<Sample>> {
            let mut payload = BitBuffer::from_bytes(bytes);
            normalize(&mut payload, Trim::None)?;
            Ok(unpack(&payload, width)?)
        };

        assert_eq!(decode(&[0x12, 0x34], 4)?, vec![2, 1, 4, 3]);
        assert_eq!(decode(&[0x12, 0x34], 5)?, vec![-14, 0, 13]);
        assert_eq!(decode(&[0xB4], 3)?, vec![-4, -2]);
        assert_eq!(
            decode(&[0xC1, 0x0F, 0x5E, 0xF4, 0xC1], 5)?,
            vec![1, -2, 3, -4, 5, -6, 7, -8]
        );
        Ok(())
    }

    #[test]
    fn sample_count_law() -> anyhow::Result<()> {
        let payload = BitBuffer::from_bytes(&[0xA5, 0x5A, 0x3C, 0xC3, 0x0F]);

        for width in 0..=48u32 {
            let decoded = unpack(&payload, width)?;
            let (count, dropped) = sample_count(payload.len(), width);

            assert_eq!(decoded.len() as u64, count, "width {width}");
            if width > 0 {
                assert_eq!(payload.len() - count * width as u64, dropped);
            }
        }
        Ok(())
    }

    #[test]
    fn width_limits() -> anyhow::Result<()> {
        let payload = BitBuffer::from_bytes(&[0xFF; 9]);

        assert_eq!(unpack(&payload, 64)?, vec![-1]);
        assert_eq!(
            unpack(&payload, 65),
            Err(BitBufferError::UnsupportedWidth(65))
        );
        assert!(unpack(&payload, 100)?.is_empty());
        assert!(unpack(&BitBuffer::new(), 8)?.is_empty());
        Ok(())
    }
}
