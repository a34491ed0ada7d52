//! Undoing the hardware serialization order.
//!
//! The capture link emits samples LSB first and bytes last-to-first:
//!
//! ```text
//!  byte 1            byte 2            ...  byte X
//!  B2 B1 B0 A4..A0   D0 C4..C0 B4 B3   ...  Z3..Z0 Y4..Y1
//! ```
//!
//! Reversing the byte order and then every bit of the buffer yields
//!
//! ```text
//!  A0..A4 B0 B1 B2   B3 B4 C0..C4 D0   ...  Y1..Y4
//! ```
//!
//! where each `width`-bit chunk is one sample with its own bits reversed.
//! That last per-chunk reversal is done by the unpacker.

use log::trace;

use crate::utils::bit_buffer::BitBuffer;
use crate::utils::errors::BitBufferError;

/// Optional trimming applied between the byte and bit reversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Trim {
    #[default]
    None,
    /// Drop this many leading bits of the byte-reversed buffer. These end up
    /// as the trailing bits after the bit reversal.
    Leading(u64),
}

/// Byte-reverses then bit-reverses `payload` in place.
pub fn normalize(payload: &mut BitBuffer, trim: Trim) -> Result<(), BitBufferError> {
    payload.byte_reverse()?;

    if let Trim::Leading(count) = trim {
        if count > 0 {
            trace!("Trimming {count} unfinished bits");
            payload.drop_front(count)?;
        }
    }

    payload.bit_reverse();
    Ok(())
}

/// Leading trim that leaves a multiple of `width` bits in a legacy payload
/// spanning `start_offset..end_offset`.
pub fn legacy_trim(start_offset: u64, end_offset: u64, width: u32) -> Trim {
    if width == 0 {
        return Trim::None;
    }
    Trim::Leading((end_offset - start_offset) % width as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reverses_bits_within_each_byte() -> anyhow::Result<()> {
        let mut payload = BitBuffer::from_bytes(&[0x12, 0x34]);
        normalize(&mut payload, Trim::None)?;

        assert_eq!(payload.as_bytes(), &[0x48, 0x2C]);
        Ok(())
    }

    #[test]
    fn unaligned_payload_is_rejected() {
        let mut payload = BitBuffer::from_bit_str("1011");
        assert_eq!(
            normalize(&mut payload, Trim::None),
            Err(BitBufferError::Alignment { len: 4 })
        );
    }

    #[test]
    fn leading_trim_drops_tail() -> anyhow::Result<()> {
        let mut payload = BitBuffer::from_bytes(&[0x12, 0x34]);
        normalize(&mut payload, legacy_trim(0, 16, 5))?;

        assert_eq!(payload.len(), 15);
        assert_eq!(payload.to_bit_string(), "010010000010110");
        Ok(())
    }

    #[test]
    fn trim_amount() {
        assert_eq!(legacy_trim(16, 56, 5), Trim::Leading(0));
        assert_eq!(legacy_trim(16, 32, 5), Trim::Leading(1));
        assert_eq!(legacy_trim(16, 32, 0), Trim::None);
    }
}
