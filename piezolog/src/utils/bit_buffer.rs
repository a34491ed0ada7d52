//! Owned, index-addressable bit sequence.
//!
//! Bits are packed MSB-first into bytes: bit 0 of the buffer is the most
//! significant bit of byte 0. The buffer length is tracked in bits, so a
//! buffer may end in the middle of its last byte; the unused low bits of that
//! byte are always zero.

use std::fmt;

use crate::utils::bitstream_io::BsIoSliceReader;
use crate::utils::errors::BitBufferError;

/// Largest chunk width that still fits a single sample integer.
pub const MAX_CHUNK_WIDTH: u32 = 64;

#[derive(Clone, Default, PartialEq, Eq)]
pub struct BitBuffer {
    bytes: Vec<u8>,
    len: u64,
}

impl BitBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(bits: u64) -> Self {
        Self {
            bytes: Vec::with_capacity(bits.div_ceil(8) as usize),
            len: 0,
        }
    }

    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            bytes: bytes.to_vec(),
            len: (bytes.len() as u64) << 3,
        }
    }

    /// Parses a string of `0` and `1` characters. Any other character is
    /// skipped, so `"1000_1101"` and `"1000 1101"` are accepted.
    pub fn from_bit_str(bits: &str) -> Self {
        let mut buffer = Self::with_capacity(bits.len() as u64);
        for c in bits.chars() {
            match c {
                '0' => buffer.push(false),
                '1' => buffer.push(true),
                _ => {}
            }
        }
        buffer
    }

    #[inline]
    pub fn len(&self) -> u64 {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn is_byte_aligned(&self) -> bool {
        self.len & 7 == 0
    }

    /// Packed storage. The last byte is zero-padded when the buffer is not
    /// byte-aligned.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    #[inline]
    pub fn bit(&self, index: u64) -> Option<bool> {
        if index >= self.len {
            return None;
        }
        let byte = self.bytes[(index >> 3) as usize];
        Some(byte & (0x80 >> (index & 7)) != 0)
    }

    #[inline]
    pub fn push(&mut self, bit: bool) {
        let shift = self.len & 7;
        if shift == 0 {
            self.bytes.push(0);
        }
        if bit {
            if let Some(last) = self.bytes.last_mut() {
                *last |= 0x80 >> shift;
            }
        }
        self.len += 1;
    }

    /// Appends the low `width` bits of `pattern`, most significant first.
    pub fn push_bits(&mut self, pattern: u64, width: u32) {
        for i in (0..width.min(MAX_CHUNK_WIDTH)).rev() {
            self.push((pattern >> i) & 1 != 0);
        }
    }

    /// Reverses the order of whole bytes: byte N becomes byte `count - 1 - N`.
    pub fn byte_reverse(&mut self) -> Result<(), BitBufferError> {
        if !self.is_byte_aligned() {
            return Err(BitBufferError::Alignment { len: self.len });
        }
        self.bytes.reverse();
        Ok(())
    }

    /// Reverses the order of all bits: bit i swaps with bit `len - 1 - i`.
    pub fn bit_reverse(&mut self) {
        self.bytes.reverse();
        for byte in &mut self.bytes {
            *byte = byte.reverse_bits();
        }

        // The zero padding of the last byte moved to the front.
        let pad = (self.bytes.len() as u64 * 8 - self.len) as u32;
        if pad != 0 {
            self.shift_left(pad);
        }
    }

    fn shift_left(&mut self, shift: u32) {
        let carry_shift = 8 - shift;
        let count = self.bytes.len();
        for i in 0..count {
            let next = self.bytes.get(i + 1).copied().unwrap_or(0);
            self.bytes[i] = (self.bytes[i] << shift) | (next >> carry_shift);
        }
        self.bytes.truncate(self.len.div_ceil(8) as usize);
    }

    /// Copies bits `start_bit..end_bit` into a new buffer.
    pub fn slice(&self, start_bit: u64, end_bit: u64) -> Result<BitBuffer, BitBufferError> {
        if start_bit > end_bit || end_bit > self.len {
            return Err(BitBufferError::Range {
                start: start_bit,
                end: end_bit,
                len: self.len,
            });
        }

        if start_bit & 7 == 0 {
            let first = (start_bit >> 3) as usize;
            let last = end_bit.div_ceil(8) as usize;
            let mut out = Self {
                bytes: self.bytes[first..last].to_vec(),
                len: end_bit - start_bit,
            };
            out.clear_padding();
            return Ok(out);
        }

        let mut out = Self::with_capacity(end_bit - start_bit);
        for index in start_bit..end_bit {
            out.push(self.bytes[(index >> 3) as usize] & (0x80 >> (index & 7)) != 0);
        }
        Ok(out)
    }

    fn clear_padding(&mut self) {
        let used = (self.len & 7) as u32;
        if used != 0 {
            if let Some(last) = self.bytes.last_mut() {
                *last &= 0xFFu8 << (8 - used);
            }
        }
    }

    /// Drops the first `count` bits in place.
    pub fn drop_front(&mut self, count: u64) -> Result<(), BitBufferError> {
        *self = self.slice(count, self.len)?;
        Ok(())
    }

    /// Reads the first `width` bits as an MSB-first pattern and returns it
    /// together with the bits that follow.
    pub fn read_chunk(&self, width: u32) -> Result<(u64, BitBuffer), BitBufferError> {
        if width > MAX_CHUNK_WIDTH {
            return Err(BitBufferError::UnsupportedWidth(width));
        }
        if width as u64 > self.len {
            return Err(BitBufferError::InsufficientBits {
                needed: width,
                available: self.len,
            });
        }

        let mut reader = BsIoSliceReader::from_bits(&self.bytes, self.len);
        let pattern = if width == 0 {
            0
        } else {
            reader
                .get_n::<u64>(width)
                .map_err(|_| BitBufferError::InsufficientBits {
                    needed: width,
                    available: self.len,
                })?
        };

        Ok((pattern, self.slice(width as u64, self.len)?))
    }

    /// Lazily yields consecutive `width`-bit patterns and stops as soon as
    /// fewer than `width` bits remain.
    pub fn chunks(&self, width: u32) -> Chunks<'_> {
        Chunks {
            reader: BsIoSliceReader::from_bits(&self.bytes, self.len),
            width,
        }
    }

    pub fn to_bit_string(&self) -> String {
        (0..self.len)
            .map(|i| if self.bit(i) == Some(true) { '1' } else { '0' })
            .collect()
    }
}

impl From<Vec<u8>> for BitBuffer {
    fn from(bytes: Vec<u8>) -> Self {
        let len = (bytes.len() as u64) << 3;
        Self { bytes, len }
    }
}

impl fmt::Debug for BitBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.len <= 128 {
            write!(f, "BitBuffer({} bits: {})", self.len, self.to_bit_string())
        } else {
            write!(f, "BitBuffer({} bits)", self.len)
        }
    }
}

/// Iterator over fixed-width chunks of a [`BitBuffer`].
#[derive(Debug)]
pub struct Chunks<'a> {
    reader: BsIoSliceReader<'a>,
    width: u32,
}

impl Iterator for Chunks<'_> {
    type Item = u64;

    fn next(&mut self) -> Option<Self::Item> {
        if self.width == 0 || self.width > MAX_CHUNK_WIDTH {
            return None;
        }
        self.reader.get_n::<u64>(self.width).ok()
    }
}

/// Reverses the low `width` bits of `pattern` in isolation.
#[inline]
pub fn reverse_chunk(pattern: u64, width: u32) -> u64 {
    match width {
        0 => 0,
        1..=MAX_CHUNK_WIDTH => pattern.reverse_bits() >> (MAX_CHUNK_WIDTH - width),
        _ => pattern,
    }
}

/// Two's-complement decode of the low `width` bits of `pattern`.
#[inline]
pub fn to_signed_int(pattern: u64, width: u32) -> i64 {
    match width {
        0 => 0,
        1..=MAX_CHUNK_WIDTH => {
            let shift = MAX_CHUNK_WIDTH - width;
            ((pattern << shift) as i64) >> shift
        }
        _ => pattern as i64,
    }
}
