//! Bit-level reading over packed MSB-first bytes.
//!
//! Thin wrapper around `bitstream_io::BitReader` that knows the logical bit
//! length of the data, so reads never run into the padding bits at the end of
//! a non byte-aligned buffer.

use std::io;

use bitstream_io::{BigEndian, BitRead, BitReader, UnsignedInteger};

#[derive(Debug)]
pub struct BitstreamIoReader<R: io::Read + io::Seek> {
    bs: BitReader<R, BigEndian>,
    len: u64,
}

pub type BsIoSliceReader<'a> = BitstreamIoReader<io::Cursor<&'a [u8]>>;

impl<R> BitstreamIoReader<R>
where
    R: io::Read + io::Seek,
{
    pub fn new(read: R, len_bits: u64) -> Self {
        Self {
            bs: BitReader::new(read),
            len: len_bits,
        }
    }

    #[inline(always)]
    pub fn get_n<I: UnsignedInteger>(&mut self, n: u32) -> io::Result<I> {
        if n as u64 > self.available()? {
            return Err(self.out_of_bounds("get_n", n));
        }
        self.bs.read_unsigned_var(n)
    }

    #[inline(always)]
    pub fn available(&mut self) -> io::Result<u64> {
        self.bs
            .position_in_bits()
            .map(|pos| self.len.saturating_sub(pos))
    }

    fn out_of_bounds(&mut self, op: &str, n: u32) -> io::Error {
        io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!(
                "{op}({n}): out of bounds bits at {}",
                self.bs.position_in_bits().unwrap_or(0)
            ),
        )
    }
}

impl<'a> BsIoSliceReader<'a> {
    /// Reader over the first `len_bits` bits of `buf`.
    pub fn from_bits(buf: &'a [u8], len_bits: u64) -> Self {
        let len = len_bits.min((buf.len() as u64) << 3);
        Self::new(io::Cursor::new(buf), len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_respect_logical_length() -> anyhow::Result<()> {
        let mut reader = BsIoSliceReader::from_bits(&[0b1011_0000], 4);

        assert_eq!(reader.get_n::<u8>(3)?, 0b101);
        assert_eq!(reader.available()?, 1);
        assert_eq!(reader.get_n::<u8>(1)?, 1);
        assert!(reader.get_n::<u8>(1).is_err());
        Ok(())
    }

    #[test]
    fn wide_reads() -> anyhow::Result<()> {
        let data = [0xFF; 9];
        let mut reader = BsIoSliceReader::from_bits(&data, 72);

        assert_eq!(reader.get_n::<u8>(8)?, 0xFF);
        assert_eq!(reader.get_n::<u64>(64)?, u64::MAX);
        assert!(reader.get_n::<u8>(1).is_err());
        Ok(())
    }

    #[test]
    fn length_clamped_to_data() -> anyhow::Result<()> {
        let mut reader = BsIoSliceReader::from_bits(&[0xA5], 100);

        assert_eq!(reader.available()?, 8);
        assert!(reader.get_n::<u16>(9).is_err());
        Ok(())
    }
}
