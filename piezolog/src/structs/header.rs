//! Frame header describing the sample source.
//!
//! ## Layout
//!
//! Three bytes directly after the start marker:
//!
//! | Byte | Field          | Meaning                                   |
//! |------|----------------|-------------------------------------------|
//! | 0    | `source`       | ASCII `'A'` (ADC) or `'C'` (comparator)   |
//! | 1    | `freq_code`    | Sampling-rate code, see [`FrameHeader::frequency_hz`] |
//! | 2    | `sample_width` | Bits per sample                           |
//!
//! The width is not range-checked here. A zero width, or one wider than the
//! payload, simply produces no samples further down the pipeline.

use std::fmt;

use crate::utils::bit_buffer::BitBuffer;
use crate::utils::bitstream_io::BsIoSliceReader;
use crate::utils::errors::BitBufferError;

/// Size of the header in bits.
pub const HEADER_BITS: u64 = 24;

pub const SOURCE_ADC: u8 = b'A';
pub const SOURCE_COMPARATOR: u8 = b'C';

/// ADC sampling rate step per frequency code, in Hz.
pub const ADC_FREQ_STEP_HZ: u32 = 250_000;

/// Comparator code that selects the fast sampling clock.
pub const COMPARATOR_FAST_CODE: u8 = 5;
pub const COMPARATOR_FAST_HZ: u32 = 25_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    Adc,
    Comparator,
    Unknown(u8),
}

impl SourceKind {
    pub fn from_byte(byte: u8) -> Self {
        match byte {
            SOURCE_ADC => Self::Adc,
            SOURCE_COMPARATOR => Self::Comparator,
            other => Self::Unknown(other),
        }
    }

    /// Short lowercase tag, also used as the dump file prefix.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Adc => "adc",
            Self::Comparator => "comp",
            Self::Unknown(_) => "unknown",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Adc => write!(f, "ADC"),
            Self::Comparator => write!(f, "COMP"),
            Self::Unknown(byte) => write!(f, "Unknown({byte:#04X})"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    pub source: SourceKind,
    pub freq_code: u8,
    pub sample_width: u8,
}

impl FrameHeader {
    /// Parses the header from the first 24 bits of `buffer`.
    pub fn parse(buffer: &BitBuffer) -> Result<Self, BitBufferError> {
        if buffer.len() < HEADER_BITS {
            return Err(BitBufferError::Range {
                start: 0,
                end: HEADER_BITS,
                len: buffer.len(),
            });
        }

        let mut reader = BsIoSliceReader::from_bits(buffer.as_bytes(), buffer.len());
        Self::read(&mut reader).map_err(|_| BitBufferError::InsufficientBits {
            needed: HEADER_BITS as u32,
            available: buffer.len(),
        })
    }

    pub fn read(reader: &mut BsIoSliceReader) -> std::io::Result<Self> {
        Ok(Self {
            source: SourceKind::from_byte(reader.get_n(8)?),
            freq_code: reader.get_n(8)?,
            sample_width: reader.get_n(8)?,
        })
    }

    /// Sampling frequency derived from the source and frequency code.
    ///
    /// Comparator frames only define code 5 (25 MHz). Any other non-zero
    /// code maps to 0 Hz and code 0 leaves the frequency unset, returned as
    /// `None`. Unknown sources have no frequency.
    pub fn frequency_hz(&self) -> Option<u32> {
        match self.source {
            SourceKind::Adc => Some(self.freq_code as u32 * ADC_FREQ_STEP_HZ + ADC_FREQ_STEP_HZ),
            SourceKind::Comparator => match self.freq_code {
                COMPARATOR_FAST_CODE => Some(COMPARATOR_FAST_HZ),
                0 => None,
                _ => Some(0),
            },
            SourceKind::Unknown(_) => None,
        }
    }

    pub fn to_bytes(&self) -> [u8; 3] {
        let source = match self.source {
            SourceKind::Adc => SOURCE_ADC,
            SourceKind::Comparator => SOURCE_COMPARATOR,
            SourceKind::Unknown(byte) => byte,
        };
        [source, self.freq_code, self.sample_width]
    }
}
