use log::Level::Warn;
use log::{debug, trace};

use crate::log_or_err;
use crate::process::locate::FrameLocator;
pub use crate::process::locate::Markers;
use crate::process::normalize::{Trim, legacy_trim, normalize};
use crate::process::unpack::{sample_count, unpack};
use crate::structs::frame::{DecodedFrame, Frame, FrameBounds};
use crate::structs::header::{FrameHeader, HEADER_BITS, SourceKind};
use crate::utils::bit_buffer::BitBuffer;
use crate::utils::errors::{BitBufferError, ScanError};

/// Bits at the end of a framed extent that carry no payload. The extent
/// includes the end marker, so by default this is exactly the marker.
pub const DEFAULT_TRAILING_RESERVE_BITS: u64 = 16;

/// Sample width used by legacy captures when none is configured.
pub const DEFAULT_LEGACY_WIDTH: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanMode {
    /// Any number of frames, each with a 3-byte header.
    Framed,
    /// A single headerless frame of fixed-width samples.
    Legacy { width: u32 },
}

#[derive(Debug, Clone)]
pub struct ScanConfig {
    pub mode: ScanMode,
    pub markers: Markers,
    pub trailing_reserve_bits: u64,
    /// Warnings at or above this level abort the scan.
    pub fail_level: log::Level,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            mode: ScanMode::Framed,
            markers: Markers::default(),
            trailing_reserve_bits: DEFAULT_TRAILING_RESERVE_BITS,
            fail_level: log::Level::Error,
        }
    }
}

impl ScanConfig {
    pub fn legacy(width: u32) -> Self {
        Self {
            mode: ScanMode::Legacy { width },
            ..Default::default()
        }
    }
}

/// Decodes every frame of a capture.
///
/// # Example
///
/// ```rust
/// use piezolog::process::encode::CaptureEncoder;
/// use piezolog::process::scan::{CaptureScanner, ScanConfig};
/// use piezolog::structs::header::{FrameHeader, SourceKind};
///
/// let header = FrameHeader {
///     source: SourceKind::Adc,
///     freq_code: 3,
///     sample_width: 8,
/// };
/// let capture = CaptureEncoder::default().encode_frame(&header, &[-3, 0, 42])?;
///
/// let frames = CaptureScanner::new(ScanConfig::default()).scan(&capture)?;
/// assert_eq!(frames.len(), 1);
/// assert_eq!(frames[0].frequency_hz(), Some(1_000_000));
/// assert_eq!(frames[0].samples, vec![-3, 0, 42]);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct CaptureScanner {
    config: ScanConfig,
    locator: FrameLocator,
}

impl CaptureScanner {
    pub fn new(config: ScanConfig) -> Self {
        Self {
            locator: FrameLocator::new(config.markers.clone()),
            config,
        }
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Decodes all frames of `capture`.
    ///
    /// Any error aborts the whole scan and frames decoded before it are
    /// discarded. A capture without a start marker yields no frames.
    pub fn scan(&self, capture: &[u8]) -> Result<Vec<DecodedFrame>, ScanError> {
        self.frames(capture).collect()
    }

    /// Lazily decodes frames of `capture` in file order.
    ///
    /// The iterator ends after the first error.
    pub fn frames(&self, capture: &[u8]) -> Frames<'_> {
        Frames {
            scanner: self,
            buffer: BitBuffer::from_bytes(capture),
            cursor: 0,
            index: 0,
            done: false,
        }
    }

    fn extract(
        &self,
        buffer: &BitBuffer,
        bounds: &FrameBounds,
        index: usize,
    ) -> Result<Frame, ScanError> {
        match self.config.mode {
            ScanMode::Legacy { .. } => Ok(Frame {
                start_offset: bounds.start_bit,
                end_offset: bounds.end_bit,
                header: None,
                payload: buffer.slice(bounds.start_bit, bounds.end_bit)?,
            }),
            ScanMode::Framed => {
                // The end marker is read as part of the frame.
                let extent_end = self.locator.next_cursor(bounds);

                let header_end = (bounds.start_bit + HEADER_BITS).min(extent_end);
                let header = FrameHeader::parse(&buffer.slice(bounds.start_bit, header_end)?)?;
                if let SourceKind::Unknown(byte) = header.source {
                    return Err(ScanError::UnrecognizedSource { byte, index });
                }

                let payload_start = bounds.start_bit + HEADER_BITS;
                let payload_end = extent_end
                    .checked_sub(self.config.trailing_reserve_bits)
                    .ok_or(BitBufferError::Range {
                        start: payload_start,
                        end: 0,
                        len: buffer.len(),
                    })?;

                Ok(Frame {
                    start_offset: bounds.start_bit,
                    end_offset: bounds.end_bit,
                    header: Some(header),
                    payload: buffer.slice(payload_start, payload_end)?,
                })
            }
        }
    }

    fn decode(&self, frame: Frame, index: usize) -> Result<DecodedFrame, ScanError> {
        let Frame {
            start_offset,
            end_offset,
            header,
            mut payload,
        } = frame;

        let (width, trim) = match (self.config.mode, &header) {
            (ScanMode::Legacy { width }, _) => {
                (width, legacy_trim(start_offset, end_offset, width))
            }
            (ScanMode::Framed, Some(header)) => (header.sample_width as u32, Trim::None),
            (ScanMode::Framed, None) => (0, Trim::None),
        };

        self.check(header.as_ref(), width, index)?;

        let payload_bits = payload.len();
        debug!(
            "Frame {index} ({}): reading {payload_bits} bits at {start_offset}..{end_offset}",
            header.map_or("legacy".to_string(), |h| h.source.to_string()),
        );

        normalize(&mut payload, trim)?;
        trace!("Frame {index} normalized: {payload:?}");

        let samples = unpack(&payload, width)?;
        let (count, dropped_bits) = sample_count(payload_bits, width);
        debug_assert_eq!(samples.len() as u64, count);

        Ok(DecodedFrame {
            index,
            header,
            samples,
            sample_width: width,
            start_offset,
            end_offset,
            payload_bits,
            dropped_bits,
        })
    }

    fn check(&self, header: Option<&FrameHeader>, width: u32, index: usize) -> Result<(), ScanError> {
        if width == 0 {
            log_or_err!(
                self.config,
                Warn,
                ScanError::Strict {
                    index,
                    message: "sample width is zero, frame yields no samples".to_string(),
                }
            );
        }

        if let Some(header) = header {
            if header.source == SourceKind::Comparator
                && header.frequency_hz().is_none_or(|hz| hz == 0)
            {
                log_or_err!(
                    self.config,
                    Warn,
                    ScanError::Strict {
                        index,
                        message: format!(
                            "comparator frequency code {} has no defined sampling rate",
                            header.freq_code
                        ),
                    }
                );
            }
        }

        Ok(())
    }
}

/// Iterator returned by [`CaptureScanner::frames`].
#[derive(Debug)]
pub struct Frames<'a> {
    scanner: &'a CaptureScanner,
    buffer: BitBuffer,
    cursor: u64,
    index: usize,
    done: bool,
}

impl Frames<'_> {
    /// Number of frames located so far.
    pub fn frames_located(&self) -> usize {
        self.index
    }
}

impl Iterator for Frames<'_> {
    type Item = Result<DecodedFrame, ScanError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let bounds = match self
            .scanner
            .locator
            .find_next_frame(&self.buffer, self.cursor)
        {
            Ok(Some(bounds)) => bounds,
            Ok(None) => {
                debug!("No further start marker, {} frame(s) found", self.index);
                self.done = true;
                return None;
            }
            Err(e) => {
                self.done = true;
                return Some(Err(e));
            }
        };

        self.cursor = self.scanner.locator.next_cursor(&bounds);
        self.index += 1;

        let result = self
            .scanner
            .extract(&self.buffer, &bounds, self.index)
            .and_then(|frame| self.scanner.decode(frame, self.index));

        if result.is_err() || matches!(self.scanner.config.mode, ScanMode::Legacy { .. }) {
            self.done = true;
        }

        Some(result)
    }
}

impl std::iter::FusedIterator for Frames<'_> {}
