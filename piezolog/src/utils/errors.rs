/// Returns `$err` when `$level` is at or above the configured fail level,
/// otherwise logs it at `$level` and carries on.
#[macro_export]
macro_rules! log_or_err {
    ($state:expr, $level:expr, $err:expr $(,)?) => {{
        if $level <= $state.fail_level {
            return Err($err);
        } else {
            match $level {
                ::log::Level::Error => ::log::error!("{}", $err),
                ::log::Level::Warn => ::log::warn!("{}", $err),
                ::log::Level::Info => ::log::info!("{}", $err),
                ::log::Level::Debug => ::log::debug!("{}", $err),
                ::log::Level::Trace => ::log::trace!("{}", $err),
            }
        }
    }};
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum BitBufferError {
    #[error("Buffer of {len} bits is not byte-aligned")]
    Alignment { len: u64 },

    #[error("Bit range {start}..{end} is out of bounds for a buffer of {len} bits")]
    Range { start: u64, end: u64, len: u64 },

    #[error("Need {needed} bits but only {available} remain")]
    InsufficientBits { needed: u32, available: u64 },

    #[error("Sample width of {0} bits exceeds the supported maximum of 64")]
    UnsupportedWidth(u32),
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ScanError {
    #[error("Start marker ending at bit {start_bit} has no matching end marker")]
    UnterminatedFrame { start_bit: u64 },

    #[error("Source {byte:#04X} of frame {index} not recognized, data may be corrupt")]
    UnrecognizedSource { byte: u8, index: usize },

    #[error("Frame {index}: {message}")]
    Strict { index: usize, message: String },

    #[error(transparent)]
    Bits(#[from] BitBufferError),
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    #[error("Sample {value} does not fit in {width} bits")]
    SampleOutOfRange { value: i64, width: u32 },

    #[error("Sample width must be between 1 and 64 bits, got {0}")]
    UnsupportedWidth(u32),

    #[error(transparent)]
    Bits(#[from] BitBufferError),
}
