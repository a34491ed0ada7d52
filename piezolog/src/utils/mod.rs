//! Utility functions and supporting infrastructure.
//!
//! Provides the packed bit buffer, bit-level reading and the error types
//! shared by the decoding pipeline.

pub mod bit_buffer;
pub mod bitstream_io;
pub mod errors;
