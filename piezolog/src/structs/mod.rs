//! Data structures representing capture format components.
//!
//! Contains the frame header, frame bounds, and the decoded frame records
//! produced by the scanning pipeline.

pub mod frame;
pub mod header;
