//! Format support for TIFF-derived metadata.
//!
//! The reader side lives here: header parsing, the read-only IFD graph, the
//! tag registry and value resolution. The write side is in [`crate::builder`].

pub mod tiff;
