//! IFD builder and encoder.
//!
//! This module provides the write side of the crate:
//!
//! - [`IfdBuilder`] - mutable model of one IFD, its child IFDs and its chain
//! - [`BuilderTag`] / [`IfdBuilderTagValue`] - entries and their values
//! - [`import_chain`] - rebuild builders from a parsed [`Ifd`](crate::format::tiff::Ifd) graph
//! - [`IfdByteEncoder`] - lay out and serialize a builder chain
//!
//! # Example
//!
//! ```rust
//! use ifd_builder::{BuilderTag, ByteOrder, IfdBuilder, IfdByteEncoder};
//!
//! let mut exif = IfdBuilder::new("Exif", ByteOrder::BigEndian);
//! exif.add(BuilderTag::from_bytes(0x9000, &b"0231"[..])).unwrap();
//!
//! let mut ifd0 = IfdBuilder::new("IFD", ByteOrder::BigEndian);
//! ifd0.add(BuilderTag::from_bytes(0x010F, &b"Canon\0"[..])).unwrap();
//! ifd0.add_child_ifd(exif).unwrap();
//!
//! let tiff = IfdByteEncoder::default().encode_to_tiff(&ifd0).unwrap();
//! assert_eq!(&tiff[..4], &[0x4D, 0x4D, 0x00, 0x2A]);
//! ```

mod encode;
mod ifd;
mod import;
mod summary;
mod tag;

pub use encode::{IfdByteEncoder, IfdOffsetIterator};
pub use ifd::IfdBuilder;
pub use import::{import_chain, ImportReport, SkippedTag};
pub use summary::{IfdSummary, TagSummary};
pub use tag::{BuilderTag, IfdBuilderTagValue};
