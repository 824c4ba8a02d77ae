//! # IFD Builder
//!
//! Builds and serializes TIFF Image File Directories (IFDs), the tag
//! directory structure behind TIFF, EXIF and GPS metadata.
//!
//! An IFD tree is edited through [`IfdBuilder`]: plain tags hold their value
//! bytes, child IFDs (Exif, GPSInfo, Iop) hang off pointer tags, and top-level
//! IFDs form a singly linked chain. [`IfdByteEncoder`] lays the tree out in
//! one forward pass, placing small values inline and larger ones after each
//! table, and patches every child and next-IFD offset.
//!
//! ## Architecture
//!
//! - [`io`] - byte-order aware reading and writing primitives
//! - [`mod@format`] - classic TIFF reader, tag registry and value resolution
//! - [`builder`] - builders, importer and encoder
//! - [`config`] - CLI and configuration types
//!
//! ## Example
//!
//! ```rust,no_run
//! use bytes::Bytes;
//! use ifd_builder::{parse_ifd_chain, IfdBuilder, IfdByteEncoder, TagIndex};
//!
//! let data = Bytes::from(std::fs::read("photo.tif").unwrap());
//! let root = parse_ifd_chain(&data, TagIndex::standard()).unwrap();
//!
//! let mut report = IfdBuilder::from_existing_chain(&root, data.clone()).unwrap();
//! report.root.delete_all(0x0131); // Software
//!
//! let tiff = IfdByteEncoder::default().encode_to_tiff(&report.root).unwrap();
//! std::fs::write("photo-clean.tif", tiff).unwrap();
//! ```

pub mod builder;
pub mod config;
pub mod error;
pub mod format;
pub mod io;

// Re-export commonly used types
pub use builder::{
    import_chain, BuilderTag, IfdBuilder, IfdBuilderTagValue, IfdByteEncoder, IfdOffsetIterator,
    IfdSummary, ImportReport, SkippedTag, TagSummary,
};
pub use config::{Cli, Command, DumpConfig, RebuildConfig};
pub use error::{BuilderError, EncodeError, TiffError, ValueError};
pub use format::tiff::{
    parse_ifd_chain, ByteOrder, FieldType, Ifd, IfdEntry, IfdTagEntryValueResolver, TagIndex,
    TiffHeader, ValueResolver, ADDRESSABLE_AREA_START, DEFAULT_FIRST_IFD_OFFSET, IFD_EXIF,
    IFD_GPS, IFD_IOP, IFD_STANDARD, IMAGE_DATA_OFFSET_TAGS, TIFF_HEADER_SIZE,
};
