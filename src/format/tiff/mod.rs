//! Classic TIFF structures shared by the reader and the builder.
//!
//! # Key Concepts
//!
//! - **Byte order**: TIFF streams declare their endianness (II = little-endian,
//!   MM = big-endian) in the header. All multi-byte values respect this order.
//!
//! - **IFD (Image File Directory)**: a table of 12-byte entries plus a pointer
//!   to the next IFD. EXIF data is a chain of IFDs (IFD0, IFD1) with child IFDs
//!   (Exif, GPSInfo, Iop) hanging off pointer tags.
//!
//! - **Inline vs offset values**: values of at most 4 bytes are stored in the
//!   entry itself, larger values are stored elsewhere and referenced by offset.
//!
//! - **Registry**: which field type a tag has and which tags point to child
//!   IFDs depends on the IFD the tag lives in; see [`TagIndex`].

mod ifd;
mod parser;
mod registry;
mod tags;
mod values;

pub use ifd::{parse_ifd_chain, Ifd, IfdEntry};
pub use parser::{
    ByteOrder, TiffHeader, ADDRESSABLE_AREA_START, DEFAULT_FIRST_IFD_OFFSET, TIFF_HEADER_SIZE,
};
pub use registry::{
    ChildIfdInfo, IndexedTag, TagIndex, IFD_EXIF, IFD_GPS, IFD_IOP, IFD_STANDARD,
    IMAGE_DATA_OFFSET_TAGS, TAG_EXIF_IFD_POINTER, TAG_GPS_IFD_POINTER, TAG_IOP_IFD_POINTER,
};
pub use tags::FieldType;
pub use values::{IfdTagEntryValueResolver, ValueResolver};
