use thiserror::Error;

/// Errors that can occur when parsing TIFF files
#[derive(Debug, Clone, Error)]
pub enum TiffError {
    /// Invalid TIFF magic bytes (not II or MM)
    #[error("Invalid TIFF magic bytes: expected 0x4949 (II) or 0x4D4D (MM), got 0x{0:04X}")]
    InvalidMagic(u16),

    /// Invalid TIFF version number
    #[error("Invalid TIFF version: expected 42, got {0}")]
    InvalidVersion(u16),

    /// BigTIFF uses 20-byte entries and 64-bit offsets, which this crate does not read
    #[error("Unsupported format: BigTIFF (version 43) is not supported")]
    UnsupportedBigTiff,

    /// Buffer is too small to contain the structure being read
    #[error("File too small: need at least {required} bytes, got {actual}")]
    FileTooSmall { required: u64, actual: u64 },

    /// Invalid IFD offset (points outside file or to invalid location)
    #[error("Invalid IFD offset: {0}")]
    InvalidIfdOffset(u64),

    /// An IFD offset was reached twice while walking the file
    #[error("IFD loop detected at offset {0}")]
    IfdLoop(u64),
}

/// Errors raised while resolving the value bytes of a parsed entry
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueError {
    /// The entry's field type is not one of the known TIFF types
    #[error("Unresolved field type: {0}")]
    UnresolvedType(u16),

    /// The value lies (partly) outside the backing buffer
    #[error("Value out of bounds: {size} bytes at offset {offset}, buffer is {len} bytes")]
    OutOfBounds { offset: u64, size: u64, len: u64 },
}

/// Errors returned by [`IfdBuilder`](crate::builder::IfdBuilder) operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuilderError {
    /// No entry with the given tag id exists in the directory
    #[error("Tag entry not found: 0x{0:04X}")]
    EntryNotFound(u16),

    /// A value union was used as the wrong variant
    #[error("Invalid value union: {0}")]
    InvalidValueUnion(String),

    /// A builder cannot be attached as a child of this directory
    #[error("Invalid child IFD: {0}")]
    InvalidChildDirectory(String),

    /// Position is outside the current entry list
    #[error("Position {position} out of range (directory has {len} entries)")]
    IndexOutOfRange { position: usize, len: usize },

    /// Deletion count must be at least 1
    #[error("Invalid count: {0} (must be at least 1)")]
    InvalidCount(usize),
}

/// Errors that abort an encode
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    /// An entry's child marker and value variant disagree
    #[error("Structural violation in IFD [{ifd}] tag 0x{tag_id:04X}: {message}")]
    InvalidValueUnion {
        ifd: String,
        tag_id: u16,
        message: String,
    },

    /// No explicit type on the entry and none in the registry
    #[error("Unknown tag 0x{tag_id:04X} in IFD [{ifd}]: no field type available")]
    UnknownTag { ifd: String, tag_id: u16 },

    /// Value length is not a whole number of units of its type
    #[error("Tag 0x{tag_id:04X}: value of {len} bytes is not a multiple of unit size {unit_size}")]
    ValueSizeMismatch {
        tag_id: u16,
        len: usize,
        unit_size: usize,
    },

    /// The 16-bit entry count field cannot hold the directory
    #[error("IFD [{ifd}] has {count} entries (maximum is 65535)")]
    TooManyEntries { ifd: String, count: usize },

    /// An allocation would run past the 32-bit addressable area
    #[error("Offset overflow: cannot reserve {size} bytes at offset {offset}")]
    OffsetOverflow { offset: u32, size: u64 },

    /// Every directory of one chain must use the root's byte order
    #[error("IFD [{ifd}] does not use the chain's byte order")]
    ByteOrderMismatch { ifd: String },

    /// A back-patched field lies outside the bytes written so far
    #[error("Cannot patch 4 bytes at position {position}: only {len} bytes written")]
    PatchOutOfRange { position: usize, len: usize },

    /// Internal sizing and emitted bytes disagree
    #[error("Layout mismatch in IFD [{ifd}]: expected {expected} bytes, produced {actual}")]
    LayoutMismatch {
        ifd: String,
        expected: usize,
        actual: usize,
    },
}
