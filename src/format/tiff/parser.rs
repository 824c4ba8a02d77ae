//! TIFF header parsing and writing.
//!
//! # TIFF Header Structure (8 bytes)
//! ```text
//! Bytes 0-1: Byte order (0x4949 = little-endian "II", 0x4D4D = big-endian "MM")
//! Bytes 2-3: Version (42 = 0x002A)
//! Bytes 4-7: Offset to first IFD (4 bytes)
//! ```
//!
//! All IFD offsets inside the stream are relative to the first byte of this
//! header, which is therefore the start of the addressable area.

use std::fmt;

use serde::Serialize;

use crate::error::TiffError;
use crate::io::{read_u16_be, read_u16_le, read_u32_be, read_u32_le};

// =============================================================================
// Constants
// =============================================================================

/// Magic bytes indicating little-endian byte order ("II" for Intel)
const BYTE_ORDER_LITTLE_ENDIAN: u16 = 0x4949;

/// Magic bytes indicating big-endian byte order ("MM" for Motorola)
const BYTE_ORDER_BIG_ENDIAN: u16 = 0x4D4D;

/// Version number for classic TIFF
const VERSION_TIFF: u16 = 42;

/// Version number for BigTIFF
const VERSION_BIGTIFF: u16 = 43;

/// Size of classic TIFF header in bytes
pub const TIFF_HEADER_SIZE: usize = 8;

/// Offsets inside the IFD stream are measured from the header's first byte.
pub const ADDRESSABLE_AREA_START: u32 = 0;

/// Where the first IFD goes when it directly follows the header.
pub const DEFAULT_FIRST_IFD_OFFSET: u32 = ADDRESSABLE_AREA_START + TIFF_HEADER_SIZE as u32;

// =============================================================================
// ByteOrder
// =============================================================================

/// Byte order (endianness) of a TIFF stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ByteOrder {
    /// Little-endian ("II" = Intel)
    LittleEndian,
    /// Big-endian ("MM" = Motorola)
    BigEndian,
}

impl ByteOrder {
    /// Read a u16 from a byte slice using this byte order.
    #[inline]
    pub fn read_u16(self, bytes: &[u8]) -> u16 {
        match self {
            ByteOrder::LittleEndian => read_u16_le(bytes),
            ByteOrder::BigEndian => read_u16_be(bytes),
        }
    }

    /// Read a u32 from a byte slice using this byte order.
    #[inline]
    pub fn read_u32(self, bytes: &[u8]) -> u32 {
        match self {
            ByteOrder::LittleEndian => read_u32_le(bytes),
            ByteOrder::BigEndian => read_u32_be(bytes),
        }
    }

    /// The two marker bytes that open a header in this byte order.
    #[inline]
    pub const fn marker(self) -> [u8; 2] {
        match self {
            ByteOrder::LittleEndian => *b"II",
            ByteOrder::BigEndian => *b"MM",
        }
    }
}

impl fmt::Display for ByteOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ByteOrder::LittleEndian => f.write_str("LittleEndian"),
            ByteOrder::BigEndian => f.write_str("BigEndian"),
        }
    }
}

// =============================================================================
// TiffHeader
// =============================================================================

/// Parsed classic TIFF header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TiffHeader {
    /// Byte order for all multi-byte values in the stream
    pub byte_order: ByteOrder,

    /// Offset to the first IFD
    pub first_ifd_offset: u32,
}

impl TiffHeader {
    /// Create a header for a stream whose first IFD is at `first_ifd_offset`.
    pub fn new(byte_order: ByteOrder, first_ifd_offset: u32) -> Self {
        Self {
            byte_order,
            first_ifd_offset,
        }
    }

    /// Parse a TIFF header from the start of `bytes`.
    ///
    /// `bytes` is the whole addressable area, so the first IFD offset is
    /// validated against its length.
    ///
    /// # Errors
    /// - `FileTooSmall` if there aren't enough bytes for the header
    /// - `InvalidMagic` if byte order bytes are not II or MM
    /// - `UnsupportedBigTiff` for version 43
    /// - `InvalidVersion` for anything else but 42
    /// - `InvalidIfdOffset` if the first IFD offset is outside the buffer
    pub fn parse(bytes: &[u8]) -> Result<Self, TiffError> {
        if bytes.len() < TIFF_HEADER_SIZE {
            return Err(TiffError::FileTooSmall {
                required: TIFF_HEADER_SIZE as u64,
                actual: bytes.len() as u64,
            });
        }

        // Read as little-endian because we're checking for specific byte patterns
        let magic = u16::from_le_bytes([bytes[0], bytes[1]]);
        let byte_order = match magic {
            BYTE_ORDER_LITTLE_ENDIAN => ByteOrder::LittleEndian,
            BYTE_ORDER_BIG_ENDIAN => ByteOrder::BigEndian,
            _ => return Err(TiffError::InvalidMagic(magic)),
        };

        let version = byte_order.read_u16(&bytes[2..4]);
        match version {
            VERSION_TIFF => {}
            VERSION_BIGTIFF => return Err(TiffError::UnsupportedBigTiff),
            _ => return Err(TiffError::InvalidVersion(version)),
        }

        let first_ifd_offset = byte_order.read_u32(&bytes[4..8]);
        if first_ifd_offset as usize >= bytes.len() {
            return Err(TiffError::InvalidIfdOffset(first_ifd_offset as u64));
        }

        Ok(TiffHeader {
            byte_order,
            first_ifd_offset,
        })
    }

    /// Encode this header.
    pub fn to_bytes(&self) -> [u8; TIFF_HEADER_SIZE] {
        let mut out = [0u8; TIFF_HEADER_SIZE];
        out[0..2].copy_from_slice(&self.byte_order.marker());

        let (version, offset) = match self.byte_order {
            ByteOrder::LittleEndian => (
                VERSION_TIFF.to_le_bytes(),
                self.first_ifd_offset.to_le_bytes(),
            ),
            ByteOrder::BigEndian => (
                VERSION_TIFF.to_be_bytes(),
                self.first_ifd_offset.to_be_bytes(),
            ),
        };
        out[2..4].copy_from_slice(&version);
        out[4..8].copy_from_slice(&offset);
        out
    }

    /// Size of an IFD entry in bytes (2 tag + 2 type + 4 count + 4 value/offset).
    pub const IFD_ENTRY_SIZE: usize = 12;

    /// Size of the entry count field at the start of an IFD.
    pub const IFD_COUNT_SIZE: usize = 2;

    /// Size of the next IFD offset field at the end of an IFD.
    pub const IFD_NEXT_OFFSET_SIZE: usize = 4;
}

// =============================================================================
// Tests
// =============================================================================
