//! Tag value resolution.
//!
//! A parsed [`IfdEntry`] only carries its type, count and the raw 4-byte
//! value/offset field. Resolving it means returning the full value bytes:
//! either the leading bytes of that field (inline values) or the byte run
//! it points to in the backing buffer.
//!
//! Resolved bytes are kept in the stream's byte order, so they can be handed
//! to a builder in the same byte order and re-encoded unchanged.

use bytes::Bytes;

use crate::error::ValueError;

use super::ifd::IfdEntry;
use super::parser::ByteOrder;

// =============================================================================
// ValueResolver
// =============================================================================

/// Turns a raw entry into its canonical value bytes.
pub trait ValueResolver {
    /// Resolve the value bytes for `entry`.
    ///
    /// Fails with [`ValueError::UnresolvedType`] for unknown field types.
    fn value_bytes(&self, entry: &IfdEntry) -> Result<Bytes, ValueError>;
}

/// Resolves entries against the buffer they were parsed from.
///
/// The buffer must start at the addressable area (the TIFF header), since
/// value offsets are relative to it.
#[derive(Debug, Clone)]
pub struct IfdTagEntryValueResolver {
    data: Bytes,
    byte_order: ByteOrder,
}

impl IfdTagEntryValueResolver {
    /// Create a resolver over `data`.
    pub fn new(data: Bytes, byte_order: ByteOrder) -> Self {
        Self { data, byte_order }
    }

    #[inline]
    pub fn byte_order(&self) -> ByteOrder {
        self.byte_order
    }
}

impl ValueResolver for IfdTagEntryValueResolver {
    fn value_bytes(&self, entry: &IfdEntry) -> Result<Bytes, ValueError> {
        let size = entry
            .value_byte_size()
            .ok_or(ValueError::UnresolvedType(entry.field_type_raw))?;

        if entry.is_inline() {
            return Ok(Bytes::copy_from_slice(
                &entry.value_offset_bytes[..size as usize],
            ));
        }

        let offset = entry.value_offset(self.byte_order) as u64;
        let end = offset + size;
        if end > self.data.len() as u64 {
            return Err(ValueError::OutOfBounds {
                offset,
                size,
                len: self.data.len() as u64,
            });
        }

        // Zero-copy view into the backing buffer
        Ok(self.data.slice(offset as usize..end as usize))
    }
}

// =============================================================================
// Tests
// =============================================================================
