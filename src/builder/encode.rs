//! Serialization of a builder chain into classic TIFF IFD bytes.
//!
//! # Layout
//! ```text
//! IFD:    [count:2][entry:12 x N][next:4][out-of-line data]
//! Entry:  [tag:2][type:2][count:4][value or offset:4]
//! ```
//!
//! Each IFD is one allocation holding its table and out-of-line data. Child
//! IFDs are allocated after their parent's region, depth-first in entry
//! order, and their base offset is back-filled into the parent's entry. The
//! next top-level IFD is allocated after the current one and all of its
//! children. Out-of-line values are padded to an even length so that every
//! offset stays word aligned.

use bytes::BytesMut;
use tracing::{debug, trace};

use crate::error::EncodeError;
use crate::format::tiff::{
    ByteOrder, FieldType, TagIndex, TiffHeader, DEFAULT_FIRST_IFD_OFFSET,
};
use crate::io::ByteWriter;

use super::ifd::IfdBuilder;
use super::tag::{BuilderTag, IfdBuilderTagValue};

// =============================================================================
// IfdOffsetIterator
// =============================================================================

/// Forward-only allocation cursor over the addressable area.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IfdOffsetIterator {
    offset: u32,
}

impl IfdOffsetIterator {
    /// Start allocating at `start`.
    pub fn new(start: u32) -> Self {
        Self { offset: start }
    }

    /// Next free offset.
    #[inline]
    pub fn offset(&self) -> u32 {
        self.offset
    }

    /// Reserve `size` bytes and return the offset they start at.
    pub fn reserve(&mut self, size: usize) -> Result<u32, EncodeError> {
        let start = self.offset;
        let end = u32::try_from(size)
            .ok()
            .and_then(|size| start.checked_add(size))
            .ok_or(EncodeError::OffsetOverflow {
                offset: start,
                size: size as u64,
            })?;

        self.offset = end;
        Ok(start)
    }
}

// =============================================================================
// Entry layout
// =============================================================================

/// How one entry will be written.
enum EntryLayout<'a> {
    /// Pointer to a child IFD, back-filled once the child is placed
    Child(&'a IfdBuilder),

    /// Plain value
    Value {
        field_type: FieldType,
        count: u32,
        bytes: &'a [u8],
    },
}

impl EntryLayout<'_> {
    /// Bytes this entry needs in the IFD's data region.
    fn data_size(&self) -> usize {
        match self {
            EntryLayout::Value { bytes, .. } if bytes.len() > FieldType::INLINE_THRESHOLD => {
                bytes.len() + bytes.len() % 2
            }
            _ => 0,
        }
    }
}

/// Size of an IFD table with `entry_count` entries.
fn table_size_for(entry_count: usize) -> usize {
    TiffHeader::IFD_COUNT_SIZE
        + entry_count * TiffHeader::IFD_ENTRY_SIZE
        + TiffHeader::IFD_NEXT_OFFSET_SIZE
}

// =============================================================================
// IfdByteEncoder
// =============================================================================

/// Encodes builder chains, looking up field types in a [`TagIndex`].
#[derive(Debug, Clone, Copy)]
pub struct IfdByteEncoder<'a> {
    index: &'a TagIndex,
}

impl Default for IfdByteEncoder<'static> {
    fn default() -> Self {
        Self::new(TagIndex::standard())
    }
}

impl<'a> IfdByteEncoder<'a> {
    pub fn new(index: &'a TagIndex) -> Self {
        Self { index }
    }

    /// Size of the table of `ib`: count, entries and next offset.
    pub fn table_size(&self, ib: &IfdBuilder) -> usize {
        table_size_for(ib.tags().len())
    }

    /// Size of the out-of-line data region of `ib`, excluding children.
    pub fn data_size(&self, ib: &IfdBuilder) -> Result<usize, EncodeError> {
        let mut size = 0;
        for tag in ib.tags() {
            size += self.entry_layout(ib, tag)?.data_size();
        }
        Ok(size)
    }

    /// Encode the chain for a first IFD at [`DEFAULT_FIRST_IFD_OFFSET`].
    ///
    /// The result is meant to follow an 8-byte TIFF header.
    pub fn encode_to_bytes(&self, root: &IfdBuilder) -> Result<Vec<u8>, EncodeError> {
        self.encode_to_bytes_at(root, DEFAULT_FIRST_IFD_OFFSET)
    }

    /// Encode the chain for a first IFD at `first_ifd_offset`.
    pub fn encode_to_bytes_at(
        &self,
        root: &IfdBuilder,
        first_ifd_offset: u32,
    ) -> Result<Vec<u8>, EncodeError> {
        let byte_order = root.byte_order();
        let mut ioi = IfdOffsetIterator::new(first_ifd_offset);
        let mut out = BytesMut::new();

        for ib in root.chain() {
            if ib.byte_order() != byte_order {
                return Err(EncodeError::ByteOrderMismatch {
                    ifd: ib.name().to_string(),
                });
            }

            let has_next = ib.next_ifd().is_some();
            out.extend_from_slice(&self.encode_ifd(ib, &mut ioi, has_next)?);
        }

        let expected = (ioi.offset() - first_ifd_offset) as usize;
        if out.len() != expected {
            return Err(EncodeError::LayoutMismatch {
                ifd: root.name().to_string(),
                expected,
                actual: out.len(),
            });
        }

        debug!(
            first_ifd_offset,
            len = out.len(),
            %byte_order,
            "encoded IFD chain"
        );

        Ok(out.to_vec())
    }

    /// Encode a complete TIFF stream: header followed by the chain.
    pub fn encode_to_tiff(&self, root: &IfdBuilder) -> Result<Vec<u8>, EncodeError> {
        let header = TiffHeader::new(root.byte_order(), DEFAULT_FIRST_IFD_OFFSET);
        let ifds = self.encode_to_bytes_at(root, DEFAULT_FIRST_IFD_OFFSET)?;

        let mut out = Vec::with_capacity(header.to_bytes().len() + ifds.len());
        out.extend_from_slice(&header.to_bytes());
        out.extend_from_slice(&ifds);
        Ok(out)
    }

    /// Classify an entry and check it can be written.
    fn entry_layout<'t>(
        &self,
        ib: &IfdBuilder,
        tag: &'t BuilderTag,
    ) -> Result<EntryLayout<'t>, EncodeError> {
        let violation = |message: &str| EncodeError::InvalidValueUnion {
            ifd: ib.name().to_string(),
            tag_id: tag.tag_id(),
            message: message.to_string(),
        };

        match (tag.child_ifd_name(), tag.value()) {
            (Some(_), IfdBuilderTagValue::IfdBuilder(child)) => {
                if child.byte_order() != ib.byte_order() {
                    return Err(EncodeError::ByteOrderMismatch {
                        ifd: child.name().to_string(),
                    });
                }
                Ok(EntryLayout::Child(child))
            }
            (Some(_), IfdBuilderTagValue::Bytes(_)) => {
                Err(violation("child IFD entry holds bytes"))
            }
            (None, IfdBuilderTagValue::IfdBuilder(_)) => {
                Err(violation("plain entry holds a child IFD"))
            }
            (None, IfdBuilderTagValue::Bytes(bytes)) => {
                let field_type = tag
                    .field_type()
                    .or_else(|| self.index.field_type(ib.name(), tag.tag_id()))
                    .ok_or_else(|| EncodeError::UnknownTag {
                        ifd: ib.name().to_string(),
                        tag_id: tag.tag_id(),
                    })?;

                let unit_size = field_type.size_in_bytes();
                let count = u32::try_from(bytes.len() / unit_size).ok();
                match count {
                    Some(count) if bytes.len() % unit_size == 0 => Ok(EntryLayout::Value {
                        field_type,
                        count,
                        bytes,
                    }),
                    _ => Err(EncodeError::ValueSizeMismatch {
                        tag_id: tag.tag_id(),
                        len: bytes.len(),
                        unit_size,
                    }),
                }
            }
        }
    }

    /// Encode one IFD and its children, allocating from `ioi`.
    fn encode_ifd(
        &self,
        ib: &IfdBuilder,
        ioi: &mut IfdOffsetIterator,
        has_next: bool,
    ) -> Result<BytesMut, EncodeError> {
        let layouts = ib
            .tags()
            .iter()
            .map(|tag| self.entry_layout(ib, tag))
            .collect::<Result<Vec<_>, _>>()?;

        let count = u16::try_from(layouts.len()).map_err(|_| EncodeError::TooManyEntries {
            ifd: ib.name().to_string(),
            count: layouts.len(),
        })?;

        let table_size = table_size_for(layouts.len());
        let data_size: usize = layouts.iter().map(EntryLayout::data_size).sum();

        let table_offset = ioi.reserve(table_size + data_size)?;
        // Cannot overflow: the whole region was just reserved
        let data_offset = table_offset + table_size as u32;

        trace!(
            ifd = ib.name(),
            table_offset,
            table_size,
            data_size,
            "allocated IFD"
        );

        let byte_order: ByteOrder = ib.byte_order();
        let mut table = ByteWriter::with_capacity(byte_order, table_size);
        let mut data = ByteWriter::with_capacity(byte_order, data_size);
        let mut child_slots = Vec::new();

        table.write_u16(count);
        for (tag, layout) in ib.tags().iter().zip(&layouts) {
            table.write_u16(tag.tag_id());

            match layout {
                EntryLayout::Child(child) => {
                    table.write_u16(FieldType::Long.as_u16());
                    table.write_u32(1);
                    child_slots.push((table.len(), *child));
                    table.write_u32(0);
                }
                EntryLayout::Value {
                    field_type,
                    count,
                    bytes,
                } => {
                    table.write_u16(field_type.as_u16());
                    table.write_u32(*count);

                    if bytes.len() <= FieldType::INLINE_THRESHOLD {
                        table.write_padded(bytes, FieldType::INLINE_THRESHOLD);
                    } else {
                        table.write_u32(data_offset + data.len() as u32);
                        data.write_bytes(bytes);
                        data.pad_to_even();
                    }
                }
            }
        }

        let next_slot = table.len();
        table.write_u32(0);

        if table.len() != table_size {
            return Err(EncodeError::LayoutMismatch {
                ifd: ib.name().to_string(),
                expected: table_size,
                actual: table.len(),
            });
        }
        if data.len() != data_size {
            return Err(EncodeError::LayoutMismatch {
                ifd: ib.name().to_string(),
                expected: data_size,
                actual: data.len(),
            });
        }

        let mut children = BytesMut::new();
        for (slot, child) in child_slots {
            let child_offset = ioi.offset();
            // A child's own chain is never emitted
            children.extend_from_slice(&self.encode_ifd(child, ioi, false)?);
            table.patch_u32(slot, child_offset)?;
        }

        if has_next {
            table.patch_u32(next_slot, ioi.offset())?;
        }

        let mut out = BytesMut::with_capacity(table_size + data_size + children.len());
        out.extend_from_slice(table.as_slice());
        out.extend_from_slice(data.as_slice());
        out.extend_from_slice(&children);
        Ok(out)
    }
}

// =============================================================================
// Tests
// =============================================================================
