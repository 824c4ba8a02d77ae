//! Read-only IFD graph parsed from an in-memory TIFF stream.
//!
//! # IFD Structure
//! ```text
//! Bytes 0-1:          Entry count N
//! Bytes 2..2+12N:     Entries (tag:2, type:2, count:4, value/offset:4)
//! Bytes 2+12N..+4:    Offset of the next IFD (0 = end of chain)
//! ```
//!
//! Entries whose tag is a registered child IFD pointer for the current IFD
//! are followed, and the child is parsed into [`Ifd::children`]. Top-level
//! IFDs are linked through [`Ifd::next`].

use std::collections::HashSet;

use tracing::trace;

use crate::error::TiffError;

use super::parser::{ByteOrder, TiffHeader};
use super::registry::{TagIndex, IFD_STANDARD};
use super::tags::FieldType;

// =============================================================================
// IfdEntry
// =============================================================================

/// One raw 12-byte directory entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IfdEntry {
    /// Tag identifier
    pub tag_id: u16,

    /// Decoded field type, `None` if the type code is unknown
    pub field_type: Option<FieldType>,

    /// Field type code as stored
    pub field_type_raw: u16,

    /// Number of values
    pub count: u32,

    /// The value itself (if it fits) or the offset of the value
    pub value_offset_bytes: [u8; 4],

    /// Name of the child IFD this entry points to, if it is a pointer
    pub child_ifd_name: Option<String>,
}

impl IfdEntry {
    /// Total size of the value in bytes, `None` for unknown field types.
    pub fn value_byte_size(&self) -> Option<u64> {
        self.field_type
            .map(|field_type| field_type.size_in_bytes() as u64 * self.count as u64)
    }

    /// Whether the value is stored inside the entry itself.
    pub fn is_inline(&self) -> bool {
        self.field_type
            .map(|field_type| field_type.fits_inline(self.count as u64))
            .unwrap_or(false)
    }

    /// The value/offset field interpreted as an offset.
    #[inline]
    pub fn value_offset(&self, byte_order: ByteOrder) -> u32 {
        byte_order.read_u32(&self.value_offset_bytes)
    }

    /// Whether this entry points to a child IFD.
    #[inline]
    pub fn is_child_ifd(&self) -> bool {
        self.child_ifd_name.is_some()
    }
}

// =============================================================================
// Ifd
// =============================================================================

/// A parsed directory with its children and the rest of its chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ifd {
    /// IFD name (`IFD` for top-level directories)
    pub name: String,

    /// Position in the top-level chain (0 for children)
    pub index: usize,

    /// Tag id pointing at this IFD from its parent (0 for top-level)
    pub tag_id: u16,

    /// Byte order of the stream
    pub byte_order: ByteOrder,

    /// Offset of this IFD in the addressable area
    pub offset: u32,

    /// Entries in stored order, child pointers included
    pub entries: Vec<IfdEntry>,

    /// Child IFDs in the order of their pointer entries
    pub children: Vec<Ifd>,

    /// Raw next-IFD offset field
    pub next_ifd_offset: u32,

    /// Next top-level IFD
    pub next: Option<Box<Ifd>>,
}

impl Ifd {
    /// Parse a full TIFF stream (header plus IFD chain).
    ///
    /// `data` must start with the TIFF header; every offset is relative to
    /// its first byte.
    pub fn parse_chain(data: &[u8], index: &TagIndex) -> Result<Ifd, TiffError> {
        parse_ifd_chain(data, index)
    }

    /// First entry with the given tag id.
    pub fn find_entry(&self, tag_id: u16) -> Option<&IfdEntry> {
        self.entries.iter().find(|entry| entry.tag_id == tag_id)
    }

    /// Child IFD with the given name.
    pub fn child(&self, name: &str) -> Option<&Ifd> {
        self.children.iter().find(|child| child.name == name)
    }

    /// Iterate over this IFD and every following IFD in the chain.
    pub fn chain(&self) -> impl Iterator<Item = &Ifd> {
        std::iter::successors(Some(self), |ifd| ifd.next.as_deref())
    }
}

/// Parse the header and the whole IFD chain of a classic TIFF stream.
pub fn parse_ifd_chain(data: &[u8], index: &TagIndex) -> Result<Ifd, TiffError> {
    let header = TiffHeader::parse(data)?;
    let mut reader = IfdReader {
        data,
        byte_order: header.byte_order,
        index,
        visited: HashSet::new(),
    };

    let mut ifds = Vec::new();
    let mut offset = header.first_ifd_offset;
    loop {
        let ifd = reader.read_ifd(IFD_STANDARD, ifds.len(), 0, offset)?;
        let next_offset = ifd.next_ifd_offset;
        ifds.push(ifd);

        if next_offset == 0 {
            break;
        }
        offset = next_offset;
    }

    // Link back to front so every IFD owns the rest of the chain
    let mut next: Option<Box<Ifd>> = None;
    for mut ifd in ifds.into_iter().rev() {
        ifd.next = next;
        next = Some(Box::new(ifd));
    }

    next.map(|root| *root)
        .ok_or(TiffError::InvalidIfdOffset(header.first_ifd_offset as u64))
}

struct IfdReader<'a> {
    data: &'a [u8],
    byte_order: ByteOrder,
    index: &'a TagIndex,
    visited: HashSet<u32>,
}

impl IfdReader<'_> {
    fn read_ifd(
        &mut self,
        name: &str,
        chain_index: usize,
        tag_id: u16,
        offset: u32,
    ) -> Result<Ifd, TiffError> {
        if !self.visited.insert(offset) {
            return Err(TiffError::IfdLoop(offset as u64));
        }

        let start = offset as usize;
        if start + TiffHeader::IFD_COUNT_SIZE > self.data.len() {
            return Err(TiffError::InvalidIfdOffset(offset as u64));
        }

        let count = self.byte_order.read_u16(&self.data[start..]) as usize;
        let entries_start = start + TiffHeader::IFD_COUNT_SIZE;
        let table_end =
            entries_start + count * TiffHeader::IFD_ENTRY_SIZE + TiffHeader::IFD_NEXT_OFFSET_SIZE;
        if table_end > self.data.len() {
            return Err(TiffError::FileTooSmall {
                required: table_end as u64,
                actual: self.data.len() as u64,
            });
        }

        trace!(ifd = name, offset, count, "reading IFD");

        let mut entries = Vec::with_capacity(count);
        let mut children = Vec::new();

        for i in 0..count {
            let raw = &self.data[entries_start + i * TiffHeader::IFD_ENTRY_SIZE..];

            let entry_tag = self.byte_order.read_u16(&raw[0..2]);
            let field_type_raw = self.byte_order.read_u16(&raw[2..4]);
            let entry_count = self.byte_order.read_u32(&raw[4..8]);
            let value_offset_bytes = [raw[8], raw[9], raw[10], raw[11]];

            let child_ifd_name = self
                .index
                .child_ifd_name(name, entry_tag)
                .map(str::to_string);

            let entry = IfdEntry {
                tag_id: entry_tag,
                field_type: FieldType::from_u16(field_type_raw),
                field_type_raw,
                count: entry_count,
                value_offset_bytes,
                child_ifd_name,
            };

            if let Some(ref child_name) = entry.child_ifd_name {
                let child_offset = entry.value_offset(self.byte_order);
                let child = self.read_ifd(child_name, 0, entry_tag, child_offset)?;
                children.push(child);
            }

            entries.push(entry);
        }

        let next_ifd_offset = self
            .byte_order
            .read_u32(&self.data[table_end - TiffHeader::IFD_NEXT_OFFSET_SIZE..]);

        Ok(Ifd {
            name: name.to_string(),
            index: chain_index,
            tag_id,
            byte_order: self.byte_order,
            offset,
            entries,
            children,
            next_ifd_offset,
            next: None,
        })
    }
}

// =============================================================================
// Tests
// =============================================================================
