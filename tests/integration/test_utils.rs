//! Test utilities for integration tests.
//!
//! This module provides a hand-written TIFF writer and reader that share no
//! code with the crate, so encoded streams can be checked independently.
//!
//! The writer uses a different layout from the crate's encoder: every
//! out-of-line value comes first (unaligned, right after the header), then
//! every table. Child pointers follow the plain entries of their parent.

#![allow(dead_code)]

use ifd_builder::{BuilderTag, ByteOrder, IfdBuilder, IFD_EXIF, IFD_GPS, IFD_IOP, IFD_STANDARD};

// =============================================================================
// Byte Order
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ByteOrderType {
    LittleEndian,
    BigEndian,
}

impl ByteOrderType {
    pub fn u16_bytes(self, value: u16) -> [u8; 2] {
        match self {
            ByteOrderType::LittleEndian => value.to_le_bytes(),
            ByteOrderType::BigEndian => value.to_be_bytes(),
        }
    }

    pub fn u32_bytes(self, value: u32) -> [u8; 4] {
        match self {
            ByteOrderType::LittleEndian => value.to_le_bytes(),
            ByteOrderType::BigEndian => value.to_be_bytes(),
        }
    }

    pub fn read_u16(self, data: &[u8], at: usize) -> u16 {
        let bytes = [data[at], data[at + 1]];
        match self {
            ByteOrderType::LittleEndian => u16::from_le_bytes(bytes),
            ByteOrderType::BigEndian => u16::from_be_bytes(bytes),
        }
    }

    pub fn read_u32(self, data: &[u8], at: usize) -> u32 {
        let bytes = [data[at], data[at + 1], data[at + 2], data[at + 3]];
        match self {
            ByteOrderType::LittleEndian => u32::from_le_bytes(bytes),
            ByteOrderType::BigEndian => u32::from_be_bytes(bytes),
        }
    }
}

pub fn field_type_size(field_type: u16) -> usize {
    match field_type {
        1 => 1,  // BYTE
        2 => 1,  // ASCII
        3 => 2,  // SHORT
        4 => 4,  // LONG
        5 => 8,  // RATIONAL
        6 => 1,  // SBYTE
        7 => 1,  // UNDEFINED
        8 => 2,  // SSHORT
        9 => 4,  // SLONG
        10 => 8, // SRATIONAL
        11 => 4, // FLOAT
        12 => 8, // DOUBLE
        _ => 1,
    }
}

// =============================================================================
// TIFF Writer
// =============================================================================

/// One entry of a hand-written IFD; `value` is already in the file's byte order.
#[derive(Clone, Debug)]
pub struct RawEntry {
    pub tag: u16,
    pub field_type: u16,
    pub count: u32,
    pub value: Vec<u8>,
}

/// A hand-written IFD with optional child IFDs.
#[derive(Clone, Debug, Default)]
pub struct RawIfd {
    pub entries: Vec<RawEntry>,
    pub children: Vec<(u16, RawIfd)>,
}

impl RawIfd {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry whose count is derived from the value length.
    pub fn entry(mut self, tag: u16, field_type: u16, value: Vec<u8>) -> Self {
        let count = (value.len() / field_type_size(field_type)) as u32;
        self.entries.push(RawEntry {
            tag,
            field_type,
            count,
            value,
        });
        self
    }

    /// Add an entry with an explicit count (for unknown field types).
    pub fn raw_entry(mut self, tag: u16, field_type: u16, count: u32, value: Vec<u8>) -> Self {
        self.entries.push(RawEntry {
            tag,
            field_type,
            count,
            value,
        });
        self
    }

    pub fn child(mut self, tag: u16, child: RawIfd) -> Self {
        self.children.push((tag, child));
        self
    }

    fn table_size(&self) -> u32 {
        (2 + 12 * (self.entries.len() + self.children.len()) + 4) as u32
    }
}

/// Where each part of a `RawIfd` ended up.
struct Placement {
    table: u32,
    values: Vec<Option<u32>>,
    children: Vec<Placement>,
}

fn place_values(ifd: &RawIfd, data: &mut Vec<u8>) -> Placement {
    let values = ifd
        .entries
        .iter()
        .map(|entry| {
            if entry.value.len() > 4 {
                let offset = data.len() as u32;
                data.extend_from_slice(&entry.value);
                Some(offset)
            } else {
                None
            }
        })
        .collect();

    let children = ifd
        .children
        .iter()
        .map(|(_, child)| place_values(child, data))
        .collect();

    Placement {
        table: 0,
        values,
        children,
    }
}

fn place_tables(ifd: &RawIfd, placement: &mut Placement, offset: &mut u32) {
    placement.table = *offset;
    *offset += ifd.table_size();
    for ((_, child), child_placement) in ifd.children.iter().zip(&mut placement.children) {
        place_tables(child, child_placement, offset);
    }
}

fn write_tables(
    ifd: &RawIfd,
    placement: &Placement,
    order: ByteOrderType,
    next: u32,
    data: &mut Vec<u8>,
) {
    assert_eq!(data.len() as u32, placement.table);

    data.extend_from_slice(&order.u16_bytes(
        (ifd.entries.len() + ifd.children.len()) as u16,
    ));

    for (entry, value_offset) in ifd.entries.iter().zip(&placement.values) {
        data.extend_from_slice(&order.u16_bytes(entry.tag));
        data.extend_from_slice(&order.u16_bytes(entry.field_type));
        data.extend_from_slice(&order.u32_bytes(entry.count));
        match value_offset {
            Some(offset) => data.extend_from_slice(&order.u32_bytes(*offset)),
            None => {
                let mut field = [0u8; 4];
                field[..entry.value.len()].copy_from_slice(&entry.value);
                data.extend_from_slice(&field);
            }
        }
    }

    for ((tag, _), child_placement) in ifd.children.iter().zip(&placement.children) {
        data.extend_from_slice(&order.u16_bytes(*tag));
        data.extend_from_slice(&order.u16_bytes(4)); // LONG
        data.extend_from_slice(&order.u32_bytes(1));
        data.extend_from_slice(&order.u32_bytes(child_placement.table));
    }

    data.extend_from_slice(&order.u32_bytes(next));

    for ((_, child), child_placement) in ifd.children.iter().zip(&placement.children) {
        write_tables(child, child_placement, order, 0, data);
    }
}

/// Write a classic TIFF stream holding `chain` as its top-level IFDs.
pub fn write_tiff(order: ByteOrderType, chain: &[RawIfd]) -> Vec<u8> {
    let mut data = match order {
        ByteOrderType::LittleEndian => vec![b'I', b'I'],
        ByteOrderType::BigEndian => vec![b'M', b'M'],
    };
    data.extend_from_slice(&order.u16_bytes(42));
    let first_ifd_pos = data.len();
    data.extend_from_slice(&[0, 0, 0, 0]);

    let mut placements: Vec<Placement> = chain
        .iter()
        .map(|ifd| place_values(ifd, &mut data))
        .collect();

    let mut offset = data.len() as u32;
    for (ifd, placement) in chain.iter().zip(&mut placements) {
        place_tables(ifd, placement, &mut offset);
    }

    let first = placements.first().map(|p| p.table).unwrap_or(0);
    data[first_ifd_pos..first_ifd_pos + 4].copy_from_slice(&order.u32_bytes(first));

    for (i, (ifd, placement)) in chain.iter().zip(&placements).enumerate() {
        let next = placements.get(i + 1).map(|p| p.table).unwrap_or(0);
        write_tables(ifd, placement, order, next, &mut data);
    }

    data
}

// =============================================================================
// TIFF Reader
// =============================================================================

/// An entry as read back from a stream.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReadEntry {
    pub tag: u16,
    pub field_type: u16,
    pub count: u32,
    pub raw: [u8; 4],
}

/// A directory as read back from a stream.
#[derive(Clone, Debug)]
pub struct ReadIfd {
    pub offset: u32,
    pub entries: Vec<ReadEntry>,
    pub next: u32,
}

impl ReadIfd {
    pub fn entry(&self, tag: u16) -> &ReadEntry {
        self.entries
            .iter()
            .find(|entry| entry.tag == tag)
            .unwrap_or_else(|| panic!("tag 0x{:04x} not found", tag))
    }

    pub fn has(&self, tag: u16) -> bool {
        self.entries.iter().any(|entry| entry.tag == tag)
    }

    pub fn table_size(&self) -> u32 {
        (2 + 12 * self.entries.len() + 4) as u32
    }

    pub fn tags(&self) -> Vec<u16> {
        self.entries.iter().map(|entry| entry.tag).collect()
    }
}

impl ReadEntry {
    pub fn byte_size(&self) -> usize {
        field_type_size(self.field_type) * self.count as usize
    }

    pub fn is_inline(&self) -> bool {
        self.byte_size() <= 4
    }

    pub fn offset(&self, order: ByteOrderType) -> u32 {
        order.read_u32(&self.raw, 0)
    }
}

pub fn read_header(data: &[u8]) -> (ByteOrderType, u32) {
    let order = match &data[0..2] {
        b"II" => ByteOrderType::LittleEndian,
        b"MM" => ByteOrderType::BigEndian,
        other => panic!("bad byte order marker {:?}", other),
    };
    assert_eq!(order.read_u16(data, 2), 42);
    (order, order.read_u32(data, 4))
}

pub fn read_ifd(data: &[u8], order: ByteOrderType, offset: u32) -> ReadIfd {
    let start = offset as usize;
    let count = order.read_u16(data, start) as usize;

    let entries = (0..count)
        .map(|i| {
            let at = start + 2 + i * 12;
            ReadEntry {
                tag: order.read_u16(data, at),
                field_type: order.read_u16(data, at + 2),
                count: order.read_u32(data, at + 4),
                raw: [data[at + 8], data[at + 9], data[at + 10], data[at + 11]],
            }
        })
        .collect();

    ReadIfd {
        offset,
        entries,
        next: order.read_u32(data, start + 2 + count * 12),
    }
}

/// Read every top-level IFD of a stream.
pub fn read_chain(data: &[u8]) -> (ByteOrderType, Vec<ReadIfd>) {
    let (order, mut offset) = read_header(data);
    let mut chain = Vec::new();
    while offset != 0 {
        let ifd = read_ifd(data, order, offset);
        offset = ifd.next;
        chain.push(ifd);
    }
    (order, chain)
}

/// The full value bytes of an entry.
pub fn read_value(data: &[u8], order: ByteOrderType, entry: &ReadEntry) -> Vec<u8> {
    let size = entry.byte_size();
    if entry.is_inline() {
        entry.raw[..size].to_vec()
    } else {
        let offset = entry.offset(order) as usize;
        data[offset..offset + size].to_vec()
    }
}

/// The child IFD an entry points to.
pub fn read_child(data: &[u8], order: ByteOrderType, entry: &ReadEntry) -> ReadIfd {
    read_ifd(data, order, entry.offset(order))
}

// =============================================================================
// Sample Builders
// =============================================================================

/// Tag ids of the standard child IFD pointers.
pub const CHILD_POINTER_TAGS: [u16; 3] = [0x8769, 0x8825, 0xA005];

pub fn to_type(order: ByteOrder) -> ByteOrderType {
    match order {
        ByteOrder::LittleEndian => ByteOrderType::LittleEndian,
        ByteOrder::BigEndian => ByteOrderType::BigEndian,
    }
}

pub fn short(order: ByteOrder, value: u16) -> Vec<u8> {
    to_type(order).u16_bytes(value).to_vec()
}

pub fn long(order: ByteOrder, value: u32) -> Vec<u8> {
    to_type(order).u32_bytes(value).to_vec()
}

pub fn rational(order: ByteOrder, numerator: u32, denominator: u32) -> Vec<u8> {
    let mut bytes = long(order, numerator);
    bytes.extend(long(order, denominator));
    bytes
}

/// IFD0 (with Exif -> Iop and GPSInfo children) followed by IFD1.
///
/// Child IFDs are added after the plain tags of their parent.
pub fn sample_chain(order: ByteOrder) -> IfdBuilder {
    let mut iop = IfdBuilder::new(IFD_IOP, order);
    iop.add(BuilderTag::from_bytes(0x0001, &b"R98\0"[..])).unwrap();

    let mut exif = IfdBuilder::new(IFD_EXIF, order);
    exif.add(BuilderTag::from_bytes(0x9000, &b"0231"[..])).unwrap();
    exif.add(BuilderTag::from_bytes(0x9003, &b"2024:05:01 12:00:00\0"[..]))
        .unwrap();
    exif.add(BuilderTag::from_bytes(0x829A, rational(order, 1, 250)))
        .unwrap();
    exif.add_child_ifd(iop).unwrap();

    let mut gps = IfdBuilder::new(IFD_GPS, order);
    gps.add(BuilderTag::from_bytes(0x0000, vec![2, 3, 0, 0])).unwrap();
    gps.add(BuilderTag::from_bytes(0x0001, &b"N\0"[..])).unwrap();
    let mut latitude = rational(order, 48, 1);
    latitude.extend(rational(order, 51, 1));
    latitude.extend(rational(order, 2988, 100));
    gps.add(BuilderTag::from_bytes(0x0002, latitude)).unwrap();

    let mut ifd0 = IfdBuilder::new(IFD_STANDARD, order);
    ifd0.add(BuilderTag::from_bytes(0x010F, &b"Canon\0"[..])).unwrap();
    ifd0.add(BuilderTag::from_bytes(0x0110, &b"EOS R5\0"[..])).unwrap();
    ifd0.add(BuilderTag::from_bytes(0x0112, short(order, 1))).unwrap();
    ifd0.add(BuilderTag::from_bytes(0x011A, rational(order, 72, 1)))
        .unwrap();
    ifd0.add_child_ifd(exif).unwrap();
    ifd0.add_child_ifd(gps).unwrap();

    let mut ifd1 = IfdBuilder::new(IFD_STANDARD, order);
    ifd1.add(BuilderTag::from_bytes(0x0103, short(order, 6))).unwrap();
    ifd1.add(BuilderTag::from_bytes(0x0201, long(order, 4096))).unwrap();
    ifd1.add(BuilderTag::from_bytes(0x0202, long(order, 1234))).unwrap();

    ifd0.set_next_ifd(ifd1);
    ifd0
}
