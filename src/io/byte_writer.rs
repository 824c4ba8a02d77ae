use bytes::{BufMut, Bytes, BytesMut};

use crate::error::EncodeError;
use crate::format::tiff::ByteOrder;

/// Byte-order aware writer over a growable buffer.
///
/// Every multi-byte field of an IFD goes through one of these so that a
/// directory is encoded consistently in its configured byte order. Already
/// written fields can be patched in place once a forward offset is known.
#[derive(Debug, Clone)]
pub struct ByteWriter {
    buf: BytesMut,
    byte_order: ByteOrder,
}

impl ByteWriter {
    /// Create an empty writer.
    pub fn new(byte_order: ByteOrder) -> Self {
        Self {
            buf: BytesMut::new(),
            byte_order,
        }
    }

    /// Create an empty writer with room for `capacity` bytes.
    pub fn with_capacity(byte_order: ByteOrder, capacity: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(capacity),
            byte_order,
        }
    }

    #[inline]
    pub fn byte_order(&self) -> ByteOrder {
        self.byte_order
    }

    /// Number of bytes written so far.
    #[inline]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn write_u16(&mut self, value: u16) {
        match self.byte_order {
            ByteOrder::LittleEndian => self.buf.put_u16_le(value),
            ByteOrder::BigEndian => self.buf.put_u16(value),
        }
    }

    pub fn write_u32(&mut self, value: u32) {
        match self.byte_order {
            ByteOrder::LittleEndian => self.buf.put_u32_le(value),
            ByteOrder::BigEndian => self.buf.put_u32(value),
        }
    }

    /// Append raw bytes unchanged.
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf.put_slice(bytes);
    }

    /// Append `bytes` left-aligned in a field of `width` bytes, zero-filled.
    ///
    /// Bytes beyond `width` are not written; callers check the length first.
    pub fn write_padded(&mut self, bytes: &[u8], width: usize) {
        let len = bytes.len().min(width);
        self.buf.put_slice(&bytes[..len]);
        self.buf.put_bytes(0, width - len);
    }

    /// Append a single zero byte if the current length is odd.
    pub fn pad_to_even(&mut self) {
        if self.buf.len() % 2 != 0 {
            self.buf.put_u8(0);
        }
    }

    /// Overwrite the u32 at `position` in this writer's byte order.
    ///
    /// Fails with `PatchOutOfRange` (and writes nothing) if the field would
    /// extend past the end of the buffer.
    pub fn patch_u32(&mut self, position: usize, value: u32) -> Result<(), EncodeError> {
        let end = match position.checked_add(4) {
            Some(end) if end <= self.buf.len() => end,
            _ => {
                return Err(EncodeError::PatchOutOfRange {
                    position,
                    len: self.buf.len(),
                })
            }
        };

        let encoded = match self.byte_order {
            ByteOrder::LittleEndian => value.to_le_bytes(),
            ByteOrder::BigEndian => value.to_be_bytes(),
        };
        self.buf[position..end].copy_from_slice(&encoded);
        Ok(())
    }

    /// View the bytes written so far.
    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    /// Finish writing and return the immutable buffer.
    pub fn freeze(self) -> Bytes {
        self.buf.freeze()
    }
}
