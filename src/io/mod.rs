mod byte_writer;
mod endian;

pub use byte_writer::ByteWriter;
pub use endian::{read_u16_be, read_u16_le, read_u32_be, read_u32_le};
