//! Byte sizes of binary primitives.

pub const U16: usize = 2;
pub const U32: usize = 4;
