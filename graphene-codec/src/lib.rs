//! Shared binary codec interface for the Graphene wire format
//!
//! Every wire type implements [`Encode`] and [`Decode`] against the exact
//! byte layout spoken by Graphene-family nodes: little-endian fixed-width
//! integers, LEB128 variable-length counts, and length-prefixed payloads.

mod buffer;
pub mod utils;

pub use buffer::ByteBuffer;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EncodeError {
    #[error("value does not fit in {0}")]
    OutOfRange(&'static str),

    #[error("value has the wrong shape for {0}")]
    WrongShape(&'static str),

    #[error("variant slot {0} is reserved and cannot be encoded")]
    Unsupported(u64),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("buffer underflow: needed {needed} bytes, {available} available")]
    Underflow { needed: usize, available: usize },

    #[error("invalid tag {tag} while decoding {what}")]
    InvalidTag { what: &'static str, tag: u64 },

    #[error("string payload is not valid utf-8")]
    InvalidUtf8,

    #[error("unknown discriminator {discriminator} for {what}")]
    InvalidVariant {
        what: &'static str,
        discriminator: u64,
    },
}

pub trait Encode {
    fn encode(&self, out: &mut Vec<u8>) -> Result<(), EncodeError>;

    /// Convenience encoding into a fresh byte vector.
    fn to_wire(&self) -> Result<Vec<u8>, EncodeError> {
        let mut out = Vec::new();
        self.encode(&mut out)?;
        Ok(out)
    }
}

pub trait Decode: Sized {
    fn decode(buf: &mut ByteBuffer) -> Result<Self, DecodeError>;

    /// Convenience decoding from a standalone byte slice.
    fn from_wire(bytes: &[u8]) -> Result<Self, DecodeError> {
        let mut buf = ByteBuffer::new();
        buf.write(bytes);
        Self::decode(&mut buf)
    }
}

/// Longest legal LEB128 encoding of a u64: ceil(64 / 7) bytes.
const VARINT_MAX_LEN: usize = 10;

/// Appends the LEB128 encoding of `value`: 7 data bits per byte, MSB set
/// while more bytes follow.
pub fn write_varint(out: &mut Vec<u8>, mut value: u64) {
    loop {
        let mut byte = (value & 0x7f) as u8;
        value >>= 7;
        if value != 0 {
            byte |= 0x80;
        }
        out.push(byte);
        if value == 0 {
            break;
        }
    }
}

/// Reads one LEB128-encoded u64 from the buffer.
pub fn read_varint(buf: &mut ByteBuffer) -> Result<u64, DecodeError> {
    let mut value = 0u64;
    for i in 0..VARINT_MAX_LEN {
        let byte = buf.read_array::<1>()?[0];
        value |= u64::from(byte & 0x7f) << (i * 7);
        if byte & 0x80 == 0 {
            return Ok(value);
        }
    }
    Err(DecodeError::InvalidTag {
        what: "varint",
        tag: value,
    })
}

/// Reads a LEB128 count and checks it fits in memory-addressable range.
pub fn read_count(buf: &mut ByteBuffer) -> Result<usize, DecodeError> {
    let count = read_varint(buf)?;
    usize::try_from(count).map_err(|_| DecodeError::InvalidTag {
        what: "count",
        tag: count,
    })
}

macro_rules! int_codec {
    ($($ty:ty),+) => {
        $(
            impl Encode for $ty {
                fn encode(&self, out: &mut Vec<u8>) -> Result<(), EncodeError> {
                    out.extend_from_slice(&self.to_le_bytes());
                    Ok(())
                }
            }

            impl Decode for $ty {
                fn decode(buf: &mut ByteBuffer) -> Result<Self, DecodeError> {
                    Ok(<$ty>::from_le_bytes(buf.read_array()?))
                }
            }
        )+
    };
}

int_codec!(u8, u16, u32, u64, i64);

impl Encode for bool {
    fn encode(&self, out: &mut Vec<u8>) -> Result<(), EncodeError> {
        out.push(u8::from(*self));
        Ok(())
    }
}

impl Decode for bool {
    fn decode(buf: &mut ByteBuffer) -> Result<Self, DecodeError> {
        match buf.read_array::<1>()?[0] {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(DecodeError::InvalidTag {
                what: "bool",
                tag: u64::from(other),
            }),
        }
    }
}

impl Encode for String {
    fn encode(&self, out: &mut Vec<u8>) -> Result<(), EncodeError> {
        self.as_str().encode(out)
    }
}

impl Encode for &str {
    fn encode(&self, out: &mut Vec<u8>) -> Result<(), EncodeError> {
        write_varint(out, self.len() as u64);
        out.extend_from_slice(self.as_bytes());
        Ok(())
    }
}

impl Decode for String {
    fn decode(buf: &mut ByteBuffer) -> Result<Self, DecodeError> {
        let len = read_count(buf)?;
        let bytes = buf.read(len)?;
        String::from_utf8(bytes).map_err(|_| DecodeError::InvalidUtf8)
    }
}

impl<T: Encode> Encode for Vec<T> {
    fn encode(&self, out: &mut Vec<u8>) -> Result<(), EncodeError> {
        write_varint(out, self.len() as u64);
        for item in self {
            item.encode(out)?;
        }
        Ok(())
    }
}

impl<T: Decode> Decode for Vec<T> {
    fn decode(buf: &mut ByteBuffer) -> Result<Self, DecodeError> {
        let count = read_count(buf)?;
        let mut items = Vec::with_capacity(count.min(1024));
        for _ in 0..count {
            items.push(T::decode(buf)?);
        }
        Ok(items)
    }
}

/// Presence-tagged value: one byte (0 absent / 1 present), then the payload.
impl<T: Encode> Encode for Option<T> {
    fn encode(&self, out: &mut Vec<u8>) -> Result<(), EncodeError> {
        match self {
            None => out.push(0),
            Some(value) => {
                out.push(1);
                value.encode(out)?;
            }
        }
        Ok(())
    }
}

impl<T: Decode> Decode for Option<T> {
    fn decode(buf: &mut ByteBuffer) -> Result<Self, DecodeError> {
        match buf.read_array::<1>()?[0] {
            0 => Ok(None),
            1 => Ok(Some(T::decode(buf)?)),
            other => Err(DecodeError::InvalidTag {
                what: "optional",
                tag: u64::from(other),
            }),
        }
    }
}

impl<const N: usize> Encode for [u8; N] {
    fn encode(&self, out: &mut Vec<u8>) -> Result<(), EncodeError> {
        out.extend_from_slice(self);
        Ok(())
    }
}

impl<const N: usize> Decode for [u8; N] {
    fn decode(buf: &mut ByteBuffer) -> Result<Self, DecodeError> {
        buf.read_array()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn varint_bytes(value: u64) -> Vec<u8> {
        let mut out = Vec::new();
        write_varint(&mut out, value);
        out
    }

    #[test]
    fn varint_known_vectors() {
        assert_eq!(varint_bytes(0), vec![0x00]);
        assert_eq!(varint_bytes(127), vec![0x7f]);
        assert_eq!(varint_bytes(128), vec![0x80, 0x01]);
        assert_eq!(varint_bytes(300), vec![0xac, 0x02]);
    }

    #[test]
    fn varint_roundtrip() {
        for value in [0, 1, 127, 128, 300, 16383, 16384, u64::from(u32::MAX), u64::MAX] {
            let mut buf = ByteBuffer::new();
            buf.write(&varint_bytes(value));
            assert_eq!(read_varint(&mut buf).unwrap(), value);
            assert!(buf.is_empty());
        }
    }

    #[test]
    fn varint_rejects_overlong() {
        let mut buf = ByteBuffer::new();
        buf.write(&[0x80; 11]);
        assert!(matches!(
            read_varint(&mut buf),
            Err(DecodeError::InvalidTag { what: "varint", .. })
        ));
    }

    #[test]
    fn integers_are_little_endian() {
        assert_eq!(0x0102u16.to_wire().unwrap(), vec![0x02, 0x01]);
        assert_eq!(0x01020304u32.to_wire().unwrap(), vec![0x04, 0x03, 0x02, 0x01]);
        assert_eq!(
            u64::from_wire(&[0x01, 0, 0, 0, 0, 0, 0, 0]).unwrap(),
            1u64
        );
        assert_eq!(
            i64::from_wire(&[0xff; 8]).unwrap(),
            -1i64
        );
    }

    #[test]
    fn bool_is_strict() {
        assert_eq!(bool::from_wire(&[0]).unwrap(), false);
        assert_eq!(bool::from_wire(&[1]).unwrap(), true);
        assert!(matches!(
            bool::from_wire(&[2]),
            Err(DecodeError::InvalidTag { what: "bool", .. })
        ));
    }

    #[test]
    fn string_roundtrip_and_utf8_guard() {
        let value = "Haruka Mock Client".to_string();
        let wire = value.to_wire().unwrap();
        assert_eq!(wire[0] as usize, value.len());
        assert_eq!(String::from_wire(&wire).unwrap(), value);

        assert!(matches!(
            String::from_wire(&[2, 0xff, 0xfe]),
            Err(DecodeError::InvalidUtf8)
        ));
    }

    #[test]
    fn optional_tags() {
        assert_eq!(Option::<u8>::from_wire(&[0]).unwrap(), None);
        assert_eq!(Option::<u8>::from_wire(&[1, 7]).unwrap(), Some(7));
        assert!(Option::<u8>::from_wire(&[9]).is_err());
    }

    #[test]
    fn vector_roundtrip() {
        let values: Vec<u16> = vec![1, 2, 300];
        let wire = values.to_wire().unwrap();
        assert_eq!(wire.len(), 1 + 3 * 2);
        assert_eq!(Vec::<u16>::from_wire(&wire).unwrap(), values);
    }
}
