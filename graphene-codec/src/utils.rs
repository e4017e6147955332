//! Wrapper types shared by the wire model

use std::fmt;
use std::ops::Deref;

use serde::{Deserialize, Serialize};

use crate::{
    read_count, read_varint, write_varint, ByteBuffer, Decode, DecodeError, Encode, EncodeError,
};

/// Length-prefixed opaque bytes (`vector<char>` on the wire).
#[derive(Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Bytes(Vec<u8>);

impl Bytes {
    pub fn new(data: Vec<u8>) -> Self {
        Self(data)
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.0
    }
}

impl Deref for Bytes {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Vec<u8>> for Bytes {
    fn from(data: Vec<u8>) -> Self {
        Self(data)
    }
}

impl From<&[u8]> for Bytes {
    fn from(data: &[u8]) -> Self {
        Self(data.to_vec())
    }
}

impl fmt::Debug for Bytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Bytes").field(&hex::encode(&self.0)).finish()
    }
}

impl Encode for Bytes {
    fn encode(&self, out: &mut Vec<u8>) -> Result<(), EncodeError> {
        write_varint(out, self.0.len() as u64);
        out.extend_from_slice(&self.0);
        Ok(())
    }
}

impl Decode for Bytes {
    fn decode(buf: &mut ByteBuffer) -> Result<Self, DecodeError> {
        let len = read_count(buf)?;
        Ok(Self(buf.read(len)?))
    }
}

/// Zero-byte placeholder used by reserved variant slots.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Null;

impl Encode for Null {
    fn encode(&self, _out: &mut Vec<u8>) -> Result<(), EncodeError> {
        Ok(())
    }
}

impl Decode for Null {
    fn decode(_buf: &mut ByteBuffer) -> Result<Self, DecodeError> {
        Ok(Null)
    }
}

/// Ordered key/value pairs encoded as a counted map.
///
/// Backed by a `Vec` rather than a tree or hash map so the wire order of the
/// entries survives a decode/encode cycle untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<(K, V)>", into = "Vec<(K, V)>")]
pub struct KeyValuePairs<K, V>(Vec<(K, V)>)
where
    K: Clone,
    V: Clone;

impl<K: Clone, V: Clone> KeyValuePairs<K, V> {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn to_vec(self) -> Vec<(K, V)> {
        self.0
    }
}

impl<K: Clone, V: Clone> Default for KeyValuePairs<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Clone, V: Clone> From<Vec<(K, V)>> for KeyValuePairs<K, V> {
    fn from(entries: Vec<(K, V)>) -> Self {
        Self(entries)
    }
}

impl<K: Clone, V: Clone> From<KeyValuePairs<K, V>> for Vec<(K, V)> {
    fn from(pairs: KeyValuePairs<K, V>) -> Self {
        pairs.0
    }
}

impl<K: Clone, V: Clone> Deref for KeyValuePairs<K, V> {
    type Target = Vec<(K, V)>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<K, V> Encode for KeyValuePairs<K, V>
where
    K: Encode + Clone,
    V: Encode + Clone,
{
    fn encode(&self, out: &mut Vec<u8>) -> Result<(), EncodeError> {
        write_varint(out, self.0.len() as u64);
        for (key, value) in &self.0 {
            key.encode(out)?;
            value.encode(out)?;
        }
        Ok(())
    }
}

impl<K, V> Decode for KeyValuePairs<K, V>
where
    K: Decode + Clone,
    V: Decode + Clone,
{
    fn decode(buf: &mut ByteBuffer) -> Result<Self, DecodeError> {
        let count = read_count(buf)?;
        let mut entries = Vec::with_capacity(count.min(1024));
        for _ in 0..count {
            let key = K::decode(buf)?;
            let value = V::decode(buf)?;
            entries.push((key, value));
        }
        Ok(Self(entries))
    }
}

/// Struct payload that can be encoded sparsely, field by field.
///
/// Implementations enumerate their fields in declaration order; only present
/// fields make it onto the wire, each prefixed with its 0-based index.
pub trait SparseObject: Default {
    const NAME: &'static str;

    /// Present fields as (index, encoded value), in declaration order.
    fn encode_present(&self) -> Result<Vec<(u64, Vec<u8>)>, EncodeError>;

    /// Decodes the field at `index` into `self`.
    fn decode_field(&mut self, index: u64, buf: &mut ByteBuffer) -> Result<(), DecodeError>;
}

/// Sparse encoding of a struct: a count of present fields followed by
/// (index, value) pairs with strictly increasing indices.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Extension<S>(pub S);

impl<S: SparseObject> Encode for Extension<S> {
    fn encode(&self, out: &mut Vec<u8>) -> Result<(), EncodeError> {
        let fields = self.0.encode_present()?;
        write_varint(out, fields.len() as u64);
        for (index, bytes) in fields {
            write_varint(out, index);
            out.extend_from_slice(&bytes);
        }
        Ok(())
    }
}

impl<S: SparseObject> Decode for Extension<S> {
    fn decode(buf: &mut ByteBuffer) -> Result<Self, DecodeError> {
        let count = read_count(buf)?;
        let mut value = S::default();
        let mut previous = None;
        for _ in 0..count {
            let index = read_varint(buf)?;
            if previous.is_some_and(|last| index <= last) {
                return Err(DecodeError::InvalidTag {
                    what: S::NAME,
                    tag: index,
                });
            }
            value.decode_field(index, buf)?;
            previous = Some(index);
        }
        Ok(Self(value))
    }
}
