use graphene_codec::utils::KeyValuePairs;
use graphene_codec::{ByteBuffer, Decode, DecodeError, Encode, EncodeError};
use serde::{Deserialize, Serialize};

/// Dynamically-typed value inside a [`VariantObject`].
///
/// The wire tag indexes the fixed table
/// `[null, int64, uint64, double, bool, string, array, object, blob]`; only
/// the uint64 (2), string (5) and object (7) slots are live in this
/// protocol. Reserved slots decode as `Null` carrying no payload, which is
/// how peers actually emit them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Variant {
    Null,
    U64(u64),
    String(String),
    Object(VariantObject),
}

const TAG_NULL: u8 = 0;
const TAG_U64: u8 = 2;
const TAG_STRING: u8 = 5;
const TAG_OBJECT: u8 = 7;
const TAG_MAX: u8 = 8;

impl Encode for Variant {
    fn encode(&self, out: &mut Vec<u8>) -> Result<(), EncodeError> {
        match self {
            Variant::Null => out.push(TAG_NULL),
            Variant::U64(value) => {
                out.push(TAG_U64);
                value.encode(out)?;
            }
            Variant::String(value) => {
                out.push(TAG_STRING);
                value.encode(out)?;
            }
            Variant::Object(value) => {
                out.push(TAG_OBJECT);
                value.encode(out)?;
            }
        }
        Ok(())
    }
}

impl Decode for Variant {
    fn decode(buf: &mut ByteBuffer) -> Result<Self, DecodeError> {
        let tag = buf.read_array::<1>()?[0];
        match tag {
            TAG_U64 => Ok(Variant::U64(u64::decode(buf)?)),
            TAG_STRING => Ok(Variant::String(String::decode(buf)?)),
            TAG_OBJECT => Ok(Variant::Object(VariantObject::decode(buf)?)),
            _ if tag <= TAG_MAX => Ok(Variant::Null),
            _ => Err(DecodeError::InvalidVariant {
                what: "variant",
                discriminator: u64::from(tag),
            }),
        }
    }
}

impl From<u64> for Variant {
    fn from(value: u64) -> Self {
        Variant::U64(value)
    }
}

impl From<&str> for Variant {
    fn from(value: &str) -> Self {
        Variant::String(value.to_string())
    }
}

/// Free-form string-keyed object, preserved in wire order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantObject(pub KeyValuePairs<String, Variant>);

impl VariantObject {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Variant> {
        self.0
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value)
    }
}

impl From<Vec<(String, Variant)>> for VariantObject {
    fn from(entries: Vec<(String, Variant)>) -> Self {
        Self(entries.into())
    }
}

impl Encode for VariantObject {
    fn encode(&self, out: &mut Vec<u8>) -> Result<(), EncodeError> {
        self.0.encode(out)
    }
}

impl Decode for VariantObject {
    fn decode(buf: &mut ByteBuffer) -> Result<Self, DecodeError> {
        Ok(Self(KeyValuePairs::decode(buf)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn platform_object_wire_form() {
        let object = VariantObject::from(vec![("platform".to_string(), Variant::from("unknown"))]);
        let wire = object.to_wire().unwrap();
        // count 1, "platform", tag 5, "unknown"
        let mut expected = vec![1u8, 8];
        expected.extend_from_slice(b"platform");
        expected.push(5);
        expected.push(7);
        expected.extend_from_slice(b"unknown");
        assert_eq!(wire, expected);
        assert_eq!(VariantObject::from_wire(&wire).unwrap(), object);
    }

    #[test]
    fn nested_values_roundtrip() {
        let object = VariantObject::from(vec![
            ("uptime".to_string(), Variant::from(42u64)),
            (
                "details".to_string(),
                Variant::Object(VariantObject::from(vec![(
                    "os".to_string(),
                    Variant::from("linux"),
                )])),
            ),
        ]);
        let wire = object.to_wire().unwrap();
        assert_eq!(VariantObject::from_wire(&wire).unwrap(), object);
    }

    #[test]
    fn reserved_tags_decode_as_null() {
        // count 1, key "x", tag 4 (bool slot, reserved) with no payload
        let wire = [1u8, 1, b'x', 4];
        let object = VariantObject::from_wire(&wire).unwrap();
        assert_eq!(object.get("x"), Some(&Variant::Null));
    }

    #[test]
    fn unknown_tag_is_rejected() {
        let wire = [1u8, 1, b'x', 9];
        assert!(matches!(
            VariantObject::from_wire(&wire),
            Err(DecodeError::InvalidVariant { .. })
        ));
    }
}
