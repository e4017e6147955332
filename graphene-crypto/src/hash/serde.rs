use std::fmt;
use std::str::FromStr;

use serde::de::{Error, Unexpected, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

use super::Hash;

impl<const BYTES: usize> Serialize for Hash<BYTES> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

struct HashVisitor<const BYTES: usize> {}

impl<'de, const BYTES: usize> Visitor<'de> for HashVisitor<BYTES> {
    type Value = Hash<BYTES>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        write!(formatter, "a hex string representing {BYTES} bytes")
    }

    fn visit_str<E>(self, s: &str) -> Result<Self::Value, E>
    where
        E: Error,
    {
        match Hash::<BYTES>::from_str(s) {
            Ok(x) => Ok(x),
            Err(_) => Err(Error::invalid_value(Unexpected::Str(s), &self)),
        }
    }
}

impl<'de, const BYTES: usize> Deserialize<'de> for Hash<BYTES> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_str(HashVisitor::<BYTES> {})
    }
}

#[cfg(test)]
mod tests {
    use serde_test::{assert_tokens, Token};

    use super::*;

    #[derive(Debug, Deserialize, Serialize, PartialEq, Eq)]
    struct Dummy {
        item: Hash<20>,
        chain: Hash<32>,
    }

    #[test]
    fn hex_string_tokens() {
        let dummy = Dummy {
            item: "027459d691393208e653d28b5592dc429de6f1dc".parse().unwrap(),
            chain: "4018d7844c78f6a6c41c6a552b898022310fc5dec06da467ee7905a8dad512c8"
                .parse()
                .unwrap(),
        };

        assert_tokens(
            &dummy,
            &[
                Token::Struct {
                    name: "Dummy",
                    len: 2,
                },
                Token::Str("item"),
                Token::Str("027459d691393208e653d28b5592dc429de6f1dc"),
                Token::Str("chain"),
                Token::Str("4018d7844c78f6a6c41c6a552b898022310fc5dec06da467ee7905a8dad512c8"),
                Token::StructEnd,
            ],
        );
    }
}
