/// Declares an ordered wire record: a struct whose encoding is the
/// concatenation of its fields in declaration order, and whose decoding
/// consumes them in the same order.
#[macro_export]
macro_rules! wire_object {
    (
        $(#[$attr:meta])*
        pub struct $name:ident {
        }
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
        pub struct $name {}

        impl graphene_codec::Encode for $name {
            fn encode(&self, _out: &mut Vec<u8>) -> Result<(), graphene_codec::EncodeError> {
                Ok(())
            }
        }

        impl graphene_codec::Decode for $name {
            fn decode(
                _buf: &mut graphene_codec::ByteBuffer,
            ) -> Result<Self, graphene_codec::DecodeError> {
                Ok(Self {})
            }
        }
    };

    (
        $(#[$attr:meta])*
        pub struct $name:ident {
            $( $(#[$fattr:meta])* pub $field:ident : $ftype:ty, )+
        }
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
        pub struct $name {
            $( $(#[$fattr])* pub $field: $ftype, )+
        }

        impl graphene_codec::Encode for $name {
            fn encode(&self, out: &mut Vec<u8>) -> Result<(), graphene_codec::EncodeError> {
                $( graphene_codec::Encode::encode(&self.$field, out)?; )+
                Ok(())
            }
        }

        impl graphene_codec::Decode for $name {
            fn decode(
                buf: &mut graphene_codec::ByteBuffer,
            ) -> Result<Self, graphene_codec::DecodeError> {
                Ok(Self {
                    $( $field: graphene_codec::Decode::decode(buf)?, )+
                })
            }
        }
    };
}

/// Declares a sparse record usable behind `Extension<_>`: every field is an
/// `Option`, and only present fields reach the wire, keyed by their 0-based
/// declaration index.
macro_rules! sparse_object {
    (
        $(#[$attr:meta])*
        pub struct $name:ident {
            $( pub $field:ident : $ftype:ty, )+
        }
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
        pub struct $name {
            $( pub $field: Option<$ftype>, )+
        }

        impl graphene_codec::utils::SparseObject for $name {
            const NAME: &'static str = stringify!($name);

            fn encode_present(
                &self,
            ) -> Result<Vec<(u64, Vec<u8>)>, graphene_codec::EncodeError> {
                let mut fields = Vec::new();
                let mut index = 0u64;
                $(
                    if let Some(value) = &self.$field {
                        fields.push((index, graphene_codec::Encode::to_wire(value)?));
                    }
                    index += 1;
                )+
                let _ = index;
                Ok(fields)
            }

            fn decode_field(
                &mut self,
                index: u64,
                buf: &mut graphene_codec::ByteBuffer,
            ) -> Result<(), graphene_codec::DecodeError> {
                let mut cursor = 0u64;
                $(
                    if index == cursor {
                        self.$field = Some(graphene_codec::Decode::decode(buf)?);
                        return Ok(());
                    }
                    cursor += 1;
                )+
                let _ = cursor;
                Err(graphene_codec::DecodeError::InvalidTag {
                    what: Self::NAME,
                    tag: index,
                })
            }
        }
    };
}

/// Declares a tagged union over a closed variant table. The discriminator
/// is a varint; slots missing from the table are reserved and fail to
/// decode with `InvalidVariant`.
macro_rules! static_variant {
    (
        $(#[$attr:meta])*
        pub enum $name:ident {
            $( $tag:literal => $case:ident($ctype:ty), )+
        }
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
        pub enum $name {
            $( $case($ctype), )+
        }

        impl graphene_codec::Encode for $name {
            fn encode(&self, out: &mut Vec<u8>) -> Result<(), graphene_codec::EncodeError> {
                match self {
                    $(
                        Self::$case(inner) => {
                            graphene_codec::write_varint(out, $tag);
                            graphene_codec::Encode::encode(inner, out)
                        }
                    )+
                }
            }
        }

        impl graphene_codec::Decode for $name {
            fn decode(
                buf: &mut graphene_codec::ByteBuffer,
            ) -> Result<Self, graphene_codec::DecodeError> {
                let tag = graphene_codec::read_varint(buf)?;
                match tag {
                    $( $tag => Ok(Self::$case(graphene_codec::Decode::decode(buf)?)), )+
                    other => Err(graphene_codec::DecodeError::InvalidVariant {
                        what: stringify!($name),
                        discriminator: other,
                    }),
                }
            }
        }
    };
}

/// Declares a fixed-width byte newtype (keys, signatures) with hex
/// formatting and a hex-string serde form.
macro_rules! bytes_newtype {
    (
        $(#[$attr:meta])*
        pub struct $name:ident([u8; $len:expr]);
    ) => {
        $(#[$attr])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(pub [u8; $len]);

        impl $name {
            pub const LEN: usize = $len;
        }

        impl From<[u8; $len]> for $name {
            fn from(bytes: [u8; $len]) -> Self {
                Self(bytes)
            }
        }

        impl AsRef<[u8]> for $name {
            fn as_ref(&self) -> &[u8] {
                &self.0
            }
        }

        impl std::fmt::Debug for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.debug_tuple(stringify!($name))
                    .field(&hex::encode(self.0))
                    .finish()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&hex::encode(self.0))
            }
        }

        impl std::str::FromStr for $name {
            type Err = hex::FromHexError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let mut bytes = [0u8; $len];
                hex::decode_to_slice(s, &mut bytes)?;
                Ok(Self(bytes))
            }
        }

        impl graphene_codec::Encode for $name {
            fn encode(&self, out: &mut Vec<u8>) -> Result<(), graphene_codec::EncodeError> {
                out.extend_from_slice(&self.0);
                Ok(())
            }
        }

        impl graphene_codec::Decode for $name {
            fn decode(
                buf: &mut graphene_codec::ByteBuffer,
            ) -> Result<Self, graphene_codec::DecodeError> {
                Ok(Self(buf.read_array()?))
            }
        }

        impl serde::Serialize for $name {
            fn serialize<S: serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
                s.serialize_str(&hex::encode(self.0))
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D: serde::Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
                let text = <String as serde::Deserialize>::deserialize(d)?;
                text.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}
