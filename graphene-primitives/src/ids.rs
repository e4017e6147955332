use std::fmt;

use graphene_codec::{
    read_varint, write_varint, ByteBuffer, Decode, DecodeError, Encode, EncodeError,
};
use serde::{Deserialize, Serialize};

/// Reference to a chain object, known statically by its (space, type) pair.
///
/// The short wire form carries only the instance as a varint; the pair is
/// part of the Rust type, which is what lets the decoder know what it is
/// reading.
#[derive(
    Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct ObjectId<const SPACE: u8, const TYPE: u8> {
    pub instance: u64,
}

impl<const SPACE: u8, const TYPE: u8> ObjectId<SPACE, TYPE> {
    pub const fn new(instance: u64) -> Self {
        Self { instance }
    }

    pub const fn space(&self) -> u8 {
        SPACE
    }

    pub const fn object_type(&self) -> u8 {
        TYPE
    }

    /// The packed 64-bit form of this reference.
    pub const fn full(&self) -> FullObjectId {
        FullObjectId {
            space: SPACE,
            object_type: TYPE,
            instance: self.instance,
        }
    }
}

impl<const SPACE: u8, const TYPE: u8> fmt::Debug for ObjectId<SPACE, TYPE> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId({self})")
    }
}

impl<const SPACE: u8, const TYPE: u8> fmt::Display for ObjectId<SPACE, TYPE> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{SPACE}.{TYPE}.{}", self.instance)
    }
}

impl<const SPACE: u8, const TYPE: u8> Encode for ObjectId<SPACE, TYPE> {
    fn encode(&self, out: &mut Vec<u8>) -> Result<(), EncodeError> {
        write_varint(out, self.instance);
        Ok(())
    }
}

impl<const SPACE: u8, const TYPE: u8> Decode for ObjectId<SPACE, TYPE> {
    fn decode(buf: &mut ByteBuffer) -> Result<Self, DecodeError> {
        Ok(Self::new(read_varint(buf)?))
    }
}

pub type AccountId = ObjectId<1, 2>;
pub type AssetId = ObjectId<1, 3>;
pub type ForceSettlementId = ObjectId<1, 4>;
pub type CommitteeMemberId = ObjectId<1, 5>;
pub type WitnessId = ObjectId<1, 6>;
pub type LimitOrderId = ObjectId<1, 7>;
pub type CallOrderId = ObjectId<1, 8>;
pub type CustomId = ObjectId<1, 9>;
pub type ProposalId = ObjectId<1, 10>;
pub type OperationHistoryId = ObjectId<1, 11>;
pub type WithdrawPermissionId = ObjectId<1, 12>;
pub type VestingBalanceId = ObjectId<1, 13>;
pub type WorkerId = ObjectId<1, 14>;

/// Type slots with a registered object kind in protocol space 1.
const KNOWN_TYPE_RANGE: std::ops::RangeInclusive<u8> = 2..=14;

/// Fully-qualified object reference packed into 64 bits:
/// space in bits 56-63, type in bits 48-55, instance in the low 48.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FullObjectId {
    pub space: u8,
    pub object_type: u8,
    pub instance: u64,
}

impl FullObjectId {
    const INSTANCE_MAX: u64 = (1 << 48) - 1;
}

impl fmt::Debug for FullObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FullObjectId({self})")
    }
}

impl fmt::Display for FullObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.space, self.object_type, self.instance)
    }
}

impl Encode for FullObjectId {
    fn encode(&self, out: &mut Vec<u8>) -> Result<(), EncodeError> {
        if self.instance > Self::INSTANCE_MAX {
            return Err(EncodeError::OutOfRange("object id instance"));
        }
        let packed = (u64::from(self.space) << 56)
            | (u64::from(self.object_type) << 48)
            | self.instance;
        packed.encode(out)
    }
}

impl Decode for FullObjectId {
    fn decode(buf: &mut ByteBuffer) -> Result<Self, DecodeError> {
        let packed = u64::decode(buf)?;
        let object_type = ((packed >> 48) & 0xff) as u8;
        if !KNOWN_TYPE_RANGE.contains(&object_type) {
            return Err(DecodeError::InvalidVariant {
                what: "full object id",
                discriminator: u64::from(object_type),
            });
        }
        Ok(Self {
            space: (packed >> 56) as u8,
            object_type,
            instance: packed & Self::INSTANCE_MAX,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_form_is_a_bare_varint() {
        let id = AccountId::new(300);
        assert_eq!(id.to_wire().unwrap(), vec![0xac, 0x02]);
        assert_eq!(AccountId::from_wire(&[0xac, 0x02]).unwrap(), id);
        assert_eq!(id.to_string(), "1.2.300");
    }

    #[test]
    fn full_form_packs_space_and_type() {
        let id = WitnessId::new(7).full();
        let wire = id.to_wire().unwrap();
        assert_eq!(wire, vec![7, 0, 0, 0, 0, 0, 6, 1]);
        assert_eq!(FullObjectId::from_wire(&wire).unwrap(), id);
    }

    #[test]
    fn full_form_rejects_unknown_type() {
        // type slot 0x20 has no registered object kind
        let wire = [0u8, 0, 0, 0, 0, 0, 0x20, 1];
        assert!(matches!(
            FullObjectId::from_wire(&wire),
            Err(DecodeError::InvalidVariant {
                what: "full object id",
                discriminator: 0x20,
            })
        ));
    }

    #[test]
    fn full_form_instance_bound() {
        let id = FullObjectId {
            space: 1,
            object_type: 2,
            instance: 1 << 48,
        };
        assert_eq!(
            id.to_wire(),
            Err(EncodeError::OutOfRange("object id instance"))
        );
    }
}
