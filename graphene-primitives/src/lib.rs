//! Wire model for the Graphene P2P protocol
//!
//! Strongly-typed counterparts of everything the network puts on the wire:
//! basic value types, (space, type, instance) object references, the closed
//! operation catalog and the transaction/block containers. All of them
//! speak the byte-exact format through the `graphene-codec` traits.

#[macro_use]
mod macros;

mod block;
mod ids;
mod keys;
mod net;
mod objects;
mod operations;
mod variant;

pub use block::{block_num, OperationResult, PrecomputableTransaction, SignedBlock, Transaction};
pub use ids::{
    AccountId, AssetId, CallOrderId, CommitteeMemberId, CustomId, ForceSettlementId,
    FullObjectId, LimitOrderId, ObjectId, OperationHistoryId, ProposalId, VestingBalanceId,
    WithdrawPermissionId, WitnessId, WorkerId,
};
pub use keys::{NodeId, PublicKey, Signature};
pub use net::{EndpointParseError, IpAddress, IpEndpoint};
pub use objects::*;
pub use operations::*;
pub use variant::{Variant, VariantObject};

pub use graphene_codec::utils::{Bytes, Extension, KeyValuePairs, Null};
pub use graphene_crypto::hash::Hash;

use graphene_codec::{ByteBuffer, Decode, DecodeError, Encode, EncodeError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// RIPEMD-160 identifier of a block or transaction.
pub type ItemId = Hash<20>;

/// SHA-256 identifier of the chain being spoken.
pub type ChainId = Hash<32>;

/// Vote reference packed into 32 bits: the low 8 bits carry the category,
/// the high 24 bits the instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteId {
    pub category: u8,
    pub instance: u32,
}

impl VoteId {
    const INSTANCE_MAX: u32 = (1 << 24) - 1;

    pub fn new(category: u8, instance: u32) -> Self {
        Self { category, instance }
    }
}

impl fmt::Display for VoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.category, self.instance)
    }
}

impl Encode for VoteId {
    fn encode(&self, out: &mut Vec<u8>) -> Result<(), EncodeError> {
        if self.instance > Self::INSTANCE_MAX {
            return Err(EncodeError::OutOfRange("vote id instance"));
        }
        let packed = u32::from(self.category) | (self.instance << 8);
        packed.encode(out)
    }
}

impl Decode for VoteId {
    fn decode(buf: &mut ByteBuffer) -> Result<Self, DecodeError> {
        let packed = u32::decode(buf)?;
        Ok(Self {
            category: (packed & 0xff) as u8,
            instance: packed >> 8,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use graphene_codec::{Decode, Encode};

    #[test]
    fn vote_id_packing() {
        let vote = VoteId::new(1, 0x0203);
        let wire = vote.to_wire().unwrap();
        assert_eq!(wire, vec![0x01, 0x03, 0x02, 0x00]);
        assert_eq!(VoteId::from_wire(&wire).unwrap(), vote);
        assert_eq!(vote.to_string(), "1:515");
    }

    #[test]
    fn vote_id_instance_bound() {
        let vote = VoteId::new(0, 1 << 24);
        assert_eq!(
            vote.to_wire(),
            Err(graphene_codec::EncodeError::OutOfRange("vote id instance"))
        );
    }
}
