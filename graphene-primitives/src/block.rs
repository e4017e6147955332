//! Transactions and signed blocks as carried by messages 1000 and 1001.

use graphene_codec::utils::{Extension, Null};

use crate::ids::{FullObjectId, WitnessId};
use crate::keys::Signature;
use crate::objects::{Asset, EmptyExtension};
use crate::operations::Operation;
use crate::variant::VariantObject;
use crate::ItemId;

static_variant! {
    /// Outcome of one applied operation.
    pub enum OperationResult {
        0 => Void(Null),
        1 => ObjectId(FullObjectId),
        2 => Asset(Asset),
    }
}

wire_object! {
    /// Transaction as broadcast ahead of a block (message 1000): no
    /// operation results yet.
    pub struct PrecomputableTransaction {
        pub ref_block_num: u16,
        pub ref_block_prefix: u32,
        pub expiration: u32,
        pub operations: Vec<Operation>,
        pub extensions: Extension<EmptyExtension>,
        pub signatures: Vec<Signature>,
    }
}

wire_object! {
    /// Transaction inside a produced block, results included.
    pub struct Transaction {
        pub ref_block_num: u16,
        pub ref_block_prefix: u32,
        pub expiration: u32,
        pub operations: Vec<Operation>,
        pub extensions: Extension<EmptyExtension>,
        pub signatures: Vec<Signature>,
        pub operation_results: Vec<OperationResult>,
    }
}

wire_object! {
    pub struct SignedBlock {
        pub previous: ItemId,
        pub timestamp: u32,
        pub witness: WitnessId,
        pub transaction_merkle_root: ItemId,
        pub extensions: Vec<VariantObject>,
        pub witness_signature: Signature,
        pub transactions: Vec<Transaction>,
    }
}

/// Block ids embed the block number in their first four bytes, big-endian.
pub fn block_num(id: &ItemId) -> u32 {
    u32::from_be_bytes([id[0], id[1], id[2], id[3]])
}
