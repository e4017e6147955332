//! Support objects referenced by operations, transactions and the address
//! book. Field order is the wire order.

use graphene_codec::utils::{Extension, KeyValuePairs, SparseObject};
use graphene_codec::{ByteBuffer, DecodeError, EncodeError};
use serde::{Deserialize, Serialize};

use crate::ids::{AccountId, AssetId};
use crate::keys::{NodeId, PublicKey};
use crate::net::IpEndpoint;
use crate::{Bytes, ItemId, VoteId};

/// Extension payload with no defined fields. Its sparse encoding is always
/// an empty field list, but the slot keeps old and new nodes compatible.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmptyExtension;

impl SparseObject for EmptyExtension {
    const NAME: &'static str = "EmptyExtension";

    fn encode_present(&self) -> Result<Vec<(u64, Vec<u8>)>, EncodeError> {
        Ok(Vec::new())
    }

    fn decode_field(&mut self, index: u64, _buf: &mut ByteBuffer) -> Result<(), DecodeError> {
        Err(DecodeError::InvalidTag {
            what: Self::NAME,
            tag: index,
        })
    }
}

wire_object! {
    /// One entry of the peer address book exchanged via message 5010.
    pub struct AddressEntry {
        pub remote_endpoint: IpEndpoint,
        pub last_seen_time: u32,
        pub latency: i64,
        pub node_id: NodeId,
        pub direction: u8,
        pub firewalled: u8,
    }
}

wire_object! {
    pub struct Asset {
        pub amount: i64,
        pub asset_id: AssetId,
    }
}

wire_object! {
    pub struct Memo {
        pub r#from: PublicKey,
        pub to: PublicKey,
        pub nonce: u64,
        pub message: Bytes,
    }
}

wire_object! {
    pub struct Price {
        pub base: Asset,
        pub quote: Asset,
    }
}

wire_object! {
    pub struct PriceFeed {
        pub settlement_price: Price,
        pub maintenance_collateral_ratio: u16,
        pub maximum_short_squeeze_ratio: u16,
        pub core_exchange_rate: Price,
    }
}

wire_object! {
    pub struct Authority {
        pub weight_threshold: u32,
        pub account_auths: KeyValuePairs<AccountId, u16>,
        pub key_auths: KeyValuePairs<PublicKey, u16>,
        pub address_auths: KeyValuePairs<ItemId, u16>,
    }
}

wire_object! {
    pub struct AccountOptions {
        pub memo_key: PublicKey,
        pub voting_account: AccountId,
        pub num_witness: u16,
        pub num_committee: u16,
        pub votes: Vec<VoteId>,
        pub extensions: Extension<EmptyExtension>,
    }
}

sparse_object! {
    pub struct CallOrderOptions {
        pub target_collateral_ratio: u16,
    }
}

wire_object! {
    pub struct LinearVesting {
        pub begin_timestamp: u32,
        pub vesting_cliff_seconds: u32,
        pub vesting_duration_seconds: u32,
    }
}

wire_object! {
    pub struct CddVesting {
        pub start_claim: u32,
        pub vesting_seconds: u32,
    }
}

wire_object! {
    pub struct InstantVesting {
    }
}

static_variant! {
    pub enum VestingPolicy {
        0 => Linear(LinearVesting),
        1 => Cdd(CddVesting),
        2 => Instant(InstantVesting),
    }
}

sparse_object! {
    pub struct AdditionalAssetOptions {
        pub reward_percent: u16,
        pub whitelist_market_fee_sharing: Vec<AccountId>,
    }
}

wire_object! {
    pub struct AssetOptions {
        pub max_supply: i64,
        pub market_fee_percent: u16,
        pub max_market_fee: i64,
        pub issuer_permissions: u16,
        pub flags: u16,
        pub core_exchange_rate: Price,
        pub whitelist_authorities: Vec<AccountId>,
        pub blacklist_authorities: Vec<AccountId>,
        pub whitelist_markets: Vec<AssetId>,
        pub blacklist_markets: Vec<AssetId>,
        pub description: String,
        pub extensions: Extension<AdditionalAssetOptions>,
    }
}

wire_object! {
    pub struct BitAssetOptions {
        pub feed_lifetime_sec: u16,
        pub minimum_feeds: u8,
        pub force_settlement_delay_sec: u32,
        pub force_settlement_offset_percent: u16,
        pub maximum_force_settlement_volume: u16,
        pub short_backing_asset: AssetId,
        pub extensions: Extension<EmptyExtension>,
    }
}

wire_object! {
    pub struct RefundWorkerInitializer {
    }
}

wire_object! {
    pub struct VestingBalanceWorkerInitializer {
        pub pay_vesting_period_days: u16,
    }
}

wire_object! {
    pub struct BurnWorkerInitializer {
    }
}

static_variant! {
    pub enum WorkerInitializer {
        0 => Refund(RefundWorkerInitializer),
        1 => VestingBalance(VestingBalanceWorkerInitializer),
        2 => Burn(BurnWorkerInitializer),
    }
}

wire_object! {
    pub struct AccountNameEqLitPredicate {
        pub account_id: AccountId,
        pub name: String,
    }
}

wire_object! {
    pub struct AssetSymbolEqLitPredicate {
        pub asset_id: AssetId,
        pub symbol: String,
    }
}

wire_object! {
    pub struct BlockIdPredicate {
        pub id: ItemId,
    }
}

static_variant! {
    pub enum Predicate {
        0 => AccountNameEqLit(AccountNameEqLitPredicate),
        1 => AssetSymbolEqLit(AssetSymbolEqLitPredicate),
        2 => BlockId(BlockIdPredicate),
    }
}

wire_object! {
    pub struct BlindInput {
        pub commitment: PublicKey,
        pub owner: Authority,
    }
}

wire_object! {
    pub struct StealthConfirmation {
        pub one_time_key: PublicKey,
        pub to: Option<PublicKey>,
        pub encrypted_memo: Bytes,
    }
}

wire_object! {
    pub struct BlindOutput {
        pub commitment: PublicKey,
        pub range_proof: Bytes,
        pub owner: Authority,
        pub stealth_memo: Option<StealthConfirmation>,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use graphene_codec::{Decode, Encode};

    #[test]
    fn asset_roundtrip() {
        let asset = Asset {
            amount: -5,
            asset_id: AssetId::new(0),
        };
        let wire = asset.to_wire().unwrap();
        assert_eq!(wire.len(), 8 + 1);
        assert_eq!(Asset::from_wire(&wire).unwrap(), asset);
    }

    #[test]
    fn authority_maps_preserve_order() {
        let authority = Authority {
            weight_threshold: 1,
            account_auths: vec![(AccountId::new(9), 1u16), (AccountId::new(3), 2u16)].into(),
            key_auths: KeyValuePairs::new(),
            address_auths: KeyValuePairs::new(),
        };
        let wire = authority.to_wire().unwrap();
        let back = Authority::from_wire(&wire).unwrap();
        assert_eq!(back, authority);
    }

    #[test]
    fn call_order_options_is_sparse() {
        let full = Extension(CallOrderOptions {
            target_collateral_ratio: Some(1750),
        });
        assert_eq!(full.to_wire().unwrap(), vec![1, 0, 0xd6, 0x06]);

        let empty = Extension(CallOrderOptions::default());
        assert_eq!(empty.to_wire().unwrap(), vec![0]);
    }

    #[test]
    fn empty_extension_rejects_any_field() {
        assert!(Extension::<EmptyExtension>::from_wire(&[0]).is_ok());
        assert!(Extension::<EmptyExtension>::from_wire(&[1, 0, 0]).is_err());
    }

    #[test]
    fn vesting_policy_discriminators() {
        let policy = VestingPolicy::Cdd(CddVesting {
            start_claim: 10,
            vesting_seconds: 20,
        });
        let wire = policy.to_wire().unwrap();
        assert_eq!(wire[0], 1);
        assert_eq!(VestingPolicy::from_wire(&wire).unwrap(), policy);

        assert!(matches!(
            VestingPolicy::from_wire(&[3]),
            Err(graphene_codec::DecodeError::InvalidVariant { .. })
        ));
    }
}
