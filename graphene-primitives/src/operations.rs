//! The closed catalog of blockchain operations.
//!
//! Operations travel as a tagged union: a varint opid followed by the
//! operation body. The opid table has reserved gaps (4, 42, 44, 46 and
//! everything past 48); those slots decode to `InvalidVariant` and have no
//! corresponding enum case, so they cannot be produced on encode either.

use graphene_codec::utils::Extension;

use crate::ids::{
    AccountId, AssetId, CommitteeMemberId, LimitOrderId, ProposalId, VestingBalanceId,
    WithdrawPermissionId, WitnessId,
};
use crate::keys::PublicKey;
use crate::objects::{
    AccountOptions, Asset, AssetOptions, Authority, BitAssetOptions, BlindInput, BlindOutput,
    CallOrderOptions, EmptyExtension, Memo, Predicate, Price, PriceFeed, VestingPolicy,
    WorkerInitializer,
};
use crate::{Bytes, Hash};

wire_object! {
    pub struct TransferOperation {
        pub fee: Asset,
        pub r#from: AccountId,
        pub to: AccountId,
        pub amount: Asset,
        pub memo: Option<Memo>,
        pub extensions: Extension<EmptyExtension>,
    }
}

wire_object! {
    pub struct LimitOrderCreateOperation {
        pub fee: Asset,
        pub seller: AccountId,
        pub amount_to_sell: Asset,
        pub min_to_receive: Asset,
        pub expiration: u32,
        pub fill_or_kill: bool,
        pub extensions: Extension<EmptyExtension>,
    }
}

wire_object! {
    pub struct LimitOrderCancelOperation {
        pub fee: Asset,
        pub order: LimitOrderId,
        pub fee_paying_account: AccountId,
        pub extensions: Extension<EmptyExtension>,
    }
}

wire_object! {
    pub struct CallOrderUpdateOperation {
        pub fee: Asset,
        pub funding_account: AccountId,
        pub delta_collateral: Asset,
        pub delta_debt: Asset,
        pub extensions: Extension<CallOrderOptions>,
    }
}

wire_object! {
    pub struct AccountCreateOperation {
        pub fee: Asset,
        pub registrar: AccountId,
        pub referrer: AccountId,
        pub referrer_percent: u16,
        pub name: String,
        pub owner: Authority,
        pub active: Authority,
        pub options: AccountOptions,
        pub extensions: Extension<EmptyExtension>,
    }
}

wire_object! {
    pub struct AccountUpdateOperation {
        pub fee: Asset,
        pub account: AccountId,
        pub owner: Option<Authority>,
        pub active: Option<Authority>,
        pub new_options: Option<AccountOptions>,
        pub extensions: Extension<EmptyExtension>,
    }
}

wire_object! {
    pub struct AccountWhitelistOperation {
        pub fee: Asset,
        pub authorizing_account: AccountId,
        pub account_to_list: AccountId,
        pub new_listing: u8,
        pub extensions: Extension<EmptyExtension>,
    }
}

wire_object! {
    pub struct AccountUpgradeOperation {
        pub fee: Asset,
        pub account_to_update: AccountId,
        pub upgrade_to_lifetime_member: bool,
        pub extensions: Extension<EmptyExtension>,
    }
}

wire_object! {
    pub struct AccountTransferOperation {
        pub fee: Asset,
        pub account_id: AccountId,
        pub new_owner: AccountId,
        pub extensions: Extension<EmptyExtension>,
    }
}

wire_object! {
    pub struct AssetCreateOperation {
        pub fee: Asset,
        pub issuer: AccountId,
        pub symbol: String,
        pub precision: u8,
        pub common_options: AssetOptions,
        pub bitasset_opts: Option<BitAssetOptions>,
        pub is_prediction_market: bool,
        pub extensions: Extension<EmptyExtension>,
    }
}

wire_object! {
    pub struct AssetUpdateOperation {
        pub fee: Asset,
        pub issuer: AccountId,
        pub asset_to_update: AssetId,
        pub new_issuer: Option<AccountId>,
        pub new_options: AssetOptions,
        pub extensions: Extension<EmptyExtension>,
    }
}

wire_object! {
    pub struct AssetUpdateBitassetOperation {
        pub fee: Asset,
        pub issuer: AccountId,
        pub asset_to_update: AssetId,
        pub new_options: BitAssetOptions,
        pub extensions: Extension<EmptyExtension>,
    }
}

wire_object! {
    pub struct AssetUpdateFeedProducersOperation {
        pub fee: Asset,
        pub issuer: AccountId,
        pub asset_to_update: AssetId,
        pub new_feed_producers: Vec<AccountId>,
        pub extensions: Extension<EmptyExtension>,
    }
}

wire_object! {
    pub struct AssetIssueOperation {
        pub fee: Asset,
        pub issuer: AccountId,
        pub asset_to_issue: Asset,
        pub issue_to_account: AccountId,
        pub memo: Option<Memo>,
        pub extensions: Extension<EmptyExtension>,
    }
}

wire_object! {
    pub struct AssetReserveOperation {
        pub fee: Asset,
        pub payer: AccountId,
        pub amount_to_reserve: Asset,
        pub extensions: Extension<EmptyExtension>,
    }
}

wire_object! {
    pub struct AssetFundFeePoolOperation {
        pub fee: Asset,
        pub from_account: AccountId,
        pub asset_id: AssetId,
        pub amount: i64,
        pub extensions: Extension<EmptyExtension>,
    }
}

wire_object! {
    pub struct AssetSettleOperation {
        pub fee: Asset,
        pub account: AccountId,
        pub amount: Asset,
        pub extensions: Extension<EmptyExtension>,
    }
}

wire_object! {
    pub struct AssetGlobalSettleOperation {
        pub fee: Asset,
        pub issuer: AccountId,
        pub asset_to_settle: AssetId,
        pub settle_price: Price,
        pub extensions: Extension<EmptyExtension>,
    }
}

wire_object! {
    pub struct AssetPublishFeedOperation {
        pub fee: Asset,
        pub publisher: AccountId,
        pub asset_id: AssetId,
        pub feed: PriceFeed,
        pub extensions: Extension<EmptyExtension>,
    }
}

wire_object! {
    pub struct WitnessCreateOperation {
        pub fee: Asset,
        pub witness_account: AccountId,
        pub url: String,
        pub block_signing_key: PublicKey,
    }
}

wire_object! {
    pub struct WitnessUpdateOperation {
        pub fee: Asset,
        pub witness: WitnessId,
        pub witness_account: AccountId,
        pub new_url: Option<String>,
        pub new_signing_key: Option<PublicKey>,
    }
}

wire_object! {
    pub struct ProposalCreateOperation {
        pub fee: Asset,
        pub fee_paying_account: AccountId,
        pub expiration_time: u32,
        pub proposed_ops: Vec<Operation>,
        pub review_period_seconds: Option<u32>,
        pub extensions: Extension<EmptyExtension>,
    }
}

wire_object! {
    pub struct ProposalUpdateOperation {
        pub fee: Asset,
        pub fee_paying_account: AccountId,
        pub proposal: ProposalId,
        pub active_approvals_to_add: Vec<AccountId>,
        pub active_approvals_to_remove: Vec<AccountId>,
        pub owner_approvals_to_add: Vec<AccountId>,
        pub owner_approvals_to_remove: Vec<AccountId>,
        pub key_approvals_to_add: Vec<PublicKey>,
        pub key_approvals_to_remove: Vec<PublicKey>,
        pub extensions: Extension<EmptyExtension>,
    }
}

wire_object! {
    pub struct ProposalDeleteOperation {
        pub fee: Asset,
        pub fee_paying_account: AccountId,
        pub using_owner_authority: bool,
        pub proposal: ProposalId,
        pub extensions: Extension<EmptyExtension>,
    }
}

wire_object! {
    pub struct WithdrawPermissionCreateOperation {
        pub fee: Asset,
        pub withdraw_from_account: AccountId,
        pub authorized_account: AccountId,
        pub withdrawal_limit: Asset,
        pub withdrawal_period_sec: u32,
        pub periods_until_expiration: u32,
        pub period_start_time: u32,
    }
}

wire_object! {
    pub struct WithdrawPermissionUpdateOperation {
        pub fee: Asset,
        pub withdraw_from_account: AccountId,
        pub authorized_account: AccountId,
        pub permission_to_update: WithdrawPermissionId,
        pub withdrawal_limit: Asset,
        pub withdrawal_period_sec: u32,
        pub period_start_time: u32,
        pub periods_until_expiration: u32,
    }
}

wire_object! {
    pub struct WithdrawPermissionClaimOperation {
        pub fee: Asset,
        pub withdraw_permission: WithdrawPermissionId,
        pub withdraw_from_account: AccountId,
        pub withdraw_to_account: AccountId,
        pub amount_to_withdraw: Asset,
        pub memo: Option<Memo>,
    }
}

wire_object! {
    pub struct WithdrawPermissionDeleteOperation {
        pub fee: Asset,
        pub withdraw_from_account: AccountId,
        pub authorized_account: AccountId,
        pub withdraw_permission: WithdrawPermissionId,
    }
}

wire_object! {
    pub struct CommitteeMemberCreateOperation {
        pub fee: Asset,
        pub committee_member_account: AccountId,
        pub url: String,
    }
}

wire_object! {
    pub struct CommitteeMemberUpdateOperation {
        pub fee: Asset,
        pub committee_member: CommitteeMemberId,
        pub committee_member_account: AccountId,
        pub new_url: Option<String>,
    }
}

wire_object! {
    pub struct CommitteeMemberUpdateGlobalParametersOperation {
        pub fee: Asset,
        pub new_parameters: ChainParameters,
    }
}

wire_object! {
    pub struct VestingBalanceCreateOperation {
        pub fee: Asset,
        pub creator: AccountId,
        pub owner: AccountId,
        pub amount: Asset,
        pub policy: VestingPolicy,
    }
}

wire_object! {
    pub struct VestingBalanceWithdrawOperation {
        pub fee: Asset,
        pub vesting_balance: VestingBalanceId,
        pub owner: AccountId,
        pub amount: Asset,
    }
}

wire_object! {
    pub struct WorkerCreateOperation {
        pub fee: Asset,
        pub owner: AccountId,
        pub work_begin_date: u32,
        pub work_end_date: u32,
        pub daily_pay: i64,
        pub name: String,
        pub url: String,
        pub initializer: WorkerInitializer,
    }
}

wire_object! {
    pub struct CustomOperation {
        pub fee: Asset,
        pub payer: AccountId,
        pub required_auths: Vec<AccountId>,
        pub id: u16,
        pub data: Bytes,
    }
}

wire_object! {
    pub struct AssertOperation {
        pub fee: Asset,
        pub fee_paying_account: AccountId,
        pub predicates: Vec<Predicate>,
        pub required_auths: Vec<AccountId>,
        pub extensions: Extension<EmptyExtension>,
    }
}

wire_object! {
    pub struct BalanceClaimOperation {
        pub fee: Asset,
        pub deposit_to_account: AccountId,
        pub balance_to_claim: VestingBalanceId,
        pub balance_owner_key: PublicKey,
        pub total_claimed: Asset,
    }
}

wire_object! {
    pub struct OverrideTransferOperation {
        pub fee: Asset,
        pub issuer: AccountId,
        pub r#from: AccountId,
        pub to: AccountId,
        pub amount: Asset,
    }
}

wire_object! {
    pub struct TransferToBlindOperation {
        pub fee: Asset,
        pub amount: Asset,
        pub r#from: AccountId,
        pub blinding_factor: Hash<32>,
        pub inputs: Vec<BlindInput>,
    }
}

wire_object! {
    pub struct BlindTransferOperation {
        pub fee: Asset,
        pub inputs: Vec<BlindInput>,
        pub outputs: Vec<BlindOutput>,
    }
}

wire_object! {
    pub struct TransferFromBlindOperation {
        pub fee: Asset,
        pub amount: Asset,
        pub to: AccountId,
        pub blinding_factor: Hash<32>,
        pub inputs: Vec<BlindInput>,
    }
}

wire_object! {
    pub struct AssetClaimFeeOperation {
        pub fee: Asset,
        pub issuer: AccountId,
        pub amount_to_claim: Asset,
        pub extensions: Extension<EmptyExtension>,
    }
}

wire_object! {
    pub struct BidCollateralOperation {
        pub fee: Asset,
        pub bidder: AccountId,
        pub additional_collateral: Asset,
        pub debt_covered: Asset,
        pub extensions: Extension<EmptyExtension>,
    }
}

wire_object! {
    pub struct AssetClaimPoolOperation {
        pub fee: Asset,
        pub issuer: AccountId,
        pub asset_id: AssetId,
        pub amount_to_claim: Asset,
        pub extensions: Extension<EmptyExtension>,
    }
}

wire_object! {
    pub struct AssetUpdateIssuerOperation {
        pub fee: Asset,
        pub issuer: AccountId,
        pub asset_to_update: AssetId,
        pub new_issuer: AccountId,
        pub extensions: Extension<EmptyExtension>,
    }
}

static_variant! {
    /// The operation variant table. Gaps in the opid sequence are reserved
    /// slots with no schema.
    pub enum Operation {
        0 => Transfer(TransferOperation),
        1 => LimitOrderCreate(LimitOrderCreateOperation),
        2 => LimitOrderCancel(LimitOrderCancelOperation),
        3 => CallOrderUpdate(CallOrderUpdateOperation),
        5 => AccountCreate(AccountCreateOperation),
        6 => AccountUpdate(AccountUpdateOperation),
        7 => AccountWhitelist(AccountWhitelistOperation),
        8 => AccountUpgrade(AccountUpgradeOperation),
        9 => AccountTransfer(AccountTransferOperation),
        10 => AssetCreate(AssetCreateOperation),
        11 => AssetUpdate(AssetUpdateOperation),
        12 => AssetUpdateBitasset(AssetUpdateBitassetOperation),
        13 => AssetUpdateFeedProducers(AssetUpdateFeedProducersOperation),
        14 => AssetIssue(AssetIssueOperation),
        15 => AssetReserve(AssetReserveOperation),
        16 => AssetFundFeePool(AssetFundFeePoolOperation),
        17 => AssetSettle(AssetSettleOperation),
        18 => AssetGlobalSettle(AssetGlobalSettleOperation),
        19 => AssetPublishFeed(AssetPublishFeedOperation),
        20 => WitnessCreate(WitnessCreateOperation),
        21 => WitnessUpdate(WitnessUpdateOperation),
        22 => ProposalCreate(ProposalCreateOperation),
        23 => ProposalUpdate(ProposalUpdateOperation),
        24 => ProposalDelete(ProposalDeleteOperation),
        25 => WithdrawPermissionCreate(WithdrawPermissionCreateOperation),
        26 => WithdrawPermissionUpdate(WithdrawPermissionUpdateOperation),
        27 => WithdrawPermissionClaim(WithdrawPermissionClaimOperation),
        28 => WithdrawPermissionDelete(WithdrawPermissionDeleteOperation),
        29 => CommitteeMemberCreate(CommitteeMemberCreateOperation),
        30 => CommitteeMemberUpdate(CommitteeMemberUpdateOperation),
        31 => CommitteeMemberUpdateGlobalParameters(CommitteeMemberUpdateGlobalParametersOperation),
        32 => VestingBalanceCreate(VestingBalanceCreateOperation),
        33 => VestingBalanceWithdraw(VestingBalanceWithdrawOperation),
        34 => WorkerCreate(WorkerCreateOperation),
        35 => Custom(CustomOperation),
        36 => Assert(AssertOperation),
        37 => BalanceClaim(BalanceClaimOperation),
        38 => OverrideTransfer(OverrideTransferOperation),
        39 => TransferToBlind(TransferToBlindOperation),
        40 => BlindTransfer(BlindTransferOperation),
        41 => TransferFromBlind(TransferFromBlindOperation),
        43 => AssetClaimFee(AssetClaimFeeOperation),
        45 => BidCollateral(BidCollateralOperation),
        47 => AssetClaimPool(AssetClaimPoolOperation),
        48 => AssetUpdateIssuer(AssetUpdateIssuerOperation),
    }
}

/// Fee parameters reuse the operation variant table, one entry per opid.
pub type FeeParameters = Operation;

wire_object! {
    pub struct FeeSchedule {
        pub parameters: Vec<FeeParameters>,
    }
}

wire_object! {
    pub struct ChainParameters {
        pub current_fees: FeeSchedule,
        pub block_interval: u8,
        pub maintenance_interval: u32,
        pub maintenance_skip_slots: u8,
        pub committee_proposal_review_period: u32,
        pub maximum_transaction_size: u32,
        pub maximum_block_size: u32,
        pub maximum_time_until_expiration: u32,
        pub maximum_proposal_lifetime: u32,
        pub maximum_asset_whitelist_authorities: u8,
        pub maximum_asset_feed_publishers: u8,
        pub maximum_witness_count: u16,
        pub maximum_committee_count: u16,
        pub maximum_authority_membership: u16,
        pub reserve_percent_of_fee: u16,
        pub network_percent_of_fee: u16,
        pub lifetime_referrer_percent_of_fee: u16,
        pub cashback_vesting_period_seconds: u32,
        pub cashback_vesting_threshold: i64,
        pub count_non_member_votes: bool,
        pub allow_non_member_whitelists: bool,
        pub witness_pay_per_block: i64,
        pub witness_pay_vesting_seconds: u32,
        pub worker_budget_per_day: i64,
        pub max_predicate_opcode: u16,
        pub fee_liquidation_threshold: i64,
        pub accounts_per_fee_scale: u16,
        pub account_fee_scale_bitshifts: u8,
        pub max_authority_depth: u8,
    }
}

impl Operation {
    /// The operation's numeric id on the wire.
    pub fn opid(&self) -> u64 {
        match self {
            Operation::Transfer(_) => 0,
            Operation::LimitOrderCreate(_) => 1,
            Operation::LimitOrderCancel(_) => 2,
            Operation::CallOrderUpdate(_) => 3,
            Operation::AccountCreate(_) => 5,
            Operation::AccountUpdate(_) => 6,
            Operation::AccountWhitelist(_) => 7,
            Operation::AccountUpgrade(_) => 8,
            Operation::AccountTransfer(_) => 9,
            Operation::AssetCreate(_) => 10,
            Operation::AssetUpdate(_) => 11,
            Operation::AssetUpdateBitasset(_) => 12,
            Operation::AssetUpdateFeedProducers(_) => 13,
            Operation::AssetIssue(_) => 14,
            Operation::AssetReserve(_) => 15,
            Operation::AssetFundFeePool(_) => 16,
            Operation::AssetSettle(_) => 17,
            Operation::AssetGlobalSettle(_) => 18,
            Operation::AssetPublishFeed(_) => 19,
            Operation::WitnessCreate(_) => 20,
            Operation::WitnessUpdate(_) => 21,
            Operation::ProposalCreate(_) => 22,
            Operation::ProposalUpdate(_) => 23,
            Operation::ProposalDelete(_) => 24,
            Operation::WithdrawPermissionCreate(_) => 25,
            Operation::WithdrawPermissionUpdate(_) => 26,
            Operation::WithdrawPermissionClaim(_) => 27,
            Operation::WithdrawPermissionDelete(_) => 28,
            Operation::CommitteeMemberCreate(_) => 29,
            Operation::CommitteeMemberUpdate(_) => 30,
            Operation::CommitteeMemberUpdateGlobalParameters(_) => 31,
            Operation::VestingBalanceCreate(_) => 32,
            Operation::VestingBalanceWithdraw(_) => 33,
            Operation::WorkerCreate(_) => 34,
            Operation::Custom(_) => 35,
            Operation::Assert(_) => 36,
            Operation::BalanceClaim(_) => 37,
            Operation::OverrideTransfer(_) => 38,
            Operation::TransferToBlind(_) => 39,
            Operation::BlindTransfer(_) => 40,
            Operation::TransferFromBlind(_) => 41,
            Operation::AssetClaimFee(_) => 43,
            Operation::BidCollateral(_) => 45,
            Operation::AssetClaimPool(_) => 47,
            Operation::AssetUpdateIssuer(_) => 48,
        }
    }
}
