//! The closed set of wire messages and their field schemas.
//!
//! Each message is an ordered record tagged by a numeric id in the frame
//! header. Ids outside the implemented table still deframe cleanly (framing
//! is independent of content), surface as [`Message::Unknown`] and get
//! logged and skipped.

use graphene_codec::{ByteBuffer, Decode, DecodeError, Encode, EncodeError};
use graphene_primitives::{
    block_num, wire_object, AddressEntry, ChainId, IpAddress, IpEndpoint, ItemId,
    PrecomputableTransaction, PublicKey, SignedBlock, Signature, VariantObject,
};
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::framing::Frame;

pub const MSG_TRX: u32 = 1000;
pub const MSG_BLOCK: u32 = 1001;
pub const MSG_ITEM_IDS_INVENTORY: u32 = 5001;
pub const MSG_BLOCKCHAIN_ITEM_IDS_INVENTORY: u32 = 5002;
pub const MSG_FETCH_BLOCKCHAIN_ITEM_IDS: u32 = 5003;
pub const MSG_FETCH_ITEMS: u32 = 5004;
pub const MSG_ITEM_NOT_AVAILABLE: u32 = 5005;
pub const MSG_HELLO: u32 = 5006;
pub const MSG_CONNECTION_ACCEPTED: u32 = 5007;
pub const MSG_CONNECTION_REJECTED: u32 = 5008;
pub const MSG_ADDRESS_REQUEST: u32 = 5009;
pub const MSG_ADDRESS: u32 = 5010;
pub const MSG_CLOSING_CONNECTION: u32 = 5011;
pub const MSG_TIME_REQUEST: u32 = 5012;
pub const MSG_TIME_REPLY: u32 = 5013;

wire_object! {
    pub struct TrxMessage {
        pub trx: PrecomputableTransaction,
    }
}

wire_object! {
    pub struct BlockMessage {
        pub block: SignedBlock,
        pub block_id: ItemId,
    }
}

wire_object! {
    pub struct ItemIdsInventoryMessage {
        pub item_type: u32,
        pub item_hashes_available: Vec<ItemId>,
    }
}

wire_object! {
    pub struct BlockchainItemIdsInventoryMessage {
        pub total_remaining_item_count: u32,
        pub item_type: u32,
        pub item_hashes_available: Vec<ItemId>,
    }
}

wire_object! {
    pub struct FetchBlockchainItemIdsMessage {
        pub item_type: u32,
        pub blockchain_synopsis: Vec<ItemId>,
    }
}

wire_object! {
    pub struct FetchItemsMessage {
        pub item_type: u32,
        pub items_to_fetch: Vec<ItemId>,
    }
}

wire_object! {
    pub struct ItemNotAvailableMessage {
        pub requested_item_type: u32,
        pub requested_item_hash: ItemId,
    }
}

wire_object! {
    pub struct HelloMessage {
        pub user_agent: String,
        pub core_protocol_version: u32,
        pub inbound_address: IpAddress,
        pub inbound_port: u16,
        pub outbound_port: u16,
        pub node_public_key: PublicKey,
        pub signed_shared_secret: Signature,
        pub chain_id: ChainId,
        pub user_data: VariantObject,
    }
}

wire_object! {
    pub struct ConnectionRejectedMessage {
        pub user_agent: String,
        pub core_protocol_version: u32,
        pub remote_endpoint: IpEndpoint,
        pub reason_code: u8,
        pub reason_string: String,
    }
}

wire_object! {
    pub struct AddressMessage {
        pub addresses: Vec<AddressEntry>,
    }
}

wire_object! {
    pub struct TimeRequestMessage {
        pub request_sent_time: u64,
    }
}

wire_object! {
    pub struct TimeReplyMessage {
        pub request_sent_time: u64,
        pub request_received_time: u64,
        pub reply_transmitted_time: u64,
    }
}

/// Orderly goodbye. The full schema carries an exception payload after
/// these two fields; only the leading fields are decoded and anything
/// trailing is discarded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClosingConnectionMessage {
    pub reason_for_closing: String,
    pub closing_due_to_error: bool,
}

impl Encode for ClosingConnectionMessage {
    fn encode(&self, out: &mut Vec<u8>) -> Result<(), EncodeError> {
        self.reason_for_closing.encode(out)?;
        self.closing_due_to_error.encode(out)
    }
}

impl Decode for ClosingConnectionMessage {
    fn decode(buf: &mut ByteBuffer) -> Result<Self, DecodeError> {
        Ok(Self {
            reason_for_closing: String::decode(buf)?,
            closing_due_to_error: bool::decode(buf)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    Trx(TrxMessage),
    Block(BlockMessage),
    ItemIdsInventory(ItemIdsInventoryMessage),
    BlockchainItemIdsInventory(BlockchainItemIdsInventoryMessage),
    FetchBlockchainItemIds(FetchBlockchainItemIdsMessage),
    FetchItems(FetchItemsMessage),
    ItemNotAvailable(ItemNotAvailableMessage),
    Hello(HelloMessage),
    ConnectionAccepted,
    ConnectionRejected(ConnectionRejectedMessage),
    AddressRequest,
    Address(AddressMessage),
    ClosingConnection(ClosingConnectionMessage),
    TimeRequest(TimeRequestMessage),
    TimeReply(TimeReplyMessage),
    Unknown { msg_type: u32, payload: Vec<u8> },
}

impl Message {
    pub fn msg_type(&self) -> u32 {
        match self {
            Message::Trx(_) => MSG_TRX,
            Message::Block(_) => MSG_BLOCK,
            Message::ItemIdsInventory(_) => MSG_ITEM_IDS_INVENTORY,
            Message::BlockchainItemIdsInventory(_) => MSG_BLOCKCHAIN_ITEM_IDS_INVENTORY,
            Message::FetchBlockchainItemIds(_) => MSG_FETCH_BLOCKCHAIN_ITEM_IDS,
            Message::FetchItems(_) => MSG_FETCH_ITEMS,
            Message::ItemNotAvailable(_) => MSG_ITEM_NOT_AVAILABLE,
            Message::Hello(_) => MSG_HELLO,
            Message::ConnectionAccepted => MSG_CONNECTION_ACCEPTED,
            Message::ConnectionRejected(_) => MSG_CONNECTION_REJECTED,
            Message::AddressRequest => MSG_ADDRESS_REQUEST,
            Message::Address(_) => MSG_ADDRESS,
            Message::ClosingConnection(_) => MSG_CLOSING_CONNECTION,
            Message::TimeRequest(_) => MSG_TIME_REQUEST,
            Message::TimeReply(_) => MSG_TIME_REPLY,
            Message::Unknown { msg_type, .. } => *msg_type,
        }
    }

    /// Decodes the payload of one deframed message. Ids outside the table
    /// come back as [`Message::Unknown`]; malformed payloads of known ids
    /// are an error.
    pub fn decode_frame(frame: &Frame) -> Result<Self, DecodeError> {
        let mut buf = ByteBuffer::from(frame.payload.as_slice());
        let msg = match frame.msg_type {
            MSG_TRX => Message::Trx(Decode::decode(&mut buf)?),
            MSG_BLOCK => Message::Block(Decode::decode(&mut buf)?),
            MSG_ITEM_IDS_INVENTORY => Message::ItemIdsInventory(Decode::decode(&mut buf)?),
            MSG_BLOCKCHAIN_ITEM_IDS_INVENTORY => {
                Message::BlockchainItemIdsInventory(Decode::decode(&mut buf)?)
            }
            MSG_FETCH_BLOCKCHAIN_ITEM_IDS => {
                Message::FetchBlockchainItemIds(Decode::decode(&mut buf)?)
            }
            MSG_FETCH_ITEMS => Message::FetchItems(Decode::decode(&mut buf)?),
            MSG_ITEM_NOT_AVAILABLE => Message::ItemNotAvailable(Decode::decode(&mut buf)?),
            MSG_HELLO => Message::Hello(Decode::decode(&mut buf)?),
            MSG_CONNECTION_ACCEPTED => Message::ConnectionAccepted,
            MSG_CONNECTION_REJECTED => Message::ConnectionRejected(Decode::decode(&mut buf)?),
            MSG_ADDRESS_REQUEST => Message::AddressRequest,
            MSG_ADDRESS => Message::Address(Decode::decode(&mut buf)?),
            MSG_CLOSING_CONNECTION => Message::ClosingConnection(Decode::decode(&mut buf)?),
            MSG_TIME_REQUEST => Message::TimeRequest(Decode::decode(&mut buf)?),
            MSG_TIME_REPLY => Message::TimeReply(Decode::decode(&mut buf)?),
            other => Message::Unknown {
                msg_type: other,
                payload: frame.payload.clone(),
            },
        };
        Ok(msg)
    }

    pub fn encode_payload(&self) -> Result<Vec<u8>, EncodeError> {
        match self {
            Message::Trx(m) => m.to_wire(),
            Message::Block(m) => m.to_wire(),
            Message::ItemIdsInventory(m) => m.to_wire(),
            Message::BlockchainItemIdsInventory(m) => m.to_wire(),
            Message::FetchBlockchainItemIds(m) => m.to_wire(),
            Message::FetchItems(m) => m.to_wire(),
            Message::ItemNotAvailable(m) => m.to_wire(),
            Message::Hello(m) => m.to_wire(),
            Message::ConnectionAccepted => Ok(Vec::new()),
            Message::ConnectionRejected(m) => m.to_wire(),
            Message::AddressRequest => Ok(Vec::new()),
            Message::Address(m) => m.to_wire(),
            Message::ClosingConnection(m) => m.to_wire(),
            Message::TimeRequest(m) => m.to_wire(),
            Message::TimeReply(m) => m.to_wire(),
            Message::Unknown { payload, .. } => Ok(payload.clone()),
        }
    }

    pub fn to_frame(&self) -> Result<Frame, EncodeError> {
        Ok(Frame::new(self.msg_type(), self.encode_payload()?))
    }

    /// One-line human description for the session log.
    pub fn summary(&self) -> String {
        match self {
            Message::Trx(m) => format!(
                "transaction with {} operation(s)",
                m.trx.operations.len()
            ),
            Message::Block(m) => format!(
                "block {} ({}) with {} transaction(s)",
                block_num(&m.block_id),
                m.block_id,
                m.block.transactions.len()
            ),
            Message::ItemIdsInventory(m) => format!(
                "{} item(s) of type {}: {}",
                m.item_hashes_available.len(),
                m.item_type,
                preview(&m.item_hashes_available)
            ),
            Message::BlockchainItemIdsInventory(m) => format!(
                "{} id(s) of type {}, {} remaining: {}",
                m.item_hashes_available.len(),
                m.item_type,
                m.total_remaining_item_count,
                preview(&m.item_hashes_available)
            ),
            Message::FetchBlockchainItemIds(m) => format!(
                "synopsis of {} id(s) for type {}: {}",
                m.blockchain_synopsis.len(),
                m.item_type,
                preview(&m.blockchain_synopsis)
            ),
            Message::FetchItems(m) => format!(
                "fetching {} item(s) of type {}: {}",
                m.items_to_fetch.len(),
                m.item_type,
                preview(&m.items_to_fetch)
            ),
            Message::ItemNotAvailable(m) => format!(
                "item {} of type {} not available",
                m.requested_item_hash, m.requested_item_type
            ),
            Message::Hello(m) => format!(
                "{} protocol {} key {}",
                m.user_agent, m.core_protocol_version, m.node_public_key
            ),
            Message::ConnectionAccepted => "connection accepted".to_string(),
            Message::ConnectionRejected(m) => format!(
                "rejected by {} ({}): {}",
                m.user_agent, m.reason_code, m.reason_string
            ),
            Message::AddressRequest => "address request".to_string(),
            Message::Address(m) => format!(
                "{} peer(s): {}",
                m.addresses.len(),
                m.addresses
                    .iter()
                    .take(3)
                    .map(|entry| entry.remote_endpoint.to_string())
                    .join(", ")
            ),
            Message::ClosingConnection(m) => format!(
                "peer closing (error: {}): {}",
                m.closing_due_to_error, m.reason_for_closing
            ),
            Message::TimeRequest(m) => format!("time request sent at {}us", m.request_sent_time),
            Message::TimeReply(m) => format!(
                "time reply: sent {}us, received {}us, replied {}us",
                m.request_sent_time, m.request_received_time, m.reply_transmitted_time
            ),
            Message::Unknown { msg_type, payload } => format!(
                "unhandled {} ({}) with {} payload byte(s)",
                message_type_name(*msg_type),
                msg_type,
                payload.len()
            ),
        }
    }
}

fn preview(hashes: &[ItemId]) -> String {
    if hashes.is_empty() {
        return "(none)".to_string();
    }
    let shown = hashes.iter().take(2).map(|hash| hash.to_string()).join(", ");
    if hashes.len() > 2 {
        format!("{shown}, ...")
    } else {
        shown
    }
}

/// Wire names of every id in the core range, handled or not; unknown-but-
/// named messages still show up usefully in the log.
pub fn message_type_name(msg_type: u32) -> &'static str {
    match msg_type {
        MSG_TRX => "trx_message_type",
        MSG_BLOCK => "block_message_type",
        5000 | 5099 => "core_message_type",
        MSG_ITEM_IDS_INVENTORY => "item_ids_inventory_message_type",
        MSG_BLOCKCHAIN_ITEM_IDS_INVENTORY => "blockchain_item_ids_inventory_message_type",
        MSG_FETCH_BLOCKCHAIN_ITEM_IDS => "fetch_blockchain_item_ids_message_type",
        MSG_FETCH_ITEMS => "fetch_items_message_type",
        MSG_ITEM_NOT_AVAILABLE => "item_not_available_message_type",
        MSG_HELLO => "hello_message_type",
        MSG_CONNECTION_ACCEPTED => "connection_accepted_message_type",
        MSG_CONNECTION_REJECTED => "connection_rejected_message_type",
        MSG_ADDRESS_REQUEST => "address_request_message_type",
        MSG_ADDRESS => "address_message_type",
        MSG_CLOSING_CONNECTION => "closing_connection_message_type",
        MSG_TIME_REQUEST => "current_time_request_message_type",
        MSG_TIME_REPLY => "current_time_reply_message_type",
        5014 => "check_firewall_message_type",
        5015 => "check_firewall_reply_message_type",
        5016 => "get_current_connections_request_message_type",
        5017 => "get_current_connections_reply_message_type",
        _ => "unknown_message_type",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_hello() -> HelloMessage {
        HelloMessage {
            user_agent: "Haruka Mock Client".to_string(),
            core_protocol_version: 106,
            inbound_address: "0.0.0.0".parse().unwrap(),
            inbound_port: 0,
            outbound_port: 0,
            node_public_key: PublicKey([0x02; 33]),
            signed_shared_secret: Signature([0x1f; 65]),
            chain_id: "4018d7844c78f6a6c41c6a552b898022310fc5dec06da467ee7905a8dad512c8"
                .parse()
                .unwrap(),
            user_data: VariantObject::from(vec![(
                "platform".to_string(),
                graphene_primitives::Variant::from("unknown"),
            )]),
        }
    }

    #[test]
    fn hello_roundtrip() {
        let hello = sample_hello();
        let frame = Message::Hello(hello.clone()).to_frame().unwrap();
        assert_eq!(frame.msg_type, MSG_HELLO);
        assert_eq!(
            Message::decode_frame(&frame).unwrap(),
            Message::Hello(hello)
        );
    }

    #[test]
    fn hello_field_layout() {
        let wire = sample_hello().to_wire().unwrap();
        // varint(18) + "Haruka Mock Client"
        assert_eq!(wire[0], 18);
        assert_eq!(&wire[1..19], b"Haruka Mock Client");
        // core_protocol_version 106 LE
        assert_eq!(&wire[19..23], &[106, 0, 0, 0]);
        // 0.0.0.0 reversed + two zero ports
        assert_eq!(&wire[23..31], &[0; 8]);
    }

    #[test]
    fn empty_messages_have_empty_payloads() {
        assert!(Message::ConnectionAccepted.encode_payload().unwrap().is_empty());
        assert!(Message::AddressRequest.encode_payload().unwrap().is_empty());
    }

    #[test]
    fn unknown_ids_are_preserved() {
        let frame = Frame::new(5014, vec![1, 2, 3]);
        let msg = Message::decode_frame(&frame).unwrap();
        assert_eq!(
            msg,
            Message::Unknown {
                msg_type: 5014,
                payload: vec![1, 2, 3]
            }
        );
        assert_eq!(msg.to_frame().unwrap(), frame);
    }

    #[test]
    fn closing_connection_discards_trailing_bytes() {
        let mut wire = ClosingConnectionMessage {
            reason_for_closing: "bye".to_string(),
            closing_due_to_error: true,
        }
        .to_wire()
        .unwrap();
        wire.extend_from_slice(&[0xff; 24]);

        let frame = Frame::new(MSG_CLOSING_CONNECTION, wire);
        let msg = Message::decode_frame(&frame).unwrap();
        assert_eq!(
            msg,
            Message::ClosingConnection(ClosingConnectionMessage {
                reason_for_closing: "bye".to_string(),
                closing_due_to_error: true,
            })
        );
    }

    #[test]
    fn inventory_summary_shows_counts() {
        let msg = Message::BlockchainItemIdsInventory(BlockchainItemIdsInventoryMessage {
            total_remaining_item_count: 12,
            item_type: MSG_BLOCK,
            item_hashes_available: vec![ItemId::new([1; 20]), ItemId::new([2; 20]), ItemId::new([3; 20])],
        });
        let summary = msg.summary();
        assert!(summary.contains("3 id(s)"));
        assert!(summary.contains("12 remaining"));
        assert!(summary.ends_with("..."));
    }
}
