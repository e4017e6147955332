//! Peer state machine: applies each inbound message to the session state
//! and emits the replies to send, in order.
//!
//! Keeping the transitions pure (no I/O here) is what makes the whole
//! handshake → address exchange → time sync → inventory flow testable
//! without a socket; the connection layer owns the sending.

use std::fmt;
use std::ops::ControlFlow;

use graphene_crypto::hash::sha256;
use graphene_crypto::kex::{recover_signer, SharedSecret};
use graphene_primitives::ItemId;
use thiserror::Error;

use crate::connection::{unix_micros, Error, PeerConfig};
use crate::messages::{
    message_type_name, BlockchainItemIdsInventoryMessage, FetchBlockchainItemIdsMessage,
    FetchItemsMessage, Message, TimeReplyMessage, TimeRequestMessage, AddressMessage, MSG_BLOCK,
    MSG_TRX,
};
use crate::secure::HandshakeError;

/// Session lifecycle. The connection enters the machine at `HelloSent`;
/// the earlier states belong to the transport handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Connecting,
    Handshaking,
    HelloSent,
    HelloExchanged,
    Active,
    Closed,
}

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("unexpected {name} ({msg_type}) in state {state:?}")]
    UnexpectedMessage {
        state: SessionState,
        msg_type: u32,
        name: &'static str,
    },
}

/// Why the peer loop stopped without an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloseReason {
    Rejected { reason: String },
    PeerClosing { reason: String },
}

impl fmt::Display for CloseReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CloseReason::Rejected { reason } => write!(f, "connection rejected: {reason}"),
            CloseReason::PeerClosing { reason } => write!(f, "peer closing: {reason}"),
        }
    }
}

/// Outcome of applying one inbound message.
#[derive(Debug)]
pub struct Reaction {
    /// Replies to send on the socket, in this order.
    pub replies: Vec<Message>,
    pub flow: ControlFlow<CloseReason>,
}

impl Reaction {
    fn replies(replies: Vec<Message>) -> Self {
        Self {
            replies,
            flow: ControlFlow::Continue(()),
        }
    }

    fn close(reason: CloseReason) -> Self {
        Self {
            replies: Vec::new(),
            flow: ControlFlow::Break(reason),
        }
    }
}

pub struct Peer {
    config: PeerConfig,
    shared_secret: SharedSecret,
    state: SessionState,
    /// Most recently requested block id; a blockchain inventory whose tail
    /// equals this is an empty continuation and ends the sync round.
    fetch_target: Option<ItemId>,
}

impl Peer {
    pub fn new(config: PeerConfig, shared_secret: SharedSecret) -> Self {
        Self {
            config,
            shared_secret,
            state: SessionState::HelloSent,
            fetch_target: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn set_closed(&mut self) {
        self.state = SessionState::Closed;
    }

    pub fn handle(&mut self, msg: &Message) -> Result<Reaction, Error> {
        self.check_state(msg)?;

        let reaction = match msg {
            Message::Hello(hello) => {
                if hello.chain_id != self.config.chain_id {
                    return Err(HandshakeError::ChainIdMismatch {
                        ours: self.config.chain_id,
                        theirs: hello.chain_id,
                    }
                    .into());
                }
                let digest = sha256(self.shared_secret.as_ref());
                let recovered = recover_signer(&digest, &hello.signed_shared_secret.0)
                    .map_err(|_| HandshakeError::SignatureMismatch)?;
                if recovered != hello.node_public_key.0 {
                    return Err(HandshakeError::SignatureMismatch.into());
                }
                self.state = SessionState::HelloExchanged;
                Reaction::replies(vec![Message::ConnectionAccepted, Message::AddressRequest])
            }

            Message::ConnectionAccepted => {
                self.state = SessionState::Active;
                Reaction::replies(Vec::new())
            }

            Message::ConnectionRejected(rejected) => Reaction::close(CloseReason::Rejected {
                reason: rejected.reason_string.clone(),
            }),

            Message::AddressRequest => Reaction::replies(vec![Message::Address(AddressMessage {
                addresses: Vec::new(),
            })]),

            Message::Address(_) => Reaction::replies(vec![
                Message::TimeRequest(TimeRequestMessage {
                    request_sent_time: unix_micros(),
                }),
                Message::FetchBlockchainItemIds(FetchBlockchainItemIdsMessage {
                    item_type: MSG_BLOCK,
                    blockchain_synopsis: vec![self.config.synopsis_head],
                }),
            ]),

            Message::TimeRequest(request) => {
                Reaction::replies(vec![Message::TimeReply(TimeReplyMessage {
                    request_sent_time: request.request_sent_time,
                    request_received_time: unix_micros(),
                    reply_transmitted_time: unix_micros(),
                })])
            }

            Message::ItemIdsInventory(inventory) => {
                match inventory.item_hashes_available.first() {
                    None => Reaction::replies(Vec::new()),
                    Some(first) if inventory.item_type == MSG_BLOCK => {
                        self.fetch_target = Some(*first);
                        Reaction::replies(vec![Message::FetchItems(FetchItemsMessage {
                            item_type: MSG_BLOCK,
                            items_to_fetch: vec![*first],
                        })])
                    }
                    Some(first) => Reaction::replies(vec![Message::FetchItems(
                        FetchItemsMessage {
                            item_type: MSG_TRX,
                            items_to_fetch: vec![*first],
                        },
                    )]),
                }
            }

            Message::BlockchainItemIdsInventory(inventory) => {
                match inventory.item_hashes_available.last() {
                    Some(last) if self.fetch_target != Some(*last) => {
                        let reaction =
                            Reaction::replies(vec![Message::FetchItems(FetchItemsMessage {
                                item_type: MSG_BLOCK,
                                items_to_fetch: inventory.item_hashes_available.clone(),
                            })]);
                        self.fetch_target = Some(*last);
                        reaction
                    }
                    // the tail matched the last request: nothing new to sync
                    _ => Reaction::replies(Vec::new()),
                }
            }

            Message::FetchBlockchainItemIds(_) => Reaction::replies(vec![
                Message::BlockchainItemIdsInventory(BlockchainItemIdsInventoryMessage {
                    total_remaining_item_count: 0,
                    item_type: MSG_BLOCK,
                    item_hashes_available: Vec::new(),
                }),
            ]),

            Message::Block(block) => {
                if Some(block.block_id) == self.fetch_target {
                    Reaction::replies(vec![Message::FetchBlockchainItemIds(
                        FetchBlockchainItemIdsMessage {
                            item_type: MSG_BLOCK,
                            blockchain_synopsis: vec![block.block_id],
                        },
                    )])
                } else {
                    Reaction::replies(Vec::new())
                }
            }

            Message::ClosingConnection(closing) => Reaction::close(CloseReason::PeerClosing {
                reason: closing.reason_for_closing.clone(),
            }),

            // inbound fetches, transactions and probes carry no action for
            // a leaf client; they are logged upstream and dropped here
            Message::Trx(_)
            | Message::FetchItems(_)
            | Message::ItemNotAvailable(_)
            | Message::TimeReply(_)
            | Message::Unknown { .. } => Reaction::replies(Vec::new()),
        };

        Ok(reaction)
    }

    /// Until the hello exchange completes, only the handshake replies (or
    /// an orderly goodbye) are legal inbound traffic.
    fn check_state(&self, msg: &Message) -> Result<(), Error> {
        if self.state == SessionState::HelloSent
            && !matches!(
                msg,
                Message::Hello(_)
                    | Message::ConnectionRejected(_)
                    | Message::ClosingConnection(_)
                    | Message::Unknown { .. }
            )
        {
            return Err(ProtocolError::UnexpectedMessage {
                state: self.state,
                msg_type: msg.msg_type(),
                name: message_type_name(msg.msg_type()),
            }
            .into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::PeerConfig;
    use crate::messages::{ConnectionRejectedMessage, HelloMessage};
    use graphene_crypto::kex::Ephemeral;
    use graphene_primitives::{PublicKey, Signature, VariantObject};

    fn test_config() -> PeerConfig {
        PeerConfig::new(
            "4018d7844c78f6a6c41c6a552b898022310fc5dec06da467ee7905a8dad512c8"
                .parse()
                .unwrap(),
            "027459d691393208e653d28b5592dc429de6f1dc".parse().unwrap(),
        )
    }

    fn handshaken_pair() -> (Peer, Ephemeral, SharedSecret) {
        let local = Ephemeral::generate();
        let remote = Ephemeral::generate();
        let secret = local.agree(&remote.public_bytes()).unwrap();
        (Peer::new(test_config(), secret), remote, secret)
    }

    fn remote_hello(peer_key: &Ephemeral, secret: &SharedSecret) -> HelloMessage {
        HelloMessage {
            user_agent: "test peer".to_string(),
            core_protocol_version: 106,
            inbound_address: "0.0.0.0".parse().unwrap(),
            inbound_port: 0,
            outbound_port: 0,
            node_public_key: PublicKey(peer_key.public_bytes()),
            signed_shared_secret: Signature(peer_key.sign_shared_secret(secret)),
            chain_id: test_config().chain_id,
            user_data: VariantObject::new(),
        }
    }

    fn item(byte: u8) -> ItemId {
        ItemId::new([byte; 20])
    }

    fn active_peer() -> Peer {
        let (mut peer, remote, secret) = handshaken_pair();
        let hello = remote_hello(&remote, &secret);
        peer.handle(&Message::Hello(hello)).unwrap();
        peer.handle(&Message::ConnectionAccepted).unwrap();
        peer
    }

    #[test]
    fn valid_hello_is_accepted() {
        let (mut peer, remote, secret) = handshaken_pair();
        let hello = remote_hello(&remote, &secret);

        let reaction = peer.handle(&Message::Hello(hello)).unwrap();
        assert_eq!(
            reaction.replies,
            vec![Message::ConnectionAccepted, Message::AddressRequest]
        );
        assert_eq!(peer.state(), SessionState::HelloExchanged);
    }

    #[test]
    fn forged_hello_is_fatal() {
        let (mut peer, remote, secret) = handshaken_pair();
        let mut hello = remote_hello(&remote, &secret);
        // claim a key the signature cannot recover to
        hello.node_public_key = PublicKey(Ephemeral::generate().public_bytes());

        let result = peer.handle(&Message::Hello(hello));
        assert!(matches!(
            result,
            Err(Error::Handshake(HandshakeError::SignatureMismatch))
        ));
        assert_eq!(peer.state(), SessionState::HelloSent);
    }

    #[test]
    fn wrong_chain_is_fatal() {
        let (mut peer, remote, secret) = handshaken_pair();
        let mut hello = remote_hello(&remote, &secret);
        hello.chain_id = graphene_crypto::hash::sha256(b"other chain");

        assert!(matches!(
            peer.handle(&Message::Hello(hello)),
            Err(Error::Handshake(HandshakeError::ChainIdMismatch { .. }))
        ));
    }

    #[test]
    fn early_inventory_is_a_protocol_error() {
        let (mut peer, _, _) = handshaken_pair();
        let msg = Message::ItemIdsInventory(crate::messages::ItemIdsInventoryMessage {
            item_type: MSG_BLOCK,
            item_hashes_available: vec![item(1)],
        });
        assert!(matches!(
            peer.handle(&msg),
            Err(Error::Protocol(ProtocolError::UnexpectedMessage { .. }))
        ));
    }

    #[test]
    fn rejection_closes_the_session() {
        let (mut peer, _, _) = handshaken_pair();
        let reaction = peer
            .handle(&Message::ConnectionRejected(ConnectionRejectedMessage {
                user_agent: "node".to_string(),
                core_protocol_version: 106,
                remote_endpoint: "10.0.0.1:1776".parse().unwrap(),
                reason_code: 1,
                reason_string: "not accepting connections".to_string(),
            }))
            .unwrap();
        assert!(matches!(reaction.flow, ControlFlow::Break(CloseReason::Rejected { .. })));
    }

    #[test]
    fn address_reply_starts_time_sync_and_block_sync() {
        let mut peer = active_peer();
        let reaction = peer
            .handle(&Message::Address(AddressMessage { addresses: vec![] }))
            .unwrap();
        assert_eq!(reaction.replies.len(), 2);
        assert!(matches!(reaction.replies[0], Message::TimeRequest(_)));
        match &reaction.replies[1] {
            Message::FetchBlockchainItemIds(m) => {
                assert_eq!(m.item_type, MSG_BLOCK);
                assert_eq!(m.blockchain_synopsis, vec![test_config().synopsis_head]);
            }
            other => panic!("unexpected reply: {other:?}"),
        }
    }

    #[test]
    fn block_inventory_updates_fetch_target() {
        let mut peer = active_peer();
        let reaction = peer
            .handle(&Message::ItemIdsInventory(
                crate::messages::ItemIdsInventoryMessage {
                    item_type: MSG_BLOCK,
                    item_hashes_available: vec![item(7), item(8)],
                },
            ))
            .unwrap();
        match &reaction.replies[..] {
            [Message::FetchItems(m)] => {
                assert_eq!(m.item_type, MSG_BLOCK);
                assert_eq!(m.items_to_fetch, vec![item(7)]);
            }
            other => panic!("unexpected replies: {other:?}"),
        }
        assert_eq!(peer.fetch_target, Some(item(7)));
    }

    #[test]
    fn transaction_inventory_does_not_touch_fetch_target() {
        let mut peer = active_peer();
        let reaction = peer
            .handle(&Message::ItemIdsInventory(
                crate::messages::ItemIdsInventoryMessage {
                    item_type: MSG_TRX,
                    item_hashes_available: vec![item(9)],
                },
            ))
            .unwrap();
        match &reaction.replies[..] {
            [Message::FetchItems(m)] => {
                assert_eq!(m.item_type, MSG_TRX);
                assert_eq!(m.items_to_fetch, vec![item(9)]);
            }
            other => panic!("unexpected replies: {other:?}"),
        }
        assert_eq!(peer.fetch_target, None);
    }

    #[test]
    fn empty_inventory_is_a_no_op() {
        let mut peer = active_peer();
        let reaction = peer
            .handle(&Message::ItemIdsInventory(
                crate::messages::ItemIdsInventoryMessage {
                    item_type: MSG_BLOCK,
                    item_hashes_available: vec![],
                },
            ))
            .unwrap();
        assert!(reaction.replies.is_empty());
    }

    #[test]
    fn blockchain_inventory_tail_detection() {
        let mut peer = active_peer();

        // fresh ids: fetch them all and move the target to the tail
        let reaction = peer
            .handle(&Message::BlockchainItemIdsInventory(
                BlockchainItemIdsInventoryMessage {
                    total_remaining_item_count: 0,
                    item_type: MSG_BLOCK,
                    item_hashes_available: vec![item(1), item(2), item(3)],
                },
            ))
            .unwrap();
        match &reaction.replies[..] {
            [Message::FetchItems(m)] => {
                assert_eq!(m.items_to_fetch, vec![item(1), item(2), item(3)]);
            }
            other => panic!("unexpected replies: {other:?}"),
        }
        assert_eq!(peer.fetch_target, Some(item(3)));

        // the same tail again means the chain has no more to offer
        let reaction = peer
            .handle(&Message::BlockchainItemIdsInventory(
                BlockchainItemIdsInventoryMessage {
                    total_remaining_item_count: 0,
                    item_type: MSG_BLOCK,
                    item_hashes_available: vec![item(3)],
                },
            ))
            .unwrap();
        assert!(reaction.replies.is_empty());
        assert_eq!(peer.fetch_target, Some(item(3)));
    }

    #[test]
    fn fetched_block_requests_the_next_batch() {
        let mut peer = active_peer();
        peer.fetch_target = Some(item(5));

        let block = crate::messages::BlockMessage {
            block: graphene_primitives::SignedBlock {
                previous: item(4),
                timestamp: 0,
                witness: graphene_primitives::WitnessId::new(1),
                transaction_merkle_root: item(0),
                extensions: vec![],
                witness_signature: Signature([0; 65]),
                transactions: vec![],
            },
            block_id: item(5),
        };
        let reaction = peer.handle(&Message::Block(block.clone())).unwrap();
        match &reaction.replies[..] {
            [Message::FetchBlockchainItemIds(m)] => {
                assert_eq!(m.blockchain_synopsis, vec![item(5)]);
            }
            other => panic!("unexpected replies: {other:?}"),
        }

        // a block other than the awaited one triggers nothing
        let mut other = block;
        other.block_id = item(6);
        let reaction = peer.handle(&Message::Block(other)).unwrap();
        assert!(reaction.replies.is_empty());
    }

    #[test]
    fn incoming_synopsis_gets_an_empty_inventory() {
        let mut peer = active_peer();
        let reaction = peer
            .handle(&Message::FetchBlockchainItemIds(
                FetchBlockchainItemIdsMessage {
                    item_type: MSG_BLOCK,
                    blockchain_synopsis: vec![item(1)],
                },
            ))
            .unwrap();
        match &reaction.replies[..] {
            [Message::BlockchainItemIdsInventory(m)] => {
                assert_eq!(m.total_remaining_item_count, 0);
                assert!(m.item_hashes_available.is_empty());
            }
            other => panic!("unexpected replies: {other:?}"),
        }
    }

    #[test]
    fn time_request_is_echoed() {
        let mut peer = active_peer();
        let reaction = peer
            .handle(&Message::TimeRequest(TimeRequestMessage {
                request_sent_time: 123_456,
            }))
            .unwrap();
        match &reaction.replies[..] {
            [Message::TimeReply(m)] => {
                assert_eq!(m.request_sent_time, 123_456);
                assert!(m.request_received_time <= m.reply_transmitted_time);
            }
            other => panic!("unexpected replies: {other:?}"),
        }
    }
}
