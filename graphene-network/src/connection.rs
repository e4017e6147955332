//! Connection facade: dials a node, runs the encrypted handshake, sends
//! the initial hello and keeps the session alive until either side closes.
//!
//! Exactly one task reads the socket (the session loop) and every write
//! funnels through one mutex-guarded encrypting writer; a torn CBC write
//! would desynchronize the cipher stream for the peer, so the discipline
//! is load-bearing, not stylistic.

use std::ops::ControlFlow;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use graphene_codec::{DecodeError, EncodeError};
use graphene_crypto::hash::Hash;
use graphene_primitives::{
    ChainId, IpAddress, ItemId, PublicKey, Signature, Variant, VariantObject,
};
use thiserror::Error;
use tokio::net::{TcpStream, ToSocketAddrs};
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, info, trace, warn};

use crate::messages::{message_type_name, HelloMessage, Message, TimeRequestMessage};
use crate::peer::{Peer, ProtocolError};
use crate::secure::{HandshakeError, SecureChannel, SecureReader, TransportError};

pub const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(15);

pub const DEFAULT_TIME_SYNC_INTERVAL_SEC: u64 = 20;

/// Protocol version sent in the hello message.
pub const CORE_PROTOCOL_VERSION: u32 = 106;

/// Chain id of the BitShares main network.
pub const BITSHARES_MAINNET_CHAIN_ID: ChainId = Hash::new([
    0x40, 0x18, 0xd7, 0x84, 0x4c, 0x78, 0xf6, 0xa6, 0xc4, 0x1c, 0x6a, 0x55, 0x2b, 0x89, 0x80,
    0x22, 0x31, 0x0f, 0xc5, 0xde, 0xc0, 0x6d, 0xa4, 0x67, 0xee, 0x79, 0x05, 0xa8, 0xda, 0xd5,
    0x12, 0xc8,
]);

#[derive(Debug, Error)]
pub enum Error {
    #[error("error connecting bearer")]
    Connect(#[source] std::io::Error),

    #[error("handshake failed")]
    Handshake(#[from] HandshakeError),

    #[error("transport failure")]
    Transport(#[from] TransportError),

    #[error("failed to decode inbound message")]
    Decode(#[from] DecodeError),

    #[error("failed to encode outbound message")]
    Encode(#[from] EncodeError),

    #[error("protocol violation")]
    Protocol(#[from] ProtocolError),

    #[error("session task failed")]
    TaskFailure,
}

/// Everything the initiator says about itself, plus the sync starting
/// point. The defaults describe a firewalled leaf client that accepts no
/// inbound connections.
#[derive(Debug, Clone)]
pub struct PeerConfig {
    pub chain_id: ChainId,
    pub core_protocol_version: u32,
    pub user_agent: String,
    pub user_data: VariantObject,
    pub inbound_address: IpAddress,
    pub inbound_port: u16,
    pub outbound_port: u16,
    /// Head of the blockchain synopsis sent when sync starts.
    pub synopsis_head: ItemId,
    pub time_sync_interval: Duration,
}

impl PeerConfig {
    pub fn new(chain_id: ChainId, synopsis_head: ItemId) -> Self {
        Self {
            chain_id,
            core_protocol_version: CORE_PROTOCOL_VERSION,
            user_agent: "Haruka Mock Client".to_string(),
            user_data: VariantObject::from(vec![(
                "platform".to_string(),
                Variant::from("unknown"),
            )]),
            inbound_address: IpAddress::UNSPECIFIED,
            inbound_port: 0,
            outbound_port: 0,
            synopsis_head,
            time_sync_interval: Duration::from_secs(DEFAULT_TIME_SYNC_INTERVAL_SEC),
        }
    }
}

/// Serialized send path shared by the session loop and the time-sync
/// heartbeat.
pub struct MessageWriter {
    inner: tokio::sync::Mutex<crate::secure::SecureWriter>,
}

impl MessageWriter {
    fn new(writer: crate::secure::SecureWriter) -> Self {
        Self {
            inner: tokio::sync::Mutex::new(writer),
        }
    }

    pub async fn send(&self, msg: &Message) -> Result<(), Error> {
        let frame = msg.to_frame()?;
        info!(
            id = frame.msg_type,
            name = message_type_name(frame.msg_type),
            summary = %msg.summary(),
            "send"
        );
        trace!(data = hex::encode(&frame.payload), "outbound payload");
        self.inner.lock().await.write_frame(&frame).await?;
        Ok(())
    }
}

/// A connected, hello-sent session with its background tasks.
pub struct PeerClient {
    writer: Arc<MessageWriter>,
    session: JoinHandle<Result<(), Error>>,
    time_sync: JoinHandle<Result<(), Error>>,
}

impl PeerClient {
    /// Dials the node, completes the key exchange within
    /// [`HANDSHAKE_TIMEOUT`], sends the hello and spawns the session loop.
    pub async fn connect(addr: impl ToSocketAddrs, config: PeerConfig) -> Result<Self, Error> {
        let stream = TcpStream::connect(addr).await.map_err(Error::Connect)?;
        stream.set_nodelay(true).map_err(Error::Connect)?;
        let keepalive = socket2::TcpKeepalive::new().with_time(Duration::from_secs(30));
        socket2::SockRef::from(&stream)
            .set_tcp_keepalive(&keepalive)
            .map_err(Error::Connect)?;

        let channel = timeout(HANDSHAKE_TIMEOUT, SecureChannel::initiate(stream))
            .await
            .map_err(|_| HandshakeError::Timeout)??;
        debug!("secure channel established");

        let hello = HelloMessage {
            user_agent: config.user_agent.clone(),
            core_protocol_version: config.core_protocol_version,
            inbound_address: config.inbound_address,
            inbound_port: config.inbound_port,
            outbound_port: config.outbound_port,
            node_public_key: PublicKey(channel.local_key.public_bytes()),
            signed_shared_secret: Signature(
                channel.local_key.sign_shared_secret(&channel.shared_secret),
            ),
            chain_id: config.chain_id,
            user_data: config.user_data.clone(),
        };

        let writer = Arc::new(MessageWriter::new(channel.writer));
        writer.send(&Message::Hello(hello)).await?;

        let interval = config.time_sync_interval;
        let peer = Peer::new(config, channel.shared_secret);
        let session = tokio::spawn(run_session(channel.reader, peer, writer.clone()));
        let time_sync = tokio::spawn(run_time_sync(writer.clone(), interval));

        Ok(Self {
            writer,
            session,
            time_sync,
        })
    }

    /// Shared handle to the serialized send path.
    pub fn writer(&self) -> Arc<MessageWriter> {
        self.writer.clone()
    }

    /// Runs until the session ends; an orderly close on either side is not
    /// an error.
    pub async fn run(self) -> Result<(), Error> {
        let result = self.session.await;
        self.time_sync.abort();
        result.map_err(|_| Error::TaskFailure)?
    }

    pub fn abort(self) {
        self.session.abort();
        self.time_sync.abort();
    }
}

async fn run_session(
    mut reader: SecureReader,
    mut peer: Peer,
    writer: Arc<MessageWriter>,
) -> Result<(), Error> {
    loop {
        let frame = match reader.read_frame().await {
            Ok(frame) => frame,
            Err(TransportError::PeerClosed) => {
                info!("peer closed the connection");
                peer.set_closed();
                return Ok(());
            }
            Err(err) => {
                peer.set_closed();
                return Err(err.into());
            }
        };

        let msg = Message::decode_frame(&frame)?;
        info!(
            id = frame.msg_type,
            name = message_type_name(frame.msg_type),
            summary = %msg.summary(),
            "recv"
        );
        trace!(data = hex::encode(&frame.payload), "inbound payload");
        if matches!(msg, Message::Unknown { .. }) {
            warn!(id = frame.msg_type, "no action for message, skipping");
        }

        let reaction = peer.handle(&msg)?;
        for reply in &reaction.replies {
            writer.send(reply).await?;
        }
        if let ControlFlow::Break(reason) = reaction.flow {
            info!(%reason, "session over");
            peer.set_closed();
            return Ok(());
        }
    }
}

/// Heartbeat reusing the time-sync messages; dead sessions surface as
/// write failures here even when the peer never speaks.
async fn run_time_sync(writer: Arc<MessageWriter>, interval: Duration) -> Result<(), Error> {
    let mut ticker = tokio::time::interval(interval);
    ticker.tick().await;
    loop {
        ticker.tick().await;
        writer
            .send(&Message::TimeRequest(TimeRequestMessage {
                request_sent_time: unix_micros(),
            }))
            .await?;
    }
}

/// Current UTC time in microseconds, as the time-sync messages carry it.
pub(crate) fn unix_micros() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_micros() as u64
}
