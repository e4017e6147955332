//! The encrypted channel: ECDH key agreement on a fresh TCP stream, then
//! two independent AES-CBC states carrying the framed protocol.
//!
//! Wire handshake, initiator side: read the peer's 33-byte compressed key,
//! send ours, and derive everything else from the shared point. No version
//! negotiation happens at this layer; the hello exchange above takes care
//! of that.

use graphene_codec::DecodeError;
use graphene_crypto::cbc::{CipherError, DecryptState, EncryptState};
use graphene_crypto::kex::{Ephemeral, KexError, SessionKey, SharedSecret, PUBLIC_KEY_LEN};
use graphene_primitives::ChainId;
use thiserror::Error;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tracing::trace;

use crate::framing::{Frame, FrameBuffer};

const RECV_BUFFER_LEN: usize = 64 * 1024;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("bearer I/O error")]
    Io(#[source] std::io::Error),

    #[error("peer closed the connection")]
    PeerClosed,

    #[error("ciphertext stream ended in the middle of a cipher block")]
    TruncatedCiphertext,

    #[error("cipher alignment violated")]
    Cipher(#[from] CipherError),

    #[error("malformed frame in decrypted stream")]
    Frame(#[source] DecodeError),
}

#[derive(Debug, Error)]
pub enum HandshakeError {
    #[error("bearer I/O error during handshake")]
    Io(#[from] std::io::Error),

    #[error("key agreement failed")]
    Kex(#[from] KexError),

    #[error("handshake timed out")]
    Timeout,

    #[error("peer hello signature does not recover to its declared key")]
    SignatureMismatch,

    #[error("peer speaks chain {theirs}, expected {ours}")]
    ChainIdMismatch { ours: ChainId, theirs: ChainId },
}

/// Negotiated session, split into its two directions.
pub struct SecureChannel {
    pub reader: SecureReader,
    pub writer: SecureWriter,
    pub shared_secret: SharedSecret,
    pub local_key: Ephemeral,
}

impl SecureChannel {
    /// Runs the initiator half of the key exchange on a connected stream.
    pub async fn initiate(stream: TcpStream) -> Result<Self, HandshakeError> {
        let (mut read_half, mut write_half) = stream.into_split();

        let mut peer_key = [0u8; PUBLIC_KEY_LEN];
        read_half.read_exact(&mut peer_key).await?;

        let local_key = Ephemeral::generate();
        let shared_secret = local_key.agree(&peer_key)?;
        write_half.write_all(&local_key.public_bytes()).await?;
        write_half.flush().await?;

        let session = SessionKey::derive(&shared_secret);
        trace!(peer_key = hex::encode(peer_key), "session keys negotiated");

        Ok(Self {
            reader: SecureReader::new(read_half, session.decryptor()),
            writer: SecureWriter::new(write_half, session.encryptor()),
            shared_secret,
            local_key,
        })
    }
}

/// Sole reader of the socket: accumulates ciphertext, decrypts every
/// complete block prefix, and slices frames out of the plaintext.
pub struct SecureReader {
    inner: OwnedReadHalf,
    cipher: DecryptState,
    /// Ciphertext bytes short of a block boundary, waiting for their tail.
    pending: Vec<u8>,
    frames: FrameBuffer,
}

impl SecureReader {
    fn new(inner: OwnedReadHalf, cipher: DecryptState) -> Self {
        Self {
            inner,
            cipher,
            pending: Vec::new(),
            frames: FrameBuffer::new(),
        }
    }

    /// Waits for the next complete frame on the stream.
    pub async fn read_frame(&mut self) -> Result<Frame, TransportError> {
        loop {
            if let Some(frame) = self.frames.next_frame().map_err(TransportError::Frame)? {
                return Ok(frame);
            }

            let mut chunk = vec![0u8; RECV_BUFFER_LEN];
            let n = self
                .inner
                .read(&mut chunk)
                .await
                .map_err(TransportError::Io)?;
            if n == 0 {
                if self.pending.is_empty() {
                    return Err(TransportError::PeerClosed);
                }
                return Err(TransportError::TruncatedCiphertext);
            }
            self.pending.extend_from_slice(&chunk[..n]);

            let aligned = self.pending.len() - self.pending.len() % graphene_crypto::cbc::BLOCK_LEN;
            if aligned == 0 {
                continue;
            }
            let mut block: Vec<u8> = self.pending.drain(..aligned).collect();
            self.cipher.process(&mut block)?;
            trace!(len = block.len(), "decrypted inbound chunk");
            self.frames.push(&block);
        }
    }
}

/// Sole writer of the socket: one encryption per already-padded frame, so
/// a frame's ciphertext hits the wire contiguously.
pub struct SecureWriter {
    inner: OwnedWriteHalf,
    cipher: EncryptState,
}

impl SecureWriter {
    fn new(inner: OwnedWriteHalf, cipher: EncryptState) -> Self {
        Self { inner, cipher }
    }

    pub async fn write_frame(&mut self, frame: &Frame) -> Result<(), TransportError> {
        let mut wire = frame.to_wire();
        self.cipher.process(&mut wire)?;
        self.inner
            .write_all(&wire)
            .await
            .map_err(TransportError::Io)?;
        self.inner.flush().await.map_err(TransportError::Io)?;
        trace!(len = wire.len(), "encrypted frame written");
        Ok(())
    }
}
