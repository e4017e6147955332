//! secp256k1 key agreement and compact signatures for the session handshake.
//!
//! The initiator reads the peer's compressed public key, multiplies it by a
//! fresh ephemeral scalar, and hashes the X coordinate of the resulting
//! point with SHA-512. Everything else in the session (AES key, IV, hello
//! signature) is derived from that 64-byte shared secret.

use secp256k1::ecdsa::{RecoverableSignature, RecoveryId};
use secp256k1::{ecdh, Message, PublicKey, SecretKey, SECP256K1};
use thiserror::Error;

use crate::hash::{sha256, Hash};

pub const PUBLIC_KEY_LEN: usize = 33;
pub const SIGNATURE_LEN: usize = 65;

/// SHA-512 of the ECDH point's X coordinate.
pub type SharedSecret = Hash<64>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum KexError {
    #[error("peer bytes are not a valid compressed secp256k1 point")]
    InvalidPublicKey,

    #[error("signature does not recover to a valid public key")]
    InvalidSignature,
}

/// Ephemeral session keypair, generated per connection.
pub struct Ephemeral {
    secret: SecretKey,
    public: PublicKey,
}

impl Ephemeral {
    pub fn generate() -> Self {
        let (secret, public) = SECP256K1.generate_keypair(&mut rand::thread_rng());
        Self { secret, public }
    }

    /// Compressed 33-byte encoding of the public key.
    pub fn public_bytes(&self) -> [u8; PUBLIC_KEY_LEN] {
        self.public.serialize()
    }

    /// ECDH against the peer's compressed key: the shared secret is
    /// SHA-512 of the X coordinate (big-endian) of `secret * peer`.
    pub fn agree(&self, peer: &[u8; PUBLIC_KEY_LEN]) -> Result<SharedSecret, KexError> {
        let peer = PublicKey::from_slice(peer).map_err(|_| KexError::InvalidPublicKey)?;
        let point = ecdh::shared_secret_point(&peer, &self.secret);
        Ok(crate::hash::sha512(&point[..32]))
    }

    /// Graphene compact signature over SHA-256 of the shared secret:
    /// one recovery byte (31 for id 0, 32 for id 1) then r || s.
    pub fn sign_shared_secret(&self, secret: &SharedSecret) -> [u8; SIGNATURE_LEN] {
        let digest = sha256(secret.as_ref());
        let msg = Message::from_digest(*digest);
        let signature = SECP256K1.sign_ecdsa_recoverable(&msg, &self.secret);
        let (recovery, compact) = signature.serialize_compact();
        let mut out = [0u8; SIGNATURE_LEN];
        out[0] = 31 + recovery.to_i32() as u8;
        out[1..].copy_from_slice(&compact);
        out
    }
}

/// Recovers the compressed public key that produced `signature` over
/// `digest`, using the network's recovery-byte convention: 31 selects
/// recovery id 0, anything else selects 1.
pub fn recover_signer(
    digest: &Hash<32>,
    signature: &[u8; SIGNATURE_LEN],
) -> Result<[u8; PUBLIC_KEY_LEN], KexError> {
    let recovery = i32::from(signature[0] != 31);
    let recovery = RecoveryId::from_i32(recovery).map_err(|_| KexError::InvalidSignature)?;
    let signature = RecoverableSignature::from_compact(&signature[1..], recovery)
        .map_err(|_| KexError::InvalidSignature)?;
    let msg = Message::from_digest(**digest);
    let key = SECP256K1
        .recover_ecdsa(&msg, &signature)
        .map_err(|_| KexError::InvalidSignature)?;
    Ok(key.serialize())
}

/// Symmetric key material negotiated by the handshake.
///
/// Both directions share one key and one starting IV: the AES key is SHA-256
/// of the shared secret, and the IV is the little-endian CityHash128 of the
/// shared secret with its two 64-bit halves swapped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionKey {
    pub aes_key: [u8; 32],
    pub iv: [u8; 16],
}

impl SessionKey {
    pub fn derive(secret: &SharedSecret) -> Self {
        let aes_key = *sha256(secret.as_ref());
        let fingerprint = cityhash_rs::cityhash_110_128(secret.as_ref()).to_le_bytes();
        let mut iv = [0u8; 16];
        iv[..8].copy_from_slice(&fingerprint[8..]);
        iv[8..].copy_from_slice(&fingerprint[..8]);
        Self { aes_key, iv }
    }

    pub fn encryptor(&self) -> crate::cbc::EncryptState {
        crate::cbc::EncryptState::new(&self.aes_key, &self.iv)
    }

    pub fn decryptor(&self) -> crate::cbc::DecryptState {
        crate::cbc::DecryptState::new(&self.aes_key, &self.iv)
    }
}
