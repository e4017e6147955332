//! Cryptographic building blocks for the Graphene P2P session layer:
//! digest helpers, secp256k1 key agreement and compact signatures, and the
//! stateful AES-CBC streams that carry the framed protocol.

pub mod cbc;
pub mod hash;
pub mod kex;
