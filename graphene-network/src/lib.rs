//! Client networking stack for the Graphene P2P protocol
//!
//! One TCP bearer, one ECDH-negotiated AES-CBC session on top of it, and a
//! reader task that slices frames out of the decrypted stream and feeds the
//! peer state machine driving address exchange, time sync and inventory
//! fetching.

pub mod connection;
pub mod framing;
pub mod messages;
pub mod peer;
pub mod secure;

pub use connection::{Error, MessageWriter, PeerClient, PeerConfig};
pub use peer::{CloseReason, Peer, SessionState};
