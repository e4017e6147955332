bytes_newtype! {
    /// Compressed secp256k1 public key bytes. Only the handshake path
    /// checks these actually lie on the curve.
    pub struct PublicKey([u8; 33]);
}

bytes_newtype! {
    /// Node identifier: 33 opaque bytes shaped like a public key but never
    /// validated as a curve point.
    pub struct NodeId([u8; 33]);
}

bytes_newtype! {
    /// Compact recoverable signature: recovery byte, then r and s.
    pub struct Signature([u8; 65]);
}
