//! Length-prefixed framing over the decrypted byte stream.
//!
//! ```text
//! [ u32 LE payload_length ][ u32 LE message_type ][ payload ][ zero padding ]
//! ```
//!
//! The length field carries the payload length *before* padding; the frame
//! as a whole (header included) is padded with zeros to the 16-byte cipher
//! block, which is what lets the layer below encrypt every frame without a
//! padding scheme of its own.

use byteorder::{ByteOrder, LittleEndian};
use graphene_codec::{ByteBuffer, DecodeError};

pub const HEADER_LEN: usize = 8;

/// Cipher block granularity every frame is padded to.
pub const FRAME_ALIGNMENT: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub payload_len: u32,
    pub msg_type: u32,
}

impl From<&[u8]> for Header {
    fn from(value: &[u8]) -> Self {
        Self {
            payload_len: LittleEndian::read_u32(&value[0..4]),
            msg_type: LittleEndian::read_u32(&value[4..8]),
        }
    }
}

impl From<Header> for [u8; HEADER_LEN] {
    fn from(value: Header) -> Self {
        let mut out = [0u8; HEADER_LEN];
        LittleEndian::write_u32(&mut out[0..4], value.payload_len);
        LittleEndian::write_u32(&mut out[4..8], value.msg_type);
        out
    }
}

/// Zero bytes needed after `payload_len` payload bytes so the whole frame
/// lands on a block boundary.
pub fn pad_len(payload_len: usize) -> usize {
    (FRAME_ALIGNMENT - (HEADER_LEN + payload_len) % FRAME_ALIGNMENT) % FRAME_ALIGNMENT
}

/// Total frame size on the wire for a payload of `payload_len` bytes.
pub fn frame_len(payload_len: usize) -> usize {
    HEADER_LEN + payload_len + pad_len(payload_len)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub msg_type: u32,
    pub payload: Vec<u8>,
}

impl Frame {
    pub fn new(msg_type: u32, payload: Vec<u8>) -> Self {
        Self { msg_type, payload }
    }

    /// Header, payload and zero padding; always a multiple of the cipher
    /// block.
    pub fn to_wire(&self) -> Vec<u8> {
        let header = Header {
            payload_len: self.payload.len() as u32,
            msg_type: self.msg_type,
        };
        let mut out = Vec::with_capacity(frame_len(self.payload.len()));
        out.extend_from_slice(&<[u8; HEADER_LEN]>::from(header));
        out.extend_from_slice(&self.payload);
        out.resize(frame_len(self.payload.len()), 0);
        out
    }
}

/// Accumulates decrypted plaintext and slices complete frames out of it.
#[derive(Debug, Default)]
pub struct FrameBuffer {
    buf: ByteBuffer,
}

impl FrameBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, plaintext: &[u8]) {
        self.buf.write(plaintext);
    }

    pub fn buffered(&self) -> usize {
        self.buf.len()
    }

    /// Takes one frame off the stream if it is fully buffered. The padding
    /// is consumed and dropped; the returned payload is the unpadded one.
    pub fn next_frame(&mut self) -> Result<Option<Frame>, DecodeError> {
        if self.buf.len() < 4 {
            return Ok(None);
        }
        let payload_len = LittleEndian::read_u32(self.buf.peek(4)?) as usize;
        let expected = frame_len(payload_len);
        if self.buf.len() < expected {
            return Ok(None);
        }
        let bytes = self.buf.read(expected)?;
        let header = Header::from(&bytes[..HEADER_LEN]);
        let payload = bytes[HEADER_LEN..HEADER_LEN + payload_len].to_vec();
        Ok(Some(Frame::new(header.msg_type, payload)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn padding_reaches_block_boundary() {
        // payload 7 -> 15 with header, padded to 16
        assert_eq!(pad_len(7), 1);
        assert_eq!(frame_len(7), 16);
        // payload 8 -> already aligned
        assert_eq!(pad_len(8), 0);
        assert_eq!(frame_len(8), 16);
        // payload 9 -> next block
        assert_eq!(pad_len(9), 15);
        assert_eq!(frame_len(9), 32);
        assert_eq!(frame_len(0), 16);

        for payload_len in 0..200 {
            assert_eq!(frame_len(payload_len) % FRAME_ALIGNMENT, 0);
        }
    }

    #[test]
    fn wire_form_keeps_unpadded_length() {
        let frame = Frame::new(5007, vec![0xaa; 7]);
        let wire = frame.to_wire();
        assert_eq!(wire.len(), 16);
        assert_eq!(LittleEndian::read_u32(&wire[0..4]), 7);
        assert_eq!(LittleEndian::read_u32(&wire[4..8]), 5007);
        assert_eq!(&wire[8..15], &[0xaa; 7]);
        assert_eq!(wire[15], 0);
    }

    #[test]
    fn deframing_waits_for_full_frame() {
        let frame = Frame::new(5004, (0u8..24).collect());
        let wire = frame.to_wire();
        assert_eq!(wire.len(), 32);

        let mut buf = FrameBuffer::new();
        buf.push(&wire[..16]);
        assert_eq!(buf.next_frame().unwrap(), None);

        buf.push(&wire[16..]);
        assert_eq!(buf.next_frame().unwrap(), Some(frame));
        assert_eq!(buf.buffered(), 0);
    }

    #[test]
    fn consecutive_frames_in_one_push() {
        let first = Frame::new(5007, Vec::new());
        let second = Frame::new(5009, vec![1, 2, 3]);
        let mut wire = first.to_wire();
        wire.extend(second.to_wire());

        let mut buf = FrameBuffer::new();
        buf.push(&wire);
        assert_eq!(buf.next_frame().unwrap(), Some(first));
        assert_eq!(buf.next_frame().unwrap(), Some(second));
        assert_eq!(buf.next_frame().unwrap(), None);
    }
}
