use crate::DecodeError;

/// FIFO of raw bytes feeding the decoders.
///
/// The receive loop writes decrypted plaintext at the tail while the frame
/// and message decoders consume from the head. Reads past the buffered
/// length fail with [`DecodeError::Underflow`] instead of blocking.
#[derive(Debug, Default, Clone)]
pub struct ByteBuffer {
    data: Vec<u8>,
}

impl ByteBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write(&mut self, bytes: &[u8]) {
        self.data.extend_from_slice(bytes);
    }

    /// Consumes and returns the first `len` bytes.
    pub fn read(&mut self, len: usize) -> Result<Vec<u8>, DecodeError> {
        self.check(len)?;
        Ok(self.data.drain(..len).collect())
    }

    /// Consumes exactly `N` bytes into a fixed array.
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], DecodeError> {
        self.check(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(&self.data[..N]);
        self.data.drain(..N);
        Ok(out)
    }

    /// Returns the first `len` bytes without consuming them.
    pub fn peek(&self, len: usize) -> Result<&[u8], DecodeError> {
        self.check(len)?;
        Ok(&self.data[..len])
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    fn check(&self, needed: usize) -> Result<(), DecodeError> {
        if needed > self.data.len() {
            Err(DecodeError::Underflow {
                needed,
                available: self.data.len(),
            })
        } else {
            Ok(())
        }
    }
}

impl From<&[u8]> for ByteBuffer {
    fn from(bytes: &[u8]) -> Self {
        let mut buf = Self::new();
        buf.write(bytes);
        buf
    }
}

impl From<Vec<u8>> for ByteBuffer {
    fn from(data: Vec<u8>) -> Self {
        Self { data }
    }
}
