use core::fmt;
use core::ops::Deref;

use crate::MAX_PAYLOAD_LEN;

/// A payload dequeued from the RX FIFO
#[derive(Clone, Copy)]
pub struct Payload {
    data: [u8; MAX_PAYLOAD_LEN],
    len: usize,
}

impl Payload {
    /// Copy `source`, truncated to 32 bytes
    pub fn new(source: &[u8]) -> Self {
        let mut data = [0; MAX_PAYLOAD_LEN];
        let len = source.len().min(MAX_PAYLOAD_LEN);
        data[..len].copy_from_slice(&source[..len]);
        Payload { data, len }
    }

    /// Number of bytes received
    pub fn len(&self) -> usize {
        self.len
    }

    /// Was nothing received?
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl Deref for Payload {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.data[..self.len]
    }
}

impl AsRef<[u8]> for Payload {
    fn as_ref(&self) -> &[u8] {
        self
    }
}

impl PartialEq for Payload {
    fn eq(&self, other: &Self) -> bool {
        self.as_ref() == other.as_ref()
    }
}

impl fmt::Debug for Payload {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Payload({:02X?})", self.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::Payload;

    #[test]
    fn truncates_to_fifo_slot() {
        let payload = Payload::new(&[0xAB; 40]);
        assert_eq!(payload.len(), 32);
        assert!(payload.iter().all(|b| *b == 0xAB));
    }

    #[test]
    fn compares_by_content() {
        assert_eq!(Payload::new(&[1, 2, 3]), Payload::new(&[1, 2, 3]));
        assert_ne!(Payload::new(&[1, 2, 3]), Payload::new(&[1, 2]));
        assert!(Payload::new(&[]).is_empty());
    }
}
