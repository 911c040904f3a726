//! ARC4 stream cipher implementation
//!
//! ARC4 is the alleged RC4 keystream generator. The handshake seeds it on
//! both sides with the big-endian bytes of the negotiated Diffie-Hellman
//! shared secret, after which each side XORs its traffic with the keystream.
//! Long deprecated for new designs; kept because the legacy wire format
//! requires it.

use std::fmt;

/// Size of the ARC4 permutation state
const STATE_SIZE: usize = 256;

/// ARC4 cipher state
#[derive(Clone)]
pub struct Arc4 {
    /// Byte permutation
    state: [u8; STATE_SIZE],
    /// Output index
    i: u8,
    /// Swap index
    j: u8,
}

impl Arc4 {
    /// Create a new cipher keyed with the given bytes.
    ///
    /// An empty key is treated as the single zero byte so the scheduler
    /// always has material to cycle over.
    pub fn new(key: &[u8]) -> Self {
        let key = if key.is_empty() { &[0u8][..] } else { key };

        let mut state = [0u8; STATE_SIZE];
        for (index, slot) in state.iter_mut().enumerate() {
            *slot = index as u8;
        }

        // Key-scheduling pass
        let mut j = 0u8;
        for index in 0..STATE_SIZE {
            j = j
                .wrapping_add(state[index])
                .wrapping_add(key[index % key.len()]);
            state.swap(index, j as usize);
        }

        Self { state, i: 0, j: 0 }
    }

    /// Get the next keystream byte
    #[inline]
    pub fn next_byte(&mut self) -> u8 {
        self.i = self.i.wrapping_add(1);
        self.j = self.j.wrapping_add(self.state[self.i as usize]);
        self.state.swap(self.i as usize, self.j as usize);

        let index = self.state[self.i as usize].wrapping_add(self.state[self.j as usize]);
        self.state[index as usize]
    }

    /// XOR the keystream over a buffer in place
    pub fn apply(&mut self, data: &mut [u8]) {
        for byte in data {
            *byte ^= self.next_byte();
        }
    }

    /// XOR the keystream over a buffer, returning the result
    pub fn process(&mut self, data: &[u8]) -> Vec<u8> {
        data.iter().map(|&byte| byte ^ self.next_byte()).collect()
    }
}

impl fmt::Debug for Arc4 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Arc4")
            .field("i", &self.i)
            .field("j", &self.j)
            // Don't log the permutation state
            .finish()
    }
}
