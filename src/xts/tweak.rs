//! Per block tweaks, as defined by IEEE P1619.
//!
//! The tweak of a sector's first block is the sector number encrypted
//! with the tweak key. Every following block uses the previous tweak
//! multiplied by α in GF(2^128).

use crate::cipher::{Block, BlockCipher, BLOCK_SIZE};

/// Low byte of the reduction polynomial x^128 + x^7 + x^2 + x + 1
const GF_128_FDBK: u64 = 0x87;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tweak {
    bytes: [u8; BLOCK_SIZE],
}

impl From<[u8; BLOCK_SIZE]> for Tweak {
    fn from(bytes: [u8; BLOCK_SIZE]) -> Self {
        Self { bytes }
    }
}

impl Tweak {
    /// Tweak for the first block of `sector`.
    pub fn initial<C: BlockCipher>(tweak_cipher: &C, sector: u64) -> Self {
        let mut block = Block::default();
        block[..8].copy_from_slice(&sector.to_le_bytes());
        tweak_cipher.encrypt_block(&mut block);
        let mut bytes = [0; BLOCK_SIZE];
        bytes.copy_from_slice(&block);
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8; BLOCK_SIZE] {
        &self.bytes
    }

    /// Moves on to the tweak of the next block.
    pub fn advance(&mut self) {
        self.bytes = mul_alpha(&self.bytes);
    }

    /// The tweak of the next block, leaving this one as is.
    pub fn next(&self) -> Self {
        Self {
            bytes: mul_alpha(&self.bytes),
        }
    }

    /// XORs the tweak into `data`, which must not be longer than a block.
    pub fn xor_into(&self, data: &mut [u8]) {
        for (dst, src) in data.iter_mut().zip(self.bytes.iter()) {
            *dst ^= src;
        }
    }
}

/// Multiplies `value` by α, the bytes being a little endian
/// polynomial. The reduction is applied without branching on
/// the carry.
pub fn mul_alpha(value: &[u8; BLOCK_SIZE]) -> [u8; BLOCK_SIZE] {
    let mut lo = [0; 8];
    let mut hi = [0; 8];
    lo.copy_from_slice(&value[..8]);
    hi.copy_from_slice(&value[8..]);
    let lo = u64::from_le_bytes(lo);
    let hi = u64::from_le_bytes(hi);

    let carry = hi >> 63;
    let hi = (hi << 1) | (lo >> 63);
    let lo = (lo << 1) ^ (carry.wrapping_neg() & GF_128_FDBK);

    let mut out = [0; BLOCK_SIZE];
    out[..8].copy_from_slice(&lo.to_le_bytes());
    out[8..].copy_from_slice(&hi.to_le_bytes());
    out
}
