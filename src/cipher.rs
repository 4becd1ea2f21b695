//! The block cipher capability XTS is built on.
//!
//! XTS only needs a keyed permutation over 16 byte blocks, so anything
//! implementing [`BlockCipher`] can be plugged into [`crate::Xts`]. The
//! AES variants from the `aes` crate are wired up here.

use aes::{
    cipher::{consts::U16, generic_array::GenericArray, BlockDecrypt, BlockEncrypt, KeyInit},
    Aes128, Aes192, Aes256,
};

pub use aes::cipher::InvalidLength;

/// Always 128 bits, XTS is only defined for 128 bit block ciphers
pub const BLOCK_SIZE: usize = 16;

/// A single cipher block
pub type Block = GenericArray<u8, U16>;

/// A keyed 128 bit block cipher.
pub trait BlockCipher: Sized {
    /// Runs the key schedule, failing if the cipher
    /// doesn't accept a key of this length.
    fn from_key(key: &[u8]) -> Result<Self, InvalidLength>;
    fn encrypt_block(&self, block: &mut Block);
    fn decrypt_block(&self, block: &mut Block);
}

macro_rules! impl_block_cipher {
    ($($ty:ty),+) => {
        $(
            impl BlockCipher for $ty {
                fn from_key(key: &[u8]) -> Result<Self, InvalidLength> {
                    <$ty as KeyInit>::new_from_slice(key)
                }

                fn encrypt_block(&self, block: &mut Block) {
                    BlockEncrypt::encrypt_block(self, block)
                }

                fn decrypt_block(&self, block: &mut Block) {
                    BlockDecrypt::decrypt_block(self, block)
                }
            }
        )+
    };
}

impl_block_cipher!(Aes128, Aes192, Aes256);

/// AES with the key size picked from the key itself:
/// 16, 24 or 32 bytes select AES-128, AES-192 or AES-256.
#[derive(Clone, Debug)]
pub enum Aes {
    Aes128(Aes128),
    Aes192(Aes192),
    Aes256(Aes256),
}

impl BlockCipher for Aes {
    fn from_key(key: &[u8]) -> Result<Self, InvalidLength> {
        match key.len() {
            16 => Aes128::from_key(key).map(Self::Aes128),
            24 => Aes192::from_key(key).map(Self::Aes192),
            32 => Aes256::from_key(key).map(Self::Aes256),
            _ => Err(InvalidLength),
        }
    }

    fn encrypt_block(&self, block: &mut Block) {
        match self {
            Self::Aes128(aes) => BlockCipher::encrypt_block(aes, block),
            Self::Aes192(aes) => BlockCipher::encrypt_block(aes, block),
            Self::Aes256(aes) => BlockCipher::encrypt_block(aes, block),
        }
    }

    fn decrypt_block(&self, block: &mut Block) {
        match self {
            Self::Aes128(aes) => BlockCipher::decrypt_block(aes, block),
            Self::Aes192(aes) => BlockCipher::decrypt_block(aes, block),
            Self::Aes256(aes) => BlockCipher::decrypt_block(aes, block),
        }
    }
}
