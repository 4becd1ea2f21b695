//! XTS mode as specified by IEEE P1619, with ciphertext stealing for
//! sectors that aren't a multiple of the block size.
//!
//! A sector is encrypted block by block as `E_K1(P ^ T) ^ T`, where
//! the tweak `T` starts out as the encrypted sector number and is
//! multiplied by α for every block. A trailing partial block borrows
//! the tail of the previous ciphertext block, so the output is always
//! exactly as long as the input.

mod tweak;

pub use tweak::{mul_alpha, Tweak};

use crate::cipher::{Block, BlockCipher, BLOCK_SIZE};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum XtsError {
    #[error("Invalid XTS key length {0}: must be twice a key length the block cipher accepts")]
    InvalidKeyLength(usize),
    #[error("Invalid input length {0}: at least one full block of 16 bytes is required")]
    InvalidInputLength(usize),
    #[error("Destination buffer too small: required {required} bytes, got {actual}")]
    BufferTooSmall { required: usize, actual: usize },
    #[error("Run of {count} sectors starting at {first_sector} goes past the last sector number")]
    SectorOutOfRange { first_sector: u64, count: usize },
}

type Result<T> = std::result::Result<T, XtsError>;

/// The two keyed cipher instances making up an XTS key.
/// Immutable once built, so a single `Xts` can serve
/// any number of sectors concurrently.
#[derive(Clone, Debug)]
pub struct Xts<C: BlockCipher> {
    data_cipher: C,
    tweak_cipher: C,
}

fn check_lengths(dst: usize, src: usize) -> Result<()> {
    if src < BLOCK_SIZE {
        return Err(XtsError::InvalidInputLength(src));
    }
    if dst < src {
        return Err(XtsError::BufferTooSmall {
            required: src,
            actual: dst,
        });
    }
    Ok(())
}

impl<C: BlockCipher> Xts<C> {
    /// Splits `key` in half: the first half keys the data
    /// cipher, the second half the tweak cipher.
    pub fn new(key: &[u8]) -> Result<Self> {
        if key.len() % 2 != 0 {
            return Err(XtsError::InvalidKeyLength(key.len()));
        }
        let (data_key, tweak_key) = key.split_at(key.len() / 2);
        let data_cipher =
            C::from_key(data_key).map_err(|_| XtsError::InvalidKeyLength(key.len()))?;
        let tweak_cipher =
            C::from_key(tweak_key).map_err(|_| XtsError::InvalidKeyLength(key.len()))?;
        Ok(Self::from_ciphers(data_cipher, tweak_cipher))
    }

    pub fn from_ciphers(data_cipher: C, tweak_cipher: C) -> Self {
        Self {
            data_cipher,
            tweak_cipher,
        }
    }

    fn encrypt_block(&self, block: &mut [u8], tweak: &Tweak) {
        tweak.xor_into(block);
        self.data_cipher.encrypt_block(Block::from_mut_slice(block));
        tweak.xor_into(block);
    }

    fn decrypt_block(&self, block: &mut [u8], tweak: &Tweak) {
        tweak.xor_into(block);
        self.data_cipher.decrypt_block(Block::from_mut_slice(block));
        tweak.xor_into(block);
    }

    /// Encrypts `src` as sector number `sector` into the first
    /// `src.len()` bytes of `dst`. The rest of `dst` isn't touched.
    pub fn encrypt(&self, dst: &mut [u8], src: &[u8], sector: u64) -> Result<()> {
        check_lengths(dst.len(), src.len())?;
        let out = &mut dst[..src.len()];
        out.copy_from_slice(src);
        self.encrypt_in_place(out, sector)
    }

    /// Decrypts `src` as sector number `sector` into the first
    /// `src.len()` bytes of `dst`. The rest of `dst` isn't touched.
    pub fn decrypt(&self, dst: &mut [u8], src: &[u8], sector: u64) -> Result<()> {
        check_lengths(dst.len(), src.len())?;
        let out = &mut dst[..src.len()];
        out.copy_from_slice(src);
        self.decrypt_in_place(out, sector)
    }

    pub fn encrypt_in_place(&self, data: &mut [u8], sector: u64) -> Result<()> {
        check_lengths(data.len(), data.len())?;
        let mut tweak = Tweak::initial(&self.tweak_cipher, sector);
        let tail_len = data.len() % BLOCK_SIZE;
        let (full, tail) = data.split_at_mut(data.len() - tail_len);

        for block in full.chunks_exact_mut(BLOCK_SIZE) {
            self.encrypt_block(block, &tweak);
            tweak.advance();
        }

        if tail_len > 0 {
            // The last full ciphertext block donates its head to the
            // tail, then gets replaced by the encrypted tail plus its
            // own leftover bytes, under the next block's tweak.
            let last_start = full.len() - BLOCK_SIZE;
            let last = &mut full[last_start..];
            let mut stolen = [0; BLOCK_SIZE];
            stolen[..tail_len].copy_from_slice(tail);
            stolen[tail_len..].copy_from_slice(&last[tail_len..]);
            tail.copy_from_slice(&last[..tail_len]);
            self.encrypt_block(&mut stolen, &tweak);
            last.copy_from_slice(&stolen);
        }
        Ok(())
    }

    pub fn decrypt_in_place(&self, data: &mut [u8], sector: u64) -> Result<()> {
        check_lengths(data.len(), data.len())?;
        let mut tweak = Tweak::initial(&self.tweak_cipher, sector);
        let tail_len = data.len() % BLOCK_SIZE;
        let (full, tail) = data.split_at_mut(data.len() - tail_len);
        let regular_len = if tail_len > 0 {
            full.len() - BLOCK_SIZE
        } else {
            full.len()
        };
        let (regular, last) = full.split_at_mut(regular_len);

        for block in regular.chunks_exact_mut(BLOCK_SIZE) {
            self.decrypt_block(block, &tweak);
            tweak.advance();
        }

        if tail_len > 0 {
            // `last` was encrypted under the tweak following the current
            // one; undoing it yields the plaintext tail followed by the
            // bytes the encryptor stole from the previous ciphertext block.
            self.decrypt_block(last, &tweak.next());
            let mut stolen = [0; BLOCK_SIZE];
            stolen[..tail_len].copy_from_slice(tail);
            stolen[tail_len..].copy_from_slice(&last[tail_len..]);
            tail.copy_from_slice(&last[..tail_len]);
            self.decrypt_block(&mut stolen, &tweak);
            last.copy_from_slice(&stolen);
        }
        Ok(())
    }

    /// Encrypts `data` as a run of `sector_size` byte sectors,
    /// the first one being sector number `first_sector`.
    pub fn encrypt_sectors(
        &self,
        data: &mut [u8],
        sector_size: usize,
        first_sector: u64,
    ) -> Result<()> {
        check_sector_run(data.len(), sector_size, first_sector)?;
        for (i, sector) in data.chunks_exact_mut(sector_size).enumerate() {
            self.encrypt_in_place(sector, first_sector + i as u64)?;
        }
        Ok(())
    }

    /// Inverse of [`Xts::encrypt_sectors`].
    pub fn decrypt_sectors(
        &self,
        data: &mut [u8],
        sector_size: usize,
        first_sector: u64,
    ) -> Result<()> {
        check_sector_run(data.len(), sector_size, first_sector)?;
        for (i, sector) in data.chunks_exact_mut(sector_size).enumerate() {
            self.decrypt_in_place(sector, first_sector + i as u64)?;
        }
        Ok(())
    }
}

fn check_sector_run(len: usize, sector_size: usize, first_sector: u64) -> Result<()> {
    if sector_size < BLOCK_SIZE {
        return Err(XtsError::InvalidInputLength(sector_size));
    }
    if len % sector_size != 0 {
        return Err(XtsError::InvalidInputLength(len));
    }
    let count = len / sector_size;
    if count > 0 {
        // sector numbers must not wrap, or two sectors would share a tweak
        let last = u64::try_from(count - 1)
            .ok()
            .and_then(|offset| first_sector.checked_add(offset));
        if last.is_none() {
            return Err(XtsError::SectorOutOfRange {
                first_sector,
                count,
            });
        }
    }
    Ok(())
}
