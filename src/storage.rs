//! Sector encryption on top of a block device.
//!
//! [`EncryptedDevice`] wraps anything implementing [`BlockIO`] and
//! transparently runs every block through XTS, using the block number
//! as the sector index.

use crate::cipher::{BlockCipher, BLOCK_SIZE};
use crate::xts::{Xts, XtsError};
use thiserror::Error;
use tracing::{debug, trace};

/// Fixed size, block addressed storage such as [`MemDevice`],
/// or an [`EncryptedDevice`] layered over one.
pub trait BlockIO {
    type IoError: std::error::Error + 'static;
    fn block_count(&self) -> usize;
    /// Bytes per block, the same for every block.
    fn block_size(&self) -> usize;
    /// Fills the first `block_size()` bytes of `block` with block
    /// `block_number`. Shorter buffers are an error.
    fn read_block(&mut self, block_number: u64, block: &mut [u8]) -> Result<(), Self::IoError>;
    /// Stores the first `block_size()` bytes of `block` as block
    /// `block_number`. Shorter buffers are an error.
    fn write_block(&mut self, block_number: u64, block: &[u8]) -> Result<(), Self::IoError>;
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum MemDeviceError {
    #[error("Block number {block_number} out of range, the device has {block_count} blocks")]
    OutOfRange { block_number: u64, block_count: usize },
    #[error("Buffer of {actual} bytes is too small for a block of {block_size} bytes")]
    BufferTooSmall { actual: usize, block_size: usize },
    #[error("A device of {block_count} blocks of {block_size} bytes doesn't fit in memory")]
    TooLarge { block_size: usize, block_count: usize },
}

/// A block device living in memory.
#[derive(Debug, Clone)]
pub struct MemDevice {
    block_size: usize,
    data: Vec<u8>,
}

impl MemDevice {
    pub fn new(block_size: usize, block_count: usize) -> Result<Self, MemDeviceError> {
        let len = block_size
            .checked_mul(block_count)
            .ok_or(MemDeviceError::TooLarge {
                block_size,
                block_count,
            })?;
        Ok(Self {
            block_size,
            data: vec![0; len],
        })
    }

    /// The raw contents of the device
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    fn block_range(
        &self,
        block_number: u64,
        buffer_len: usize,
    ) -> Result<std::ops::Range<usize>, MemDeviceError> {
        if buffer_len < self.block_size {
            return Err(MemDeviceError::BufferTooSmall {
                actual: buffer_len,
                block_size: self.block_size,
            });
        }
        let block_count = self.block_count();
        match usize::try_from(block_number) {
            Ok(n) if n < block_count => {
                let offset = n * self.block_size;
                Ok(offset..offset + self.block_size)
            }
            _ => Err(MemDeviceError::OutOfRange {
                block_number,
                block_count,
            }),
        }
    }
}

impl BlockIO for MemDevice {
    type IoError = MemDeviceError;

    fn block_count(&self) -> usize {
        if self.block_size == 0 {
            0
        } else {
            self.data.len() / self.block_size
        }
    }

    fn block_size(&self) -> usize {
        self.block_size
    }

    fn read_block(&mut self, block_number: u64, block: &mut [u8]) -> Result<(), MemDeviceError> {
        let range = self.block_range(block_number, block.len())?;
        block[..self.block_size].copy_from_slice(&self.data[range]);
        Ok(())
    }

    fn write_block(&mut self, block_number: u64, block: &[u8]) -> Result<(), MemDeviceError> {
        let range = self.block_range(block_number, block.len())?;
        self.data[range].copy_from_slice(&block[..self.block_size]);
        Ok(())
    }
}

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum DeviceError<E: std::error::Error + 'static> {
    #[error("The device's block size {0} is not valid (must be at least 16)")]
    InvalidBlockSize(usize),
    #[error("Device IO failed")]
    Device(#[source] E),
    #[error(transparent)]
    Xts(#[from] XtsError),
}

/// A device whose blocks are stored XTS encrypted,
/// block `n` being encrypted as sector `n`.
#[derive(Debug)]
pub struct EncryptedDevice<D: BlockIO, C: BlockCipher> {
    device: D,
    xts: Xts<C>,
    buffer: Vec<u8>,
}

impl<D: BlockIO, C: BlockCipher> EncryptedDevice<D, C> {
    pub fn new(device: D, xts: Xts<C>) -> Result<Self, DeviceError<D::IoError>> {
        let block_size = device.block_size();
        if block_size < BLOCK_SIZE {
            return Err(DeviceError::InvalidBlockSize(block_size));
        }
        debug!(
            "Encrypting device with {} blocks of {} bytes",
            device.block_count(),
            block_size
        );
        Ok(Self {
            device,
            xts,
            buffer: vec![0; block_size],
        })
    }

    /// Gives back the underlying device
    pub fn into_inner(self) -> D {
        self.device
    }
}

impl<D: BlockIO, C: BlockCipher> BlockIO for EncryptedDevice<D, C> {
    type IoError = DeviceError<D::IoError>;

    fn block_count(&self) -> usize {
        self.device.block_count()
    }

    fn block_size(&self) -> usize {
        self.buffer.len()
    }

    fn read_block(&mut self, block_number: u64, block: &mut [u8]) -> Result<(), Self::IoError> {
        trace!("Reading encrypted block {block_number}");
        let block_size = self.buffer.len();
        if block.len() < block_size {
            return Err(XtsError::BufferTooSmall {
                required: block_size,
                actual: block.len(),
            }
            .into());
        }
        self.device
            .read_block(block_number, block)
            .map_err(DeviceError::Device)?;
        self.xts.decrypt_in_place(&mut block[..block_size], block_number)?;
        Ok(())
    }

    fn write_block(&mut self, block_number: u64, block: &[u8]) -> Result<(), Self::IoError> {
        trace!("Writing encrypted block {block_number}");
        let block_size = self.buffer.len();
        if block.len() < block_size {
            return Err(XtsError::BufferTooSmall {
                required: block_size,
                actual: block.len(),
            }
            .into());
        }
        self.buffer.copy_from_slice(&block[..block_size]);
        self.xts.encrypt_in_place(&mut self.buffer, block_number)?;
        self.device
            .write_block(block_number, &self.buffer)
            .map_err(DeviceError::Device)
    }
}
