//! XTS sector encryption (IEEE P1619) over any 128 bit block cipher.
//!
//! ```
//! use sector_xts::{Aes, Xts};
//!
//! let xts = Xts::<Aes>::new(&[0x42; 64]).unwrap();
//! let plaintext = b"sectors need not be block aligned";
//! let mut sector = *plaintext;
//! xts.encrypt_in_place(&mut sector, 7).unwrap();
//! xts.decrypt_in_place(&mut sector, 7).unwrap();
//! assert_eq!(&sector, plaintext);
//! ```
pub mod cipher;
pub mod storage;
pub mod xts;

pub use cipher::{Aes, Block, BlockCipher, BLOCK_SIZE};
pub use storage::{BlockIO, DeviceError, EncryptedDevice, MemDevice, MemDeviceError};
pub use xts::{Xts, XtsError};
