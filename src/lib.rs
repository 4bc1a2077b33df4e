//! A `no_std` driver core for SD/MMC cards accessed over the SPI-mode bus
//! protocol.
//!
//! This crate brings an unknown card from cold power-up through
//! identification and initialization, then exposes 512-byte block read,
//! block write and sector-range erase primitives. It does not own the
//! byte-level SPI transport or the board's card-detect signal; those are
//! supplied by the embedder through the [`CardBus`] trait.
//!
//! ```no_run
//! use sdspi_core::{CardBus, SdSpiCard};
//!
//! struct MyBus;
//!
//! impl CardBus for MyBus {
//!     type Error = core::convert::Infallible;
//!
//!     fn exchange_byte(&mut self, out: u8) -> Result<u8, Self::Error> {
//!         // drive `out` on MOSI, latch and return the byte seen on MISO
//!         # Ok(0xFF)
//!     }
//!     fn assert_cs(&mut self) {}
//!     fn release_cs(&mut self) {}
//!     fn card_present(&mut self) -> bool { true }
//! }
//!
//! let mut card = SdSpiCard::new(MyBus);
//! card.init().unwrap();
//! let mut block = [0u8; 512];
//! card.read_sector(0, &mut block).unwrap();
//! ```

#![cfg_attr(not(test), no_std)]

mod block_ops;
mod bus;
mod command;
mod consts;
mod data;
mod driver;
mod error;
mod init;
mod registers;
mod timing;
mod variant;
mod waiter;

#[cfg(test)]
mod mock;

pub use bus::CardBus;
pub use driver::{CardInfo, SdSpiCard};
pub use error::{CardError, CardResult};
pub use registers::{CardIdentification, CardSpecificData, Configuration, SdStatus};
pub use timing::Timing;
pub use variant::CardVariant;
