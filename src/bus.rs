//! # Card Bus Trait
//!
//! This module defines the [`CardBus`] trait, the single seam between this
//! crate and the hardware it runs on. Everything below this trait (the
//! byte-level SPI shift register, the chip-select GPIO, the card-detect
//! input) is out of scope for the core and is supplied by the embedder.

/// Abstraction over the byte-level SPI transport and the board's
/// card-detect signal.
///
/// Implementations drive a single full-duplex SPI peripheral with no flow
/// control: every [`exchange_byte`](CardBus::exchange_byte) call clocks out
/// one byte and clocks in one byte. The core never asserts or releases
/// chip-select itself mid-transaction except where the protocol requires
/// it (see the invariants in the crate-level docs); callers of the public
/// façade are expected to let the core manage chip-select for the duration
/// of a single operation.
pub trait CardBus {
    /// Error type surfaced by the underlying transport.
    type Error;

    /// Drive `out` on MOSI while latching a byte from MISO; returns the
    /// latched byte.
    fn exchange_byte(&mut self, out: u8) -> Result<u8, Self::Error>;

    /// Drive chip-select active (low).
    fn assert_cs(&mut self);

    /// Drive chip-select inactive (high).
    fn release_cs(&mut self);

    /// Read the board-level card-detect input.
    fn card_present(&mut self) -> bool;

    /// Clock out `count` all-ones (`0xFF`) bytes, ignoring what comes back.
    /// Used for the power-up ramp and inter-command idle padding.
    fn idle_clocks(&mut self, count: u32) -> Result<(), Self::Error> {
        for _ in 0..count {
            self.exchange_byte(0xFF)?;
        }
        Ok(())
    }
}
