//! Error taxonomy for the SPI-mode SD/MMC core.
//!
//! The error code is a flat bitflag value, bit-compatible with the card's
//! short response byte (see [`crate::command`]): every bit except
//! [`CardError::FAILURE`] is a pass-through of a bit the card itself set.
//! `FAILURE` reuses bit 7, which the card can never set in a genuine short
//! response (bit 7 is the framing marker and is always zero in a valid
//! response), so it is safe to use as a synthetic, host-side-only code.

use bitflags::bitflags;

bitflags! {
    /// Flat error code returned by every fallible operation in this crate.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct CardError: u8 {
        /// Card is in idle state. Expected mid-initialization, an error elsewhere.
        const IN_IDLE_STATE = 0x01;
        /// Erase sequence was reset.
        const ERASE_RESET = 0x02;
        /// Command not supported by the current card variant.
        const ILLEGAL_COMMAND = 0x04;
        /// Command CRC check failed.
        const COMMAND_CRC_ERROR = 0x08;
        /// Error in the erase command sequence.
        const ERASE_SEQ_ERROR = 0x10;
        /// Command argument addresses an out-of-range block.
        const ADDRESS_ERROR = 0x20;
        /// Command argument is otherwise out of the card's accepted range.
        const PARAMETER_ERROR = 0x40;
        /// Host-side synthetic failure: waiter timeout, bad interface-condition
        /// echo, missing read-token, or rejected write data response.
        const FAILURE = 0x80;
    }
}

impl CardError {
    /// Build a `CardError` from a raw short-response byte, keeping only the
    /// bits this taxonomy understands.
    pub(crate) fn from_short_response(byte: u8) -> Self {
        CardError::from_bits_truncate(byte)
    }
}

/// `Result` alias used throughout the public surface; `Ok(())` is the
/// taxonomy's implicit `OK`.
pub type CardResult<T = ()> = Result<T, CardError>;
