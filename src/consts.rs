//! Command indices, fixed checksums, and data-block tokens from the SD
//! Physical Layer simplified specification's SPI mode appendix.

#![allow(dead_code)]

/// `CMD0`: Go idle state, enter SPI mode if chip-select is low. Requires a
/// correct checksum (`GO_IDLE_CRC`).
pub(crate) const GO_IDLE_STATE: u8 = 0;
/// `CMD1`: legacy MMC operating-condition query.
pub(crate) const SEND_OP_COND_MMC: u8 = 1;
/// `CMD8`: interface-condition probe. Requires a correct checksum
/// (`SEND_IF_COND_CRC`).
pub(crate) const SEND_IF_COND: u8 = 8;
/// `CMD9`: read the card-specific-data register.
pub(crate) const SEND_CSD: u8 = 9;
/// `CMD10`: read the card-identification register.
pub(crate) const SEND_CID: u8 = 10;
/// `CMD12`: stop a multiple-block transfer.
pub(crate) const STOP_TRANSMISSION: u8 = 12;
/// `CMD13`: read the card status register (R2, 64 bytes over the data
/// channel for ACMD13/SD status; plain CMD13 itself yields only a short
/// response and is not used by this core).
pub(crate) const SEND_STATUS: u8 = 13;
/// `CMD16`: fix the block length used by byte-addressed variants.
pub(crate) const SET_BLOCKLEN: u8 = 16;
/// `CMD17`: read a single 512-byte block.
pub(crate) const READ_SINGLE_BLOCK: u8 = 17;
/// `CMD18`: read consecutive 512-byte blocks until stop-transmission.
pub(crate) const READ_MULTIPLE_BLOCK: u8 = 18;
/// `CMD23`: pre-declare the block count for a following multi-write.
pub(crate) const SET_BLOCK_COUNT: u8 = 23;
/// `CMD24`: write a single 512-byte block.
pub(crate) const WRITE_BLOCK: u8 = 24;
/// `CMD25`: write consecutive 512-byte blocks, terminated explicitly.
pub(crate) const WRITE_MULTIPLE_BLOCK: u8 = 25;
/// `CMD32`: set the first block of an erase range.
pub(crate) const ERASE_WR_BLK_START: u8 = 32;
/// `CMD33`: set the last block of an erase range.
pub(crate) const ERASE_WR_BLK_END: u8 = 33;
/// `CMD38`: erase the previously set range.
pub(crate) const ERASE: u8 = 38;
/// `CMD55`: declare that the next command is application-specific.
pub(crate) const APP_CMD: u8 = 55;
/// `CMD58`: read the operating-conditions register (OCR).
pub(crate) const READ_OCR: u8 = 58;

/// `ACMD41`: host capacity support / activation query, sent after `CMD55`.
pub(crate) const SD_SEND_OP_COND: u8 = 41;
/// `ACMD13`: read the 64-byte SD status record, sent after `CMD55`.
pub(crate) const SD_STATUS: u8 = 13;
/// `ACMD51`: read the 8-byte configuration register (SCR), sent after
/// `CMD55`.
pub(crate) const SEND_SCR: u8 = 51;

/// Fixed CRC-7 for `CMD0` with argument 0 -- the only command whose
/// checksum the card actually validates before it has left idle state.
pub(crate) const GO_IDLE_CRC: u8 = 0x95;
/// Fixed CRC-7 for `CMD8` with argument `0x0000_01AA`.
pub(crate) const SEND_IF_COND_CRC: u8 = 0x87;
/// Any other command accepts an arbitrary checksum as long as the framing
/// low bit is set.
pub(crate) const DONT_CARE_CRC: u8 = 0xFF;

/// Argument sent with `ACMD41` for the SDSC-v1 activation path (no
/// high-capacity support requested).
pub(crate) const OCR_ARG_V1: u32 = 0x0000_0000;
/// Argument sent with `ACMD41` advertising host support for high-capacity
/// cards.
pub(crate) const OCR_ARG_HCS: u32 = 0x4000_0000;
/// Argument sent with `CMD8` to probe interface condition: voltage range
/// `2.7-3.6V`, check pattern `0xAA`.
pub(crate) const IF_COND_ARG: u32 = 0x0000_01AA;
/// Card-capacity-status bit (bit 30) in the OCR, set once the card has
/// left the busy/power-up state and distinguishing SDHC from SDSC-v2.
pub(crate) const OCR_CCS_BIT: u32 = 1 << 30;
/// Card-capacity-status bit position within the 4-byte extended response.
pub(crate) const OCR_BUSY_BIT: u32 = 1 << 31;

/// Block size this core always runs at.
pub(crate) const BLOCK_SIZE: usize = 512;

/// Start token for single-block read/write and for each block of a
/// multi-block read.
pub(crate) const TOKEN_START_BLOCK: u8 = 0xFE;
/// Start token for each block of a multi-block write.
pub(crate) const TOKEN_START_MULTI_WRITE: u8 = 0xFC;
/// Terminator token for a multi-block write.
pub(crate) const TOKEN_STOP_TRAN: u8 = 0xFD;
/// Mask applied to the data response token after a write.
pub(crate) const DATA_RESPONSE_MASK: u8 = 0x0E;
/// Masked pattern meaning the card accepted the written block.
pub(crate) const DATA_RESPONSE_ACCEPTED: u8 = 0x04;

/// All-ones byte; the card drives this when it has released the data line
/// (not busy) and it is also what a dummy/read byte on an idle bus reads
/// as.
pub(crate) const ALL_ONES: u8 = 0xFF;
