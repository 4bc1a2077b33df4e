//! Data-block transport: read/write of a single 512-byte block framed by
//! a start token and a trailing CRC-16, and the multi-block write
//! terminator sequence.

use log::{error, trace};

use crate::bus::CardBus;
use crate::command::exchange;
use crate::consts;
use crate::error::{CardError, CardResult};
use crate::timing::Timing;
use crate::waiter;

/// Receives one `len`-byte data block into `buf`, after the command that
/// triggers it has already received its short response. Waits for the
/// start token first, per [`crate::timing::Timing::read_token`], then
/// reads `len` payload bytes followed by a 2-byte CRC that is read but
/// not verified (this core trusts the physical-layer CRC the same way it
/// trusts the command CRC on every command past `CMD0`/`CMD8`).
pub(crate) fn receive_block<B: CardBus>(
    bus: &mut B,
    timing: &Timing,
    buf: &mut [u8],
) -> CardResult<()> {
    waiter::wait_for_data_token(bus, timing.read_token)?;
    for slot in buf.iter_mut() {
        *slot = exchange(bus, consts::ALL_ONES)?;
    }
    // Trailing CRC-16, consumed but not checked.
    exchange(bus, consts::ALL_ONES)?;
    exchange(bus, consts::ALL_ONES)?;
    Ok(())
}

/// Writes three dummy bytes of setup delay ahead of a write's start
/// token, once per single-block write and once before the whole loop of
/// a multi-block write (not once per block).
pub(crate) fn write_setup_delay<B: CardBus>(bus: &mut B) -> CardResult<()> {
    for _ in 0..3 {
        exchange(bus, consts::ALL_ONES)?;
    }
    Ok(())
}

/// Transmits one data block prefixed with `token` (the single-block start
/// token or the multi-block start token) and a dummy CRC-16, then checks
/// the card's data response token and waits for the card to release the
/// busy line. Does not itself write the setup-delay bytes; callers issue
/// those once via [`write_setup_delay`] before the first block of a
/// transfer.
pub(crate) fn transmit_block<B: CardBus>(
    bus: &mut B,
    timing: &Timing,
    token: u8,
    buf: &[u8],
) -> CardResult<()> {
    exchange(bus, token)?;
    for &byte in buf {
        exchange(bus, byte)?;
    }
    // Dummy CRC-16; the card does not check it in SPI mode unless CRC
    // checking has been explicitly enabled, which this core never does.
    exchange(bus, consts::ALL_ONES)?;
    exchange(bus, consts::ALL_ONES)?;

    let response = exchange(bus, consts::ALL_ONES)?;
    trace!("data response token: {response:#04x}");
    if response & consts::DATA_RESPONSE_MASK != consts::DATA_RESPONSE_ACCEPTED {
        error!("data block rejected, response token {response:#04x}");
        return Err(CardError::FAILURE);
    }
    waiter::wait_write_busy(bus, timing.write_busy)
}

/// Writes the setup delay followed by a single-block transmit; the
/// whole single-block write sequence in one call.
pub(crate) fn transmit_single<B: CardBus>(
    bus: &mut B,
    timing: &Timing,
    buf: &[u8],
) -> CardResult<()> {
    write_setup_delay(bus)?;
    transmit_block(bus, timing, consts::TOKEN_START_BLOCK, buf)
}

/// Sends the multi-block-write stop token, discards the one byte the
/// card drives immediately after it, then waits on the generic-ready
/// budget (not the write-busy budget — the card has already released
/// its per-block busy signal by the time the stop token is accepted).
pub(crate) fn transmit_stop_token<B: CardBus>(bus: &mut B, timing: &Timing) -> CardResult<()> {
    exchange(bus, consts::TOKEN_STOP_TRAN)?;
    exchange(bus, consts::ALL_ONES)?;
    waiter::wait_ready(bus, timing.generic_ready)
}
