//! Busy/ready polling loops.
//!
//! The SPI-mode protocol signals "busy" by holding the data line (and
//! thus every byte read back) at `0x00`; "ready" is `0xFF`. Every bounded
//! wait in this crate is one of the four budgets below, chosen by what
//! comes next on the wire.

use log::{error, trace};

use crate::bus::CardBus;
use crate::command::exchange;
use crate::consts;
use crate::error::{CardError, CardResult};

/// Polls until the bus reads back non-zero, using the generic-ready
/// budget. Used after a command whose card-side processing time is short
/// and not separately budgeted (e.g. between `CMD58` and the following
/// extended response).
pub(crate) fn wait_ready<B: CardBus>(bus: &mut B, budget: u32) -> CardResult<()> {
    for _ in 0..budget {
        let byte = exchange(bus, consts::ALL_ONES)?;
        trace!("ready poll: {byte:#04x}");
        if byte != 0x00 {
            return Ok(());
        }
    }
    error!("ready-wait exhausted its poll budget");
    Err(CardError::FAILURE)
}

/// Polls until a data start token (`0xFE`) appears, within `budget`
/// polls. Any other non-`0xFF` byte is a data error token and is
/// surfaced as [`CardError::FAILURE`] immediately rather than retried.
pub(crate) fn wait_for_data_token<B: CardBus>(bus: &mut B, budget: u32) -> CardResult<()> {
    for _ in 0..budget {
        let byte = exchange(bus, consts::ALL_ONES)?;
        trace!("data-token poll: {byte:#04x}");
        if byte == consts::TOKEN_START_BLOCK {
            return Ok(());
        }
        if byte != consts::ALL_ONES {
            error!("data error token {byte:#04x} while waiting for start token");
            return Err(CardError::FAILURE);
        }
    }
    error!("data-token wait exhausted its poll budget");
    Err(CardError::FAILURE)
}

/// Polls until the card releases the data line after accepting a written
/// block, within `budget` polls.
pub(crate) fn wait_write_busy<B: CardBus>(bus: &mut B, budget: u32) -> CardResult<()> {
    wait_ready(bus, budget)
}

/// Polls until the card releases the data line after an erase, within
/// `budget` polls. Kept distinct from [`wait_write_busy`] even though the
/// wire-level wait is identical, since erase completion can legitimately
/// take orders of magnitude longer and callers configure it separately
/// via [`crate::timing::Timing::erase_busy`].
pub(crate) fn wait_erase_busy<B: CardBus>(bus: &mut B, budget: u32) -> CardResult<()> {
    wait_ready(bus, budget)
}
