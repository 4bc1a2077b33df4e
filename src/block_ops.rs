//! Sector read/write/erase primitives, built on [`crate::command`] and
//! [`crate::data`].
//!
//! Addressing is the one detail that depends on card variant: high
//! capacity cards address 512-byte sectors directly, every other variant
//! addresses bytes and must have the sector index scaled up by the fixed
//! block size.

use crate::bus::CardBus;
use crate::command::send_command;
use crate::consts;
use crate::data;
use crate::error::{CardError, CardResult};
use crate::timing::Timing;
use crate::variant::CardVariant;
use crate::waiter;

fn wire_address(variant: CardVariant, sector_idx: u32) -> u32 {
    if variant.is_high_capacity() {
        sector_idx
    } else {
        sector_idx.saturating_mul(consts::BLOCK_SIZE as u32)
    }
}

pub(crate) fn read_sector<B: CardBus>(
    bus: &mut B,
    timing: &Timing,
    variant: CardVariant,
    sector_idx: u32,
    buf: &mut [u8; 512],
) -> CardResult<()> {
    waiter::wait_ready(bus, timing.generic_ready)?;
    let addr = wire_address(variant, sector_idx);
    let status = send_command(bus, timing, consts::READ_SINGLE_BLOCK, addr)?;
    if !status.is_empty() {
        return Err(status);
    }
    data::receive_block(bus, timing, buf)
}

pub(crate) fn read_sectors<B: CardBus>(
    bus: &mut B,
    timing: &Timing,
    variant: CardVariant,
    sector_idx: u32,
    buf: &mut [u8],
    count: u32,
) -> CardResult<()> {
    if buf.len() != count as usize * consts::BLOCK_SIZE {
        return Err(CardError::PARAMETER_ERROR);
    }

    waiter::wait_ready(bus, timing.generic_ready)?;
    let addr = wire_address(variant, sector_idx);
    let status = send_command(bus, timing, consts::READ_MULTIPLE_BLOCK, addr)?;
    if !status.is_empty() {
        return Err(status);
    }

    for chunk in buf.chunks_mut(consts::BLOCK_SIZE) {
        data::receive_block(bus, timing, chunk)?;
    }

    send_command(bus, timing, consts::STOP_TRANSMISSION, 0)?;
    waiter::wait_ready(bus, timing.generic_ready)
}

pub(crate) fn write_sector<B: CardBus>(
    bus: &mut B,
    timing: &Timing,
    variant: CardVariant,
    sector_idx: u32,
    buf: &[u8; 512],
) -> CardResult<()> {
    waiter::wait_ready(bus, timing.generic_ready)?;
    let addr = wire_address(variant, sector_idx);
    let status = send_command(bus, timing, consts::WRITE_BLOCK, addr)?;
    if !status.is_empty() {
        return Err(status);
    }
    data::transmit_single(bus, timing, buf)
}

pub(crate) fn write_sectors<B: CardBus>(
    bus: &mut B,
    timing: &Timing,
    variant: CardVariant,
    sector_idx: u32,
    buf: &[u8],
    count: u32,
) -> CardResult<()> {
    if buf.len() != count as usize * consts::BLOCK_SIZE {
        return Err(CardError::PARAMETER_ERROR);
    }

    waiter::wait_ready(bus, timing.generic_ready)?;

    if !variant.is_mmc() {
        use crate::command::ACMD_FLAG;
        let status = send_command(bus, timing, consts::SET_BLOCK_COUNT | ACMD_FLAG, count)?;
        if !status.is_empty() {
            return Err(status);
        }
    }

    let addr = wire_address(variant, sector_idx);
    let status = send_command(bus, timing, consts::WRITE_MULTIPLE_BLOCK, addr)?;
    if !status.is_empty() {
        return Err(status);
    }

    data::write_setup_delay(bus)?;
    for chunk in buf.chunks(consts::BLOCK_SIZE) {
        data::transmit_block(bus, timing, consts::TOKEN_START_MULTI_WRITE, chunk)?;
    }

    data::transmit_stop_token(bus, timing)
}

pub(crate) fn erase_sectors<B: CardBus>(
    bus: &mut B,
    timing: &Timing,
    variant: CardVariant,
    from_idx: u32,
    to_idx: u32,
) -> CardResult<()> {
    if variant.is_mmc() {
        // Legacy MMC predates the erase command group used here.
        return Err(CardError::ILLEGAL_COMMAND);
    }

    waiter::wait_ready(bus, timing.generic_ready)?;

    let from_addr = wire_address(variant, from_idx);
    let to_addr = wire_address(variant, to_idx);

    let status = send_command(bus, timing, consts::ERASE_WR_BLK_START, from_addr)?;
    if !status.is_empty() {
        return Err(status);
    }
    let status = send_command(bus, timing, consts::ERASE_WR_BLK_END, to_addr)?;
    if !status.is_empty() {
        return Err(status);
    }
    let status = send_command(bus, timing, consts::ERASE, 0)?;
    if !status.is_empty() {
        return Err(status);
    }
    waiter::wait_erase_busy(bus, timing.erase_busy)
}
