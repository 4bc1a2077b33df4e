//! Power-up and card identification sequencing.
//!
//! Drives an as-yet-unknown card from power-up through one of three
//! activation paths (legacy MMC, SDSC, or the version-2 probe that can
//! land on SDSC-v2 or SDHC) and returns the [`CardVariant`] the rest of
//! the driver needs to pick an addressing mode.

use log::{debug, error, info, warn};

use crate::bus::CardBus;
use crate::command::{read_extended_response, send_command, send_command_raw};
use crate::consts;
use crate::error::{CardError, CardResult};
use crate::timing::Timing;
use crate::variant::CardVariant;

/// Runs the full identification sequence and returns the discovered
/// variant. `bus` is expected to already have chip-select asserted by
/// the caller for the duration of this call.
pub(crate) fn identify<B: CardBus>(bus: &mut B, timing: &Timing) -> CardResult<CardVariant> {
    power_up(bus, timing)?;
    reset(bus, timing)?;

    let supports_if_cond = probe_if_cond(bus, timing)?;

    let variant = if supports_if_cond {
        match activate_sd(bus, timing, consts::OCR_ARG_HCS)? {
            Some(()) => {
                let ocr = read_ocr(bus)?;
                if ocr & consts::OCR_CCS_BIT != 0 {
                    CardVariant::Sdhc
                } else {
                    CardVariant::SdscV2
                }
            }
            None => activate_mmc(bus, timing).map(|()| CardVariant::Mmc)?,
        }
    } else {
        match activate_sd(bus, timing, consts::OCR_ARG_V1)? {
            Some(()) => CardVariant::SdscV1,
            None => activate_mmc(bus, timing).map(|()| CardVariant::Mmc)?,
        }
    };

    if !variant.is_high_capacity() {
        // Byte-addressed variants must have their block length fixed
        // explicitly; high-capacity cards are hardwired to 512 bytes.
        send_command(bus, timing, consts::SET_BLOCKLEN, consts::BLOCK_SIZE as u32)?;
    }

    info!("card identified as {variant:?}");
    Ok(variant)
}

/// Clocks at least 74 cycles with chip-select released, the power-up
/// ramp every card needs before it will recognize command framing.
fn power_up<B: CardBus>(bus: &mut B, timing: &Timing) -> CardResult<()> {
    bus.release_cs();
    bus.idle_clocks(timing.power_up_clocks)
        .map_err(|_| CardError::FAILURE)?;
    bus.assert_cs();
    Ok(())
}

/// Sends `CMD0` until the card answers with the idle-state bit set, or
/// gives up after [`Timing::reset_retries`] attempts.
fn reset<B: CardBus>(bus: &mut B, timing: &Timing) -> CardResult<()> {
    for _ in 0..timing.reset_retries {
        let status = send_command(bus, timing, consts::GO_IDLE_STATE, 0)?;
        if status.contains(CardError::IN_IDLE_STATE) {
            return Ok(());
        }
    }
    error!("card never entered idle state after CMD0 retries");
    Err(CardError::FAILURE)
}

/// Sends `CMD8` with the standard voltage/check-pattern argument, retrying
/// up to [`Timing::interface_probe_retries`] times on an echo mismatch.
/// Returns `true` if the card echoes the check pattern back (version 2.0
/// interface), `false` if it rejects the command outright (version 1.x
/// or MMC, neither of which implement `CMD8`).
fn probe_if_cond<B: CardBus>(bus: &mut B, timing: &Timing) -> CardResult<bool> {
    for _ in 0..timing.interface_probe_retries {
        let status = send_command(bus, timing, consts::SEND_IF_COND, consts::IF_COND_ARG)?;
        if status.contains(CardError::ILLEGAL_COMMAND) {
            debug!("CMD8 rejected, card predates the version-2.0 interface");
            return Ok(false);
        }
        let echo = read_extended_response(bus)?;
        if echo & 0xFFFF == consts::IF_COND_ARG & 0xFFFF {
            return Ok(true);
        }
        warn!("CMD8 echo mismatch, retrying");
    }
    error!("CMD8 echo never matched after interface-probe retries");
    Err(CardError::FAILURE)
}

/// Repeatedly sends `CMD55`+`ACMD41` with `hcs_arg` until the card leaves
/// idle state. Returns `Ok(Some(()))` once activated, `Ok(None)` if the
/// `CMD55` prefix itself is not answered with a clean idle-state response
/// (meaning the card does not implement the application-command class at
/// all, i.e. it is a legacy MMC — `ACMD41` is never sent in that case), or
/// an error on a genuine timeout.
fn activate_sd<B: CardBus>(bus: &mut B, timing: &Timing, hcs_arg: u32) -> CardResult<Option<()>> {
    for _ in 0..timing.activation_retries {
        let prefix = send_command_raw(bus, timing, consts::APP_CMD, 0)?;
        if prefix != CardError::IN_IDLE_STATE {
            debug!("CMD55 prefix refused, falling back to legacy MMC activation");
            return Ok(None);
        }
        let status = send_command_raw(bus, timing, consts::SD_SEND_OP_COND, hcs_arg)?;
        if !status.contains(CardError::IN_IDLE_STATE) {
            return Ok(Some(()));
        }
    }
    error!("ACMD41 never cleared idle state after activation retries");
    Err(CardError::FAILURE)
}

/// Repeatedly sends `CMD1` until the card leaves idle state; the legacy
/// MMC activation path, with no interface-condition or HCS negotiation.
fn activate_mmc<B: CardBus>(bus: &mut B, timing: &Timing) -> CardResult<()> {
    for _ in 0..timing.activation_retries {
        let status = send_command(bus, timing, consts::SEND_OP_COND_MMC, 0)?;
        if !status.contains(CardError::IN_IDLE_STATE) {
            return Ok(());
        }
    }
    error!("CMD1 never cleared idle state after activation retries");
    Err(CardError::FAILURE)
}

/// Reads the operating-conditions register via `CMD58`.
fn read_ocr<B: CardBus>(bus: &mut B) -> CardResult<u32> {
    read_extended_response(bus)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockCardBus;

    fn timing_for_tests() -> Timing {
        let mut t = Timing::default();
        t.power_up_clocks = 10;
        t.reset_retries = 4;
        t.activation_retries = 4;
        t.command_poll = 8;
        t
    }

    #[test]
    fn identifies_sdhc_card() {
        let mut bus = MockCardBus::new();
        // power-up clocks are Any (idle_clocks uses exchange_byte but not
        // through expect_command, so use expect_any to absorb them).
        bus.expect_any(10);

        bus.expect_command(consts::GO_IDLE_STATE, 0, (consts::GO_IDLE_CRC << 1) | 1);
        bus.push_response_bytes(&[0x01]);

        bus.expect_command(consts::SEND_IF_COND, consts::IF_COND_ARG, (consts::SEND_IF_COND_CRC << 1) | 1);
        bus.push_response_bytes(&[0x01]);
        bus.push_response_bytes(&[0x00, 0x00, 0x01, 0xAA]);

        bus.expect_command(consts::APP_CMD, 0, consts::DONT_CARE_CRC);
        bus.push_response_bytes(&[0x01]);
        bus.expect_command(consts::SD_SEND_OP_COND, consts::OCR_ARG_HCS, consts::DONT_CARE_CRC);
        bus.push_response_bytes(&[0x00]);

        bus.expect_command(consts::READ_OCR, 0, consts::DONT_CARE_CRC);
        bus.push_response_bytes(&[0x00]);
        let ocr = consts::OCR_CCS_BIT | consts::OCR_BUSY_BIT;
        bus.push_response_bytes(&ocr.to_be_bytes());

        let timing = timing_for_tests();
        let variant = identify(&mut bus, &timing).unwrap();
        assert_eq!(variant, CardVariant::Sdhc);
        bus.assert_exhausted();
    }

    #[test]
    fn falls_back_to_mmc_when_app_cmd_prefix_refused() {
        let mut bus = MockCardBus::new();
        bus.expect_any(10);

        bus.expect_command(consts::GO_IDLE_STATE, 0, (consts::GO_IDLE_CRC << 1) | 1);
        bus.push_response_bytes(&[0x01]);

        bus.expect_command(consts::SEND_IF_COND, consts::IF_COND_ARG, (consts::SEND_IF_COND_CRC << 1) | 1);
        bus.push_response_bytes(&[0x05]); // illegal command bit set

        bus.expect_command(consts::APP_CMD, 0, consts::DONT_CARE_CRC);
        bus.push_response_bytes(&[0x05]); // prefix refused, no ACMD41 frame follows

        bus.expect_command(consts::SEND_OP_COND_MMC, 0, consts::DONT_CARE_CRC);
        bus.push_response_bytes(&[0x00]);

        bus.expect_command(consts::SET_BLOCKLEN, consts::BLOCK_SIZE as u32, consts::DONT_CARE_CRC);
        bus.push_response_bytes(&[0x00]);

        let timing = timing_for_tests();
        let variant = identify(&mut bus, &timing).unwrap();
        assert_eq!(variant, CardVariant::Mmc);
        bus.assert_exhausted();
    }
}
