//! Command framing: the 6-byte command frame and the short/extended
//! response readers.

use log::{debug, error};

use crate::bus::CardBus;
use crate::consts;
use crate::error::{CardError, CardResult};
use crate::timing::Timing;

/// Bit set on `ACMD`-family command indices passed to [`send_command`] to
/// request the `CMD55` prefix; never sent on the wire itself.
pub(crate) const ACMD_FLAG: u8 = 0x80;

/// Sends a 6-byte command frame and polls for the one-byte short response.
///
/// `index` may have [`ACMD_FLAG`] set, in which case `CMD55` (APP_CMD) is
/// sent first and its own short response discarded. Callers that need to
/// inspect the `CMD55` response itself (to detect a legacy card that
/// refuses the application-command prefix) must use
/// [`send_app_command`] instead.
pub(crate) fn send_command<B: CardBus>(
    bus: &mut B,
    timing: &Timing,
    index: u8,
    arg: u32,
) -> CardResult<CardError> {
    if index & ACMD_FLAG != 0 {
        let (_, status) = send_app_command(bus, timing, index & !ACMD_FLAG, arg)?;
        Ok(status)
    } else {
        send_command_raw(bus, timing, index, arg)
    }
}

/// Sends `CMD55` followed by the application-specific command `index`,
/// returning both short responses so the caller can distinguish "`CMD55`
/// itself was refused" from "the application command came back with an
/// error".
pub(crate) fn send_app_command<B: CardBus>(
    bus: &mut B,
    timing: &Timing,
    index: u8,
    arg: u32,
) -> CardResult<(CardError, CardError)> {
    let prefix = send_command_raw(bus, timing, consts::APP_CMD, 0)?;
    let status = send_command_raw(bus, timing, index, arg)?;
    Ok((prefix, status))
}

/// Sends a single 6-byte command frame (no `CMD55` prefixing) and returns
/// the decoded short response. Exposed beyond this module for callers
/// that must inspect and act on an individual response before deciding
/// whether to send the next frame at all (the activation sequencer does
/// not send `ACMD41` once `CMD55` itself has been refused).
pub(crate) fn send_command_raw<B: CardBus>(
    bus: &mut B,
    timing: &Timing,
    index: u8,
    arg: u32,
) -> CardResult<CardError> {
    let crc = fixed_crc(index, arg);
    let frame = [
        0x40 | (index & 0x3F),
        (arg >> 24) as u8,
        (arg >> 16) as u8,
        (arg >> 8) as u8,
        arg as u8,
        crc,
    ];

    debug!("CMD{index} arg={arg:#010x} crc={crc:#04x}");

    for byte in frame {
        exchange(bus, byte)?;
    }

    if index == consts::STOP_TRANSMISSION {
        // The card drives one filler byte immediately after a
        // stop-transmission frame, ahead of the short response itself.
        exchange(bus, consts::ALL_ONES)?;
    }

    for _ in 0..timing.command_poll {
        let response = exchange(bus, consts::ALL_ONES)?;
        if response & 0x80 == 0 {
            let status = CardError::from_short_response(response);
            if !(status - CardError::IN_IDLE_STATE).is_empty() {
                debug!("CMD{index} status={status:?}");
            }
            return Ok(status);
        }
    }
    error!("CMD{index} short-response poll exhausted its budget");
    Err(CardError::FAILURE)
}

/// Reads the 4-byte extended response that follows a short response for
/// `CMD8` (interface condition echo) and `CMD58` (OCR).
pub(crate) fn read_extended_response<B: CardBus>(bus: &mut B) -> CardResult<u32> {
    let mut bytes = [0u8; 4];
    for slot in &mut bytes {
        *slot = exchange(bus, consts::ALL_ONES)?;
    }
    Ok(u32::from_be_bytes(bytes))
}

/// The only two commands whose checksum the card checks before leaving
/// idle state have fixed, well-known CRC-7 values; every other command
/// accepts a don't-care checksum as long as the framing stop bit is set.
fn fixed_crc(index: u8, arg: u32) -> u8 {
    match (index, arg) {
        (consts::GO_IDLE_STATE, 0) => (consts::GO_IDLE_CRC << 1) | 1,
        (consts::SEND_IF_COND, consts::IF_COND_ARG) => (consts::SEND_IF_COND_CRC << 1) | 1,
        _ => consts::DONT_CARE_CRC,
    }
}

/// Clocks one byte in both directions, mapping a bus error to
/// [`CardError::FAILURE`] since the bitflag taxonomy has no room for an
/// arbitrary transport error type.
pub(crate) fn exchange<B: CardBus>(bus: &mut B, out: u8) -> CardResult<u8> {
    bus.exchange_byte(out).map_err(|_| CardError::FAILURE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockCardBus;

    #[test]
    fn go_idle_state_uses_fixed_crc() {
        let mut bus = MockCardBus::new();
        bus.expect_command(consts::GO_IDLE_STATE, 0, (consts::GO_IDLE_CRC << 1) | 1);
        bus.push_response_bytes(&[0x01]);

        let timing = Timing::default();
        let status = send_command(&mut bus, &timing, consts::GO_IDLE_STATE, 0).unwrap();
        assert_eq!(status, CardError::IN_IDLE_STATE);
        bus.assert_exhausted();
    }

    #[test]
    fn acmd_prefixes_app_cmd() {
        let mut bus = MockCardBus::new();
        bus.expect_command(consts::APP_CMD, 0, consts::DONT_CARE_CRC);
        bus.push_response_bytes(&[0x01]);
        bus.expect_command(consts::SD_SEND_OP_COND, consts::OCR_ARG_HCS, consts::DONT_CARE_CRC);
        bus.push_response_bytes(&[0x00]);

        let timing = Timing::default();
        let status = send_command(
            &mut bus,
            &timing,
            consts::SD_SEND_OP_COND | ACMD_FLAG,
            consts::OCR_ARG_HCS,
        )
        .unwrap();
        assert!(status.is_empty());
        bus.assert_exhausted();
    }

    #[test]
    fn stop_transmission_discards_filler_byte_first() {
        let mut bus = MockCardBus::new();
        bus.expect_command(consts::STOP_TRANSMISSION, 0, consts::DONT_CARE_CRC);
        // One filler byte, then the real short response.
        bus.push_response_bytes(&[0xFF, 0x00]);

        let timing = Timing::default();
        let status = send_command(&mut bus, &timing, consts::STOP_TRANSMISSION, 0).unwrap();
        assert!(status.is_empty());
        bus.assert_exhausted();
    }

    #[test]
    fn send_app_command_exposes_prefix_response() {
        let mut bus = MockCardBus::new();
        bus.expect_command(consts::APP_CMD, 0, consts::DONT_CARE_CRC);
        bus.push_response_bytes(&[0x05]); // prefix refused
        bus.expect_command(consts::SD_SEND_OP_COND, consts::OCR_ARG_V1, consts::DONT_CARE_CRC);
        bus.push_response_bytes(&[0x05]);

        let timing = Timing::default();
        let (prefix, status) =
            send_app_command(&mut bus, &timing, consts::SD_SEND_OP_COND, consts::OCR_ARG_V1)
                .unwrap();
        assert_eq!(prefix, CardError::IN_IDLE_STATE | CardError::ILLEGAL_COMMAND);
        assert_eq!(status, CardError::IN_IDLE_STATE | CardError::ILLEGAL_COMMAND);
        bus.assert_exhausted();
    }

    #[test]
    fn short_response_poll_times_out() {
        let mut bus = MockCardBus::new();
        bus.expect_command(consts::SEND_STATUS, 0, consts::DONT_CARE_CRC);
        // Never deasserts the framing bit.
        bus.push_response_bytes(&[0xFF; 4]);

        let mut timing = Timing::default();
        timing.command_poll = 4;
        let result = send_command(&mut bus, &timing, consts::SEND_STATUS, 0);
        assert_eq!(result, Err(CardError::FAILURE));
    }
}
