//! Public façade: [`SdSpiCard`], the single entry point this crate
//! exposes to an embedder.

use log::{error, info};

use crate::block_ops;
use crate::bus::CardBus;
use crate::command::{self, send_command};
use crate::consts;
use crate::data;
use crate::error::{CardError, CardResult};
use crate::init;
use crate::registers::{CardIdentification, CardSpecificData, Configuration, SdStatus};
use crate::timing::Timing;
use crate::variant::CardVariant;

/// Summary of a card's identity and capacity, gathered during
/// [`SdSpiCard::init`] and cached for the lifetime of the driver.
#[derive(Debug, Clone, Copy)]
pub struct CardInfo {
    /// The card generation identified during initialization.
    pub variant: CardVariant,
    /// Total capacity in 512-byte sectors, from the card-specific-data
    /// register.
    pub capacity_sectors: u64,
    /// The decoded card-specific-data register.
    pub csd: CardSpecificData,
    /// The decoded card-identification register.
    pub cid: CardIdentification,
    /// The decoded configuration (`SCR`) register. `None` on MMC, which
    /// has no application-command class and therefore no `SCR`.
    pub configuration: Option<Configuration>,
}

enum State {
    Uninitialized,
    Ready {
        variant: CardVariant,
        info: CardInfo,
    },
}

/// Driver core for an SD or MMC card accessed over a SPI-mode bus.
///
/// Owns no hardware directly; every byte it sends or receives goes
/// through the [`CardBus`] implementation supplied at construction.
/// Chip-select is asserted for the duration of every public operation
/// and released once the operation completes (successfully or not), so
/// the bus can be shared with other SPI devices between calls.
pub struct SdSpiCard<B: CardBus> {
    bus: B,
    timing: Timing,
    state: State,
}

impl<B: CardBus> SdSpiCard<B> {
    /// Wraps `bus`, using the default [`Timing`] budgets. The card is not
    /// touched until [`Self::init`] is called.
    pub fn new(bus: B) -> Self {
        Self::with_timing(bus, Timing::default())
    }

    /// Wraps `bus` with caller-supplied poll-count budgets, for a
    /// transport whose clock rate differs enough from the baseline that
    /// the default budgets either time out early or waste time.
    pub fn with_timing(bus: B, timing: Timing) -> Self {
        SdSpiCard {
            bus,
            timing,
            state: State::Uninitialized,
        }
    }

    /// Releases the wrapped bus back to the caller.
    pub fn release(self) -> B {
        self.bus
    }

    /// Reads the board-level card-detect signal. Does not touch the SPI
    /// lines.
    pub fn detect(&mut self) -> bool {
        self.bus.card_present()
    }

    /// Runs the full power-up and identification sequence, then reads
    /// back the card-specific-data, card-identification and (for non-MMC
    /// variants) configuration registers to populate [`CardInfo`]. Must
    /// succeed before any block operation is attempted.
    ///
    /// Returns [`CardError::FAILURE`] without touching the SPI lines if
    /// the board's card-detect signal reports no card present.
    pub fn init(&mut self) -> CardResult<CardVariant> {
        if !self.bus.card_present() {
            error!("init called with no card present");
            return Err(CardError::FAILURE);
        }

        self.bus.assert_cs();
        let result = init::identify(&mut self.bus, &self.timing);
        self.bus.release_cs();
        let variant = result?;

        let csd = self.read_csd()?;
        let cid = self.read_cid()?;
        let configuration = if variant.is_mmc() {
            None
        } else {
            Some(self.read_configuration()?)
        };
        let info = CardInfo {
            variant,
            capacity_sectors: csd.capacity_sectors(),
            csd,
            cid,
            configuration,
        };
        info!("card_info populated: {} sectors", info.capacity_sectors);
        self.state = State::Ready { variant, info };
        Ok(variant)
    }

    /// Forgets everything learned during [`Self::init`], requiring a
    /// fresh call to it before any further operation will succeed. Does
    /// not touch the bus; a card physically removed and reinserted needs
    /// a full power-up sequence regardless.
    pub fn deinit(&mut self) {
        self.state = State::Uninitialized;
    }

    /// Returns the cached card summary gathered during [`Self::init`].
    pub fn card_info(&self) -> CardResult<CardInfo> {
        match &self.state {
            State::Ready { info, .. } => Ok(*info),
            State::Uninitialized => Err(CardError::FAILURE),
        }
    }

    /// Reads the 64-byte SD status record via `ACMD13`. Not available on
    /// MMC.
    pub fn status(&mut self) -> CardResult<SdStatus> {
        let variant = self.require_ready()?;
        if variant.is_mmc() {
            return Err(CardError::ILLEGAL_COMMAND);
        }

        self.with_cs(|bus, timing| {
            use crate::command::ACMD_FLAG;
            let status = send_command(bus, timing, consts::SD_STATUS | ACMD_FLAG, 0)?;
            if !status.is_empty() {
                return Err(status);
            }
            let mut raw = [0u8; 64];
            data::receive_block(bus, timing, &mut raw)?;
            Ok(SdStatus::from_bytes(&raw))
        })
    }

    /// Reads the 8-byte configuration register via `ACMD51`. Not
    /// available on MMC.
    pub fn configuration(&mut self) -> CardResult<Configuration> {
        let variant = self.require_ready()?;
        if variant.is_mmc() {
            return Err(CardError::ILLEGAL_COMMAND);
        }
        self.read_configuration()
    }

    fn read_configuration(&mut self) -> CardResult<Configuration> {
        self.with_cs(|bus, timing| {
            use crate::command::ACMD_FLAG;
            let status = send_command(bus, timing, consts::SEND_SCR | ACMD_FLAG, 0)?;
            if !status.is_empty() {
                return Err(status);
            }
            let mut raw = [0u8; 8];
            data::receive_block(bus, timing, &mut raw)?;
            Ok(Configuration::from_bytes(raw))
        })
    }

    /// Reads one 512-byte sector.
    pub fn read_sector(&mut self, sector_idx: u32, buf: &mut [u8; 512]) -> CardResult<()> {
        let variant = self.require_ready()?;
        self.with_cs(|bus, timing| block_ops::read_sector(bus, timing, variant, sector_idx, buf))
    }

    /// Reads `count` consecutive 512-byte sectors into `buf`, which must
    /// be exactly `count * 512` bytes.
    pub fn read_sectors(&mut self, sector_idx: u32, buf: &mut [u8], count: u32) -> CardResult<()> {
        let variant = self.require_ready()?;
        self.with_cs(|bus, timing| {
            block_ops::read_sectors(bus, timing, variant, sector_idx, buf, count)
        })
    }

    /// Writes one 512-byte sector.
    pub fn write_sector(&mut self, sector_idx: u32, buf: &[u8; 512]) -> CardResult<()> {
        let variant = self.require_ready()?;
        self.with_cs(|bus, timing| block_ops::write_sector(bus, timing, variant, sector_idx, buf))
    }

    /// Writes `count` consecutive 512-byte sectors from `buf`, which must
    /// be exactly `count * 512` bytes.
    pub fn write_sectors(&mut self, sector_idx: u32, buf: &[u8], count: u32) -> CardResult<()> {
        let variant = self.require_ready()?;
        self.with_cs(|bus, timing| {
            block_ops::write_sectors(bus, timing, variant, sector_idx, buf, count)
        })
    }

    /// Erases every sector in `from_idx..=to_idx`. Not available on MMC.
    pub fn erase_sectors(&mut self, from_idx: u32, to_idx: u32) -> CardResult<()> {
        let variant = self.require_ready()?;
        self.with_cs(|bus, timing| {
            block_ops::erase_sectors(bus, timing, variant, from_idx, to_idx)
        })
    }

    fn read_csd(&mut self) -> CardResult<CardSpecificData> {
        self.with_cs(|bus, timing| {
            let status = send_command(bus, timing, consts::SEND_CSD, 0)?;
            if !status.is_empty() {
                return Err(status);
            }
            let mut raw = [0u8; 16];
            data::receive_block(bus, timing, &mut raw)?;
            Ok(CardSpecificData::from_bytes(raw))
        })
    }

    fn read_cid(&mut self) -> CardResult<CardIdentification> {
        self.with_cs(|bus, timing| {
            let status = send_command(bus, timing, consts::SEND_CID, 0)?;
            if !status.is_empty() {
                return Err(status);
            }
            let mut raw = [0u8; 16];
            data::receive_block(bus, timing, &mut raw)?;
            Ok(CardIdentification::from_bytes(raw))
        })
    }

    fn require_ready(&self) -> CardResult<CardVariant> {
        match &self.state {
            State::Ready { variant, .. } => Ok(*variant),
            State::Uninitialized => Err(CardError::FAILURE),
        }
    }

    /// Runs `f` with chip-select asserted, releasing it again once `f`
    /// returns regardless of outcome, and padding with one don't-care
    /// byte afterward the way the physical layer specification requires
    /// between chip-select release and the next command.
    fn with_cs<T>(&mut self, f: impl FnOnce(&mut B, &Timing) -> CardResult<T>) -> CardResult<T> {
        self.bus.assert_cs();
        let result = f(&mut self.bus, &self.timing);
        let _ = command::exchange(&mut self.bus, consts::ALL_ONES);
        self.bus.release_cs();
        result
    }
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
    fn init_fails_without_touching_bus_when_card_absent() {
        let mut bus = MockCardBus::new();
        bus.set_present(false);
        let mut card = SdSpiCard::with_timing(bus, timing_for_tests());

        let result = card.init();
        assert_eq!(result, Err(CardError::FAILURE));
        card.release().assert_exhausted();
    }

    #[test]
    fn init_populates_configuration_for_sd_variant() {
        let mut bus = MockCardBus::new();
        bus.expect_any(10);

        bus.expect_command(consts::GO_IDLE_STATE, 0, (consts::GO_IDLE_CRC << 1) | 1);
        bus.push_response_bytes(&[0x01]);

        bus.expect_command(
            consts::SEND_IF_COND,
            consts::IF_COND_ARG,
            (consts::SEND_IF_COND_CRC << 1) | 1,
        );
        bus.push_response_bytes(&[0x05]); // illegal command bit set -> SDSC-v1 path

        bus.expect_command(consts::APP_CMD, 0, consts::DONT_CARE_CRC);
        bus.push_response_bytes(&[0x01]);
        bus.expect_command(consts::SD_SEND_OP_COND, consts::OCR_ARG_V1, consts::DONT_CARE_CRC);
        bus.push_response_bytes(&[0x00]);

        bus.expect_command(consts::SET_BLOCKLEN, consts::BLOCK_SIZE as u32, consts::DONT_CARE_CRC);
        bus.push_response_bytes(&[0x00]);

        bus.expect_command(consts::SEND_CSD, 0, consts::DONT_CARE_CRC);
        bus.push_response_bytes(&[0x00]);
        bus.push_response_bytes(&[consts::TOKEN_START_BLOCK]);
        bus.push_response_bytes(&[0x00; 16]);
        bus.push_response_bytes(&[0x00, 0x00]);
        bus.expect_any(1); // with_cs trailing pad byte

        bus.expect_command(consts::SEND_CID, 0, consts::DONT_CARE_CRC);
        bus.push_response_bytes(&[0x00]);
        bus.push_response_bytes(&[consts::TOKEN_START_BLOCK]);
        bus.push_response_bytes(&[0x00; 16]);
        bus.push_response_bytes(&[0x00, 0x00]);
        bus.expect_any(1);

        bus.expect_command(consts::APP_CMD, 0, consts::DONT_CARE_CRC);
        bus.push_response_bytes(&[0x00]);
        bus.expect_command(consts::SEND_SCR, 0, consts::DONT_CARE_CRC);
        bus.push_response_bytes(&[0x00]);
        bus.push_response_bytes(&[consts::TOKEN_START_BLOCK]);
        bus.push_response_bytes(&[0x00; 8]);
        bus.push_response_bytes(&[0x00, 0x00]);
        bus.expect_any(1);

        let mut card = SdSpiCard::with_timing(bus, timing_for_tests());
        let variant = card.init().unwrap();
        assert_eq!(variant, CardVariant::SdscV1);

        let info = card.card_info().unwrap();
        assert!(info.configuration.is_some());
        card.release().assert_exhausted();
    }
}
