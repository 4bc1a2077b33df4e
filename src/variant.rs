//! Card variant discrimination.

/// The four card generations this core can identify and drive.
///
/// Decided exactly once, during [`crate::SdSpiCard::init`], and remembered
/// for the lifetime of the driver; every subsequent operation reads it to
/// choose the addressing mode and which commands are legal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardVariant {
    /// Legacy multimedia card. Byte-addressed; initialized via the MMC
    /// operating-condition command (`CMD1`). Does not support the
    /// interface-condition probe, erase, status, or the configuration
    /// register.
    Mmc,
    /// Standard-capacity SD card, version 1.x. Byte-addressed; initialized
    /// via the application-specific activation command with no
    /// high-capacity-support bit.
    SdscV1,
    /// Standard-capacity SD card, version 2.0+. Byte-addressed; supports
    /// the interface-condition command but the operating-conditions
    /// register read did not report high-capacity support.
    SdscV2,
    /// High-capacity (or extended-capacity) SD card. Sector-addressed.
    Sdhc,
}

impl CardVariant {
    /// Legacy MMC cards cannot be sector-addressed: every address on the
    /// wire is a byte offset.
    pub fn is_high_capacity(self) -> bool {
        matches!(self, CardVariant::Sdhc)
    }

    /// Legacy MMC predates erase, `SEND_STATUS`-as-ACMD13, and the
    /// configuration register; those operations are unconditionally
    /// illegal on this variant.
    pub fn is_mmc(self) -> bool {
        matches!(self, CardVariant::Mmc)
    }
}
