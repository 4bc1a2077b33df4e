//! Card-specific-data register decoding.
//!
//! The 16-byte CSD has two mutually exclusive layouts, selected by its top
//! two bits (byte 0, bits 7-6): layout 0 (`CSD_STRUCTURE == 0`) is the
//! standard-capacity layout; any non-zero value is the high-capacity
//! layout used by SDHC/SDXC cards. Both layouts are kept in one type so
//! that callers do not need to match on card variant to read capacity.

/// Decoded card-specific-data register (CSD), 16 bytes on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CardSpecificData {
    raw: [u8; 16],
}

impl CardSpecificData {
    pub(crate) fn from_bytes(raw: [u8; 16]) -> Self {
        CardSpecificData { raw }
    }

    /// Raw CSD structure version field (byte 0, bits 7-6). `0` selects the
    /// standard-capacity layout; any other value selects the
    /// high-capacity layout.
    pub fn structure_version(&self) -> u8 {
        self.raw[0] >> 6
    }

    /// Whether this register uses the high-capacity (SDHC/SDXC) layout.
    pub fn is_high_capacity_layout(&self) -> bool {
        self.structure_version() != 0
    }

    /// Maximum data transfer rate, byte 3 raw (not decoded further; unit
    /// and encoding defined by the SD Physical Layer specification).
    pub fn max_transfer_rate_raw(&self) -> u8 {
        self.raw[3]
    }

    /// `READ_BL_LEN`: 4-bit max read data block length, bits 83-80 (byte 5,
    /// low nibble).
    pub fn read_block_length(&self) -> u8 {
        self.raw[5] & 0x0F
    }

    /// Whether partial blocks smaller than `READ_BL_LEN` may be read.
    pub fn read_partial_blocks(&self) -> bool {
        (self.raw[6] & 0x80) != 0
    }

    /// `ERASE_BLK_EN`: whether the card can erase at a granularity smaller
    /// than `SECTOR_SIZE`.
    pub fn erase_single_block_enabled(&self) -> bool {
        match self.structure_version() {
            0 => (self.raw[10] & 0x40) != 0,
            _ => (self.raw[10] & 0x40) != 0,
        }
    }

    /// `DEVICE_SIZE` field for the standard-capacity (layout 0) CSD: a
    /// 12-bit value spanning bytes 6-8.
    fn device_size_v1(&self) -> u32 {
        let high = (self.raw[6] as u32 & 0x03) << 10;
        let mid = (self.raw[7] as u32) << 2;
        let low = (self.raw[8] as u32) >> 6;
        high | mid | low
    }

    /// `C_SIZE_MULT` field for the standard-capacity CSD: a 3-bit value
    /// starting at byte 9.
    fn device_size_mult_v1(&self) -> u32 {
        let high = (self.raw[9] as u32 & 0x03) << 1;
        let low = (self.raw[10] as u32) >> 7;
        high | low
    }

    /// `DEVICE_SIZE` field for the high-capacity (layout non-zero) CSD: a
    /// 22-bit value spanning bytes 7-9.
    fn device_size_v2(&self) -> u32 {
        let high = (self.raw[7] as u32 & 0x3F) << 16;
        let mid = (self.raw[8] as u32) << 8;
        let low = self.raw[9] as u32;
        high | mid | low
    }

    /// Total card capacity in kilobytes, using the layout-appropriate
    /// formula. Computed in kilobytes throughout to avoid overflowing a
    /// 32-bit byte count on large cards.
    ///
    /// Layout 0: `(DEVICE_SIZE+1) * 2^(C_SIZE_MULT+2) * 2^READ_BL_LEN` bytes.
    /// Layout non-zero: `(DEVICE_SIZE+1) * 512` kilobytes (the high-capacity
    /// layout's block unit is fixed at 512 bytes per physical sector and
    /// its block-count multiplier is itself already expressed in 512KiB
    /// units by the specification; expressed uniformly here as
    /// `(DEVICE_SIZE+1) * BLOCK_SIZE_KB`).
    pub fn capacity_kb(&self) -> u64 {
        if self.is_high_capacity_layout() {
            let device_size = self.device_size_v2() as u64;
            (device_size + 1) * 512
        } else {
            let device_size = self.device_size_v1() as u64;
            let mult_shift = self.device_size_mult_v1() as u64 + 2;
            let read_bl_len = self.read_block_length() as u64;
            let total_bytes = (device_size + 1) * (1u64 << mult_shift) * (1u64 << read_bl_len);
            total_bytes / 1024
        }
    }

    /// Total card capacity in 512-byte sectors.
    pub fn capacity_sectors(&self) -> u64 {
        self.capacity_kb() * 1024 / 512
    }

    /// Raw 16-byte register, for callers that want the untouched on-wire
    /// representation.
    pub fn raw(&self) -> &[u8; 16] {
        &self.raw
    }
}
