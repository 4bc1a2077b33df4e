//! Retry/timeout budgets for the polling loops in [`crate::waiter`],
//! [`crate::command`] and [`crate::init`].
//!
//! The SPI-mode protocol has no wall-clock notion; every "timeout" is an
//! integer poll counter calibrated empirically against several consumer
//! cards. Bundling the counters here (instead of scattering magic numbers
//! through the control flow) lets a caller on a slower or faster transport
//! rescale them.

/// Poll-count budgets for every bounded loop in the driver.
///
/// All fields default to the values the SD Physical Layer community has
/// settled on as safe worst-case budgets across common cards; see
/// [`Timing::default`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    /// Number of all-`0xFF` bytes clocked out with chip-select deasserted
    /// during power-up, to provide at least 74 clock cycles.
    pub power_up_clocks: u32,
    /// Retry budget for the short-response poll in the command framer.
    pub command_poll: u32,
    /// Retry budget for the generic ready-wait (hundreds of polls).
    pub generic_ready: u32,
    /// Retry budget for the read-token wait (~2,000 polls).
    pub read_token: u32,
    /// Retry budget for the write-busy wait (~10^6 polls).
    pub write_busy: u32,
    /// Retry budget for the erase-busy wait (~10^6 polls).
    pub erase_busy: u32,
    /// Retry budget for the soft-reset (`CMD0`) loop.
    pub reset_retries: u32,
    /// Retry budget for the interface-condition (`CMD8`) probe loop.
    pub interface_probe_retries: u32,
    /// Retry budget for the activation (`ACMD41`/`CMD1`) loop.
    pub activation_retries: u32,
}

impl Default for Timing {
    fn default() -> Self {
        Timing {
            power_up_clocks: 2_500,
            command_poll: 256,
            generic_ready: 512,
            read_token: 2_000,
            write_busy: 1_000_000,
            erase_busy: 1_000_000,
            reset_retries: 256,
            interface_probe_retries: 256,
            activation_retries: 20_000,
        }
    }
}

impl Timing {
    /// Scale every poll-count budget by `factor` (rounded down), for use on
    /// a transport whose clock differs from the baseline this crate's
    /// defaults were calibrated against. `factor` below 1.0 shrinks the
    /// budgets; a caller should not go below 1x on the `power_up_clocks`
    /// field or the 74-clock minimum from the SD Physical Layer
    /// specification will not be met.
    pub fn scaled(self, factor: f32) -> Self {
        let scale = |v: u32| ((v as f32) * factor).max(1.0) as u32;
        Timing {
            power_up_clocks: scale(self.power_up_clocks),
            command_poll: scale(self.command_poll),
            generic_ready: scale(self.generic_ready),
            read_token: scale(self.read_token),
            write_busy: scale(self.write_busy),
            erase_busy: scale(self.erase_busy),
            reset_retries: scale(self.reset_retries),
            interface_probe_retries: scale(self.interface_probe_retries),
            activation_retries: scale(self.activation_retries),
        }
    }
}
