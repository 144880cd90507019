//! Serial clock planning.
//!
//! The encoder emits one pixel every [`SERIAL_CYCLES_PER_PIXEL`] cycles, so
//! the ideal serial clock is exactly `pixel_clock * 5` (125.875 MHz for the
//! 25.175 MHz modes). The encoder clock is an integer division of a source
//! clock; the plan reports how far the achievable rate is from ideal.

use fugit::HertzU32;

use crate::timing::{Timing, SERIAL_CYCLES_PER_PIXEL};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SerialClockPlan {
    pub ideal: HertzU32,
    pub source: HertzU32,
    pub divider: u32,
    pub achieved: HertzU32,
}

impl SerialClockPlan {
    /// Signed deviation of `achieved` from `ideal`, in parts per million.
    pub fn error_ppm(&self) -> i32 {
        let ideal = self.ideal.to_Hz() as i64;
        let achieved = self.achieved.to_Hz() as i64;
        ((achieved - ideal) * 1_000_000 / ideal) as i32
    }

    /// Pixel clock actually produced.
    pub fn pixel_clock(&self) -> HertzU32 {
        HertzU32::from_raw(self.achieved.to_Hz() / SERIAL_CYCLES_PER_PIXEL)
    }
}

/// Nearest integer divider of `source` in `1..=max_divider` for `timing`.
pub fn plan_serial_clock(timing: &Timing, source: HertzU32, max_divider: u32) -> SerialClockPlan {
    let ideal = timing.serial_clock();
    let target = ideal.to_Hz();
    let divider = ((source.to_Hz() + target / 2) / target).clamp(1, max_divider.max(1));
    SerialClockPlan {
        ideal,
        source,
        divider,
        achieved: HertzU32::from_raw(source.to_Hz() / divider),
    }
}
