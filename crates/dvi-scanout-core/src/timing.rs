//! Output mode timing table.
//!
//! Each mode is pure data: horizontal and vertical porch/sync/active counts
//! plus the nominal pixel clock. Vertical order within a frame is
//! sync, back porch, active, front porch.

use fugit::HertzU32;

/// Serial encoder cycles spent on one pixel (10-bit symbol, 2 bits per cycle).
pub const SERIAL_CYCLES_PER_PIXEL: u32 = 5;

/// Level of a sync signal while asserted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SyncPolarity {
    Positive,
    Negative,
}

impl SyncPolarity {
    /// Wire level of the sync bit when the pulse is (or is not) asserted.
    pub const fn level(self, asserted: bool) -> bool {
        match self {
            SyncPolarity::Positive => asserted,
            SyncPolarity::Negative => !asserted,
        }
    }
}

/// Line-level timing of one output mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Timing {
    pub h_front_porch: u32,
    pub h_sync_width: u32,
    pub h_back_porch: u32,
    pub h_active: u32,
    pub h_sync_polarity: SyncPolarity,

    pub v_front_porch: u32,
    pub v_sync_width: u32,
    pub v_back_porch: u32,
    pub v_active: u32,
    pub v_sync_polarity: SyncPolarity,

    pub pixel_clock: HertzU32,
}

/// Vertical region a scanline falls in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum VerticalBand {
    Sync,
    BackPorch,
    Active,
    FrontPorch,
}

impl Timing {
    pub const fn h_total(&self) -> u32 {
        self.h_front_porch + self.h_sync_width + self.h_back_porch + self.h_active
    }

    pub const fn v_total(&self) -> u32 {
        self.v_front_porch + self.v_sync_width + self.v_back_porch + self.v_active
    }

    /// First active line.
    pub const fn active_start(&self) -> u32 {
        self.v_sync_width + self.v_back_porch
    }

    /// First front-porch line.
    pub const fn front_porch_start(&self) -> u32 {
        self.v_total() - self.v_front_porch
    }

    /// Band of output line `line` (`0..v_total`).
    pub const fn band(&self, line: u32) -> VerticalBand {
        if line < self.v_sync_width {
            VerticalBand::Sync
        } else if line < self.active_start() {
            VerticalBand::BackPorch
        } else if line < self.front_porch_start() {
            VerticalBand::Active
        } else {
            VerticalBand::FrontPorch
        }
    }

    /// Serial encoder clock needed to emit this mode's pixel clock.
    pub const fn serial_clock(&self) -> HertzU32 {
        HertzU32::from_raw(self.pixel_clock.to_Hz() * SERIAL_CYCLES_PER_PIXEL)
    }

    /// Frame rate in millihertz, derived from the pixel clock and totals.
    pub const fn frame_rate_millihertz(&self) -> u32 {
        let per_frame = (self.h_total() * self.v_total()) as u64;
        ((self.pixel_clock.to_Hz() as u64 * 1000) / per_frame) as u32
    }
}

/// 640x480 active area, 800x625 total, 25.175 MHz pixel clock (~50 Hz).
pub const TIMING_640X480: Timing = Timing {
    h_front_porch: 16,
    h_sync_width: 96,
    h_back_porch: 48,
    h_active: 640,
    h_sync_polarity: SyncPolarity::Negative,

    v_front_porch: 10,
    v_sync_width: 2,
    v_back_porch: 133,
    v_active: 480,
    v_sync_polarity: SyncPolarity::Negative,

    pixel_clock: HertzU32::from_raw(25_175_000),
};

/// 720x400 active area, 800x625 total, 25.175 MHz pixel clock (~50 Hz).
pub const TIMING_720X400: Timing = Timing {
    h_front_porch: 8,
    h_sync_width: 32,
    h_back_porch: 40,
    h_active: 720,
    h_sync_polarity: SyncPolarity::Negative,

    v_front_porch: 3,
    v_sync_width: 4,
    v_back_porch: 218,
    v_active: 400,
    v_sync_polarity: SyncPolarity::Negative,

    pixel_clock: HertzU32::from_raw(25_175_000),
};

/// Supported output modes, narrowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OutputMode {
    Mode640x480,
    Mode720x400,
}

impl OutputMode {
    /// Selection order: the narrower mode wins when both fit.
    pub const ALL: [OutputMode; 2] = [OutputMode::Mode640x480, OutputMode::Mode720x400];

    pub const fn timing(self) -> &'static Timing {
        timing_for(self)
    }
}

/// Timing table lookup.
pub const fn timing_for(mode: OutputMode) -> &'static Timing {
    match mode {
        OutputMode::Mode640x480 => &TIMING_640X480,
        OutputMode::Mode720x400 => &TIMING_720X400,
    }
}
