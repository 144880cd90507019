//! Canned per-line command lists for the serial encoder.
//!
//! A blanking line is three raw-repeat runs of control symbols (front porch,
//! hsync, back porch plus active). An active line carries the same sync runs
//! and ends with a TMDS command that consumes `h_active` pixels from the
//! pixel data that follows it in the encoder queue.

use crate::timing::{OutputMode, Timing, TIMING_640X480, TIMING_720X400};

/// TMDS control tokens indexed by `(vsync << 1) | hsync`.
pub const TMDS_CTRL_00: u32 = 0x354;
pub const TMDS_CTRL_01: u32 = 0x0ab;
pub const TMDS_CTRL_10: u32 = 0x154;
pub const TMDS_CTRL_11: u32 = 0x2ab;

/// Encoder command opcodes, in bits 15:12 of a command word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Raw = 0x0,
    RawRepeat = 0x1,
    Tmds = 0x2,
    TmdsRepeat = 0x3,
    Nop = 0xf,
}

impl Command {
    /// Command word with a 12-bit count.
    pub const fn word(self, count: u32) -> u32 {
        ((self as u32) << 12) | (count & 0xfff)
    }
}

/// Raw 30-bit symbol word carrying the sync levels on lane 0.
pub const fn sync_symbol(vsync_level: bool, hsync_level: bool) -> u32 {
    let lane0 = match (vsync_level, hsync_level) {
        (false, false) => TMDS_CTRL_00,
        (false, true) => TMDS_CTRL_01,
        (true, false) => TMDS_CTRL_10,
        (true, true) => TMDS_CTRL_11,
    };
    lane0 | (TMDS_CTRL_00 << 10) | (TMDS_CTRL_00 << 20)
}

pub const BLANK_LINE_LEN: usize = 6;
pub const ACTIVE_HEADER_LEN: usize = 9;

/// The three command lists a frame is assembled from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinePatterns {
    pub vsync_on: [u32; BLANK_LINE_LEN],
    pub vsync_off: [u32; BLANK_LINE_LEN],
    pub active: [u32; ACTIVE_HEADER_LEN],
}

/// Bus addresses of a [`LinePatterns`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatternAddrs {
    pub vsync_on: u32,
    pub vsync_off: u32,
    pub active: u32,
}

impl LinePatterns {
    pub const fn new(t: &Timing) -> Self {
        Self {
            vsync_on: blank_line(t, true),
            vsync_off: blank_line(t, false),
            active: active_header(t),
        }
    }

    pub fn addrs(&self) -> PatternAddrs {
        PatternAddrs {
            vsync_on: self.vsync_on.as_ptr() as usize as u32,
            vsync_off: self.vsync_off.as_ptr() as usize as u32,
            active: self.active.as_ptr() as usize as u32,
        }
    }
}

const fn blank_line(t: &Timing, vsync: bool) -> [u32; BLANK_LINE_LEN] {
    let v = t.v_sync_polarity.level(vsync);
    let h_idle = t.h_sync_polarity.level(false);
    let h_sync = t.h_sync_polarity.level(true);
    [
        Command::RawRepeat.word(t.h_front_porch),
        sync_symbol(v, h_idle),
        Command::RawRepeat.word(t.h_sync_width),
        sync_symbol(v, h_sync),
        Command::RawRepeat.word(t.h_back_porch + t.h_active),
        sync_symbol(v, h_idle),
    ]
}

const fn active_header(t: &Timing) -> [u32; ACTIVE_HEADER_LEN] {
    let v = t.v_sync_polarity.level(false);
    let h_idle = t.h_sync_polarity.level(false);
    let h_sync = t.h_sync_polarity.level(true);
    [
        Command::RawRepeat.word(t.h_front_porch),
        sync_symbol(v, h_idle),
        Command::Nop.word(0),
        Command::RawRepeat.word(t.h_sync_width),
        sync_symbol(v, h_sync),
        Command::Nop.word(0),
        Command::RawRepeat.word(t.h_back_porch),
        sync_symbol(v, h_idle),
        Command::Tmds.word(t.h_active),
    ]
}

// The transfer engine reads these every line; keep them out of XIP flash.
#[cfg_attr(target_os = "none", link_section = ".data.scanout_patterns")]
static PATTERNS_640X480: LinePatterns = LinePatterns::new(&TIMING_640X480);

#[cfg_attr(target_os = "none", link_section = ".data.scanout_patterns")]
static PATTERNS_720X400: LinePatterns = LinePatterns::new(&TIMING_720X400);

impl OutputMode {
    pub fn patterns(self) -> &'static LinePatterns {
        match self {
            OutputMode::Mode640x480 => &PATTERNS_640X480,
            OutputMode::Mode720x400 => &PATTERNS_720X400,
        }
    }
}
