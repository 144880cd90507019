//! Setup-time error types.
//!
//! Every failure happens while constructing a session; once the hardware
//! program is running there is no error path.

use core::fmt;

/// Allocation that could not be satisfied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Resource {
    Framebuffer,
    DescriptorProgram,
}

/// Requested geometry cannot be scanned out by any supported mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Bits per pixel outside {1, 2, 4, 8, 16, 32}.
    UnsupportedDepth(u32),
    /// Neither output mode divides evenly by the source size.
    NoCompatibleMode { width: u32, height: u32 },
    /// Horizontal scaling replicates whole bytes, so it needs at least 8 bpp.
    ScaledDepthTooNarrow { depth: u32 },
    /// The encoder repeats a pixel at most 32 times per input word.
    ScaleTooWide { h: u32 },
    /// An unscaled row must fill a whole number of words.
    UnalignedRow { width: u32, depth: u32 },
    /// Pins outside the encoder's range, or two signals sharing a pair.
    InvalidPinout,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::UnsupportedDepth(bits) => {
                write!(f, "unsupported color depth: {bits} bpp")
            }
            ConfigError::NoCompatibleMode { width, height } => {
                write!(f, "no output mode is an integer multiple of {width}x{height}")
            }
            ConfigError::ScaledDepthTooNarrow { depth } => {
                write!(f, "horizontal scaling needs at least 8 bpp, got {depth}")
            }
            ConfigError::ScaleTooWide { h } => {
                write!(f, "horizontal scale {h} exceeds the encoder's 32 shifts per word")
            }
            ConfigError::UnalignedRow { width, depth } => {
                write!(f, "row of {width} pixels at {depth} bpp is not word aligned")
            }
            ConfigError::InvalidPinout => write!(f, "invalid DVI pinout"),
        }
    }
}

/// Errors reported by [`Session::construct`](crate::session::Session::construct).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ScanoutError {
    /// Framebuffer or descriptor program allocation failed.
    ResourceExhausted(Resource),
    /// Two transfer channels could not be claimed.
    ChannelUnavailable,
    /// Another session already owns the scanout hardware.
    SessionConflict,
    /// Geometry, depth or pinout rejected before any allocation.
    Configuration(ConfigError),
}

impl From<ConfigError> for ScanoutError {
    fn from(e: ConfigError) -> Self {
        ScanoutError::Configuration(e)
    }
}

impl fmt::Display for ScanoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanoutError::ResourceExhausted(Resource::Framebuffer) => {
                write!(f, "out of memory allocating the framebuffer")
            }
            ScanoutError::ResourceExhausted(Resource::DescriptorProgram) => {
                write!(f, "out of memory allocating the descriptor program")
            }
            ScanoutError::ChannelUnavailable => write!(f, "no free transfer channels"),
            ScanoutError::SessionConflict => write!(f, "a scanout session is already active"),
            ScanoutError::Configuration(e) => write!(f, "configuration error: {e}"),
        }
    }
}
