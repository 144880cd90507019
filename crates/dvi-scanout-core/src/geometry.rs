//! Source geometry, pinout and output mode selection.

use crate::error::ConfigError;
use crate::timing::OutputMode;

/// Bits per pixel of the source framebuffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ColorDepth {
    Bpp1,
    Bpp2,
    Bpp4,
    Bpp8,
    Bpp16,
    Bpp32,
}

impl ColorDepth {
    pub const fn from_bits(bits: u32) -> Result<Self, ConfigError> {
        match bits {
            1 => Ok(ColorDepth::Bpp1),
            2 => Ok(ColorDepth::Bpp2),
            4 => Ok(ColorDepth::Bpp4),
            8 => Ok(ColorDepth::Bpp8),
            16 => Ok(ColorDepth::Bpp16),
            32 => Ok(ColorDepth::Bpp32),
            other => Err(ConfigError::UnsupportedDepth(other)),
        }
    }

    pub const fn bits(self) -> u32 {
        match self {
            ColorDepth::Bpp1 => 1,
            ColorDepth::Bpp2 => 2,
            ColorDepth::Bpp4 => 4,
            ColorDepth::Bpp8 => 8,
            ColorDepth::Bpp16 => 16,
            ColorDepth::Bpp32 => 32,
        }
    }

    /// Pixels packed into one 32-bit word.
    pub const fn pixels_per_word(self) -> u32 {
        32 / self.bits()
    }
}

/// Integer ratios between output active area and source size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Scale {
    pub h: u32,
    pub v: u32,
}

/// Largest horizontal scale: one pixel fills every encoder shift of a word.
pub const MAX_H_SCALE: u32 = 32;

/// First GPIO wired to the serial encoder.
pub const ENCODER_FIRST_PIN: u8 = 12;
/// Last GPIO wired to the serial encoder.
pub const ENCODER_LAST_PIN: u8 = 19;

/// Positive GPIO of each differential pair. The negative leg is the
/// neighbouring pin (`bit ^ 1`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DviPinout {
    pub clock: u8,
    pub d0: u8,
    pub d1: u8,
    pub d2: u8,
}

impl DviPinout {
    /// Adafruit Fruit Jam.
    pub const FRUIT_JAM: DviPinout = DviPinout {
        clock: 13,
        d0: 15,
        d1: 17,
        d2: 19,
    };

    /// TMDS data pins, lane 0 first.
    pub const fn lanes(&self) -> [u8; 3] {
        [self.d0, self.d1, self.d2]
    }

    /// Each signal must sit in the encoder's range and own its pair.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let pins = [self.clock, self.d0, self.d1, self.d2];
        let mut pairs = 0u8;
        for pin in pins {
            if !(ENCODER_FIRST_PIN..=ENCODER_LAST_PIN).contains(&pin) {
                return Err(ConfigError::InvalidPinout);
            }
            let pair = 1 << ((pin - ENCODER_FIRST_PIN) / 2);
            if pairs & pair != 0 {
                return Err(ConfigError::InvalidPinout);
            }
            pairs |= pair;
        }
        Ok(())
    }
}

impl Default for DviPinout {
    fn default() -> Self {
        Self::FRUIT_JAM
    }
}

/// Everything needed to construct a scanout session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ScanoutConfig {
    pub width: u32,
    pub height: u32,
    pub depth: ColorDepth,
    pub pinout: DviPinout,
}

/// Output mode and scale chosen for a config.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Resolved {
    pub mode: OutputMode,
    pub scale: Scale,
}

impl ScanoutConfig {
    pub const fn new(width: u32, height: u32, depth: ColorDepth) -> Self {
        Self {
            width,
            height,
            depth,
            pinout: DviPinout::FRUIT_JAM,
        }
    }

    pub const fn with_pinout(mut self, pinout: DviPinout) -> Self {
        self.pinout = pinout;
        self
    }

    /// Pick the first mode whose active area is an integer multiple of the
    /// source size, then check the depth works at that scale.
    pub fn resolve(&self) -> Result<Resolved, ConfigError> {
        self.pinout.validate()?;

        let (width, height) = (self.width, self.height);
        let mode = OutputMode::ALL
            .into_iter()
            .find(|mode| {
                let t = mode.timing();
                width != 0
                    && height != 0
                    && t.h_active % width == 0
                    && t.v_active % height == 0
            })
            .ok_or(ConfigError::NoCompatibleMode { width, height })?;

        let timing = mode.timing();
        let scale = Scale {
            h: timing.h_active / width,
            v: timing.v_active / height,
        };

        if scale.h > MAX_H_SCALE {
            return Err(ConfigError::ScaleTooWide { h: scale.h });
        }
        let depth = self.depth.bits();
        if scale.h > 1 && depth < 8 {
            return Err(ConfigError::ScaledDepthTooNarrow { depth });
        }
        if scale.h == 1 && (width * depth) % 32 != 0 {
            return Err(ConfigError::UnalignedRow { width, depth });
        }

        Ok(Resolved { mode, scale })
    }
}
