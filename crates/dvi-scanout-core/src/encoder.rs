//! Serial encoder setup derived from color depth and scale.
//!
//! Lane expansion for 32/16/8/4 bpp comes from a fixed table (RGB888,
//! RGB565, RGB332, RGBD). Other depths are grayscale: every lane takes the
//! same `depth` bits, rotated by `24 + depth`.

use dvi_scanout_hal::{LaneExpansion, OutputBit, SerialEncoder, SerializerClock, ShiftProgram};

use crate::error::ConfigError;
use crate::geometry::{ColorDepth, DviPinout, Scale};
use crate::timing::SERIAL_CYCLES_PER_PIXEL;

/// Bits in one encoder input word.
pub const WORD_BITS: u32 = 32;

/// Serializer clocking for 10-bit symbols shifted out 2 bits per cycle.
pub const SERIALIZER_CLOCK: SerializerClock = SerializerClock {
    clkdiv: SERIAL_CYCLES_PER_PIXEL as u8,
    n_shifts: SERIAL_CYCLES_PER_PIXEL as u8,
    shift: 2,
};

/// Everything written to the encoder at setup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncoderSettings {
    /// Lane 0 first.
    pub lanes: [LaneExpansion; 3],
    pub shift: ShiftProgram,
    pub clock: SerializerClock,
    /// Whether row transfers byte-swap on the way to the encoder.
    pub byte_swap: bool,
}

const fn lane(width: u8, rotation: u8) -> LaneExpansion {
    LaneExpansion { width, rotation }
}

/// Lane widths and rotations for a depth, lane 0 first.
pub const fn lane_layout(depth: ColorDepth) -> [LaneExpansion; 3] {
    match depth {
        ColorDepth::Bpp32 => [lane(8, 0), lane(8, 8), lane(8, 16)],
        ColorDepth::Bpp16 => [lane(5, 21), lane(6, 27), lane(5, 0)],
        ColorDepth::Bpp8 => [lane(2, 26), lane(3, 29), lane(3, 0)],
        ColorDepth::Bpp4 => [lane(1, 26), lane(1, 27), lane(1, 28)],
        ColorDepth::Bpp1 | ColorDepth::Bpp2 => {
            let bits = depth.bits() as u8;
            let gray = lane(bits, 24 + bits);
            [gray, gray, gray]
        }
    }
}

/// Pixel shifts per input word and bits per shift.
///
/// Unscaled words hold `32 / depth` pixels. A scaled transfer arrives
/// replicated across the word, so one pixel is shifted `h` times. The
/// shift count field holds at most 32 (written as 0).
pub fn shift_program(depth: ColorDepth, scale: Scale) -> Result<ShiftProgram, ConfigError> {
    let pixels_per_word = if scale.h == 1 {
        WORD_BITS / depth.bits()
    } else {
        1
    };
    let mut shifts = pixels_per_word % WORD_BITS;
    if scale.h > 1 {
        shifts = shifts.saturating_mul(scale.h);
    }
    let enc_shifts = u8::try_from(shifts)
        .ok()
        .filter(|&n| u32::from(n) <= WORD_BITS)
        .ok_or(ConfigError::ScaleTooWide { h: scale.h })?;
    Ok(ShiftProgram {
        enc_shifts,
        enc_shift: (depth.bits() % WORD_BITS) as u8,
        raw_shifts: 1,
        raw_shift: 0,
    })
}

/// 16 bpp is stored little-endian but expanded most significant byte first.
pub const fn needs_byte_swap(depth: ColorDepth) -> bool {
    matches!(depth, ColorDepth::Bpp16)
}

pub fn settings(depth: ColorDepth, scale: Scale) -> Result<EncoderSettings, ConfigError> {
    Ok(EncoderSettings {
        lanes: lane_layout(depth),
        shift: shift_program(depth, scale)?,
        clock: SERIALIZER_CLOCK,
        byte_swap: needs_byte_swap(depth),
    })
}

/// Output bit assignment for every pin in the pinout, as `(bit, output)`.
///
/// Each TMDS lane sends shift-register bit `10 * lane` in the first half of
/// a cycle and `10 * lane + 1` in the second; negative legs are inverted.
/// Both legs of every pair must fall in `first_pin..first_pin + pin_count`.
pub fn output_bits(
    pinout: &DviPinout,
    first_pin: u8,
    pin_count: u8,
) -> Result<[(u8, OutputBit); 8], ConfigError> {
    let bit_of = |pin: u8| match pin.checked_sub(first_pin) {
        Some(bit) if (bit | 1) < pin_count => Ok(bit),
        _ => Err(ConfigError::InvalidPinout),
    };

    let clock = bit_of(pinout.clock)?;
    let mut bits = [(clock, OutputBit::Clock { invert: false }); 8];
    bits[1] = (clock ^ 1, OutputBit::Clock { invert: true });
    for (lane, pin) in pinout.lanes().into_iter().enumerate() {
        let bit = bit_of(pin)?;
        let sel_p = (lane * 10) as u8;
        let sel_n = sel_p + 1;
        bits[2 + lane * 2] = (bit, OutputBit::Data { sel_p, sel_n, invert: false });
        bits[3 + lane * 2] = (bit ^ 1, OutputBit::Data { sel_p, sel_n, invert: true });
    }
    Ok(bits)
}

/// Output bits for `pinout` on this particular encoder.
pub fn encoder_output_bits<E: SerialEncoder>(
    encoder: &E,
    pinout: &DviPinout,
) -> Result<[(u8, OutputBit); 8], ConfigError> {
    output_bits(pinout, encoder.first_pin(), encoder.pin_count())
}

/// Program the encoder once, before the transfer engine is armed.
pub fn configure<E: SerialEncoder>(
    encoder: &mut E,
    settings: &EncoderSettings,
    outputs: &[(u8, OutputBit); 8],
) {
    encoder.disable();
    encoder.set_expansion(&settings.lanes);
    encoder.set_shift(&settings.shift);
    for &(bit, output) in outputs {
        encoder.set_output_bit(bit, output);
    }
    encoder.enable(&settings.clock);
}
