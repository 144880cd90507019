//! Mode selection, depth validation, framebuffer geometry and clock planning.

use dvi_scanout_core::clock::plan_serial_clock;
use dvi_scanout_core::error::{ConfigError, ScanoutError};
use dvi_scanout_core::framebuffer::{pitch_words, Framebuffer};
use dvi_scanout_core::geometry::{ColorDepth, DviPinout, Scale, ScanoutConfig};
use dvi_scanout_core::timing::{OutputMode, TIMING_640X480};
use fugit::HertzU32;

fn resolve(width: u32, height: u32, depth: ColorDepth) -> Result<(OutputMode, Scale), ConfigError> {
    ScanoutConfig::new(width, height, depth)
        .resolve()
        .map(|r| (r.mode, r.scale))
}

// ============================================================================
// Mode selection
// ============================================================================

mod selection {
    use super::*;

    #[test]
    fn picks_640_when_width_divides_it() {
        assert_eq!(
            resolve(320, 240, ColorDepth::Bpp16),
            Ok((OutputMode::Mode640x480, Scale { h: 2, v: 2 }))
        );
    }

    #[test]
    fn falls_back_to_720() {
        assert_eq!(
            resolve(360, 200, ColorDepth::Bpp8),
            Ok((OutputMode::Mode720x400, Scale { h: 2, v: 2 }))
        );
    }

    #[test]
    fn prefers_640_when_both_fit() {
        assert_eq!(
            resolve(80, 80, ColorDepth::Bpp32),
            Ok((OutputMode::Mode640x480, Scale { h: 8, v: 6 }))
        );
    }

    #[test]
    fn height_must_divide_too() {
        // 640 divides by 320 but 480 does not divide by 200; 720/400 fails on width.
        assert_eq!(
            resolve(320, 200, ColorDepth::Bpp8),
            Err(ConfigError::NoCompatibleMode {
                width: 320,
                height: 200
            })
        );
    }

    #[test]
    fn incompatible_width_is_rejected() {
        assert_eq!(
            resolve(300, 240, ColorDepth::Bpp8),
            Err(ConfigError::NoCompatibleMode {
                width: 300,
                height: 240
            })
        );
    }

    #[test]
    fn zero_size_is_rejected() {
        assert!(matches!(
            resolve(0, 240, ColorDepth::Bpp8),
            Err(ConfigError::NoCompatibleMode { .. })
        ));
    }

    #[test]
    fn bad_pinout_is_rejected_first() {
        let config = ScanoutConfig::new(640, 480, ColorDepth::Bpp8).with_pinout(DviPinout {
            clock: 20,
            ..DviPinout::FRUIT_JAM
        });
        assert_eq!(config.resolve(), Err(ConfigError::InvalidPinout));
    }
}

// ============================================================================
// Depth validation
// ============================================================================

mod depth {
    use super::*;

    #[test]
    fn from_bits_accepts_supported_depths() {
        for bits in [1, 2, 4, 8, 16, 32] {
            assert_eq!(ColorDepth::from_bits(bits).unwrap().bits(), bits);
        }
        assert_eq!(
            ColorDepth::from_bits(24),
            Err(ConfigError::UnsupportedDepth(24))
        );
    }

    #[test]
    fn scaling_needs_whole_bytes() {
        assert_eq!(
            resolve(320, 240, ColorDepth::Bpp4),
            Err(ConfigError::ScaledDepthTooNarrow { depth: 4 })
        );
    }

    #[test]
    fn narrow_widths_stop_at_the_encoder_shift_limit() {
        assert_eq!(
            resolve(20, 20, ColorDepth::Bpp8),
            Ok((OutputMode::Mode640x480, Scale { h: 32, v: 24 }))
        );
        assert_eq!(
            resolve(16, 16, ColorDepth::Bpp8),
            Err(ConfigError::ScaleTooWide { h: 40 })
        );
        assert_eq!(
            resolve(2, 2, ColorDepth::Bpp8),
            Err(ConfigError::ScaleTooWide { h: 320 })
        );
    }

    #[test]
    fn unscaled_rows_must_fill_words() {
        assert_eq!(
            resolve(720, 400, ColorDepth::Bpp1),
            Err(ConfigError::UnalignedRow {
                width: 720,
                depth: 1
            })
        );
        assert!(resolve(720, 400, ColorDepth::Bpp2).is_ok());
    }

    #[test]
    fn config_error_converts_into_scanout_error() {
        let e: ScanoutError = ConfigError::InvalidPinout.into();
        assert_eq!(e, ScanoutError::Configuration(ConfigError::InvalidPinout));
    }
}

// ============================================================================
// Framebuffer
// ============================================================================

mod framebuffer {
    use super::*;

    #[test]
    fn pitch_rounds_up_to_words() {
        assert_eq!(pitch_words(640, ColorDepth::Bpp32), 640);
        assert_eq!(pitch_words(320, ColorDepth::Bpp16), 160);
        assert_eq!(pitch_words(360, ColorDepth::Bpp8), 90);
        assert_eq!(pitch_words(720, ColorDepth::Bpp1), 23);
    }

    #[test]
    fn storage_is_pitch_times_height() {
        let fb = Framebuffer::try_new(320, 240, ColorDepth::Bpp16).unwrap();
        assert_eq!(fb.len(), 160 * 240);
        assert!(fb.pitch() * 32 >= fb.width() * fb.depth().bits());
        assert!(fb.as_words().iter().all(|&w| w == 0));
    }

    #[test]
    fn rows_are_word_aligned_and_contiguous() {
        let mut fb = Framebuffer::try_new(360, 200, ColorDepth::Bpp8).unwrap();
        assert_eq!(fb.bus_addr() % 4, 0);
        assert_eq!(fb.row_addr(1).wrapping_sub(fb.row_addr(0)), 90 * 4);

        fb.row_mut(3).fill(0xdead_beef);
        assert_eq!(fb.row(3)[89], 0xdead_beef);
        assert_eq!(fb.row(2)[0], 0);
        assert_eq!(fb.as_words()[3 * 90], 0xdead_beef);
    }

    #[test]
    fn fill_overwrites_everything() {
        let mut fb = Framebuffer::try_new(640, 480, ColorDepth::Bpp1).unwrap();
        fb.fill(u32::MAX);
        assert!(fb.as_words().iter().all(|&w| w == u32::MAX));
    }
}

// ============================================================================
// Serial clock plan
// ============================================================================

mod clock_plan {
    use super::*;

    #[test]
    fn exact_divider() {
        let plan = plan_serial_clock(&TIMING_640X480, HertzU32::from_raw(251_750_000), 3);
        assert_eq!(plan.divider, 2);
        assert_eq!(plan.achieved.to_Hz(), 125_875_000);
        assert_eq!(plan.error_ppm(), 0);
        assert_eq!(plan.pixel_clock().to_Hz(), 25_175_000);
    }

    #[test]
    fn nearest_divider_reports_error() {
        let plan = plan_serial_clock(&TIMING_640X480, HertzU32::from_raw(264_000_000), 3);
        assert_eq!(plan.ideal.to_Hz(), 125_875_000);
        assert_eq!(plan.divider, 2);
        assert_eq!(plan.achieved.to_Hz(), 132_000_000);
        // (132_000_000 - 125_875_000) / 125_875_000
        assert_eq!(plan.error_ppm(), 48_659);
    }

    #[test]
    fn divider_is_clamped() {
        let slow = plan_serial_clock(&TIMING_640X480, HertzU32::from_raw(100_000_000), 3);
        assert_eq!(slow.divider, 1);
        assert!(slow.error_ppm() < 0);

        let fast = plan_serial_clock(&TIMING_640X480, HertzU32::from_raw(600_000_000), 3);
        assert_eq!(fast.divider, 3);
    }
}
