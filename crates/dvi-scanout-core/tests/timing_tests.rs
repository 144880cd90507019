//! Timing table and canned line pattern tests.

use dvi_scanout_core::patterns::{
    sync_symbol, Command, LinePatterns, ACTIVE_HEADER_LEN, BLANK_LINE_LEN, TMDS_CTRL_00,
    TMDS_CTRL_01, TMDS_CTRL_10, TMDS_CTRL_11,
};
use dvi_scanout_core::timing::{
    timing_for, OutputMode, SyncPolarity, VerticalBand, TIMING_640X480, TIMING_720X400,
};

// ============================================================================
// Timing table
// ============================================================================

mod table {
    use super::*;

    #[test]
    fn both_modes_share_800x625_totals() {
        for mode in OutputMode::ALL {
            let t = mode.timing();
            assert_eq!(t.h_total(), 800);
            assert_eq!(t.v_total(), 625);
        }
    }

    #[test]
    fn mode_640_values() {
        let t = timing_for(OutputMode::Mode640x480);
        assert_eq!(
            (t.h_front_porch, t.h_sync_width, t.h_back_porch, t.h_active),
            (16, 96, 48, 640)
        );
        assert_eq!(
            (t.v_front_porch, t.v_sync_width, t.v_back_porch, t.v_active),
            (10, 2, 133, 480)
        );
        assert_eq!(t.h_sync_polarity, SyncPolarity::Negative);
        assert_eq!(t.v_sync_polarity, SyncPolarity::Negative);
    }

    #[test]
    fn mode_720_values() {
        let t = timing_for(OutputMode::Mode720x400);
        assert_eq!(
            (t.h_front_porch, t.h_sync_width, t.h_back_porch, t.h_active),
            (8, 32, 40, 720)
        );
        assert_eq!(
            (t.v_front_porch, t.v_sync_width, t.v_back_porch, t.v_active),
            (3, 4, 218, 400)
        );
    }

    #[test]
    fn lookup_matches_constants() {
        assert_eq!(*timing_for(OutputMode::Mode640x480), TIMING_640X480);
        assert_eq!(*OutputMode::Mode720x400.timing(), TIMING_720X400);
    }

    #[test]
    fn narrower_mode_is_tried_first() {
        assert_eq!(OutputMode::ALL[0], OutputMode::Mode640x480);
    }

    #[test]
    fn serial_clock_is_five_times_pixel_clock() {
        assert_eq!(TIMING_640X480.serial_clock().to_Hz(), 125_875_000);
        assert_eq!(TIMING_720X400.serial_clock().to_Hz(), 125_875_000);
    }

    #[test]
    fn frame_rate_is_about_50_hz() {
        // 25_175_000 / (800 * 625)
        assert_eq!(TIMING_640X480.frame_rate_millihertz(), 50_350);
    }
}

// ============================================================================
// Vertical bands
// ============================================================================

mod bands {
    use super::*;

    #[test]
    fn order_is_sync_back_porch_active_front_porch() {
        let t = &TIMING_640X480;
        assert_eq!(t.band(0), VerticalBand::Sync);
        assert_eq!(t.band(1), VerticalBand::Sync);
        assert_eq!(t.band(2), VerticalBand::BackPorch);
        assert_eq!(t.band(134), VerticalBand::BackPorch);
        assert_eq!(t.band(135), VerticalBand::Active);
        assert_eq!(t.band(614), VerticalBand::Active);
        assert_eq!(t.band(615), VerticalBand::FrontPorch);
        assert_eq!(t.band(624), VerticalBand::FrontPorch);
    }

    #[test]
    fn band_sizes_match_table() {
        for mode in OutputMode::ALL {
            let t = mode.timing();
            let count = |band| (0..t.v_total()).filter(|&l| t.band(l) == band).count() as u32;
            assert_eq!(count(VerticalBand::Sync), t.v_sync_width);
            assert_eq!(count(VerticalBand::BackPorch), t.v_back_porch);
            assert_eq!(count(VerticalBand::Active), t.v_active);
            assert_eq!(count(VerticalBand::FrontPorch), t.v_front_porch);
        }
    }

    #[test]
    fn active_window_bounds() {
        let t = &TIMING_720X400;
        assert_eq!(t.active_start(), 222);
        assert_eq!(t.front_porch_start(), 622);
    }
}

// ============================================================================
// Line patterns
// ============================================================================

mod line_patterns {
    use super::*;

    fn lane0(symbol: u32) -> u32 {
        symbol & 0x3ff
    }

    #[test]
    fn command_words() {
        assert_eq!(Command::RawRepeat.word(16), 0x1010);
        assert_eq!(Command::Tmds.word(640), 0x2280);
        assert_eq!(Command::Nop.word(0), 0xf000);
        assert_eq!(Command::Raw.word(1), 0x0001);
        assert_eq!(Command::TmdsRepeat.word(2), 0x3002);
    }

    #[test]
    fn sync_symbol_lanes_1_and_2_idle() {
        let s = sync_symbol(true, false);
        assert_eq!(lane0(s), TMDS_CTRL_10);
        assert_eq!((s >> 10) & 0x3ff, TMDS_CTRL_00);
        assert_eq!((s >> 20) & 0x3ff, TMDS_CTRL_00);
        assert_eq!(lane0(sync_symbol(false, false)), TMDS_CTRL_00);
        assert_eq!(lane0(sync_symbol(false, true)), TMDS_CTRL_01);
        assert_eq!(lane0(sync_symbol(true, true)), TMDS_CTRL_11);
    }

    #[test]
    fn vsync_on_line_for_negative_polarity() {
        let p = LinePatterns::new(&TIMING_640X480);
        assert_eq!(p.vsync_on.len(), BLANK_LINE_LEN);
        assert_eq!(
            p.vsync_on,
            [
                0x1010,
                sync_symbol(false, true),
                0x1060,
                sync_symbol(false, false),
                Command::RawRepeat.word(48 + 640),
                sync_symbol(false, true),
            ]
        );
    }

    #[test]
    fn vsync_off_line_holds_vsync_high() {
        let p = LinePatterns::new(&TIMING_640X480);
        assert_eq!(lane0(p.vsync_off[1]), TMDS_CTRL_11);
        assert_eq!(lane0(p.vsync_off[3]), TMDS_CTRL_10);
        assert_eq!(lane0(p.vsync_off[5]), TMDS_CTRL_11);
    }

    #[test]
    fn active_header_ends_with_pixel_command() {
        for mode in OutputMode::ALL {
            let t = mode.timing();
            let p = mode.patterns();
            assert_eq!(p.active.len(), ACTIVE_HEADER_LEN);
            assert_eq!(p.active[0], Command::RawRepeat.word(t.h_front_porch));
            assert_eq!(p.active[2], Command::Nop.word(0));
            assert_eq!(p.active[3], Command::RawRepeat.word(t.h_sync_width));
            assert_eq!(p.active[6], Command::RawRepeat.word(t.h_back_porch));
            assert_eq!(p.active[8], Command::Tmds.word(t.h_active));
        }
    }

    #[test]
    fn static_patterns_match_fresh_build() {
        assert_eq!(
            *OutputMode::Mode720x400.patterns(),
            LinePatterns::new(&TIMING_720X400)
        );
    }

    #[test]
    fn pattern_addresses_are_distinct() {
        let a = OutputMode::Mode640x480.patterns().addrs();
        assert_ne!(a.vsync_on, a.vsync_off);
        assert_ne!(a.vsync_off, a.active);
        let b = OutputMode::Mode720x400.patterns().addrs();
        assert_ne!(a.active, b.active);
    }
}
