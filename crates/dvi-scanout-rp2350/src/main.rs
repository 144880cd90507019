//! RP2350 DVI scanout firmware
//!
//! Brings up clocks and heap, builds a scanout session on the HSTX pins of
//! the Adafruit Fruit Jam, then animates colour bars in the framebuffer.
//! Scanout itself runs on DMA; the only interrupt is the per-frame reload.

#![no_std]
#![no_main]

mod dma;
mod hstx;

use core::mem::MaybeUninit;
use core::ptr::addr_of_mut;

use defmt_rtt as _;
use embedded_alloc::LlffHeap as Heap;
use panic_probe as _;
use rp235x_hal as hal;

use embedded_hal::digital::OutputPin;
use fugit::HertzU32;
use hal::clocks::{Clock, ClocksManager};
use hal::pac::interrupt;
use hal::pll::{common_configs::PLL_USB_48MHZ, setup_pll_blocking, PLLConfig};
use hal::sio::Sio;
use hal::xosc::setup_xosc_blocking;

use dvi_scanout_core::{
    plan_serial_clock, ColorDepth, DviPinout, Framebuffer, OutputMode, ScanoutConfig,
    ScanoutSlot, Session,
};

use dma::{Rp2350Channel, Rp2350Dma};
use hstx::Rp2350Hstx;

/// Boot ROM image definition for Cortex-M33 secure mode.
#[link_section = ".start_block"]
#[used]
pub static IMAGE_DEF: hal::block::ImageDef = hal::block::ImageDef::secure_exe();

/// External crystal frequency.
const XTAL_FREQ_HZ: u32 = 12_000_000;

/// 12 MHz * 132 / 6 = 264 MHz; clk_hstx runs at clk_sys / 2.
const PLL_SYS_264MHZ: PLLConfig = PLLConfig {
    vco_freq: HertzU32::MHz(1584),
    refdiv: 1,
    post_div1: 6,
    post_div2: 1,
};

/// Framebuffer (38400 words at 640x240x8) plus descriptor program.
const HEAP_SIZE: usize = 192 * 1024;

/// Frames between frame-counter log lines.
const LOG_INTERVAL: u32 = 250;

const DEMO: ScanoutConfig = ScanoutConfig::new(640, 240, ColorDepth::Bpp8);

/// RGB332 bars: white, yellow, cyan, green, magenta, red, blue, black.
const BARS: [u8; 8] = [0xff, 0xfc, 0x1f, 0x1c, 0xe3, 0xe0, 0x03, 0x00];

#[global_allocator]
static HEAP: Heap = Heap::empty();

static mut HEAP_MEM: [MaybeUninit<u8>; HEAP_SIZE] = [MaybeUninit::uninit(); HEAP_SIZE];

/// The one scanout session's interrupt-side state.
static SCANOUT: ScanoutSlot<Rp2350Channel> = ScanoutSlot::new();

#[interrupt]
fn DMA_IRQ_2() {
    SCANOUT.on_frame_complete();
}

/// Draw vertical bars, scrolled left by `offset` words.
fn draw_bars(fb: &mut Framebuffer, offset: u32) {
    let pitch = fb.pitch();
    let bar_words = pitch / BARS.len() as u32;
    for y in 0..fb.height() {
        for (x, word) in fb.row_mut(y).iter_mut().enumerate() {
            let bar = ((x as u32 + offset) % pitch) / bar_words;
            let color = BARS[bar as usize % BARS.len()] as u32;
            *word = color * 0x0101_0101;
        }
    }
}

#[hal::entry]
fn main() -> ! {
    unsafe { HEAP.init(addr_of_mut!(HEAP_MEM) as usize, HEAP_SIZE) }

    defmt::info!("dvi-scanout-rp2350: starting");

    let mut pac = hal::pac::Peripherals::take().unwrap();

    let xosc = setup_xosc_blocking(pac.XOSC, HertzU32::from_raw(XTAL_FREQ_HZ)).unwrap();
    let mut clocks = ClocksManager::new(pac.CLOCKS);
    let pll_sys = setup_pll_blocking(
        pac.PLL_SYS,
        xosc.operating_frequency(),
        PLL_SYS_264MHZ,
        &mut clocks,
        &mut pac.RESETS,
    )
    .unwrap();
    let pll_usb = setup_pll_blocking(
        pac.PLL_USB,
        xosc.operating_frequency(),
        PLL_USB_48MHZ,
        &mut clocks,
        &mut pac.RESETS,
    )
    .unwrap();
    clocks.init_default(&xosc, &pll_sys, &pll_usb).unwrap();

    let sys_freq = clocks.system_clock.freq();
    let sio = Sio::new(pac.SIO);
    let pins = hal::gpio::Pins::new(
        pac.IO_BANK0,
        pac.PADS_BANK0,
        sio.gpio_bank0,
        &mut pac.RESETS,
    );

    // Error LED.
    let mut led = pins.gpio29.into_push_pull_output();

    // --- Encoder clock and pins ---
    let mode = match DEMO.resolve() {
        Ok(resolved) => resolved.mode,
        Err(_) => OutputMode::Mode640x480,
    };
    let plan = plan_serial_clock(mode.timing(), sys_freq, hstx::MAX_CLOCK_DIVIDER);
    defmt::info!(
        "clk_sys {} Hz, clk_hstx {} Hz / {} (ideal {} Hz, {} ppm)",
        sys_freq.to_Hz(),
        plan.achieved.to_Hz(),
        plan.divider,
        plan.ideal.to_Hz(),
        plan.error_ppm()
    );

    let mut encoder = Rp2350Hstx::new(pac.HSTX_CTRL, pac.HSTX_FIFO, &mut pac.RESETS);
    encoder.set_clock(&plan);
    encoder.route_pins();
    let mut dma = Rp2350Dma::new(pac.DMA, &mut pac.RESETS);

    // --- Scanout session ---
    let config = DEMO.with_pinout(DviPinout::FRUIT_JAM);
    let mut session = match Session::construct(&SCANOUT, &mut dma, &mut encoder, &config) {
        Ok(session) => session,
        Err(e) => {
            defmt::error!("scanout construct failed: {}", e);
            let core = unsafe { cortex_m::Peripherals::steal() };
            let mut delay = cortex_m::delay::Delay::new(core.SYST, sys_freq.to_Hz());
            loop {
                led.set_high().unwrap();
                delay.delay_ms(100);
                led.set_low().unwrap();
                delay.delay_ms(100);
            }
        }
    };

    let layout = session.program().layout();
    defmt::info!(
        "mode {}, scale {}, {} descriptors ({} words), {} mHz",
        session.mode(),
        session.scale(),
        layout.descriptor_count(),
        layout.word_count(),
        session.timing().frame_rate_millihertz()
    );

    draw_bars(session.framebuffer_mut(), 0);
    session.start();

    // --- Content loop: one redraw per displayed frame ---
    let mut last = session.frames();
    loop {
        let frames = session.frames();
        if frames == last {
            cortex_m::asm::wfi();
            continue;
        }
        last = frames;

        draw_bars(session.framebuffer_mut(), frames);

        if frames % LOG_INTERVAL == 0 {
            defmt::info!("frame {}", frames);
        }
    }
}
