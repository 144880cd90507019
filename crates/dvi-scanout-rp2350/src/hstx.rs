//! RP2350 HSTX: implements SerialEncoder over HSTX_CTRL, plus the clock and
//! pad setup the encoder needs before a session is constructed.

use core::ptr::{read_volatile, write_volatile};

use dvi_scanout_core::SerialClockPlan;
use dvi_scanout_hal::{LaneExpansion, OutputBit, SerialEncoder, SerializerClock, ShiftProgram};
use rp235x_hal as hal;

use hal::pac;

/// First GPIO driven by HSTX output bit 0.
pub const FIRST_PIN: u8 = 12;
pub const PIN_COUNT: u8 = 8;

/// DMA data request raised while the HSTX FIFO has room.
pub const DREQ_HSTX: u8 = 52;

/// Largest integer divider of CLK_HSTX_DIV.
pub const MAX_CLOCK_DIVIDER: u32 = 3;

// HSTX_CTRL registers.
const CSR: u32 = 0x00;
const BIT0: u32 = 0x04;
const EXPAND_SHIFT: u32 = 0x24;
const EXPAND_TMDS: u32 = 0x28;

const CSR_EN: u32 = 1 << 0;
const CSR_EXPAND_EN: u32 = 1 << 1;
const CSR_SHIFT_LSB: u32 = 8;
const CSR_N_SHIFTS_LSB: u32 = 16;
const CSR_CLKDIV_LSB: u32 = 28;

const BIT_SEL_N_LSB: u32 = 8;
const BIT_INV: u32 = 1 << 16;
const BIT_CLK: u32 = 1 << 17;

// HSTX_FIFO registers.
const FIFO: u32 = 0x04;

// CLOCKS registers.
const CLK_HSTX_CTRL: u32 = 0x54;
const CLK_HSTX_DIV: u32 = 0x58;
const CLK_HSTX_CTRL_ENABLE: u32 = 1 << 11;
const CLK_HSTX_DIV_INT_LSB: u32 = 16;

// IO_BANK0 / PADS_BANK0.
const FUNCSEL_HSTX: u32 = 0;
const PAD_OD: u32 = 1 << 7;
const PAD_ISO: u32 = 1 << 8;

unsafe fn write_reg(addr: u32, value: u32) {
    write_volatile(addr as *mut u32, value);
}

unsafe fn read_reg(addr: u32) -> u32 {
    read_volatile(addr as *const u32)
}

/// Owner of the HSTX control and FIFO blocks.
pub struct Rp2350Hstx {
    _ctrl: pac::HSTX_CTRL,
    _fifo: pac::HSTX_FIFO,
}

impl Rp2350Hstx {
    pub fn new(ctrl: pac::HSTX_CTRL, fifo: pac::HSTX_FIFO, resets: &mut pac::RESETS) -> Self {
        resets.reset().modify(|_, w| w.hstx().clear_bit());
        while resets.reset_done().read().hstx().bit_is_clear() {}
        Self {
            _ctrl: ctrl,
            _fifo: fifo,
        }
    }

    fn reg(offset: u32) -> u32 {
        pac::HSTX_CTRL::PTR as usize as u32 + offset
    }

    /// Run clk_hstx from clk_sys at the planned divider.
    pub fn set_clock(&mut self, plan: &SerialClockPlan) {
        let clocks = pac::CLOCKS::PTR as usize as u32;
        unsafe {
            // Stop before changing the divider; AUXSRC 0 is clk_sys.
            write_reg(clocks + CLK_HSTX_CTRL, 0);
            write_reg(clocks + CLK_HSTX_DIV, plan.divider << CLK_HSTX_DIV_INT_LSB);
            write_reg(clocks + CLK_HSTX_CTRL, CLK_HSTX_CTRL_ENABLE);
        }
    }

    /// Hand every HSTX-capable GPIO to the encoder.
    pub fn route_pins(&mut self) {
        let io = pac::IO_BANK0::PTR as usize as u32;
        let pads = pac::PADS_BANK0::PTR as usize as u32;
        for pin in FIRST_PIN as u32..(FIRST_PIN + PIN_COUNT) as u32 {
            unsafe {
                write_reg(io + 8 * pin + 4, FUNCSEL_HSTX);
                let pad = pads + 4 + 4 * pin;
                write_reg(pad, read_reg(pad) & !(PAD_OD | PAD_ISO));
            }
        }
    }
}

impl SerialEncoder for Rp2350Hstx {
    fn disable(&mut self) {
        unsafe { write_reg(Self::reg(CSR), 0) };
    }

    fn set_expansion(&mut self, lanes: &[LaneExpansion; 3]) {
        let mut tmds = 0;
        for (i, lane) in lanes.iter().enumerate() {
            let field = (lane.rotation as u32 & 0x1f) | ((lane.width as u32 - 1) & 0x7) << 5;
            tmds |= field << (8 * i);
        }
        unsafe { write_reg(Self::reg(EXPAND_TMDS), tmds) };
    }

    fn set_shift(&mut self, shift: &ShiftProgram) {
        let value = (shift.raw_shift as u32 & 0x1f)
            | (shift.raw_shifts as u32 & 0x1f) << 8
            | (shift.enc_shift as u32 & 0x1f) << 16
            | (shift.enc_shifts as u32 & 0x1f) << 24;
        unsafe { write_reg(Self::reg(EXPAND_SHIFT), value) };
    }

    fn set_output_bit(&mut self, bit: u8, output: OutputBit) {
        let value = match output {
            OutputBit::Clock { invert } => BIT_CLK | if invert { BIT_INV } else { 0 },
            OutputBit::Data {
                sel_p,
                sel_n,
                invert,
            } => {
                (sel_p as u32 & 0x1f)
                    | (sel_n as u32 & 0x1f) << BIT_SEL_N_LSB
                    | if invert { BIT_INV } else { 0 }
            }
        };
        unsafe { write_reg(Self::reg(BIT0 + 4 * bit as u32), value) };
    }

    fn enable(&mut self, clock: &SerializerClock) {
        let csr = CSR_EXPAND_EN
            | (clock.clkdiv as u32 & 0xf) << CSR_CLKDIV_LSB
            | (clock.n_shifts as u32 & 0x1f) << CSR_N_SHIFTS_LSB
            | (clock.shift as u32 & 0x1f) << CSR_SHIFT_LSB
            | CSR_EN;
        unsafe { write_reg(Self::reg(CSR), csr) };
    }

    fn fifo_addr(&self) -> u32 {
        pac::HSTX_FIFO::PTR as usize as u32 + FIFO
    }

    fn dreq(&self) -> u8 {
        DREQ_HSTX
    }

    fn first_pin(&self) -> u8 {
        FIRST_PIN
    }

    fn pin_count(&self) -> u8 {
        PIN_COUNT
    }
}
