//! RP2350 DMA: implements TransferChannel + ChannelPool over the raw channel
//! registers.
//!
//! The engine writes a channel's alias registers from another channel, so
//! everything here works in bus addresses rather than PAC accessors.

use core::ptr::{read_volatile, write_volatile};

use cortex_m::peripheral::NVIC;
use dvi_scanout_hal::{
    ChannelControl, ChannelPool, Pacing, RegisterWindow, RingTarget, Transfer, TransferChannel,
    TransferSize,
};
use rp235x_hal as hal;

use hal::pac;

pub const CHANNEL_COUNT: u8 = 16;

/// Per-channel register stride.
const CH_STRIDE: u32 = 0x40;

// Channel registers (offsets within one channel).
const READ_ADDR: u32 = 0x00;
const WRITE_ADDR: u32 = 0x04;
const TRANS_COUNT: u32 = 0x08;
const CTRL_TRIG: u32 = 0x0c;
const AL1_CTRL: u32 = 0x10;
const AL3_CTRL: u32 = 0x30;
const AL3_TRANS_COUNT: u32 = 0x38;
const AL3_READ_ADDR_TRIG: u32 = 0x3c;

// Controller-wide registers.
const INTE2: u32 = 0x424;
const INTS2: u32 = 0x42c;
const CHAN_ABORT: u32 = 0x464;

// CTRL fields.
const CTRL_EN: u32 = 1 << 0;
const CTRL_DATA_SIZE_LSB: u32 = 2;
const CTRL_INCR_READ: u32 = 1 << 4;
const CTRL_INCR_WRITE: u32 = 1 << 6;
const CTRL_RING_SIZE_LSB: u32 = 8;
const CTRL_RING_SEL: u32 = 1 << 12;
const CTRL_CHAIN_TO_LSB: u32 = 13;
const CTRL_TREQ_SEL_LSB: u32 = 17;
const CTRL_IRQ_QUIET: u32 = 1 << 23;
const CTRL_BSWAP: u32 = 1 << 24;

const TREQ_UNPACED: u32 = 0x3f;

fn dma_base() -> u32 {
    pac::DMA::PTR as usize as u32
}

/// # Safety
///
/// `addr` must be a DMA register the caller owns.
unsafe fn write_reg(addr: u32, value: u32) {
    write_volatile(addr as *mut u32, value);
}

/// # Safety
///
/// `addr` must be a readable DMA register.
unsafe fn read_reg(addr: u32) -> u32 {
    read_volatile(addr as *const u32)
}

/// A claimed DMA channel.
pub struct Rp2350Channel {
    number: u8,
}

impl Rp2350Channel {
    fn reg(&self, offset: u32) -> u32 {
        dma_base() + self.number as u32 * CH_STRIDE + offset
    }

    fn mask(&self) -> u32 {
        1 << self.number
    }
}

impl TransferChannel for Rp2350Channel {
    fn number(&self) -> u8 {
        self.number
    }

    fn control_word(&self, c: &ChannelControl) -> u32 {
        let mut word = 0;
        if c.enable {
            word |= CTRL_EN;
        }
        let size = match c.size {
            TransferSize::Byte => 0,
            TransferSize::HalfWord => 1,
            TransferSize::Word => 2,
        };
        word |= size << CTRL_DATA_SIZE_LSB;
        if c.incr_read {
            word |= CTRL_INCR_READ;
        }
        if c.incr_write {
            word |= CTRL_INCR_WRITE;
        }
        if let Some(ring) = c.ring {
            word |= (ring.size_bits as u32 & 0xf) << CTRL_RING_SIZE_LSB;
            if ring.target == RingTarget::Write {
                word |= CTRL_RING_SEL;
            }
        }
        // Chaining to itself disables chaining.
        let chain = c.chain_to.unwrap_or(self.number);
        word |= (chain as u32 & 0xf) << CTRL_CHAIN_TO_LSB;
        let treq = match c.pacing {
            Pacing::Dreq(dreq) => dreq as u32 & 0x3f,
            Pacing::Unpaced => TREQ_UNPACED,
        };
        word |= treq << CTRL_TREQ_SEL_LSB;
        if c.irq_quiet {
            word |= CTRL_IRQ_QUIET;
        }
        if c.byte_swap {
            word |= CTRL_BSWAP;
        }
        word
    }

    fn register_window(&self, window: RegisterWindow) -> u32 {
        match window {
            RegisterWindow::CountAndTrigger => self.reg(AL3_TRANS_COUNT),
            RegisterWindow::Full => self.reg(AL3_CTRL),
        }
    }

    fn configure(&mut self, control: &ChannelControl, transfer: &Transfer, trigger: bool) {
        let ctrl = self.control_word(control);
        unsafe {
            write_reg(self.reg(READ_ADDR), transfer.read_addr);
            write_reg(self.reg(WRITE_ADDR), transfer.write_addr);
            write_reg(self.reg(TRANS_COUNT), transfer.count);
            if trigger {
                write_reg(self.reg(CTRL_TRIG), ctrl);
            } else {
                write_reg(self.reg(AL1_CTRL), ctrl);
            }
        }
    }

    fn set_control(&mut self, control_word: u32, write_addr: u32) {
        unsafe {
            write_reg(self.reg(AL1_CTRL), control_word);
            write_reg(self.reg(WRITE_ADDR), write_addr);
        }
    }

    fn restart_from(&mut self, read_addr: u32) {
        unsafe { write_reg(self.reg(AL3_READ_ADDR_TRIG), read_addr) };
    }

    fn acknowledge_completion(&mut self) {
        // INTS2 is write-one-to-clear.
        unsafe { write_reg(dma_base() + INTS2, self.mask()) };
    }

    fn abort(&mut self) {
        let abort = dma_base() + CHAN_ABORT;
        unsafe {
            write_reg(self.reg(AL1_CTRL), 0);
            write_reg(abort, self.mask());
            while read_reg(abort) & self.mask() != 0 {}
        }
    }
}

/// Owner of the DMA block; hands out channels by number.
pub struct Rp2350Dma {
    _dma: pac::DMA,
    free: u16,
}

impl Rp2350Dma {
    /// Take the DMA block out of reset with every channel free.
    pub fn new(dma: pac::DMA, resets: &mut pac::RESETS) -> Self {
        resets.reset().modify(|_, w| w.dma().clear_bit());
        while resets.reset_done().read().dma().bit_is_clear() {}
        Self {
            _dma: dma,
            free: u16::MAX,
        }
    }
}

impl ChannelPool for Rp2350Dma {
    type Channel = Rp2350Channel;

    fn claim(&mut self) -> Option<Rp2350Channel> {
        if self.free == 0 {
            return None;
        }
        let number = self.free.trailing_zeros() as u8;
        self.free &= !(1 << number);
        Some(Rp2350Channel { number })
    }

    fn release(&mut self, channel: Rp2350Channel) {
        self.free |= 1 << channel.number;
    }

    fn enable_completion_irq(&mut self, channel: u8) {
        let mask = 1 << channel;
        unsafe {
            write_reg(dma_base() + INTS2, mask);
            let inte = dma_base() + INTE2;
            write_reg(inte, read_reg(inte) | mask);

            let mut core = cortex_m::Peripherals::steal();
            // Highest priority: the reload must land inside vertical blanking.
            core.NVIC.set_priority(pac::Interrupt::DMA_IRQ_2, 0);
            NVIC::unmask(pac::Interrupt::DMA_IRQ_2);
        }
    }

    fn disable_completion_irq(&mut self, channel: u8) {
        let inte = dma_base() + INTE2;
        unsafe {
            write_reg(inte, read_reg(inte) & !(1 << channel));
            if read_reg(inte) == 0 {
                NVIC::mask(pac::Interrupt::DMA_IRQ_2);
            }
        }
    }

    fn prioritize_transfers(&mut self) {
        let busctrl = unsafe { &*pac::BUSCTRL::ptr() };
        busctrl
            .bus_priority()
            .write(|w| w.dma_r().set_bit().dma_w().set_bit());
    }
}
