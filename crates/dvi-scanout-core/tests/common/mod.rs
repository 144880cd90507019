//! Mock transfer channels and serial encoder shared by the integration tests.
//!
//! Channels and the pool share one `Rc<RefCell<Hardware>>` that records every
//! register-level call, so a test can keep a handle after the session takes
//! ownership of the channels.
#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use dvi_scanout_hal::{
    ChannelControl, ChannelPool, LaneExpansion, OutputBit, Pacing, RegisterWindow, RingTarget,
    SerialEncoder, SerializerClock, ShiftProgram, Transfer, TransferChannel, TransferSize,
};

pub const DMA_BASE: u32 = 0x5000_0000;
pub const CHANNEL_STRIDE: u32 = 0x40;
pub const FIFO_ADDR: u32 = 0x5060_0004;
pub const DREQ_ENCODER: u8 = 52;
pub const FIRST_PIN: u8 = 12;
pub const PIN_COUNT: u8 = 8;

/// Register-level call recorded by a mock channel or pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Call {
    Configure {
        channel: u8,
        control: ChannelControl,
        transfer: Transfer,
        trigger: bool,
    },
    SetControl {
        channel: u8,
        word: u32,
        write_addr: u32,
    },
    Restart {
        channel: u8,
        read_addr: u32,
    },
    Acknowledge(u8),
    Abort(u8),
    EnableIrq(u8),
    DisableIrq(u8),
    Prioritize,
}

#[derive(Debug, Default)]
pub struct Hardware {
    pub calls: Vec<Call>,
    /// Unclaimed channel numbers.
    pub free: Vec<u8>,
    /// Current read address per channel.
    pub read_addr: [u32; 16],
    /// Channels whose completion interrupt is routed.
    pub irq_mask: u16,
    pub prioritized: bool,
}

/// Pack control fields the way the RP2350 `CTRL` register lays them out.
/// An unchained control chains to its own channel `own`.
pub fn pack_control(c: &ChannelControl, own: u8) -> u32 {
    let mut word = 0;
    if c.enable {
        word |= 1;
    }
    word |= match c.size {
        TransferSize::Byte => 0,
        TransferSize::HalfWord => 1,
        TransferSize::Word => 2,
    } << 2;
    if c.incr_read {
        word |= 1 << 4;
    }
    if c.incr_write {
        word |= 1 << 6;
    }
    if let Some(ring) = c.ring {
        word |= (ring.size_bits as u32) << 8;
        if ring.target == RingTarget::Write {
            word |= 1 << 12;
        }
    }
    word |= (c.chain_to.unwrap_or(own) as u32) << 13;
    word |= match c.pacing {
        Pacing::Dreq(n) => n as u32,
        Pacing::Unpaced => 0x3f,
    } << 17;
    if c.irq_quiet {
        word |= 1 << 23;
    }
    if c.byte_swap {
        word |= 1 << 24;
    }
    word
}

pub fn ctrl_chain_to(word: u32) -> u8 {
    ((word >> 13) & 0xf) as u8
}

pub fn ctrl_data_size(word: u32) -> u32 {
    (word >> 2) & 0x3
}

pub fn ctrl_bswap(word: u32) -> bool {
    word & (1 << 24) != 0
}

pub fn ctrl_irq_quiet(word: u32) -> bool {
    word & (1 << 23) != 0
}

pub fn ctrl_treq(word: u32) -> u8 {
    ((word >> 17) & 0x3f) as u8
}

pub struct MockChannel {
    number: u8,
    hw: Rc<RefCell<Hardware>>,
}

impl TransferChannel for MockChannel {
    fn number(&self) -> u8 {
        self.number
    }

    fn control_word(&self, control: &ChannelControl) -> u32 {
        pack_control(control, self.number)
    }

    fn register_window(&self, window: RegisterWindow) -> u32 {
        let base = DMA_BASE + self.number as u32 * CHANNEL_STRIDE;
        match window {
            RegisterWindow::CountAndTrigger => base + 0x38,
            RegisterWindow::Full => base + 0x30,
        }
    }

    fn configure(&mut self, control: &ChannelControl, transfer: &Transfer, trigger: bool) {
        let mut hw = self.hw.borrow_mut();
        hw.read_addr[self.number as usize] = transfer.read_addr;
        hw.calls.push(Call::Configure {
            channel: self.number,
            control: *control,
            transfer: *transfer,
            trigger,
        });
    }

    fn set_control(&mut self, word: u32, write_addr: u32) {
        self.hw.borrow_mut().calls.push(Call::SetControl {
            channel: self.number,
            word,
            write_addr,
        });
    }

    fn restart_from(&mut self, read_addr: u32) {
        let mut hw = self.hw.borrow_mut();
        hw.read_addr[self.number as usize] = read_addr;
        hw.calls.push(Call::Restart {
            channel: self.number,
            read_addr,
        });
    }

    fn acknowledge_completion(&mut self) {
        self.hw.borrow_mut().calls.push(Call::Acknowledge(self.number));
    }

    fn abort(&mut self) {
        self.hw.borrow_mut().calls.push(Call::Abort(self.number));
    }
}

pub struct MockPool {
    hw: Rc<RefCell<Hardware>>,
}

impl MockPool {
    /// Pool with channels `0..count` free.
    pub fn with_channels(count: u8) -> Self {
        let hw = Hardware {
            // Claimed lowest first.
            free: (0..count).rev().collect(),
            ..Hardware::default()
        };
        Self {
            hw: Rc::new(RefCell::new(hw)),
        }
    }

    /// Inspection handle that stays usable while a session borrows the pool.
    pub fn probe(&self) -> Probe {
        Probe(Rc::clone(&self.hw))
    }
}

#[derive(Clone)]
pub struct Probe(Rc<RefCell<Hardware>>);

impl Probe {
    pub fn free_count(&self) -> usize {
        self.0.borrow().free.len()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.0.borrow().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.0.borrow_mut().calls.clear();
    }

    pub fn read_addr(&self, channel: u8) -> u32 {
        self.0.borrow().read_addr[channel as usize]
    }

    pub fn irq_mask(&self) -> u16 {
        self.0.borrow().irq_mask
    }

    pub fn prioritized(&self) -> bool {
        self.0.borrow().prioritized
    }
}

impl ChannelPool for MockPool {
    type Channel = MockChannel;

    fn claim(&mut self) -> Option<MockChannel> {
        let number = self.hw.borrow_mut().free.pop()?;
        Some(MockChannel {
            number,
            hw: Rc::clone(&self.hw),
        })
    }

    fn release(&mut self, channel: MockChannel) {
        self.hw.borrow_mut().free.push(channel.number);
    }

    fn enable_completion_irq(&mut self, channel: u8) {
        let mut hw = self.hw.borrow_mut();
        hw.irq_mask |= 1 << channel;
        hw.calls.push(Call::EnableIrq(channel));
    }

    fn disable_completion_irq(&mut self, channel: u8) {
        let mut hw = self.hw.borrow_mut();
        hw.irq_mask &= !(1 << channel);
        hw.calls.push(Call::DisableIrq(channel));
    }

    fn prioritize_transfers(&mut self) {
        let mut hw = self.hw.borrow_mut();
        hw.prioritized = true;
        hw.calls.push(Call::Prioritize);
    }
}

/// Encoder that keeps the last value written to each setting.
#[derive(Debug)]
pub struct MockEncoder {
    pub enabled: Option<SerializerClock>,
    pub disables: u32,
    pub expansion: Option<[LaneExpansion; 3]>,
    pub shift: Option<ShiftProgram>,
    pub bits: [Option<OutputBit>; 8],
    pub first_pin: u8,
    pub pin_count: u8,
}

impl Default for MockEncoder {
    fn default() -> Self {
        Self {
            enabled: None,
            disables: 0,
            expansion: None,
            shift: None,
            bits: [None; 8],
            first_pin: FIRST_PIN,
            pin_count: PIN_COUNT,
        }
    }
}

impl SerialEncoder for MockEncoder {
    fn disable(&mut self) {
        self.enabled = None;
        self.disables += 1;
    }

    fn set_expansion(&mut self, lanes: &[LaneExpansion; 3]) {
        self.expansion = Some(*lanes);
    }

    fn set_shift(&mut self, shift: &ShiftProgram) {
        self.shift = Some(*shift);
    }

    fn set_output_bit(&mut self, bit: u8, output: OutputBit) {
        self.bits[bit as usize] = Some(output);
    }

    fn enable(&mut self, clock: &SerializerClock) {
        self.enabled = Some(*clock);
    }

    fn fifo_addr(&self) -> u32 {
        FIFO_ADDR
    }

    fn dreq(&self) -> u8 {
        DREQ_ENCODER
    }

    fn first_pin(&self) -> u8 {
        self.first_pin
    }

    fn pin_count(&self) -> u8 {
        self.pin_count
    }
}
