#![no_std]

//! Platform abstraction for the DVI scanout engine.
//!
//! The engine needs exactly two kinds of peripheral: chainable transfer
//! (DMA) channels that can be reprogrammed by writing their own registers,
//! and a serial encoder that expands pixel words into TMDS symbols. Register
//! layouts stay behind these traits; the value types here carry only the
//! fields the engine decides.

/// Width of a single bus transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferSize {
    Byte,
    HalfWord,
    Word,
}

/// What paces a channel's transfers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pacing {
    /// Transfer as fast as the bus allows.
    Unpaced,
    /// Wait for the given peripheral data request line.
    Dreq(u8),
}

/// Which address of a channel wraps inside an aligned ring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RingTarget {
    Read,
    Write,
}

/// Address ring: the selected address wraps on a `1 << size_bits` byte boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ring {
    pub target: RingTarget,
    pub size_bits: u8,
}

/// Channel control fields, independent of how a platform packs them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelControl {
    pub size: TransferSize,
    pub incr_read: bool,
    pub incr_write: bool,
    pub ring: Option<Ring>,
    /// Channel to trigger when this one completes. `None` disables chaining.
    pub chain_to: Option<u8>,
    pub pacing: Pacing,
    /// Only raise the completion interrupt on a null trigger.
    pub irq_quiet: bool,
    pub byte_swap: bool,
    pub enable: bool,
}

impl ChannelControl {
    /// Word-sized, read-incrementing, unpaced, enabled, not chained.
    pub const fn new() -> Self {
        Self {
            size: TransferSize::Word,
            incr_read: true,
            incr_write: false,
            ring: None,
            chain_to: None,
            pacing: Pacing::Unpaced,
            irq_quiet: false,
            byte_swap: false,
            enable: true,
        }
    }
}

impl Default for ChannelControl {
    fn default() -> Self {
        Self::new()
    }
}

/// A contiguous window of a channel's own registers, in the order a
/// feeding channel writes them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterWindow {
    /// `TRANS_COUNT`, `READ_ADDR` (trigger).
    CountAndTrigger,
    /// `CTRL`, `WRITE_ADDR`, `TRANS_COUNT`, `READ_ADDR` (trigger).
    Full,
}

impl RegisterWindow {
    /// Number of 32-bit registers in the window.
    pub const fn words(self) -> u32 {
        match self {
            RegisterWindow::CountAndTrigger => 2,
            RegisterWindow::Full => 4,
        }
    }

    /// log2 of the window size in bytes, usable as a write ring size.
    pub const fn ring_bits(self) -> u8 {
        match self {
            RegisterWindow::CountAndTrigger => 3,
            RegisterWindow::Full => 4,
        }
    }
}

/// Addresses and length of one block transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transfer {
    pub read_addr: u32,
    pub write_addr: u32,
    pub count: u32,
}

/// A single claimed DMA-style transfer channel.
pub trait TransferChannel {
    /// Hardware channel number.
    fn number(&self) -> u8;

    /// Pack `control` into the channel's control register value.
    fn control_word(&self, control: &ChannelControl) -> u32;

    /// Bus address of the first register of `window` on this channel.
    fn register_window(&self, window: RegisterWindow) -> u32;

    /// Program control, addresses and count. Starts the channel only if
    /// `trigger` is set.
    fn configure(&mut self, control: &ChannelControl, transfer: &Transfer, trigger: bool);

    /// Write the control register (without triggering) and the write address.
    fn set_control(&mut self, control_word: u32, write_addr: u32);

    /// Point the read address at `read_addr` and trigger the channel.
    fn restart_from(&mut self, read_addr: u32);

    /// Clear this channel's pending completion interrupt.
    fn acknowledge_completion(&mut self);

    /// Stop any in-flight transfer.
    fn abort(&mut self);
}

/// Pool of transfer channels plus the controller-wide knobs the engine needs.
pub trait ChannelPool {
    type Channel: TransferChannel;

    /// Claim an unused channel, or `None` if the pool is exhausted.
    fn claim(&mut self) -> Option<Self::Channel>;

    /// Return a channel to the pool.
    fn release(&mut self, channel: Self::Channel);

    /// Route `channel`'s completion to the frame interrupt and unmask it at
    /// the highest priority.
    fn enable_completion_irq(&mut self, channel: u8);

    fn disable_completion_irq(&mut self, channel: u8);

    /// Give transfer traffic bus priority over the processors.
    fn prioritize_transfers(&mut self);
}

/// Bit expansion for one TMDS lane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LaneExpansion {
    /// Number of data bits fed to the lane's TMDS encoder (1..=8).
    pub width: u8,
    /// Right-rotation applied to the input word before the lane takes its bits.
    pub rotation: u8,
}

/// How the encoder consumes its 32-bit input words.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShiftProgram {
    /// Encoded-pixel shifts before the input word is empty (0 means 32).
    pub enc_shifts: u8,
    /// Bits shifted out per encoded pixel.
    pub enc_shift: u8,
    /// Shifts before a raw word is empty.
    pub raw_shifts: u8,
    /// Bits shifted out per raw shift.
    pub raw_shift: u8,
}

/// Serializer clocking: one symbol every `clkdiv` cycles, `shift` bits per cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SerializerClock {
    pub clkdiv: u8,
    pub n_shifts: u8,
    pub shift: u8,
}

/// What a single serial output bit (pin) drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputBit {
    /// The serial clock.
    Clock { invert: bool },
    /// Shift-register bits output in the first and second half of each cycle.
    Data { sel_p: u8, sel_n: u8, invert: bool },
}

/// Serial TMDS encoder with a command-expander input queue.
pub trait SerialEncoder {
    /// Stop the serializer and clear its control register.
    fn disable(&mut self);

    /// Program red/green/blue lane expansion, lane 0 first.
    fn set_expansion(&mut self, lanes: &[LaneExpansion; 3]);

    fn set_shift(&mut self, shift: &ShiftProgram);

    /// Assign output bit `bit` (0-based within the encoder's pins).
    fn set_output_bit(&mut self, bit: u8, output: OutputBit);

    /// Enable expansion and serialization with the given clocking.
    fn enable(&mut self, clock: &SerializerClock);

    /// Bus address of the input queue.
    fn fifo_addr(&self) -> u32;

    /// Data request line raised while the input queue has room.
    fn dreq(&self) -> u8;

    /// GPIO number of output bit 0.
    fn first_pin(&self) -> u8;

    /// Number of output bits, starting at `first_pin`.
    fn pin_count(&self) -> u8;
}
