//! Transfer engine: a command channel feeding a pixel channel.
//!
//! The pixel channel streams command lists and framebuffer rows into the
//! encoder queue, paced by the encoder's data request, and chains to the
//! command channel after each block. The command channel copies the next
//! descriptor from the program into the pixel channel's register window; its
//! write address wraps over that window so every descriptor lands in the
//! same registers. The command channel never chains to itself: a frame ends
//! on the program's null descriptor and the frame interrupt restarts it.

use dvi_scanout_hal::{
    ChannelControl, ChannelPool, Pacing, Ring, RingTarget, Transfer, TransferChannel, TransferSize,
};

use crate::error::ScanoutError;
use crate::geometry::{ColorDepth, Scale};
use crate::program::{DescriptorProgram, ProgramLayout, SegmentControls};

/// The two channels a session owns.
pub struct ChannelPair<C> {
    pub command: C,
    pub pixel: C,
}

impl<C: TransferChannel> ChannelPair<C> {
    /// Claim both channels or neither.
    pub fn claim<P: ChannelPool<Channel = C>>(pool: &mut P) -> Result<Self, ScanoutError> {
        let pixel = pool.claim().ok_or(ScanoutError::ChannelUnavailable)?;
        match pool.claim() {
            Some(command) => Ok(Self { command, pixel }),
            None => {
                pool.release(pixel);
                Err(ScanoutError::ChannelUnavailable)
            }
        }
    }

    pub fn release<P: ChannelPool<Channel = C>>(mut self, pool: &mut P) {
        self.command.abort();
        self.pixel.abort();
        pool.release(self.command);
        pool.release(self.pixel);
    }

    /// Control for blanking and header lists: word transfers into the
    /// encoder queue, chaining back to the command channel.
    pub fn command_list_control(&self, dreq: u8) -> ChannelControl {
        ChannelControl {
            size: TransferSize::Word,
            incr_read: true,
            incr_write: false,
            ring: None,
            chain_to: Some(self.command.number()),
            pacing: Pacing::Dreq(dreq),
            irq_quiet: true,
            byte_swap: false,
            enable: true,
        }
    }

    /// Control for framebuffer rows. Scaled rows move one pixel per
    /// transfer; the bus replicates it across the encoder word.
    pub fn row_control(&self, dreq: u8, depth: ColorDepth, scale: Scale, byte_swap: bool) -> ChannelControl {
        let size = if scale.h > 1 {
            match depth {
                ColorDepth::Bpp32 => TransferSize::Word,
                ColorDepth::Bpp16 => TransferSize::HalfWord,
                _ => TransferSize::Byte,
            }
        } else {
            TransferSize::Word
        };
        ChannelControl {
            size,
            byte_swap,
            ..self.command_list_control(dreq)
        }
    }

    /// Control for the terminating null descriptor: quiet so the null
    /// trigger raises the frame interrupt, unchained so nothing follows.
    pub fn terminal_control(&self) -> ChannelControl {
        ChannelControl {
            irq_quiet: true,
            enable: true,
            ..ChannelControl::new()
        }
    }

    /// Packed control words the program embeds when the layout needs them.
    pub fn segment_controls(
        &self,
        dreq: u8,
        fifo_addr: u32,
        depth: ColorDepth,
        scale: Scale,
        byte_swap: bool,
    ) -> SegmentControls {
        SegmentControls {
            command: self.pixel.control_word(&self.command_list_control(dreq)),
            pixel: self
                .pixel
                .control_word(&self.row_control(dreq, depth, scale, byte_swap)),
            terminal: self.pixel.control_word(&self.terminal_control()),
            write_addr: fifo_addr,
        }
    }

    /// Arm both channels for `program`. Nothing moves until the first
    /// frame restart.
    pub fn prepare(&mut self, program: &DescriptorProgram, dreq: u8, fifo_addr: u32) {
        let layout: &ProgramLayout = program.layout();

        if !layout.embeds_control() {
            let control = self.pixel.control_word(&self.command_list_control(dreq));
            self.pixel.set_control(control, fifo_addr);
        }

        let window = layout.window;
        let command = ChannelControl {
            size: TransferSize::Word,
            incr_read: true,
            incr_write: true,
            ring: Some(Ring {
                target: RingTarget::Write,
                size_bits: window.ring_bits(),
            }),
            chain_to: None,
            pacing: Pacing::Unpaced,
            irq_quiet: false,
            byte_swap: false,
            enable: true,
        };
        let transfer = Transfer {
            read_addr: program.base_addr(),
            write_addr: self.pixel.register_window(window),
            count: window.words(),
        };
        self.command.configure(&command, &transfer, false);
    }
}
