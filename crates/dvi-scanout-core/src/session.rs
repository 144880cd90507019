//! Scanout session: the one live binding of framebuffer, mode, program and
//! channels.
//!
//! `construct` validates, allocates, claims and programs everything but
//! moves no data. `start` hands the channels to the frame interrupt and
//! kicks the first frame. Dropping the session (or `shutdown`) stops
//! scanout and returns every hardware resource.

use dvi_scanout_hal::{ChannelPool, SerialEncoder, TransferChannel};

use crate::encoder::{self, EncoderSettings};
use crate::engine::ChannelPair;
use crate::error::ScanoutError;
use crate::framebuffer::Framebuffer;
use crate::geometry::{Resolved, Scale, ScanoutConfig};
use crate::program::{DescriptorProgram, ProgramLayout, ProgramParams};
use crate::reload::{FrameReloader, ScanoutSlot};
use crate::timing::{OutputMode, Timing};

pub struct Session<'a, P: ChannelPool> {
    slot: &'a ScanoutSlot<P::Channel>,
    pool: &'a mut P,
    framebuffer: Framebuffer,
    program: DescriptorProgram,
    resolved: Resolved,
    encoder: EncoderSettings,
    pixel_channel: u8,
    /// Held here until `start`, then owned by the frame interrupt.
    channels: Option<ChannelPair<P::Channel>>,
}

impl<'a, P: ChannelPool> Session<'a, P> {
    /// Build a stopped session. On any error nothing stays allocated or
    /// claimed, and an existing session is left untouched.
    pub fn construct<E: SerialEncoder>(
        slot: &'a ScanoutSlot<P::Channel>,
        pool: &'a mut P,
        encoder: &mut E,
        config: &ScanoutConfig,
    ) -> Result<Self, ScanoutError> {
        slot.claim()?;
        match Self::setup(slot, pool, encoder, config) {
            Ok(session) => Ok(session),
            Err(e) => {
                slot.release();
                Err(e)
            }
        }
    }

    fn setup<E: SerialEncoder>(
        slot: &'a ScanoutSlot<P::Channel>,
        pool: &'a mut P,
        encoder: &mut E,
        config: &ScanoutConfig,
    ) -> Result<Self, ScanoutError> {
        let resolved = config.resolve()?;
        let timing = resolved.mode.timing();
        let scale = resolved.scale;
        let settings = encoder::settings(config.depth, scale)?;
        let outputs = encoder::encoder_output_bits(encoder, &config.pinout)?;

        let framebuffer = Framebuffer::try_new(config.width, config.height, config.depth)?;
        let mut program = DescriptorProgram::with_layout(ProgramLayout::new(timing, scale))?;
        let mut channels = ChannelPair::claim(&mut *pool)?;

        encoder::configure(encoder, &settings, &outputs);

        let dreq = encoder.dreq();
        let fifo_addr = encoder.fifo_addr();
        let controls =
            channels.segment_controls(dreq, fifo_addr, config.depth, scale, settings.byte_swap);
        program.build(&ProgramParams {
            timing,
            patterns: resolved.mode.patterns().addrs(),
            framebuffer: &framebuffer,
            scale,
            controls,
        });
        channels.prepare(&program, dreq, fifo_addr);

        Ok(Self {
            slot,
            pixel_channel: channels.pixel.number(),
            pool,
            framebuffer,
            program,
            resolved,
            encoder: settings,
            channels: Some(channels),
        })
    }

    /// Begin steady-state scanout. Calling it again while running is a no-op.
    pub fn start(&mut self) {
        let Some(channels) = self.channels.take() else {
            return;
        };
        self.pool.enable_completion_irq(self.pixel_channel);
        self.pool.prioritize_transfers();
        self.slot
            .install(FrameReloader::new(channels, self.program.base_addr()));
        self.slot.kick();
    }

    /// Stop scanout and release the hardware. Same as dropping the session.
    pub fn shutdown(self) {}

    fn teardown(&mut self) {
        // Mask before uninstalling: a completion with no reloader is never
        // acknowledged.
        if self.is_running() {
            self.pool.disable_completion_irq(self.pixel_channel);
        }
        let channels = match self.slot.uninstall() {
            Some(reloader) => Some(reloader.into_channels()),
            None => self.channels.take(),
        };
        if let Some(channels) = channels {
            channels.release(&mut *self.pool);
        }
        self.slot.release();
    }

    pub fn is_running(&self) -> bool {
        self.channels.is_none()
    }

    pub fn framebuffer(&self) -> &Framebuffer {
        &self.framebuffer
    }

    /// Writable pixels. Writes are visible on the next scan of each row.
    pub fn framebuffer_mut(&mut self) -> &mut Framebuffer {
        &mut self.framebuffer
    }

    pub fn program(&self) -> &DescriptorProgram {
        &self.program
    }

    pub fn mode(&self) -> OutputMode {
        self.resolved.mode
    }

    pub fn timing(&self) -> &'static Timing {
        self.resolved.mode.timing()
    }

    pub fn scale(&self) -> Scale {
        self.resolved.scale
    }

    pub fn encoder_settings(&self) -> &EncoderSettings {
        &self.encoder
    }

    /// Frames completed since the slot was created. The start kick is not a
    /// completed frame.
    pub fn frames(&self) -> u32 {
        self.slot.frames()
    }
}

impl<P: ChannelPool> Drop for Session<'_, P> {
    fn drop(&mut self) {
        self.teardown();
    }
}
