//! Frame-boundary handling.
//!
//! The program's null descriptor raises one interrupt per frame. The handler
//! clears it and restarts the command channel at the program base; that is
//! the only software work during steady-state scanout.
//!
//! The reload context lives in a [`ScanoutSlot`] that the platform's
//! interrupt handler is given explicitly (usually a `static` named in the
//! handler). The slot also enforces that at most one session exists.

use core::cell::RefCell;
use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use critical_section::Mutex;
use dvi_scanout_hal::TransferChannel;

use crate::engine::ChannelPair;
use crate::error::ScanoutError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReloadState {
    /// Waiting for the program to complete.
    Armed,
    /// Inside the handler body.
    Reloading,
}

/// Everything the frame interrupt touches.
pub struct FrameReloader<C> {
    channels: ChannelPair<C>,
    program_base: u32,
    state: ReloadState,
}

impl<C: TransferChannel> FrameReloader<C> {
    pub fn new(channels: ChannelPair<C>, program_base: u32) -> Self {
        Self {
            channels,
            program_base,
            state: ReloadState::Armed,
        }
    }

    /// Clear the completion and restart the program from its base.
    /// Overwrites rather than accumulates, so repeated calls are harmless.
    pub fn reload(&mut self) {
        self.state = ReloadState::Reloading;
        self.channels.pixel.acknowledge_completion();
        self.channels.command.restart_from(self.program_base);
        self.state = ReloadState::Armed;
    }

    pub fn state(&self) -> ReloadState {
        self.state
    }

    pub fn program_base(&self) -> u32 {
        self.program_base
    }

    pub fn into_channels(self) -> ChannelPair<C> {
        self.channels
    }
}

/// Single system-wide scanout slot shared with the frame interrupt.
pub struct ScanoutSlot<C> {
    claimed: AtomicBool,
    reloader: Mutex<RefCell<Option<FrameReloader<C>>>>,
    frames: AtomicU32,
}

impl<C: TransferChannel> ScanoutSlot<C> {
    pub const fn new() -> Self {
        Self {
            claimed: AtomicBool::new(false),
            reloader: Mutex::new(RefCell::new(None)),
            frames: AtomicU32::new(0),
        }
    }

    /// Interrupt entry point. Returns `false` (and does nothing) when no
    /// session is running.
    pub fn on_frame_complete(&self) -> bool {
        let reloaded = self.reload();
        if reloaded {
            self.frames.fetch_add(1, Ordering::Relaxed);
        }
        reloaded
    }

    /// Start the first frame through the same path as every later one,
    /// without counting it.
    pub(crate) fn kick(&self) -> bool {
        self.reload()
    }

    fn reload(&self) -> bool {
        critical_section::with(|cs| match self.reloader.borrow_ref_mut(cs).as_mut() {
            Some(reloader) => {
                reloader.reload();
                true
            }
            None => false,
        })
    }

    /// Whether a session currently owns the slot.
    pub fn is_claimed(&self) -> bool {
        self.claimed.load(Ordering::Acquire)
    }

    /// Whether the frame interrupt is live.
    pub fn is_running(&self) -> bool {
        critical_section::with(|cs| self.reloader.borrow_ref(cs).is_some())
    }

    /// Frames completed since the slot was created.
    pub fn frames(&self) -> u32 {
        self.frames.load(Ordering::Relaxed)
    }

    pub(crate) fn claim(&self) -> Result<(), ScanoutError> {
        self.claimed
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| ())
            .map_err(|_| ScanoutError::SessionConflict)
    }

    pub(crate) fn release(&self) {
        self.claimed.store(false, Ordering::Release);
    }

    pub(crate) fn install(&self, reloader: FrameReloader<C>) {
        critical_section::with(|cs| {
            self.reloader.borrow_ref_mut(cs).replace(reloader);
        });
    }

    pub(crate) fn uninstall(&self) -> Option<FrameReloader<C>> {
        critical_section::with(|cs| self.reloader.borrow_ref_mut(cs).take())
    }

    /// Inspect the installed reloader.
    pub fn with_reloader<R>(&self, f: impl FnOnce(&FrameReloader<C>) -> R) -> Option<R> {
        critical_section::with(|cs| self.reloader.borrow_ref(cs).as_ref().map(f))
    }
}

impl<C: TransferChannel> Default for ScanoutSlot<C> {
    fn default() -> Self {
        Self::new()
    }
}
