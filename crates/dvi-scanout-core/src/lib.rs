//! DVI scanout engine.
//!
//! Turns a software-writable framebuffer into a continuous DVI bitstream
//! using two chained transfer channels and a TMDS serial encoder. After
//! [`Session::start`] the hardware replays a one-frame descriptor program on
//! its own; the only software involvement is one interrupt per frame, routed
//! to [`ScanoutSlot::on_frame_complete`].
#![no_std]

extern crate alloc;

pub mod clock;
pub mod encoder;
pub mod engine;
pub mod error;
pub mod framebuffer;
pub mod geometry;
pub mod patterns;
pub mod program;
pub mod reload;
pub mod session;
pub mod timing;

pub use clock::{plan_serial_clock, SerialClockPlan};
pub use error::{ConfigError, Resource, ScanoutError};
pub use framebuffer::Framebuffer;
pub use geometry::{ColorDepth, DviPinout, Scale, ScanoutConfig};
pub use program::{DescriptorProgram, Segment};
pub use reload::ScanoutSlot;
pub use session::Session;
pub use timing::{timing_for, OutputMode, Timing};
