//! One-frame descriptor program for the command channel.
//!
//! The command channel copies each descriptor into the pixel channel's
//! register window; writing the last word (the read address) triggers the
//! pixel channel, which streams that many words to the encoder queue and
//! chains back to the command channel for the next descriptor.
//!
//! Layout per output line:
//! - sync band: one descriptor pointing at the `vsync_on` pattern
//! - porch bands: one descriptor pointing at the `vsync_off` pattern
//! - active band: the `active` header, then the framebuffer row
//!
//! A final null descriptor stops the chain and raises the frame interrupt.
//!
//! Descriptors are two words (`count`, `read_addr`) when the pixel channel's
//! control never changes, or four (`control`, `write_addr`, `count`,
//! `read_addr`) when scaled rows need a different transfer size than the
//! command lists.

use alloc::vec::Vec;

use dvi_scanout_hal::RegisterWindow;

use crate::error::{Resource, ScanoutError};
use crate::framebuffer::Framebuffer;
use crate::geometry::Scale;
use crate::patterns::{PatternAddrs, ACTIVE_HEADER_LEN, BLANK_LINE_LEN};
use crate::timing::{Timing, VerticalBand};

/// Descriptor shape and exact size of a program, known before allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgramLayout {
    /// Register window each descriptor is written into.
    pub window: RegisterWindow,
    /// Output lines per frame.
    pub lines: u32,
    /// Lines that carry pixel data.
    pub active_lines: u32,
}

impl ProgramLayout {
    pub fn new(timing: &Timing, scale: Scale) -> Self {
        let window = if scale.h > 1 {
            RegisterWindow::Full
        } else {
            RegisterWindow::CountAndTrigger
        };
        Self {
            window,
            lines: timing.v_total(),
            active_lines: timing.v_active,
        }
    }

    pub fn embeds_control(&self) -> bool {
        self.window == RegisterWindow::Full
    }

    pub fn descriptor_words(&self) -> u32 {
        self.window.words()
    }

    /// One per line, one extra per active line, one terminator.
    pub fn descriptor_count(&self) -> u32 {
        self.lines + self.active_lines + 1
    }

    pub fn word_count(&self) -> usize {
        (self.descriptor_count() * self.descriptor_words()) as usize
    }
}

/// Pixel-channel control values embedded in four-word descriptors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentControls {
    /// Word-sized transfers of command lists.
    pub command: u32,
    /// Framebuffer row transfers.
    pub pixel: u32,
    /// Terminator: quiet, unchained.
    pub terminal: u32,
    /// Encoder queue address.
    pub write_addr: u32,
}

/// Everything the builder reads.
pub struct ProgramParams<'a> {
    pub timing: &'a Timing,
    pub patterns: PatternAddrs,
    pub framebuffer: &'a Framebuffer,
    pub scale: Scale,
    pub controls: SegmentControls,
}

/// A decoded descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Descriptor {
    pub control: Option<u32>,
    pub write_addr: Option<u32>,
    pub count: u32,
    pub read_addr: u32,
}

impl Descriptor {
    pub fn is_null(&self) -> bool {
        self.count == 0 && self.read_addr == 0
    }
}

/// One output line (or the terminator) recovered from a built program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    Blank { vsync: bool },
    Active { row_addr: u32, count: u32 },
    Terminal,
    /// A descriptor that matches no pattern.
    Unknown(Descriptor),
}

pub struct DescriptorProgram {
    words: Vec<u32>,
    layout: ProgramLayout,
    patterns: PatternAddrs,
}

impl DescriptorProgram {
    /// Reserve exactly `layout.word_count()` words.
    pub fn with_layout(layout: ProgramLayout) -> Result<Self, ScanoutError> {
        let mut words = Vec::new();
        words
            .try_reserve_exact(layout.word_count())
            .map_err(|_| ScanoutError::ResourceExhausted(Resource::DescriptorProgram))?;
        Ok(Self {
            words,
            layout,
            patterns: PatternAddrs {
                vsync_on: 0,
                vsync_off: 0,
                active: 0,
            },
        })
    }

    /// Lay down the whole frame. Never grows the reserved storage.
    pub fn build(&mut self, params: &ProgramParams<'_>) {
        let t = params.timing;
        let fb = params.framebuffer;
        let c = params.controls;
        let p = params.patterns;
        let v_scale = params.scale.v.max(1);

        let row_count = if params.scale.h > 1 {
            fb.width()
        } else {
            fb.pitch()
        };

        self.words.clear();
        self.patterns = p;

        for line in 0..t.v_total() {
            match t.band(line) {
                VerticalBand::Sync => {
                    self.push(c.command, c.write_addr, BLANK_LINE_LEN as u32, p.vsync_on);
                }
                VerticalBand::BackPorch | VerticalBand::FrontPorch => {
                    self.push(c.command, c.write_addr, BLANK_LINE_LEN as u32, p.vsync_off);
                }
                VerticalBand::Active => {
                    self.push(c.command, c.write_addr, ACTIVE_HEADER_LEN as u32, p.active);
                    let row = (line - t.active_start()) / v_scale;
                    self.push(c.pixel, c.write_addr, row_count, fb.row_addr(row));
                }
            }
        }
        self.push(c.terminal, 0, 0, 0);

        debug_assert_eq!(self.words.len(), self.layout.word_count());
    }

    fn push(&mut self, control: u32, write_addr: u32, count: u32, read_addr: u32) {
        if self.layout.embeds_control() {
            self.words.push(control);
            self.words.push(write_addr);
        }
        self.words.push(count);
        self.words.push(read_addr);
    }

    pub fn layout(&self) -> &ProgramLayout {
        &self.layout
    }

    pub fn words(&self) -> &[u32] {
        &self.words
    }

    /// Bus address the command channel restarts from each frame.
    pub fn base_addr(&self) -> u32 {
        self.words.as_ptr() as usize as u32
    }

    pub fn descriptors(&self) -> impl Iterator<Item = Descriptor> + '_ {
        let embeds = self.layout.embeds_control();
        self.words
            .chunks_exact(self.layout.descriptor_words() as usize)
            .map(move |d| {
                if embeds {
                    Descriptor {
                        control: Some(d[0]),
                        write_addr: Some(d[1]),
                        count: d[2],
                        read_addr: d[3],
                    }
                } else {
                    Descriptor {
                        control: None,
                        write_addr: None,
                        count: d[0],
                        read_addr: d[1],
                    }
                }
            })
    }

    /// Walk the program line by line.
    pub fn segments(&self) -> Segments<impl Iterator<Item = Descriptor> + '_> {
        Segments {
            descriptors: self.descriptors(),
            patterns: self.patterns,
        }
    }
}

/// Iterator returned by [`DescriptorProgram::segments`].
pub struct Segments<I> {
    descriptors: I,
    patterns: PatternAddrs,
}

impl<I: Iterator<Item = Descriptor>> Iterator for Segments<I> {
    type Item = Segment;

    fn next(&mut self) -> Option<Segment> {
        let d = self.descriptors.next()?;
        let p = &self.patterns;
        let segment = if d.is_null() {
            Segment::Terminal
        } else if d.read_addr == p.vsync_on {
            Segment::Blank { vsync: true }
        } else if d.read_addr == p.vsync_off {
            Segment::Blank { vsync: false }
        } else if d.read_addr == p.active {
            match self.descriptors.next() {
                Some(row) => Segment::Active {
                    row_addr: row.read_addr,
                    count: row.count,
                },
                None => Segment::Unknown(d),
            }
        } else {
            Segment::Unknown(d)
        };
        Some(segment)
    }
}
