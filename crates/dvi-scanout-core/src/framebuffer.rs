//! Word-aligned pixel storage read by the pixel channel.
//!
//! Geometry is fixed for the lifetime of a session; contents may change at
//! any time. The transfer engine reads rows through their bus addresses, so
//! a row being rewritten during scanout tears but never faults.

use alloc::vec::Vec;

use crate::error::{Resource, ScanoutError};
use crate::geometry::ColorDepth;

pub struct Framebuffer {
    words: Vec<u32>,
    width: u32,
    height: u32,
    depth: ColorDepth,
    /// Words between the starts of consecutive rows.
    pitch: u32,
}

/// Words needed for one row, rounded up so every row starts word-aligned.
pub const fn pitch_words(width: u32, depth: ColorDepth) -> u32 {
    (width * depth.bits()).div_ceil(32)
}

impl Framebuffer {
    /// Allocate a zeroed framebuffer. Fails instead of aborting when memory
    /// is short.
    pub fn try_new(width: u32, height: u32, depth: ColorDepth) -> Result<Self, ScanoutError> {
        let pitch = pitch_words(width, depth);
        let len = (pitch as usize) * (height as usize);

        let mut words = Vec::new();
        words
            .try_reserve_exact(len)
            .map_err(|_| ScanoutError::ResourceExhausted(Resource::Framebuffer))?;
        words.resize(len, 0);

        Ok(Self {
            words,
            width,
            height,
            depth,
            pitch,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn depth(&self) -> ColorDepth {
        self.depth
    }

    pub fn pitch(&self) -> u32 {
        self.pitch
    }

    /// Total length in words (`pitch * height`).
    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn as_words(&self) -> &[u32] {
        &self.words
    }

    /// Words of row `y`, including any padding past `width`.
    pub fn row(&self, y: u32) -> &[u32] {
        let start = (y * self.pitch) as usize;
        &self.words[start..start + self.pitch as usize]
    }

    pub fn row_mut(&mut self, y: u32) -> &mut [u32] {
        let start = (y * self.pitch) as usize;
        &mut self.words[start..start + self.pitch as usize]
    }

    pub fn fill(&mut self, word: u32) {
        self.words.fill(word);
    }

    /// Bus address of the first word.
    pub fn bus_addr(&self) -> u32 {
        self.words.as_ptr() as usize as u32
    }

    /// Bus address of the first word of row `y`.
    pub fn row_addr(&self, y: u32) -> u32 {
        self.bus_addr().wrapping_add(y * self.pitch * 4)
    }
}
