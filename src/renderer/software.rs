//! ---------------------------------------------------------------------------
//! Reference software column scaler
//!
//! * Fills an 8-bit palette-indexed frame buffer, row-major.
//! * Texels are read from a [`TextureBank`] post and remapped through the
//!   bank's shade table for the post's [`Shade`](crate::engine::spans::Shade).
//! * Draws exactly what it is given; ordering and occlusion are the
//!   generator's business.
//! ---------------------------------------------------------------------------

use crate::{
    engine::spans::PostDraw,
    renderer::ColumnScaler,
    world::{TEXTURE_SIZE, TextureBank},
};

/// Palette index the frame is cleared to.
pub const CLEAR_INDEX: u8 = 0;

pub struct Software<'a> {
    bank: &'a TextureBank,
    frame: Vec<u8>,
    width: usize,
    height: usize,
    columns: usize,
}

impl<'a> Software<'a> {
    pub fn new(bank: &'a TextureBank, width: usize, height: usize) -> Self {
        Self {
            bank,
            frame: vec![CLEAR_INDEX; width * height],
            width,
            height,
            columns: 0,
        }
    }

    /// Clear the buffer, reallocating if the resolution changed.
    pub fn begin_frame(&mut self, width: usize, height: usize) {
        if width != self.width || height != self.height {
            self.width = width;
            self.height = height;
            self.frame.resize(width * height, CLEAR_INDEX);
        }
        self.frame.fill(CLEAR_INDEX);
        self.columns = 0;
    }

    pub fn frame(&self) -> &[u8] {
        &self.frame
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Columns scaled since [`begin_frame`](Self::begin_frame).
    pub fn columns_drawn(&self) -> usize {
        self.columns
    }
}

/*──────────────────────── ColumnScaler impl ──────────────────────────*/

impl ColumnScaler for Software<'_> {
    fn scale_post(&mut self, post: &PostDraw) {
        if post.column < 0 || post.column as usize >= self.width {
            return;
        }
        let col = post.column as usize;
        let texels = self.bank.post(post.source);
        let shade = self.bank.shade_table(post.shade);

        let y0 = post.top.max(0);
        let y1 = (post.top + post.count).min(self.height as i32);
        /* rows clipped off the top still advance v */
        let mut v = post.tex_start.raw() as i64 + (y0 - post.top) as i64 * post.tex_step.raw() as i64;
        for y in y0..y1 {
            let t = ((v >> 16) as usize) & (TEXTURE_SIZE - 1);
            let texel = texels.get(t).copied().unwrap_or(CLEAR_INDEX);
            self.frame[y as usize * self.width + col] = shade[texel as usize];
            v += post.tex_step.raw() as i64;
        }
        self.columns += 1;
    }
}

/*──────────────────────────────── Tests ───────────────────────────────*/
