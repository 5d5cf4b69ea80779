// Format-agnostic repository of 64×64 indexed textures and the shading
// tables that map texels through light levels and effect colormaps.
// The span generator only ever handles `TextureId`s; pixels are read by
// the column scaler.

use std::collections::HashMap;

use crate::engine::spans::{PostRef, Shade};

/// Runtime handle for a texture in this bank.
///
/// *Guaranteed* to remain stable for the lifetime of the bank.
pub type TextureId = u16;

/// `TextureId` whose pixels are the checkerboard fallback.
/// Always = 0 because `TextureBank::new()` inserts it first.
pub const NO_TEXTURE: TextureId = 0;

/// Texels along either side of a texture; also the number of posts.
pub const TEXTURE_SIZE: usize = 64;

/// Light levels available to `Shade::Light`.
pub const LIGHT_LEVELS: usize = 32;

/// Column-major 8-bit texture: post `p` is `pixels[p*64 .. p*64 + 64]`.
#[derive(Clone, Debug, PartialEq)]
pub struct Texture {
    pub name: String,
    pub pixels: Vec<u8>,
}

impl Texture {
    /// Uniform texture in palette index `color`.
    pub fn solid(name: &str, color: u8) -> Self {
        Self {
            name: name.to_string(),
            pixels: vec![color; TEXTURE_SIZE * TEXTURE_SIZE],
        }
    }

    /// Vertical stripes cycling through `colors`, one per post.
    pub fn striped(name: &str, colors: &[u8]) -> Self {
        let mut pixels = vec![0u8; TEXTURE_SIZE * TEXTURE_SIZE];
        if !colors.is_empty() {
            for (p, post) in pixels.chunks_mut(TEXTURE_SIZE).enumerate() {
                post.fill(colors[p % colors.len()]);
            }
        }
        Self {
            name: name.to_string(),
            pixels,
        }
    }

    #[inline]
    pub fn post(&self, idx: u8) -> &[u8] {
        let p = idx as usize % TEXTURE_SIZE;
        &self.pixels[p * TEXTURE_SIZE..(p + 1) * TEXTURE_SIZE]
    }
}

/// Convenience checkerboard (8-texel squares, dark/light grey).
impl Default for Texture {
    fn default() -> Self {
        const LIGHT_IDX: u8 = 8;
        const DARK_IDX: u8 = 16;
        let mut pix = vec![0u8; TEXTURE_SIZE * TEXTURE_SIZE];
        for x in 0..TEXTURE_SIZE {
            for y in 0..TEXTURE_SIZE {
                pix[x * TEXTURE_SIZE + y] = if ((x >> 3) ^ (y >> 3)) & 1 == 0 {
                    LIGHT_IDX
                } else {
                    DARK_IDX
                };
            }
        }
        Texture {
            name: "CHECKER".to_string(),
            pixels: pix,
        }
    }
}

/// Things that can go wrong when using the bank.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TextureError {
    /// Attempted to insert a second texture with an existing name.
    #[error("texture name `{0}` already present in bank")]
    Duplicate(String),

    /// Pixel data is not 64×64.
    #[error("texture `{name}` has {len} texels, expected {}", TEXTURE_SIZE * TEXTURE_SIZE)]
    BadSize { name: String, len: usize },
}

pub type ShadeTable = [u8; 256];

/// A palette-agnostic cache of textures plus shading tables.
///
/// * ID **0** is always the “missing” checkerboard.
/// * Light tables run from brightest (index 0) to darkest.
pub struct TextureBank {
    by_name: HashMap<String, TextureId>,
    data: Vec<Texture>,
    light: Vec<ShadeTable>,
    effects: Vec<ShadeTable>,
    identity: ShadeTable,
}

impl TextureBank {
    // ---------------------------------------------------------------------
    // Constructors
    // ---------------------------------------------------------------------

    pub fn new(missing_tex: Texture) -> Self {
        let mut by_name = HashMap::new();
        by_name.insert("MISSING".into(), NO_TEXTURE);
        let mut identity = [0u8; 256];
        for (i, v) in identity.iter_mut().enumerate() {
            *v = i as u8;
        }
        Self {
            by_name,
            data: vec![missing_tex],
            light: Vec::new(),
            effects: Vec::new(),
            identity,
        }
    }

    pub fn default_with_checker() -> Self {
        Self::new(Texture::default())
    }

    /// Install `LIGHT_LEVELS` (or fewer) light-diminishing tables.
    pub fn set_light_tables(&mut self, tables: Vec<ShadeTable>) {
        self.light = tables;
    }

    /// Effect colormaps; `Shade::Colormap(n)` selects `tables[n - 1]`.
    pub fn set_effect_tables(&mut self, tables: Vec<ShadeTable>) {
        self.effects = tables;
    }

    // ---------------------------------------------------------------------
    // Query helpers
    // ---------------------------------------------------------------------

    /// Number of textures stored (including the “missing” one).
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.len() == 1
    }

    pub fn id(&self, name: &str) -> Option<TextureId> {
        self.by_name.get(name).copied()
    }

    /// Pixels of one post; unknown textures fall back to the checkerboard.
    pub fn post(&self, src: PostRef) -> &[u8] {
        let tex = self
            .data
            .get(src.texture as usize)
            .unwrap_or(&self.data[NO_TEXTURE as usize]);
        tex.post(src.post)
    }

    /// Table mapping texels to palette indices for `shade`.
    pub fn shade_table(&self, shade: Shade) -> &ShadeTable {
        match shade {
            Shade::Light(level) => {
                if self.light.is_empty() {
                    return &self.identity;
                }
                let dark = (255 - level as usize) * self.light.len() / 256;
                &self.light[dark.min(self.light.len() - 1)]
            }
            Shade::Colormap(n) => (n as usize)
                .checked_sub(1)
                .and_then(|i| self.effects.get(i))
                .unwrap_or(&self.identity),
        }
    }

    // ---------------------------------------------------------------------
    // Mutations
    // ---------------------------------------------------------------------

    pub fn insert(&mut self, tex: Texture) -> Result<TextureId, TextureError> {
        if tex.pixels.len() != TEXTURE_SIZE * TEXTURE_SIZE {
            return Err(TextureError::BadSize {
                name: tex.name,
                len: tex.pixels.len(),
            });
        }
        if self.by_name.contains_key(&tex.name) {
            return Err(TextureError::Duplicate(tex.name));
        }
        let id = self.data.len() as TextureId;
        self.by_name.insert(tex.name.clone(), id);
        self.data.push(tex);
        Ok(id)
    }
}

/// Light tables that darken toward palette index 0 by scaling the index.
pub fn linear_light_tables() -> Vec<ShadeTable> {
    (0..LIGHT_LEVELS)
        .map(|level| {
            let mut t = [0u8; 256];
            for (i, v) in t.iter_mut().enumerate() {
                *v = (i * (LIGHT_LEVELS - level) / LIGHT_LEVELS) as u8;
            }
            t
        })
        .collect()
}

/*======================================================================*/
/*                               Tests                                  */
/*======================================================================*/
