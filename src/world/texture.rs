// Format-agnostic repository of textures decoded by the asset loader.
// The renderer only ever sees `&Texture`; blocks refer to textures through
// `TextureId`, objects hold shared `Arc<Texture>` frames.

use std::{collections::HashMap, path::Path, sync::Arc};

use crate::{colour::Colour, renderer::Rgba};

/// Runtime handle for a texture in a bank.
///
/// *Guaranteed* to remain stable for the lifetime of the bank.
pub type TextureId = u16;

/// `TextureId` whose pixels are the checkerboard fallback.
/// Always = 0 because `TextureBank::new()` inserts it first.
pub const NO_TEXTURE: TextureId = 0;

/// CPU-side storage: 32-bit **ARGB** (0xAARRGGBB) in row-major order.
#[derive(Clone, Debug, PartialEq)]
pub struct Texture {
    pub name: String,
    pub w: usize,
    pub h: usize,
    pub pixels: Vec<Rgba>,
}

/// Convenience checkerboard 8×8 (dark/light grey).
impl Default for Texture {
    fn default() -> Self {
        const LIGHT: Rgba = 0xFF_A0A0A0;
        const DARK: Rgba = 0xFF_404040;
        let mut pix = vec![0; 8 * 8];
        for y in 0..8 {
            for x in 0..8 {
                pix[y * 8 + x] = if (x ^ y) & 1 == 0 { LIGHT } else { DARK };
            }
        }
        Texture {
            name: "CHECKER".to_string(),
            w: 8,
            h: 8,
            pixels: pix,
        }
    }
}

/// Things that can go wrong when building or using a bank.
#[derive(Debug, thiserror::Error)]
pub enum TextureError {
    /// Attempted to insert a second texture with an existing name.
    #[error("texture name `{0}` already present in bank")]
    Duplicate(String),

    /// Requested ID is outside `0 .. bank.len()`.
    #[error("texture id {0} out of range")]
    BadId(TextureId),

    /// Bank is full.
    #[error("texture bank is full")]
    Full,

    /// The image file could not be opened or decoded.
    #[error("cannot load texture `{path}`: {source}")]
    Image {
        path: String,
        #[source]
        source: image::ImageError,
    },
}

impl Texture {
    /// Solid `w × h` texture.
    pub fn solid(name: impl Into<String>, w: usize, h: usize, colour: Colour) -> Self {
        Self {
            name: name.into(),
            w,
            h,
            pixels: vec![colour.to_argb(); w * h],
        }
    }

    /// Decode a PNG/JPEG from disk into ARGB, keeping alpha.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, TextureError> {
        let path = path.as_ref();
        let img = image::open(path)
            .map_err(|source| TextureError::Image {
                path: path.display().to_string(),
                source,
            })?
            .to_rgba8();
        let (w, h) = img.dimensions();
        let pixels = img
            .pixels()
            .map(|p| Colour::rgba(p[0], p[1], p[2], p[3]).to_argb())
            .collect();
        log::debug!("loaded texture {} ({w}x{h})", path.display());
        Ok(Self {
            name: path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default(),
            w: w as usize,
            h: h as usize,
            pixels,
        })
    }

    /// Alpha-aware texel lookup; out-of-range coordinates are clamped.
    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> Colour {
        if self.pixels.is_empty() {
            return Colour::CLEAR;
        }
        let x = x.min(self.w - 1);
        let y = y.min(self.h - 1);
        Colour::from_argb(self.pixels[y * self.w + x])
    }
}

/// A format-agnostic cache of textures.
///
/// * Does **not** know about map files or PNG — that’s the loader’s job.
/// * Stores exactly one copy of every name.
/// * ID **0** is always the “missing” checkerboard.
pub struct TextureBank {
    by_name: HashMap<String, TextureId>,
    data: Vec<Arc<Texture>>,
}

impl Default for TextureBank {
    fn default() -> Self {
        Self::default_with_checker()
    }
}

impl TextureBank {
    /// Create an empty bank with a mandatory *missing* texture used as
    /// fallback, registered under `"MISSING"` with handle **0**.
    pub fn new(missing_tex: Texture) -> Self {
        let mut by_name = HashMap::new();
        by_name.insert("MISSING".into(), NO_TEXTURE);
        Self {
            by_name,
            data: vec![Arc::new(missing_tex)],
        }
    }

    pub fn default_with_checker() -> Self {
        Self::new(Texture::default())
    }

    /// Number of textures stored (including the “missing” one).
    pub fn len(&self) -> usize {
        self.data.len()
    }
    pub fn is_empty(&self) -> bool {
        self.data.len() == 1
    } // only checker

    /// Obtain the id for a *loaded* texture by name.
    pub fn id(&self, name: &str) -> Option<TextureId> {
        self.by_name.get(name).copied()
    }

    /// Borrow a texture by id, with bounds-checking.
    pub fn texture(&self, id: TextureId) -> Result<&Texture, TextureError> {
        self.data
            .get(id as usize)
            .map(Arc::as_ref)
            .ok_or(TextureError::BadId(id))
    }

    /// Shared handle to a texture, for objects that keep their frames.
    pub fn shared(&self, id: TextureId) -> Result<Arc<Texture>, TextureError> {
        self.data
            .get(id as usize)
            .cloned()
            .ok_or(TextureError::BadId(id))
    }

    /// Insert a texture under `name` and return its new id.
    pub fn insert<S: Into<String>>(
        &mut self,
        name: S,
        tex: Texture,
    ) -> Result<TextureId, TextureError> {
        let name = name.into();
        if self.by_name.contains_key(&name) {
            return Err(TextureError::Duplicate(name));
        }
        let id = TextureId::try_from(self.data.len()).map_err(|_| TextureError::Full)?;
        self.data.push(Arc::new(tex));
        self.by_name.insert(name, id);
        Ok(id)
    }
}

/*======================================================================*/
/*                               Tests                                  */
/*======================================================================*/
