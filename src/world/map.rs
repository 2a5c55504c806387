//! Rectangular block grid, the reference [`Scene`] implementation.
//!
//! Three ways to build one:
//!
//! * programmatically with [`GridMap::new`] + [`GridMap::set_block`],
//! * from ASCII art and a legend ([`GridMap::from_ascii`]),
//! * from a JSON map file ([`GridMap::from_json_file`]); texture paths in the
//!   file are resolved relative to the file itself.

use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use glam::DVec3;
use serde::Deserialize;
use thiserror::Error;

use crate::{
    colour::Colour,
    renderer::{BlockInfo, RenderConfig, Scene},
    world::{
        camera::Camera,
        object::{MovementParams, Object},
        texture::{Texture, TextureBank, TextureError, TextureId},
    },
};

/// Blocks lower than this are treated as empty.
const MIN_BLOCK_HEIGHT: f64 = 1e-4;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Block {
    pub height: f64,
    pub colour: Colour,
    pub texture: Option<TextureId>,
}

impl Block {
    pub const fn solid(height: f64, colour: Colour) -> Self {
        Self {
            height,
            colour,
            texture: None,
        }
    }

    pub const fn textured(height: f64, colour: Colour, texture: TextureId) -> Self {
        Self {
            height,
            colour,
            texture: Some(texture),
        }
    }
}

#[derive(Debug, Error)]
pub enum MapError {
    #[error("cannot read map `{path}`: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed map: {0}")]
    Json(#[from] serde_json::Error),

    #[error("map size {width}x{height} is empty")]
    BadSize { width: usize, height: usize },

    #[error("cell ({x}, {y}) is outside the {width}x{height} map")]
    OutOfBounds {
        x: i32,
        y: i32,
        width: usize,
        height: usize,
    },

    #[error("unknown texture `{0}`")]
    UnknownTexture(String),

    #[error("no legend entry for `{ch}` at row {row}, column {col}")]
    UnknownCell { ch: char, row: usize, col: usize },

    #[error(transparent)]
    Texture(#[from] TextureError),
}

pub struct GridMap {
    name: String,
    width: usize,
    height: usize,
    blocks: Vec<Option<Block>>,
    textures: TextureBank,
    objects: Vec<Object>,
    sky: Colour,
    ground: Colour,
    brightness_min: f64,
    brightness_max: f64,
    spawn: Camera,
}

impl GridMap {
    /// Empty `width × height` map, blue sky, green ground, spawn in the
    /// middle facing +X.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            name: String::new(),
            width,
            height,
            blocks: vec![None; width * height],
            textures: TextureBank::default(),
            objects: Vec::new(),
            sky: Colour::BLUE,
            ground: Colour::GREEN,
            brightness_min: 0.0,
            brightness_max: 1.0,
            spawn: Camera::new(
                DVec3::new(width as f64 / 2.0, height as f64 / 2.0, 0.5),
                0.0,
            ),
        }
    }

    /*──────────────────────── accessors ─────────────────────────────*/

    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn width(&self) -> usize {
        self.width
    }
    pub fn height(&self) -> usize {
        self.height
    }
    pub fn sky(&self) -> Colour {
        self.sky
    }
    pub fn ground(&self) -> Colour {
        self.ground
    }
    /// `(min, max)` global brightness.
    pub fn brightness(&self) -> (f64, f64) {
        (self.brightness_min, self.brightness_max)
    }
    pub fn spawn(&self) -> &Camera {
        &self.spawn
    }
    pub fn textures(&self) -> &TextureBank {
        &self.textures
    }
    pub fn objects(&self) -> &[Object] {
        &self.objects
    }
    pub fn objects_mut(&mut self) -> &mut [Object] {
        &mut self.objects
    }

    pub fn set_sky(&mut self, colour: Colour) {
        self.sky = colour;
    }
    pub fn set_ground(&mut self, colour: Colour) {
        self.ground = colour;
    }
    pub fn set_spawn(&mut self, spawn: Camera) {
        self.spawn = spawn;
    }

    /// Renderer settings for a window, taking sky, ground and brightness
    /// from the map.
    pub fn render_config(&self, width: usize, height: usize) -> RenderConfig {
        RenderConfig {
            brightness_min: self.brightness_min,
            brightness_max: self.brightness_max,
            sky: self.sky,
            ground: self.ground,
            ..RenderConfig::for_window(width, height)
        }
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        let (x, y) = (usize::try_from(x).ok()?, usize::try_from(y).ok()?);
        (x < self.width && y < self.height).then(|| y * self.width + x)
    }

    fn checked_index(&self, x: i32, y: i32) -> Result<usize, MapError> {
        self.index(x, y).ok_or(MapError::OutOfBounds {
            x,
            y,
            width: self.width,
            height: self.height,
        })
    }

    pub fn block(&self, x: i32, y: i32) -> Option<&Block> {
        self.index(x, y).and_then(|i| self.blocks[i].as_ref())
    }

    /*──────────────────────── editing ───────────────────────────────*/

    pub fn add_texture(&mut self, name: &str, texture: Texture) -> Result<TextureId, MapError> {
        Ok(self.textures.insert(name, texture)?)
    }

    pub fn set_block(
        &mut self,
        x: i32,
        y: i32,
        height: f64,
        colour: Colour,
        texture: Option<TextureId>,
    ) -> Result<(), MapError> {
        let i = self.checked_index(x, y)?;
        if let Some(id) = texture {
            self.textures.texture(id)?;
        }
        self.blocks[i] = (height >= MIN_BLOCK_HEIGHT).then_some(Block {
            height,
            colour,
            texture,
        });
        Ok(())
    }

    pub fn clear_block(&mut self, x: i32, y: i32) -> Result<(), MapError> {
        let i = self.checked_index(x, y)?;
        self.blocks[i] = None;
        Ok(())
    }

    pub fn add_object(&mut self, object: Object) {
        self.objects.push(object);
    }

    /*──────────────────────── builders ──────────────────────────────*/

    /// Build from ASCII art: one line per row (row 0 is `y = 0`), one
    /// character per cell. `'.'` and `' '` are empty; every other
    /// character must appear in `legend`. Short lines are padded with
    /// empty cells.
    pub fn from_ascii(art: &str, legend: &[(char, Block)]) -> Result<Self, MapError> {
        let rows: Vec<&str> = art.lines().collect();
        let width = rows.iter().map(|r| r.chars().count()).max().unwrap_or(0);
        let height = rows.len();
        if width == 0 || height == 0 {
            return Err(MapError::BadSize { width, height });
        }

        let mut map = Self::new(width, height);
        for (row, line) in rows.iter().enumerate() {
            for (col, ch) in line.chars().enumerate() {
                if ch == '.' || ch == ' ' {
                    continue;
                }
                let block = legend
                    .iter()
                    .find(|(c, _)| *c == ch)
                    .map(|(_, b)| *b)
                    .ok_or(MapError::UnknownCell { ch, row, col })?;
                map.set_block(col as i32, row as i32, block.height, block.colour, block.texture)?;
            }
        }
        Ok(map)
    }

    /// Load a JSON map file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, MapError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| MapError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        let map = Self::from_json_str(&text, base)?;
        log::info!(
            "loaded map `{}` from {} ({}x{}, {} textures, {} objects)",
            map.name,
            path.display(),
            map.width,
            map.height,
            map.textures.len() - 1,
            map.objects.len()
        );
        Ok(map)
    }

    /// Parse a JSON map; texture paths are resolved against `base_dir`.
    pub fn from_json_str(text: &str, base_dir: &Path) -> Result<Self, MapError> {
        let file: MapFile = serde_json::from_str(text)?;
        if file.width == 0 || file.height == 0 {
            return Err(MapError::BadSize {
                width: file.width,
                height: file.height,
            });
        }

        let mut map = Self::new(file.width, file.height);
        map.name = file.name;
        if let Some(sky) = file.sky {
            map.sky = sky;
        }
        if let Some(ground) = file.ground {
            map.ground = ground;
        }
        map.brightness_min = file.brightness_min;
        map.brightness_max = file.brightness_max;
        if let Some(pose) = file.spawn {
            map.spawn = pose.camera();
        }

        for t in file.textures {
            let tex = Texture::from_file(base_dir.join(&t.path))?;
            map.add_texture(&t.name, tex)?;
        }

        for b in file.blocks {
            let texture = b.texture.as_deref().map(|n| map.texture_id(n)).transpose()?;
            if b.height < MIN_BLOCK_HEIGHT {
                log::warn!("map block ({}, {}) has no height, ignored", b.x, b.y);
            }
            map.set_block(b.x, b.y, b.height, b.colour, texture)?;
        }

        for o in file.objects {
            let movement = MovementParams {
                stand_height: o.stand_height.unwrap_or(o.pose.z),
                ..MovementParams::default()
            };
            let mut obj = Object::new(o.width, o.height, o.pose.camera(), movement);
            for name in &o.textures {
                let id = map.texture_id(name)?;
                obj.add_texture(map.textures.shared(id)?);
            }
            map.add_object(obj);
        }

        Ok(map)
    }

    fn texture_id(&self, name: &str) -> Result<TextureId, MapError> {
        self.textures
            .id(name)
            .ok_or_else(|| MapError::UnknownTexture(name.to_string()))
    }

    /// Built-in test level: a walled 16×16 courtyard with a stepped
    /// pyramid, a staircase of low blocks, two sprites, and a field of tall
    /// pillars beyond it for a sense of distance.
    pub fn demo() -> Result<Self, MapError> {
        const LAYOUT: &str = "\
WWW.............
................
www.w.BBB.BBB.BB
w...w..........B
w.w.............
w.w.www........B
..w.w..........B
w..............B
w.w.WWWWWWW.....
w.w.WDDDDDW....B
....WDTTTDW....B
....WDTHTDW....B
321.WDTTTDW.....
456.WDDDDDW....B
987.WWWWWWW....B
...........BBB.B";
        const SIZE: usize = 64;
        const GREY: Colour = Colour::rgb(120, 120, 120);
        const STAIR: Colour = Colour::rgb(177, 3, 252);

        let mut map = Self::new(SIZE, SIZE);
        map.name = "demo".into();

        let wall1 = map.add_texture("wall1", brick_texture())?;
        let wall2 = map.add_texture("wall2", panel_texture())?;

        for (y, line) in LAYOUT.lines().enumerate() {
            for (x, ch) in line.chars().enumerate() {
                let block = match ch {
                    'w' => Block::textured(1.1, Colour::rgb(128, 128, 128), wall1),
                    'W' => Block::textured(0.7, GREY, wall2),
                    'D' => Block::textured(1.4, GREY, wall2),
                    'T' => Block::textured(2.1, GREY, wall2),
                    'H' => Block::textured(2.8, GREY, wall2),
                    'B' => Block::solid(1.5, Colour::rgb(235, 50, 52)),
                    d @ '1'..='9' => {
                        Block::solid(d.to_digit(10).unwrap_or(1) as f64 * 0.1, STAIR)
                    }
                    _ => continue,
                };
                map.blocks[y * SIZE + x] = Some(block);
            }
        }

        for y in (0..SIZE).step_by(5) {
            for x in (5..SIZE).step_by(5) {
                if x >= 16 || y >= 16 {
                    map.blocks[y * SIZE + x] = Some(Block::solid(6.0, Colour::rgb(64, 64, 64)));
                }
            }
        }

        let barrel = Object::new(
            0.3,
            0.5,
            Camera::new(DVec3::new(1.768908, 10.275132, 0.5), 7.947846),
            MovementParams {
                stand_height: 0.3,
                ..MovementParams::default()
            },
        )
        .with_texture(Arc::new(barrel_texture()));
        map.add_object(barrel);

        let mut figure = Object::new(
            0.3,
            0.6,
            Camera::new(DVec3::new(2.423984, 11.041379, 0.5), 3.126846),
            MovementParams::default(),
        );
        for frame in 0..8 {
            figure.add_texture(Arc::new(figure_texture(frame)));
        }
        map.add_object(figure);

        map.spawn = Camera::new(DVec3::new(3.5, 4.5, 0.5), 0.0);
        log::debug!("built demo map ({} textures)", map.textures.len() - 1);
        Ok(map)
    }
}

impl Scene for GridMap {
    fn query_block(&self, cell_x: i32, cell_y: i32) -> Option<BlockInfo<'_>> {
        let block = self.block(cell_x, cell_y)?;
        Some(BlockInfo {
            height: block.height,
            colour: block.colour,
            // a dangling id degrades to a flat-coloured wall
            texture: block.texture.and_then(|id| self.textures.texture(id).ok()),
        })
    }

    fn objects_near(&self, camera: &Camera) -> Vec<&Object> {
        let reach2 = camera.max_dist() * camera.max_dist();
        self.objects
            .iter()
            .filter(|o| (o.camera().pos() - camera.pos()).truncate().length_squared() <= reach2)
            .collect()
    }
}

/*──────────────────────── procedural demo art ──────────────────────*/

fn brick_texture() -> Texture {
    let mut t = Texture::solid("wall1", 32, 32, Colour::rgb(150, 70, 50));
    for y in 0..32 {
        for x in 0..32 {
            let offset = if (y / 8) % 2 == 0 { 0 } else { 8 };
            if y % 8 == 0 || (x + offset) % 16 == 0 {
                t.pixels[y * 32 + x] = Colour::rgb(90, 90, 90).to_argb();
            }
        }
    }
    t
}

fn panel_texture() -> Texture {
    let mut t = Texture::solid("wall2", 32, 32, Colour::rgb(120, 120, 130));
    for y in 0..32 {
        for x in 0..32 {
            if x % 16 == 0 || y % 16 == 0 {
                t.pixels[y * 32 + x] = Colour::rgb(70, 70, 80).to_argb();
            } else if (x + y) % 7 == 0 {
                t.pixels[y * 32 + x] = Colour::rgb(140, 140, 150).to_argb();
            }
        }
    }
    t
}

fn barrel_texture() -> Texture {
    let (w, h) = (16, 24);
    let mut t = Texture::solid("barrel", w, h, Colour::CLEAR);
    for y in 0..h {
        for x in 0..w {
            // rounded silhouette: clip the corners
            let edge = (y < 2 || y >= h - 2) && !(2..w - 2).contains(&x);
            if !edge {
                let band = if y % 8 < 2 { 40 } else { 0 };
                t.pixels[y * w + x] = Colour::rgb(110 + band, 80, 30).to_argb();
            }
        }
    }
    t
}

/// Simple figure; frame `n` gets its own shirt colour so the directional
/// frame choice is visible.
fn figure_texture(n: u8) -> Texture {
    let (w, h) = (12, 24);
    let shirt = Colour::rgb(40 + n * 25, 60, 200 - n * 20);
    let mut t = Texture::solid(format!("figure{n}"), w, h, Colour::CLEAR);
    for y in 0..h {
        for x in 0..w {
            let c = match y {
                0..=5 if (3..9).contains(&x) => Colour::rgb(230, 190, 160),
                6..=15 if (1..11).contains(&x) => shirt,
                16..=23 if (2..5).contains(&x) || (7..10).contains(&x) => Colour::rgb(50, 50, 70),
                _ => continue,
            };
            t.pixels[y * w + x] = c.to_argb();
        }
    }
    t
}

/*──────────────────────── JSON file schema ─────────────────────────*/

#[derive(Deserialize)]
struct MapFile {
    #[serde(default)]
    name: String,
    width: usize,
    height: usize,
    #[serde(default)]
    sky: Option<Colour>,
    #[serde(default)]
    ground: Option<Colour>,
    #[serde(default)]
    brightness_min: f64,
    #[serde(default = "one")]
    brightness_max: f64,
    #[serde(default)]
    spawn: Option<Pose>,
    #[serde(default)]
    textures: Vec<TextureDef>,
    #[serde(default)]
    blocks: Vec<BlockDef>,
    #[serde(default)]
    objects: Vec<ObjectDef>,
}

fn one() -> f64 {
    1.0
}

fn half() -> f64 {
    0.5
}

#[derive(Deserialize, Clone, Copy)]
struct Pose {
    x: f64,
    y: f64,
    #[serde(default = "half")]
    z: f64,
    #[serde(default)]
    yaw: f64,
}

impl Pose {
    fn camera(self) -> Camera {
        Camera::new(DVec3::new(self.x, self.y, self.z), self.yaw)
    }
}

#[derive(Deserialize)]
struct TextureDef {
    name: String,
    path: PathBuf,
}

#[derive(Deserialize)]
struct BlockDef {
    x: i32,
    y: i32,
    height: f64,
    colour: Colour,
    #[serde(default)]
    texture: Option<String>,
}

#[derive(Deserialize)]
struct ObjectDef {
    #[serde(flatten)]
    pose: Pose,
    width: f64,
    height: f64,
    #[serde(default)]
    stand_height: Option<f64>,
    #[serde(default)]
    textures: Vec<String>,
}

/*======================================================================*/
/*                               Tests                                  */
/*======================================================================*/
