//! Image views and texture sampling
//!
//! An [`ImageView`] owns a primary [`Texture`] and the derived data its
//! undersampling policy asks for (a mip chain or a rip-map). Derived data is
//! rebuilt lazily: writers mark the view dirty, and the next sampler read or
//! painter session end recomputes it once.

use std::cell::{Cell, Ref, RefCell};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::color::{lerp, Rgb, Sample};
use crate::error::Result;
use crate::texture::Texture;

/// Policy for reducing aliasing when a texture is minified
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UndersamplingFix {
    #[default]
    None,
    Mipmap,
    Anisotropy,
}

/// How UV coordinates outside [0, 1] map back into the texture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Wrap {
    Repeat,
    #[default]
    Clamp,
    Mirror,
}

/// How a color is reconstructed from neighbouring texels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Filter {
    #[default]
    Nearest,
    Bilinear,
    Bicubic,
}

/// Direction of a rip-map chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RipAxis {
    /// Width halves each level, height is kept
    Horizontal,
    /// Height halves each level, width is kept
    Vertical,
}

/// View configuration, stored as JSON
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    pub undersampling: UndersamplingFix,
    pub wrap: Wrap,
    pub filter: Filter,
}

impl ViewConfig {
    pub fn new(undersampling: UndersamplingFix, wrap: Wrap, filter: Filter) -> Self {
        Self {
            undersampling,
            wrap,
            filter,
        }
    }

    /// Load config from JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config = serde_json::from_str(&content)?;
        log::debug!("loaded view config from {}", path.as_ref().display());
        Ok(config)
    }

    /// Save config to JSON file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

/// A finished pixel buffer ready for presentation
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a, T = u8> {
    pub samples: &'a [T],
    pub width: usize,
    pub height: usize,
    pub channels: usize,
    /// Row stride in bytes
    pub pitch: usize,
}

/// Primary texture plus lazily recomputed derived data
#[derive(Debug)]
pub struct ImageView<T = u8> {
    texture: Texture<T>,
    config: ViewConfig,
    // Mip levels 1.. (level 0 is `texture`)
    mips: RefCell<Vec<Texture<T>>>,
    rip_horizontal: RefCell<Vec<Texture<T>>>,
    rip_vertical: RefCell<Vec<Texture<T>>>,
    dirty: Cell<bool>,
    revision: Cell<u64>,
}

impl<T: Sample> ImageView<T> {
    /// Wrap a texture. The view starts dirty so derived data is built on
    /// first use.
    pub fn new(texture: Texture<T>, config: ViewConfig) -> Self {
        Self {
            texture,
            config,
            mips: RefCell::new(Vec::new()),
            rip_horizontal: RefCell::new(Vec::new()),
            rip_vertical: RefCell::new(Vec::new()),
            dirty: Cell::new(true),
            revision: Cell::new(0),
        }
    }

    /// Create a view over a zero-filled texture
    pub fn with_size(width: usize, height: usize, channels: usize, config: ViewConfig) -> Result<Self> {
        Ok(Self::new(Texture::new(width, height, channels)?, config))
    }

    pub fn texture(&self) -> &Texture<T> {
        &self.texture
    }

    /// Mutable access to the primary texture. Marks the view dirty.
    pub fn texture_mut(&mut self) -> &mut Texture<T> {
        self.dirty.set(true);
        &mut self.texture
    }

    pub fn into_texture(self) -> Texture<T> {
        self.texture
    }

    pub fn config(&self) -> ViewConfig {
        self.config
    }

    /// Replace the configuration. Derived data is rebuilt on next use.
    pub fn set_config(&mut self, config: ViewConfig) {
        self.config = config;
        self.dirty.set(true);
    }

    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty.get()
    }

    /// Number of completed recomputes
    pub fn revision(&self) -> u64 {
        self.revision.get()
    }

    /// Recompute derived data for the current policy and clear the dirty flag
    pub fn update(&self) {
        let mut mips = self.mips.borrow_mut();
        let mut rip_h = self.rip_horizontal.borrow_mut();
        let mut rip_v = self.rip_vertical.borrow_mut();
        mips.clear();
        rip_h.clear();
        rip_v.clear();

        match self.config.undersampling {
            UndersamplingFix::None => {},
            UndersamplingFix::Mipmap => {
                *mips = reduce_chain(&self.texture, true, true);
            },
            UndersamplingFix::Anisotropy => {
                *rip_h = reduce_chain(&self.texture, true, false);
                *rip_v = reduce_chain(&self.texture, false, true);
            },
        }

        self.dirty.set(false);
        self.revision.set(self.revision.get() + 1);
        log::debug!(
            "view {}x{} recomputed ({:?}): {} mip, {}+{} rip levels",
            self.texture.width(),
            self.texture.height(),
            self.config.undersampling,
            mips.len(),
            rip_h.len(),
            rip_v.len()
        );
    }

    /// Run [`update`](Self::update) only if the view is dirty
    pub fn refresh(&self) {
        if self.dirty.get() {
            self.update();
        }
    }

    /// Mip levels including the primary texture; 1 unless the policy is
    /// `mipmap`.
    pub fn mip_level_count(&self) -> usize {
        self.refresh();
        1 + self.mips.borrow().len()
    }

    /// Derived mip level `level` (1 is half size). Level 0 is
    /// [`texture`](Self::texture) and is not returned here.
    pub fn mip_level(&self, level: usize) -> Option<Ref<'_, Texture<T>>> {
        self.refresh();
        let index = level.checked_sub(1)?;
        Ref::filter_map(self.mips.borrow(), |m| m.get(index)).ok()
    }

    /// Derived rip-map level `level` (>= 1) along `axis`
    pub fn rip_level(&self, axis: RipAxis, level: usize) -> Option<Ref<'_, Texture<T>>> {
        self.refresh();
        let index = level.checked_sub(1)?;
        let chain = match axis {
            RipAxis::Horizontal => &self.rip_horizontal,
            RipAxis::Vertical => &self.rip_vertical,
        };
        Ref::filter_map(chain.borrow(), |c| c.get(index)).ok()
    }

    /// Sampler using the view's configured wrap and filter
    pub fn sampler(&self) -> Sampler<'_, T> {
        Sampler::new(self, self.config.wrap, self.config.filter)
    }

    /// Primary texture as a presentation frame
    pub fn frame(&self) -> Frame<'_, T> {
        Frame {
            samples: self.texture.data(),
            width: self.texture.width(),
            height: self.texture.height(),
            channels: self.texture.channels(),
            pitch: self.texture.pitch(),
        }
    }
}

/// Build successive reductions of `src` until neither axis can shrink
fn reduce_chain<T: Sample>(src: &Texture<T>, halve_x: bool, halve_y: bool) -> Vec<Texture<T>> {
    let mut levels: Vec<Texture<T>> = Vec::new();
    loop {
        let prev = levels.last().unwrap_or(src);
        match reduce(prev, halve_x, halve_y) {
            Some(next) => levels.push(next),
            None => break,
        }
    }
    levels
}

/// Box-filter `src` by 2 along the requested axes. Odd sizes clamp the second
/// tap to the last texel. Returns None when nothing can shrink.
fn reduce<T: Sample>(src: &Texture<T>, halve_x: bool, halve_y: bool) -> Option<Texture<T>> {
    let (w, h, c) = (src.width(), src.height(), src.channels());
    let shrink_x = halve_x && w > 1;
    let shrink_y = halve_y && h > 1;
    if !shrink_x && !shrink_y {
        return None;
    }

    let new_w = if shrink_x { w / 2 } else { w };
    let new_h = if shrink_y { h / 2 } else { h };
    let (fx, fy) = (if shrink_x { 2 } else { 1 }, if shrink_y { 2 } else { 1 });
    let taps = (fx * fy) as f32;

    let data = src.data();
    let mut out = Vec::with_capacity(new_w * new_h * c);
    let mut sum = vec![0.0f32; c];

    for dy in 0..new_h {
        for dx in 0..new_w {
            sum.fill(0.0);
            for oy in 0..fy {
                let sy = (dy * fy + oy).min(h - 1);
                for ox in 0..fx {
                    let sx = (dx * fx + ox).min(w - 1);
                    let idx = src.index(sx, sy);
                    for (acc, s) in sum.iter_mut().zip(&data[idx..idx + c]) {
                        *acc += s.to_f32();
                    }
                }
            }
            out.extend(sum.iter().map(|&s| T::from_f32(s / taps)));
        }
    }

    Texture::from_vec(new_w, new_h, c, out).ok()
}

/// Map one coordinate into [0, 1] according to `wrap`
#[inline]
pub fn wrap_coord(wrap: Wrap, t: f32) -> f32 {
    match wrap {
        Wrap::Repeat => t.rem_euclid(1.0),
        Wrap::Clamp => t.clamp(0.0, 1.0),
        Wrap::Mirror => {
            // Mirrored repeat: [0,1] forward, [1,2] backward
            let m = t.rem_euclid(2.0);
            if m > 1.0 {
                2.0 - m
            } else {
                m
            }
        },
    }
}

/// Integer texel and fractional offset for a wrapped coordinate
#[inline]
fn texel_coord(t: f32, size: usize) -> (usize, f32) {
    let f = t * size as f32;
    let base = f.floor();
    let index = (base.max(0.0) as usize).min(size - 1);
    (index, f - base)
}

#[inline]
fn to_f32s<T: Sample>(c: Rgb<T>) -> [f32; 3] {
    [c.r.to_f32(), c.g.to_f32(), c.b.to_f32()]
}

/// Catmull-Rom weights for taps at offsets -1, 0, 1, 2
#[inline]
fn catmull_rom(t: f32) -> [f32; 4] {
    let t2 = t * t;
    let t3 = t2 * t;
    [
        (-t3 + 2.0 * t2 - t) * 0.5,
        (3.0 * t3 - 5.0 * t2 + 2.0) * 0.5,
        (-3.0 * t3 + 4.0 * t2 + t) * 0.5,
        (t3 - t2) * 0.5,
    ]
}

fn sample_nearest<T: Sample>(tex: &Texture<T>, u: f32, v: f32) -> Rgb<T> {
    let (x, _) = texel_coord(u, tex.width());
    let (y, _) = texel_coord(v, tex.height());
    tex.texel(x, y)
}

fn sample_bilinear<T: Sample>(tex: &Texture<T>, u: f32, v: f32) -> Rgb<T> {
    let (w, h) = (tex.width(), tex.height());
    let (x, dx) = texel_coord(u, w);
    let (y, dy) = texel_coord(v, h);
    let x1 = (x + 1).min(w - 1);
    let y1 = (y + 1).min(h - 1);

    let c00 = to_f32s(tex.texel(x, y));
    let c10 = to_f32s(tex.texel(x1, y));
    let c01 = to_f32s(tex.texel(x, y1));
    let c11 = to_f32s(tex.texel(x1, y1));

    let channel = |i: usize| {
        let top = lerp(c00[i], c10[i], dx);
        let bottom = lerp(c01[i], c11[i], dx);
        T::from_f32(lerp(top, bottom, dy))
    };
    Rgb::new(channel(0), channel(1), channel(2))
}

fn sample_bicubic<T: Sample>(tex: &Texture<T>, u: f32, v: f32) -> Rgb<T> {
    let (w, h) = (tex.width() as i64, tex.height() as i64);
    let (x, tx) = texel_coord(u, tex.width());
    let (y, ty) = texel_coord(v, tex.height());
    let wx = catmull_rom(tx);
    let wy = catmull_rom(ty);

    let mut acc = [0.0f32; 3];
    let mut lo = [f32::INFINITY; 3];
    let mut hi = [f32::NEG_INFINITY; 3];

    for (j, wyj) in wy.iter().enumerate() {
        let sy = (y as i64 + j as i64 - 1).clamp(0, h - 1) as usize;
        for (i, wxi) in wx.iter().enumerate() {
            let sx = (x as i64 + i as i64 - 1).clamp(0, w - 1) as usize;
            let c = to_f32s(tex.texel(sx, sy));
            let weight = wxi * wyj;
            for k in 0..3 {
                acc[k] += c[k] * weight;
                lo[k] = lo[k].min(c[k]);
                hi[k] = hi[k].max(c[k]);
            }
        }
    }

    // Catmull-Rom overshoots near edges; keep results inside the tap range
    let channel = |k: usize| T::from_f32(acc[k].clamp(lo[k], hi[k]));
    Rgb::new(channel(0), channel(1), channel(2))
}

/// Read-only UV lookup over an [`ImageView`]
#[derive(Debug, Clone, Copy)]
pub struct Sampler<'a, T = u8> {
    view: &'a ImageView<T>,
    wrap: Wrap,
    filter: Filter,
}

impl<'a, T: Sample> Sampler<'a, T> {
    pub fn new(view: &'a ImageView<T>, wrap: Wrap, filter: Filter) -> Self {
        Self { view, wrap, filter }
    }

    pub fn wrap(&self) -> Wrap {
        self.wrap
    }

    pub fn filter(&self) -> Filter {
        self.filter
    }

    pub fn set_wrap(&mut self, wrap: Wrap) {
        self.wrap = wrap;
    }

    pub fn set_filter(&mut self, filter: Filter) {
        self.filter = filter;
    }

    fn sample(&self, tex: &Texture<T>, u: f32, v: f32) -> Rgb<T> {
        let u = wrap_coord(self.wrap, u);
        let v = wrap_coord(self.wrap, v);
        match self.filter {
            Filter::Nearest => sample_nearest(tex, u, v),
            Filter::Bilinear => sample_bilinear(tex, u, v),
            Filter::Bicubic => sample_bicubic(tex, u, v),
        }
    }

    /// Color at `(u, v)` on the primary texture. Recomputes derived data
    /// first if the view is dirty.
    pub fn get_pixel(&self, u: f32, v: f32) -> Rgb<T> {
        self.view.refresh();
        self.sample(self.view.texture(), u, v)
    }

    /// Color at `(u, v)` on mip level `level`, clamped to the last level
    pub fn get_pixel_level(&self, u: f32, v: f32, level: usize) -> Rgb<T> {
        let level = level.min(self.view.mip_level_count() - 1);
        match self.view.mip_level(level) {
            Some(tex) => self.sample(&tex, u, v),
            None => self.sample(self.view.texture(), u, v),
        }
    }
}
