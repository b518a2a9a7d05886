use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use eframe::egui::{Color32, ColorImage};

use crate::canvas::segment::Wedge;

/// How a raster operation combines its color with the destination pixel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Paint {
    /// Source-over blend.
    Over(Color32),
    /// Overwrite the destination.
    Replace(Color32),
    /// Destination-out at full strength.
    Erase,
}

/// Owned W×H buffer of premultiplied pixels.
///
/// The pixel store is shared copy-on-write, so cloning a buffer (history snapshots,
/// shape-tool previews) is cheap until one side is written to. Drawing through
/// [`PixelBuffer::paint`] respects the clip stack; see [`ClipGuard`].
#[derive(Clone, Debug)]
pub struct PixelBuffer {
    width: usize,
    height: usize,
    pixels: Arc<Vec<Color32>>,
    clips: Vec<Wedge>,
}

impl PartialEq for PixelBuffer {
    fn eq(&self, other: &Self) -> bool {
        self.width == other.width && self.height == other.height && self.pixels == other.pixels
    }
}

impl PixelBuffer {
    /// Fully transparent buffer.
    pub fn new(width: usize, height: usize) -> Self {
        Self::filled(width, height, Color32::TRANSPARENT)
    }

    pub fn filled(width: usize, height: usize, color: Color32) -> Self {
        Self {
            width,
            height,
            pixels: Arc::new(vec![color; width * height]),
            clips: Vec::new(),
        }
    }

    /// Wrap raw pixels; `None` if the length does not match the dimensions.
    pub fn from_pixels(width: usize, height: usize, pixels: Vec<Color32>) -> Option<Self> {
        if pixels.len() != width * height {
            return None;
        }
        Some(Self {
            width,
            height,
            pixels: Arc::new(pixels),
            clips: Vec::new(),
        })
    }

    /// Build from tightly packed, unpremultiplied RGBA bytes.
    pub fn from_rgba_unmultiplied(width: usize, height: usize, bytes: &[u8]) -> Option<Self> {
        if bytes.len() != width * height * 4 {
            return None;
        }
        let pixels = bytes
            .chunks_exact(4)
            .map(|px| Color32::from_rgba_unmultiplied(px[0], px[1], px[2], px[3]))
            .collect();
        Self::from_pixels(width, height, pixels)
    }

    /// Tightly packed, unpremultiplied RGBA bytes (for image encoders).
    pub fn to_rgba_unmultiplied(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.pixels.len() * 4);
        for px in self.pixels.iter() {
            bytes.extend_from_slice(&px.to_srgba_unmultiplied());
        }
        bytes
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixels(&self) -> &[Color32] {
        &self.pixels
    }

    /// Mutable access to the raw pixels. Bypasses the clip stack.
    pub fn pixels_mut(&mut self) -> &mut [Color32] {
        Arc::make_mut(&mut self.pixels).as_mut_slice()
    }

    /// True if both buffers still point at the same copy-on-write storage.
    pub fn shares_storage_with(&self, other: &PixelBuffer) -> bool {
        Arc::ptr_eq(&self.pixels, &other.pixels)
    }

    pub fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 {
            return None;
        }
        let (x, y) = (x as usize, y as usize);
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(y * self.width + x)
    }

    pub fn get(&self, x: i32, y: i32) -> Option<Color32> {
        self.index(x, y).map(|idx| self.pixels[idx])
    }

    /// Number of active clip regions.
    pub fn clip_depth(&self) -> usize {
        self.clips.len()
    }

    /// Whether a draw at `(x, y)` would pass every active clip.
    pub fn is_writable(&self, x: usize, y: usize) -> bool {
        self.clips.iter().all(|wedge| wedge.contains_pixel(x, y))
    }

    /// Restrict drawing to `wedge` until the returned guard is dropped.
    pub fn push_clip(&mut self, wedge: Wedge) -> ClipGuard<'_> {
        let depth = self.clips.len();
        self.clips.push(wedge);
        ClipGuard {
            buffer: self,
            depth,
        }
    }

    /// Apply `paint` to every pixel of the rectangle `[x0, x1) × [y0, y1)` whose center
    /// satisfies `covers` and which lies inside the clip stack.
    pub fn paint<F>(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, paint: Paint, covers: F)
    where
        F: Fn(f32, f32) -> bool,
    {
        let x0 = x0.max(0) as usize;
        let y0 = y0.max(0) as usize;
        let x1 = (x1.max(0) as usize).min(self.width);
        let y1 = (y1.max(0) as usize).min(self.height);
        if x0 >= x1 || y0 >= y1 {
            return;
        }

        let width = self.width;
        let clips = &self.clips;
        let pixels = Arc::make_mut(&mut self.pixels);
        for y in y0..y1 {
            let cy = y as f32 + 0.5;
            let row = y * width;
            for x in x0..x1 {
                if !covers(x as f32 + 0.5, cy) {
                    continue;
                }
                if !clips.iter().all(|wedge| wedge.contains_pixel(x, y)) {
                    continue;
                }
                let dst = &mut pixels[row + x];
                *dst = match paint {
                    Paint::Over(src) => alpha_over(src, *dst),
                    Paint::Replace(src) => src,
                    Paint::Erase => Color32::TRANSPARENT,
                };
            }
        }
    }

    /// `fillRect` over the whole buffer, honoring the clip stack.
    pub fn fill(&mut self, paint: Paint) {
        let (w, h) = (self.width as i32, self.height as i32);
        self.paint(0, 0, w, h, paint, |_, _| true);
    }

    /// Unclipped reset to fully transparent.
    pub fn clear(&mut self) {
        self.pixels_mut().fill(Color32::TRANSPARENT);
    }

    /// Overwrite the RGB of every non-transparent pixel, keeping its alpha.
    pub fn recolor(&mut self, color: Color32) {
        let [r, g, b, _] = color.to_srgba_unmultiplied();
        for px in self.pixels_mut() {
            let a = px.a();
            if a > 0 {
                *px = Color32::from_rgba_unmultiplied(r, g, b, a);
            }
        }
    }

    /// Copy into an egui image for texture upload.
    pub fn to_color_image(&self) -> ColorImage {
        let mut img = ColorImage::new([self.width, self.height], Color32::TRANSPARENT);
        img.pixels.copy_from_slice(&self.pixels);
        img
    }

    /// Source-over composite `src` (same size) scaled by `opacity` (0..=255).
    pub fn blend_from(&mut self, src: &PixelBuffer, opacity: u8) {
        if src.width != self.width || src.height != self.height || opacity == 0 {
            return;
        }
        let dst = self.pixels_mut();
        for (d, s) in dst.iter_mut().zip(src.pixels.iter()) {
            if s.a() == 0 {
                continue;
            }
            *d = alpha_over(apply_opacity_scale(*s, opacity as u32), *d);
        }
    }
}

/// Scoped clip region. Dereferences to the clipped buffer and pops the clip on drop,
/// leaving any outer clips untouched.
pub struct ClipGuard<'a> {
    buffer: &'a mut PixelBuffer,
    depth: usize,
}

impl Deref for ClipGuard<'_> {
    type Target = PixelBuffer;
    fn deref(&self) -> &PixelBuffer {
        self.buffer
    }
}

impl DerefMut for ClipGuard<'_> {
    fn deref_mut(&mut self) -> &mut PixelBuffer {
        self.buffer
    }
}

impl Drop for ClipGuard<'_> {
    fn drop(&mut self) {
        self.buffer.clips.truncate(self.depth);
    }
}

/// Standard "source over" alpha compositing for premultiplied colors.
pub fn alpha_over(src: Color32, dst: Color32) -> Color32 {
    let src_a = src.a() as u32;
    if src_a == 255 {
        return src;
    }
    let dst_a = dst.a() as u32;
    let inv = 255 - src_a;
    let out_a = src_a + (dst_a * inv + 127) / 255;
    if out_a == 0 {
        return Color32::TRANSPARENT;
    }

    let out_r = src.r() as u32 + (dst.r() as u32 * inv + 127) / 255;
    let out_g = src.g() as u32 + (dst.g() as u32 * inv + 127) / 255;
    let out_b = src.b() as u32 + (dst.b() as u32 * inv + 127) / 255;

    Color32::from_rgba_premultiplied(
        out_r.min(255) as u8,
        out_g.min(255) as u8,
        out_b.min(255) as u8,
        out_a.min(255) as u8,
    )
}

/// Scale a premultiplied color by `opacity_scale / 255`.
#[inline]
pub fn apply_opacity_scale(color: Color32, opacity_scale: u32) -> Color32 {
    if opacity_scale >= 255 {
        return color;
    }
    let a = (color.a() as u32 * opacity_scale + 127) / 255;
    let r = (color.r() as u32 * opacity_scale + 127) / 255;
    let g = (color.g() as u32 * opacity_scale + 127) / 255;
    let b = (color.b() as u32 * opacity_scale + 127) / 255;
    Color32::from_rgba_premultiplied(r as u8, g as u8, b as u8, a as u8)
}

/// Layer opacity (0..=1) as an 8-bit scale factor.
pub fn opacity_to_u8(opacity: f32) -> u8 {
    (opacity.clamp(0.0, 1.0) * 255.0).round() as u8
}
