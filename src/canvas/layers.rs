use eframe::egui::Color32;

use crate::canvas::segment::Wedge;
use crate::canvas::surface::{Paint, PixelBuffer};
use crate::error::{EngineError, Result};
use crate::utils::color::{ColorManipulation, Hsl};

/// Single paintable layer. Owns its pixels outright; history keeps cheap clones.
#[derive(Clone, Debug, PartialEq)]
pub struct Layer {
    pub name: String,
    pub opacity: f32, // 0..=1
    pub visible: bool,
    /// Default paint color for strokes and fills on this layer.
    pub color: Color32,
    pub pixels: PixelBuffer,
}

/// Parameters for [`LayerStack::add_layer`]; `None` fields get stack defaults.
#[derive(Clone, Debug)]
pub struct NewLayer {
    pub name: Option<String>,
    pub opacity: f32,
    pub visible: bool,
    pub color: Option<Color32>,
    pub pixels: Option<PixelBuffer>,
}

impl Default for NewLayer {
    fn default() -> Self {
        Self {
            name: None,
            opacity: 0.5,
            visible: true,
            color: None,
            pixels: None,
        }
    }
}

/// Metadata row for the layers panel.
#[derive(Clone, Debug, PartialEq)]
pub struct LayerInfo {
    pub index: usize,
    pub name: String,
    pub opacity: f32,
    pub visible: bool,
    pub color: Color32,
    pub is_current: bool,
}

/// Ordered layers (bottom first) plus the index of the one being drawn on.
///
/// Outside of [`LayerStack::empty`] construction the stack always holds at least one
/// layer and `current` always points at one of them.
#[derive(Clone, Debug)]
pub struct LayerStack {
    layers: Vec<Layer>,
    current: usize,
    width: usize,
    height: usize,
    hue_start: f32,
    hue_step: f32,
}

impl LayerStack {
    /// Stack with no layers yet; callers add the first one immediately.
    pub fn empty(width: usize, height: usize, hue_start: f32, hue_step: f32) -> Self {
        Self {
            layers: Vec::new(),
            current: 0,
            width,
            height,
            hue_start,
            hue_step,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn get(&self, index: usize) -> Option<&Layer> {
        self.layers.get(index)
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current(&self) -> Option<&Layer> {
        self.layers.get(self.current)
    }

    pub fn current_mut(&mut self) -> Option<&mut Layer> {
        self.layers.get_mut(self.current)
    }

    /// Error unless `index` names an existing layer.
    pub fn check_index(&self, index: usize) -> Result<()> {
        if index < self.layers.len() {
            Ok(())
        } else {
            Err(EngineError::LayerIndexOutOfRange {
                index,
                len: self.layers.len(),
            })
        }
    }

    /// Color the next new layer receives: the start hue for the first layer, then the
    /// top layer's hue stepped backwards.
    pub fn next_auto_color(&self) -> Color32 {
        match self.layers.last() {
            None => Hsl::new(self.hue_start, 100.0, 50.0).to_color32(),
            Some(top) => top.color.rotate_hue(-self.hue_step),
        }
    }

    /// Append a layer and make it current.
    ///
    /// Without explicit pixels the layer is filled with its color, clipped to `wedge`,
    /// so a fresh layer exactly covers one segment.
    pub fn add_layer(&mut self, params: NewLayer, wedge: &Wedge) -> &Layer {
        let name = params
            .name
            .unwrap_or_else(|| format!("Layer {}", self.layers.len() + 1));
        let color = params.color.unwrap_or_else(|| self.next_auto_color());
        let pixels = match params.pixels {
            Some(pixels) => pixels,
            None => {
                let mut pixels = PixelBuffer::new(self.width, self.height);
                let mut clipped = wedge.clip(&mut pixels);
                clipped.fill(Paint::Replace(color));
                drop(clipped);
                pixels
            }
        };

        log::debug!("adding layer `{name}` ({})", color.to_hex_rgb());
        self.layers.push(Layer {
            name,
            opacity: params.opacity.clamp(0.0, 1.0),
            visible: params.visible,
            color,
            pixels,
        });
        self.current = self.layers.len() - 1;
        &self.layers[self.current]
    }

    /// Remove the current layer. The last remaining layer cannot be deleted.
    pub fn delete_current(&mut self) -> Result<Layer> {
        if self.layers.len() <= 1 {
            return Err(EngineError::LastLayer);
        }
        let removed = self.layers.remove(self.current);
        self.current = self.current.min(self.layers.len() - 1);
        Ok(removed)
    }

    /// Duplicate the current layer right above itself with a numbered name and a fresh hue.
    pub fn copy_current(&mut self) -> Result<&Layer> {
        self.check_index(self.current)?;
        let source = &self.layers[self.current];

        let base = source
            .name
            .trim_end_matches(|c: char| c.is_ascii_digit())
            .trim()
            .to_string();
        let max_index = self
            .layers
            .iter()
            .filter_map(|layer| numbered_suffix(&layer.name, &base))
            .max()
            .unwrap_or(0);

        let color = self.next_auto_color();
        let mut pixels = source.pixels.clone();
        pixels.recolor(color);

        let copy = Layer {
            name: format!("{base} {}", max_index + 1),
            opacity: source.opacity,
            visible: source.visible,
            color,
            pixels,
        };
        log::debug!("copied layer `{}` to `{}`", source.name, copy.name);

        let insert_at = self.current + 1;
        self.layers.insert(insert_at, copy);
        self.current = insert_at;
        Ok(&self.layers[insert_at])
    }

    /// Move a layer, keeping `current` on the same layer it pointed at before.
    pub fn move_layer(&mut self, from: usize, to: usize) -> Result<()> {
        self.check_index(from)?;
        self.check_index(to)?;
        if from == to {
            return Ok(());
        }

        let layer = self.layers.remove(from);
        self.layers.insert(to, layer);

        let cur = self.current;
        self.current = if cur == from {
            to
        } else if from < to && cur > from && cur <= to {
            cur - 1
        } else if from > to && cur >= to && cur < from {
            cur + 1
        } else {
            cur
        };
        Ok(())
    }

    pub fn select(&mut self, index: usize) -> Result<()> {
        self.check_index(index)?;
        self.current = index;
        Ok(())
    }

    /// Set opacity; values above 1 are read as percentages. Non-finite values are refused.
    pub fn set_opacity(&mut self, index: usize, value: f32) -> Result<()> {
        self.check_index(index)?;
        if !value.is_finite() {
            return Err(EngineError::InvalidConfig(format!("opacity {value} is not finite")));
        }
        let value = if value > 1.0 { value / 100.0 } else { value };
        self.layers[index].opacity = value.clamp(0.0, 1.0);
        Ok(())
    }

    pub fn set_visibility(&mut self, index: usize, visible: bool) -> Result<()> {
        self.check_index(index)?;
        self.layers[index].visible = visible;
        Ok(())
    }

    /// Change the layer color and recolor every non-transparent pixel, keeping alpha.
    pub fn set_color(&mut self, index: usize, color: Color32) -> Result<()> {
        self.check_index(index)?;
        let layer = &mut self.layers[index];
        layer.color = color;
        layer.pixels.recolor(color);
        Ok(())
    }

    /// Clear every layer and refill its wedge with its own color.
    pub fn refill_wedges(&mut self, wedge: &Wedge) {
        for layer in &mut self.layers {
            layer.pixels.clear();
            let mut clipped = wedge.clip(&mut layer.pixels);
            clipped.fill(Paint::Replace(layer.color));
        }
    }

    /// Make the current layer fully transparent.
    pub fn clear_current(&mut self) -> Result<()> {
        self.check_index(self.current)?;
        self.layers[self.current].pixels.clear();
        Ok(())
    }

    /// Swap in a complete layer list at once. An empty list is refused and changes nothing.
    pub fn replace_all(&mut self, layers: Vec<Layer>, current: usize) -> Result<()> {
        if layers.is_empty() {
            return Err(EngineError::MalformedProject("project has no layers".into()));
        }
        if let Some(bad) = layers
            .iter()
            .find(|l| l.pixels.width() != self.width || l.pixels.height() != self.height)
        {
            return Err(EngineError::MalformedProject(format!(
                "layer `{}` is {}x{}, canvas is {}x{}",
                bad.name,
                bad.pixels.width(),
                bad.pixels.height(),
                self.width,
                self.height
            )));
        }
        self.current = current.min(layers.len() - 1);
        self.layers = layers;
        Ok(())
    }

    /// Panel metadata, bottom layer first.
    pub fn infos(&self) -> Vec<LayerInfo> {
        self.layers
            .iter()
            .enumerate()
            .map(|(index, layer)| LayerInfo {
                index,
                name: layer.name.clone(),
                opacity: layer.opacity,
                visible: layer.visible,
                color: layer.color,
                is_current: index == self.current,
            })
            .collect()
    }
}

/// `Some(n)` if `name` is `base` optionally followed by whitespace and a number
/// (`n` is 0 when the number is absent).
fn numbered_suffix(name: &str, base: &str) -> Option<u32> {
    let rest = name.strip_prefix(base)?;
    let digits = rest.trim_start();
    if digits.is_empty() {
        return Some(0);
    }
    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}
