//! Named drawing surfaces
//!
//! A [`Stage`] stands in for the document an effect looks its canvas up in:
//! each layer is registered under a selector string and sized from the
//! window minus a margin. Layers are composited onto the screen in the
//! order they were added, centered within the window.

use crate::config::Rgb;
use crate::display::PixelBuffer;
use crate::error::FxError;

pub struct Layer {
    selector: String,
    margin: (u32, u32),
    buffer: PixelBuffer,
}

impl Layer {
    pub fn size(&self) -> (u32, u32) {
        (self.buffer.width(), self.buffer.height())
    }

    /// Offset of the layer's top-left corner within the window
    pub fn origin(&self) -> (i32, i32) {
        ((self.margin.0 / 2) as i32, (self.margin.1 / 2) as i32)
    }

    fn fit(&mut self, width: u32, height: u32) {
        self.buffer.resize(
            width.saturating_sub(self.margin.0),
            height.saturating_sub(self.margin.1),
        );
    }
}

pub struct Stage {
    width: u32,
    height: u32,
    background: Rgb,
    layers: Vec<Layer>,
}

impl Stage {
    pub fn new(width: u32, height: u32, background: Rgb) -> Self {
        Self {
            width,
            height,
            background,
            layers: Vec::new(),
        }
    }

    /// Register a transparent layer, replacing any previous one with the
    /// same selector
    pub fn add_layer(&mut self, selector: impl Into<String>, margin: (u32, u32)) -> &mut Self {
        let selector = selector.into();
        self.layers.retain(|l| l.selector != selector);
        let mut layer = Layer {
            selector,
            margin,
            buffer: PixelBuffer::with_size(0, 0),
        };
        layer.fit(self.width, self.height);
        self.layers.push(layer);
        self
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn layer(&self, selector: &str) -> Result<&Layer, FxError> {
        self.layers
            .iter()
            .find(|l| l.selector == selector)
            .ok_or_else(|| FxError::CanvasNotFound(selector.to_string()))
    }

    pub fn buffer_mut(&mut self, selector: &str) -> Result<&mut PixelBuffer, FxError> {
        self.layers
            .iter_mut()
            .find(|l| l.selector == selector)
            .map(|l| &mut l.buffer)
            .ok_or_else(|| FxError::CanvasNotFound(selector.to_string()))
    }

    /// Window-space point to layer-local coordinates
    pub fn to_layer(&self, selector: &str, x: i32, y: i32) -> Result<(f32, f32), FxError> {
        let (ox, oy) = self.layer(selector)?.origin();
        Ok(((x - ox) as f32, (y - oy) as f32))
    }

    /// Re-fit every layer to a new window size. Layer contents are lost.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        for layer in &mut self.layers {
            layer.fit(width, height);
        }
        log::debug!("stage resized to {}x{}", width, height);
    }

    /// Flatten the background and all layers into `screen`
    pub fn compose(&self, screen: &mut PixelBuffer) {
        let Rgb { r, g, b } = self.background;
        screen.clear(r, g, b);
        for layer in &self.layers {
            let (x, y) = layer.origin();
            screen.composite(&layer.buffer, x, y);
        }
    }
}
