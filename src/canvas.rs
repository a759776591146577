// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! An in-process stand-in for the host image: a stack of named layers,
//! each addressed by a `LayerId` handle.  Handles are never reused, so
//! a handle to a removed layer stays stale forever.

use crate::drawable::{Drawable, DrawableMut};
use crate::error::LqrError;
use crate::pixelbuffer::PixelBuffer;
use image::{DynamicImage, ImageBuffer};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayerId(pub u32);

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "layer #{}", self.0)
    }
}

#[derive(Debug, Clone)]
pub struct Layer {
    name: String,
    buffer: PixelBuffer,
    x_off: i32,
    y_off: i32,
    visible: bool,
}

impl Layer {
    pub fn new(name: &str, width: u32, height: u32, channels: u8) -> Result<Self, LqrError> {
        Ok(Layer::from_buffer(name, PixelBuffer::new(width, height, channels)?))
    }

    pub fn from_buffer(name: &str, buffer: PixelBuffer) -> Self {
        Layer {
            name: name.to_string(),
            buffer,
            x_off: 0,
            y_off: 0,
            visible: true,
        }
    }

    /// Build a layer from a decoded image, keeping grey, grey+alpha, RGB
    /// and RGBA data as-is; anything more exotic is converted to RGBA.
    pub fn from_image(name: &str, image: DynamicImage) -> Result<Self, LqrError> {
        let (width, height, channels, data) = match image {
            DynamicImage::ImageLuma8(buf) => (buf.width(), buf.height(), 1, buf.into_raw()),
            DynamicImage::ImageLumaA8(buf) => (buf.width(), buf.height(), 2, buf.into_raw()),
            DynamicImage::ImageRgb8(buf) => (buf.width(), buf.height(), 3, buf.into_raw()),
            DynamicImage::ImageRgba8(buf) => (buf.width(), buf.height(), 4, buf.into_raw()),
            other => {
                let buf = other.to_rgba();
                (buf.width(), buf.height(), 4, buf.into_raw())
            }
        };
        Ok(Layer::from_buffer(
            name,
            PixelBuffer::from_raw(width, height, channels, data)?,
        ))
    }

    /// The layer's pixels as a decoded image, ready to be saved.
    pub fn to_dynamic(&self) -> Result<DynamicImage, LqrError> {
        let (width, height) = (self.buffer.width(), self.buffer.height());
        let data = self.buffer.as_raw().to_vec();
        let image = match self.buffer.channels() {
            1 => ImageBuffer::from_raw(width, height, data).map(DynamicImage::ImageLuma8),
            2 => ImageBuffer::from_raw(width, height, data).map(DynamicImage::ImageLumaA8),
            3 => ImageBuffer::from_raw(width, height, data).map(DynamicImage::ImageRgb8),
            4 => ImageBuffer::from_raw(width, height, data).map(DynamicImage::ImageRgba8),
            _ => None,
        };
        image.ok_or_else(|| LqrError::InvalidChannels(self.buffer.channels()))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn buffer(&self) -> &PixelBuffer {
        &self.buffer
    }

    pub fn into_buffer(self) -> PixelBuffer {
        self.buffer
    }

    pub fn set_offsets(&mut self, x_off: i32, y_off: i32) {
        self.x_off = x_off;
        self.y_off = y_off;
    }

    /// Move the layer relative to where it currently sits.
    pub fn translate(&mut self, dx: i32, dy: i32) {
        self.x_off += dx;
        self.y_off += dy;
    }

    pub fn visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }
}

impl Drawable for Layer {
    fn width(&self) -> u32 {
        self.buffer.width()
    }

    fn height(&self) -> u32 {
        self.buffer.height()
    }

    fn bpp(&self) -> u8 {
        self.buffer.channels()
    }

    fn has_alpha(&self) -> bool {
        self.buffer.has_alpha()
    }

    fn offsets(&self) -> (i32, i32) {
        (self.x_off, self.y_off)
    }

    fn get_row(&self, x: u32, y: u32, len: u32, out: &mut [u8]) -> Result<(), LqrError> {
        self.buffer.read_row_into(x, y, len, out)
    }

    fn get_col(&self, x: u32, y: u32, len: u32, out: &mut [u8]) -> Result<(), LqrError> {
        self.buffer.read_col_into(x, y, len, out)
    }
}

impl DrawableMut for Layer {
    fn set_row(&mut self, x: u32, y: u32, len: u32, src: &[u8]) -> Result<(), LqrError> {
        self.buffer.write_row(x, y, len, src)
    }

    fn set_col(&mut self, x: u32, y: u32, len: u32, src: &[u8]) -> Result<(), LqrError> {
        self.buffer.write_col(x, y, len, src)
    }
}

#[derive(Debug, Default)]
pub struct Canvas {
    layers: BTreeMap<LayerId, Layer>,
    next_id: u32,
}

impl Canvas {
    pub fn new() -> Self {
        Canvas::default()
    }

    pub fn add_layer(&mut self, layer: Layer) -> LayerId {
        self.next_id += 1;
        let id = LayerId(self.next_id);
        self.layers.insert(id, layer);
        id
    }

    pub fn remove_layer(&mut self, id: LayerId) -> Option<Layer> {
        self.layers.remove(&id)
    }

    pub fn is_valid(&self, id: LayerId) -> bool {
        self.layers.contains_key(&id)
    }

    pub fn layer(&self, id: LayerId) -> Result<&Layer, LqrError> {
        self.layers.get(&id).ok_or(LqrError::StaleReference(id))
    }

    pub fn layer_mut(&mut self, id: LayerId) -> Result<&mut Layer, LqrError> {
        self.layers.get_mut(&id).ok_or(LqrError::StaleReference(id))
    }

    /// Layers in the order they were added.
    pub fn layers(&self) -> impl Iterator<Item = (LayerId, &Layer)> {
        self.layers.iter().map(|(id, layer)| (*id, layer))
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, LumaA};

    #[test]
    fn removed_layers_leave_stale_handles() {
        let mut canvas = Canvas::new();
        let first = canvas.add_layer(Layer::new("a", 2, 2, 3).unwrap());
        let second = canvas.add_layer(Layer::new("b", 2, 2, 3).unwrap());
        assert!(canvas.remove_layer(first).is_some());
        assert!(!canvas.is_valid(first));
        assert!(matches!(canvas.layer(first), Err(LqrError::StaleReference(id)) if id == first));

        // A fresh layer never inherits the old handle.
        let third = canvas.add_layer(Layer::new("c", 1, 1, 1).unwrap());
        assert_ne!(third, first);
        let names: Vec<&str> = canvas.layers().map(|(_, l)| l.name()).collect();
        assert_eq!(names, ["b", "c"]);
        assert!(canvas.is_valid(second));
    }

    #[test]
    fn translate_is_relative() {
        let mut layer = Layer::new("t", 1, 1, 1).unwrap();
        layer.set_offsets(3, 4);
        layer.translate(-5, 1);
        assert_eq!(layer.offsets(), (-2, 5));
    }

    #[test]
    fn grey_alpha_images_keep_their_channels() {
        let img: ImageBuffer<LumaA<u8>, Vec<u8>> =
            ImageBuffer::from_raw(2, 1, vec![255, 128, 0, 0]).unwrap();
        let layer = Layer::from_image("mask", DynamicImage::ImageLumaA8(img)).unwrap();
        assert_eq!(layer.bpp(), 2);
        assert!(layer.has_alpha());
        assert_eq!(layer.buffer().as_raw(), &[255, 128, 0, 0]);
        match layer.to_dynamic().unwrap() {
            DynamicImage::ImageLumaA8(back) => assert_eq!(back.into_raw(), vec![255, 128, 0, 0]),
            _ => panic!("expected a grey+alpha image"),
        }
    }
}
