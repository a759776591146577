// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Render seam maps
//!
//! A visibility map records, for every pixel of the original image, the
//! step at which the carver removed it (0 for pixels that survived).
//! We turn that history into an RGBA overlay: the earliest seams are
//! drawn nearly opaque in the start colour, fading towards the end
//! colour and half transparency for the last seams removed.

use crate::canvas::{Canvas, Layer, LayerId};
use crate::carver::Carver;
use crate::error::{try_alloc, LqrError};
use crate::pixelbuffer::PixelBuffer;
use crate::progress::{tick, Progress};
use image::{GrayImage, Pixel};
use itertools::Itertools;
use num_traits::{clamp, ToPrimitive};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// The seam history of one resize pass.
#[derive(Debug, Clone, PartialEq)]
pub struct VisibilityMap {
    width: u32,
    height: u32,
    depth: u32,
    buffer: Vec<u32>,
}

impl VisibilityMap {
    /// Every entry of `buffer` must lie in `0..=depth`.
    pub fn new(width: u32, height: u32, depth: u32, buffer: Vec<u32>) -> Result<Self, LqrError> {
        let expected = width as usize * height as usize;
        if buffer.len() != expected {
            return Err(LqrError::BufferSize {
                actual: buffer.len(),
                expected,
                width,
                height,
                channels: 1,
            });
        }
        if let Some(step) = buffer.iter().copied().find(|step| *step > depth) {
            return Err(LqrError::StepOutOfRange { step, depth });
        }
        Ok(VisibilityMap {
            width,
            height,
            depth,
            buffer,
        })
    }

    /// Read a map stored as a greyscale image.  The depth is the largest
    /// step present unless one is given.
    pub fn from_luma(image: &GrayImage, depth: Option<u32>) -> Result<Self, LqrError> {
        let (width, height) = image.dimensions();
        let buffer: Vec<u32> = image.pixels().map(|p| u32::from(p.channels()[0])).collect();
        let depth = depth.unwrap_or_else(|| buffer.iter().copied().max().unwrap_or(0));
        VisibilityMap::new(width, height, depth, buffer)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn buffer(&self) -> &[u32] {
        &self.buffer
    }
}

/// A colour with components in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Colour {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Colour {
    pub fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Colour {
            r: f64::from(r) / 255.0,
            g: f64::from(g) / 255.0,
            b: f64::from(b) / 255.0,
        }
    }

    fn mix(&self, other: &Colour, value: f64) -> [f64; 3] {
        [
            value * self.r + (1.0 - value) * other.r,
            value * self.g + (1.0 - value) * other.g,
            value * self.b + (1.0 - value) * other.b,
        ]
    }
}

impl FromStr for Colour {
    type Err = String;

    /// Parse `#rrggbb` (the leading `#` is optional).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(format!("expected a colour like #ff0000, got '{}'", s));
        }
        let component = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .map_err(|_| format!("bad hex digits in colour '{}'", s))
        };
        Ok(Colour::from_rgb8(component(0)?, component(2)?, component(4)?))
    }
}

// [0, 1] -> [0, 255], truncating.
fn to_sample(v: f64) -> u8 {
    clamp(255.0 * v, 0.0, 255.0).to_u8().unwrap_or(0)
}

/// The RGBA value drawn for a pixel removed at `step` (non-zero) out of
/// `depth` steps.
pub fn seam_colour(step: u32, depth: u32, start: &Colour, end: &Colour) -> [u8; 4] {
    let levels = f64::from(depth) + 1.0;
    let value = (levels - f64::from(step)) / levels;
    let [r, g, b] = start.mix(end, value);
    [
        to_sample(r),
        to_sample(g),
        to_sample(b),
        to_sample(0.5 * (1.0 + value)),
    ]
}

/// Draw a visibility map into a fresh RGBA buffer of the same size.
pub fn composite(
    vmap: &VisibilityMap,
    start: &Colour,
    end: &Colour,
    progress: &mut dyn Progress,
) -> Result<PixelBuffer, LqrError> {
    let mut overlay = PixelBuffer::new(vmap.width, vmap.height, 4)?;
    let width = vmap.width as usize;
    let mut row = try_alloc(width * 4)?;

    progress.init("Drawing seam map...");
    for y in 0..vmap.height {
        let steps = &vmap.buffer[y as usize * width..(y as usize + 1) * width];
        for (pixel, step) in row.chunks_exact_mut(4).zip_eq(steps) {
            let rgba = match *step {
                0 => [0; 4],
                vs => seam_colour(vs, vmap.depth, start, end),
            };
            pixel.copy_from_slice(&rgba);
        }
        overlay.write_row(0, y, vmap.width, &row)?;
        tick(progress, y, vmap.height);
    }
    Ok(overlay)
}

/// Where and how a seam map layer is added to the canvas.
#[derive(Debug, Clone)]
pub struct SeamMapTarget {
    pub name: String,
    pub x_off: i32,
    pub y_off: i32,
    pub colour_start: Colour,
    pub colour_end: Colour,
}

/// Render one visibility map as a new, hidden layer on the canvas.
pub fn write_vmap_to_layer(
    canvas: &mut Canvas,
    vmap: &VisibilityMap,
    target: &SeamMapTarget,
    progress: &mut dyn Progress,
) -> Result<LayerId, LqrError> {
    let overlay = composite(vmap, &target.colour_start, &target.colour_end, progress)?;
    let mut layer = Layer::from_buffer(&target.name, overlay);
    layer.translate(target.x_off, target.y_off);
    layer.set_visible(false);
    let id = canvas.add_layer(layer);
    tracing::debug!(%id, name = %target.name, depth = vmap.depth, "added seam map layer");
    Ok(id)
}

/// The name given to seam map layers for a layer called `orig_name`.
pub fn seam_map_name(orig_name: &str) -> String {
    format!("{} seam map", orig_name)
}

/// Add one seam map layer per visibility map the carver holds.  Stops
/// at the first failure; layers already added stay on the canvas.
pub fn write_all_vmaps<C>(
    canvas: &mut Canvas,
    carver: &C,
    orig_name: &str,
    (x_off, y_off): (i32, i32),
    colour_start: Colour,
    colour_end: Colour,
    progress: &mut dyn Progress,
) -> Result<Vec<LayerId>, LqrError>
where
    C: Carver + ?Sized,
{
    let target = SeamMapTarget {
        name: seam_map_name(orig_name),
        x_off,
        y_off,
        colour_start,
        colour_end,
    };
    let mut added = Vec::new();
    carver.foreach_vmap(&mut |vmap| {
        added.push(write_vmap_to_layer(canvas, vmap, &target, progress)?);
        Ok(())
    })?;
    Ok(added)
}
