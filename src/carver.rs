// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The carver seam
//!
//! The seam carving engine itself lives outside this crate.  This trait
//! is just enough of an interface to feed it bias layers, pull its
//! output back a line at a time, and walk the visibility maps it keeps
//! for every resize pass.  Any engine that can do those four things can
//! be plugged in.

use crate::canvas::{Canvas, LayerId};
use crate::drawable::{read_region, Drawable, DrawableMut};
use crate::error::LqrError;
use crate::pixelbuffer::PixelBuffer;
use crate::progress::{tick, Progress};
use crate::seammap::VisibilityMap;

pub trait Carver {
    /// Add `buffer`, scaled by `bias`, to the carver's importance
    /// estimate over the area whose top-left corner sits at
    /// (`x_off`, `y_off`) in the carver's frame.
    fn bias_add_area(
        &mut self,
        buffer: &PixelBuffer,
        bias: i32,
        x_off: i32,
        y_off: i32,
    ) -> Result<(), LqrError>;

    /// True when output lines are columns rather than rows.
    fn transposed(&self) -> bool;

    /// Number of lines `scan_line` yields in a full pass.
    fn extent(&self) -> u32;

    /// The next output line and its index, or `None` once exhausted.
    fn scan_line(&mut self) -> Option<(u32, Vec<u8>)>;

    /// Visibility maps, one per resize pass.
    fn vmaps(&self) -> &[VisibilityMap];

    /// Call `f` on every visibility map in turn, stopping at the first
    /// error.
    fn foreach_vmap(
        &self,
        f: &mut dyn FnMut(&VisibilityMap) -> Result<(), LqrError>,
    ) -> Result<(), LqrError> {
        self.vmaps().iter().try_for_each(|vmap| f(vmap))
    }
}

/// Read a whole layer into a fresh buffer.
pub fn buffer_from_layer<D>(layer: &D, progress: &mut dyn Progress) -> Result<PixelBuffer, LqrError>
where
    D: Drawable + ?Sized,
{
    progress.init("Parsing layer...");
    let buffer = read_region(layer, 0, 0, layer.width(), layer.height())?;
    progress.update(1.0);
    Ok(buffer)
}

/// Feed a preserve or discard layer to the carver.  Nothing happens
/// when there is no layer or the bias is zero.
pub fn update_bias<C>(
    carver: &mut C,
    canvas: &Canvas,
    layer: Option<LayerId>,
    bias_factor: i32,
    (base_x_off, base_y_off): (i32, i32),
    progress: &mut dyn Progress,
) -> Result<(), LqrError>
where
    C: Carver + ?Sized,
{
    let id = match layer {
        Some(id) if bias_factor != 0 => id,
        _ => return Ok(()),
    };
    let layer = canvas.layer(id)?;
    let (x_off, y_off) = layer.offsets();
    let buffer = buffer_from_layer(layer, progress)?;
    tracing::debug!(%id, bias_factor, "adding bias layer");
    carver.bias_add_area(&buffer, bias_factor, x_off - base_x_off, y_off - base_y_off)
}

/// Drain the carver's output into `target`, a line at a time.
pub fn write_carver_to_layer<C, D>(
    carver: &mut C,
    target: &mut D,
    progress: &mut dyn Progress,
) -> Result<(), LqrError>
where
    C: Carver + ?Sized,
    D: DrawableMut + ?Sized,
{
    let (w, h) = (target.width(), target.height());
    let extent = carver.extent();
    let transposed = carver.transposed();

    progress.init("Applying changes...");
    while let Some((line, data)) = carver.scan_line() {
        if transposed {
            target.set_col(line, 0, h, &data)?;
        } else {
            target.set_row(0, line, w, &data)?;
        }
        tick(progress, line, extent);
    }
    Ok(())
}
