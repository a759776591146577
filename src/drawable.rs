// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Pixel region access
//!
//! The host's drawables are only ever seen through these two traits:
//! geometry queries, plus row- and column-oriented span transfers.
//! Everything that wants a whole rectangle goes through
//! `read_region` / `write_region`, which are built on the row calls.

use crate::error::{try_alloc, LqrError};
use crate::pixelbuffer::PixelBuffer;

/// A readable, host-managed drawable.
pub trait Drawable {
    fn width(&self) -> u32;
    fn height(&self) -> u32;

    /// Bytes (channels) per pixel.
    fn bpp(&self) -> u8;
    fn has_alpha(&self) -> bool;

    /// Position of the drawable within the image it belongs to.
    fn offsets(&self) -> (i32, i32);

    /// Copy `len` pixels starting at (x, y) and running rightward into
    /// `out`, which must hold at least `len * bpp` bytes.
    fn get_row(&self, x: u32, y: u32, len: u32, out: &mut [u8]) -> Result<(), LqrError>;

    /// Copy `len` pixels starting at (x, y) and running downward.
    fn get_col(&self, x: u32, y: u32, len: u32, out: &mut [u8]) -> Result<(), LqrError>;
}

/// A drawable we may also write into.
pub trait DrawableMut: Drawable {
    fn set_row(&mut self, x: u32, y: u32, len: u32, src: &[u8]) -> Result<(), LqrError>;
    fn set_col(&mut self, x: u32, y: u32, len: u32, src: &[u8]) -> Result<(), LqrError>;
}

/// Read a (possibly partial) rectangle out of a drawable.
pub fn read_region<D>(drawable: &D, x: u32, y: u32, w: u32, h: u32) -> Result<PixelBuffer, LqrError>
where
    D: Drawable + ?Sized,
{
    let mut region = PixelBuffer::new(w, h, drawable.bpp())?;
    let mut line = try_alloc(w as usize * drawable.bpp() as usize)?;
    for row in 0..h {
        drawable.get_row(x, y + row, w, &mut line)?;
        region.write_row(0, row, w, &line)?;
    }
    Ok(region)
}

/// Write a rectangle into a drawable with its top-left corner at (x, y).
pub fn write_region<D>(drawable: &mut D, x: u32, y: u32, region: &PixelBuffer) -> Result<(), LqrError>
where
    D: DrawableMut + ?Sized,
{
    if region.channels() != drawable.bpp() {
        return Err(LqrError::InvalidChannels(region.channels()));
    }
    for row in 0..region.height() {
        drawable.set_row(x, y + row, region.width(), region.row(row))?;
    }
    Ok(())
}

pub fn read_row<D>(drawable: &D, x: u32, y: u32, len: u32) -> Result<Vec<u8>, LqrError>
where
    D: Drawable + ?Sized,
{
    let mut line = try_alloc(len as usize * drawable.bpp() as usize)?;
    drawable.get_row(x, y, len, &mut line)?;
    Ok(line)
}

pub fn read_col<D>(drawable: &D, x: u32, y: u32, len: u32) -> Result<Vec<u8>, LqrError>
where
    D: Drawable + ?Sized,
{
    let mut line = try_alloc(len as usize * drawable.bpp() as usize)?;
    drawable.get_col(x, y, len, &mut line)?;
    Ok(line)
}
