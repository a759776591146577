// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Defines the basic pixel buffer: a rectangular, row-major field of
//! 8-bit samples with between one and four channels per pixel.  Two-
//! and four-channel buffers carry a trailing alpha channel.

use crate::error::{try_alloc, LqrError};
use std::ops::{Index, IndexMut};

#[derive(Debug, Clone, PartialEq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    channels: u8,
    data: Vec<u8>,
}

fn expected_len(width: u32, height: u32, channels: u8) -> Result<usize, LqrError> {
    if channels == 0 || channels > 4 {
        return Err(LqrError::InvalidChannels(channels));
    }
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(channels as usize))
        .ok_or(LqrError::AllocationFailure { bytes: usize::MAX })
}

impl PixelBuffer {
    /// Allocate a new, zeroed (transparent black, where there is
    /// alpha) buffer.
    pub fn new(width: u32, height: u32, channels: u8) -> Result<Self, LqrError> {
        let data = try_alloc(expected_len(width, height, channels)?)?;
        Ok(PixelBuffer {
            width,
            height,
            channels,
            data,
        })
    }

    /// Wrap an existing row-major byte vector.
    pub fn from_raw(width: u32, height: u32, channels: u8, data: Vec<u8>) -> Result<Self, LqrError> {
        let expected = expected_len(width, height, channels)?;
        if data.len() != expected {
            return Err(LqrError::BufferSize {
                actual: data.len(),
                expected,
                width,
                height,
                channels,
            });
        }
        Ok(PixelBuffer {
            width,
            height,
            channels,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    pub fn has_alpha(&self) -> bool {
        self.channels % 2 == 0
    }

    pub fn as_raw(&self) -> &[u8] {
        &self.data
    }

    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    // Keep the index math in a singular location and never, ever mess
    // with it.  This particular variant is the same one used in
    // image.rs, scaled by the channel count.
    fn get_index(&self, x: u32, y: u32) -> usize {
        ((y as usize) * (self.width as usize) + (x as usize)) * (self.channels as usize)
    }

    /// The samples of one row.
    pub fn row(&self, y: u32) -> &[u8] {
        let start = self.get_index(0, y);
        &self.data[start..start + self.width as usize * self.channels as usize]
    }

    fn check_span(&self, x: u32, y: u32, len: u32, along_row: bool) -> Result<(), LqrError> {
        let (start, fixed, limit, other) = if along_row {
            (x, y, self.width, self.height)
        } else {
            (y, x, self.height, self.width)
        };
        let fits = fixed < other && (start as u64) + (len as u64) <= limit as u64;
        if fits {
            Ok(())
        } else {
            Err(LqrError::OutOfBounds {
                x,
                y,
                len,
                width: self.width,
                height: self.height,
            })
        }
    }

    // The caller's side of a span must hold at least `len` pixels.
    fn check_slice(&self, len: u32, actual: usize) -> Result<usize, LqrError> {
        let expected = len as usize * self.channels as usize;
        if actual < expected {
            return Err(LqrError::BufferSize {
                actual,
                expected,
                width: self.width,
                height: self.height,
                channels: self.channels,
            });
        }
        Ok(expected)
    }

    /// Copy `len` pixels of row `y`, starting at column `x`, into `out`.
    pub fn read_row_into(&self, x: u32, y: u32, len: u32, out: &mut [u8]) -> Result<(), LqrError> {
        self.check_span(x, y, len, true)?;
        let bytes = self.check_slice(len, out.len())?;
        let start = self.get_index(x, y);
        out[..bytes].copy_from_slice(&self.data[start..start + bytes]);
        Ok(())
    }

    /// Copy `len` pixels of column `x`, starting at row `y`, into `out`.
    pub fn read_col_into(&self, x: u32, y: u32, len: u32, out: &mut [u8]) -> Result<(), LqrError> {
        self.check_span(x, y, len, false)?;
        self.check_slice(len, out.len())?;
        let bpp = self.channels as usize;
        for (i, dst) in out.chunks_exact_mut(bpp).take(len as usize).enumerate() {
            let start = self.get_index(x, y + i as u32);
            dst.copy_from_slice(&self.data[start..start + bpp]);
        }
        Ok(())
    }

    pub fn write_row(&mut self, x: u32, y: u32, len: u32, src: &[u8]) -> Result<(), LqrError> {
        self.check_span(x, y, len, true)?;
        let bytes = self.check_slice(len, src.len())?;
        let start = self.get_index(x, y);
        self.data[start..start + bytes].copy_from_slice(&src[..bytes]);
        Ok(())
    }

    pub fn write_col(&mut self, x: u32, y: u32, len: u32, src: &[u8]) -> Result<(), LqrError> {
        self.check_span(x, y, len, false)?;
        self.check_slice(len, src.len())?;
        let bpp = self.channels as usize;
        for (i, pixel) in src.chunks_exact(bpp).take(len as usize).enumerate() {
            let start = self.get_index(x, y + i as u32);
            self.data[start..start + bpp].copy_from_slice(pixel);
        }
        Ok(())
    }
}

impl Index<(u32, u32)> for PixelBuffer {
    type Output = [u8];

    /// A convenience addressing mode for getting a pixel's samples.
    fn index(&self, (x, y): (u32, u32)) -> &[u8] {
        let index = self.get_index(x, y);
        &self.data[index..index + self.channels as usize]
    }
}

impl IndexMut<(u32, u32)> for PixelBuffer {
    /// A convenience addressing mode for setting a pixel's samples.
    fn index_mut(&mut self, (x, y): (u32, u32)) -> &mut [u8] {
        let index = self.get_index(x, y);
        let channels = self.channels as usize;
        &mut self.data[index..index + channels]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_mismatched_length() {
        let err = PixelBuffer::from_raw(2, 2, 3, vec![0; 11]).unwrap_err();
        match err {
            LqrError::BufferSize {
                actual, expected, ..
            } => assert_eq!((actual, expected), (11, 12)),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn rejects_bad_channel_counts() {
        assert!(matches!(
            PixelBuffer::new(1, 1, 5),
            Err(LqrError::InvalidChannels(5))
        ));
        assert!(matches!(
            PixelBuffer::new(1, 1, 0),
            Err(LqrError::InvalidChannels(0))
        ));
    }

    #[test]
    fn alpha_follows_channel_parity() {
        let alpha: Vec<bool> = (1..=4)
            .map(|c| PixelBuffer::new(1, 1, c).unwrap().has_alpha())
            .collect();
        assert_eq!(alpha, [false, true, false, true]);
    }

    #[test]
    fn columns_read_transposed() {
        // 3x2, single channel: rows [0 1 2] [3 4 5]
        let buf = PixelBuffer::from_raw(3, 2, 1, (0..6).collect()).unwrap();
        let mut out = [0u8; 2];
        buf.read_col_into(1, 0, 2, &mut out).unwrap();
        assert_eq!(out, [1, 4]);
        let mut out = [0u8; 2];
        buf.read_row_into(1, 1, 2, &mut out).unwrap();
        assert_eq!(out, [4, 5]);
    }

    #[test]
    fn spans_past_the_edge_are_refused() {
        let buf = PixelBuffer::new(3, 2, 1).unwrap();
        let mut out = [0u8; 4];
        assert!(buf.read_row_into(1, 0, 3, &mut out).is_err());
        assert!(buf.read_col_into(0, 1, 2, &mut out).is_err());
        assert!(buf.read_row_into(0, 2, 1, &mut out).is_err());
    }

    #[test]
    fn writes_land_where_indexed() {
        let mut buf = PixelBuffer::new(2, 2, 2).unwrap();
        buf.write_col(1, 0, 2, &[10, 11, 20, 21]).unwrap();
        assert_eq!(&buf[(1, 0)], &[10, 11]);
        assert_eq!(&buf[(1, 1)], &[20, 21]);
        buf[(0, 1)].copy_from_slice(&[7, 8]);
        assert_eq!(buf.row(1), &[7, 8, 20, 21]);
    }

    #[test]
    fn short_slices_are_refused() {
        let mut buf = PixelBuffer::new(3, 2, 1).unwrap();
        let mut out = [0u8; 2];
        assert!(matches!(
            buf.read_row_into(0, 0, 3, &mut out),
            Err(LqrError::BufferSize {
                actual: 2,
                expected: 3,
                ..
            })
        ));
        assert!(buf.read_col_into(0, 0, 2, &mut out[..1]).is_err());
        assert!(buf.write_row(0, 0, 3, &[1, 2]).is_err());
        assert!(buf.write_col(2, 0, 2, &[9]).is_err());
        assert_eq!(buf.as_raw(), &[0; 6]);
    }
}
