// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Guess a new size from a discard mask
//!
//! The line of the mask with the most painted pixels tells us how far
//! the image must shrink along that axis before every masked pixel on
//! that line could have been carved away.  That is only a guess, and
//! only a good one for simple masks; it exists to prefill a size the
//! user is free to change.

use crate::canvas::{Canvas, LayerId};
use crate::drawable::Drawable;
use crate::error::LqrError;
use crate::mask::{scan, Direction, DiscardMask};
use crate::progress::Progress;

/// Size and position of the base image, the one being resized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Geometry {
    pub x_off: i32,
    pub y_off: i32,
    pub width: u32,
    pub height: u32,
}

impl Geometry {
    pub fn of<D: Drawable + ?Sized>(drawable: &D) -> Self {
        let (x_off, y_off) = drawable.offsets();
        Geometry {
            x_off,
            y_off,
            width: drawable.width(),
            height: drawable.height(),
        }
    }

    /// The current size along the axis a resize in `direction` changes.
    pub fn size_along(&self, direction: Direction) -> u32 {
        match direction {
            Direction::Horizontal => self.width,
            Direction::Vertical => self.height,
        }
    }
}

/// The outcome of a size guess.
#[derive(Debug)]
pub enum Estimate {
    /// The mask was scanned and a new size proposed.
    Proposed(u32),
    /// The mask could not be used; the original size stands, and the
    /// reason should be shown to the user.
    Unchanged { size: u32, reason: LqrError },
}

impl Estimate {
    pub fn size(&self) -> u32 {
        match self {
            Estimate::Proposed(size) => *size,
            Estimate::Unchanged { size, .. } => *size,
        }
    }
}

/// The largest per-line active count, or 0 when no line was scanned.
pub fn max_mask_size(counts: &[u32]) -> u32 {
    counts.iter().copied().max().unwrap_or(0)
}

/// Scan `mask` and propose `old_size` less its most heavily painted
/// line.  The result never drops below zero.
pub fn estimate<D>(
    mask: &DiscardMask<D>,
    direction: Direction,
    old_size: u32,
    progress: &mut dyn Progress,
) -> Result<u32, LqrError>
where
    D: Drawable + ?Sized,
{
    let counts = scan(mask, direction, progress)?;
    let max_mask_size = max_mask_size(&counts);
    if max_mask_size > old_size {
        tracing::warn!(max_mask_size, old_size, "mask wider than the image; clamping to zero");
    }
    tracing::debug!(%direction, max_mask_size, old_size, "estimated new size");
    Ok(old_size.saturating_sub(max_mask_size))
}

/// Look the discard layer up on the canvas and guess the new size of
/// the base image along `direction`.  A layer that has gone away is not
/// an error; anything else (an allocation failure) is.
pub fn guess_new_size(
    canvas: &Canvas,
    disc_layer: LayerId,
    base: &Geometry,
    direction: Direction,
    progress: &mut dyn Progress,
) -> Result<Estimate, LqrError> {
    let old_size = base.size_along(direction);
    let layer = match canvas.layer(disc_layer) {
        Ok(layer) => layer,
        Err(reason) => {
            tracing::warn!(%reason, "keeping the original size");
            return Ok(Estimate::Unchanged {
                size: old_size,
                reason,
            });
        }
    };
    let mask = DiscardMask::new(layer, (base.x_off, base.y_off), base.width, base.height);
    estimate(&mask, direction, old_size, progress).map(Estimate::Proposed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::Layer;
    use crate::pixelbuffer::PixelBuffer;
    use crate::progress::NoProgress;

    fn grey_mask(width: u32, height: u32, data: Vec<u8>) -> Layer {
        Layer::from_buffer("discard", PixelBuffer::from_raw(width, height, 1, data).unwrap())
    }

    fn base(width: u32, height: u32) -> Geometry {
        Geometry {
            width,
            height,
            ..Geometry::default()
        }
    }

    #[test]
    fn white_band_shrinks_width_to_zero() {
        let mut buffer = PixelBuffer::new(10, 10, 4).unwrap();
        for y in 3..=6 {
            for x in 0..10 {
                buffer[(x, y)].copy_from_slice(&[255, 255, 255, 255]);
            }
        }
        let mut canvas = Canvas::new();
        let id = canvas.add_layer(Layer::from_buffer("discard", buffer));
        let guess =
            guess_new_size(&canvas, id, &base(10, 10), Direction::Horizontal, &mut NoProgress)
                .unwrap();
        assert!(matches!(guess, Estimate::Proposed(0)));
    }

    #[test]
    fn blank_mask_keeps_the_size() {
        let layer = grey_mask(6, 4, vec![0; 24]);
        let mask = DiscardMask::new(&layer, (0, 0), 6, 4);
        assert_eq!(estimate(&mask, Direction::Horizontal, 6, &mut NoProgress).unwrap(), 6);
        assert_eq!(estimate(&mask, Direction::Vertical, 4, &mut NoProgress).unwrap(), 4);
    }

    #[test]
    fn worst_line_decides() {
        #[rustfmt::skip]
        let data = vec![
            255, 0,   0,   0,
            255, 255, 255, 0,
            0,   255, 0,   0,
        ];
        let layer = grey_mask(4, 3, data);
        let mask = DiscardMask::new(&layer, (0, 0), 4, 3);
        assert_eq!(estimate(&mask, Direction::Horizontal, 4, &mut NoProgress).unwrap(), 1);
        assert_eq!(estimate(&mask, Direction::Vertical, 3, &mut NoProgress).unwrap(), 1);
    }

    #[test]
    fn estimate_stays_within_the_overlap() {
        // A fully painted mask only partly overlapping the base.
        let mut layer = grey_mask(5, 5, vec![255; 25]);
        layer.set_offsets(-3, 1);
        let mask = DiscardMask::new(&layer, (0, 0), 8, 8);
        let extent = mask.overlap_extent(Direction::Horizontal);
        assert_eq!(extent, 2);
        let guess = estimate(&mask, Direction::Horizontal, 8, &mut NoProgress).unwrap();
        assert!(guess <= 8 && guess >= 8 - extent);
        assert_eq!(guess, 6);
    }

    #[test]
    fn mask_outside_the_image_keeps_the_size() {
        let mut layer = grey_mask(3, 3, vec![255; 9]);
        layer.set_offsets(0, 40);
        let mask = DiscardMask::new(&layer, (0, 0), 10, 10);
        assert_eq!(estimate(&mask, Direction::Horizontal, 10, &mut NoProgress).unwrap(), 10);
    }

    #[test]
    fn result_saturates_at_zero() {
        let layer = grey_mask(4, 1, vec![255; 4]);
        let mask = DiscardMask::new(&layer, (0, 0), 4, 1);
        assert_eq!(estimate(&mask, Direction::Horizontal, 2, &mut NoProgress).unwrap(), 0);
    }

    #[test]
    fn stale_layer_reports_and_keeps_the_size() {
        let mut canvas = Canvas::new();
        let id = canvas.add_layer(grey_mask(2, 2, vec![255; 4]));
        canvas.remove_layer(id);
        let guess =
            guess_new_size(&canvas, id, &base(7, 5), Direction::Vertical, &mut NoProgress)
                .unwrap();
        assert_eq!(guess.size(), 5);
        match guess {
            Estimate::Unchanged { reason, .. } => assert!(reason.is_recoverable()),
            other => panic!("expected an unchanged estimate, got {:?}", other),
        }
    }

    #[test]
    fn base_offsets_are_subtracted() {
        // The mask sits at the same place as an offset base image.
        let mut canvas = Canvas::new();
        let mut layer = grey_mask(3, 2, vec![255, 255, 0, 0, 0, 0]);
        layer.set_offsets(5, 5);
        let id = canvas.add_layer(layer);
        let geometry = Geometry {
            x_off: 5,
            y_off: 5,
            width: 3,
            height: 2,
        };
        let guess =
            guess_new_size(&canvas, id, &geometry, Direction::Horizontal, &mut NoProgress)
                .unwrap();
        assert_eq!(guess.size(), 1);
    }
}
